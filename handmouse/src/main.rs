//! handmouse - replay landmark frames through the gesture engine.
//!
//! Frames are read as JSON lines and driven through a recording pointer
//! driver that logs every command it receives.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use handmouse::control::{self, ControlReply, SessionRequest};
use handmouse::{
    Config, FrameOrchestrator, FrameSource, JsonLinesSource, RecordingDriver, ScreenSize,
    SharedConfig,
};

#[derive(Parser, Debug)]
#[command(name = "handmouse", about = "Hand-gesture pointer engine")]
struct Cli {
    /// JSON-lines landmark frames ("-" for stdin)
    #[arg(long, default_value = "-")]
    frames: String,

    /// JSON config file (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen size for the recording driver, as WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080", value_parser = parse_screen)]
    screen: ScreenSize,

    /// Do not refuse commands when the cursor reaches a screen corner
    #[arg(long)]
    no_failsafe: bool,

    /// Read s-expression control messages from stdin
    #[arg(long)]
    control: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn parse_screen(s: &str) -> Result<ScreenSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s}"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad width {w}: {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad height {h}: {e}"))?;
    if width == 0 || height == 0 {
        return Err(format!("screen must be non-empty, got {s}"));
    }
    Ok(ScreenSize::new(f64::from(width), f64::from(height)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("handmouse {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handmouse=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("handmouse v{} starting", env!("CARGO_PKG_VERSION"));

    if cli.control && cli.frames == "-" {
        bail!("--control reads stdin, so frames must come from a file");
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    info!("config: {}", config.to_sexp());
    let shared = SharedConfig::new(config);

    let reader: Box<dyn BufRead> = if cli.frames == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&cli.frames).with_context(|| format!("opening {}", cli.frames))?;
        Box::new(BufReader::new(file))
    };
    let mut source = JsonLinesSource::new(reader);

    let requests = cli.control.then(|| spawn_control(shared.clone()));

    let mut driver = RecordingDriver::new(cli.screen);
    driver.fail_safe = !cli.no_failsafe;
    driver.log_calls = true;
    let mut session = FrameOrchestrator::new(driver)?;

    while let Some(frame) = source.next_frame()? {
        if let Some(rx) = &requests {
            for request in rx.try_iter() {
                println!("{}", control::answer(request, &mut session));
            }
        }
        session.process_frame(&frame, &shared.snapshot())?;
    }

    // Leave nothing held once the stream ends.
    session.reset()?;

    let fps = session.fps();
    info!(
        "{} frames at {} fps, {} driver calls, {} lines skipped",
        fps.total_frames,
        fps.as_int(),
        session.driver().calls().len(),
        source.skipped()
    );
    Ok(())
}

/// Read control messages from stdin on a background thread. Config changes
/// are applied there; session requests come back through the channel.
fn spawn_control(shared: SharedConfig) -> Receiver<SessionRequest> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("Control: stdin read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match control::handle_message(&shared, &line) {
                ControlReply::Response(r) => println!("{}", r),
                ControlReply::Forward(request) => {
                    if tx.send(request).is_err() {
                        break;
                    }
                }
            }
        }
        info!("Control: stdin closed");
    });
    rx
}
