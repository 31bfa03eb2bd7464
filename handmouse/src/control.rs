//! Control messages: parse s-expressions and route to handlers.
//!
//! Configuration changes are applied directly to the [`SharedConfig`] and
//! picked up by the frame loop on its next snapshot. Requests that need the
//! session itself (status, reset) are forwarded to the frame loop, which
//! answers them between frames with [`answer`].

use lexpr::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, SharedConfig};
use crate::driver::PointerDriver;
use crate::orchestrator::FrameOrchestrator;

/// A request only the frame loop can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    Status { id: i64 },
    Reset { id: i64 },
}

/// Outcome of handling one control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlReply {
    /// Finished; send this response.
    Response(String),
    /// Hand to the frame loop.
    Forward(SessionRequest),
}

/// Parse an s-expression message and dispatch to the appropriate handler.
pub fn handle_message(config: &SharedConfig, raw: &str) -> ControlReply {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Control: malformed s-expression: {}", e);
            return ControlReply::Response(error_response(
                0,
                &format!("malformed s-expression: {e}"),
            ));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);
    debug!("Control: {:?} id={}", msg_type, msg_id);

    match msg_type.as_deref() {
        Some("config") => ControlReply::Response(handle_config(config, msg_id)),
        Some("config-set") => ControlReply::Response(handle_config_set(config, msg_id, &value)),
        Some("status") => ControlReply::Forward(SessionRequest::Status { id: msg_id }),
        Some("reset") => ControlReply::Forward(SessionRequest::Reset { id: msg_id }),
        Some(other) => {
            ControlReply::Response(error_response(msg_id, &format!("unknown message type: {other}")))
        }
        None => ControlReply::Response(error_response(msg_id, "missing :type")),
    }
}

/// Serve a forwarded request against the running session.
pub fn answer<D: PointerDriver>(request: SessionRequest, session: &mut FrameOrchestrator<D>) -> String {
    match request {
        SessionRequest::Status { id } => format!(
            "(:type :response :id {} :status :ok :session {})",
            id,
            session.status_sexp()
        ),
        SessionRequest::Reset { id } => match session.reset() {
            Ok(()) => ok_response(id),
            Err(e) => error_response(id, &e.to_string()),
        },
    }
}

// ── Handlers ───────────────────────────────────────────────

fn handle_config(config: &SharedConfig, msg_id: i64) -> String {
    config_response(msg_id, &config.snapshot())
}

fn handle_config_set(config: &SharedConfig, msg_id: i64, value: &Value) -> String {
    let grace = match get_int(value, "grace-frames") {
        Some(n) if n < 1 || n > i64::from(u32::MAX) => {
            return error_response(msg_id, &format!("grace-frames out of range: {n}"));
        }
        other => other,
    };

    config.update(|c| {
        if let Some(v) = get_float(value, "smoothing") {
            c.smoothing = v;
        }
        if let Some(v) = get_float(value, "sensitivity") {
            c.sensitivity = v;
        }
        if let Some(v) = get_float(value, "dead-zone") {
            c.dead_zone_px = v;
        }
        if let Some(v) = get_float(value, "pinch-threshold") {
            c.pinch_threshold = v;
        }
        if let Some(v) = get_float(value, "min-confidence") {
            c.handedness_min_confidence = v;
        }
        if let Some(v) = get_bool(value, "invert-hands") {
            c.invert_hands = v;
        }
        if let Some(n) = grace {
            c.hand_loss_grace_frames = n as u32;
        }
        if let Some(v) = get_bool(value, "freeze") {
            c.gestures.freeze = v;
        }
        if let Some(v) = get_bool(value, "left-hold") {
            c.gestures.left_hold = v;
        }
        if let Some(v) = get_bool(value, "right-click") {
            c.gestures.right_click = v;
        }
    });

    let snapshot = config.snapshot();
    info!("Control: config now {}", snapshot.to_sexp());
    config_response(msg_id, &snapshot)
}

// ── Response helpers ───────────────────────────────────────

fn config_response(id: i64, config: &Config) -> String {
    format!(
        "(:type :response :id {} :status :ok :config {})",
        id,
        config.to_sexp()
    )
}

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ── Plist access ───────────────────────────────────────────

/// Extract a keyword value from an s-expression plist.
/// Accepts both `Value::Keyword("key")` and `Value::Symbol(":key")` forms.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            let Value::Cons(next) = pair.cdr() else {
                return None;
            };
            let val = next.car();
            return Some(match val {
                Value::Keyword(v) => v.to_string(),
                Value::Symbol(v) => {
                    let s: &str = v;
                    s.strip_prefix(':').unwrap_or(s).to_string()
                }
                Value::String(v) => v.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => (if *b { "t" } else { "nil" }).to_string(),
                Value::Null => "nil".to_string(),
                _ => val.to_string(),
            });
        }
        current = pair.cdr();
    }
    None
}

fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Treats "nil" as false, anything else as true.
fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

// ── Tests ──────────────────────────────────────────────────
