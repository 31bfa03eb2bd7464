//! Frame-rate meter over frame timestamps.
//!
//! Keeps the instantaneous rate, a rolling mean over a window of samples,
//! and an EMA of that mean for a stable readout.

use std::collections::VecDeque;

/// Rolling frame-rate statistics.
#[derive(Debug)]
pub struct FpsMeter {
    /// Instantaneous rates, newest last.
    samples: VecDeque<f64>,
    /// Maximum number of samples to keep.
    window_size: usize,
    /// Weight of the previous smoothed value (0.0-0.99).
    ema_alpha: f64,
    prev_time_s: Option<f64>,
    /// Most recent instantaneous rate.
    pub fps: f64,
    /// EMA of the rolling mean.
    pub smoothed_fps: f64,
    /// Frames seen, including the first.
    pub total_frames: u64,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(30, 0.9)
    }
}

impl FpsMeter {
    pub fn new(window_size: usize, ema_alpha: f64) -> Self {
        let window_size = window_size.max(5);
        Self {
            samples: VecDeque::with_capacity(window_size),
            window_size,
            ema_alpha: ema_alpha.clamp(0.0, 0.99),
            prev_time_s: None,
            fps: 0.0,
            smoothed_fps: 0.0,
            total_frames: 0,
        }
    }

    /// Record a frame at `timestamp_s`; returns the smoothed rate.
    pub fn tick(&mut self, timestamp_s: f64) -> f64 {
        self.total_frames += 1;
        let Some(prev) = self.prev_time_s else {
            self.prev_time_s = Some(timestamp_s);
            return 0.0;
        };
        let dt = timestamp_s - prev;
        if dt <= 0.0 {
            return self.smoothed_fps;
        }
        self.prev_time_s = Some(timestamp_s);

        self.fps = 1.0 / dt;
        self.samples.push_back(self.fps);
        if self.samples.len() > self.window_size {
            self.samples.pop_front();
        }
        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;

        self.smoothed_fps = if self.smoothed_fps == 0.0 {
            mean
        } else {
            self.ema_alpha * self.smoothed_fps + (1.0 - self.ema_alpha) * mean
        };
        self.smoothed_fps
    }

    /// Readout rounded down to whole frames per second.
    pub fn as_int(&self) -> u32 {
        let value = if self.smoothed_fps > 0.0 {
            self.smoothed_fps
        } else {
            self.fps
        };
        value.max(0.0) as u32
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut meter = FpsMeter::default();
        assert_eq!(meter.tick(10.0), 0.0);
        assert_eq!(meter.as_int(), 0);
        assert_eq!(meter.total_frames, 1);
    }

    #[test]
    fn test_steady_rate() {
        let mut meter = FpsMeter::default();
        for i in 0..100 {
            meter.tick(i as f64 * 0.025);
        }
        assert!((meter.fps - 40.0).abs() < 1e-6);
        assert!((meter.smoothed_fps - 40.0).abs() < 1e-6);
        assert!(matches!(meter.as_int(), 39 | 40));
    }

    #[test]
    fn test_non_advancing_timestamp_ignored() {
        let mut meter = FpsMeter::default();
        meter.tick(0.0);
        let first = meter.tick(0.1);
        assert_eq!(meter.tick(0.1), first);
        assert_eq!(meter.tick(0.05), first);
        assert!((meter.fps - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_order_timestamp_keeps_reference() {
        let mut meter = FpsMeter::default();
        meter.tick(1.0);
        meter.tick(1.1);
        meter.tick(0.5);
        meter.tick(1.2);
        assert!((meter.fps - 10.0).abs() < 1e-6, "fps {}", meter.fps);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut meter = FpsMeter::new(2, 0.5);
        for i in 0..20 {
            meter.tick(i as f64);
        }
        assert_eq!(meter.samples.len(), 5);
    }

    #[test]
    fn test_smoothing_lags_rate_change() {
        let mut meter = FpsMeter::new(5, 0.9);
        let mut t = 0.0;
        for _ in 0..50 {
            meter.tick(t);
            t += 0.1;
        }
        for _ in 0..3 {
            t += 0.05;
            meter.tick(t);
        }
        assert!((meter.fps - 20.0).abs() < 1e-6);
        assert!(meter.smoothed_fps > 10.0 && meter.smoothed_fps < 20.0);
    }
}
