//! Frame timing from page timestamps

use crate::consts::SIM_DT;

/// Turns successive frame timestamps (ms) into frame deltas (seconds)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous frame. The first frame reports one sim step;
    /// a timestamp that goes backwards reports zero.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => SIM_DT,
        };
        self.last_ms = Some(now_ms);
        self.frames += 1;
        dt
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_one_step() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1234.0), SIM_DT);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn test_delta_in_seconds() {
        let mut clock = FrameClock::new();
        clock.advance(1000.0);
        assert!((clock.advance(1016.0) - 0.016).abs() < 1e-6);
        assert!((clock.advance(1116.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut clock = FrameClock::new();
        clock.advance(500.0);
        assert_eq!(clock.advance(400.0), 0.0);
    }
}
