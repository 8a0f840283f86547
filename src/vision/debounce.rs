//! Gesture debouncer
//!
//! A sustained open hand stays above threshold for many frames in a row (60+
//! per second). The debouncer turns that into at most one gesture per
//! cooldown window.

/// Debouncer state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebounceState {
    /// Ready to fire on the next sample above threshold
    Armed,
    /// Ignoring samples until the cooldown ends
    Cooling { until_ms: f64 },
}

/// Armed/Cooling state machine
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: f32,
    cooldown_ms: f64,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(threshold: f32, cooldown_ms: f64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            state: DebounceState::Armed,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Feed one sample. Returns true when a gesture should fire.
    ///
    /// Cooling ends once `now_ms` reaches the end of the window; the sample
    /// that arrives at that moment is evaluated as Armed.
    pub fn sample(&mut self, open_probability: f32, now_ms: f64) -> bool {
        if let DebounceState::Cooling { until_ms } = self.state {
            if now_ms < until_ms {
                return false;
            }
            self.state = DebounceState::Armed;
        }

        if open_probability > self.threshold {
            self.state = DebounceState::Cooling {
                until_ms: now_ms + self.cooldown_ms,
            };
            true
        } else {
            false
        }
    }
}
