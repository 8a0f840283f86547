//! Per-frame vision processing
//!
//! `VisionPoller` owns all mutable vision state. The browser loop hands it
//! each prediction; tests and the native demo do the same with scripted data.

use super::classes::{Prediction, open_class_index, resolve_open_index};
use super::debounce::Debouncer;
use crate::bus::{Gesture, GestureBus};
use crate::tuning::{OpenClassFallback, VisionTuning};

/// What the HUD shows after a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionReadout {
    pub open: f32,
    pub closed: f32,
    /// Gesture broadcast on this frame, if any
    pub gesture: Option<Gesture>,
}

impl VisionReadout {
    /// Two-decimal strings for the `prob-open` / `prob-closed` readouts
    pub fn formatted(&self) -> (String, String) {
        (format!("{:.2}", self.open), format!("{:.2}", self.closed))
    }
}

pub struct VisionPoller {
    bus: GestureBus,
    debouncer: Debouncer,
    fallback: OpenClassFallback,
    open_probability: f32,
    warned_missing_class: bool,
    frames: u64,
    gestures: u64,
}

impl VisionPoller {
    pub fn new(bus: GestureBus, tuning: &VisionTuning) -> Self {
        Self {
            bus,
            debouncer: Debouncer::new(tuning.threshold, tuning.cooldown_ms),
            fallback: tuning.open_class_fallback,
            open_probability: 0.0,
            warned_missing_class: false,
            frames: 0,
            gestures: 0,
        }
    }

    /// Latest open probability (no smoothing)
    pub fn open_probability(&self) -> f32 {
        self.open_probability
    }

    pub fn gestures_emitted(&self) -> u64 {
        self.gestures
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Process one prediction; broadcasts a gesture when the debouncer fires
    pub fn process(&mut self, predictions: &[Prediction], now_ms: f64) -> VisionReadout {
        self.frames += 1;

        let index = resolve_open_index(predictions, self.fallback);
        if open_class_index(predictions).is_none() && !self.warned_missing_class {
            self.warned_missing_class = true;
            log::warn!(
                "No classifier class contains \"open\"; fallback {}",
                self.fallback.as_str()
            );
        }

        self.open_probability = index
            .and_then(|i| predictions.get(i))
            .map(|p| p.probability)
            .unwrap_or(0.0);

        let gesture = if self.debouncer.sample(self.open_probability, now_ms) {
            let gesture = Gesture {
                open_probability: self.open_probability,
                at_ms: now_ms,
            };
            let listeners = self.bus.emit(&gesture);
            self.gestures += 1;
            log::info!(
                "Hand jump (p={:.3}) delivered to {} listener(s)",
                self.open_probability,
                listeners
            );
            Some(gesture)
        } else {
            None
        };

        VisionReadout {
            open: self.open_probability,
            closed: 1.0 - self.open_probability,
            gesture,
        }
    }
}
