//! Open-hand gesture detection
//!
//! The classifier itself runs in JavaScript (Teachable Machine). Rust owns
//! everything around it:
//! - picking the "open" class out of each prediction
//! - the Armed/Cooling debouncer that rate-limits gestures
//! - the polling loop that feeds both and broadcasts on the gesture bus

pub mod classes;
pub mod debounce;
pub mod poller;

#[cfg(target_arch = "wasm32")]
pub mod teachable;

pub use classes::{Prediction, open_class_index};
pub use debounce::{DebounceState, Debouncer};
pub use poller::{VisionPoller, VisionReadout};
