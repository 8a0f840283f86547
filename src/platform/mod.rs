//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing
//! - requestAnimationFrame loops
//! - DOM HUD and alerts

pub mod clock;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use clock::FrameClock;
