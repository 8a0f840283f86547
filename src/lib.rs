//! Hand Jump - an endless runner controlled by webcam hand gestures
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, obstacles, scoring, difficulty)
//! - `vision`: Open-hand classification and gesture debouncing
//! - `bus`: Gesture broadcast with RAII subscriptions
//! - `director`: Start/Playing scene graph driven by gestures
//! - `renderer`: WebGPU rendering of the scene as coloured quads
//! - `platform`: Browser glue (frame loops, DOM HUD)
//! - `audio`: Procedural sound cues for game events
//! - `tuning`: Data-driven game and vision balance

pub mod audio;
pub mod bus;
pub mod director;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;
pub mod vision;

pub use bus::{Gesture, GestureBus, Subscription};
pub use director::{Director, SceneKind};
pub use error::InitError;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Height of the ground strip at the bottom of the screen
    pub const GROUND_HEIGHT: f32 = 80.0;
    /// Fixed horizontal position of the player
    pub const PLAYER_X: f32 = 150.0;

    /// Obstacles spawn this far past the right edge
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Obstacles are despawned (and scored) once left of this x
    pub const DESPAWN_X: f32 = -100.0;
    /// Points per obstacle passed
    pub const POINTS_PER_OBSTACLE: u64 = 10;

    /// Number of decorative clouds per scene
    pub const CLOUD_COUNT: usize = 5;
    /// Clouds wrap once they scroll past this x
    pub const CLOUD_WRAP_X: f32 = -200.0;
    /// Clouds re-enter this far past the right edge
    pub const CLOUD_REENTRY_MARGIN: f32 = 200.0;

    /// Webcam preview size in pixels
    pub const WEBCAM_WIDTH: u32 = 200;
    pub const WEBCAM_HEIGHT: u32 = 150;
}
