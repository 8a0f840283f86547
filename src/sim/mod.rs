//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod state;
pub mod tick;

pub use collision::{Aabb, resting_on_ground};
pub use difficulty::{Difficulty, ScoreKeeper};
pub use state::{
    Banner, Cloud, GameEvent, Obstacle, Player, Session, SessionPhase, playing_clouds,
    start_screen_clouds,
};
pub use tick::{TickInput, tick};
