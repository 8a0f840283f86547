//! Game and vision balance
//!
//! Defaults reproduce the shipped feel. Overrides are read from LocalStorage
//! as JSON so the game can be re-tuned without a rebuild.

use serde::{Deserialize, Serialize};

/// What to do when no classifier class name contains "open"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OpenClassFallback {
    /// Read the probability of class 0, whatever its label
    #[default]
    FirstClass,
    /// Treat the open probability as zero (gestures never fire)
    Disabled,
}

impl OpenClassFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenClassFallback::FirstClass => "first-class",
            OpenClassFallback::Disabled => "disabled",
        }
    }
}

/// Simulation balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Upward velocity applied by a jump (px/s)
    pub jump_velocity: f32,
    /// Player hitbox
    pub player_width: f32,
    pub player_height: f32,
    /// Obstacle hitbox
    pub obstacle_width: f32,
    pub obstacle_height: f32,

    /// Obstacle speed at session start (px/s)
    pub initial_speed: f32,
    /// Spawn interval range at session start (ms)
    pub initial_spawn_min_ms: u32,
    pub initial_spawn_max_ms: u32,
    /// Spawn interval floors
    pub spawn_min_floor_ms: u32,
    pub spawn_max_floor_ms: u32,

    /// Speed added per escalation (px/s)
    pub speed_step: f32,
    /// Spawn interval removed per escalation (ms)
    pub spawn_step_ms: u32,
    /// First score threshold and the amount it rises by each time it is reached
    pub score_threshold_step: u64,
    /// How long the "SPEED UP!" banner stays up (ms)
    pub banner_ms: f32,
    /// Cloud scroll factor applied to `speed * dt_ms`
    pub cloud_scroll_factor: f32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            jump_velocity: 750.0,
            player_width: 48.0,
            player_height: 52.0,
            obstacle_width: 36.0,
            obstacle_height: 64.0,

            initial_speed: 400.0,
            initial_spawn_min_ms: 1800,
            initial_spawn_max_ms: 2400,
            spawn_min_floor_ms: 1200,
            spawn_max_floor_ms: 1600,

            speed_step: 50.0,
            spawn_step_ms: 100,
            score_threshold_step: 100,
            banner_ms: 1000.0,
            cloud_scroll_factor: 0.5,
        }
    }
}

/// Gesture detection balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionTuning {
    /// Open probability must be strictly above this to fire
    pub threshold: f32,
    /// Minimum time between two gestures (ms)
    pub cooldown_ms: f64,
    /// Teachable Machine model files
    pub model_url: String,
    pub metadata_url: String,
    /// Mirror the webcam image
    pub flip_webcam: bool,
    pub open_class_fallback: OpenClassFallback,
}

impl Default for VisionTuning {
    fn default() -> Self {
        Self {
            threshold: 0.97,
            cooldown_ms: 400.0,
            model_url: "/static/model/model.json".to_string(),
            metadata_url: "/static/model/metadata.json".to_string(),
            flip_webcam: true,
            open_class_fallback: OpenClassFallback::FirstClass,
        }
    }
}

/// All tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub game: GameTuning,
    pub vision: VisionTuning,
}

impl Tuning {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hand_jump_tuning";

    /// Parse a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate();
        Ok(tuning)
    }

    /// Repair values that would break the simulation
    pub fn validate(&mut self) {
        let g = &mut self.game;
        if g.spawn_max_floor_ms < g.spawn_min_floor_ms {
            log::warn!(
                "spawn_max_floor_ms {} below spawn_min_floor_ms {}, raising it",
                g.spawn_max_floor_ms,
                g.spawn_min_floor_ms
            );
            g.spawn_max_floor_ms = g.spawn_min_floor_ms;
        }
        g.initial_spawn_min_ms = g.initial_spawn_min_ms.max(g.spawn_min_floor_ms);
        g.initial_spawn_max_ms = g
            .initial_spawn_max_ms
            .max(g.spawn_max_floor_ms)
            .max(g.initial_spawn_min_ms);
        g.score_threshold_step = g.score_threshold_step.max(1);
        g.gravity = g.gravity.max(0.0);
        g.initial_speed = g.initial_speed.max(0.0);
        g.banner_ms = g.banner_ms.max(0.0);

        let v = &mut self.vision;
        v.threshold = v.threshold.clamp(0.0, 1.0);
        v.cooldown_ms = v.cooldown_ms.max(0.0);
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning overrides from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring malformed tuning overrides: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_balance() {
        let t = Tuning::default();
        assert_eq!(t.game.initial_speed, 400.0);
        assert_eq!(t.game.initial_spawn_min_ms, 1800);
        assert_eq!(t.game.initial_spawn_max_ms, 2400);
        assert_eq!(t.game.score_threshold_step, 100);
        assert_eq!(t.vision.threshold, 0.97);
        assert_eq!(t.vision.cooldown_ms, 400.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "vision": { "threshold": 0.9 } }"#).unwrap();
        assert_eq!(t.vision.threshold, 0.9);
        assert_eq!(t.vision.cooldown_ms, 400.0);
        assert_eq!(t.game.gravity, 1200.0);
    }

    #[test]
    fn test_validate_repairs_inverted_floors() {
        let t = Tuning::from_json(
            r#"{ "game": { "spawn_min_floor_ms": 2000, "spawn_max_floor_ms": 1000 } }"#,
        )
        .unwrap();
        assert!(t.game.spawn_max_floor_ms >= t.game.spawn_min_floor_ms);
        assert!(t.game.initial_spawn_min_ms >= 2000);
        assert!(t.game.initial_spawn_max_ms >= t.game.initial_spawn_min_ms);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_fallback_parses_as_logged() {
        let t = Tuning::from_json(r#"{ "vision": { "open_class_fallback": "disabled" } }"#)
            .unwrap();
        assert_eq!(t.vision.open_class_fallback, OpenClassFallback::Disabled);
        assert_eq!(OpenClassFallback::Disabled.as_str(), "disabled");

        let json = serde_json::to_string(&OpenClassFallback::FirstClass).unwrap();
        assert_eq!(json, format!("\"{}\"", OpenClassFallback::FirstClass.as_str()));
    }
}
