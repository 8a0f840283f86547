//! Session state and world entities
//!
//! One `Session` is one run from the first frame of the Playing scene to
//! game over. Restarting creates a fresh `Session`, so nothing here needs an
//! explicit reset path.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{Aabb, resting_on_ground};
use super::difficulty::{Difficulty, ScoreKeeper};
use crate::consts::*;
use crate::tuning::GameTuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Simulation advancing, jumps accepted
    Running,
    /// Player hit an obstacle; simulation frozen
    GameOver,
}

/// Something that happened during a tick, for HUD/audio/logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped,
    Spawned { id: u32 },
    Scored { score: u64 },
    SpeedUp { speed: f32, level: u32 },
    GameOver { score: u64 },
}

/// The runner
#[derive(Debug, Clone)]
pub struct Player {
    /// Bottom-centre position
    pub pos: Vec2,
    pub vel_y: f32,
    pub grounded: bool,
    pub size: Vec2,
}

impl Player {
    pub fn new(ground_y: f32, tuning: &GameTuning) -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, ground_y),
            vel_y: 0.0,
            grounded: true,
            size: Vec2::new(tuning.player_width, tuning.player_height),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_bottom_center(self.pos, self.size)
    }

    /// Apply the jump impulse if standing on the ground.
    /// Returns false (and changes nothing) while airborne.
    pub fn jump(&mut self, jump_velocity: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.vel_y = -jump_velocity;
        self.grounded = false;
        true
    }

    /// Integrate gravity and clamp to the ground line
    pub fn integrate(&mut self, gravity: f32, ground_y: f32, dt: f32) {
        self.vel_y += gravity * dt;
        self.pos.y += self.vel_y * dt;
        if resting_on_ground(self.pos.y, self.vel_y, ground_y) {
            self.pos.y = ground_y;
            self.vel_y = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }
}

/// A scrolling obstacle
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    /// Bottom-centre position
    pub pos: Vec2,
    pub vel_x: f32,
    pub size: Vec2,
}

impl Obstacle {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_bottom_center(self.pos, self.size)
    }
}

/// Decorative cloud (no collision)
#[derive(Debug, Clone)]
pub struct Cloud {
    /// Centre position
    pub pos: Vec2,
    pub size: Vec2,
    /// Scroll speed in px/ms (before the scroll factor)
    pub speed: f32,
    /// Rotation in degrees
    pub angle: f32,
}

/// Lay out the static, slightly tilted clouds of the start screen
pub fn start_screen_clouds(rng: &mut Pcg32, width: f32) -> Vec<Cloud> {
    let max_x = (width - 100.0).max(101.0) as i32;
    (0..CLOUD_COUNT)
        .map(|_| Cloud {
            pos: Vec2::new(
                rng.random_range(100..=max_x) as f32,
                rng.random_range(50..=250) as f32,
            ),
            size: Vec2::new(
                rng.random_range(120..=200) as f32,
                rng.random_range(30..=60) as f32,
            ),
            speed: 0.0,
            angle: rng.random_range(-3..=3) as f32,
        })
        .collect()
}

/// Lay out the scrolling clouds of the playing screen
pub fn playing_clouds(rng: &mut Pcg32, width: f32) -> Vec<Cloud> {
    let max_x = width.max(1.0) as i32;
    (0..CLOUD_COUNT)
        .map(|_| Cloud {
            pos: Vec2::new(
                rng.random_range(0..=max_x) as f32,
                rng.random_range(50..=250) as f32,
            ),
            size: Vec2::new(
                rng.random_range(100..=180) as f32,
                rng.random_range(30..=50) as f32,
            ),
            speed: rng.random_range(0.1..0.4),
            angle: 0.0,
        })
        .collect()
}

/// Transient text overlay (e.g. "SPEED UP!")
#[derive(Debug, Clone)]
pub struct Banner {
    pub text: String,
    pub remaining_ms: f32,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: GameTuning,
    /// Screen size in CSS pixels
    pub width: f32,
    pub height: f32,
    /// Top of the ground strip; everything stands on this line
    pub ground_y: f32,
    pub phase: SessionPhase,
    pub scores: ScoreKeeper,
    pub difficulty: Difficulty,
    pub player: Player,
    /// Live obstacles (ordered by id)
    pub obstacles: Vec<Obstacle>,
    pub clouds: Vec<Cloud>,
    pub banners: Vec<Banner>,
    /// Simulated time since the session started
    pub elapsed_ms: f64,
    /// When the last obstacle spawned (None before the first spawn)
    pub last_spawn_ms: Option<f64>,
    /// Interval that must pass before the next spawn
    pub spawn_interval_ms: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// Create a fresh run
    pub fn new(seed: u64, width: f32, height: f32, tuning: &GameTuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let ground_y = height - GROUND_HEIGHT;
        let difficulty = Difficulty::new(tuning);
        let spawn_interval_ms = rng.random_range(difficulty.spawn_range());
        let clouds = playing_clouds(&mut rng, width);

        Self {
            seed,
            rng,
            tuning: tuning.clone(),
            width,
            height,
            ground_y,
            phase: SessionPhase::Running,
            scores: ScoreKeeper::new(tuning.score_threshold_step),
            difficulty,
            player: Player::new(ground_y, tuning),
            obstacles: Vec::new(),
            clouds,
            banners: Vec::new(),
            elapsed_ms: 0.0,
            last_spawn_ms: None,
            spawn_interval_ms,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn score(&self) -> u64 {
        self.scores.score
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record an event for the HUD/audio layer
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn an obstacle just past the right edge at the current speed
    pub fn spawn_obstacle(&mut self) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            pos: Vec2::new(self.width + SPAWN_MARGIN, self.ground_y),
            vel_x: self.difficulty.obstacle_velocity(),
            size: Vec2::new(self.tuning.obstacle_width, self.tuning.obstacle_height),
        });
        id
    }

    /// Draw the next spawn interval from the current range
    pub fn roll_spawn_interval(&mut self) {
        self.spawn_interval_ms = self.rng.random_range(self.difficulty.spawn_range());
    }

    /// Jump if running and grounded
    pub fn jump(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let jumped = self.player.jump(self.tuning.jump_velocity);
        if jumped {
            self.push_event(GameEvent::Jumped);
        }
        jumped
    }

    /// Escalate difficulty and push the new speed onto live obstacles
    pub fn escalate(&mut self) {
        self.difficulty.escalate(&self.tuning);
        let vel = self.difficulty.obstacle_velocity();
        for obstacle in &mut self.obstacles {
            obstacle.vel_x = vel;
        }
        self.banners.push(Banner {
            text: "SPEED UP!".to_string(),
            remaining_ms: self.tuning.banner_ms,
        });
        self.push_event(GameEvent::SpeedUp {
            speed: self.difficulty.speed,
            level: self.difficulty.level,
        });
        log::info!(
            "Speed up: level {} speed {} spawn {:?} ms",
            self.difficulty.level,
            self.difficulty.speed,
            self.difficulty.spawn_range()
        );
    }

    /// Freeze the run
    pub fn game_over(&mut self) {
        if self.phase == SessionPhase::GameOver {
            return;
        }
        self.phase = SessionPhase::GameOver;
        let score = self.score();
        self.push_event(GameEvent::GameOver { score });
        log::info!("Game over with score {}", score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(7, 1280.0, 720.0, &GameTuning::default())
    }

    #[test]
    fn test_new_session_defaults() {
        let s = session();
        assert_eq!(s.score(), 0);
        assert_eq!(s.scores.threshold, 100);
        assert_eq!(s.difficulty.speed, 400.0);
        assert_eq!(s.ground_y, 640.0);
        assert!(s.player.grounded);
        assert_eq!(s.clouds.len(), CLOUD_COUNT);
        assert!((1800..=2400).contains(&s.spawn_interval_ms));
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut s = session();
        assert!(s.jump());
        assert_eq!(s.player.vel_y, -750.0);

        s.player.integrate(1200.0, s.ground_y, 0.1);
        let vel_before = s.player.vel_y;
        assert!(!s.jump());
        assert_eq!(s.player.vel_y, vel_before);
    }

    #[test]
    fn test_player_lands_again() {
        let mut s = session();
        s.jump();
        for _ in 0..240 {
            s.player.integrate(1200.0, s.ground_y, 1.0 / 120.0);
        }
        assert!(s.player.grounded);
        assert_eq!(s.player.pos.y, s.ground_y);
        assert_eq!(s.player.vel_y, 0.0);
    }

    #[test]
    fn test_escalate_retargets_live_obstacles() {
        let mut s = session();
        s.spawn_obstacle();
        s.spawn_obstacle();
        s.escalate();
        assert!(s.obstacles.iter().all(|o| o.vel_x == -450.0));
        assert_eq!(s.banners.len(), 1);
        assert!(matches!(
            s.drain_events().last(),
            Some(GameEvent::SpeedUp { level: 1, .. })
        ));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = session();
        let b = session();
        assert_eq!(a.spawn_interval_ms, b.spawn_interval_ms);
        assert_eq!(a.clouds[0].pos, b.clouds[0].pos);
    }

    #[test]
    fn test_start_screen_clouds_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        for cloud in start_screen_clouds(&mut rng, 1280.0) {
            assert!((100.0..=1180.0).contains(&cloud.pos.x));
            assert!((50.0..=250.0).contains(&cloud.pos.y));
            assert!((-3.0..=3.0).contains(&cloud.angle));
            assert_eq!(cloud.speed, 0.0);
        }
    }
}
