//! Scene graph: Start -> Playing
//!
//! The director owns the current scene and every gesture subscription that
//! scene registered. Subscriptions only push a `SceneCommand` into the
//! director's inbox; commands are applied at the start of the next `update`,
//! so a gesture never re-enters the director while it is borrowed.
//!
//! Tearing a scene down (switching scenes, restarting, dropping the
//! director) drops its subscriptions, which deregisters them from the bus.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::bus::{Gesture, GestureBus, Subscription};
use crate::consts::*;
use crate::sim::{Cloud, GameEvent, Session, SessionPhase, TickInput, start_screen_clouds, tick};
use crate::tuning::GameTuning;

pub const START_PROMPT: &str = "🖐️ Open your hand to start";
pub const GAME_OVER_PROMPT: &str = "💀 Game over!\nOpen your hand to play again";

/// Which scene is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Start,
    Playing,
}

/// Work requested by a gesture subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SceneCommand {
    StartGame,
    Jump,
    Restart,
}

type Inbox = Rc<RefCell<VecDeque<SceneCommand>>>;

fn enqueue_on_gesture(
    bus: &GestureBus,
    inbox: &Inbox,
    command: SceneCommand,
    once: bool,
) -> Subscription {
    let inbox = inbox.clone();
    let push = move |_: &Gesture| inbox.borrow_mut().push_back(command);
    if once {
        bus.subscribe_once(push)
    } else {
        bus.subscribe(push)
    }
}

/// Idle screen waiting for the first gesture
struct StartScene {
    clouds: Vec<Cloud>,
    _on_gesture: Subscription,
}

/// One run, from first frame to game over
struct PlayingScene {
    session: Session,
    /// Live while running; dropped on game over
    jump: Option<Subscription>,
    /// Registered on game over; fires once to restart
    restart: Option<Subscription>,
    accumulator: f32,
    jump_pending: bool,
}

enum Scene {
    Start(StartScene),
    Playing(PlayingScene),
}

/// Text the HUD should show this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudView {
    pub score: Option<String>,
    pub message: Option<String>,
    pub banner: Option<String>,
}

pub struct Director {
    bus: GestureBus,
    inbox: Inbox,
    tuning: GameTuning,
    width: f32,
    height: f32,
    seed: u64,
    runs: u32,
    scene: Scene,
}

impl Director {
    /// Create the director in the Start scene
    pub fn new(bus: GestureBus, tuning: GameTuning, width: f32, height: f32, seed: u64) -> Self {
        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let scene = Self::start_scene(&bus, &inbox, width, seed);
        log::info!("Start scene ({}x{})", width, height);
        Self {
            bus,
            inbox,
            tuning,
            width,
            height,
            seed,
            runs: 0,
            scene,
        }
    }

    fn start_scene(bus: &GestureBus, inbox: &Inbox, width: f32, seed: u64) -> Scene {
        let mut rng = Pcg32::seed_from_u64(seed);
        Scene::Start(StartScene {
            clouds: start_screen_clouds(&mut rng, width),
            _on_gesture: enqueue_on_gesture(bus, inbox, SceneCommand::StartGame, true),
        })
    }

    /// Replace the current scene with a fresh run
    fn enter_playing(&mut self) {
        self.runs += 1;
        let seed = self
            .seed
            .wrapping_add(u64::from(self.runs).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let session = Session::new(seed, self.width, self.height, &self.tuning);
        let jump = enqueue_on_gesture(&self.bus, &self.inbox, SceneCommand::Jump, false);

        // Dropping the old scene deregisters its listeners
        self.scene = Scene::Playing(PlayingScene {
            session,
            jump: Some(jump),
            restart: None,
            accumulator: 0.0,
            jump_pending: false,
        });
        log::info!("Playing scene, run {} (seed {})", self.runs, seed);
    }

    pub fn scene_kind(&self) -> SceneKind {
        match self.scene {
            Scene::Start(_) => SceneKind::Start,
            Scene::Playing(_) => SceneKind::Playing,
        }
    }

    /// The current run, if playing
    pub fn session(&self) -> Option<&Session> {
        match &self.scene {
            Scene::Playing(p) => Some(&p.session),
            Scene::Start(_) => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.scene {
            Scene::Playing(p) => Some(&mut p.session),
            Scene::Start(_) => None,
        }
    }

    /// Static clouds of the start screen, if it is showing
    pub fn start_clouds(&self) -> Option<&[Cloud]> {
        match &self.scene {
            Scene::Start(s) => Some(&s.clouds),
            Scene::Playing(_) => None,
        }
    }

    /// Number of runs started so far
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Whether the running scene still reacts to jump gestures
    pub fn jump_listener_active(&self) -> bool {
        match &self.scene {
            Scene::Playing(p) => p.jump.as_ref().is_some_and(Subscription::is_active),
            Scene::Start(_) => false,
        }
    }

    /// Apply queued gesture commands, then advance the simulation by
    /// `frame_dt` seconds of wall time. Returns events from this frame.
    pub fn update(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        self.apply_commands();

        let Scene::Playing(playing) = &mut self.scene else {
            return Vec::new();
        };

        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        playing.accumulator += dt;

        let mut substeps = 0;
        while playing.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                jump: playing.jump_pending,
            };
            tick(&mut playing.session, &input, SIM_DT);
            playing.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            playing.jump_pending = false;

            if playing.session.phase == SessionPhase::GameOver {
                playing.accumulator = 0.0;
                break;
            }
        }

        // Hitting the cap means we are behind; drop the backlog instead of
        // replaying it at 8 substeps per frame later
        if substeps == MAX_SUBSTEPS {
            playing.accumulator = playing.accumulator.min(SIM_DT);
        }

        if playing.session.phase == SessionPhase::GameOver && playing.restart.is_none() {
            // Stop jumping, wait for a gesture to restart
            playing.jump = None;
            playing.restart = Some(enqueue_on_gesture(
                &self.bus,
                &self.inbox,
                SceneCommand::Restart,
                true,
            ));
        }

        playing.session.drain_events()
    }

    fn apply_commands(&mut self) {
        loop {
            let Some(command) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            let running = self.session().map(Session::is_running);
            match (command, running) {
                (SceneCommand::StartGame, None) => self.enter_playing(),
                (SceneCommand::Jump, Some(true)) => {
                    if let Scene::Playing(p) = &mut self.scene {
                        p.jump_pending = true;
                    }
                }
                (SceneCommand::Restart, Some(false)) => {
                    log::info!(
                        "Restarting after score {}",
                        self.session().map_or(0, Session::score)
                    );
                    self.enter_playing();
                }
                (command, _) => log::debug!("Ignoring stale {:?}", command),
            }
        }
    }

    /// HUD text for the current scene
    pub fn hud(&self) -> HudView {
        match &self.scene {
            Scene::Start(_) => HudView {
                score: None,
                message: Some(START_PROMPT.to_string()),
                banner: None,
            },
            Scene::Playing(p) => HudView {
                score: Some(format!("Score: {}", p.session.score())),
                message: (!p.session.is_running()).then(|| GAME_OVER_PROMPT.to_string()),
                banner: p.session.banners.last().map(|b| b.text.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Obstacle;
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;

    fn gesture() -> Gesture {
        Gesture {
            open_probability: 0.99,
            at_ms: 0.0,
        }
    }

    fn director(bus: &GestureBus) -> Director {
        Director::new(bus.clone(), GameTuning::default(), 1280.0, 720.0, 42)
    }

    /// Put an obstacle on top of the player and stop further spawns
    fn force_collision(d: &mut Director) {
        let s = d.session_mut().unwrap();
        s.last_spawn_ms = Some(0.0);
        s.spawn_interval_ms = u32::MAX;
        s.obstacles.clear();
        let id = s.next_entity_id();
        let ground_y = s.ground_y;
        s.obstacles.push(Obstacle {
            id,
            pos: Vec2::new(PLAYER_X, ground_y),
            vel_x: -400.0,
            size: Vec2::new(36.0, 64.0),
        });
    }

    #[test]
    fn test_starts_in_start_scene_with_one_listener() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        assert_eq!(d.scene_kind(), SceneKind::Start);
        assert_eq!(bus.listener_count(), 1);
        assert_eq!(d.hud().message.as_deref(), Some(START_PROMPT));
        assert!(d.start_clouds().is_some_and(|c| c.len() == CLOUD_COUNT));

        // Nothing happens without a gesture
        d.update(FRAME);
        assert_eq!(d.scene_kind(), SceneKind::Start);
    }

    #[test]
    fn test_gesture_in_start_scene_begins_fresh_run() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);

        assert_eq!(d.scene_kind(), SceneKind::Playing);
        let s = d.session().unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.difficulty.speed, 400.0);
        assert_eq!(s.scores.threshold, 100);
        // Start listener fired once and is gone; only the jump listener remains
        assert_eq!(bus.listener_count(), 1);
        assert!(d.jump_listener_active());
    }

    #[test]
    fn test_start_listener_is_one_shot() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        bus.emit(&gesture());
        d.update(0.0);
        assert_eq!(d.runs(), 1);
    }

    #[test]
    fn test_gesture_jumps_when_grounded() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);

        bus.emit(&gesture());
        let events = d.update(FRAME);
        assert!(events.contains(&GameEvent::Jumped));
        assert!(d.session().unwrap().player.vel_y < 0.0);

        // Mid-air gesture is a no-op
        let vel_before = d.session().unwrap().player.vel_y;
        bus.emit(&gesture());
        let events = d.update(SIM_DT);
        assert!(!events.contains(&GameEvent::Jumped));
        let vel_after = d.session().unwrap().player.vel_y;
        assert!(vel_after > vel_before);
    }

    #[test]
    fn test_collision_at_150_then_restart() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);

        d.session_mut().unwrap().scores.score = 150;
        force_collision(&mut d);
        let events = d.update(FRAME);
        assert!(events.contains(&GameEvent::GameOver { score: 150 }));
        assert!(!d.jump_listener_active());
        assert_eq!(d.hud().message.as_deref(), Some(GAME_OVER_PROMPT));
        // Only the restart listener is registered
        assert_eq!(bus.listener_count(), 1);

        let frozen_ticks = d.session().unwrap().time_ticks;
        d.update(FRAME);
        assert_eq!(d.session().unwrap().time_ticks, frozen_ticks);

        bus.emit(&gesture());
        d.update(0.0);
        let s = d.session().unwrap();
        assert_eq!(s.phase, SessionPhase::Running);
        assert_eq!(s.score(), 0);
        assert_eq!(s.difficulty.speed, 400.0);
        assert_eq!(s.scores.threshold, 100);
        assert!(s.obstacles.is_empty());
        assert_eq!(d.runs(), 2);
        assert!(d.jump_listener_active());
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_game_over_gesture_does_not_jump() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);
        force_collision(&mut d);
        d.update(FRAME);

        let vel = d.session().unwrap().player.vel_y;
        bus.emit(&gesture());
        // The gesture restarted the run instead of touching the old player
        let events = d.update(0.0);
        assert!(!events.contains(&GameEvent::Jumped));
        assert_eq!(vel, 0.0);
        assert_eq!(d.runs(), 2);
    }

    #[test]
    fn test_listeners_do_not_accumulate_across_restarts() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);
        for _ in 0..5 {
            force_collision(&mut d);
            d.update(FRAME);
            bus.emit(&gesture());
            d.update(0.0);
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(d.runs(), 6);
    }

    #[test]
    fn test_dropping_director_deregisters_everything() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);
        assert_eq!(bus.listener_count(), 1);
        drop(d);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_hud_shows_score_and_banner() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);
        {
            let s = d.session_mut().unwrap();
            s.scores.score = 90;
            s.escalate();
        }
        let hud = d.hud();
        assert_eq!(hud.score.as_deref(), Some("Score: 90"));
        assert_eq!(hud.banner.as_deref(), Some("SPEED UP!"));
        assert!(hud.message.is_none());
    }

    #[test]
    fn test_slow_frames_do_not_build_a_backlog() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);
        {
            let s = d.session_mut().unwrap();
            s.last_spawn_ms = Some(0.0);
            s.spawn_interval_ms = u32::MAX;
        }

        // 10 s at 10 fps: capped at 8 substeps per frame
        for _ in 0..100 {
            d.update(0.1);
        }
        let after_slow = d.session().unwrap().time_ticks;
        assert_eq!(after_slow, 800);

        // 1 s at 60 fps afterwards runs at wall speed, not a catch-up burst
        for _ in 0..60 {
            d.update(1.0 / 60.0);
        }
        let recovered = d.session().unwrap().time_ticks - after_slow;
        assert!((118..=122).contains(&recovered), "ticks: {}", recovered);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let bus = GestureBus::new();
        let mut d = director(&bus);
        bus.emit(&gesture());
        d.update(0.0);
        d.update(5.0);
        assert!(d.session().unwrap().time_ticks <= MAX_SUBSTEPS as u64);
    }
}
