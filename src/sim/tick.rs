//! Fixed timestep simulation tick
//!
//! Advances one session deterministically: clouds, spawning, physics,
//! collision, then despawn/scoring.

use super::state::{GameEvent, Session, SessionPhase};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump requested by a hand gesture
    pub jump: bool,
}

/// Advance the session by one fixed timestep (`dt` in seconds)
pub fn tick(state: &mut Session, input: &TickInput, dt: f32) {
    // Game over freezes everything, banners included
    if state.phase == SessionPhase::GameOver {
        return;
    }

    state.time_ticks += 1;
    let dt_ms = dt * 1000.0;
    state.elapsed_ms += dt_ms as f64;

    // Banners expire on their own
    for banner in &mut state.banners {
        banner.remaining_ms -= dt_ms;
    }
    state.banners.retain(|b| b.remaining_ms > 0.0);

    scroll_clouds(state, dt_ms);

    // Spawn on the first tick, then whenever the rolled interval has passed
    let due = match state.last_spawn_ms {
        None => true,
        Some(last) => state.elapsed_ms - last > state.spawn_interval_ms as f64,
    };
    if due {
        let id = state.spawn_obstacle();
        state.last_spawn_ms = Some(state.elapsed_ms);
        state.roll_spawn_interval();
        state.push_event(GameEvent::Spawned { id });
        log::debug!(
            "Spawned obstacle {} (next in {} ms)",
            id,
            state.spawn_interval_ms
        );
    }

    if input.jump {
        state.jump();
    }

    // Physics
    let gravity = state.tuning.gravity;
    let ground_y = state.ground_y;
    state.player.integrate(gravity, ground_y, dt);
    for obstacle in &mut state.obstacles {
        obstacle.pos.x += obstacle.vel_x * dt;
    }

    // Collision ends the run before anything else is scored
    let player_box = state.player.aabb();
    if state
        .obstacles
        .iter()
        .any(|o| o.aabb().overlaps(&player_box))
    {
        state.game_over();
        return;
    }

    despawn_and_score(state);
}

/// Scroll clouds left and wrap them back in on the right
fn scroll_clouds(state: &mut Session, dt_ms: f32) {
    let factor = state.tuning.cloud_scroll_factor;
    let reentry_x = state.width + CLOUD_REENTRY_MARGIN;
    for cloud in &mut state.clouds {
        cloud.pos.x -= cloud.speed * dt_ms * factor;
        if cloud.pos.x < CLOUD_WRAP_X {
            cloud.pos.x = reentry_x;
        }
    }
}

/// Remove obstacles past the left margin, scoring each one
fn despawn_and_score(state: &mut Session) {
    let passed: Vec<u32> = state
        .obstacles
        .iter()
        .filter(|o| o.pos.x < DESPAWN_X)
        .map(|o| o.id)
        .collect();
    if passed.is_empty() {
        return;
    }
    state.obstacles.retain(|o| o.pos.x >= DESPAWN_X);

    for _ in passed {
        let escalate = state.scores.award(POINTS_PER_OBSTACLE);
        let score = state.score();
        state.push_event(GameEvent::Scored { score });
        if escalate {
            state.escalate();
        }
    }
}
