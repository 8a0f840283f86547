//! Difficulty ramp and score thresholds
//!
//! Every time the score reaches the current threshold the obstacles speed up
//! and spawn closer together, and the threshold moves up by a fixed step.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::tuning::GameTuning;

/// Obstacle speed and spawn interval range for the current session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Leftward obstacle speed (px/s)
    pub speed: f32,
    pub spawn_min_ms: u32,
    pub spawn_max_ms: u32,
    /// Escalations applied so far
    pub level: u32,
}

impl Difficulty {
    pub fn new(tuning: &GameTuning) -> Self {
        Self {
            speed: tuning.initial_speed,
            spawn_min_ms: tuning.initial_spawn_min_ms,
            spawn_max_ms: tuning.initial_spawn_max_ms,
            level: 0,
        }
    }

    /// Difficulty after `n` escalations from a fresh session
    pub fn after_escalations(tuning: &GameTuning, n: u32) -> Self {
        let mut d = Self::new(tuning);
        for _ in 0..n {
            d.escalate(tuning);
        }
        d
    }

    /// Speed up and tighten the spawn range, clamped at the floors
    pub fn escalate(&mut self, tuning: &GameTuning) {
        self.speed += tuning.speed_step;
        self.spawn_min_ms = self
            .spawn_min_ms
            .saturating_sub(tuning.spawn_step_ms)
            .max(tuning.spawn_min_floor_ms);
        self.spawn_max_ms = self
            .spawn_max_ms
            .saturating_sub(tuning.spawn_step_ms)
            .max(tuning.spawn_max_floor_ms);
        self.level += 1;
    }

    /// Range the next spawn interval is drawn from
    pub fn spawn_range(&self) -> RangeInclusive<u32> {
        self.spawn_min_ms..=self.spawn_max_ms.max(self.spawn_min_ms)
    }

    /// Obstacle x velocity (negative, screen space)
    pub fn obstacle_velocity(&self) -> f32 {
        -self.speed
    }
}

/// Running score plus the next threshold that triggers an escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    pub score: u64,
    pub threshold: u64,
    step: u64,
}

impl ScoreKeeper {
    pub fn new(step: u64) -> Self {
        Self {
            score: 0,
            threshold: step,
            step,
        }
    }

    /// Add points; returns true if the threshold was reached (and raised)
    pub fn award(&mut self, points: u64) -> bool {
        self.score += points;
        if self.score >= self.threshold {
            self.threshold += self.step;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_difficulty() {
        let d = Difficulty::new(&GameTuning::default());
        assert_eq!(d.speed, 400.0);
        assert_eq!(d.spawn_range(), 1800..=2400);
        assert_eq!(d.obstacle_velocity(), -400.0);
    }

    #[test]
    fn test_escalation_step() {
        let t = GameTuning::default();
        let mut d = Difficulty::new(&t);
        d.escalate(&t);
        assert_eq!(d.speed, 450.0);
        assert_eq!(d.spawn_range(), 1700..=2300);
        assert_eq!(d.level, 1);
    }

    #[test]
    fn test_floors_reached_at_different_levels() {
        let t = GameTuning::default();
        // min hits 1200 after 6 escalations, max hits 1600 after 8
        assert_eq!(Difficulty::after_escalations(&t, 6).spawn_range(), 1200..=1800);
        assert_eq!(Difficulty::after_escalations(&t, 8).spawn_range(), 1200..=1600);
        assert_eq!(Difficulty::after_escalations(&t, 50).spawn_range(), 1200..=1600);
    }

    #[test]
    fn test_thresholds_fire_once_each() {
        let mut keeper = ScoreKeeper::new(100);
        let fired_at: Vec<u64> = (0..35)
            .filter_map(|_| keeper.award(10).then_some(keeper.score))
            .collect();
        assert_eq!(fired_at, vec![100, 200, 300]);
        assert_eq!(keeper.threshold, 400);
        assert_eq!(keeper.score, 350);
    }

    proptest! {
        #[test]
        fn prop_spawn_range_after_n(n in 0u32..100) {
            let t = GameTuning::default();
            let d = Difficulty::after_escalations(&t, n);
            let expect_min = (1800i64 - 100 * n as i64).max(1200) as u32;
            let expect_max = (2400i64 - 100 * n as i64).max(1600) as u32;
            prop_assert_eq!(d.spawn_min_ms, expect_min);
            prop_assert_eq!(d.spawn_max_ms, expect_max);
            prop_assert_eq!(d.speed, 400.0 + 50.0 * n as f32);
        }

        #[test]
        fn prop_difficulty_never_eases(n in 0u32..60) {
            let t = GameTuning::default();
            let a = Difficulty::after_escalations(&t, n);
            let b = Difficulty::after_escalations(&t, n + 1);
            prop_assert!(b.speed > a.speed);
            prop_assert!(b.spawn_min_ms <= a.spawn_min_ms);
            prop_assert!(b.spawn_max_ms <= a.spawn_max_ms);
        }
    }
}
