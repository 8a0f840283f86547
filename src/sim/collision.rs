//! Axis-aligned collision for the runner
//!
//! Everything in the world is a box standing on its bottom edge, so a
//! bottom-centre anchor plus a size is all the geometry we need.

use glam::Vec2;

/// Axis-aligned bounding box in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box whose bottom edge is centred on `anchor`
    pub fn from_bottom_center(anchor: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(anchor.x - size.x / 2.0, anchor.y - size.y),
            max: Vec2::new(anchor.x + size.x / 2.0, anchor.y),
        }
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Whether a body whose bottom is at `bottom_y` rests on the ground line.
/// A body moving upward is never resting, even at ground level.
pub fn resting_on_ground(bottom_y: f32, vel_y: f32, ground_y: f32) -> bool {
    bottom_y >= ground_y && vel_y >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bottom_center() {
        let b = Aabb::from_bottom_center(Vec2::new(100.0, 500.0), Vec2::new(40.0, 60.0));
        assert_eq!(b.min, Vec2::new(80.0, 440.0));
        assert_eq!(b.max, Vec2::new(120.0, 500.0));
        assert_eq!(b.size(), Vec2::new(40.0, 60.0));
        assert_eq!(b.center(), Vec2::new(100.0, 470.0));
    }

    #[test]
    fn test_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::new(Vec2::splat(5.0), Vec2::splat(15.0));
        let c = Aabb::new(Vec2::new(20.0, 0.0), Vec2::new(30.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_player_clearing_obstacle_from_above() {
        let obstacle = Aabb::from_bottom_center(Vec2::new(150.0, 600.0), Vec2::new(36.0, 64.0));
        let player = Aabb::from_bottom_center(Vec2::new(150.0, 530.0), Vec2::new(48.0, 52.0));
        assert!(!player.overlaps(&obstacle));
    }

    #[test]
    fn test_resting_on_ground() {
        assert!(resting_on_ground(600.0, 0.0, 600.0));
        assert!(!resting_on_ground(600.0, -750.0, 600.0));
        assert!(!resting_on_ground(550.0, 100.0, 600.0));
    }
}
