//! Shape generation for 2D primitives
//!
//! All shapes are emitted in screen pixels (origin top-left, y down) as
//! triangle lists; the pipeline maps them to clip space.

use glam::Vec2;

use super::vertex::Vertex;
use crate::sim::{Aabb, Cloud};

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Filled rectangle covering a bounding box
pub fn aabb(bounds: &Aabb, color: [f32; 4]) -> Vec<Vertex> {
    rect(bounds.min, bounds.max, color)
}

/// Rectangle rotated by `angle_deg` around its centre
pub fn rotated_rect(center: Vec2, size: Vec2, angle_deg: f32, color: [f32; 4]) -> Vec<Vertex> {
    let rot = Vec2::from_angle(angle_deg.to_radians());
    let half = size * 0.5;
    let corner = |x: f32, y: f32| {
        let p = center + rot.rotate(Vec2::new(x, y));
        Vertex::new(p.x, p.y, color)
    };

    let tl = corner(-half.x, -half.y);
    let tr = corner(half.x, -half.y);
    let bl = corner(-half.x, half.y);
    let br = corner(half.x, half.y);
    vec![tl, tr, bl, bl, tr, br]
}

/// A cloud drawn as a (possibly tilted) rounded-looking rectangle pair
pub fn cloud(cloud: &Cloud, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = rotated_rect(cloud.pos, cloud.size, cloud.angle, color);
    // Small puff on top so clouds read as clouds, not bricks
    let puff_size = Vec2::new(cloud.size.x * 0.5, cloud.size.y * 0.6);
    let puff_center = cloud.pos - Vec2::new(0.0, cloud.size.y * 0.45);
    vertices.extend(rotated_rect(puff_center, puff_size, cloud.angle, color));
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_two_triangles() {
        let v = rect(Vec2::ZERO, Vec2::new(10.0, 5.0), [1.0; 4]);
        assert_eq!(v.len(), 6);
        assert!(v.iter().all(|v| (0.0..=10.0).contains(&v.position[0])));
        assert!(v.iter().all(|v| (0.0..=5.0).contains(&v.position[1])));
    }

    #[test]
    fn test_unrotated_rect_matches_axis_aligned() {
        let v = rotated_rect(Vec2::new(5.0, 5.0), Vec2::new(10.0, 4.0), 0.0, [1.0; 4]);
        assert!((v[0].position[0] - 0.0).abs() < 1e-5);
        assert!((v[0].position[1] - 3.0).abs() < 1e-5);
        assert!((v[5].position[0] - 10.0).abs() < 1e-5);
        assert!((v[5].position[1] - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_keeps_center() {
        let center = Vec2::new(100.0, 50.0);
        let v = rotated_rect(center, Vec2::new(40.0, 20.0), 3.0, [1.0; 4]);
        // Opposite corners of the first triangle pair straddle the centre
        let mid = (Vec2::from(v[0].position) + Vec2::from(v[5].position)) * 0.5;
        assert!((mid - center).length() < 1e-3);
    }
}
