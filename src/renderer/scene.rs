//! Build the frame's vertex list from the director's current scene

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::GROUND_HEIGHT;
use crate::director::Director;
use crate::sim::{Player, Session};

/// Vertices for the whole frame, back to front
pub fn build_frame(director: &Director) -> Vec<Vertex> {
    let width = director.width();
    let height = director.height();
    let mut vertices = Vec::with_capacity(256);

    vertices.extend(shapes::rect(Vec2::ZERO, Vec2::new(width, height), colors::SKY));

    if let Some(clouds) = director.start_clouds() {
        for cloud in clouds {
            vertices.extend(shapes::cloud(cloud, colors::CLOUD));
        }
    }

    if let Some(session) = director.session() {
        session_vertices(session, &mut vertices);
    }

    vertices
}

fn session_vertices(session: &Session, vertices: &mut Vec<Vertex>) {
    for cloud in &session.clouds {
        vertices.extend(shapes::cloud(cloud, colors::CLOUD));
    }

    vertices.extend(shapes::rect(
        Vec2::new(0.0, session.ground_y),
        Vec2::new(session.width, session.ground_y + GROUND_HEIGHT),
        colors::GROUND,
    ));

    for obstacle in &session.obstacles {
        vertices.extend(shapes::aabb(&obstacle.aabb(), colors::OBSTACLE));
    }

    player_vertices(&session.player, vertices);

    if !session.is_running() {
        vertices.extend(shapes::rect(
            Vec2::ZERO,
            Vec2::new(session.width, session.height),
            colors::GAME_OVER_SHADE,
        ));
    }
}

fn player_vertices(player: &Player, vertices: &mut Vec<Vertex>) {
    let body = player.aabb();
    vertices.extend(shapes::aabb(&body, colors::PLAYER));

    let eye = Vec2::splat(player.size.x * 0.15);
    let eye_min = Vec2::new(body.max.x - eye.x * 2.0, body.min.y + eye.y);
    vertices.extend(shapes::rect(eye_min, eye_min + eye, colors::PLAYER_EYE));
}
