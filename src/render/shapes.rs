//! Geometry for particles and walls

use glam::Vec3;

use super::vertex::{ParticleVertex, WallVertex};
use crate::sim::{Particle, Wall};

/// Pixels of point size per unit of particle radius
pub const DEFAULT_POINT_SCALE: f32 = 60.0;

/// One vertex per particle; point size is `radius * point_scale`
pub fn particle_vertices(particles: &[Particle], point_scale: f32) -> Vec<ParticleVertex> {
    particles
        .iter()
        .map(|p| ParticleVertex::new(p.position.to_array(), p.color.to_array(), p.radius * point_scale))
        .collect()
}

/// Face normals in draw order: back, front, left, right, bottom, top
const FACE_NORMALS: [Vec3; 6] = [
    Vec3::NEG_Z,
    Vec3::Z,
    Vec3::NEG_X,
    Vec3::X,
    Vec3::NEG_Y,
    Vec3::Y,
];

/// Unit cube centered on the origin, 4 vertices and 2 triangles per face.
/// Position and scale come from [`Wall::model_matrix`], so the mesh is the
/// same for every wall.
pub fn wall_mesh(_wall: &Wall) -> (Vec<WallVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for normal in FACE_NORMALS {
        // Two in-plane axes spanning the face
        let (u, v) = if normal.x != 0.0 {
            (Vec3::Z, Vec3::Y)
        } else if normal.y != 0.0 {
            (Vec3::X, Vec3::Z)
        } else {
            (Vec3::X, Vec3::Y)
        };
        let center = normal * 0.5;
        let base = vertices.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let pos = center + u * su + v * sv;
            vertices.push(WallVertex::new(pos.to_array(), normal.to_array()));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    (vertices, indices)
}
