//! Axis-aligned box walls and the boundary clamp
//!
//! The box spans `[-width/2, width/2]` on X, `[-height/2, height/2]` on Z and
//! starts at the floor `y = 0`. The ceiling is only enforced when the layout
//! is enclosed.

use glam::Vec3;

use super::neighbors::NeighborSearch;
use super::state::{Particle, Simulation, Wall, WallLayout};
use crate::tuning::BoundaryTuning;

/// Thickness of the side walls
const WALL_THICKNESS: f32 = 1.0;
/// Thickness of floor and ceiling slabs
const SLAB_THICKNESS: f32 = 0.1;

/// Wall boxes for the renderer and for the enforcer's extents
pub fn build_walls(width: f32, height: f32, wall_height: f32, layout: WallLayout) -> Vec<Wall> {
    let half_width = width * 0.5;
    let half_height = height * 0.5;
    let mid_y = wall_height * 0.5;

    let mut walls = Vec::with_capacity(layout.wall_count());
    // Front and back
    walls.push(Wall::new(
        Vec3::new(0.0, mid_y, -half_height),
        Vec3::new(width, wall_height, WALL_THICKNESS),
    ));
    walls.push(Wall::new(
        Vec3::new(0.0, mid_y, half_height),
        Vec3::new(width, wall_height, WALL_THICKNESS),
    ));
    // Left and right
    walls.push(Wall::new(
        Vec3::new(-half_width, mid_y, 0.0),
        Vec3::new(WALL_THICKNESS, wall_height, height),
    ));
    walls.push(Wall::new(
        Vec3::new(half_width, mid_y, 0.0),
        Vec3::new(WALL_THICKNESS, wall_height, height),
    ));

    if layout == WallLayout::Enclosed {
        walls.push(Wall::new(Vec3::ZERO, Vec3::new(width, SLAB_THICKNESS, height)));
        walls.push(Wall::new(
            Vec3::new(0.0, wall_height, 0.0),
            Vec3::new(width, SLAB_THICKNESS, height),
        ));
    }
    walls
}

/// Interior extents of the box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub half_width: f32,
    pub half_height: f32,
    /// `None` for an open top
    pub ceiling: Option<f32>,
}

/// Clamp one axis against `[min, max]` using the particle radius; returns
/// true if the particle hit a wall
#[inline]
fn clamp_axis(pos: &mut f32, vel: &mut f32, radius: f32, min: f32, max: Option<f32>, restitution: f32) -> bool {
    if *pos - radius < min {
        *pos = min + radius;
        *vel = -*vel * restitution;
        return true;
    }
    match max {
        Some(max) if *pos + radius > max => {
            *pos = max - radius;
            *vel = -*vel * restitution;
            true
        }
        _ => false,
    }
}

/// Clamp a single particle inside `bounds`, reflecting and scaling the
/// velocity component of every wall it crossed
pub fn enforce_particle(p: &mut Particle, bounds: &Bounds, tuning: &BoundaryTuning) -> bool {
    let r = p.radius;
    let hit_x = clamp_axis(
        &mut p.position.x,
        &mut p.velocity.x,
        r,
        -bounds.half_width,
        Some(bounds.half_width),
        tuning.side_restitution,
    );
    let hit_z = clamp_axis(
        &mut p.position.z,
        &mut p.velocity.z,
        r,
        -bounds.half_height,
        Some(bounds.half_height),
        tuning.side_restitution,
    );
    let hit_y = clamp_axis(
        &mut p.position.y,
        &mut p.velocity.y,
        r,
        0.0,
        bounds.ceiling,
        tuning.floor_restitution,
    );
    hit_x || hit_z || hit_y
}

/// Final corrective pass of the tick
pub fn enforce_boundaries<S: NeighborSearch>(sim: &mut Simulation<S>) {
    let bounds = Bounds {
        half_width: sim.width * 0.5,
        half_height: sim.height * 0.5,
        ceiling: (sim.layout == WallLayout::Enclosed).then_some(sim.wall_height),
    };
    let tuning = &sim.tuning.boundary;
    for p in sim.particles.iter_mut() {
        enforce_particle(p, &bounds, tuning);
    }
}
