//! Fixed timestep simulation tick
//!
//! Stage order: centroids, forces, integration, colors, waves, collisions,
//! boundaries. Boundaries run last so the next tick starts from corrected
//! positions.

use super::boundary::enforce_boundaries;
use super::centroid::update_centroids;
use super::collision::resolve_collisions;
use super::color::update_colors;
use super::forces::apply_forces;
use super::neighbors::NeighborSearch;
use super::state::{Particle, Simulation};
use super::wave::advance_waves;

/// `position += velocity * dt`
pub fn integrate_positions(particles: &mut [Particle], dt: f32) {
    for p in particles.iter_mut() {
        p.position += p.velocity * dt;
    }
}

/// Advance the simulation by exactly `dt` seconds
///
/// A zero `dt` still runs every velocity-affecting stage but moves nothing:
/// integration yields no displacement and the positional corrective passes
/// are skipped. Negative or non-finite steps are ignored.
pub fn tick<S: NeighborSearch>(sim: &mut Simulation<S>, dt: f32) {
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Ignoring update with invalid dt {dt}");
        return;
    }

    update_centroids(sim, dt);
    apply_forces(sim, dt);
    integrate_positions(&mut sim.particles, dt);
    update_colors(sim, dt);
    advance_waves(&mut sim.particles, dt, &sim.tuning.wave);

    if dt > 0.0 {
        resolve_collisions(sim);
        enforce_boundaries(sim);
    }

    sim.time += dt;
    sim.ticks += 1;
}
