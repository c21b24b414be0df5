//! Smoothed density, pressure and viscosity
//!
//! Two-stage: collect the neighbor set once with [`compute_neighbors`], then
//! feed the same set to [`compute_pressure`] and [`compute_viscosity`].

use glam::Vec3;

use super::DISTANCE_EPSILON;
use super::forces::color_similarity;
use super::neighbors::NeighborSearch;
use super::state::Particle;
use crate::tuning::FluidTuning;

/// Linear falloff: 1 at zero distance, 0 at the smoothing radius
#[inline]
pub fn influence(dist: f32, smoothing_radius: f32) -> f32 {
    if smoothing_radius <= 0.0 {
        return 0.0;
    }
    (1.0 - dist / smoothing_radius).max(0.0)
}

/// Indices of the particles within the smoothing radius of `index`
pub fn compute_neighbors<S: NeighborSearch>(
    search: &S,
    particles: &[Particle],
    index: usize,
    smoothing_radius: f32,
) -> Vec<usize> {
    let mut out = Vec::new();
    search.neighbors_within(particles, index, smoothing_radius, &mut out);
    out
}

/// Own mass plus color-weighted, squared-influence neighbor mass
pub fn compute_density(
    particles: &[Particle],
    index: usize,
    neighbors: &[usize],
    tuning: &FluidTuning,
    color_threshold: f32,
) -> f32 {
    let me = &particles[index];
    neighbors.iter().fold(me.mass, |density, &j| {
        let other = &particles[j];
        let w = influence(me.position.distance(other.position), tuning.smoothing_radius);
        density + other.mass * w * w * color_similarity(me.color, other.color, color_threshold)
    })
}

/// Pressure relative to rest density; negative means rarefaction
#[inline]
pub fn pressure_from_density(density: f32, tuning: &FluidTuning) -> f32 {
    tuning.pressure_constant * (density - tuning.rest_density)
}

/// Pressure force along the outward normal of every neighbor
pub fn compute_pressure(
    particles: &[Particle],
    index: usize,
    neighbors: &[usize],
    tuning: &FluidTuning,
    color_threshold: f32,
) -> Vec3 {
    let density = compute_density(particles, index, neighbors, tuning, color_threshold);
    let pressure = pressure_from_density(density, tuning);
    let me = &particles[index];

    let mut force = Vec3::ZERO;
    for &j in neighbors {
        let other = &particles[j];
        let diff = me.position - other.position;
        let dist = diff.length();
        if dist <= DISTANCE_EPSILON {
            continue;
        }
        let w = influence(dist, tuning.smoothing_radius);
        let similarity = color_similarity(me.color, other.color, color_threshold);
        force += (diff / dist) * pressure * w * similarity;
    }
    force
}

/// Viscous pull toward the neighbors' velocities
pub fn compute_viscosity(particles: &[Particle], index: usize, neighbors: &[usize], tuning: &FluidTuning) -> Vec3 {
    let me = &particles[index];

    let mut force = Vec3::ZERO;
    for &j in neighbors {
        let other = &particles[j];
        let dist = me.position.distance(other.position);
        if dist <= DISTANCE_EPSILON {
            continue;
        }
        let w = influence(dist, tuning.smoothing_radius);
        force += (other.velocity - me.velocity) * tuning.viscosity_constant * w;
    }
    force
}
