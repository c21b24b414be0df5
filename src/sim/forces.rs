//! Force field: gravity, boid rules, centroid attraction, fluid terms
//!
//! Forces for particle `i` are accumulated and folded into its velocity
//! before `i + 1` is visited, so later particles see updated velocities.

use glam::Vec3;
use rand::Rng;

use super::DISTANCE_EPSILON;
use super::centroid::GroupCentroid;
use super::fluid;
use super::neighbors::NeighborSearch;
use super::state::{Particle, Simulation};
use super::wave;
use crate::tuning::ForceTuning;

/// Euclidean distance between two colors
#[inline]
pub fn color_distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// `max(0, 1 - distance / threshold)`: 1 for identical colors, 0 at or
/// beyond the threshold
#[inline]
pub fn color_similarity(a: Vec3, b: Vec3, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - color_distance(a, b) / threshold).max(0.0)
}

/// Accumulated boid contribution for one particle
#[derive(Debug, Clone, Copy, Default)]
pub struct BoidForces {
    pub force: Vec3,
    /// Sum of color similarity over neighbors; large values mean the
    /// particle sits inside a same-colored mass
    pub same_color_weight: f32,
}

/// Separation, alignment and cohesion over `neighbors`
pub fn boid_forces(particles: &[Particle], index: usize, neighbors: &[usize], tuning: &ForceTuning) -> BoidForces {
    let me = &particles[index];
    let mut force = Vec3::ZERO;

    let mut align_sum = Vec3::ZERO;
    let mut align_weight = 0.0;
    let mut cohesion_sum = Vec3::ZERO;
    let mut cohesion_weight = 0.0;

    for &j in neighbors {
        let other = &particles[j];
        let diff = me.position - other.position;
        let dist = diff.length();
        if dist < DISTANCE_EPSILON {
            continue;
        }
        let similarity = color_similarity(me.color, other.color, tuning.color_threshold);

        let min_sep = me.radius + other.radius + tuning.separation_margin;
        if dist < min_sep {
            let push = (min_sep - dist) / min_sep;
            let boost = 1.0 + (1.0 - similarity) * tuning.separation_color_boost;
            force += (diff / dist) * push * tuning.separation_strength * boost;
        }

        if similarity > 0.0 {
            let w = similarity * (other.mass / me.mass);
            align_sum += other.velocity * w;
            align_weight += w;

            cohesion_sum += other.position * similarity;
            cohesion_weight += similarity;
        }
    }

    if align_weight > 0.0 {
        force += (align_sum / align_weight - me.velocity) * tuning.alignment_strength;
    }
    if cohesion_weight > 0.0 {
        force += (cohesion_sum / cohesion_weight - me.position) * tuning.cohesion_strength;
    }

    BoidForces {
        force,
        same_color_weight: cohesion_weight,
    }
}

/// Index of the centroid whose color is closest to `color`
pub fn nearest_centroid_by_color(centroids: &[GroupCentroid], color: Vec3) -> Option<usize> {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            color_distance(a.color, color).total_cmp(&color_distance(b.color, color))
        })
        .map(|(k, _)| k)
}

/// Pull toward the color-matching centroid, stronger with distance (capped)
/// and with color match
pub fn centroid_attraction(particle: &Particle, centroids: &[GroupCentroid], tuning: &ForceTuning) -> Vec3 {
    let Some(k) = nearest_centroid_by_color(centroids, particle.color) else {
        return Vec3::ZERO;
    };
    let centroid = &centroids[k];
    let to_centroid = centroid.position - particle.position;
    let dist = to_centroid.length();
    if dist < DISTANCE_EPSILON {
        return Vec3::ZERO;
    }
    let color_match = color_similarity(particle.color, centroid.color, tuning.color_threshold);
    let magnitude = (dist * tuning.centroid_attraction).min(tuning.centroid_attraction_max) * color_match;
    (to_centroid / dist) * magnitude
}

/// `v += force * dt / mass`, damp, then cap the speed
pub fn integrate_velocity(particle: &mut Particle, force: Vec3, dt: f32, damping: f32, max_speed: f32) {
    particle.velocity += force * dt / particle.mass;
    particle.velocity *= damping;
    particle.velocity = particle.velocity.clamp_length_max(max_speed);
}

/// Run the force field over every particle
pub fn apply_forces<S: NeighborSearch>(sim: &mut Simulation<S>, dt: f32) {
    let ft = &sim.tuning.force;
    let fluid_tuning = &sim.tuning.fluid;
    let mut neighbors = Vec::new();
    let mut merges = 0usize;

    for i in 0..sim.particles.len() {
        sim.search
            .neighbors_within(&sim.particles, i, ft.interaction_radius, &mut neighbors);
        let boids = boid_forces(&sim.particles, i, &neighbors, ft);
        let attraction = centroid_attraction(&sim.particles[i], &sim.centroids, ft);

        let fluid_neighbors = fluid::compute_neighbors(&sim.search, &sim.particles, i, fluid_tuning.smoothing_radius);
        let pressure = fluid::compute_pressure(&sim.particles, i, &fluid_neighbors, fluid_tuning, ft.color_threshold);
        let viscosity = fluid::compute_viscosity(&sim.particles, i, &fluid_neighbors, fluid_tuning);

        let jitter = Vec3::new(
            sim.rng.random_range(-1.0..=1.0),
            sim.rng.random_range(-1.0..=1.0),
            sim.rng.random_range(-1.0..=1.0),
        ) * ft.jitter;

        let particle = &mut sim.particles[i];
        // Gravity acts along Y only
        let force = Vec3::new(0.0, sim.gravity.y * particle.mass, 0.0)
            + boids.force
            + attraction
            + (pressure + viscosity) * fluid_tuning.pressure_weight
            + jitter;
        integrate_velocity(particle, force, dt, sim.damping, ft.max_speed);

        if boids.same_color_weight > ft.merge_threshold && sim.rng.random::<f32>() < ft.merge_wave_probability {
            wave::propagate_wave(&mut sim.particles, &sim.search, &sim.tuning.wave, i, ft.merge_wave_intensity);
            merges += 1;
        }
    }

    if merges > 0 {
        log::debug!("{merges} merge waves triggered");
    }
}
