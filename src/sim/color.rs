//! Color dynamics: neighborhood census, takeover and blending

use glam::Vec3;

use super::centroid::GroupCentroid;
use super::forces::{color_distance, nearest_centroid_by_color};
use super::neighbors::NeighborSearch;
use super::state::{Particle, Simulation};
use crate::tuning::ColorTuning;

/// Outcome of the census for one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorDecision {
    /// Outnumbered by another group: adopt its color fast
    Takeover { color: Vec3 },
    /// Near a same-colored centroid: keep leaning toward it
    Reinforce { color: Vec3 },
    /// Leave the target untouched
    Keep,
}

/// Count neighbors per centroid bucket. Neighbors whose color is not close
/// to any centroid are ignored. Returns the per-bucket counts and the total.
pub fn census(
    colors: &[Vec3],
    neighbors: &[usize],
    centroids: &[GroupCentroid],
    bucket_threshold: f32,
) -> (Vec<usize>, usize) {
    let mut buckets = vec![0usize; centroids.len()];
    let mut total = 0;
    for &j in neighbors {
        let color = colors[j];
        let Some(k) = nearest_centroid_by_color(centroids, color) else {
            continue;
        };
        if color_distance(color, centroids[k].color) < bucket_threshold {
            buckets[k] += 1;
            total += 1;
        }
    }
    (buckets, total)
}

/// Decide how a particle's target color should change this tick
pub fn decide(
    particle: &Particle,
    buckets: &[usize],
    total: usize,
    centroids: &[GroupCentroid],
    tuning: &ColorTuning,
) -> ColorDecision {
    if total >= tuning.min_neighbors && total > 0 {
        let dominant = buckets
            .iter()
            .enumerate()
            .max_by_key(|&(_, &n)| n)
            .filter(|&(_, &n)| n as f32 / total as f32 > tuning.dominance_ratio);
        if let Some((k, _)) = dominant {
            let color = centroids[k].color;
            if color_distance(particle.color, color) > tuning.takeover_delta {
                return ColorDecision::Takeover { color };
            }
        }
    }

    let same_colored = centroids.iter().find(|c| {
        c.position.distance(particle.position) < tuning.reinforce_distance
            && color_distance(c.color, particle.color) < tuning.reinforce_threshold
    });
    match same_colored {
        Some(c) => ColorDecision::Reinforce { color: c.color },
        None => ColorDecision::Keep,
    }
}

/// `color += (target - color) * speed * dt`, optionally clamped to [0, 1]
pub fn blend_color(particle: &mut Particle, dt: f32, clamp_channels: bool) {
    let t = (particle.color_transition_speed * dt).min(1.0);
    particle.color += (particle.target_color - particle.color) * t;
    if clamp_channels {
        particle.color = particle.color.clamp(Vec3::ZERO, Vec3::ONE);
    }
}

/// Run the census over every particle, then blend colors
pub fn update_colors<S: NeighborSearch>(sim: &mut Simulation<S>, dt: f32) {
    let tuning = &sim.tuning.color;
    let base_speed = sim.tuning.particle.color_transition_speed;
    // Census reads colors as they were at the start of the pass
    let colors: Vec<Vec3> = sim.particles.iter().map(|p| p.color).collect();
    let mut neighbors = Vec::new();
    let mut takeovers = 0usize;

    for i in 0..sim.particles.len() {
        sim.search
            .neighbors_within(&sim.particles, i, tuning.takeover_radius, &mut neighbors);
        let (buckets, total) = census(&colors, &neighbors, &sim.centroids, tuning.bucket_threshold);
        let decision = decide(&sim.particles[i], &buckets, total, &sim.centroids, tuning);

        let particle = &mut sim.particles[i];
        match decision {
            ColorDecision::Takeover { color } => {
                particle.target_color = color;
                particle.color_transition_speed = tuning.takeover_speed;
                takeovers += 1;
            }
            ColorDecision::Reinforce { color } => {
                particle.target_color = color;
                particle.color_transition_speed = base_speed;
            }
            ColorDecision::Keep => {}
        }
        blend_color(particle, dt, tuning.clamp_channels);
    }

    if takeovers > 0 {
        log::debug!("{takeovers} color takeovers");
    }
}
