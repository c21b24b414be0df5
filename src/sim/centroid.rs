//! Group centroids: one autonomous attractor per color group
//!
//! Centroids are never rendered. They wander on smooth pseudo-noise, stay
//! loosely inside the box, relax their colors toward nearby centroids and
//! occasionally emit a wave through a same-colored particle.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::forces::color_similarity;
use super::neighbors::NeighborSearch;
use super::state::Simulation;
use super::wave;
use crate::tuning::CentroidTuning;

/// Autonomous center of identity for one color group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupCentroid {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
    /// Fixed offset that desynchronizes this centroid's motion
    pub phase: f32,
}

impl GroupCentroid {
    pub fn new(position: Vec3, color: Vec3, phase: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            color,
            phase,
        }
    }

    /// Noise-driven velocity target at time `t`
    pub fn wander_target(&self, t: f32, wander_speed: f32) -> Vec3 {
        let p = self.phase;
        Vec3::new(
            (t * 0.5 + p).sin() * 0.6 + (t * 0.23 + p * 1.7).cos() * 0.4,
            (t * 0.31 + p * 0.5).sin() * 0.3,
            (t * 0.41 + p).cos() * 0.6 + (t * 0.17 + p * 2.3).sin() * 0.4,
        ) * wander_speed
    }

    /// Advance velocity and position by one tick
    pub fn step(&mut self, t: f32, dt: f32, tuning: &CentroidTuning) {
        let target = self.wander_target(t, tuning.wander_speed);
        let blend = (dt * tuning.velocity_smoothing).min(1.0);
        self.velocity += (target - self.velocity) * blend;

        // Soft radial containment on the XZ plane
        let planar = Vec2::new(self.position.x, self.position.z);
        let planar_dist = planar.length();
        if planar_dist > tuning.containment_radius {
            let inward = -planar / planar_dist;
            let excess = planar_dist - tuning.containment_radius;
            let correction = inward * excess * tuning.containment_strength * dt;
            self.velocity.x += correction.x;
            self.velocity.z += correction.y;
        }

        // Soft vertical band
        if self.position.y < tuning.min_height {
            self.velocity.y += (tuning.min_height - self.position.y) * tuning.vertical_strength * dt;
        } else if self.position.y > tuning.max_height {
            self.velocity.y -= (self.position.y - tuning.max_height) * tuning.vertical_strength * dt;
        }

        self.position += self.velocity * dt;
    }

    /// Pulse oscillator; a wave may fire while it sits above the threshold
    pub fn pulse(&self, t: f32, frequency: f32) -> f32 {
        (t * frequency + self.phase * 3.0).sin()
    }
}

/// Blend every centroid's color with its neighbors, weighted by proximity.
/// Reads from a snapshot so the result does not depend on visiting order.
pub fn blend_colors(centroids: &mut [GroupCentroid], dt: f32, tuning: &CentroidTuning) {
    if tuning.color_blend_distance <= 0.0 {
        return;
    }
    let snapshot: Vec<(Vec3, Vec3)> = centroids.iter().map(|c| (c.position, c.color)).collect();

    for (k, centroid) in centroids.iter_mut().enumerate() {
        let mut delta = Vec3::ZERO;
        let mut total_weight = 0.0_f32;
        for (m, &(position, color)) in snapshot.iter().enumerate() {
            if m == k {
                continue;
            }
            let dist = snapshot[k].0.distance(position);
            if dist < tuning.color_blend_distance {
                let w = 1.0 - dist / tuning.color_blend_distance;
                delta += (color - snapshot[k].1) * w;
                total_weight += w;
            }
        }
        // Keep the result a convex mix of existing colors
        let rate = (tuning.color_blend_rate * dt).min(1.0 / total_weight.max(1.0));
        centroid.color = snapshot[k].1 + delta * rate;
    }
}

/// Move centroids, drift their colors, and fire pulse waves
pub fn update_centroids<S: NeighborSearch>(sim: &mut Simulation<S>, dt: f32) {
    let tuning = &sim.tuning.centroid;
    let t = sim.time;

    for centroid in sim.centroids.iter_mut() {
        centroid.step(t, dt, tuning);
    }
    blend_colors(&mut sim.centroids, dt, tuning);

    let mut pulses = 0usize;
    let mut candidates = Vec::new();
    for k in 0..sim.centroids.len() {
        let centroid = sim.centroids[k];
        if centroid.pulse(t, tuning.pulse_frequency) <= tuning.pulse_threshold {
            continue;
        }
        if sim.rng.random::<f32>() >= tuning.pulse_probability {
            continue;
        }
        sim.search
            .neighbors_of_point(&sim.particles, centroid.position, tuning.pulse_search_radius, &mut candidates);
        let source = candidates
            .iter()
            .copied()
            .filter(|&i| {
                color_similarity(sim.particles[i].color, centroid.color, sim.tuning.wave.color_threshold)
                    > tuning.pulse_similarity
            })
            .min_by(|&a, &b| {
                let da = sim.particles[a].position.distance_squared(centroid.position);
                let db = sim.particles[b].position.distance_squared(centroid.position);
                da.total_cmp(&db)
            });

        if let Some(i) = source {
            wave::propagate_wave(&mut sim.particles, &sim.search, &sim.tuning.wave, i, tuning.pulse_intensity);
            pulses += 1;
        }
    }

    if pulses > 0 {
        log::debug!("{pulses} centroid pulses at t={t:.2}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_blends_toward_target() {
        let tuning = CentroidTuning::default();
        let mut c = GroupCentroid::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE, 0.3);
        let target = c.wander_target(0.0, tuning.wander_speed);
        c.step(0.0, 0.1, &tuning);
        let expected = target * (0.1 * tuning.velocity_smoothing);
        assert!((c.velocity - expected).length() < 1e-5);
    }

    #[test]
    fn test_radial_containment_pulls_inward() {
        let tuning = CentroidTuning {
            wander_speed: 0.0,
            ..CentroidTuning::default()
        };
        let mut c = GroupCentroid::new(Vec3::new(40.0, 5.0, 0.0), Vec3::ONE, 0.0);
        c.step(0.0, 0.1, &tuning);
        assert!(c.velocity.x < 0.0);
        assert_eq!(c.velocity.z, 0.0);
    }

    #[test]
    fn test_vertical_band() {
        let tuning = CentroidTuning {
            wander_speed: 0.0,
            ..CentroidTuning::default()
        };
        let mut low = GroupCentroid::new(Vec3::new(0.0, 0.0, 0.0), Vec3::ONE, 0.0);
        low.step(0.0, 0.1, &tuning);
        assert!(low.velocity.y > 0.0);

        let mut high = GroupCentroid::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ONE, 0.0);
        high.step(0.0, 0.1, &tuning);
        assert!(high.velocity.y < 0.0);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let tuning = CentroidTuning::default();
        let mut c = GroupCentroid::new(Vec3::new(3.0, 4.0, 5.0), Vec3::ONE, 1.0);
        c.step(2.0, 0.0, &tuning);
        assert_eq!(c.position, Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_nearby_centroid_colors_converge() {
        let tuning = CentroidTuning::default();
        let red = Vec3::new(1.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        let mut cs = vec![
            GroupCentroid::new(Vec3::ZERO, red, 0.0),
            GroupCentroid::new(Vec3::new(1.0, 0.0, 0.0), blue, 1.0),
        ];
        let before = cs[0].color.distance(cs[1].color);
        blend_colors(&mut cs, 0.5, &tuning);
        let after = cs[0].color.distance(cs[1].color);
        assert!(after < before);
        // Symmetric drift: both move the same amount
        assert!((cs[0].color.distance(red) - cs[1].color.distance(blue)).abs() < 1e-6);
    }

    #[test]
    fn test_distant_centroid_colors_unchanged() {
        let tuning = CentroidTuning::default();
        let red = Vec3::new(1.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 1.0);
        let mut cs = vec![
            GroupCentroid::new(Vec3::ZERO, red, 0.0),
            GroupCentroid::new(Vec3::new(100.0, 0.0, 0.0), blue, 1.0),
        ];
        blend_colors(&mut cs, 0.5, &tuning);
        assert_eq!(cs[0].color, red);
        assert_eq!(cs[1].color, blue);
    }

    fn pulse_sim(probability: f32) -> Simulation {
        let mut sim = Simulation::with_config(&crate::SimConfig {
            particle_count: 0,
            ..crate::SimConfig::default()
        });
        let tuning = &mut sim.tuning_mut().centroid;
        tuning.pulse_probability = probability;
        tuning.pulse_threshold = -1.0;
        tuning.wander_speed = 0.0;

        let centroid = sim.centroids()[0];
        sim.add_particle(centroid.position + Vec3::new(0.3, 0.0, 0.0), Vec3::ZERO, centroid.color);
        sim.add_particle(centroid.position + Vec3::new(1.5, 0.0, 0.0), Vec3::ZERO, centroid.color);
        sim
    }

    #[test]
    fn test_pulse_injects_wave_near_centroid() {
        let mut sim = pulse_sim(1.0);
        update_centroids(&mut sim, 0.0);
        // The nearer particle is the source; its neighbor carries the wave
        let neighbor = sim.particles()[1];
        assert!(neighbor.wave_amplitude > 0.0);
        assert!(neighbor.wave_amplitude <= 1.0);
    }

    #[test]
    fn test_pulse_skipped_at_zero_probability() {
        let mut sim = pulse_sim(0.0);
        update_centroids(&mut sim, 0.0);
        assert!(sim.particles().iter().all(|p| p.wave_amplitude == 0.0));
    }

    #[test]
    fn test_pulse_ignores_dissimilar_particles() {
        let mut sim = pulse_sim(1.0);
        sim.tuning_mut().centroid.pulse_similarity = 1.0;
        update_centroids(&mut sim, 0.0);
        assert!(sim.particles().iter().all(|p| p.wave_amplitude == 0.0));
    }
}
