//! Wave propagation and decay
//!
//! Injection is a ceiling: a target's amplitude becomes
//! `max(current, intensity * falloff)`, never the sum. Between injections
//! amplitude only decays.

use std::f32::consts::TAU;

use glam::Vec3;

use super::forces::color_similarity;
use super::neighbors::NeighborSearch;
use super::state::Particle;
use crate::tuning::WaveTuning;

/// Below this the amplitude snaps to zero
const AMPLITUDE_FLOOR: f32 = 1e-4;

/// Inject a wave from `source` into every particle within `max_distance`
pub fn propagate_wave<S: NeighborSearch>(
    particles: &mut [Particle],
    search: &S,
    tuning: &WaveTuning,
    source: usize,
    intensity: f32,
) {
    let Some(src) = particles.get(source).copied() else {
        return;
    };
    let mut targets = Vec::new();
    search.neighbors_within(particles, source, tuning.max_distance, &mut targets);

    for j in targets {
        let target = &mut particles[j];
        let dist = target.position.distance(src.position);
        let similarity = color_similarity(src.color, target.color, tuning.color_threshold);
        let radial = 1.0 - dist / tuning.max_distance;
        let falloff = radial * radial * similarity;

        target.wave_amplitude = target.wave_amplitude.max(intensity * falloff);

        if similarity > tuning.phase_lock_similarity {
            target.wave_phase = (src.wave_phase - dist * tuning.phase_delay).rem_euclid(TAU);
        }
    }
}

/// Per-tick wave step: advance phase, decay amplitude, perturb velocity,
/// and restore the radius to its base value
pub fn advance_waves(particles: &mut [Particle], dt: f32, tuning: &WaveTuning) {
    for p in particles.iter_mut() {
        p.wave_phase = (p.wave_phase + dt * tuning.phase_rate).rem_euclid(TAU);

        let keep = (1.0 - dt * (1.0 - p.wave_decay)).clamp(0.0, 1.0);
        p.wave_amplitude *= keep;
        if p.wave_amplitude < AMPLITUDE_FLOOR {
            p.wave_amplitude = 0.0;
        }

        if p.wave_amplitude > 0.0 {
            p.velocity += wave_axes(p.wave_phase) * p.wave_amplitude * tuning.velocity_strength * dt;
        }

        p.radius = p.base_radius;
    }
}

/// Three phase-offset trigonometric axes
#[inline]
pub fn wave_axes(phase: f32) -> Vec3 {
    Vec3::new(
        phase.sin(),
        (phase + TAU / 3.0).sin(),
        (phase + 2.0 * TAU / 3.0).sin(),
    )
}
