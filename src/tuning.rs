//! Data-driven simulation tuning
//!
//! Every numeric knob of the tick pipeline lives here, grouped by the stage
//! that reads it. Values are visually tuned, not physically derived.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Inclusive `(min, max)` range sampled uniformly by the particle store
pub type Range = (f32, f32);

/// Per-particle attribute ranges used by `add_particle`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub radius_range: Range,
    /// Must stay strictly positive (velocity integration divides by mass)
    pub mass_range: Range,
    /// Per-particle wave decay factor; closer to 1 means slower decay
    pub wave_decay_range: Range,
    /// Default blend rate toward the target color
    pub color_transition_speed: f32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            radius_range: (0.4, 0.6),
            mass_range: (0.8, 1.2),
            wave_decay_range: (0.6, 0.85),
            color_transition_speed: 1.5,
        }
    }
}

/// Initial layout of the seed groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeTuning {
    /// Radius of the ring on which group centers are placed
    pub ring_radius: f32,
    /// Height of group centers above the floor
    pub spawn_height: f32,
    /// Minimum ring radius and cluster radius; the other variants grow with
    /// their particle count
    pub extent: f32,
    /// Distance between neighboring points of a line, ring, cross or lattice
    pub spacing: f32,
    /// Initial velocity toward the group center per unit of offset
    pub inward_speed: f32,
    /// Per-axis bound of the random initial XZ drift
    pub initial_drift: f32,
    /// Random spawns land within this fraction of the box extent around the center
    pub spawn_fraction: f32,
    /// Seed colors, one per group; groups past the end get a random color
    pub palette: Vec<Vec3>,
}

impl Default for ShapeTuning {
    fn default() -> Self {
        Self {
            ring_radius: 25.0,
            spawn_height: 5.0,
            extent: 3.0,
            spacing: 1.25,
            inward_speed: 0.1,
            initial_drift: 0.1,
            spawn_fraction: 0.4,
            palette: vec![
                Vec3::new(0.3, 0.7, 1.0), // Blue
                Vec3::new(1.0, 0.4, 0.4), // Red
                Vec3::new(0.4, 1.0, 0.4), // Green
                Vec3::new(1.0, 0.9, 0.3), // Yellow
            ],
        }
    }
}

/// Boid forces and integration limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceTuning {
    /// Neighbors farther than this are ignored by the boid scan
    pub interaction_radius: f32,
    /// Color distance at which similarity reaches zero
    pub color_threshold: f32,
    /// Extra gap added to the sum of radii before separation kicks in
    pub separation_margin: f32,
    pub separation_strength: f32,
    /// Separation multiplier applied in proportion to color difference
    pub separation_color_boost: f32,
    pub alignment_strength: f32,
    pub cohesion_strength: f32,
    /// Attraction gain per unit distance to the matching centroid
    pub centroid_attraction: f32,
    /// Cap on the centroid attraction magnitude
    pub centroid_attraction_max: f32,
    /// Per-axis bound of the random jitter force
    pub jitter: f32,
    pub max_speed: f32,
    /// Accumulated same-color weight that counts as a merge
    pub merge_threshold: f32,
    pub merge_wave_probability: f32,
    pub merge_wave_intensity: f32,
}

impl Default for ForceTuning {
    fn default() -> Self {
        Self {
            interaction_radius: 4.0,
            color_threshold: 0.6,
            separation_margin: 0.2,
            separation_strength: 20.0,
            separation_color_boost: 1.5,
            alignment_strength: 1.5,
            cohesion_strength: 0.8,
            centroid_attraction: 0.6,
            centroid_attraction_max: 6.0,
            jitter: 0.5,
            max_speed: 8.0,
            merge_threshold: 3.0,
            merge_wave_probability: 0.002,
            merge_wave_intensity: 0.5,
        }
    }
}

/// Smoothed density, pressure and viscosity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidTuning {
    pub smoothing_radius: f32,
    pub pressure_constant: f32,
    pub rest_density: f32,
    pub viscosity_constant: f32,
    /// Scale applied to pressure + viscosity relative to the boid forces
    pub pressure_weight: f32,
}

impl Default for FluidTuning {
    fn default() -> Self {
        Self {
            smoothing_radius: 2.5,
            pressure_constant: 2.0,
            rest_density: 3.0,
            viscosity_constant: 0.5,
            pressure_weight: 0.1,
        }
    }
}

/// Autonomous group centroid motion and events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentroidTuning {
    /// Magnitude of the noise-driven target velocity
    pub wander_speed: f32,
    /// Exponential blend rate of velocity toward the target
    pub velocity_smoothing: f32,
    /// Planar distance from the origin beyond which centroids are pulled back
    pub containment_radius: f32,
    pub containment_strength: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub vertical_strength: f32,
    /// Centroids closer than this blend colors
    pub color_blend_distance: f32,
    pub color_blend_rate: f32,
    /// Angular frequency of the pulse oscillator
    pub pulse_frequency: f32,
    /// Oscillator value above which a pulse may fire
    pub pulse_threshold: f32,
    pub pulse_probability: f32,
    pub pulse_intensity: f32,
    /// Radius searched for a same-colored particle to emit the pulse from
    pub pulse_search_radius: f32,
    /// Color similarity a particle needs to emit its centroid's pulse
    pub pulse_similarity: f32,
}

impl Default for CentroidTuning {
    fn default() -> Self {
        Self {
            wander_speed: 2.0,
            velocity_smoothing: 1.5,
            containment_radius: 25.0,
            containment_strength: 0.8,
            min_height: 2.0,
            max_height: 12.0,
            vertical_strength: 0.8,
            color_blend_distance: 12.0,
            color_blend_rate: 0.05,
            pulse_frequency: 0.7,
            pulse_threshold: 0.97,
            pulse_probability: 0.02,
            pulse_intensity: 0.8,
            pulse_search_radius: 6.0,
            pulse_similarity: 0.5,
        }
    }
}

/// Neighborhood color census and takeover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTuning {
    /// Census radius; smaller than the force interaction radius
    pub takeover_radius: f32,
    pub min_neighbors: usize,
    /// Fraction of the census a single group must exceed
    pub dominance_ratio: f32,
    /// A neighbor is only counted when this close (in color) to some centroid
    pub bucket_threshold: f32,
    /// Minimum color distance for a takeover to be worth triggering
    pub takeover_delta: f32,
    pub takeover_speed: f32,
    /// Spatial distance within which a same-colored centroid reinforces
    pub reinforce_distance: f32,
    /// Color distance under which a centroid counts as same-colored
    pub reinforce_threshold: f32,
    /// Clamp channels to [0, 1] after blending
    pub clamp_channels: bool,
}

impl Default for ColorTuning {
    fn default() -> Self {
        Self {
            takeover_radius: 2.5,
            min_neighbors: 4,
            dominance_ratio: 0.7,
            bucket_threshold: 0.35,
            takeover_delta: 0.3,
            takeover_speed: 6.0,
            reinforce_distance: 10.0,
            reinforce_threshold: 0.3,
            clamp_channels: false,
        }
    }
}

/// Wave injection, phase locking and decay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub max_distance: f32,
    /// Color distance at which waves stop crossing between particles
    pub color_threshold: f32,
    /// Similarity above which targets are phase-locked to the source
    pub phase_lock_similarity: f32,
    /// Phase lag per unit distance from the source
    pub phase_delay: f32,
    /// Phase advance per second
    pub phase_rate: f32,
    /// Velocity perturbation per unit amplitude per second
    pub velocity_strength: f32,
    /// Impact speed to wave intensity conversion for collisions
    pub collision_scale: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            max_distance: 6.0,
            color_threshold: 0.6,
            phase_lock_similarity: 0.8,
            phase_delay: 0.4,
            phase_rate: 4.0,
            velocity_strength: 3.0,
            collision_scale: 0.25,
        }
    }
}

/// Particle-particle contact response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    pub restitution: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self { restitution: 0.2 }
    }
}

/// Wall bounce factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryTuning {
    /// Restitution against the X/Z side walls
    pub side_restitution: f32,
    /// Restitution against the floor and ceiling
    pub floor_restitution: f32,
}

impl Default for BoundaryTuning {
    fn default() -> Self {
        Self {
            side_restitution: 0.4,
            floor_restitution: 0.6,
        }
    }
}

/// All pipeline tunables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub particle: ParticleTuning,
    pub shape: ShapeTuning,
    pub force: ForceTuning,
    pub fluid: FluidTuning,
    pub centroid: CentroidTuning,
    pub color: ColorTuning,
    pub wave: WaveTuning,
    pub collision: CollisionTuning,
    pub boundary: BoundaryTuning,
}

impl Tuning {
    /// Check invariants the pipeline relies on. Returns a description of the
    /// first violation found.
    pub fn check(&self) -> Result<(), String> {
        let ranges = [
            ("particle.radius_range", self.particle.radius_range),
            ("particle.mass_range", self.particle.mass_range),
            ("particle.wave_decay_range", self.particle.wave_decay_range),
        ];
        for (name, (lo, hi)) in ranges {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(format!("{name} must be a finite (min, max) pair, got ({lo}, {hi})"));
            }
        }
        if self.particle.mass_range.0 <= 0.0 {
            return Err("particle.mass_range must be strictly positive".into());
        }
        if self.particle.radius_range.0 <= 0.0 {
            return Err("particle.radius_range must be strictly positive".into());
        }
        let (lo, hi) = self.particle.wave_decay_range;
        if lo < 0.0 || hi > 1.0 {
            return Err("particle.wave_decay_range must lie within [0, 1]".into());
        }
        let radii = [
            ("force.interaction_radius", self.force.interaction_radius),
            ("fluid.smoothing_radius", self.fluid.smoothing_radius),
            ("color.takeover_radius", self.color.takeover_radius),
            ("wave.max_distance", self.wave.max_distance),
        ];
        for (name, r) in radii {
            if !(r > 0.0) {
                return Err(format!("{name} must be positive, got {r}"));
            }
        }
        if !(self.force.color_threshold > 0.0) || !(self.wave.color_threshold > 0.0) {
            return Err("color thresholds must be positive".into());
        }
        if !(0.0..=0.5).contains(&self.shape.spawn_fraction) {
            return Err(format!("shape.spawn_fraction must be in [0, 0.5], got {}", self.shape.spawn_fraction));
        }
        if !(self.shape.initial_drift >= 0.0) {
            return Err(format!("shape.initial_drift must be non-negative, got {}", self.shape.initial_drift));
        }
        if !(self.shape.spacing > 0.0) {
            return Err(format!("shape.spacing must be positive, got {}", self.shape.spacing));
        }
        if !(self.force.max_speed > 0.0) {
            return Err("force.max_speed must be positive".into());
        }
        Ok(())
    }
}
