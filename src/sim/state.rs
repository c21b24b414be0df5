//! Simulation state and the public surface consumed by collaborators
//!
//! The particle store, the centroid set and the walls all live on
//! [`Simulation`]. Renderer snapshots (`particles()`, `walls()`) are only
//! valid between `update` calls.

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boundary::build_walls;
use super::centroid::GroupCentroid;
use super::neighbors::{BruteForce, NeighborSearch};
use super::{collision, shapes, tick, wave};
use crate::config::SimConfig;
use crate::tuning::{Range, Tuning};

/// A simulated point mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Displayed color, nominally in [0, 1] per channel
    pub color: Vec3,
    /// Color the particle is blending toward
    pub target_color: Vec3,
    /// Reset to `base_radius` every tick
    pub radius: f32,
    pub base_radius: f32,
    /// Always > 0
    pub mass: f32,
    pub color_transition_speed: f32,
    pub wave_phase: f32,
    pub wave_amplitude: f32,
    pub wave_decay: f32,
}

/// Which walls bound the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallLayout {
    /// Four side walls, open top (floor still enforced)
    #[default]
    Open,
    /// Side walls plus floor and ceiling
    Enclosed,
}

impl WallLayout {
    pub fn wall_count(&self) -> usize {
        match self {
            WallLayout::Open => 4,
            WallLayout::Enclosed => 6,
        }
    }
}

/// Axis-aligned box descriptor, immutable after construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    position: Vec3,
    size: Vec3,
}

impl Wall {
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    /// Center of the box
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Full extents of the box
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Unit cube to world transform (translate * scale)
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.size)
    }
}

/// Draw uniformly from an inclusive range; degenerate ranges return `min`
pub(crate) fn sample_range(rng: &mut Pcg32, (lo, hi): Range) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// The liquid/flocking simulation
///
/// Generic over the neighbor search so an accelerated structure can replace
/// the brute-force scan without touching the pipeline.
#[derive(Debug, Clone)]
pub struct Simulation<S = BruteForce> {
    pub(crate) particles: Vec<Particle>,
    pub(crate) walls: Vec<Wall>,
    pub(crate) centroids: Vec<GroupCentroid>,
    /// Box extent along X
    pub(crate) width: f32,
    /// Box extent along Z
    pub(crate) height: f32,
    pub(crate) wall_height: f32,
    pub(crate) layout: WallLayout,
    pub(crate) gravity: Vec3,
    pub(crate) damping: f32,
    pub(crate) max_particles: usize,
    pub(crate) tuning: Tuning,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) search: S,
    /// Simulated seconds since construction
    pub(crate) time: f32,
    pub(crate) ticks: u64,
}

impl Simulation<BruteForce> {
    /// Build a `width` x `height` box with the default configuration
    pub fn new(width: f32, height: f32) -> Self {
        let config = SimConfig {
            width,
            height,
            ..SimConfig::default()
        };
        Self::with_config(&config)
    }

    pub fn with_config(config: &SimConfig) -> Self {
        Self::with_search(config, BruteForce)
    }
}

impl<S: NeighborSearch> Simulation<S> {
    /// Build walls, centroids and the initial population
    pub fn with_search(config: &SimConfig, search: S) -> Self {
        let mut sim = Self {
            particles: Vec::with_capacity(config.particle_count),
            walls: build_walls(config.width, config.height, config.wall_height, config.wall_layout),
            centroids: Vec::with_capacity(config.groups),
            width: config.width,
            height: config.height,
            wall_height: config.wall_height,
            layout: config.wall_layout,
            gravity: config.gravity,
            damping: config.damping,
            max_particles: config.max_particles,
            tuning: config.tuning.clone(),
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            search,
            time: 0.0,
            ticks: 0,
        };

        shapes::populate(&mut sim, config.groups, config.particle_count);

        log::info!(
            "Simulation initialized: {}x{} box, {} walls, {} particles, {} centroids (seed {})",
            sim.width,
            sim.height,
            sim.walls.len(),
            sim.particles.len(),
            sim.centroids.len(),
            sim.seed
        );
        sim
    }

    /// Advance by exactly `dt` seconds
    pub fn update(&mut self, dt: f32) {
        tick::tick(self, dt);
    }

    /// Append one particle. Inputs are not validated.
    pub fn add_particle(&mut self, position: Vec3, velocity: Vec3, color: Vec3) {
        let p = &self.tuning.particle;
        let (radius_range, mass_range, decay_range) = (p.radius_range, p.mass_range, p.wave_decay_range);
        let color_transition_speed = p.color_transition_speed;

        let base_radius = sample_range(&mut self.rng, radius_range);
        let mass = sample_range(&mut self.rng, mass_range);
        let wave_decay = sample_range(&mut self.rng, decay_range);

        self.particles.push(Particle {
            position,
            velocity,
            color,
            target_color: color,
            radius: base_radius,
            base_radius,
            mass,
            color_transition_speed,
            wave_phase: 0.0,
            wave_amplitude: 0.0,
            wave_decay,
        });
    }

    /// Append a particle at a random spot inside the box, colored after a
    /// random centroid. Returns false once `max_particles` is reached.
    pub fn spawn_random_particle(&mut self) -> bool {
        if self.particles.len() >= self.max_particles {
            return false;
        }
        let f = self.tuning.shape.spawn_fraction;
        let x = self.rng.random_range(-f..=f) * self.width;
        let z = self.rng.random_range(-f..=f) * self.height;
        let position = Vec3::new(x, self.tuning.shape.spawn_height, z);

        let color = if self.centroids.is_empty() {
            Vec3::new(
                self.rng.random_range(0.3..=1.0),
                self.rng.random_range(0.3..=1.0),
                self.rng.random_range(0.3..=1.0),
            )
        } else {
            let k = self.rng.random_range(0..self.centroids.len());
            self.centroids[k].color
        };

        self.add_particle(position, Vec3::ZERO, color);
        true
    }

    /// Inject a wave from `source` into its neighborhood
    pub fn propagate_wave(&mut self, source: usize, intensity: f32) {
        wave::propagate_wave(&mut self.particles, &self.search, &self.tuning.wave, source, intensity);
    }

    /// Run the collision resolver on its own
    pub fn resolve_collisions(&mut self) {
        collision::resolve_collisions(self);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view of the store; the particle count cannot change through it
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn centroids(&self) -> &[GroupCentroid] {
        &self.centroids
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping;
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Changes take effect on the next `update`
    pub fn tuning_mut(&mut self) -> &mut Tuning {
        &mut self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated seconds since construction
    pub fn elapsed(&self) -> f32 {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Half extents of the box on X and Z
    pub fn half_extents(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            particle_count: 40,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_construct_builds_walls_and_particles() {
        let sim = Simulation::new(100.0, 100.0);
        assert_eq!(sim.walls().len(), WallLayout::Open.wall_count());
        assert!(!sim.particles().is_empty());
        assert_eq!(sim.centroids().len(), SimConfig::default().groups);
    }

    #[test]
    fn test_population_matches_particle_count() {
        for (particle_count, groups) in [(10, 4), (3, 4), (41, 3)] {
            let config = SimConfig {
                particle_count,
                groups,
                ..SimConfig::default()
            };
            let sim = Simulation::with_config(&config);
            assert_eq!(sim.particle_count(), particle_count);
            assert_eq!(sim.centroids().len(), groups);
        }
    }

    #[test]
    fn test_default_population_starts_without_overlaps() {
        let sim = Simulation::new(100.0, 100.0);
        let particles = sim.particles();
        let (hx, hz) = sim.half_extents();
        for (i, a) in particles.iter().enumerate() {
            assert!(a.position.x.abs() < hx && a.position.z.abs() < hz);
            for b in &particles[i + 1..] {
                assert!(a.position.distance(b.position) >= a.radius + b.radius);
            }
        }
    }

    #[test]
    fn test_enclosed_layout_has_six_walls() {
        let config = SimConfig {
            wall_layout: WallLayout::Enclosed,
            ..small_config()
        };
        let sim = Simulation::with_config(&config);
        assert_eq!(sim.walls().len(), 6);
    }

    #[test]
    fn test_add_particle_appends_one() {
        let mut sim = Simulation::with_config(&small_config());
        let before = sim.particle_count();
        sim.add_particle(Vec3::ZERO, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(sim.particle_count(), before + 1);

        let p = sim.particles().last().unwrap();
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.target_color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.wave_amplitude, 0.0);
        assert_eq!(p.wave_phase, 0.0);
        assert_eq!(p.radius, p.base_radius);
    }

    #[test]
    fn test_add_particle_draws_from_ranges() {
        let mut sim = Simulation::with_config(&small_config());
        let t = sim.tuning().particle.clone();
        for _ in 0..50 {
            sim.add_particle(Vec3::ZERO, Vec3::ZERO, Vec3::ONE);
        }
        for p in sim.particles() {
            assert!(p.mass > 0.0);
            assert!(p.mass >= t.mass_range.0 && p.mass <= t.mass_range.1);
            assert!(p.base_radius >= t.radius_range.0 && p.base_radius <= t.radius_range.1);
            assert!(p.wave_decay >= t.wave_decay_range.0 && p.wave_decay <= t.wave_decay_range.1);
        }
    }

    #[test]
    fn test_add_particle_does_not_validate() {
        let mut sim = Simulation::with_config(&small_config());
        sim.add_particle(Vec3::splat(f32::NAN), Vec3::ZERO, Vec3::ONE);
        assert!(sim.particles().last().unwrap().position.x.is_nan());
    }

    #[test]
    fn test_spawn_respects_max_particles() {
        let config = SimConfig {
            max_particles: 42,
            ..small_config()
        };
        let mut sim = Simulation::with_config(&config);
        assert_eq!(sim.particle_count(), 40);
        assert!(sim.spawn_random_particle());
        assert!(sim.spawn_random_particle());
        assert!(!sim.spawn_random_particle());
        assert_eq!(sim.particle_count(), 42);
    }

    #[test]
    fn test_spawned_particle_inside_box() {
        let mut sim = Simulation::with_config(&small_config());
        let (hx, hz) = sim.half_extents();
        for _ in 0..20 {
            sim.spawn_random_particle();
        }
        for p in sim.particles()[40..].iter() {
            assert!(p.position.x.abs() <= hx * 0.8 + 1e-3);
            assert!(p.position.z.abs() <= hz * 0.8 + 1e-3);
        }
    }

    #[test]
    fn test_spawn_fraction_limits_spawn_area() {
        let mut config = small_config();
        config.tuning.shape.spawn_fraction = 0.1;
        let mut sim = Simulation::with_config(&config);
        for _ in 0..20 {
            sim.spawn_random_particle();
        }
        for p in sim.particles()[40..].iter() {
            assert!(p.position.x.abs() <= 0.1 * sim.width + 1e-3);
            assert!(p.position.z.abs() <= 0.1 * sim.height + 1e-3);
        }
    }

    #[test]
    fn test_setters_take_effect() {
        let mut sim = Simulation::with_config(&small_config());
        sim.set_gravity(Vec3::new(0.0, -9.81, 0.0));
        sim.set_damping(0.5);
        assert_eq!(sim.gravity(), Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(sim.damping(), 0.5);
    }

    #[test]
    fn test_wall_model_matrix() {
        let wall = Wall::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, 2.0, 5.0));
        let m = wall.model_matrix();
        let t = m.w_axis;
        assert_eq!((t.x, t.y, t.z), (0.0, 1.0, 0.0));
        assert!((m.x_axis.truncate().length() - 10.0).abs() < 1e-5);
        assert!((m.y_axis.truncate().length() - 2.0).abs() < 1e-5);
        assert!((m.z_axis.truncate().length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_population() {
        let a = Simulation::with_config(&small_config());
        let b = Simulation::with_config(&small_config());
        assert_eq!(a.particles(), b.particles());
    }
}
