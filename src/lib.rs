//! Liquid Flock - a stylized liquid/flocking particle simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (forces, waves, colors, collisions)
//! - `render`: Draw-list builders for a GPU front end
//! - `config`: Construction parameters with JSON load/save
//! - `tuning`: Data-driven pipeline constants

pub mod config;
pub mod render;
pub mod sim;
pub mod tuning;

pub use config::{ConfigError, SimConfig};
pub use sim::{GroupCentroid, Particle, Simulation, Wall, WallLayout};
pub use tuning::Tuning;

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    /// Default fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the accumulator will absorb, in seconds
    pub const MAX_FRAME_TIME: f32 = 0.25;
}

/// Point at `angle` on a horizontal circle of `radius`, lifted to `y`
#[inline]
pub fn ring_point(radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}
