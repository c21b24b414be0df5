//! Deterministic simulation module
//!
//! All particle logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by particle index)
//! - No rendering or platform dependencies

pub mod boundary;
pub mod centroid;
pub mod collision;
pub mod color;
pub mod fluid;
pub mod forces;
pub mod neighbors;
pub mod shapes;
pub mod state;
pub mod tick;
pub mod wave;

/// Distances below this are treated as zero when normalizing
pub const DISTANCE_EPSILON: f32 = 1e-4;

pub use boundary::{Bounds, build_walls};
pub use centroid::GroupCentroid;
pub use collision::{Contact, sphere_contact};
pub use color::ColorDecision;
pub use neighbors::{BruteForce, NeighborSearch};
pub use shapes::ShapeKind;
pub use state::{Particle, Simulation, Wall, WallLayout};
pub use tick::tick;
