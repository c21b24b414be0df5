//! Draw-list builders for a GPU front end
//!
//! Nothing here touches a graphics API. The front end uploads the vertex
//! slices (via `bytemuck::cast_slice`) and draws particles as points and
//! walls as indexed triangles with each wall's model matrix.

pub mod shapes;
pub mod vertex;

pub use shapes::{DEFAULT_POINT_SCALE, particle_vertices, wall_mesh};
pub use vertex::{ParticleVertex, WallVertex};
