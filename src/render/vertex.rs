//! Vertex types for point and mesh rendering

use bytemuck::{Pod, Zeroable};

/// One point sprite per particle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    /// Point size in pixels
    pub size: f32,
}

impl ParticleVertex {
    pub const fn new(position: [f32; 3], color: [f32; 3], size: f32) -> Self {
        Self { position, color, size }
    }
}

/// Unit cube vertex with a face normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct WallVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl WallVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 7 * 4);
        assert_eq!(std::mem::size_of::<WallVertex>(), 6 * 4);

        let verts = [ParticleVertex::new([1.0, 2.0, 3.0], [0.1, 0.2, 0.3], 30.0)];
        let floats: &[f32] = bytemuck::cast_slice(&verts);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 30.0]);
    }
}
