//! Radius queries over the particle store
//!
//! Every pass that needs "who is within R of particle i" (or of a point in
//! space) goes through [`NeighborSearch`], so a spatial hash can stand in
//! for the O(n) scan.

use glam::Vec3;

use super::state::Particle;

/// Finds the particles within a radius of a given particle or point
pub trait NeighborSearch {
    /// Push into `out` the index of every particle `j != index` whose
    /// distance to `particles[index]` is strictly less than `radius`.
    /// Indices are pushed in ascending order. `out` is cleared first.
    fn neighbors_within(&self, particles: &[Particle], index: usize, radius: f32, out: &mut Vec<usize>);

    /// Same as [`NeighborSearch::neighbors_within`], centered on `point`
    /// with no particle excluded
    fn neighbors_of_point(&self, particles: &[Particle], point: Vec3, radius: f32, out: &mut Vec<usize>);
}

/// Linear scan over every particle
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl BruteForce {
    fn scan(particles: &[Particle], center: Vec3, radius: f32, skip: Option<usize>, out: &mut Vec<usize>) {
        out.clear();
        let radius_sq = radius * radius;
        out.extend(
            particles
                .iter()
                .enumerate()
                .filter(|&(j, p)| Some(j) != skip && (p.position - center).length_squared() < radius_sq)
                .map(|(j, _)| j),
        );
    }
}

impl NeighborSearch for BruteForce {
    fn neighbors_within(&self, particles: &[Particle], index: usize, radius: f32, out: &mut Vec<usize>) {
        let Some(center) = particles.get(index).map(|p| p.position) else {
            out.clear();
            return;
        };
        Self::scan(particles, center, radius, Some(index), out);
    }

    fn neighbors_of_point(&self, particles: &[Particle], point: Vec3, radius: f32, out: &mut Vec<usize>) {
        Self::scan(particles, point, radius, None, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(x: f32) -> Particle {
        Particle {
            position: Vec3::new(x, 0.0, 0.0),
            velocity: Vec3::ZERO,
            color: Vec3::ONE,
            target_color: Vec3::ONE,
            radius: 0.5,
            base_radius: 0.5,
            mass: 1.0,
            color_transition_speed: 1.0,
            wave_phase: 0.0,
            wave_amplitude: 0.0,
            wave_decay: 0.9,
        }
    }

    #[test]
    fn test_excludes_self_and_far_particles() {
        let particles: Vec<_> = [0.0, 1.0, 2.5, 3.0, -0.5].into_iter().map(particle_at).collect();
        let mut out = vec![99];
        BruteForce.neighbors_within(&particles, 0, 2.5, &mut out);
        assert_eq!(out, vec![1, 4]);
    }

    #[test]
    fn test_out_of_range_index_yields_nothing() {
        let particles = vec![particle_at(0.0)];
        let mut out = Vec::new();
        BruteForce.neighbors_within(&particles, 5, 10.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_point_query_keeps_every_particle_in_range() {
        let particles: Vec<_> = [0.0, 1.0, 2.5, 3.0, -0.5].into_iter().map(particle_at).collect();
        let mut out = vec![99];
        BruteForce.neighbors_of_point(&particles, Vec3::new(0.9, 0.0, 0.0), 1.0, &mut out);
        assert_eq!(out, vec![0, 1]);

        BruteForce.neighbors_of_point(&particles, Vec3::new(0.0, 5.0, 0.0), 1.0, &mut out);
        assert!(out.is_empty());
    }
}
