//! Compound-shape initializer
//!
//! Seed groups sit on a ring around the origin. Each group gets one shape
//! variant, chosen by group index, and one centroid at its center.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Quat, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::centroid::GroupCentroid;
use super::neighbors::NeighborSearch;
use super::state::Simulation;
use crate::ring_point;
use crate::tuning::ShapeTuning;

/// Initial layout variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Evenly spaced colinear points
    Line,
    /// Triangular lattice
    Triangle,
    /// Evenly spaced points on a circle
    Ring,
    /// Two orthogonal arms
    Cross,
    /// Jittered sphere sample
    Cluster,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Line,
        ShapeKind::Triangle,
        ShapeKind::Ring,
        ShapeKind::Cross,
        ShapeKind::Cluster,
    ];

    /// Deterministic variant for a group index
    pub fn for_group(group: usize) -> Self {
        Self::ALL[group % Self::ALL.len()]
    }
}

/// Center of group `group` out of `groups`, on a ring at `height`
pub fn group_center(group: usize, groups: usize, ring_radius: f32, height: f32) -> Vec3 {
    let angle = TAU * group as f32 / groups.max(1) as f32;
    ring_point(ring_radius, angle, height)
}

/// `count` values `spacing` apart, centered on zero
fn spread(count: usize, spacing: f32) -> impl Iterator<Item = f32> {
    let half = count.saturating_sub(1) as f32 * 0.5;
    (0..count).map(move |k| (k as f32 - half) * spacing)
}

fn line(count: usize, spacing: f32) -> Vec<Vec3> {
    spread(count, spacing).map(|x| Vec3::new(x, 0.0, 0.0)).collect()
}

fn triangle(count: usize, spacing: f32) -> Vec<Vec3> {
    let row_step = spacing * 3.0_f32.sqrt() * 0.5;
    let mut points = Vec::with_capacity(count);
    let mut row = 0;
    while points.len() < count {
        for col in 0..=row {
            if points.len() == count {
                break;
            }
            let x = (col as f32 - row as f32 * 0.5) * spacing;
            points.push(Vec3::new(x, 0.0, row as f32 * row_step));
        }
        row += 1;
    }
    // Center the lattice on the group center
    if !points.is_empty() {
        let mean = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        for p in points.iter_mut() {
            *p -= mean;
        }
    }
    points
}

/// Circle whose chord between neighbors is at least `spacing`, never
/// smaller than `min_radius`
fn ring(count: usize, spacing: f32, min_radius: f32) -> Vec<Vec3> {
    let radius = if count > 1 {
        let fitted = spacing / (2.0 * (PI / count as f32).sin());
        fitted.max(min_radius)
    } else {
        min_radius
    };
    (0..count)
        .map(|k| ring_point(radius, TAU * k as f32 / count as f32, 0.0))
        .collect()
}

fn cross(count: usize, spacing: f32) -> Vec<Vec3> {
    let x_arm = count.div_ceil(2);
    let z_arm = count - x_arm;
    let mut points: Vec<Vec3> = line(x_arm, spacing);

    // Second arm skips the center so no two points coincide
    for k in 0..z_arm {
        let dist = (k / 2 + 1) as f32 * spacing;
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        points.push(Vec3::new(0.0, 0.0, sign * dist));
    }
    points
}

fn cluster(count: usize, extent: f32, rng: &mut Pcg32) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let u: f32 = rng.random();
            let v: f32 = rng.random();
            let w: f32 = rng.random();
            // Inverse-transform sampling: uniform in volume, uniform on the sphere
            let r = extent * w.cbrt();
            let theta = u * TAU;
            let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
            Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.cos().abs(),
                r * phi.sin() * theta.sin(),
            )
        })
        .collect()
}

/// Offsets from the group center for `count` particles of `kind`, rotated
/// about Y by `orientation`
pub fn shape_offsets(kind: ShapeKind, count: usize, tuning: &ShapeTuning, orientation: f32, rng: &mut Pcg32) -> Vec<Vec3> {
    let points = match kind {
        ShapeKind::Line => line(count, tuning.spacing),
        ShapeKind::Triangle => triangle(count, tuning.spacing),
        ShapeKind::Ring => ring(count, tuning.spacing, tuning.extent),
        ShapeKind::Cross => cross(count, tuning.spacing),
        ShapeKind::Cluster => {
            // Hemisphere big enough to hold `count` points at roughly `spacing`
            let fitted = tuning.spacing * (count as f32).cbrt();
            cluster(count, fitted.max(tuning.extent), rng)
        }
    };
    let rotation = Quat::from_rotation_y(orientation);
    points.into_iter().map(|p| rotation * p).collect()
}

fn group_color(group: usize, palette: &[Vec3], rng: &mut Pcg32) -> Vec3 {
    match palette.get(group) {
        Some(&c) => c,
        None => Vec3::new(
            rng.random_range(0.3..=1.0),
            rng.random_range(0.3..=1.0),
            rng.random_range(0.3..=1.0),
        ),
    }
}

/// Size of group `group` when `total` particles are split across `groups`;
/// the first `total % groups` groups take one extra
pub fn group_size(group: usize, groups: usize, total: usize) -> usize {
    if groups == 0 {
        return 0;
    }
    total / groups + usize::from(group < total % groups)
}

/// Build the initial population of exactly `total` particles and one
/// centroid per group
pub fn populate<S: NeighborSearch>(sim: &mut Simulation<S>, groups: usize, total: usize) {
    let shape = sim.tuning.shape.clone();
    for g in 0..groups {
        let per_group = group_size(g, groups, total);
        let center = group_center(g, groups, shape.ring_radius, shape.spawn_height);
        let color = group_color(g, &shape.palette, &mut sim.rng);
        let angle = TAU * g as f32 / groups as f32;
        let kind = ShapeKind::for_group(g);

        sim.centroids.push(GroupCentroid::new(center, color, angle));

        let offsets = shape_offsets(kind, per_group, &shape, angle + FRAC_PI_2, &mut sim.rng);
        for offset in offsets {
            let drift = if shape.initial_drift > 0.0 {
                Vec3::new(
                    sim.rng.random_range(-shape.initial_drift..=shape.initial_drift),
                    0.0,
                    sim.rng.random_range(-shape.initial_drift..=shape.initial_drift),
                )
            } else {
                Vec3::ZERO
            };
            sim.add_particle(center + offset, -offset * shape.inward_speed + drift, color);
        }
        log::debug!("Group {g}: {kind:?} with {per_group} particles at {center}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn min_pair_distance(points: &[Vec3]) -> f32 {
        let mut best = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                best = best.min(points[i].distance(points[j]));
            }
        }
        best
    }

    #[test]
    fn test_variant_cycles_by_group_index() {
        assert_eq!(ShapeKind::for_group(0), ShapeKind::Line);
        assert_eq!(ShapeKind::for_group(4), ShapeKind::Cluster);
        assert_eq!(ShapeKind::for_group(5), ShapeKind::Line);
        assert_eq!(ShapeKind::for_group(8), ShapeKind::Cross);
    }

    #[test]
    fn test_group_centers_on_ring() {
        let c0 = group_center(0, 4, 15.0, 5.0);
        let c1 = group_center(1, 4, 15.0, 5.0);
        assert!((c0 - Vec3::new(15.0, 5.0, 0.0)).length() < 1e-4);
        assert!((c1 - Vec3::new(0.0, 5.0, 15.0)).length() < 1e-4);
    }

    #[test]
    fn test_every_variant_emits_requested_count() {
        let tuning = ShapeTuning::default();
        let mut rng = rng();
        for kind in ShapeKind::ALL {
            for count in [1, 2, 7, 50] {
                assert_eq!(shape_offsets(kind, count, &tuning, 0.3, &mut rng).len(), count, "{kind:?}");
            }
        }
    }

    #[test]
    fn test_line_is_evenly_spaced() {
        let points = line(5, 1.5);
        for (k, p) in points.iter().enumerate() {
            assert!((p.x - (k as f32 - 2.0) * 1.5).abs() < 1e-6);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_ring_points_on_circle() {
        // Few points: the minimum radius wins
        for p in ring(12, 1.0, 3.0) {
            assert!((p.length() - 3.0).abs() < 1e-5);
            assert_eq!(p.y, 0.0);
        }
        // Many points: the ring grows so neighbors stay `spacing` apart
        let points = ring(100, 1.0, 3.0);
        assert!(points[0].length() > 3.0);
        assert!((min_pair_distance(&points) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_layouts_keep_spacing_at_any_count() {
        let tuning = ShapeTuning::default();
        let mut rng = rng();
        for kind in [ShapeKind::Line, ShapeKind::Triangle, ShapeKind::Ring, ShapeKind::Cross] {
            for count in [2, 7, 50, 200] {
                let points = shape_offsets(kind, count, &tuning, 0.3, &mut rng);
                let min = min_pair_distance(&points);
                assert!(min >= tuning.spacing - 1e-3, "{kind:?} x{count}: {min}");
            }
        }
    }

    #[test]
    fn test_group_size_spreads_remainder() {
        let sizes: Vec<usize> = (0..4).map(|g| group_size(g, 4, 10)).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        let sizes: Vec<usize> = (0..4).map(|g| group_size(g, 4, 3)).collect();
        assert_eq!(sizes, vec![1, 1, 1, 0]);
        assert_eq!(group_size(0, 0, 10), 0);
    }

    #[test]
    fn test_triangle_lattice_spacing() {
        let points = triangle(10, 1.25);
        assert!((min_pair_distance(&points) - 1.25).abs() < 1e-4);
        let mean = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        assert!(mean.length() < 1e-4);
    }

    #[test]
    fn test_cross_has_no_coincident_points() {
        for count in [2, 5, 10, 11, 50] {
            let points = cross(count, 1.25);
            assert!(min_pair_distance(&points) >= 1.25 - 1e-4, "count {count}");
            assert!(points.iter().all(|p| p.x == 0.0 || p.z == 0.0));
        }
    }

    #[test]
    fn test_cluster_inside_upper_hemisphere() {
        let mut rng = rng();
        for p in cluster(200, 3.0, &mut rng) {
            assert!(p.length() <= 3.0 + 1e-4);
            assert!(p.y >= 0.0);
        }
    }
}
