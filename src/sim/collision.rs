//! Particle-particle collision detection and response
//!
//! Pairs are visited in fixed `(i, j > i)` order and resolved in place, so a
//! pair fixed early in the pass can be disturbed by a later one. Each
//! resolved pair is exactly touching right after its own correction.

use glam::Vec3;

use super::neighbors::NeighborSearch;
use super::state::{Particle, Simulation};
use super::wave;

/// Squared distances at or below this are treated as coincident and skipped
const DIST_SQ_EPSILON: f32 = 1e-4;

/// Overlap between two spheres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first sphere toward the second
    pub normal: Vec3,
    /// Overlap depth (sum of radii minus center distance)
    pub penetration: f32,
}

/// Check overlap between two spheres. Coincident centers yield no contact.
pub fn sphere_contact(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> Option<Contact> {
    let diff = pos_b - pos_a;
    let dist_sq = diff.length_squared();
    let min_dist = radius_a + radius_b;
    if dist_sq >= min_dist * min_dist || dist_sq <= DIST_SQ_EPSILON {
        return None;
    }
    let dist = dist_sq.sqrt();
    Some(Contact {
        normal: diff / dist,
        penetration: min_dist - dist,
    })
}

/// Separate a pair 50/50 along the contact normal and apply an impulse when
/// approaching. Returns the approach speed along the normal (0 if the pair
/// was already separating).
pub fn resolve_pair(a: &mut Particle, b: &mut Particle, contact: Contact, restitution: f32) -> f32 {
    let half = contact.normal * (contact.penetration * 0.5);
    a.position -= half;
    b.position += half;

    let approach = (a.velocity - b.velocity).dot(contact.normal);
    if approach <= 0.0 {
        return 0.0;
    }

    let inv_a = 1.0 / a.mass;
    let inv_b = 1.0 / b.mass;
    let j = (1.0 + restitution) * approach / (inv_a + inv_b);
    let impulse = contact.normal * j;
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;
    approach
}

/// Two disjoint mutable references into the store (`i < j`)
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    let (head, tail) = particles.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Resolve every overlapping pair; impacts inject waves from both particles
pub fn resolve_collisions<S: NeighborSearch>(sim: &mut Simulation<S>) {
    let restitution = sim.tuning.collision.restitution;
    let wave_tuning = &sim.tuning.wave;
    let n = sim.particles.len();
    let mut impacts = 0usize;

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = pair_mut(&mut sim.particles, i, j);
            let Some(contact) = sphere_contact(a.position, a.radius, b.position, b.radius) else {
                continue;
            };
            let approach = resolve_pair(a, b, contact, restitution);
            if approach > 0.0 {
                let intensity = (approach * wave_tuning.collision_scale).min(1.0);
                wave::propagate_wave(&mut sim.particles, &sim.search, wave_tuning, i, intensity);
                wave::propagate_wave(&mut sim.particles, &sim.search, wave_tuning, j, intensity);
                impacts += 1;
            }
        }
    }

    if impacts > 0 {
        log::trace!("{impacts} collision impacts");
    }
}
