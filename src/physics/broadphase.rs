//! Broadphase collision detection using AABB overlap tests.

use crate::ecs::components::physics::{BodyType, Collider, RigidBody};
use crate::ecs::components::transform::Transform;

use super::collider::PhysicsAabb;

/// Brute-force broadphase: pair-wise AABB tests over every collider.
///
/// O(n^2), sufficient for scene sizes this engine targets. Pairs are emitted
/// in query iteration order, so a given world always yields the same pair
/// sequence and resolution stays reproducible.
pub struct SweepAndPrune;

impl Default for SweepAndPrune {
    fn default() -> Self {
        Self
    }
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self
    }

    /// Find all pairs of entities whose AABBs overlap.
    ///
    /// Pairs where both entities are static are never returned.
    pub fn find_pairs(&self, world: &hecs::World) -> Vec<(hecs::Entity, hecs::Entity)> {
        let mut entries: Vec<(hecs::Entity, PhysicsAabb, BodyType)> = Vec::new();

        for (entity, (transform, collider, rb)) in world
            .query::<(&Transform, &Collider, &RigidBody)>()
            .iter()
        {
            let aabb = collider
                .shape
                .world_aabb(transform.position, transform.rotation);
            entries.push((entity, aabb, rb.body_type));
        }

        let mut pairs = Vec::new();

        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (entity_a, aabb_a, type_a) = &entries[i];
                let (entity_b, aabb_b, type_b) = &entries[j];

                // Two static bodies never interact.
                if *type_a == BodyType::Static && *type_b == BodyType::Static {
                    continue;
                }

                if aabb_a.overlaps(aabb_b) {
                    pairs.push((*entity_a, *entity_b));
                }
            }
        }

        pairs
    }
}
