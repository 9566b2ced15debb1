//! Impulse-based collision resolution with positional correction.
//!
//! One stateless pass per physics tick: every candidate pair is re-tested,
//! colliding pairs receive an impulse at each contact point and a small
//! position nudge to bleed off residual penetration. The pass never fails;
//! a degenerate pair is skipped and the rest of the pass continues.

use glam::{Mat3, Quat, Vec3};

use crate::ecs::components::physics::{Collider, ColliderShape, RigidBody};
use crate::ecs::components::transform::Transform;

use super::contact::ContactManifold;
use super::narrowphase::detect_collision;

/// Penetration depth tolerated before positional correction kicks in.
pub const PENETRATION_ALLOWANCE: f32 = 0.001;
/// Fraction of the excess penetration corrected per step.
pub const PENETRATION_CORRECTION: f32 = 0.4;
/// Impulse denominators at or below this are degenerate; the contact point is
/// skipped so no NaN can reach the body state.
const DENOMINATOR_EPSILON: f32 = 1e-6;

/// Snapshot of one body's state for the duration of a pair resolution.
struct BodyState {
    shape: ColliderShape,
    position: Vec3,
    rotation: Quat,
    inv_mass: f32,
    /// World-space inverse inertia, `R * I_local^-1 * R^T` at the snapshot
    /// rotation.
    inv_inertia: Mat3,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    restitution: f32,
}

impl BodyState {
    fn read(world: &hecs::World, entity: hecs::Entity) -> Option<Self> {
        let transform = world.get::<&Transform>(entity).ok()?;
        let rb = world.get::<&RigidBody>(entity).ok()?;
        let collider = world.get::<&Collider>(entity).ok()?;
        Some(Self {
            shape: collider.shape.clone(),
            position: transform.position,
            rotation: transform.rotation,
            inv_mass: rb.inv_mass,
            inv_inertia: rb.world_inv_inertia(transform.rotation),
            linear_velocity: rb.linear_velocity,
            angular_velocity: rb.angular_velocity,
            restitution: collider.restitution,
        })
    }

    fn is_dynamic(&self) -> bool {
        self.inv_mass > 0.0
    }

    /// Velocity of the material point at offset `r` from the center of mass.
    fn velocity_at(&self, r: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(r)
    }

    fn apply_impulse(&mut self, impulse: Vec3, r: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * r.cross(impulse);
    }

    fn write_back(&self, world: &mut hecs::World, entity: hecs::Entity) {
        if let Ok(mut rb) = world.get::<&mut RigidBody>(entity) {
            rb.linear_velocity = self.linear_velocity;
            rb.angular_velocity = self.angular_velocity;
        }
        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            transform.position = self.position;
        }
    }
}

/// Resolve collisions across the given candidate pairs.
///
/// Resulting manifolds are collected into `contacts` (cleared first) so the
/// caller can hand them to a debug drawer.
pub fn resolve_collisions(
    world: &mut hecs::World,
    pairs: &[(hecs::Entity, hecs::Entity)],
    contacts: &mut Vec<ContactManifold>,
) {
    contacts.clear();

    for (_, collider) in world.query_mut::<&mut Collider>() {
        collider.was_collided = false;
    }

    for &(entity_a, entity_b) in pairs {
        if entity_a == entity_b {
            continue;
        }

        let (Some(mut a), Some(mut b)) = (
            BodyState::read(world, entity_a),
            BodyState::read(world, entity_b),
        ) else {
            // A body without transform/body/collider never participates;
            // creation-time validation should have caught it.
            continue;
        };

        // Two static bodies never interact.
        if !a.is_dynamic() && !b.is_dynamic() {
            continue;
        }

        let Some(info) = detect_collision(
            &a.shape, a.position, a.rotation, &b.shape, b.position, b.rotation,
        ) else {
            continue;
        };

        mark_collided(world, entity_a);
        mark_collided(world, entity_b);

        let manifold = ContactManifold {
            entity_a,
            entity_b,
            normal: info.normal,
            penetration: info.penetration,
            points: vec![info.point],
        };

        resolve_manifold(&mut a, &mut b, &manifold);
        apply_positional_correction(&mut a, &mut b, &manifold);

        a.write_back(world, entity_a);
        b.write_back(world, entity_b);

        contacts.push(manifold);
    }
}

/// Apply collision impulses for every contact point of a manifold.
fn resolve_manifold(a: &mut BodyState, b: &mut BodyState, manifold: &ContactManifold) {
    let normal = manifold.normal;

    let restitution = if a.is_dynamic() && b.is_dynamic() {
        a.restitution.min(b.restitution)
    } else if a.is_dynamic() {
        a.restitution
    } else {
        b.restitution
    };

    for &point in &manifold.points {
        let r_a = point - a.position;
        let r_b = point - b.position;

        let relative_velocity = b.velocity_at(r_b) - a.velocity_at(r_a);
        let velocity_along_normal = relative_velocity.dot(normal);

        // Already separating: no impulse. The contact still counts as a
        // collision for `was_collided` and positional correction.
        if velocity_along_normal > 0.0 {
            continue;
        }

        let r_a_cross_n = r_a.cross(normal);
        let r_b_cross_n = r_b.cross(normal);

        let denominator = a.inv_mass
            + b.inv_mass
            + (a.inv_inertia * r_a_cross_n).dot(r_a_cross_n)
            + (b.inv_inertia * r_b_cross_n).dot(r_b_cross_n);

        if denominator <= DENOMINATOR_EPSILON {
            tracing::trace!(
                entity_a = ?manifold.entity_a,
                entity_b = ?manifold.entity_b,
                "degenerate impulse denominator, contact skipped"
            );
            continue;
        }

        let j = -(1.0 + restitution) * velocity_along_normal / denominator;
        let impulse = normal * j;

        a.apply_impulse(-impulse, r_a);
        b.apply_impulse(impulse, r_b);
    }
}

/// Nudge positions apart to counter penetration drift.
///
/// Dynamic-dynamic pairs split the correction proportionally to each body's
/// share of the combined inverse mass. For a static-dynamic pair the dynamic
/// body takes the whole correction scaled by its raw inverse mass - not
/// normalized against the static body's implicit infinite mass. That matches
/// the observed behavior this solver reproduces; see DESIGN.md.
fn apply_positional_correction(a: &mut BodyState, b: &mut BodyState, manifold: &ContactManifold) {
    let correction = (manifold.penetration - PENETRATION_ALLOWANCE).max(0.0)
        * PENETRATION_CORRECTION
        * manifold.normal;

    if a.is_dynamic() && b.is_dynamic() {
        let total_inv_mass = a.inv_mass + b.inv_mass;
        a.position -= correction * (a.inv_mass / total_inv_mass);
        b.position += correction * (b.inv_mass / total_inv_mass);
    } else if a.is_dynamic() {
        a.position -= correction * a.inv_mass;
    } else if b.is_dynamic() {
        b.position += correction * b.inv_mass;
    }
}

fn mark_collided(world: &mut hecs::World, entity: hecs::Entity) {
    if let Ok(mut collider) = world.get::<&mut Collider>(entity) {
        collider.was_collided = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::{BodyType, ColliderShape};

    fn spawn_body(
        world: &mut hecs::World,
        position: Vec3,
        velocity: Vec3,
        body: RigidBody,
        collider: Collider,
    ) -> hecs::Entity {
        let mut body = body;
        body.linear_velocity = velocity;
        world.spawn((Transform::from_position(position), body, collider))
    }

    fn unit_sphere() -> ColliderShape {
        ColliderShape::Sphere { radius: 0.5 }
    }

    #[test]
    fn test_static_static_pair_untouched() {
        let mut world = hecs::World::new();
        let shape = ColliderShape::Box {
            half_extents: Vec3::splat(1.0),
        };

        let a = spawn_body(
            &mut world,
            Vec3::ZERO,
            Vec3::ZERO,
            RigidBody::fixed(),
            Collider::new(shape.clone()),
        );
        let b = spawn_body(
            &mut world,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::ZERO,
            RigidBody::fixed(),
            Collider::new(shape),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(a, b)], &mut contacts);

        assert!(contacts.is_empty());
        for entity in [a, b] {
            let transform = world.get::<&Transform>(entity).unwrap();
            let rb = world.get::<&RigidBody>(entity).unwrap();
            let collider = world.get::<&Collider>(entity).unwrap();
            assert_eq!(rb.body_type, BodyType::Static);
            assert_eq!(rb.linear_velocity, Vec3::ZERO);
            assert!(!collider.was_collided);
            // Positions untouched.
            assert!(transform.position.x == 0.0 || transform.position.x == 0.5);
        }
    }

    #[test]
    fn test_resting_contact_positional_correction() {
        let mut world = hecs::World::new();

        // Static floor: top surface at y = 0.
        let floor_shape = ColliderShape::Box {
            half_extents: Vec3::new(50.0, 0.5, 50.0),
        };
        let floor = spawn_body(
            &mut world,
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::ZERO,
            RigidBody::fixed(),
            Collider::new(floor_shape),
        );

        // Unit-mass box resting 0.01 into the floor.
        let box_shape = ColliderShape::Box {
            half_extents: Vec3::splat(0.5),
        };
        let cube = spawn_body(
            &mut world,
            Vec3::new(0.0, 0.49, 0.0),
            Vec3::ZERO,
            RigidBody::dynamic(1.0, &box_shape),
            Collider::new(box_shape).with_restitution(0.0),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(floor, cube)], &mut contacts);

        // Correction = max(0.01 - 0.001, 0) * 0.4 = 0.0036, entirely on the
        // dynamic body, scaled by inverse mass (1.0).
        let transform = world.get::<&Transform>(cube).unwrap();
        assert!(
            (transform.position.y - 0.4936).abs() < 1e-5,
            "y = {}",
            transform.position.y
        );

        // No impulse for a contact at zero closing speed.
        let rb = world.get::<&RigidBody>(cube).unwrap();
        assert!(rb.linear_velocity.length() < 1e-6);

        // The floor never moves.
        let floor_transform = world.get::<&Transform>(floor).unwrap();
        assert_eq!(floor_transform.position, Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_resting_contact_correction_scales_with_inverse_mass() {
        // The static-dynamic correction path scales by the dynamic body's raw
        // inverse mass, so doubling the mass halves the nudge. Deliberately
        // not mass-weighted against the static body; see DESIGN.md.
        let mut world = hecs::World::new();

        let floor_shape = ColliderShape::Box {
            half_extents: Vec3::new(50.0, 0.5, 50.0),
        };
        let floor = spawn_body(
            &mut world,
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::ZERO,
            RigidBody::fixed(),
            Collider::new(floor_shape),
        );

        let box_shape = ColliderShape::Box {
            half_extents: Vec3::splat(0.5),
        };
        let cube = spawn_body(
            &mut world,
            Vec3::new(0.0, 0.49, 0.0),
            Vec3::ZERO,
            RigidBody::dynamic(2.0, &box_shape),
            Collider::new(box_shape).with_restitution(0.0),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(floor, cube)], &mut contacts);

        let transform = world.get::<&Transform>(cube).unwrap();
        assert!(
            (transform.position.y - 0.4918).abs() < 1e-5,
            "y = {}",
            transform.position.y
        );
    }

    #[test]
    fn test_equal_mass_head_on_elastic_collision() {
        let mut world = hecs::World::new();
        let shape = unit_sphere();

        let a = spawn_body(
            &mut world,
            Vec3::new(-0.45, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            RigidBody::dynamic(1.0, &shape),
            Collider::new(shape.clone()).with_restitution(1.0),
        );
        let b = spawn_body(
            &mut world,
            Vec3::new(0.45, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            RigidBody::dynamic(1.0, &shape),
            Collider::new(shape).with_restitution(1.0),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(a, b)], &mut contacts);

        // Fully elastic head-on collision of equal point masses: velocities
        // swap (here: reverse).
        let va = world.get::<&RigidBody>(a).unwrap().linear_velocity;
        let vb = world.get::<&RigidBody>(b).unwrap().linear_velocity;
        let eps = 1e-5;
        assert!((va - Vec3::new(-1.0, 0.0, 0.0)).length() < eps, "va = {va:?}");
        assert!((vb - Vec3::new(1.0, 0.0, 0.0)).length() < eps, "vb = {vb:?}");
    }

    #[test]
    fn test_separating_contact_gets_no_impulse() {
        let mut world = hecs::World::new();
        let shape = unit_sphere();

        // Overlapping but already moving apart.
        let a = spawn_body(
            &mut world,
            Vec3::new(-0.45, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            RigidBody::dynamic(1.0, &shape),
            Collider::new(shape.clone()),
        );
        let b = spawn_body(
            &mut world,
            Vec3::new(0.45, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            RigidBody::dynamic(1.0, &shape),
            Collider::new(shape),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(a, b)], &mut contacts);

        // Collision detected...
        assert_eq!(contacts.len(), 1);
        assert!(world.get::<&Collider>(a).unwrap().was_collided);
        assert!(world.get::<&Collider>(b).unwrap().was_collided);

        // ...but velocities unchanged.
        let va = world.get::<&RigidBody>(a).unwrap().linear_velocity;
        let vb = world.get::<&RigidBody>(b).unwrap().linear_velocity;
        assert_eq!(va, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(vb, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_degenerate_denominator_is_guarded() {
        let mut world = hecs::World::new();
        let shape = unit_sphere();

        // Absurdly heavy bodies: the combined inverse mass underflows the
        // denominator guard. The pair must be skipped without producing NaN.
        let a = spawn_body(
            &mut world,
            Vec3::new(-0.45, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            RigidBody::dynamic(1.0e12, &shape),
            Collider::new(shape.clone()),
        );
        let b = spawn_body(
            &mut world,
            Vec3::new(0.45, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            RigidBody::dynamic(1.0e12, &shape),
            Collider::new(shape),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(a, b)], &mut contacts);

        for entity in [a, b] {
            let rb = world.get::<&RigidBody>(entity).unwrap();
            let transform = world.get::<&Transform>(entity).unwrap();
            assert!(rb.linear_velocity.is_finite());
            assert!(transform.position.is_finite());
            // Impulse skipped: approach speed unchanged.
            assert!((rb.linear_velocity.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_was_collided_resets_every_pass() {
        let mut world = hecs::World::new();
        let shape = unit_sphere();

        let a = spawn_body(
            &mut world,
            Vec3::ZERO,
            Vec3::ZERO,
            RigidBody::dynamic(1.0, &shape),
            Collider::new(shape.clone()),
        );
        let b = spawn_body(
            &mut world,
            Vec3::new(0.45, 0.0, 0.0),
            Vec3::ZERO,
            RigidBody::dynamic(1.0, &shape),
            Collider::new(shape),
        );

        let mut contacts = Vec::new();
        resolve_collisions(&mut world, &[(a, b)], &mut contacts);
        assert!(world.get::<&Collider>(a).unwrap().was_collided);

        // Move them apart; the next pass clears the flag.
        world.get::<&mut Transform>(b).unwrap().position = Vec3::new(10.0, 0.0, 0.0);
        resolve_collisions(&mut world, &[(a, b)], &mut contacts);
        assert!(!world.get::<&Collider>(a).unwrap().was_collided);
        assert!(!world.get::<&Collider>(b).unwrap().was_collided);
    }
}
