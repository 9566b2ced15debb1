//! Rigid body integration functions.

use glam::{Quat, Vec3};

use crate::ecs::components::physics::{BodyType, RigidBody};
use crate::ecs::components::transform::{GlobalTransform, Transform};

/// Apply gravity force to all dynamic rigid bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec3) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if rb.body_type == BodyType::Dynamic && rb.mass > 0.0 {
            rb.force_accumulator += gravity * rb.mass * rb.gravity_scale;
        }
    }
}

/// Integrate velocities using semi-implicit Euler: v += (F/m) * dt.
pub fn integrate_velocities(world: &mut hecs::World, dt: f32) {
    for (_, (rb, transform)) in world.query_mut::<(&mut RigidBody, &Transform)>() {
        if rb.body_type != BodyType::Dynamic {
            continue;
        }

        // Linear velocity: v += (F/m) * dt
        rb.linear_velocity += rb.force_accumulator * rb.inv_mass * dt;

        // Angular velocity: omega += I_world^-1 * tau * dt
        let inv_inertia = rb.world_inv_inertia(transform.rotation);
        rb.angular_velocity += inv_inertia * rb.torque_accumulator * dt;
    }
}

/// Integrate positions: p += v * dt, q += 0.5 * omega * q * dt.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, (rb, transform)) in world.query_mut::<(&RigidBody, &mut Transform)>() {
        if rb.body_type != BodyType::Dynamic {
            continue;
        }

        transform.position += rb.linear_velocity * dt;

        // Quaternion integration: q' = q + 0.5 * dt * omega_quat * q
        let omega = rb.angular_velocity;
        if omega.length_squared() > 1e-10 {
            let omega_quat = Quat::from_xyzw(omega.x, omega.y, omega.z, 0.0);
            let q_dot = omega_quat * transform.rotation * 0.5;
            transform.rotation = Quat::from_xyzw(
                transform.rotation.x + q_dot.x * dt,
                transform.rotation.y + q_dot.y * dt,
                transform.rotation.z + q_dot.z * dt,
                transform.rotation.w + q_dot.w * dt,
            )
            .normalize();
        }
    }
}

/// Synchronize body Transforms to GlobalTransform.
pub fn sync_transforms(world: &mut hecs::World) {
    for (_, (transform, global)) in world.query_mut::<(&Transform, &mut GlobalTransform)>() {
        global.0 = transform.to_matrix();
    }
}

/// Clear force and torque accumulators on all rigid bodies.
pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        rb.force_accumulator = Vec3::ZERO;
        rb.torque_accumulator = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::ColliderShape;

    #[test]
    fn test_free_fall() {
        let mut world = hecs::World::new();

        let shape = ColliderShape::Sphere { radius: 0.5 };
        let entity = world.spawn((
            Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
            GlobalTransform::default(),
            RigidBody::dynamic(1.0, &shape),
        ));

        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let dt = 1.0 / 60.0;

        // Simulate 1 second (60 steps)
        for _ in 0..60 {
            apply_gravity(&mut world, gravity);
            integrate_velocities(&mut world, dt);
            integrate_positions(&mut world, dt);
            sync_transforms(&mut world);
            clear_forces(&mut world);
        }

        let transform = world.get::<&Transform>(entity).unwrap();

        // After 1 second of free fall from y=10: y = 10 - 0.5*9.81 ~ 5.1,
        // give or take discrete-step error.
        assert!(
            transform.position.y < 6.0,
            "Body should have fallen: y = {}",
            transform.position.y
        );
        assert!(
            transform.position.y > 4.0,
            "Body should not have fallen too far in 1 second: y = {}",
            transform.position.y
        );

        // X and Z should be unchanged
        let eps = 1e-5;
        assert!(transform.position.x.abs() < eps);
        assert!(transform.position.z.abs() < eps);
    }

    #[test]
    fn test_static_body_unaffected() {
        let mut world = hecs::World::new();

        let entity = world.spawn((
            Transform::from_position(Vec3::ZERO),
            GlobalTransform::default(),
            RigidBody::fixed(),
        ));

        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let dt = 1.0 / 60.0;

        for _ in 0..60 {
            apply_gravity(&mut world, gravity);
            integrate_velocities(&mut world, dt);
            integrate_positions(&mut world, dt);
            clear_forces(&mut world);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert_eq!(transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_torque_spins_body() {
        let mut world = hecs::World::new();

        let shape = ColliderShape::Sphere { radius: 1.0 };
        let entity = world.spawn((Transform::identity(), {
            let mut rb = RigidBody::dynamic(1.0, &shape);
            rb.torque_accumulator = Vec3::new(0.0, 0.4, 0.0);
            rb
        }));

        integrate_velocities(&mut world, 1.0);
        integrate_positions(&mut world, 1.0);

        let rb = world.get::<&RigidBody>(entity).unwrap();
        assert!(rb.angular_velocity.y > 0.0);

        let transform = world.get::<&Transform>(entity).unwrap();
        assert!(transform.rotation != Quat::IDENTITY);
    }

    #[test]
    fn test_clear_forces() {
        let mut world = hecs::World::new();

        let shape = ColliderShape::Sphere { radius: 0.5 };
        let entity = world.spawn((Transform::identity(), {
            let mut rb = RigidBody::dynamic(1.0, &shape);
            rb.force_accumulator = Vec3::new(10.0, 20.0, 30.0);
            rb.torque_accumulator = Vec3::new(1.0, 2.0, 3.0);
            rb
        }));

        clear_forces(&mut world);

        let rb = world.get::<&RigidBody>(entity).unwrap();
        assert_eq!(rb.force_accumulator, Vec3::ZERO);
        assert_eq!(rb.torque_accumulator, Vec3::ZERO);
    }
}
