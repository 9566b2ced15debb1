//! Physics components for ECS entities.

use glam::{Mat3, Quat, Vec3};

/// Rigid body classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable. Inverse mass and inverse inertia are zero.
    Static,
}

/// Rigid body component.
///
/// Invariant: `body_type == Static` exactly when `inv_mass == 0.0`. The
/// constructors uphold this; code mutating mass by hand must too.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: BodyType,
    pub mass: f32,
    /// Cached reciprocal of `mass`; zero for static bodies.
    pub inv_mass: f32,
    /// Inverse inertia tensor in the body's local frame.
    pub inv_inertia_local: Mat3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub force_accumulator: Vec3,
    pub torque_accumulator: Vec3,
    /// Gravity scale (default: 1.0 for dynamic bodies).
    pub gravity_scale: f32,
}

impl RigidBody {
    /// Create a dynamic rigid body with the given mass and the inertia tensor
    /// of the given collider shape.
    pub fn dynamic(mass: f32, shape: &ColliderShape) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            inv_inertia_local: shape.local_inv_inertia(mass),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            torque_accumulator: Vec3::ZERO,
            gravity_scale: 1.0,
        }
    }

    /// Create a static (immovable) rigid body.
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            mass: 0.0,
            inv_mass: 0.0,
            inv_inertia_local: Mat3::ZERO,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            torque_accumulator: Vec3::ZERO,
            gravity_scale: 0.0,
        }
    }

    /// Whether this body is immovable.
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Inverse inertia tensor in world space for the given orientation:
    /// `R * I_local^-1 * R^T`. Recomputed per query; the rotation may change
    /// every step, so this is never cached.
    pub fn world_inv_inertia(&self, rotation: Quat) -> Mat3 {
        let r = Mat3::from_quat(rotation);
        r * self.inv_inertia_local * r.transpose()
    }

    /// Apply an impulse at a contact point.
    ///
    /// `r` is the offset from the body's center of mass to the contact point
    /// in world space. Static bodies never move.
    pub fn apply_impulse(&mut self, impulse: Vec3, r: Vec3, rotation: Quat) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.world_inv_inertia(rotation) * r.cross(impulse);
    }
}

/// Collider shape, oriented by the owning body's rotation. An axis-aligned
/// box is a `Box` on an unrotated body.
#[derive(Debug, Clone)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl ColliderShape {
    /// Inverse inertia tensor of the solid shape in its local frame.
    pub fn local_inv_inertia(&self, mass: f32) -> Mat3 {
        if mass <= 0.0 {
            return Mat3::ZERO;
        }
        match self {
            ColliderShape::Sphere { radius } => {
                let i = 2.0 / 5.0 * mass * radius * radius;
                if i > 0.0 {
                    Mat3::from_diagonal(Vec3::splat(1.0 / i))
                } else {
                    Mat3::ZERO
                }
            }
            ColliderShape::Box { half_extents } => {
                let w = 2.0 * half_extents.x;
                let h = 2.0 * half_extents.y;
                let d = 2.0 * half_extents.z;
                let c = mass / 12.0;
                let diag = Vec3::new(
                    c * (h * h + d * d),
                    c * (w * w + d * d),
                    c * (w * w + h * h),
                );
                if diag.min_element() > 0.0 {
                    Mat3::from_diagonal(diag.recip())
                } else {
                    Mat3::ZERO
                }
            }
        }
    }
}

/// Collision component. Owned by exactly one body entity.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Coefficient of restitution (0.0 - 1.0).
    pub restitution: f32,
    /// Set when the last resolution pass found a contact involving this
    /// collider; reset at the start of every pass.
    pub was_collided: bool,
}

impl Collider {
    /// Create a collider with the default restitution.
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            restitution: 0.3,
            was_collided: false,
        }
    }

    /// Set the restitution coefficient.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_body_has_zero_inverse_mass() {
        let rb = RigidBody::fixed();
        assert!(rb.is_static());
        assert_eq!(rb.inv_mass, 0.0);
        assert_eq!(rb.inv_inertia_local, Mat3::ZERO);
    }

    #[test]
    fn test_dynamic_body_inverse_mass() {
        let shape = ColliderShape::Sphere { radius: 1.0 };
        let rb = RigidBody::dynamic(4.0, &shape);
        assert!(!rb.is_static());
        assert!((rb.inv_mass - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_impulse_on_static_body_is_ignored() {
        let mut rb = RigidBody::fixed();
        rb.apply_impulse(Vec3::new(10.0, 0.0, 0.0), Vec3::Y, Quat::IDENTITY);
        assert_eq!(rb.linear_velocity, Vec3::ZERO);
        assert_eq!(rb.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_impulse_through_center_is_purely_linear() {
        let shape = ColliderShape::Sphere { radius: 1.0 };
        let mut rb = RigidBody::dynamic(2.0, &shape);
        rb.apply_impulse(Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, Quat::IDENTITY);
        assert!((rb.linear_velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert!(rb.angular_velocity.length() < 1e-6);
    }

    #[test]
    fn test_offset_impulse_spins_the_body() {
        let shape = ColliderShape::Sphere { radius: 1.0 };
        let mut rb = RigidBody::dynamic(1.0, &shape);
        // Impulse along +X applied one unit above the center: torque around -Z.
        rb.apply_impulse(Vec3::X, Vec3::Y, Quat::IDENTITY);
        assert!(rb.angular_velocity.z < 0.0);
        assert!(rb.angular_velocity.x.abs() < 1e-6);
        assert!(rb.angular_velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_world_inv_inertia_follows_rotation() {
        // A box twice as long on X has distinct inertia per axis; rotating the
        // body a quarter turn around Z must swap the X and Y diagonal entries.
        let shape = ColliderShape::Box {
            half_extents: Vec3::new(2.0, 1.0, 1.0),
        };
        let rb = RigidBody::dynamic(1.0, &shape);

        let local = rb.inv_inertia_local;
        let rotated = rb.world_inv_inertia(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));

        let eps = 1e-5;
        assert!((rotated.x_axis.x - local.y_axis.y).abs() < eps);
        assert!((rotated.y_axis.y - local.x_axis.x).abs() < eps);
        assert!((rotated.z_axis.z - local.z_axis.z).abs() < eps);
    }
}
