//! Collider bounding volumes for broadphase collision detection.

use glam::{Mat3, Quat, Vec3};

use crate::ecs::components::physics::ColliderShape;

/// Axis-aligned bounding box for broadphase collision detection.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsAabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl PhysicsAabb {
    /// Test whether two AABBs overlap.
    #[inline]
    pub fn overlaps(&self, other: &PhysicsAabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

impl ColliderShape {
    /// Compute the world-space AABB of this shape at the given pose.
    pub fn world_aabb(&self, position: Vec3, rotation: Quat) -> PhysicsAabb {
        match self {
            ColliderShape::Sphere { radius } => PhysicsAabb {
                min: position - Vec3::splat(*radius),
                max: position + Vec3::splat(*radius),
            },
            ColliderShape::Box { half_extents } => {
                // World extent along each axis is |R| * h.
                let r = Mat3::from_quat(rotation);
                let abs_r = Mat3::from_cols(r.x_axis.abs(), r.y_axis.abs(), r.z_axis.abs());
                let extent = abs_r * *half_extents;
                PhysicsAabb {
                    min: position - extent,
                    max: position + extent,
                }
            }
        }
    }
}
