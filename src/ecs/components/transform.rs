//! Transform components for ECS entities.

use glam::{Mat4, Quat, Vec3};

/// Local-space transform. Stores position, rotation, and scale separately.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Convert to a 4x4 matrix. Composition order is fixed: scale is applied
    /// first, then rotation, then translation.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Decompose a 4x4 matrix into a Transform.
    ///
    /// Note: This assumes the matrix represents a valid affine transform
    /// (no shear). Non-uniform scale with rotation may lose precision.
    pub fn from_matrix(mat: Mat4) -> Self {
        let (scale, rotation, position) = mat.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// World-space transform matrix: `parent.world * local`. Updated by
/// [`transform_system`](crate::ecs::systems::transform_system).
#[derive(Debug, Clone, Copy)]
pub struct GlobalTransform(pub Mat4);

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// Reference to a parent entity. Stored as an entity index, never an owning
/// pointer, so parent/child cycles cannot leak.
pub struct Parent(pub hecs::Entity);

/// Ordered list of child entities.
pub struct Children(pub Vec<hecs::Entity>);
