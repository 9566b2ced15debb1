//! Rendering components for ECS entities.

use std::sync::Arc;

use glam::Mat4;

use crate::core::geometry::Geometry;

/// Shared mesh resource handle.
pub struct MeshHandle(pub Arc<dyn Geometry>);

/// Camera component. Entities carrying this are never written into the
/// ID pass.
pub struct CameraComponent {
    /// Combined view-projection matrix.
    pub view_proj: Mat4,
}

/// Stable non-zero identity written into the ID pass for this entity.
/// Zero is reserved for "nothing under the cursor", and indices at or above
/// [`RESERVED_INDEX_BASE`](crate::picking::RESERVED_INDEX_BASE) are reserved
/// for gizmo handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickId(pub u32);
