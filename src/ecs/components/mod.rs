//! Component types.

pub mod physics;
pub mod rendering;
pub mod transform;

pub use physics::{BodyType, Collider, ColliderShape, RigidBody};
pub use rendering::{CameraComponent, MeshHandle, PickId};
pub use transform::{Children, GlobalTransform, Parent, Transform};
