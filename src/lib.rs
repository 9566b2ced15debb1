//! Kestrel 3D engine core
//!
//! Rigid body physics, a scene/transform hierarchy, and GPU object picking
//! built on wgpu.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **context** - Core wgpu wrapper (Device, Queue)
//! 2. **core** - GPU primitives (buffers, textures, pipelines, render targets)
//! 3. **ecs** - hecs integration (transforms, hierarchy, bodies, colliders)
//! 4. **physics** - Rigid body simulation and impulse-based collision resolution
//! 5. **picking** - Off-screen ID pass and pixel readback for hit testing
//! 6. **editor** - Selection and gizmo interaction driven by the ID pass

pub mod context;
pub mod core;
pub mod ecs;
pub mod editor;
pub mod physics;
pub mod picking;

// Re-export commonly used types
pub use context::WgpuContext;

pub use crate::core::{
    BlendState, ClearState, CullState, DepthState, DepthTexture, Geometry, IndexBuffer, Mesh,
    PipelineBuilder, RenderTarget, Texture2D, UniformBuffer, VertexBuffer, VertexP,
};

pub use ecs::prelude::*;

pub use physics::{
    DebugDraw, PhysicsConfig, PhysicsError, PhysicsWorld, PENETRATION_ALLOWANCE,
    PENETRATION_CORRECTION,
};

pub use picking::{PickInstance, PickPass, PickTarget, PixelInfo};

pub use editor::{GizmoAxis, GizmoInteraction, InputState, MouseButton, PickResult, Selection};

// Re-export glam for convenience
pub use glam;
