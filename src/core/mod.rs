//! Core rendering abstractions
//!
//! This module provides mid-level abstractions over wgpu primitives.

pub mod buffer;
pub mod geometry;
pub mod pipeline;
pub mod render_states;
pub mod render_target;
pub mod texture;
pub mod vertex;

pub use buffer::{IndexBuffer, UniformBuffer, VertexBuffer};
pub use geometry::{Geometry, Mesh};
pub use pipeline::PipelineBuilder;
pub use render_states::{BlendState, ClearState, CullState, DepthState};
pub use render_target::RenderTarget;
pub use texture::{DepthTexture, Texture2D};
pub use vertex::VertexP;
