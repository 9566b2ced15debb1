//! GPU object picking.
//!
//! Entities are rendered into an off-screen ID target ([`PickTarget`]) by the
//! ID pass ([`PickPass`]); a mouse click reads one pixel back and decodes it
//! into a [`PixelInfo`]. The readback is a synchronous GPU-CPU transfer and
//! stalls the pipeline, which is acceptable because it happens at most once
//! per click, never per frame.
//!
//! Everything is frame-synchronous and single-threaded: the ID pass and the
//! readback run on the thread that owns the rendering context.

pub mod pass;
pub mod target;

pub use pass::PickPass;
pub use target::PickTarget;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::core::geometry::Geometry;
use crate::ecs::components::rendering::{CameraComponent, MeshHandle, PickId};
use crate::ecs::components::transform::GlobalTransform;

/// Object indices at or above this value are reserved for editor handles
/// (gizmo axes). Scene entities must stay below it so both kinds of hits
/// stay distinguishable in one ID target.
///
/// The bound also keeps every reserved index exactly representable in the
/// f32 texels of the ID target (< 2^24).
pub const RESERVED_INDEX_BASE: u32 = 0xFF_0000;

/// Decoded result of a single-pixel readback from the ID target.
///
/// Fields are floats because the target texture is floating-point; the
/// integer identities are recovered with [`object_index`](Self::object_index)
/// and [`draw_index`](Self::draw_index).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelInfo {
    /// Object identity of the entity covering the pixel.
    pub object_id: f32,
    /// Index of the draw call that produced the pixel.
    pub draw_id: f32,
    /// Coverage marker: zero exactly when nothing was rasterized at the
    /// pixel. The target clears to zero and every fragment writes non-zero.
    pub prim_id: f32,
}

impl PixelInfo {
    /// The "nothing under the cursor" sentinel.
    pub const MISS: Self = Self {
        object_id: 0.0,
        draw_id: 0.0,
        prim_id: 0.0,
    };

    /// Decode a raw RGBA texel.
    pub fn from_texel(texel: [f32; 4]) -> Self {
        Self {
            object_id: texel[0],
            draw_id: texel[1],
            prim_id: texel[2],
        }
    }

    /// Whether anything was rendered at the pixel.
    pub fn is_hit(&self) -> bool {
        self.prim_id != 0.0
    }

    /// The object index as written by the ID pass.
    pub fn object_index(&self) -> u32 {
        self.object_id as u32
    }

    /// The draw index as written by the ID pass.
    pub fn draw_index(&self) -> u32 {
        self.draw_id as u32
    }
}

/// Per-draw instance record for the ID pass. Rebuilt every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PickInstance {
    /// Model transform matrix (column-major).
    pub model: [[f32; 4]; 4],
    /// Object identity written to the red channel.
    pub object_index: u32,
    /// Draw index written to the green channel.
    pub draw_index: u32,
}

impl PickInstance {
    /// Create an instance record for one draw.
    pub fn new(model: Mat4, object_index: u32, draw_index: u32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            object_index,
            draw_index,
        }
    }

    /// Get the vertex buffer layout for pick instance data.
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PickInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // model column 0
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // model column 1
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // model column 2
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // model column 3
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // object_index, draw_index
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Uint32x2,
                },
            ],
        }
    }
}

/// One entry of the ID pass draw list.
pub struct PickDraw {
    pub geometry: Arc<dyn Geometry>,
    pub instance: PickInstance,
}

/// Collect the ID pass draw list from the world.
///
/// Eligible entities carry a world transform, a mesh, and a [`PickId`].
/// Entities with a [`CameraComponent`] are excluded, as is anything without
/// a mesh - neither has pixels worth identifying. Draw indices are assigned
/// in iteration order.
pub fn pick_draw_list(world: &hecs::World) -> Vec<PickDraw> {
    let mut draws = Vec::new();
    for (_, (global, mesh, pick_id)) in world
        .query::<hecs::Without<(&GlobalTransform, &MeshHandle, &PickId), &CameraComponent>>()
        .iter()
    {
        let draw_index = draws.len() as u32;
        draws.push(PickDraw {
            geometry: mesh.0.clone(),
            instance: PickInstance::new(global.0, pick_id.0, draw_index),
        });
    }
    draws
}

/// Assign sequential [`PickId`]s to mesh entities that don't have one yet.
///
/// Existing ids are kept; new ids continue from the highest non-reserved id
/// in the world. Id zero is never handed out - it is the miss sentinel.
pub fn assign_pick_ids(world: &mut hecs::World) {
    let mut next = world
        .query::<&PickId>()
        .iter()
        .map(|(_, id)| id.0)
        .filter(|id| *id < RESERVED_INDEX_BASE)
        .max()
        .unwrap_or(0)
        + 1;

    let missing: Vec<hecs::Entity> = world
        .query::<hecs::Without<&MeshHandle, &PickId>>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    for entity in missing {
        // Entity cannot have despawned between the query and here.
        let _ = world.insert_one(entity, PickId(next));
        next += 1;
    }
}
