//! Geometry abstractions
//!
//! Provides the `Geometry` trait consumed by render passes and a basic
//! indexed `Mesh` implementation with a few primitive constructors.

use crate::context::WgpuContext;
use crate::core::buffer::{IndexBuffer, VertexBuffer};
use crate::core::vertex::VertexP;

/// Trait for geometry that can be recorded into a render pass.
///
/// Implementations bind their vertex data at slot 0 and issue the draw for a
/// single instance. Slot 1 is reserved for per-draw instance data bound by
/// the pass itself.
pub trait Geometry: Send + Sync {
    /// Record this geometry's draw into the given render pass.
    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>);
}

/// A mesh with vertex and optional index data.
pub struct Mesh {
    vertex_buffer: VertexBuffer,
    index_buffer: Option<IndexBuffer>,
    draw_count: u32,
}

impl Mesh {
    /// Create a new mesh from vertices and optional indices.
    pub fn new(
        ctx: &WgpuContext,
        vertices: &[VertexP],
        indices: Option<&[u32]>,
        label: Option<&str>,
    ) -> Self {
        let vertex_buffer = VertexBuffer::new(ctx, vertices, label);

        let (index_buffer, draw_count) = if let Some(indices) = indices {
            let ib = IndexBuffer::new_u32(ctx, indices, label);
            let count = indices.len() as u32;
            (Some(ib), count)
        } else {
            (None, vertices.len() as u32)
        };

        Self {
            vertex_buffer,
            index_buffer,
            draw_count,
        }
    }

    /// Create a cube mesh centered at the origin.
    pub fn cube(ctx: &WgpuContext, size: f32) -> Self {
        let h = size / 2.0;
        let vertices = [
            VertexP::new([-h, -h, -h]),
            VertexP::new([h, -h, -h]),
            VertexP::new([h, h, -h]),
            VertexP::new([-h, h, -h]),
            VertexP::new([-h, -h, h]),
            VertexP::new([h, -h, h]),
            VertexP::new([h, h, h]),
            VertexP::new([-h, h, h]),
        ];
        #[rustfmt::skip]
        let indices = [
            0u32, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7,    // front
            0, 4, 7, 0, 7, 3,    // left
            1, 6, 5, 1, 2, 6,    // right
            3, 7, 6, 3, 6, 2,    // top
            0, 1, 5, 0, 5, 4,    // bottom
        ];
        Self::new(ctx, &vertices, Some(&indices), Some("cube"))
    }

    /// Create a quad mesh in the XY plane, facing +Z.
    pub fn quad(ctx: &WgpuContext, width: f32, height: f32) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;

        let vertices = [
            VertexP::new([-hw, -hh, 0.0]),
            VertexP::new([hw, -hh, 0.0]),
            VertexP::new([hw, hh, 0.0]),
            VertexP::new([-hw, hh, 0.0]),
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];

        Self::new(ctx, &vertices, Some(&indices), Some("quad"))
    }

    /// Get the number of indices (or vertices when non-indexed) drawn.
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }
}

impl Geometry for Mesh {
    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice());
        if let Some(index_buffer) = &self.index_buffer {
            render_pass.set_index_buffer(index_buffer.slice(), index_buffer.format());
            render_pass.draw_indexed(0..self.draw_count, 0, 0..1);
        } else {
            render_pass.draw(0..self.draw_count, 0..1);
        }
    }
}
