//! Render target abstraction
//!
//! Provides a convenient interface for rendering to off-screen textures.

use crate::context::WgpuContext;
use crate::core::render_states::ClearState;

/// A render target that can be rendered to.
pub struct RenderTarget<'a> {
    pub(crate) color_view: &'a wgpu::TextureView,
    pub(crate) depth_view: Option<&'a wgpu::TextureView>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl<'a> RenderTarget<'a> {
    /// Create a new render target.
    pub fn new(
        color_view: &'a wgpu::TextureView,
        depth_view: Option<&'a wgpu::TextureView>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            color_view,
            depth_view,
            width,
            height,
        }
    }

    /// Get the render target width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the render target height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Create a render pass with the given clear state.
    pub fn begin_render_pass<'p>(
        &'a self,
        encoder: &'p mut wgpu::CommandEncoder,
        clear: ClearState,
        label: Option<&str>,
    ) -> wgpu::RenderPass<'p>
    where
        'a: 'p,
    {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: self.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: clear.color_load_op(),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_attachment = self
            .depth_view
            .map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: clear.depth_load_op(),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment: depth_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    /// Clear the render target with the given clear state.
    pub fn clear(&self, ctx: &WgpuContext, clear: ClearState) {
        let mut encoder = ctx.create_encoder(Some("clear encoder"));
        {
            let _pass = self.begin_render_pass(&mut encoder, clear, Some("clear pass"));
            // Pass drops immediately, just clearing
        }
        ctx.submit([encoder.finish()]);
    }
}
