//! Off-screen ID target with synchronous pixel readback.

use crate::context::WgpuContext;
use crate::core::texture::{DepthTexture, Texture2D};

use super::PixelInfo;

/// The off-screen target the ID pass renders into.
///
/// Holds a floating-point color texture carrying object/draw indices and a
/// depth texture so closer entities overwrite farther ones. Must be kept at
/// viewport size: call [`check_size`](Self::check_size) (and re-render on
/// resize) before reading pixels, otherwise reads come from a stale target.
pub struct PickTarget {
    color: Texture2D,
    depth: DepthTexture,
    width: u32,
    height: u32,
}

impl PickTarget {
    /// Texel format of the ID texture.
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

    /// Create a target with the given dimensions.
    pub fn new(ctx: &WgpuContext, width: u32, height: u32) -> Self {
        Self {
            color: Self::create_color(ctx, width, height),
            depth: DepthTexture::new(ctx, width, height, Some("pick depth")),
            width,
            height,
        }
    }

    fn create_color(ctx: &WgpuContext, width: u32, height: u32) -> Texture2D {
        Texture2D::new(
            ctx,
            width,
            height,
            Self::COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            Some("pick target"),
        )
    }

    /// Recreate the target if the viewport size changed.
    ///
    /// Returns true when the target was recreated; the caller must re-render
    /// the ID pass before the next [`read_pixel`](Self::read_pixel).
    pub fn check_size(&mut self, ctx: &WgpuContext, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }

        tracing::debug!(width, height, "resizing pick target");
        self.color = Self::create_color(ctx, width, height);
        self.depth = DepthTexture::new(ctx, width, height, Some("pick depth"));
        self.width = width;
        self.height = height;
        true
    }

    /// Read back the pixel at (x, y) and decode it.
    ///
    /// This is a blocking GPU-CPU transfer: it submits a copy, then waits for
    /// the device to flush everything rendered to the target so far. Only
    /// call it on input events, never per frame.
    ///
    /// Coordinates outside the target return [`PixelInfo::MISS`] without
    /// touching the GPU.
    pub fn read_pixel(&self, ctx: &WgpuContext, x: u32, y: u32) -> PixelInfo {
        if x >= self.width || y >= self.height {
            tracing::debug!(x, y, "pick read outside target bounds");
            return PixelInfo::MISS;
        }

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pick readback"),
            size: 16,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx.create_encoder(Some("pick readback copy"));
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: self.color.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: None,
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        ctx.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        let _ = ctx.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv().unwrap().expect("Failed to map pick staging buffer");

        let data = slice.get_mapped_range();
        let texel: [f32; 4] = *bytemuck::from_bytes(&data);
        drop(data);
        staging.unmap();

        PixelInfo::from_texel(texel)
    }

    /// Get the target width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the target height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the color (ID) texture view.
    pub fn color_view(&self) -> &wgpu::TextureView {
        self.color.view()
    }

    /// Get the depth texture view.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        self.depth.view()
    }
}
