//! The ID render pass.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::context::WgpuContext;
use crate::core::buffer::{UniformBuffer, VertexBuffer};
use crate::core::pipeline::PipelineBuilder;
use crate::core::render_states::{BlendState, ClearState, CullState, DepthState};
use crate::core::render_target::RenderTarget;
use crate::core::vertex::VertexP;

use super::target::PickTarget;
use super::{pick_draw_list, PickDraw, PickInstance};

/// Writes (object_index, draw_index, coverage marker) per fragment. WGSL has
/// no primitive-index builtin, so the blue channel is a constant non-zero
/// marker; a cleared pixel stays zero and decodes as a miss.
const PICK_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> camera: Camera;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) model_0: vec4<f32>,
    @location(2) model_1: vec4<f32>,
    @location(3) model_2: vec4<f32>,
    @location(4) model_3: vec4<f32>,
    @location(5) ids: vec2<u32>,
}

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) @interpolate(flat) ids: vec2<u32>,
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    let model = mat4x4<f32>(in.model_0, in.model_1, in.model_2, in.model_3);
    var out: VsOut;
    out.clip_position = camera.view_proj * model * vec4<f32>(in.position, 1.0);
    out.ids = in.ids;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(f32(in.ids.x), f32(in.ids.y), 1.0, 1.0);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

/// Renders eligible entities into a [`PickTarget`], one draw per entity,
/// each submitting its own [`PickInstance`] record.
///
/// Blending is disabled (blended indices are meaningless) and the depth test
/// is enabled, so the front-most entity owns each pixel.
pub struct PickPass {
    pipeline: wgpu::RenderPipeline,
    camera: UniformBuffer<CameraUniform>,
}

impl PickPass {
    /// Create the ID pass pipeline.
    pub fn new(ctx: &WgpuContext) -> anyhow::Result<Self> {
        let camera = UniformBuffer::new(
            ctx,
            &CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            },
            0,
            Some("pick camera"),
        );

        let pipeline = PipelineBuilder::new(ctx)
            .label("pick pass")
            .shader(PICK_SHADER)
            .vertex_layout(VertexP::layout())
            .vertex_layout(PickInstance::layout())
            .bind_group_layout(camera.bind_group_layout())
            .color_format(PickTarget::COLOR_FORMAT)
            .depth(DepthState::read_write())
            .blend(BlendState::Opaque)
            .cull(CullState::None)
            .build()?;

        Ok(Self { pipeline, camera })
    }

    /// Render the world's pickable entities into the target.
    ///
    /// Collects the draw list (cameras and mesh-less entities excluded),
    /// clears the target to the miss sentinel, and draws every entry.
    pub fn render(
        &self,
        ctx: &WgpuContext,
        world: &hecs::World,
        target: &PickTarget,
        view_proj: Mat4,
    ) {
        let draws = pick_draw_list(world);
        self.render_draws(ctx, &draws, target, view_proj);
    }

    /// Render an explicit draw list into the target.
    ///
    /// Used by the editor to append gizmo handles with reserved object
    /// indices to the scene's draw list.
    pub fn render_draws(
        &self,
        ctx: &WgpuContext,
        draws: &[PickDraw],
        target: &PickTarget,
        view_proj: Mat4,
    ) {
        self.camera.update(
            ctx,
            &CameraUniform {
                view_proj: view_proj.to_cols_array_2d(),
            },
        );

        let instances: Vec<PickInstance> = draws.iter().map(|draw| draw.instance).collect();
        let instance_buffer = (!instances.is_empty())
            .then(|| VertexBuffer::new(ctx, &instances, Some("pick instances")));

        let mut encoder = ctx.create_encoder(Some("pick pass encoder"));
        {
            let render_target = RenderTarget::new(
                target.color_view(),
                Some(target.depth_view()),
                target.width(),
                target.height(),
            );
            let mut pass = render_target.begin_render_pass(
                &mut encoder,
                ClearState::color_and_depth([0.0, 0.0, 0.0, 0.0], 1.0),
                Some("pick pass"),
            );

            if let Some(instance_buffer) = &instance_buffer {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, self.camera.bind_group(), &[]);

                for (i, draw) in draws.iter().enumerate() {
                    pass.set_vertex_buffer(
                        1,
                        instance_buffer.slice_from(i as u64 * instance_buffer.stride()),
                    );
                    draw.geometry.draw(&mut pass);
                }
            }
        }
        ctx.submit([encoder.finish()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Mesh;
    use crate::ecs::components::rendering::{MeshHandle, PickId};
    use crate::ecs::components::transform::{GlobalTransform, Transform};
    use std::sync::Arc;

    /// These tests need a real device; they no-op on machines without one.
    fn test_ctx() -> Option<WgpuContext> {
        WgpuContext::new_blocking(None).ok()
    }

    #[test]
    fn test_empty_scene_reads_miss() {
        let Some(ctx) = test_ctx() else { return };

        let target = PickTarget::new(&ctx, 64, 64);
        let pass = PickPass::new(&ctx).unwrap();
        let world = hecs::World::new();

        pass.render(&ctx, &world, &target, Mat4::IDENTITY);

        let pixel = target.read_pixel(&ctx, 32, 32);
        assert!(!pixel.is_hit());
        assert_eq!(pixel, super::super::PixelInfo::MISS);
    }

    #[test]
    fn test_single_entity_reads_its_object_index() {
        let Some(ctx) = test_ctx() else { return };

        let target = PickTarget::new(&ctx, 64, 64);
        let pass = PickPass::new(&ctx).unwrap();

        // A 2x2 quad at the origin under an identity camera covers the whole
        // clip space, so every pixel belongs to it.
        let mut world = hecs::World::new();
        world.spawn((
            Transform::identity(),
            GlobalTransform::default(),
            MeshHandle(Arc::new(Mesh::quad(&ctx, 2.0, 2.0))),
            PickId(7),
        ));

        pass.render(&ctx, &world, &target, Mat4::IDENTITY);

        let pixel = target.read_pixel(&ctx, 32, 32);
        assert!(pixel.is_hit());
        assert_eq!(pixel.object_index(), 7);
        assert_eq!(pixel.draw_index(), 0);
    }

    #[test]
    fn test_out_of_bounds_read_is_a_miss() {
        let Some(ctx) = test_ctx() else { return };

        let target = PickTarget::new(&ctx, 64, 64);
        assert!(!target.read_pixel(&ctx, 64, 0).is_hit());
        assert!(!target.read_pixel(&ctx, 0, 64).is_hit());
        assert!(!target.read_pixel(&ctx, 1000, 1000).is_hit());
    }

    #[test]
    fn test_check_size_recreates_on_mismatch() {
        let Some(ctx) = test_ctx() else { return };

        let mut target = PickTarget::new(&ctx, 64, 64);
        assert!(!target.check_size(&ctx, 64, 64));
        assert!(!target.check_size(&ctx, 0, 32));

        assert!(target.check_size(&ctx, 128, 32));
        assert_eq!(target.width(), 128);
        assert_eq!(target.height(), 32);
    }
}
