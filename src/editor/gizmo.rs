//! Translation gizmo interaction.
//!
//! Axis handles are ordinary ID-pass draws with reserved object indices, so
//! hovering and grabbing an axis reuses the same pixel readback as entity
//! selection. The interaction itself is a small state machine advanced once
//! per frame from polled input - no event callbacks.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::core::geometry::Geometry;
use crate::picking::{PickDraw, PickInstance, PixelInfo, RESERVED_INDEX_BASE};

use super::input::{InputState, MouseButton};

/// A translation axis of the gizmo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    /// World-space direction of this axis.
    pub fn direction(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }

    /// Object index this axis's handle writes into the ID target.
    pub fn object_index(self) -> u32 {
        RESERVED_INDEX_BASE
            + match self {
                GizmoAxis::X => 0,
                GizmoAxis::Y => 1,
                GizmoAxis::Z => 2,
            }
    }

    /// Recover the axis from an ID-target object index, if it names a handle.
    pub fn from_object_index(index: u32) -> Option<Self> {
        match index.checked_sub(RESERVED_INDEX_BASE) {
            Some(0) => Some(GizmoAxis::X),
            Some(1) => Some(GizmoAxis::Y),
            Some(2) => Some(GizmoAxis::Z),
            _ => None,
        }
    }

    /// Orientation mapping the handle geometry (modeled along +Y) onto this
    /// axis.
    fn handle_rotation(self) -> Quat {
        match self {
            GizmoAxis::X => Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2),
            GizmoAxis::Y => Quat::IDENTITY,
            GizmoAxis::Z => Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        }
    }
}

/// ID-pass draws for the three axis handles at the given origin.
///
/// `handle` is the shared handle geometry, modeled along +Y. Draw indices
/// continue from `base_draw_index` so the handles can be appended to a scene
/// draw list.
pub fn gizmo_draws(
    handle: &Arc<dyn Geometry>,
    origin: Vec3,
    scale: f32,
    base_draw_index: u32,
) -> Vec<PickDraw> {
    GizmoAxis::ALL
        .iter()
        .enumerate()
        .map(|(i, &axis)| {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(scale),
                axis.handle_rotation(),
                origin,
            );
            PickDraw {
                geometry: handle.clone(),
                instance: PickInstance::new(model, axis.object_index(), base_draw_index + i as u32),
            }
        })
        .collect()
}

/// Interaction state, advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoState {
    #[default]
    Idle,
    /// Cursor is over an axis handle, button up.
    Hovering(GizmoAxis),
    /// Axis grabbed; stays grabbed while the button is held even when the
    /// cursor leaves the handle's pixels.
    Dragging(GizmoAxis),
}

/// Cursor movement applied to a grabbed axis this frame.
#[derive(Debug, Clone, Copy)]
pub struct GizmoDrag {
    pub axis: GizmoAxis,
    pub cursor_delta: Vec2,
}

impl GizmoDrag {
    /// World-space translation for this drag.
    ///
    /// The cursor delta is projected onto the axis's direction as seen on
    /// screen, then scaled by `units_per_pixel`.
    pub fn translation(&self, view_proj: Mat4, origin: Vec3, units_per_pixel: f32) -> Vec3 {
        let screen_dir = screen_axis(view_proj, origin, self.axis.direction());
        let amount = self.cursor_delta.dot(screen_dir) * units_per_pixel;
        self.axis.direction() * amount
    }
}

/// Screen-space direction (y down) of a world-space axis at `origin`.
pub fn screen_axis(view_proj: Mat4, origin: Vec3, direction: Vec3) -> Vec2 {
    let p0 = view_proj.project_point3(origin);
    let p1 = view_proj.project_point3(origin + direction);
    // NDC y points up, screen y points down.
    Vec2::new(p1.x - p0.x, -(p1.y - p0.y)).normalize_or_zero()
}

/// The gizmo interaction state machine: Idle -> Hovering -> Dragging.
#[derive(Debug, Default)]
pub struct GizmoInteraction {
    state: GizmoState,
}

impl GizmoInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current interaction state.
    pub fn state(&self) -> GizmoState {
        self.state
    }

    /// Whether an axis is currently grabbed.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GizmoState::Dragging(_))
    }

    /// Advance the state machine one frame.
    ///
    /// `hit` is the ID-target pixel under the cursor (from the last readback
    /// or per-frame hover query). Returns the drag movement to apply, if an
    /// axis is grabbed and the cursor moved.
    pub fn update(&mut self, input: &InputState, hit: PixelInfo) -> Option<GizmoDrag> {
        let hovered_axis = if hit.is_hit() {
            GizmoAxis::from_object_index(hit.object_index())
        } else {
            None
        };

        self.state = match self.state {
            GizmoState::Idle | GizmoState::Hovering(_) => match hovered_axis {
                Some(axis) if input.is_button_just_pressed(MouseButton::Left) => {
                    GizmoState::Dragging(axis)
                }
                Some(axis) => GizmoState::Hovering(axis),
                None => GizmoState::Idle,
            },
            GizmoState::Dragging(axis) => {
                if input.is_button_down(MouseButton::Left) {
                    GizmoState::Dragging(axis)
                } else {
                    match hovered_axis {
                        Some(axis) => GizmoState::Hovering(axis),
                        None => GizmoState::Idle,
                    }
                }
            }
        };

        match self.state {
            GizmoState::Dragging(axis) if input.cursor_delta() != Vec2::ZERO => Some(GizmoDrag {
                axis,
                cursor_delta: input.cursor_delta(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_hit(axis: GizmoAxis) -> PixelInfo {
        PixelInfo {
            object_id: axis.object_index() as f32,
            draw_id: 0.0,
            prim_id: 1.0,
        }
    }

    fn entity_hit(index: u32) -> PixelInfo {
        PixelInfo {
            object_id: index as f32,
            draw_id: 0.0,
            prim_id: 1.0,
        }
    }

    #[test]
    fn test_object_index_roundtrip() {
        for axis in GizmoAxis::ALL {
            assert_eq!(GizmoAxis::from_object_index(axis.object_index()), Some(axis));
        }
        assert_eq!(GizmoAxis::from_object_index(7), None);
        assert_eq!(GizmoAxis::from_object_index(RESERVED_INDEX_BASE + 3), None);
    }

    #[test]
    fn test_hover_and_grab() {
        let mut gizmo = GizmoInteraction::new();
        let mut input = InputState::new();

        // Nothing under the cursor.
        gizmo.update(&input, PixelInfo::MISS);
        assert_eq!(gizmo.state(), GizmoState::Idle);

        // Cursor over the X handle.
        gizmo.update(&input, axis_hit(GizmoAxis::X));
        assert_eq!(gizmo.state(), GizmoState::Hovering(GizmoAxis::X));

        // Press grabs the hovered axis.
        input.begin_frame();
        input.set_button(MouseButton::Left, true);
        gizmo.update(&input, axis_hit(GizmoAxis::X));
        assert_eq!(gizmo.state(), GizmoState::Dragging(GizmoAxis::X));
    }

    #[test]
    fn test_drag_survives_leaving_the_handle() {
        let mut gizmo = GizmoInteraction::new();
        let mut input = InputState::new();

        input.set_button(MouseButton::Left, true);
        gizmo.update(&input, axis_hit(GizmoAxis::Y));
        assert!(gizmo.is_dragging());

        // Cursor moves off the handle pixels while the button is held: the
        // grab must not be dropped.
        input.begin_frame();
        input.set_cursor(Vec2::new(100.0, 0.0));
        let drag = gizmo.update(&input, PixelInfo::MISS);
        assert_eq!(gizmo.state(), GizmoState::Dragging(GizmoAxis::Y));
        assert!(drag.is_some());

        // Release ends the drag.
        input.begin_frame();
        input.set_button(MouseButton::Left, false);
        gizmo.update(&input, PixelInfo::MISS);
        assert_eq!(gizmo.state(), GizmoState::Idle);
    }

    #[test]
    fn test_entity_hit_does_not_engage_gizmo() {
        let mut gizmo = GizmoInteraction::new();
        let mut input = InputState::new();

        input.set_button(MouseButton::Left, true);
        gizmo.update(&input, entity_hit(42));
        assert_eq!(gizmo.state(), GizmoState::Idle);
    }

    #[test]
    fn test_screen_axis_identity_camera() {
        // Identity camera: world X maps to screen right, world Y to screen up
        // (negative screen y).
        let x = screen_axis(Mat4::IDENTITY, Vec3::ZERO, Vec3::X);
        assert!((x - Vec2::new(1.0, 0.0)).length() < 1e-5);

        let y = screen_axis(Mat4::IDENTITY, Vec3::ZERO, Vec3::Y);
        assert!((y - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_drag_translation_follows_screen_axis() {
        // Dragging right along the screen moves the body along +X under an
        // identity camera.
        let drag = GizmoDrag {
            axis: GizmoAxis::X,
            cursor_delta: Vec2::new(10.0, 0.0),
        };
        let translation = drag.translation(Mat4::IDENTITY, Vec3::ZERO, 0.1);
        assert!((translation - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);

        // Cursor movement perpendicular to the axis contributes nothing.
        let drag = GizmoDrag {
            axis: GizmoAxis::X,
            cursor_delta: Vec2::new(0.0, 25.0),
        };
        let translation = drag.translation(Mat4::IDENTITY, Vec3::ZERO, 0.1);
        assert!(translation.length() < 1e-5);
    }

    #[test]
    fn test_gizmo_draws_use_reserved_indices() {
        struct NullGeometry;
        impl Geometry for NullGeometry {
            fn draw(&self, _render_pass: &mut wgpu::RenderPass<'_>) {}
        }

        let handle: Arc<dyn Geometry> = Arc::new(NullGeometry);
        let draws = gizmo_draws(&handle, Vec3::new(1.0, 2.0, 3.0), 0.5, 4);

        assert_eq!(draws.len(), 3);
        for (i, draw) in draws.iter().enumerate() {
            assert_eq!(draw.instance.draw_index, 4 + i as u32);
            assert!(draw.instance.object_index >= RESERVED_INDEX_BASE);
            // Handles are placed at the gizmo origin.
            assert_eq!(draw.instance.model[3][0], 1.0);
            assert_eq!(draw.instance.model[3][1], 2.0);
            assert_eq!(draw.instance.model[3][2], 3.0);
        }
    }
}
