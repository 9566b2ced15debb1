//! Editor-side selection and gizmo interaction.
//!
//! Everything here is driven by the picking pipeline: a click reads one pixel
//! from the ID target, [`Selection`] resolves it to an entity or a gizmo
//! axis, and [`GizmoInteraction`] turns held-button cursor movement into axis
//! translations.

pub mod gizmo;
pub mod input;

pub use gizmo::{gizmo_draws, GizmoAxis, GizmoDrag, GizmoInteraction, GizmoState};
pub use input::{InputState, MouseButton};

use crate::ecs::components::rendering::PickId;
use crate::picking::PixelInfo;

/// What a pick resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickResult {
    /// Nothing under the cursor.
    Miss,
    /// A scene entity.
    Entity(hecs::Entity),
    /// A gizmo axis handle.
    Gizmo(GizmoAxis),
}

/// Tracks the selected entity across clicks.
#[derive(Debug, Default)]
pub struct Selection {
    selected: Option<hecs::Entity>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected entity.
    pub fn selected(&self) -> Option<hecs::Entity> {
        self.selected
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Resolve a readback pixel to whatever it identifies.
    pub fn resolve(world: &hecs::World, pixel: PixelInfo) -> PickResult {
        if !pixel.is_hit() {
            return PickResult::Miss;
        }

        let index = pixel.object_index();
        if let Some(axis) = GizmoAxis::from_object_index(index) {
            return PickResult::Gizmo(axis);
        }

        world
            .query::<&PickId>()
            .iter()
            .find(|(_, id)| id.0 == index)
            .map(|(entity, _)| PickResult::Entity(entity))
            .unwrap_or(PickResult::Miss)
    }

    /// Resolve a click and update the selection.
    ///
    /// Clicking empty space clears the selection; clicking a gizmo handle
    /// keeps it (the handle belongs to the selected entity).
    pub fn handle_click(&mut self, world: &hecs::World, pixel: PixelInfo) -> PickResult {
        let result = Self::resolve(world, pixel);
        match result {
            PickResult::Miss => self.selected = None,
            PickResult::Entity(entity) => self.selected = Some(entity),
            PickResult::Gizmo(_) => {}
        }
        result
    }
}
