//! Transform hierarchy propagation system.

use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};

/// Propagate transforms through the Parent/Children hierarchy.
///
/// Phase 1: Update root entities (no Parent) - GlobalTransform = Transform.to_matrix()
/// Phase 2: Recursively propagate through Children hierarchy.
pub fn transform_system(world: &mut hecs::World) {
    // Phase 1: Root entities (entities with Transform + GlobalTransform but no Parent).
    // Collect root entities and their matrices first to avoid borrow conflicts.
    let roots: Vec<(hecs::Entity, glam::Mat4)> = world
        .query_mut::<hecs::Without<(&Transform, &GlobalTransform), &Parent>>()
        .into_iter()
        .map(|(entity, (transform, _))| (entity, transform.to_matrix()))
        .collect();

    for (entity, matrix) in &roots {
        if let Ok(mut global) = world.get::<&mut GlobalTransform>(*entity) {
            global.0 = *matrix;
        }
    }

    // Phase 2: Propagate through hierarchy.
    let root_with_children: Vec<(hecs::Entity, glam::Mat4)> = roots
        .iter()
        .filter(|(entity, _)| world.satisfies::<&Children>(*entity).unwrap_or(false))
        .copied()
        .collect();

    for (entity, parent_matrix) in root_with_children {
        propagate_children(world, entity, parent_matrix);
    }
}

/// Recursively propagate GlobalTransform to children.
fn propagate_children(world: &mut hecs::World, parent: hecs::Entity, parent_global: glam::Mat4) {
    // Get the list of children (clone to release borrow).
    let children = match world.get::<&Children>(parent) {
        Ok(c) => c.0.clone(),
        Err(_) => return,
    };

    for child in children {
        // Child's world matrix = parent.world * local.
        let child_global = match world.get::<&Transform>(child) {
            Ok(transform) => parent_global * transform.to_matrix(),
            Err(_) => parent_global,
        };

        if let Ok(mut global) = world.get::<&mut GlobalTransform>(child) {
            global.0 = child_global;
        }

        // Recurse into grandchildren.
        if world.satisfies::<&Children>(child).unwrap_or(false) {
            propagate_children(world, child, child_global);
        }
    }
}
