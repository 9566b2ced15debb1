//! Positional constraints between body pairs.

use glam::Vec3;

use crate::ecs::components::transform::Transform;

/// A constraint coupling two bodies.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Hold two bodies at a fixed distance from each other.
    Distance {
        body_a: hecs::Entity,
        body_b: hecs::Entity,
        target_distance: f32,
    },
}

/// Applies constraints once per step, in insertion order.
///
/// Corrections are position-level and un-damped, and there is no relaxation
/// across multiple constraints: chains of coupled constraints converge slowly
/// and can oscillate. Good enough for tethers and simple rigs.
#[derive(Default)]
pub struct ConstraintSolver {
    constraints: Vec<Constraint>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Append a constraint. Solve order is insertion order.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Number of registered constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Apply every constraint once, in insertion order.
    pub fn solve(&self, world: &mut hecs::World) {
        for constraint in &self.constraints {
            match *constraint {
                Constraint::Distance {
                    body_a,
                    body_b,
                    target_distance,
                } => {
                    solve_distance(world, body_a, body_b, target_distance);
                }
            }
        }
    }
}

/// Move both endpoints half of the distance error along the separation axis.
fn solve_distance(
    world: &mut hecs::World,
    body_a: hecs::Entity,
    body_b: hecs::Entity,
    target_distance: f32,
) {
    let (pos_a, pos_b) = {
        let a = match world.get::<&Transform>(body_a) {
            Ok(t) => t.position,
            Err(_) => return,
        };
        let b = match world.get::<&Transform>(body_b) {
            Ok(t) => t.position,
            Err(_) => return,
        };
        (a, b)
    };

    let delta = pos_b - pos_a;
    let distance = delta.length();
    if distance <= 1e-6 {
        // Coincident endpoints have no separation axis to correct along.
        return;
    }

    let direction = delta / distance;
    let error = distance - target_distance;
    let half_correction: Vec3 = direction * (error * 0.5);

    if let Ok(mut t) = world.get::<&mut Transform>(body_a) {
        t.position += half_correction;
    }
    if let Ok(mut t) = world.get::<&mut Transform>(body_b) {
        t.position -= half_correction;
    }
}
