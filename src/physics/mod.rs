//! CPU rigid body physics: simulation, collision detection, and resolution.
//!
//! # Architecture
//!
//! The physics pipeline runs in a fixed timestep loop:
//!
//! 1. Apply forces (gravity)
//! 2. Integrate velocities and positions
//! 3. Broadphase collision detection (AABB overlap)
//! 4. Narrowphase collision detection (shape test matrix)
//! 5. Resolve contacts (impulse + positional correction, single pass)
//! 6. Solve positional constraints
//! 7. Synchronize transforms, clear force accumulators
//! 8. Hand contacts and bounds to the debug-draw callback

pub mod broadphase;
pub mod collider;
pub mod constraint;
pub mod contact;
pub mod narrowphase;
pub mod resolver;
pub mod rigid_body;

use glam::Vec3;

use crate::ecs::components::physics::{BodyType, Collider, RigidBody};
use crate::ecs::components::transform::{GlobalTransform, Transform};

use self::broadphase::SweepAndPrune;
use self::collider::PhysicsAabb;
use self::constraint::ConstraintSolver;
use self::contact::ContactManifold;

pub use self::constraint::Constraint;
pub use self::resolver::{resolve_collisions, PENETRATION_ALLOWANCE, PENETRATION_CORRECTION};

/// Errors rejected at body-creation time.
///
/// The per-step hot path never returns these; invalid bodies are refused
/// before they enter the world.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("dynamic body mass must be positive and finite (got {0})")]
    InvalidMass(f32),
}

/// Validate a rigid body's configuration.
pub fn validate_body(body: &RigidBody) -> Result<(), PhysicsError> {
    if body.body_type == BodyType::Dynamic && !(body.mass.is_finite() && body.mass > 0.0) {
        return Err(PhysicsError::InvalidMass(body.mass));
    }
    Ok(())
}

/// Build the component bundle for a physics entity.
///
/// Spawning through this helper guarantees every body enters the world with
/// its collider attached and a validated mass, so resolution never has to
/// cope with half-configured entities.
pub fn body_bundle(
    transform: Transform,
    body: RigidBody,
    collider: Collider,
) -> Result<(Transform, GlobalTransform, RigidBody, Collider), PhysicsError> {
    validate_body(&body)?;
    Ok((
        transform,
        GlobalTransform(transform.to_matrix()),
        body,
        collider,
    ))
}

/// Per-step snapshot handed to the debug-draw callback.
pub struct DebugDraw<'a> {
    /// Contact manifolds produced by the latest resolution pass.
    pub contacts: &'a [ContactManifold],
    /// World-space bounds of every collider.
    pub aabbs: &'a [(hecs::Entity, PhysicsAabb)],
}

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81, 0).
    pub gravity: Vec3,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per frame. Default: 4.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

/// The main physics world managing simulation state.
///
/// Owns the fallback broadphase; an external broad phase can bypass it by
/// calling [`resolve_collisions`] with its own candidate pairs.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    broadphase: SweepAndPrune,
    constraints: ConstraintSolver,
    contacts: Vec<ContactManifold>,
    debug_draw: Option<Box<dyn FnMut(&DebugDraw)>>,
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            broadphase: SweepAndPrune::new(),
            constraints: ConstraintSolver::new(),
            contacts: Vec::new(),
            debug_draw: None,
        }
    }

    /// Append a constraint. Constraints apply every step after collision
    /// resolution, in insertion order.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.add_constraint(constraint);
    }

    /// Install a debug-draw callback invoked at the end of every fixed step.
    pub fn set_debug_draw(&mut self, callback: impl FnMut(&DebugDraw) + 'static) {
        self.debug_draw = Some(Box::new(callback));
    }

    /// Remove the debug-draw callback.
    pub fn clear_debug_draw(&mut self) {
        self.debug_draw = None;
    }

    /// Contact manifolds from the latest resolution pass.
    pub fn contacts(&self) -> &[ContactManifold] {
        &self.contacts
    }

    /// Step the physics simulation forward by `delta_time` seconds.
    ///
    /// Uses a fixed timestep accumulator to ensure deterministic simulation.
    pub fn step(&mut self, world: &mut hecs::World, delta_time: f64) {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(world, self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
    }

    fn fixed_step(&mut self, world: &mut hecs::World, dt: f32) {
        // 1. Apply forces and advance bodies kinematically
        rigid_body::apply_gravity(world, self.config.gravity);
        rigid_body::integrate_velocities(world, dt);
        rigid_body::integrate_positions(world, dt);

        // 2. Broadphase candidate pairs
        let pairs = self.broadphase.find_pairs(world);

        // 3. Narrowphase + impulse resolution + positional correction
        resolver::resolve_collisions(world, &pairs, &mut self.contacts);

        // 4. Positional constraints, after collision resolution
        self.constraints.solve(world);

        // 5. Synchronize transforms and clear accumulators
        rigid_body::sync_transforms(world);
        rigid_body::clear_forces(world);

        // 6. Debug draw
        if let Some(callback) = self.debug_draw.as_mut() {
            let aabbs: Vec<(hecs::Entity, PhysicsAabb)> = world
                .query::<(&Transform, &Collider)>()
                .iter()
                .map(|(entity, (transform, collider))| {
                    (
                        entity,
                        collider
                            .shape
                            .world_aabb(transform.position, transform.rotation),
                    )
                })
                .collect();
            callback(&DebugDraw {
                contacts: &self.contacts,
                aabbs: &aabbs,
            });
        }
    }
}
