//! Contact data structures for collision response.

use glam::Vec3;

/// Result of a single narrowphase shape test.
#[derive(Debug, Clone, Copy)]
pub struct ContactInfo {
    /// Contact normal (unit length, from shape A toward shape B).
    pub normal: Vec3,
    /// Penetration depth (>= 0 when colliding).
    pub penetration: f32,
    /// Contact point in world space.
    pub point: Vec3,
}

/// Contact points between two entities for one resolution pass.
///
/// Ephemeral: rebuilt from scratch on every pair check, never persisted
/// across steps.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub entity_a: hecs::Entity,
    pub entity_b: hecs::Entity,
    /// Contact normal (unit length, from A toward B).
    pub normal: Vec3,
    /// Penetration depth.
    pub penetration: f32,
    /// Contact points in world space.
    pub points: Vec<Vec3>,
}
