//! Displacement field policy
//!
//! The falloff law evaluated per vertex in the tile shader, mirrored here
//! for the batched CPU pass and for tests. The WGSL in
//! `renderer/tile_shader.wgsl` must stay in lockstep with these functions.

use glam::{Vec2, Vec3};

use super::grid::TileInstance;
use crate::consts::IDLE_JITTER_AMPLITUDE;

/// Normalized [0, 1] decay with distance from the contact point. Zero at and
/// beyond `radius`, and zero everywhere when the radius itself is zero.
#[inline]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).max(0.0)
}

/// Vertical rise of a point near the contact point
#[inline]
pub fn displacement_y(p: Vec3, contact: Vec3, radius: f32, height: f32) -> f32 {
    falloff(p.distance(contact), radius) * height
}

/// Idle wobble term, phased by the per-instance seed and speed
#[inline]
pub fn idle_jitter_y(elapsed: f32, speed: f32, seed: f32) -> f32 {
    (elapsed * speed).sin() * IDLE_JITTER_AMPLITUDE * seed
}

/// Full vertical offset for one instance
#[inline]
pub fn vertical_offset(
    tile: &TileInstance,
    contact: Vec3,
    radius: f32,
    height: f32,
    elapsed: f32,
) -> f32 {
    displacement_y(tile.position, contact, radius, height)
        + idle_jitter_y(elapsed, tile.speed, tile.seed)
}

/// Batched CPU pass: one offset per instance, written into `out` in instance
/// order. No cross-instance dependencies.
pub fn offsets_into(
    out: &mut Vec<f32>,
    instances: &[TileInstance],
    contact: Vec3,
    radius: f32,
    height: f32,
    elapsed: f32,
) {
    out.clear();
    out.extend(
        instances
            .iter()
            .map(|tile| vertical_offset(tile, contact, radius, height, elapsed)),
    );
}

/// Floor highlight blend factor at a point on the floor plane. Distance is
/// normalized by the floor half-extent, so the highlight radius is in
/// normalized floor units rather than world units.
#[inline]
pub fn highlight_factor(p: Vec2, contact: Vec2, half_extent: Vec2, radius: f32) -> f32 {
    let scale = half_extent.max(Vec2::splat(1e-6));
    let d = ((p - contact) / scale).length();
    falloff(d, radius)
}
