//! Axis-aligned envelope of the tile field
//!
//! A single O(n) scan over the instance buffer, expanding each position by
//! half the tile footprint. Computed once at grid build time and cached;
//! only a grid rebuild produces a new envelope.

use glam::Vec3;

use super::grid::TileInstance;

/// Axis-aligned bounds of the whole field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsEnvelope {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundsEnvelope {
    /// Scan all instances, growing a running min/max per axis by half the
    /// footprint in each direction. An empty instance set collapses to a
    /// point at the origin.
    pub fn of_instances(instances: &[TileInstance], footprint: Vec3) -> Self {
        if instances.is_empty() {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        }

        let half = footprint / 2.0;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for tile in instances {
            min = min.min(tile.position - half);
            max = max.max(tile.position + half);
        }

        Self { min, max }
    }

    /// Size of the envelope per axis
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
