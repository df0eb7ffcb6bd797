//! Floor highlight surface
//!
//! A single quad sized to the tile field's envelope, sitting just below the
//! tiles. Its plane is what the cursor ray usually hits, and it carries its
//! own eased highlight parameter driven by the same hover edges as the
//! tiles (distinct parameter set, same machinery).

use glam::{Vec2, Vec3};

use super::animate::AnimatedParam;
use super::bounds::BoundsEnvelope;
use super::displace;
use super::pointer::HoverEdge;
use super::raycast::Plane;
use crate::consts::FLOOR_DROP;

#[derive(Debug, Clone, Copy)]
pub struct FloorHighlight {
    /// Quad extents on the floor plane (x, z)
    pub size: Vec2,
    /// Height of the floor plane
    pub y: f32,
    pub highlight: AnimatedParam,
}

impl FloorHighlight {
    /// Size the floor to match the field's envelope
    pub fn from_bounds(bounds: &BoundsEnvelope, highlight_max: f32) -> Self {
        let extent = bounds.extent();
        Self {
            size: Vec2::new(extent.x, extent.z),
            y: FLOOR_DROP,
            highlight: AnimatedParam::new(highlight_max),
        }
    }

    /// The plane the cursor ray tests against
    pub fn plane(&self) -> Plane {
        Plane::horizontal(self.y)
    }

    pub fn on_edge(&mut self, edge: HoverEdge, now: f32) {
        self.highlight.trigger(edge == HoverEdge::Enter, now);
    }

    pub fn step(&mut self, now: f32) {
        self.highlight.step(now);
    }

    /// Highlight blend at a world point on the floor plane (XZ)
    pub fn factor_at(&self, p: Vec2, contact: Vec3) -> f32 {
        displace::highlight_factor(
            p,
            Vec2::new(contact.x, contact.z),
            self.size / 2.0,
            self.highlight.current,
        )
    }
}
