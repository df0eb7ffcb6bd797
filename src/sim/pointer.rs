//! Pointer interaction tracking
//!
//! Converts queued pointer samples into a smoothed cursor, a world-space
//! contact point, and discrete hover edges. Two states, edge-triggered:
//! Idle emits `Enter` on the first move or explicit enter signal, Hovering
//! emits `Leave` on an explicit leave signal. The cursor ray is cast once
//! per frame, never per input event.

use glam::{Vec2, Vec3};

use super::raycast::{IntersectableSet, Ray};
use crate::consts::*;
use crate::smooth_factor;

/// Discrete hover transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEdge {
    Enter,
    Leave,
}

/// Cursor and contact state, owned by the tracker
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    /// Latest raw cursor in normalized device coordinates
    pub raw_cursor: Vec2,
    /// Lagged cursor the ray is cast through
    pub smoothed_cursor: Vec2,
    /// World-space contact point; sticky across ray misses
    pub contact_point: Option<Vec3>,
    /// Contact point at the last time `needs_update` fired
    pub last_contact: Vec3,
    pub hovering: bool,
    /// True only on frames where the contact point moved past the epsilon
    pub needs_update: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            raw_cursor: Vec2::ZERO,
            smoothed_cursor: Vec2::ZERO,
            contact_point: None,
            last_contact: Vec3::ZERO,
            hovering: false,
            needs_update: false,
        }
    }
}

/// Pointer interaction tracker
#[derive(Debug, Default)]
pub struct PointerTracker {
    pub state: PointerState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the latest queued sample for this frame. Returns the hover
    /// edge if the state machine transitioned; repeated signals on the same
    /// side of the edge are absorbed.
    pub fn apply_sample(
        &mut self,
        cursor: Option<Vec2>,
        entered: bool,
        left: bool,
    ) -> Option<HoverEdge> {
        if let Some(cursor) = cursor {
            self.state.raw_cursor = cursor;
        }

        if self.state.hovering {
            if left {
                self.state.hovering = false;
                return Some(HoverEdge::Leave);
            }
        } else if entered || cursor.is_some() {
            self.state.hovering = true;
            return Some(HoverEdge::Enter);
        }

        None
    }

    /// Move the smoothed cursor toward the raw cursor. Exponential approach,
    /// ~98% of a step covered in `CURSOR_SMOOTH_DURATION` seconds.
    pub fn advance(&mut self, dt: f32) {
        let k = smooth_factor(dt, CURSOR_SMOOTH_DURATION);
        let state = &mut self.state;
        state.smoothed_cursor += (state.raw_cursor - state.smoothed_cursor) * k;
    }

    /// Cast the frame's cursor ray and refresh the contact point. A miss (or
    /// no ray, or no registered surfaces) keeps the previous contact point
    /// and leaves `needs_update` false.
    pub fn cast(&mut self, ray: Option<Ray>, targets: &IntersectableSet) {
        self.state.needs_update = false;

        let Some(ray) = ray else { return };
        if targets.is_empty() {
            return;
        }

        if let Some(hit) = targets.nearest_hit(&ray) {
            self.state.contact_point = Some(hit);
            if hit.distance(self.state.last_contact) > CONTACT_EPSILON {
                self.state.needs_update = true;
                self.state.last_contact = hit;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndc_from_client;
    use crate::sim::raycast::Plane;

    fn down_ray(x: f32, z: f32) -> Option<Ray> {
        Some(Ray::new(Vec3::new(x, 5.0, z), Vec3::NEG_Y))
    }

    fn floor_set() -> IntersectableSet {
        let mut set = IntersectableSet::new();
        set.register(Plane::horizontal(0.0));
        set
    }

    #[test]
    fn test_ndc_mapping() {
        // Viewport corners map to the NDC square, Y flipped
        let tl = ndc_from_client(0.0, 0.0, 800.0, 600.0);
        assert_eq!(tl, Vec2::new(-1.0, 1.0));
        let br = ndc_from_client(800.0, 600.0, 800.0, 600.0);
        assert_eq!(br, Vec2::new(1.0, -1.0));
        let center = ndc_from_client(400.0, 300.0, 800.0, 600.0);
        assert!(center.length() < 1e-6);
    }

    #[test]
    fn test_hover_enter_once() {
        let mut tracker = PointerTracker::new();

        let edge = tracker.apply_sample(Some(Vec2::ZERO), false, false);
        assert_eq!(edge, Some(HoverEdge::Enter));

        // Further moves while hovering emit nothing
        for _ in 0..50 {
            let edge = tracker.apply_sample(Some(Vec2::new(0.1, 0.1)), false, false);
            assert_eq!(edge, None);
        }
    }

    #[test]
    fn test_hover_leave_once() {
        let mut tracker = PointerTracker::new();
        tracker.apply_sample(None, true, false);
        assert!(tracker.state.hovering);

        let edge = tracker.apply_sample(None, false, true);
        assert_eq!(edge, Some(HoverEdge::Leave));

        // Repeated leave signals are absorbed
        for _ in 0..10 {
            assert_eq!(tracker.apply_sample(None, false, true), None);
        }
    }

    #[test]
    fn test_explicit_enter_signal() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.apply_sample(None, true, false), Some(HoverEdge::Enter));
    }

    #[test]
    fn test_smoothing_converges() {
        let mut tracker = PointerTracker::new();
        tracker.apply_sample(Some(Vec2::new(0.8, -0.6)), false, false);

        // Hold the raw cursor for 5 smoothing windows at 60 fps
        let dt = 1.0 / 60.0;
        let frames = (5.0 * CURSOR_SMOOTH_DURATION / dt) as usize;
        for _ in 0..frames {
            tracker.advance(dt);
        }

        let err = (tracker.state.smoothed_cursor - tracker.state.raw_cursor).length();
        assert!(err < 1e-4, "smoothed cursor off by {err}");
    }

    #[test]
    fn test_debounce_threshold() {
        let mut tracker = PointerTracker::new();
        let set = floor_set();

        tracker.cast(down_ray(1.0, 0.0), &set);
        assert!(tracker.state.needs_update);

        // Move within epsilon: no update
        tracker.cast(down_ray(1.0005, 0.0), &set);
        assert!(!tracker.state.needs_update);

        // Move past epsilon: update
        tracker.cast(down_ray(1.005, 0.0), &set);
        assert!(tracker.state.needs_update);
    }

    #[test]
    fn test_miss_keeps_last_contact() {
        let mut tracker = PointerTracker::new();
        let set = floor_set();

        tracker.cast(down_ray(1.0, 2.0), &set);
        let contact = tracker.state.contact_point.unwrap();

        // Ray pointing away from the floor misses
        tracker.cast(
            Some(Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y)),
            &set,
        );
        assert_eq!(tracker.state.contact_point, Some(contact));
        assert!(!tracker.state.needs_update);
    }

    #[test]
    fn test_no_ray_or_empty_set_is_noop() {
        let mut tracker = PointerTracker::new();
        let set = floor_set();

        tracker.cast(None, &set);
        assert!(tracker.state.contact_point.is_none());
        assert!(!tracker.state.needs_update);

        let empty = IntersectableSet::new();
        tracker.cast(down_ray(0.0, 0.0), &empty);
        assert!(tracker.state.contact_point.is_none());
        assert!(!tracker.state.needs_update);
    }
}
