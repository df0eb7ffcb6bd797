//! Hover response easing
//!
//! Each interaction parameter carries a small explicit animation record
//! (start value, target, start time, duration) evaluated from elapsed time
//! every frame. Re-triggering overwrites the record starting from the
//! current interpolated value, so an enter during an in-flight leave (or
//! vice versa) continues smoothly instead of snapping.

use super::pointer::HoverEdge;
use crate::consts::HOVER_EASE_DURATION;

/// Ease-out cubic: monotonic, decelerating, first derivative zero at the end
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// In-flight transition for one scalar parameter
#[derive(Debug, Clone, Copy)]
struct ParamAnimation {
    start: f32,
    target: f32,
    start_time: f32,
    duration: f32,
}

impl ParamAnimation {
    fn value_at(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.target;
        }
        let t = (now - self.start_time) / self.duration;
        self.start + (self.target - self.start) * ease_out_cubic(t)
    }

    fn finished(&self, now: f32) -> bool {
        now - self.start_time >= self.duration
    }
}

/// A scalar interaction parameter eased between 0 and its operator-set max
#[derive(Debug, Clone, Copy)]
pub struct AnimatedParam {
    pub current: f32,
    pub target: f32,
    pub max: f32,
    anim: Option<ParamAnimation>,
}

impl AnimatedParam {
    pub fn new(max: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            max,
            anim: None,
        }
    }

    /// Retarget toward `max` (hover enter) or zero (hover leave). An
    /// in-flight animation is superseded, not queued: the new one starts
    /// from the current interpolated value at `now`.
    pub fn trigger(&mut self, to_max: bool, now: f32) {
        let target = if to_max { self.max } else { 0.0 };
        self.target = target;
        self.anim = Some(ParamAnimation {
            start: self.current,
            target,
            start_time: now,
            duration: HOVER_EASE_DURATION,
        });
    }

    /// Advance `current` to the eased value at `now`
    pub fn step(&mut self, now: f32) {
        if let Some(anim) = self.anim {
            self.current = anim.value_at(now);
            if anim.finished(now) {
                self.current = anim.target;
                self.anim = None;
            }
        }
    }

    /// Operator override of the ceiling. A parameter currently raised (or
    /// rising) follows the new ceiling.
    pub fn set_max(&mut self, max: f32) {
        self.max = max;
        if self.target > 0.0 {
            self.target = max;
            match &mut self.anim {
                Some(anim) => anim.target = max,
                None => self.current = max,
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        self.anim.is_some()
    }
}

/// The tile field's eased parameter set, driven in parallel from hover edges
#[derive(Debug, Clone, Copy)]
pub struct TileResponse {
    pub radius: AnimatedParam,
    pub height: AnimatedParam,
}

impl TileResponse {
    pub fn new(radius_max: f32, height_max: f32) -> Self {
        Self {
            radius: AnimatedParam::new(radius_max),
            height: AnimatedParam::new(height_max),
        }
    }

    pub fn on_edge(&mut self, edge: HoverEdge, now: f32) {
        let to_max = edge == HoverEdge::Enter;
        self.radius.trigger(to_max, now);
        self.height.trigger(to_max, now);
    }

    pub fn step(&mut self, now: f32) {
        self.radius.step(now);
        self.height.step(now);
    }
}
