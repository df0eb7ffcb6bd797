//! Per-frame field orchestration
//!
//! One tick per rendered frame, in a fixed order: pointer sampling, then
//! animator stepping, then displacement inputs. The tick returns a
//! `FrameContext` snapshot; everything downstream (renderer, floor
//! highlight, any other hover consumer) reads that snapshot rather than
//! reaching into the field's internals.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::animate::TileResponse;
use super::bounds::BoundsEnvelope;
use super::displace;
use super::floor::FloorHighlight;
use super::grid::{ConfigError, GridConfig, GridLayout};
use super::pointer::{HoverEdge, PointerTracker};
use super::raycast::IntersectableSet;
use crate::camera::Camera;

/// Latest pointer sample plus one-shot edge signals for a single frame.
/// The host's event closures write into this; edges and the sample are
/// cleared after each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Raw cursor in normalized device coordinates, if it moved this frame
    pub cursor: Option<Vec2>,
    /// Pointer entered the tracked viewport
    pub entered: bool,
    /// Pointer left the tracked viewport
    pub left: bool,
}

impl FrameInput {
    /// Clear the consumed sample and one-shot signals
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Value snapshot of one frame, passed down the render path
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub elapsed: f32,
    pub dt: f32,
    /// Sticky world-space contact point; `None` until the first ray hit
    pub contact_point: Option<Vec3>,
    pub hovering: bool,
    /// True when the contact point moved past the epsilon this frame
    pub needs_update: bool,
    /// Eased parameter values for this frame
    pub radius: f32,
    pub height: f32,
    pub highlight: f32,
    /// Hover edge that fired this frame, if any
    pub edge: Option<HoverEdge>,
}

/// The whole interactive field: immutable instance data plus the per-frame
/// interaction state. Inert on teardown - it owns no callbacks or scheduled
/// work, so dropping it is synchronous and complete.
pub struct FieldState {
    pub grid: GridLayout,
    pub bounds: BoundsEnvelope,
    pub tracker: PointerTracker,
    pub tiles: TileResponse,
    pub floor: FloorHighlight,
    pub intersectables: IntersectableSet,
    pub elapsed: f32,
}

impl FieldState {
    /// Build the field: generate the grid, derive its envelope, size the
    /// floor to match and register it as the first intersectable surface.
    /// Construction is the only fallible step; per-frame work degrades to
    /// no-ops instead of erroring.
    pub fn new(
        config: &GridConfig,
        radius_max: f32,
        height_max: f32,
        highlight_max: f32,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        let grid = GridLayout::generate(config, rng)?;
        let bounds = BoundsEnvelope::of_instances(&grid.instances, config.footprint);
        let floor = FloorHighlight::from_bounds(&bounds, highlight_max);

        let mut intersectables = IntersectableSet::new();
        intersectables.register(floor.plane());

        log::info!(
            "field built: {} tiles, envelope {:.2}x{:.2}",
            grid.count(),
            bounds.extent().x,
            bounds.extent().z,
        );

        Ok(Self {
            grid,
            bounds,
            tracker: PointerTracker::new(),
            tiles: TileResponse::new(radius_max, height_max),
            floor,
            intersectables,
            elapsed: 0.0,
        })
    }

    /// Advance one frame. Order is load-bearing for visual fidelity:
    /// pointer sampling happens before animator stepping, which happens
    /// before the displacement inputs are snapshotted.
    pub fn tick(&mut self, input: &FrameInput, camera: Option<&Camera>, dt: f32) -> FrameContext {
        self.elapsed += dt;
        let now = self.elapsed;

        // 1. Pointer: consume the latest sample, smooth, cast
        let edge = self
            .tracker
            .apply_sample(input.cursor, input.entered, input.left);
        self.tracker.advance(dt);
        let ray = camera.and_then(|c| c.screen_ray(self.tracker.state.smoothed_cursor));
        self.tracker.cast(ray, &self.intersectables);

        // 2. Animators: retrigger on edges, then step
        if let Some(edge) = edge {
            self.tiles.on_edge(edge, now);
            self.floor.on_edge(edge, now);
        }
        self.tiles.step(now);
        self.floor.step(now);

        // 3. Snapshot for the render path
        FrameContext {
            elapsed: now,
            dt,
            contact_point: self.tracker.state.contact_point,
            hovering: self.tracker.state.hovering,
            needs_update: self.tracker.state.needs_update,
            radius: self.tiles.radius.current,
            height: self.tiles.height.current,
            highlight: self.floor.highlight.current,
            edge,
        }
    }

    /// Batched CPU displacement pass over every instance, in instance order.
    /// Without a contact point only the idle jitter contributes.
    pub fn displacement_offsets(&self, ctx: &FrameContext, out: &mut Vec<f32>) {
        let contact = ctx.contact_point.unwrap_or(Vec3::ZERO);
        let radius = if ctx.contact_point.is_some() {
            ctx.radius
        } else {
            0.0
        };
        displace::offsets_into(
            out,
            &self.grid.instances,
            contact,
            radius,
            ctx.height,
            ctx.elapsed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn small_field() -> FieldState {
        let config = GridConfig {
            rows: 3,
            cols: 3,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(42);
        FieldState::new(
            &config,
            DISPLACEMENT_RADIUS_MAX,
            DISPLACEMENT_HEIGHT_MAX,
            HIGHLIGHT_RADIUS_MAX,
            &mut rng,
        )
        .unwrap()
    }

    fn overhead_camera() -> Camera {
        let mut camera = Camera::new(1.0);
        camera.eye = Vec3::new(0.0, 3.0, 0.01);
        camera
    }

    #[test]
    fn test_floor_registered_at_build() {
        let field = small_field();
        assert_eq!(field.intersectables.len(), 1);
        assert_eq!(field.grid.count(), 9);
    }

    #[test]
    fn test_full_loop_enter_hover_leave() {
        let mut field = small_field();
        let camera = overhead_camera();

        // Enter with the cursor at viewport center
        let enter = FrameInput {
            cursor: Some(Vec2::ZERO),
            entered: true,
            ..Default::default()
        };
        let ctx = field.tick(&enter, Some(&camera), DT);
        assert!(ctx.hovering);
        assert_eq!(ctx.edge, Some(HoverEdge::Enter));
        assert!(ctx.contact_point.is_some());

        // Parameters rise while hovering
        let idle = FrameInput::default();
        let mut ctx = ctx;
        for _ in 0..30 {
            ctx = field.tick(&idle, Some(&camera), DT);
            assert_eq!(ctx.edge, None);
        }
        assert!(ctx.radius > 0.0);
        assert!(ctx.height > 0.0);
        assert!(ctx.highlight > 0.0);

        // After the full easing window they sit at their maxima
        for _ in 0..60 {
            ctx = field.tick(&idle, Some(&camera), DT);
        }
        assert!((ctx.radius - DISPLACEMENT_RADIUS_MAX).abs() < 1e-5);
        assert!((ctx.height - DISPLACEMENT_HEIGHT_MAX).abs() < 1e-5);

        // Leave decays everything back to zero
        let leave = FrameInput {
            left: true,
            ..Default::default()
        };
        let ctx = field.tick(&leave, Some(&camera), DT);
        assert_eq!(ctx.edge, Some(HoverEdge::Leave));
        let mut ctx = ctx;
        for _ in 0..90 {
            ctx = field.tick(&idle, Some(&camera), DT);
        }
        assert_eq!(ctx.radius, 0.0);
        assert_eq!(ctx.height, 0.0);
        assert_eq!(ctx.highlight, 0.0);
        assert!(!ctx.hovering);
    }

    #[test]
    fn test_stationary_cursor_stops_updates() {
        let mut field = small_field();
        let camera = overhead_camera();

        let enter = FrameInput {
            cursor: Some(Vec2::new(0.2, 0.1)),
            entered: true,
            ..Default::default()
        };
        field.tick(&enter, Some(&camera), DT);

        // Let the smoothed cursor settle on the raw position
        let idle = FrameInput::default();
        for _ in 0..600 {
            field.tick(&idle, Some(&camera), DT);
        }
        let ctx = field.tick(&idle, Some(&camera), DT);
        assert!(!ctx.needs_update);
        assert!(ctx.contact_point.is_some());
    }

    #[test]
    fn test_missing_camera_is_noop() {
        let mut field = small_field();
        let input = FrameInput {
            cursor: Some(Vec2::ZERO),
            entered: true,
            ..Default::default()
        };

        let ctx = field.tick(&input, None, DT);
        // Hover edges still fire (they are input-driven), but no contact
        assert!(ctx.hovering);
        assert!(ctx.contact_point.is_none());
        assert!(!ctx.needs_update);
    }

    #[test]
    fn test_displacement_offsets_cover_all_instances() {
        let mut field = small_field();
        let camera = overhead_camera();

        let enter = FrameInput {
            cursor: Some(Vec2::ZERO),
            entered: true,
            ..Default::default()
        };
        let mut ctx = field.tick(&enter, Some(&camera), DT);
        let idle = FrameInput::default();
        for _ in 0..120 {
            ctx = field.tick(&idle, Some(&camera), DT);
        }

        let mut offsets = Vec::new();
        field.displacement_offsets(&ctx, &mut offsets);
        assert_eq!(offsets.len(), 9);

        // With the contact over the field center, at least one tile rises
        // above the jitter band
        assert!(offsets.iter().any(|o| *o > IDLE_JITTER_AMPLITUDE));
    }

    #[test]
    fn test_input_clear() {
        let mut input = FrameInput {
            cursor: Some(Vec2::ONE),
            entered: true,
            left: true,
        };
        input.clear();
        assert!(input.cursor.is_none());
        assert!(!input.entered && !input.left);
    }
}
