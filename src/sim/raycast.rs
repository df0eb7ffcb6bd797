//! Cursor ray intersection
//!
//! The pointer tracker casts one ray per frame against an open set of
//! registered surfaces and keeps the nearest hit. Surfaces implement
//! `Intersectable`; the floor quad registers its plane at startup, anything
//! else can join later.

use glam::Vec3;

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point along the ray at parameter t
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A surface the cursor ray can hit. Returns the distance along the ray to
/// the nearest intersection in front of the origin, if any.
pub trait Intersectable {
    fn intersect(&self, ray: &Ray) -> Option<f32>;
}

/// Infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Horizontal plane at the given height
    pub fn horizontal(y: f32) -> Self {
        Self {
            point: Vec3::new(0.0, y, 0.0),
            normal: Vec3::Y,
        }
    }
}

impl Intersectable for Plane {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-8 {
            return None;
        }
        let t = (self.point - ray.origin).dot(self.normal) / denom;
        (t > 0.0).then_some(t)
    }
}

/// Registration surface for hit-testable targets
#[derive(Default)]
pub struct IntersectableSet {
    targets: Vec<Box<dyn Intersectable>>,
}

impl IntersectableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: impl Intersectable + 'static) {
        self.targets.push(Box::new(target));
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Nearest hit point across all registered surfaces
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Vec3> {
        let mut best: Option<f32> = None;
        for target in &self.targets {
            if let Some(t) = target.intersect(ray) {
                if best.is_none_or(|b| t < b) {
                    best = Some(t);
                }
            }
        }
        best.map(|t| ray.point_at(t))
    }
}
