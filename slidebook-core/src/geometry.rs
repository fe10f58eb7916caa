//! Viewport geometry and the anchored zoom transform.

use serde::{Deserialize, Serialize};

/// A point in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// The interaction surface, positioned in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in client coordinates.
    pub left: f32,
    /// Top edge in client coordinates.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// A viewport anchored at the client origin.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Move the viewport's client-space origin.
    #[must_use]
    pub const fn with_origin(mut self, left: f32, top: f32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Translate a client-space point into viewport-local coordinates.
    #[must_use]
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }

    /// Whether every field is finite and both extents are non-negative.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Center in viewport-local coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Horizontal position of a local point as a fraction of the width.
    #[must_use]
    pub fn relative_x(&self, local: Point) -> f32 {
        if self.width <= 0.0 {
            return 0.5;
        }
        local.x / self.width
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Scale plus translation applied to the current slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    /// Scale factor (1.0 = fit).
    pub scale: f32,
    /// Horizontal translation in pixels.
    pub offset_x: f32,
    /// Vertical translation in pixels.
    pub offset_y: f32,
}

impl ZoomTransform {
    /// The unzoomed transform.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Zoom to `scale` keeping `anchor` visually fixed.
    ///
    /// `offset = (center - anchor) * (scale - 1)` on each axis. Shared by
    /// double-tap zoom (anchor = tap point) and pinch (anchor = pinch origin).
    #[must_use]
    pub fn anchored(scale: f32, anchor: Point, viewport: &Viewport) -> Self {
        let center = viewport.center();
        Self {
            scale,
            offset_x: (center.x - anchor.x) * (scale - 1.0),
            offset_y: (center.y - anchor.y) * (scale - 1.0),
        }
    }

    /// Largest offset magnitude per axis that keeps the scaled image covering
    /// the viewport: `extent * (scale - 1) / 2`, never negative.
    #[must_use]
    pub fn pan_limit(scale: f32, viewport: &Viewport) -> Point {
        let grow = if scale.is_finite() {
            (scale - 1.0).max(0.0)
        } else {
            0.0
        };
        Point::new(
            usable_extent(viewport.width) * grow / 2.0,
            usable_extent(viewport.height) * grow / 2.0,
        )
    }

    /// Clamp an offset into the legal pan range for `scale`.
    #[must_use]
    pub fn clamp_offset(scale: f32, offset: Point, viewport: &Viewport) -> Point {
        let limit = Self::pan_limit(scale, viewport);
        Point::new(
            offset.x.clamp(-limit.x, limit.x),
            offset.y.clamp(-limit.y, limit.y),
        )
    }

    /// Current offset as a point.
    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    /// Whether this is exactly the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Non-finite or negative extents collapse to zero.
fn usable_extent(extent: f32) -> f32 {
    if extent.is_finite() {
        extent.max(0.0)
    } else {
        0.0
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_at_center_has_no_offset() {
        let viewport = Viewport::new(300.0, 500.0);
        let t = ZoomTransform::anchored(2.0, viewport.center(), &viewport);
        assert!(t.offset_x.abs() < f32::EPSILON);
        assert!(t.offset_y.abs() < f32::EPSILON);
    }

    #[test]
    fn test_anchored_offsets() {
        let viewport = Viewport::new(300.0, 500.0);
        let t = ZoomTransform::anchored(1.5, Point::new(50.0, 50.0), &viewport);
        assert!((t.scale - 1.5).abs() < f32::EPSILON);
        assert!((t.offset_x - 50.0).abs() < 1e-4);
        assert!((t.offset_y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_pan_limit_zero_when_not_magnified() {
        let viewport = Viewport::new(300.0, 500.0);
        assert_eq!(ZoomTransform::pan_limit(1.0, &viewport), Point::default());
        assert_eq!(ZoomTransform::pan_limit(0.5, &viewport), Point::default());
    }

    #[test]
    fn test_clamp_offset() {
        let viewport = Viewport::new(300.0, 500.0);
        let clamped = ZoomTransform::clamp_offset(2.0, Point::new(400.0, -400.0), &viewport);
        assert!((clamped.x - 150.0).abs() < f32::EPSILON);
        assert!((clamped.y + 250.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_degenerate_viewport_never_inverts_limits() {
        for viewport in [
            Viewport::new(-10.0, 500.0),
            Viewport::new(300.0, f32::NAN),
            Viewport::new(f32::INFINITY, f32::NEG_INFINITY),
        ] {
            assert!(!viewport.is_usable());
            let limit = ZoomTransform::pan_limit(2.0, &viewport);
            assert!(limit.x >= 0.0 && limit.y >= 0.0);
            let clamped = ZoomTransform::clamp_offset(2.0, Point::new(40.0, -40.0), &viewport);
            assert!(clamped.x.is_finite() && clamped.y.is_finite());
        }
        assert!(Viewport::new(300.0, 500.0).is_usable());
        assert!(Viewport::new(0.0, 0.0).is_usable());
    }

    #[test]
    fn test_to_local() {
        let viewport = Viewport::new(300.0, 500.0).with_origin(20.0, 40.0);
        assert_eq!(viewport.to_local(Point::new(70.0, 90.0)), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_relative_x() {
        let viewport = Viewport::new(400.0, 300.0);
        assert!((viewport.relative_x(Point::new(100.0, 0.0)) - 0.25).abs() < f32::EPSILON);
        assert!((Viewport::new(0.0, 0.0).relative_x(Point::default()) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_point_helpers() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(60.0, 80.0);
        assert!((a.distance_to(b) - 100.0).abs() < 1e-4);
        assert_eq!(a.midpoint(b), Point::new(30.0, 40.0));
    }
}
