//! Axis-aligned bounding box computation.
//!
//! Provides [`BoundingBox`] for sizing previews and camera framing of a
//! realized L-system.

use crate::types::{Point3, Scalar, Vec3};

// ---------------------------------------------------------------------------
// BoundingBox type
// ---------------------------------------------------------------------------

/// Axis-aligned 3-D bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    /// An empty (inverted) bounding box.
    pub const EMPTY: Self = Self {
        min: Point3::new(Scalar::INFINITY, Scalar::INFINITY, Scalar::INFINITY),
        max: Point3::new(
            Scalar::NEG_INFINITY,
            Scalar::NEG_INFINITY,
            Scalar::NEG_INFINITY,
        ),
    };

    /// Bounding box of a set of points.
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Self {
        let mut bb = Self::EMPTY;
        for p in points {
            bb.include_point(p);
        }
        bb
    }

    /// Check if this bounding box is valid (non-empty).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Extent along each axis; zero when empty.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        if self.is_valid() {
            self.max - self.min
        } else {
            Vec3::ZERO
        }
    }

    /// Center point, if the box is non-empty.
    #[must_use]
    pub fn center(&self) -> Option<Point3> {
        self.is_valid().then(|| self.min + self.size().scale(0.5))
    }

    /// Expand to include a point. Non-finite points are ignored.
    pub fn include_point(&mut self, p: Point3) {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return;
        }
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Expand to include another bounding box.
    pub fn union(&mut self, other: &Self) {
        if other.is_valid() {
            self.include_point(other.min);
            self.include_point(other.max);
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
