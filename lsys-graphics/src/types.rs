//! Core types shared across the L-system workspace.
//!
//! These types define the 3-D affine model used to place geometry:
//! displacement vectors, points, and 4×4 matrices. Matrices are stored
//! column-major and composed by post-multiplication, the same convention
//! GPU instancing buffers and `gl-matrix` use.

use std::ops::{Add, Mul, Neg, Sub};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Convenience alias for all geometric quantities.
pub type Scalar = f64;

/// Tolerance for floating-point comparisons.
pub const EPSILON: Scalar = 1e-9;

/// Threshold below which a determinant or length is treated as zero.
pub const NEAR_ZERO: Scalar = 1e-12;

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(deg: Scalar) -> Scalar {
    deg.to_radians()
}

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

/// A displacement or direction in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    /// The same value on every axis.
    #[inline]
    pub const fn splat(v: Scalar) -> Self {
        Self::new(v, v, v)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> Scalar {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y)).sqrt()
    }

    /// Multiply every component by `s`.
    #[inline]
    #[must_use]
    pub fn scale(self, s: Scalar) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < NEAR_ZERO {
            None
        } else {
            Some(self.scale(1.0 / len))
        }
    }

    /// Component-wise approximate equality.
    #[must_use]
    pub fn approx_eq(self, other: Self, tol: Scalar) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ---------------------------------------------------------------------------
// Point3
// ---------------------------------------------------------------------------

/// A position in 3-D space.
///
/// Unlike [`Vec3`], a point is affected by the translation part of a
/// transform.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    /// Interpret a displacement from the origin as a point.
    #[inline]
    pub const fn from_vec(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    #[must_use]
    pub fn approx_eq(self, other: Self, tol: Scalar) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Vec3) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ---------------------------------------------------------------------------
// Mat4
// ---------------------------------------------------------------------------

/// A 4×4 matrix in column-major order.
///
/// Element `(row, col)` lives at index `col * 4 + row`. Composition is by
/// post-multiplication: `a * b` applies `b` first, then `a`, so a
/// transform accumulator advances with `acc = acc * step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mat4 {
    pub cols: [Scalar; 16],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build from column-major elements.
    #[inline]
    pub const fn from_cols_array(cols: [Scalar; 16]) -> Self {
        Self { cols }
    }

    /// Element at `(row, col)`.
    #[inline]
    pub const fn get(&self, row: usize, col: usize) -> Scalar {
        self.cols[col * 4 + row]
    }

    /// The translation column.
    #[inline]
    pub const fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[12], self.cols[13], self.cols[14])
    }

    /// Apply to a point (translation included).
    #[inline]
    pub fn transform_point(&self, p: Point3) -> Point3 {
        let c = &self.cols;
        Point3::new(
            c[8].mul_add(p.z, c[0].mul_add(p.x, c[4] * p.y)) + c[12],
            c[9].mul_add(p.z, c[1].mul_add(p.x, c[5] * p.y)) + c[13],
            c[10].mul_add(p.z, c[2].mul_add(p.x, c[6] * p.y)) + c[14],
        )
    }

    /// Apply to a vector (translation ignored).
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[8].mul_add(v.z, c[0].mul_add(v.x, c[4] * v.y)),
            c[9].mul_add(v.z, c[1].mul_add(v.x, c[5] * v.y)),
            c[10].mul_add(v.z, c[2].mul_add(v.x, c[6] * v.y)),
        )
    }

    /// Determinant of the upper-left 3×3 (linear) block.
    ///
    /// For the affine matrices produced by this crate this equals the
    /// determinant of the whole matrix.
    #[must_use]
    pub fn linear_determinant(&self) -> Scalar {
        let a = |r, c| self.get(r, c);
        a(0, 0) * a(1, 1).mul_add(a(2, 2), -(a(1, 2) * a(2, 1)))
            - a(0, 1) * a(1, 0).mul_add(a(2, 2), -(a(1, 2) * a(2, 0)))
            + a(0, 2) * a(1, 0).mul_add(a(2, 1), -(a(1, 1) * a(2, 0)))
    }

    /// Whether every element is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().all(|v| v.is_finite())
    }

    /// Column-major `f32` elements, as uploaded to an instance buffer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32_array(&self) -> [f32; 16] {
        self.cols.map(|v| v as f32)
    }

    /// Element-wise approximate equality.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: Scalar) -> bool {
        self.cols
            .iter()
            .zip(other.cols.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum = self.cols[k * 4 + row].mul_add(rhs.cols[col * 4 + k], sum);
                }
                out[col * 4 + row] = sum;
            }
        }
        Self { cols: out }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
