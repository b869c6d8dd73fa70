//! Affine transform constructors for the L-system instruction set.
//!
//! The instruction set needs these primitives:
//! - translation by a vector (`m`, `d` and their single-axis forms)
//! - rotation about a principal axis (`rx`, `ry`, `rz`)
//! - rotation about an arbitrary axis (`r`)
//! - uniform and per-axis scaling (`s`, `sx`, `sy`, `sz`)
//!
//! All angles here are in **radians**; degree conversion happens when an
//! instruction is resolved.
//!
//! The [`Transformable`] trait provides a uniform interface for applying
//! a matrix to points, vectors and other matrices.

use crate::types::{Mat4, Point3, Scalar, Vec3};

// ---------------------------------------------------------------------------
// Transformable trait
// ---------------------------------------------------------------------------

/// A type that can be transformed by an affine [`Mat4`].
pub trait Transformable {
    /// Apply a transform, returning the transformed value.
    #[must_use]
    fn transformed(&self, t: &Mat4) -> Self;
}

impl Transformable for Point3 {
    #[inline]
    fn transformed(&self, t: &Mat4) -> Self {
        t.transform_point(*self)
    }
}

impl Transformable for Vec3 {
    /// Transform a displacement. Translation is ignored.
    #[inline]
    fn transformed(&self, t: &Mat4) -> Self {
        t.transform_vector(*self)
    }
}

impl Transformable for Mat4 {
    /// Express `self` in the frame of `t`: the result is `t * self`.
    #[inline]
    fn transformed(&self, t: &Mat4) -> Self {
        *t * *self
    }
}

// ---------------------------------------------------------------------------
// Standard transform constructors
// ---------------------------------------------------------------------------

/// Create a translation transform.
#[must_use]
pub const fn translation(v: Vec3) -> Mat4 {
    let mut m = Mat4::IDENTITY;
    m.cols[12] = v.x;
    m.cols[13] = v.y;
    m.cols[14] = v.z;
    m
}

/// Create a (possibly non-uniform) scaling transform.
#[must_use]
pub const fn scaling(v: Vec3) -> Mat4 {
    let mut m = Mat4::IDENTITY;
    m.cols[0] = v.x;
    m.cols[5] = v.y;
    m.cols[10] = v.z;
    m
}

/// Rotation about the +X axis.
#[must_use]
pub fn rotation_x(radians: Scalar) -> Mat4 {
    let (s, c) = radians.sin_cos();
    Mat4::from_cols_array([
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, s, 0.0, //
        0.0, -s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Rotation about the +Y axis.
#[must_use]
pub fn rotation_y(radians: Scalar) -> Mat4 {
    let (s, c) = radians.sin_cos();
    Mat4::from_cols_array([
        c, 0.0, -s, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        s, 0.0, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Rotation about the +Z axis.
#[must_use]
pub fn rotation_z(radians: Scalar) -> Mat4 {
    let (s, c) = radians.sin_cos();
    Mat4::from_cols_array([
        c, s, 0.0, 0.0, //
        -s, c, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Rotation by `radians` about an arbitrary axis.
///
/// The axis is normalized first. A zero-length axis has no direction, so
/// the identity is returned.
#[must_use]
pub fn axis_angle(radians: Scalar, axis: Vec3) -> Mat4 {
    let Some(Vec3 { x, y, z }) = axis.normalized() else {
        return Mat4::IDENTITY;
    };
    let (s, c) = radians.sin_cos();
    let t = 1.0 - c;
    Mat4::from_cols_array([
        (x * x).mul_add(t, c),
        (y * x).mul_add(t, z * s),
        (z * x).mul_add(t, -(y * s)),
        0.0,
        (x * y).mul_add(t, -(z * s)),
        (y * y).mul_add(t, c),
        (z * y).mul_add(t, x * s),
        0.0,
        (x * z).mul_add(t, y * s),
        (y * z).mul_add(t, -(x * s)),
        (z * z).mul_add(t, c),
        0.0,
        0.0,
        0.0,
        0.0,
        1.0,
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
