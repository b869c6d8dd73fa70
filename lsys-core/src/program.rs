//! Compiled per-symbol transform programs.
//!
//! A program is a pure fold over the accumulator matrix. Because every op
//! post-multiplies onto the accumulator, the placement of each draw is
//! `acc · D_i` for a matrix `D_i` fixed at compile time, and the final
//! accumulator is `acc · net`. Running a program is therefore one matrix
//! product per draw plus one for the net, whatever the op count.

use lsys_graphics::transform::translation;
use lsys_graphics::types::{Mat4, Vec3, NEAR_ZERO};
use serde::Serialize;

use crate::function::Op;

/// One emitted geometry placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Accumulator translated halfway along the draw's displacement.
    pub transform: Mat4,
    /// The displacement the draw applied.
    pub offset: Vec3,
}

/// A draw step, relative to the program's starting accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawStep {
    pub local: Mat4,
    pub offset: Vec3,
}

/// The ordered instruction list of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformProgram {
    ops: Vec<Op>,
    draws: Vec<DrawStep>,
    net: Mat4,
}

impl Default for TransformProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformProgram {
    /// An empty program: no draws, identity net transform.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: Vec::new(),
            draws: Vec::new(),
            net: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn from_ops(ops: impl IntoIterator<Item = Op>) -> Self {
        let mut program = Self::new();
        for op in ops {
            program.push(op);
        }
        program
    }

    /// Append an op, extending the precomputed draw steps and net.
    pub fn push(&mut self, op: Op) {
        if let Op::Draw(v) = op {
            self.draws.push(DrawStep {
                local: self.net * translation(v.scale(0.5)),
                offset: v,
            });
        }
        self.net = self.net * op.matrix();
        self.ops.push(op);
    }

    /// Whether the accumulated linear part is singular (or not finite),
    /// so that a draw executed now would place a flattened instance.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.net.is_finite() || self.net.linear_determinant().abs() < NEAR_ZERO
    }

    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    #[must_use]
    pub fn draws(&self) -> &[DrawStep] {
        &self.draws
    }

    /// The transform the whole program applies to the accumulator.
    #[must_use]
    pub const fn net(&self) -> Mat4 {
        self.net
    }

    /// Number of placements one run emits.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Run from `acc`, appending placements to `out`; returns the final
    /// accumulator.
    pub fn run_into(&self, acc: Mat4, out: &mut Vec<Placement>) -> Mat4 {
        out.extend(self.draws.iter().map(|d| Placement {
            transform: acc * d.local,
            offset: d.offset,
        }));
        acc * self.net
    }

    /// Run from `acc`: `(final accumulator, placements in execution order)`.
    #[must_use]
    pub fn run(&self, acc: Mat4) -> (Mat4, Vec<Placement>) {
        let mut placements = Vec::with_capacity(self.draws.len());
        let acc = self.run_into(acc, &mut placements);
        (acc, placements)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
