//! Built-in instruction table.
//!
//! | Family | Names (aliases)                                            | Arities |
//! |--------|------------------------------------------------------------|---------|
//! | move   | `m` (`move`), `mx` (`movex`), `my` (`movey`), `mz` (`movez`) | 3 / 1   |
//! | draw   | `d` (`draw`), `dx` (`drawx`), `dy` (`drawy`), `dz` (`drawz`) | 3 / 1   |
//! | rotate | `r` (`rotate`), `rx` (`rotatex`), `ry` (`rotatey`), `rz` (`rotatez`) | 4 / 1 |
//! | scale  | `s` (`scale`), `sx` (`scalex`), `sy` (`scaley`), `sz` (`scalez`) | 1 or 3 / 1 |
//!
//! Names are case-sensitive. Rotation angles are written in degrees and
//! converted to radians when an instruction is resolved into an [`Op`], so
//! nothing downstream of the compiler dispatches on strings or units.

use lsys_graphics::transform::{axis_angle, rotation_x, rotation_y, rotation_z, scaling, translation};
use lsys_graphics::types::{deg_to_rad, Mat4, Scalar, Vec3};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Function
// ---------------------------------------------------------------------------

/// A built-in instruction, before its operands are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Move,
    MoveX,
    MoveY,
    MoveZ,
    Draw,
    DrawX,
    DrawY,
    DrawZ,
    Rotate,
    RotateX,
    RotateY,
    RotateZ,
    Scale,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl Function {
    pub const ALL: [Self; 16] = [
        Self::Move,
        Self::MoveX,
        Self::MoveY,
        Self::MoveZ,
        Self::Draw,
        Self::DrawX,
        Self::DrawY,
        Self::DrawZ,
        Self::Rotate,
        Self::RotateX,
        Self::RotateY,
        Self::RotateZ,
        Self::Scale,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
    ];

    /// Every name this function answers to; the first is canonical.
    #[must_use]
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Self::Move => &["m", "move"],
            Self::MoveX => &["mx", "movex"],
            Self::MoveY => &["my", "movey"],
            Self::MoveZ => &["mz", "movez"],
            Self::Draw => &["d", "draw"],
            Self::DrawX => &["dx", "drawx"],
            Self::DrawY => &["dy", "drawy"],
            Self::DrawZ => &["dz", "drawz"],
            Self::Rotate => &["r", "rotate"],
            Self::RotateX => &["rx", "rotatex"],
            Self::RotateY => &["ry", "rotatey"],
            Self::RotateZ => &["rz", "rotatez"],
            Self::Scale => &["s", "scale"],
            Self::ScaleX => &["sx", "scalex"],
            Self::ScaleY => &["sy", "scaley"],
            Self::ScaleZ => &["sz", "scalez"],
        }
    }

    /// Canonical short name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.names()[0]
    }

    /// Look up a function by any of its names.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.names().contains(&name))
    }

    /// Operand counts this function accepts, ascending.
    #[must_use]
    pub const fn arities(self) -> &'static [usize] {
        match self {
            Self::Move | Self::Draw => &[3],
            Self::Rotate => &[4],
            Self::Scale => &[1, 3],
            Self::MoveX
            | Self::MoveY
            | Self::MoveZ
            | Self::DrawX
            | Self::DrawY
            | Self::DrawZ
            | Self::RotateX
            | Self::RotateY
            | Self::RotateZ
            | Self::ScaleX
            | Self::ScaleY
            | Self::ScaleZ => &[1],
        }
    }

    /// Select the overload matching `operands.len()` and bind the operands.
    ///
    /// Returns `None` when no overload takes that many operands.
    #[must_use]
    pub fn resolve(self, operands: &[Scalar]) -> Option<Op> {
        let op = match (self, operands) {
            (Self::Move, &[x, y, z]) => Op::Translate(Vec3::new(x, y, z)),
            (Self::MoveX, &[d]) => Op::Translate(Vec3::new(d, 0.0, 0.0)),
            (Self::MoveY, &[d]) => Op::Translate(Vec3::new(0.0, d, 0.0)),
            (Self::MoveZ, &[d]) => Op::Translate(Vec3::new(0.0, 0.0, d)),
            (Self::Draw, &[x, y, z]) => Op::Draw(Vec3::new(x, y, z)),
            (Self::DrawX, &[d]) => Op::Draw(Vec3::new(d, 0.0, 0.0)),
            (Self::DrawY, &[d]) => Op::Draw(Vec3::new(0.0, d, 0.0)),
            (Self::DrawZ, &[d]) => Op::Draw(Vec3::new(0.0, 0.0, d)),
            (Self::Rotate, &[angle, x, y, z]) => Op::Rotate {
                radians: deg_to_rad(angle),
                axis: Vec3::new(x, y, z),
            },
            (Self::RotateX, &[angle]) => Op::Rotate {
                radians: deg_to_rad(angle),
                axis: Vec3::X,
            },
            (Self::RotateY, &[angle]) => Op::Rotate {
                radians: deg_to_rad(angle),
                axis: Vec3::Y,
            },
            (Self::RotateZ, &[angle]) => Op::Rotate {
                radians: deg_to_rad(angle),
                axis: Vec3::Z,
            },
            (Self::Scale, &[f]) => Op::Scale(Vec3::splat(f)),
            (Self::Scale, &[x, y, z]) => Op::Scale(Vec3::new(x, y, z)),
            (Self::ScaleX, &[f]) => Op::Scale(Vec3::new(f, 1.0, 1.0)),
            (Self::ScaleY, &[f]) => Op::Scale(Vec3::new(1.0, f, 1.0)),
            (Self::ScaleZ, &[f]) => Op::Scale(Vec3::new(1.0, 1.0, f)),
            _ => return None,
        };
        Some(op)
    }
}

// ---------------------------------------------------------------------------
// Op
// ---------------------------------------------------------------------------

/// A resolved instruction with its operands bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Op {
    /// Move the accumulator.
    Translate(Vec3),
    /// Emit a placement spanning the displacement, then move.
    Draw(Vec3),
    /// Rotate about `axis` (normalized when applied).
    Rotate { radians: Scalar, axis: Vec3 },
    /// Scale per axis.
    Scale(Vec3),
}

impl Op {
    /// Whether executing this op emits a placement.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::Draw(_))
    }

    /// The matrix this op post-multiplies onto the accumulator.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Translate(v) | Self::Draw(v) => translation(v),
            Self::Rotate { radians, axis } => {
                if axis == Vec3::X {
                    rotation_x(radians)
                } else if axis == Vec3::Y {
                    rotation_y(radians)
                } else if axis == Vec3::Z {
                    rotation_z(radians)
                } else {
                    axis_angle(radians, axis)
                }
            }
            Self::Scale(v) => scaling(v),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
