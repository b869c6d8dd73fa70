//! 3-D affine math for placing L-system geometry.

pub mod types;

pub mod bbox;
pub mod transform;
