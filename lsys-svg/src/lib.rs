//! SVG preview of a [`Realization`].
//!
//! Every world placement is drawn as the line segment its draw
//! instruction spanned, projected orthographically through a yaw/pitch
//! view rotation.
//!
//! Key design points:
//! - Scene coordinates have Y pointing **up**; SVG has Y pointing **down**.
//!   Y is negated per coordinate, no global transform is emitted.
//! - Path data is built as raw `d` strings at a fixed precision (the `svg`
//!   crate's `Data` builder uses `f32`).
//! - One `<path>` per alphabet symbol, so a symbol's segments can be
//!   styled or picked as a unit.

use std::fmt::Write as _;

use kurbo::{Line, Point, Rect};
use lsys_core::program::Placement;
use lsys_core::Realization;
use lsys_graphics::transform::{rotation_x, rotation_y};
use lsys_graphics::types::{deg_to_rad, Mat4, Point3, Scalar};
use svg::node::element::{Group, Path};
use svg::Document;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Options controlling SVG output.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Rotation about the vertical axis, in degrees. Default: 0.
    pub yaw: Scalar,
    /// Rotation about the horizontal axis, in degrees. Default: 0.
    pub pitch: Scalar,
    /// Extra margin around the bounding box. Default: 1.0.
    pub margin: Scalar,
    /// Number of decimal places for coordinates. Default: 4.
    pub precision: usize,
    /// Default: 0.05.
    pub stroke_width: Scalar,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            margin: 1.0,
            precision: 4,
            stroke_width: 0.05,
        }
    }
}

/// Render a [`Realization`] to an SVG [`Document`].
#[must_use]
pub fn render(realization: &Realization, opts: &RenderOptions) -> Document {
    let view = view_matrix(opts);
    let mut bounds: Option<Rect> = None;
    let mut content = Group::new()
        .set("fill", "none")
        .set("stroke", "#000000")
        .set("stroke-width", fmt_scalar(opts.stroke_width, opts.precision))
        .set("stroke-linecap", "round");

    for symbol in &realization.symbols {
        if symbol.instance_count() == 0 {
            continue;
        }
        let mut d = String::new();
        for &anchor in &symbol.anchors {
            for local in &symbol.subtree.placements {
                let placement = Placement {
                    transform: anchor * local.transform,
                    offset: local.offset,
                };
                let Some(line) = project_segment(&placement, &view) else {
                    continue;
                };
                let rect = Rect::from_points(line.p0, line.p1);
                bounds = Some(bounds.map_or(rect, |b| b.union(rect)));
                write_line(&mut d, line, opts.precision);
            }
        }
        if !d.is_empty() {
            content = content.add(
                Path::new()
                    .set("data-symbol", symbol.symbol.as_str())
                    .set("d", d),
            );
        }
    }

    build_document(bounds, opts, content)
}

/// Render a [`Realization`] to an SVG string.
#[must_use]
pub fn render_to_string(realization: &Realization, opts: &RenderOptions) -> String {
    render(realization, opts).to_string()
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn view_matrix(opts: &RenderOptions) -> Mat4 {
    rotation_x(deg_to_rad(opts.pitch)) * rotation_y(deg_to_rad(opts.yaw))
}

/// The segment a placement spans, projected onto the view plane (scene
/// orientation, Y up). `None` if either end is not finite.
fn project_segment(placement: &Placement, view: &Mat4) -> Option<Line> {
    let half = placement.offset.scale(0.5);
    let to_view = *view * placement.transform;
    let a = to_view.transform_point(Point3::from_vec(-half));
    let b = to_view.transform_point(Point3::from_vec(half));
    let p0 = Point::new(a.x, a.y);
    let p1 = Point::new(b.x, b.y);
    (p0.is_finite() && p1.is_finite()).then(|| Line::new(p0, p1))
}

// ---------------------------------------------------------------------------
// Path data
// ---------------------------------------------------------------------------

fn write_line(d: &mut String, line: Line, precision: usize) {
    if !d.is_empty() {
        d.push(' ');
    }
    d.push('M');
    write_point(d, line.p0, precision);
    d.push_str(" L");
    write_point(d, line.p1, precision);
}

/// Write a point with Y negated for SVG.
fn write_point(d: &mut String, p: Point, precision: usize) {
    let _ = write!(
        d,
        "{} {}",
        fmt_scalar(p.x, precision),
        fmt_scalar(-p.y, precision)
    );
}

/// Format a scalar with the given precision, stripping trailing zeros.
fn fmt_scalar(v: Scalar, precision: usize) -> String {
    let s = format!("{v:.precision$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            "0".to_owned()
        } else {
            trimmed.to_owned()
        }
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

fn build_document(bounds: Option<Rect>, opts: &RenderOptions, content: Group) -> Document {
    let m = opts.margin;
    let (vb_x, vb_y, vb_w, vb_h) = match bounds {
        Some(bb) => {
            let bb = bb.inflate(m, m);
            // scene max_y becomes SVG min_y
            (bb.x0, -bb.y1, bb.width(), bb.height())
        }
        None => (0.0, 0.0, 100.0, 100.0),
    };

    Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set(
            "viewBox",
            format!(
                "{} {} {} {}",
                fmt_scalar(vb_x, opts.precision),
                fmt_scalar(vb_y, opts.precision),
                fmt_scalar(vb_w, opts.precision),
                fmt_scalar(vb_h, opts.precision),
            ),
        )
        .add(content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
