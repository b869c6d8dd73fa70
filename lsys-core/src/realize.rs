//! Geometric realization.
//!
//! [`apply`] runs the transform programs of a symbol sequence over one
//! accumulator. [`optimize_and_apply`] avoids expanding a grammar to its
//! full depth: every alphabet symbol is expanded on its own for the
//! subtree depth only, and the shallow top-level expansion just records
//! where each occurrence's subtree is anchored.
//!
//! For `main + subtree` generations the full expansion is the
//! concatenation, over the symbols of the `main`-deep expansion, of each
//! symbol's `subtree`-deep expansion. Programs compose by matrix product,
//! so a world placement is `anchor · local`.

use std::hash::Hash;

use lsys_graphics::bbox::BoundingBox;
use lsys_graphics::transform::Transformable;
use lsys_graphics::types::{Mat4, Point3};
use serde::Serialize;

use crate::error::InternError;
use crate::growth::{expand, iterate, IterationPlan, RealizeOptions};
use crate::program::Placement;
use crate::system::{intern, Application, Interned, Specification};

/// Placements and net transform of one applied sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppResult {
    /// One per executed draw, in execution order.
    pub placements: Vec<Placement>,
    /// Accumulator after the whole sequence.
    pub composed: Mat4,
}

impl AppResult {
    /// The placement matrices alone.
    pub fn transformations(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.placements.iter().map(|p| p.transform)
    }
}

/// Run `sequence` through `app` from the identity.
#[must_use]
pub fn apply<S: Eq + Hash>(app: &Application<S>, sequence: &[S]) -> AppResult {
    let mut placements = Vec::new();
    let mut acc = Mat4::IDENTITY;
    for symbol in sequence {
        if let Some(program) = app.get(symbol) {
            acc = program.run_into(acc, &mut placements);
        }
    }
    AppResult {
        placements,
        composed: acc,
    }
}

// ---------------------------------------------------------------------------
// Realization
// ---------------------------------------------------------------------------

/// One alphabet symbol's canonical subtree and where it is anchored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRealization {
    pub symbol: String,
    /// The symbol expanded alone for the subtree depth, applied from the
    /// identity.
    pub subtree: AppResult,
    /// One per occurrence in the top-level expansion, in order.
    pub anchors: Vec<Mat4>,
}

impl SymbolRealization {
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.subtree.placements.len() * self.anchors.len()
    }
}

/// Output of [`optimize_and_apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Realization {
    pub plan: IterationPlan,
    /// Indexed like the interned alphabet.
    pub symbols: Vec<SymbolRealization>,
    /// The `main`-deep top-level expansion, as alphabet indices.
    #[serde(skip)]
    pub total: Vec<usize>,
}

/// A GPU-ready batch: every local cube of one symbol's subtree, drawn once
/// per anchor. Matrices are column-major `f32`, 16 per matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceBatch {
    pub symbol: String,
    pub local: Vec<f32>,
    pub anchors: Vec<f32>,
}

impl InstanceBatch {
    #[must_use]
    pub fn submesh_count(&self) -> usize {
        self.local.len() / 16
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.anchors.len() / 16
    }
}

impl Realization {
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<&SymbolRealization> {
        self.symbols.iter().find(|s| s.symbol == name)
    }

    /// Total placements across all anchors.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.symbols.iter().map(SymbolRealization::instance_count).sum()
    }

    /// Every world placement, grouped by symbol then anchor.
    pub fn world_placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.symbols.iter().flat_map(|s| {
            s.anchors.iter().flat_map(move |&anchor| {
                s.subtree.placements.iter().map(move |p| Placement {
                    transform: p.transform.transformed(&anchor),
                    offset: p.offset,
                })
            })
        })
    }

    /// Every world placement in the order a full literal expansion would
    /// emit them.
    #[must_use]
    pub fn ordered_placements(&self) -> Vec<Placement> {
        let mut next = vec![0usize; self.symbols.len()];
        let mut out = Vec::with_capacity(self.instance_count());
        for &index in &self.total {
            let Some(symbol) = self.symbols.get(index) else {
                continue;
            };
            let Some(&anchor) = symbol.anchors.get(next[index]) else {
                continue;
            };
            next[index] += 1;
            out.extend(symbol.subtree.placements.iter().map(|p| Placement {
                transform: p.transform.transformed(&anchor),
                offset: p.offset,
            }));
        }
        out
    }

    /// Bounds of every drawn segment, in world space.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.world_placements().flat_map(|p| {
            let half = p.offset.scale(0.5);
            [
                Point3::from_vec(-half).transformed(&p.transform),
                Point3::from_vec(half).transformed(&p.transform),
            ]
        }))
    }

    /// Per-symbol instance buffers; symbols that place nothing are skipped.
    #[must_use]
    pub fn instance_batches(&self) -> Vec<InstanceBatch> {
        self.symbols
            .iter()
            .filter(|s| s.instance_count() > 0)
            .map(|s| InstanceBatch {
                symbol: s.symbol.clone(),
                local: s
                    .subtree
                    .transformations()
                    .flat_map(|m| m.to_f32_array())
                    .collect(),
                anchors: s.anchors.iter().flat_map(Mat4::to_f32_array).collect(),
            })
            .collect()
    }
}

/// Realize `spec` with `main` top-level generations and `subtree`
/// generations per canonical subtree.
///
/// # Errors
///
/// Fails if `spec` or `app` mention symbols outside the alphabet.
pub fn optimize_and_apply(
    spec: &Specification<String>,
    app: &Application<String>,
    main: usize,
    subtree: usize,
) -> Result<Realization, InternError> {
    let interned = intern(spec)?;
    let app = interned.application(app)?;
    Ok(realize_interned(&interned, &app, IterationPlan { main, subtree }))
}

/// Plan depths with `options`, then realize.
///
/// # Errors
///
/// Fails if `spec` or `app` mention symbols outside the alphabet.
pub fn realize(
    spec: &Specification<String>,
    app: &Application<String>,
    options: &RealizeOptions,
) -> Result<Realization, InternError> {
    let interned = intern(spec)?;
    let app = interned.application(app)?;
    let plan = options.plan(&interned.spec, &app);
    Ok(realize_interned(&interned, &app, plan))
}

fn realize_interned(
    interned: &Interned<String>,
    app: &Application<usize>,
    plan: IterationPlan,
) -> Realization {
    let mut symbols: Vec<SymbolRealization> = interned
        .symbols
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let expansion = expand(&interned.spec, &[index], plan.subtree);
            let subtree = apply(app, &expansion);
            tracing::trace!(
                symbol = %name,
                length = expansion.len(),
                draws = subtree.placements.len(),
                "expanded subtree"
            );
            SymbolRealization {
                symbol: name.clone(),
                subtree,
                anchors: Vec::new(),
            }
        })
        .collect();

    let total = iterate(&interned.spec, plan.main);
    let mut m = Mat4::IDENTITY;
    for &index in &total {
        if let Some(symbol) = symbols.get_mut(index) {
            symbol.anchors.push(m);
            m = m * symbol.subtree.composed;
        }
    }

    let realization = Realization {
        plan,
        symbols,
        total,
    };
    tracing::debug!(
        main = plan.main,
        subtree = plan.subtree,
        anchors = realization.total.len(),
        instances = realization.instance_count(),
        "realized"
    );
    realization
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
