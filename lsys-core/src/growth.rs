//! Growth engine: literal expansion, and counting without expansion.
//!
//! [`iterate`] rewrites a sequence generation by generation and is only
//! ever used at shallow depth. [`ExpansionCounter`] answers "how long is
//! the sequence (or how many draws does it trigger) after `n` generations"
//! in `O(alphabet × n)` by memoizing per `(symbol, depth)` in a dense
//! table. Counts saturate at `u64::MAX`.

use std::hash::Hash;

use serde::Serialize;

use crate::system::{Application, Specification};

/// Expand `spec.axiom` through `n` generations of parallel rewriting.
#[must_use]
pub fn iterate<S: Clone + Eq + Hash>(spec: &Specification<S>, n: usize) -> Vec<S> {
    expand(spec, &spec.axiom, n)
}

/// Expand `start` through `n` generations of `spec`'s rules.
#[must_use]
pub fn expand<S: Clone + Eq + Hash>(spec: &Specification<S>, start: &[S], n: usize) -> Vec<S> {
    let mut current = start.to_vec();
    for _ in 0..n {
        let mut next = Vec::with_capacity(current.len());
        for symbol in &current {
            match spec.rule(symbol) {
                Some(rhs) => next.extend_from_slice(rhs),
                None => next.push(symbol.clone()),
            }
        }
        current = next;
    }
    current
}

// ---------------------------------------------------------------------------
// ExpansionCounter
// ---------------------------------------------------------------------------

/// Memoized size of the expansion of each `(symbol, depth)`.
///
/// The base case (depth 0, or a symbol without a rule) is a per-symbol
/// weight: 1 for every symbol when counting length, the symbol's draw
/// count when counting placements.
#[derive(Debug, Clone)]
pub struct ExpansionCounter<'a> {
    axiom: &'a [usize],
    rules: Vec<Option<&'a [usize]>>,
    base: Vec<u64>,
    /// `memo[depth][symbol]`; row 0 is never filled (it is `base`).
    memo: Vec<Vec<Option<u64>>>,
}

impl<'a> ExpansionCounter<'a> {
    /// Count sequence length.
    #[must_use]
    pub fn lengths(spec: &'a Specification<usize>) -> Self {
        Self::with_base(spec, |_| 1)
    }

    /// Count placements emitted when the sequence is applied.
    #[must_use]
    pub fn draws(spec: &'a Specification<usize>, app: &Application<usize>) -> Self {
        Self::with_base(spec, |symbol| app.draw_count(&symbol) as u64)
    }

    fn with_base(spec: &'a Specification<usize>, weight: impl Fn(usize) -> u64) -> Self {
        // Size by the largest index anywhere, so a hand-built spec with
        // holes in its alphabet still counts correctly.
        let size = spec
            .alphabet
            .iter()
            .chain(&spec.axiom)
            .chain(spec.substitutions.keys())
            .chain(spec.substitutions.values().flatten())
            .max()
            .map_or(0, |&m| m + 1);

        let mut rules = vec![None; size];
        for (&lhs, rhs) in &spec.substitutions {
            rules[lhs] = Some(rhs.as_slice());
        }

        Self {
            axiom: &spec.axiom,
            rules,
            base: (0..size).map(weight).collect(),
            memo: Vec::new(),
        }
    }

    /// Size of the expansion of `symbol` after `depth` generations.
    pub fn symbol_count(&mut self, symbol: usize, depth: usize) -> u64 {
        let Some(&base) = self.base.get(symbol) else {
            return 0;
        };
        let rule = match self.rules[symbol] {
            Some(rule) if depth > 0 => rule,
            _ => return base,
        };

        if self.memo.len() <= depth {
            let width = self.base.len();
            self.memo.resize_with(depth + 1, || vec![None; width]);
        }
        if let Some(count) = self.memo[depth][symbol] {
            return count;
        }

        let mut count = 0u64;
        for &child in rule {
            count = count.saturating_add(self.symbol_count(child, depth - 1));
        }
        self.memo[depth][symbol] = Some(count);
        count
    }

    /// Size of the expansion of the axiom after `depth` generations.
    pub fn total(&mut self, depth: usize) -> u64 {
        let axiom = self.axiom;
        axiom.iter().fold(0u64, |acc, &symbol| {
            acc.saturating_add(self.symbol_count(symbol, depth))
        })
    }
}

/// `iterate(spec, n).len()`, computed without expanding.
#[must_use]
pub fn length_after(spec: &Specification<usize>, n: usize) -> u64 {
    ExpansionCounter::lengths(spec).total(n)
}

/// Placements `apply(app, &iterate(spec, n))` would emit, computed without
/// expanding.
#[must_use]
pub fn draw_count_after(spec: &Specification<usize>, app: &Application<usize>, n: usize) -> u64 {
    ExpansionCounter::draws(spec, app).total(n)
}

/// Generation count for adaptive depth: starting at 0, step up one
/// generation at a time while the next one's draw count stays under
/// `draw_budget`, stopping at `max_iterations`.
#[must_use]
pub fn choose_iterations(
    spec: &Specification<usize>,
    app: &Application<usize>,
    draw_budget: u64,
    max_iterations: usize,
) -> usize {
    let mut counter = ExpansionCounter::draws(spec, app);
    let mut iterations = 0;
    while iterations < max_iterations && counter.total(iterations + 1) < draw_budget {
        iterations += 1;
    }
    iterations
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Knobs for picking realization depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RealizeOptions {
    pub draw_budget: u64,
    pub max_iterations: usize,
    /// Preferred depth of each symbol's canonical subtree.
    pub subtree_iterations: usize,
}

impl Default for RealizeOptions {
    fn default() -> Self {
        Self {
            draw_budget: 100_000,
            max_iterations: 12,
            subtree_iterations: 5,
        }
    }
}

/// Depths split between the top-level expansion and per-symbol subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IterationPlan {
    pub main: usize,
    pub subtree: usize,
}

impl IterationPlan {
    /// Split `total` generations, giving subtrees up to `subtree` of them.
    #[must_use]
    pub fn split(total: usize, subtree: usize) -> Self {
        let subtree = subtree.min(total);
        Self {
            main: total - subtree,
            subtree,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.main + self.subtree
    }
}

impl RealizeOptions {
    /// Pick the total depth adaptively and split it.
    ///
    /// Both halves are then lowered until the sequences realization
    /// materializes fit the budget too: the `main`-deep top-level
    /// expansion, and every symbol's `subtree`-deep expansion.
    #[must_use]
    pub fn plan(&self, spec: &Specification<usize>, app: &Application<usize>) -> IterationPlan {
        let total = choose_iterations(spec, app, self.draw_budget, self.max_iterations);
        let mut plan = IterationPlan::split(total, self.subtree_iterations);

        let mut lengths = ExpansionCounter::lengths(spec);
        while plan.main > 0 && lengths.total(plan.main) > self.draw_budget {
            plan.main -= 1;
        }
        while plan.subtree > 0
            && spec
                .alphabet
                .iter()
                .any(|&symbol| lengths.symbol_count(symbol, plan.subtree) > self.draw_budget)
        {
            plan.subtree -= 1;
        }

        tracing::debug!(
            main = plan.main,
            subtree = plan.subtree,
            predicted_draws = draw_count_after(spec, app, plan.total()),
            "planned iterations"
        );
        plan
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::function::Op;
    use crate::program::TransformProgram;
    use lsys_graphics::types::Vec3;

    /// `A -> B`, `B -> A B`, axiom `A`.
    fn fibonacci() -> Specification<usize> {
        Specification {
            alphabet: vec![0, 1],
            substitutions: HashMap::from([(0, vec![1]), (1, vec![0, 1])]),
            axiom: vec![0],
        }
    }

    fn drawing(counts: &[usize]) -> Application<usize> {
        Application {
            programs: counts
                .iter()
                .enumerate()
                .map(|(symbol, &n)| {
                    let ops = (0..n).map(|_| Op::Draw(Vec3::Y));
                    (symbol, TransformProgram::from_ops(ops))
                })
                .collect(),
        }
    }

    #[test]
    fn fibonacci_iterations() {
        let spec = fibonacci();
        assert_eq!(iterate(&spec, 0), vec![0]);
        assert_eq!(iterate(&spec, 1), vec![1]);
        assert_eq!(iterate(&spec, 2), vec![0, 1]);
        assert_eq!(iterate(&spec, 3), vec![1, 0, 1]);
        assert_eq!(iterate(&spec, 4), vec![0, 1, 1, 0, 1]);
        assert_eq!(length_after(&spec, 4), 5);
    }

    #[test]
    fn ruleless_symbol_is_fixed_point() {
        let spec = Specification {
            alphabet: vec![0],
            substitutions: HashMap::new(),
            axiom: vec![0],
        };
        for n in 0..5 {
            assert_eq!(iterate(&spec, n), vec![0]);
            assert_eq!(length_after(&spec, n), 1);
        }
    }

    #[test]
    fn empty_rule_erases() {
        let spec = Specification {
            alphabet: vec![0, 1],
            substitutions: HashMap::from([(0, vec![]), (1, vec![1, 1])]),
            axiom: vec![0, 1],
        };
        assert_eq!(iterate(&spec, 2), vec![1, 1, 1, 1]);
        assert_eq!(length_after(&spec, 2), 4);
    }

    #[test]
    fn draw_counts_use_program_weights() {
        let spec = fibonacci();
        let app = drawing(&[0, 2]);
        // [A B B A B] has three B
        assert_eq!(draw_count_after(&spec, &app, 4), 6);
        assert_eq!(draw_count_after(&spec, &app, 0), 0);
    }

    #[test]
    fn counts_saturate() {
        let spec = Specification {
            alphabet: vec![0],
            substitutions: HashMap::from([(0, vec![0; 16])]),
            axiom: vec![0],
        };
        assert_eq!(length_after(&spec, 40), u64::MAX);
    }

    #[test]
    fn choose_iterations_respects_budget() {
        let spec = fibonacci();
        let app = drawing(&[1, 1]);
        // lengths: 1 1 2 3 5 8 13
        assert_eq!(choose_iterations(&spec, &app, 6, 10), 4);
        assert_eq!(choose_iterations(&spec, &app, 6, 2), 2);
        assert_eq!(choose_iterations(&spec, &app, 1, 10), 0);
        assert_eq!(choose_iterations(&spec, &app, 1_000, 0), 0);
    }

    #[test]
    fn choose_iterations_stops_at_max_for_inert_grammar() {
        let spec = fibonacci();
        let app = drawing(&[0, 0]);
        assert_eq!(choose_iterations(&spec, &app, 1, 12), 12);
    }

    #[test]
    fn plan_splits_total() {
        assert_eq!(IterationPlan::split(7, 5), IterationPlan { main: 2, subtree: 5 });
        assert_eq!(IterationPlan::split(3, 5), IterationPlan { main: 0, subtree: 3 });

        let opts = RealizeOptions {
            draw_budget: 6,
            max_iterations: 10,
            subtree_iterations: 3,
        };
        let plan = opts.plan(&fibonacci(), &drawing(&[1, 1]));
        assert_eq!(plan, IterationPlan { main: 1, subtree: 3 });
        assert_eq!(plan.total(), 4);
    }

    #[test]
    fn plan_bounds_sequence_length_of_non_drawing_fan_out() {
        // A -> A x40 never draws, so only length limits the depth.
        let spec = Specification {
            alphabet: vec![0, 1],
            substitutions: HashMap::from([(0, vec![0; 40]), (1, vec![1])]),
            axiom: vec![0, 1],
        };
        let app = drawing(&[0, 1]);
        let opts = RealizeOptions::default();
        assert_eq!(choose_iterations(&spec, &app, opts.draw_budget, opts.max_iterations), 12);

        let plan = opts.plan(&spec, &app);
        assert_eq!(plan, IterationPlan { main: 3, subtree: 3 });
        assert!(length_after(&spec, plan.main) <= opts.draw_budget);
        let mut lengths = ExpansionCounter::lengths(&spec);
        assert!(spec
            .alphabet
            .iter()
            .all(|&s| lengths.symbol_count(s, plan.subtree) <= opts.draw_budget));
    }

    #[test]
    fn plan_lowers_main_to_zero_for_long_axiom() {
        let spec = Specification {
            alphabet: vec![0],
            substitutions: HashMap::from([(0, vec![0, 0])]),
            axiom: vec![0; 10],
        };
        let opts = RealizeOptions {
            draw_budget: 4,
            max_iterations: 6,
            subtree_iterations: 2,
        };
        assert_eq!(
            opts.plan(&spec, &drawing(&[0])),
            IterationPlan { main: 0, subtree: 2 }
        );
    }

    fn arb_grammar() -> impl Strategy<Value = (Specification<usize>, Vec<usize>)> {
        (1usize..5).prop_flat_map(|n| {
            (
                prop::collection::vec(prop::option::of(prop::collection::vec(0..n, 0..4)), n),
                prop::collection::vec(0..n, 1..3),
                prop::collection::vec(0usize..3, n),
            )
                .prop_map(move |(rules, axiom, draws)| {
                    let spec = Specification {
                        alphabet: (0..n).collect(),
                        substitutions: rules
                            .into_iter()
                            .enumerate()
                            .filter_map(|(i, rhs)| rhs.map(|rhs| (i, rhs)))
                            .collect(),
                        axiom,
                    };
                    (spec, draws)
                })
        })
    }

    proptest! {
        #[test]
        fn length_matches_literal_expansion((spec, _) in arb_grammar(), n in 0usize..6) {
            prop_assert_eq!(length_after(&spec, n), iterate(&spec, n).len() as u64);
        }

        #[test]
        fn draw_count_matches_literal_expansion((spec, draws) in arb_grammar(), n in 0usize..6) {
            let app = drawing(&draws);
            let expected: usize = iterate(&spec, n).iter().map(|s| app.draw_count(s)).sum();
            prop_assert_eq!(draw_count_after(&spec, &app, n), expected as u64);
        }
    }
}
