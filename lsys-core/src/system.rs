//! L-system specifications, transform applications and alphabet interning.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;

use crate::error::InternError;
use crate::program::TransformProgram;

/// A grammar over symbols of type `S`.
///
/// Every symbol in `axiom` or on a right-hand side of `substitutions` is a
/// member of `alphabet`. A symbol without a substitution rewrites to
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specification<S: Eq + Hash> {
    /// Distinct symbols in first-declared order.
    pub alphabet: Vec<S>,
    pub substitutions: HashMap<S, Vec<S>>,
    pub axiom: Vec<S>,
}

impl<S: Eq + Hash> Specification<S> {
    /// Right-hand side of `symbol`'s rule, if it has one.
    #[must_use]
    pub fn rule(&self, symbol: &S) -> Option<&[S]> {
        self.substitutions.get(symbol).map(Vec::as_slice)
    }
}

/// The transform program attached to each symbol.
///
/// Symbols without an entry execute nothing: they neither draw nor move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application<S: Eq + Hash> {
    pub programs: HashMap<S, TransformProgram>,
}

impl<S: Eq + Hash> Default for Application<S> {
    fn default() -> Self {
        Self {
            programs: HashMap::new(),
        }
    }
}

impl<S: Eq + Hash> Application<S> {
    #[must_use]
    pub fn get(&self, symbol: &S) -> Option<&TransformProgram> {
        self.programs.get(symbol)
    }

    /// Placements one execution of `symbol` emits.
    #[must_use]
    pub fn draw_count(&self, symbol: &S) -> usize {
        self.get(symbol).map_or(0, TransformProgram::draw_count)
    }
}

// ---------------------------------------------------------------------------
// Interning
// ---------------------------------------------------------------------------

/// A specification re-keyed to dense indices, with the mapping back.
#[derive(Debug, Clone)]
pub struct Interned<S> {
    /// Index `i` is the symbol interned as `i`.
    pub symbols: Vec<S>,
    pub spec: Specification<usize>,
    index: HashMap<S, usize>,
}

/// Intern `spec`: each alphabet symbol becomes its position in the alphabet.
///
/// # Errors
///
/// Fails if the alphabet repeats a symbol, or the axiom or a rule mentions
/// a symbol outside the alphabet.
pub fn intern<S>(spec: &Specification<S>) -> Result<Interned<S>, InternError>
where
    S: Clone + Eq + Hash + Display,
{
    let mut index = HashMap::with_capacity(spec.alphabet.len());
    for (i, symbol) in spec.alphabet.iter().enumerate() {
        if index.insert(symbol.clone(), i).is_some() {
            return Err(InternError::DuplicateAlphabetSymbol(symbol.to_string()));
        }
    }

    let axiom = spec
        .axiom
        .iter()
        .map(|s| {
            index
                .get(s)
                .copied()
                .ok_or_else(|| InternError::AxiomSymbolNotInAlphabet(s.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut substitutions = HashMap::with_capacity(spec.substitutions.len());
    for (lhs, rhs) in &spec.substitutions {
        let key = index
            .get(lhs)
            .copied()
            .ok_or_else(|| InternError::SubstitutionSymbolNotInAlphabet(lhs.to_string()))?;
        let rhs = rhs
            .iter()
            .map(|s| {
                index
                    .get(s)
                    .copied()
                    .ok_or_else(|| InternError::SubstitutionSymbolNotInAlphabet(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        substitutions.insert(key, rhs);
    }

    Ok(Interned {
        symbols: spec.alphabet.clone(),
        spec: Specification {
            alphabet: (0..spec.alphabet.len()).collect(),
            substitutions,
            axiom,
        },
        index,
    })
}

impl<S> Interned<S>
where
    S: Clone + Eq + Hash + Display,
{
    /// Re-key an application with this alphabet's indices.
    ///
    /// # Errors
    ///
    /// Fails if the application has a program for a symbol outside the
    /// alphabet.
    pub fn application(
        &self,
        app: &Application<S>,
    ) -> Result<Application<usize>, InternError> {
        let programs = app
            .programs
            .iter()
            .map(|(symbol, program)| {
                self.index_of(symbol)
                    .map(|i| (i, program.clone()))
                    .ok_or_else(|| InternError::ApplicationSymbolNotInAlphabet(symbol.to_string()))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Application { programs })
    }

    #[must_use]
    pub fn index_of(&self, symbol: &S) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    #[must_use]
    pub fn symbol(&self, index: usize) -> Option<&S> {
        self.symbols.get(index)
    }

    /// Map an interned sequence back to symbols. Unknown indices are
    /// skipped.
    #[must_use]
    pub fn resolve(&self, sequence: &[usize]) -> Vec<S> {
        sequence
            .iter()
            .filter_map(|&i| self.symbols.get(i).cloned())
            .collect()
    }

    /// Rebuild the original specification from the interned one.
    #[must_use]
    pub fn to_symbolic(&self) -> Specification<S> {
        Specification {
            alphabet: self.symbols.clone(),
            substitutions: self
                .spec
                .substitutions
                .iter()
                .filter_map(|(&lhs, rhs)| Some((self.symbols.get(lhs)?.clone(), self.resolve(rhs))))
                .collect(),
            axiom: self.resolve(&self.spec.axiom),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn spec(alphabet: &[&str], rules: &[(&str, &[&str])], axiom: &[&str]) -> Specification<String> {
        let owned = |xs: &[&str]| xs.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
        Specification {
            alphabet: owned(alphabet),
            substitutions: rules
                .iter()
                .map(|(lhs, rhs)| ((*lhs).to_owned(), owned(rhs)))
                .collect(),
            axiom: owned(axiom),
        }
    }

    #[test]
    fn interns_in_alphabet_order() {
        let s = spec(&["A", "B"], &[("A", &["B"]), ("B", &["A", "B"])], &["A"]);
        let interned = intern(&s).unwrap();
        assert_eq!(interned.spec.alphabet, vec![0, 1]);
        assert_eq!(interned.spec.axiom, vec![0]);
        assert_eq!(interned.spec.rule(&1), Some(&[0, 1][..]));
        assert_eq!(interned.index_of(&"B".to_owned()), Some(1));
        assert_eq!(interned.symbol(0).map(String::as_str), Some("A"));
    }

    #[test]
    fn axiom_outside_alphabet_fails() {
        let s = spec(&["A"], &[], &["Q"]);
        assert_eq!(
            intern(&s).unwrap_err(),
            InternError::AxiomSymbolNotInAlphabet("Q".to_owned())
        );
    }

    #[test]
    fn substitution_outside_alphabet_fails() {
        let s = spec(&["A"], &[("A", &["A", "Z"])], &["A"]);
        let err = intern(&s).unwrap_err();
        assert_eq!(err, InternError::SubstitutionSymbolNotInAlphabet("Z".to_owned()));
        assert!(err.to_string().contains("'Z'"));
    }

    #[test]
    fn duplicate_alphabet_symbol_fails() {
        let s = spec(&["A", "A"], &[], &["A"]);
        assert!(matches!(
            intern(&s),
            Err(InternError::DuplicateAlphabetSymbol(_))
        ));
    }

    #[test]
    fn application_is_rekeyed() {
        let s = spec(&["A", "B"], &[], &["A"]);
        let interned = intern(&s).unwrap();
        let app = Application {
            programs: HashMap::from([("B".to_owned(), TransformProgram::new())]),
        };
        let keyed = interned.application(&app).unwrap();
        assert!(keyed.get(&1).is_some());
        assert!(keyed.get(&0).is_none());
    }

    #[test]
    fn application_outside_alphabet_fails() {
        let s = spec(&["A"], &[], &["A"]);
        let interned = intern(&s).unwrap();
        let app = Application {
            programs: HashMap::from([("C".to_owned(), TransformProgram::new())]),
        };
        assert_eq!(
            interned.application(&app).unwrap_err(),
            InternError::ApplicationSymbolNotInAlphabet("C".to_owned())
        );
    }

    #[test]
    fn empty_rule_round_trips() {
        let s = spec(&["A", "B"], &[("A", &[])], &["A", "B"]);
        assert_eq!(intern(&s).unwrap().to_symbolic(), s);
    }

    fn arb_spec() -> impl Strategy<Value = Specification<String>> {
        (1usize..6).prop_flat_map(|n| {
            let alphabet: Vec<String> = (0..n).map(|i| format!("S{i}")).collect();
            let sym = 0..n;
            (
                Just(alphabet),
                prop::collection::vec(prop::option::of(prop::collection::vec(sym.clone(), 0..4)), n),
                prop::collection::vec(sym, 1..4),
            )
                .prop_map(|(alphabet, rules, axiom)| Specification {
                    substitutions: rules
                        .into_iter()
                        .enumerate()
                        .filter_map(|(i, rhs)| {
                            rhs.map(|rhs| {
                                (alphabet[i].clone(), rhs.iter().map(|&j| alphabet[j].clone()).collect())
                            })
                        })
                        .collect(),
                    axiom: axiom.iter().map(|&j| alphabet[j].clone()).collect(),
                    alphabet,
                })
        })
    }

    proptest! {
        #[test]
        fn interning_round_trips(s in arb_spec()) {
            let interned = intern(&s).unwrap();
            prop_assert_eq!(interned.to_symbolic(), s);
        }
    }
}
