//! Constant table: resolves `name = expr;` declarations in source order.
//!
//! Each declaration may only refer to constants declared before it. An
//! override map can replace the value of any constant without touching the
//! source; the declared value is still computed (so authoring errors
//! surface) and kept as the constant's default.
//!
//! Constants whose right-hand side is a bare numeric literal are "simple":
//! they are the ones an editor exposes as tunable sliders.

use std::collections::HashMap;

use lsys_graphics::types::Scalar;
use serde::Serialize;

use crate::ast::{Expr, Ident};
use crate::error::{CompilerError, ErrorKind};
use crate::expr::{evaluate, Environment};
use crate::token::Span;

/// Caller-supplied replacement values, keyed by constant name.
pub type Overrides = HashMap<String, Scalar>;

/// One resolved constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    /// Value computed from the declaration.
    pub default: Scalar,
    /// Value in effect (the override, if any, else `default`).
    pub value: Scalar,
    /// Span of the declared expression.
    pub span: Span,
    /// Whether the declaration is a bare numeric literal.
    pub simple: bool,
}

/// A tunable constant as exposed to an editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleConstant {
    pub name: String,
    /// Declared literal value.
    pub value: Scalar,
    /// Span of the literal, for live-editing the source text.
    pub span: Span,
}

/// All constants of a program, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTable {
    constants: Vec<Constant>,
    env: Environment,
}

impl ConstantTable {
    /// Resolve declarations in order, applying `overrides`.
    ///
    /// Returns the table and every diagnostic raised. A declaration that
    /// fails to evaluate is left out of the table, so later references
    /// to it report their own [`ErrorKind::UndefinedVariable`].
    pub fn build<'a>(
        declarations: impl IntoIterator<Item = (&'a Ident, &'a Expr)>,
        overrides: &Overrides,
    ) -> (Self, Vec<CompilerError>) {
        let mut table = Self::default();
        let mut diagnostics = Vec::new();

        for (name, expr) in declarations {
            if table.env.contains_key(&name.name) {
                diagnostics.push(
                    CompilerError::new(
                        ErrorKind::DuplicateConstant,
                        format!("Constant '{}' is already defined.", name.name),
                    )
                    .with_span(name.span),
                );
                continue;
            }

            let evaluated = match evaluate(expr, &table.env) {
                Ok(evaluated) => evaluated,
                Err(errors) => {
                    diagnostics.extend(errors);
                    continue;
                }
            };
            diagnostics.extend(evaluated.warnings);

            let value = overrides
                .get(&name.name)
                .copied()
                .unwrap_or(evaluated.value);
            table.env.insert(name.name.clone(), value);
            table.constants.push(Constant {
                name: name.name.clone(),
                default: evaluated.value,
                value,
                span: expr.span,
                simple: expr.as_literal().is_some(),
            });
        }

        for key in overrides.keys() {
            if !table.env.contains_key(key) {
                tracing::debug!(constant = %key, "override names no declared constant; ignored");
            }
        }

        (table, diagnostics)
    }

    /// The `name → value` environment instruction operands evaluate in.
    #[must_use]
    pub const fn env(&self) -> &Environment {
        &self.env
    }

    /// Value in effect for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Scalar> {
        self.env.get(name).copied()
    }

    /// All constants in declaration order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Constant> {
        self.constants.iter()
    }

    /// Constants declared as a bare literal, with their default values.
    #[must_use]
    pub fn simple_constants(&self) -> Vec<SimpleConstant> {
        self.constants
            .iter()
            .filter(|c| c.simple)
            .map(|c| SimpleConstant {
                name: c.name.clone(),
                value: c.default,
                span: c.span,
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Program;
    use crate::parser::parse;

    fn program(src: &str) -> Program {
        let (program, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        program
    }

    fn build(src: &str, overrides: &Overrides) -> (ConstantTable, Vec<CompilerError>) {
        let p = program(src);
        ConstantTable::build(p.constants(), overrides)
    }

    #[test]
    fn resolves_in_declaration_order() {
        let (table, diags) = build("angle1 = 30+15; angle2 = angle1 * 2;", &Overrides::new());
        assert!(diags.is_empty());
        assert_eq!(table.get("angle1"), Some(45.0));
        assert_eq!(table.get("angle2"), Some(90.0));
    }

    #[test]
    fn forward_reference_is_an_error() {
        let (table, diags) = build("a = b; b = 1;", &Overrides::new());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ErrorKind::UndefinedVariable);
        assert_eq!(diags[0].span, Span::new(4, 5));
        assert_eq!(table.get("a"), None);
        assert_eq!(table.get("b"), Some(1.0));
    }

    #[test]
    fn self_reference_is_an_error() {
        let (_, diags) = build("a = a + 1;", &Overrides::new());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn duplicate_constant() {
        let (table, diags) = build("a = 1; a = 2;", &Overrides::new());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ErrorKind::DuplicateConstant);
        assert_eq!(table.get("a"), Some(1.0));
    }

    #[test]
    fn override_supersedes_but_keeps_default() {
        let overrides = Overrides::from([("len".to_owned(), 3.0)]);
        let (table, diags) = build("len = 1; twice = len * 2;", &overrides);
        assert!(diags.is_empty());
        assert_eq!(table.get("len"), Some(3.0));
        assert_eq!(table.get("twice"), Some(6.0));
        let len = table.iter().next().unwrap();
        assert_eq!(len.default, 1.0);
        assert_eq!(len.value, 3.0);
    }

    #[test]
    fn override_still_reports_declaration_errors() {
        let overrides = Overrides::from([("a".to_owned(), 3.0)]);
        let (_, diags) = build("a = missing;", &overrides);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn unknown_override_is_ignored() {
        let overrides = Overrides::from([("ghost".to_owned(), 3.0)]);
        let (table, diags) = build("a = 1;", &overrides);
        assert!(diags.is_empty());
        assert_eq!(table.get("ghost"), None);
    }

    #[test]
    fn simple_constants_are_literals_only() {
        let (table, _) = build("a = 1.5; b = -2; c = a + 1; d = (4);", &Overrides::new());
        let simple = table.simple_constants();
        let names: Vec<_> = simple.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "d"]);
        assert_eq!(simple[1].value, -2.0);
        assert_eq!(simple[0].span, Span::new(4, 7));
    }

    #[test]
    fn simple_constant_reports_default_under_override() {
        let overrides = Overrides::from([("a".to_owned(), 9.0)]);
        let (table, _) = build("a = 1;", &overrides);
        assert_eq!(table.simple_constants()[0].value, 1.0);
    }

    #[test]
    fn division_by_zero_warning_keeps_constant() {
        let (table, diags) = build("a = 1/0;", &Overrides::new());
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
        assert_eq!(table.get("a"), Some(Scalar::INFINITY));
    }
}
