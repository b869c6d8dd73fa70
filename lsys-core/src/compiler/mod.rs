//! Compiler: syntax tree → [`Specification`] + [`Application`].
//!
//! Compilation runs in four passes over the statements:
//!
//! 1. constants, in declaration order, with overrides applied
//! 2. production rules, which also define the alphabet (first mention
//!    order, left-hand side before right-hand side)
//! 3. instruction blocks, each resolved into a [`TransformProgram`]
//! 4. the axiom
//!
//! Every pass keeps going after a problem so a single call reports every
//! diagnostic. The specification and application are only returned when
//! no error-grade diagnostic was raised; warnings ride along with them.

use std::collections::{HashMap, HashSet};

use crate::ast::{Ident, Instruction, Program, Statement};
use crate::constants::{ConstantTable, Overrides, SimpleConstant};
use crate::error::{has_errors, CompilerError, ErrorKind};
use crate::expr::{evaluate, Environment};
use crate::function::Function;
use crate::parser::parse;
use crate::program::TransformProgram;
use crate::system::{Application, Specification};
use crate::token::Span;

#[cfg(test)]
mod tests;

/// A successfully compiled program.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub spec: Specification<String>,
    pub app: Application<String>,
    pub constants: ConstantTable,
    /// Warning-grade diagnostics, sorted by position.
    pub warnings: Vec<CompilerError>,
}

impl CompileOutput {
    /// Constants an editor can expose as sliders.
    #[must_use]
    pub fn simple_constants(&self) -> Vec<SimpleConstant> {
        self.constants.simple_constants()
    }
}

/// Parse and compile `source`.
///
/// # Errors
///
/// Returns every diagnostic, sorted by position, when parsing or
/// compilation raised at least one error.
pub fn compile_source(
    source: &str,
    overrides: &Overrides,
) -> Result<CompileOutput, Vec<CompilerError>> {
    let (program, mut diagnostics) = parse(source);
    match compile(&program, overrides) {
        Ok(output) if diagnostics.is_empty() => Ok(output),
        Ok(output) => {
            diagnostics.extend(output.warnings);
            sort_diagnostics(&mut diagnostics);
            Err(diagnostics)
        }
        Err(errors) => {
            diagnostics.extend(errors);
            sort_diagnostics(&mut diagnostics);
            Err(diagnostics)
        }
    }
}

/// Compile a parsed program.
///
/// Callable repeatedly with different `overrides`; each call builds a
/// fresh specification and application.
///
/// # Errors
///
/// Returns every diagnostic, sorted by position, when at least one is
/// error-grade.
pub fn compile(program: &Program, overrides: &Overrides) -> Result<CompileOutput, Vec<CompilerError>> {
    let mut compiler = Compiler::default();

    let (constants, diagnostics) = ConstantTable::build(program.constants(), overrides);
    compiler.diagnostics.extend(diagnostics);

    compiler.productions(program);
    let app = compiler.instruction_blocks(program, constants.env());
    let axiom = compiler.axiom(program);

    let mut diagnostics = compiler.diagnostics;
    sort_diagnostics(&mut diagnostics);
    if has_errors(&diagnostics) {
        tracing::debug!(diagnostics = diagnostics.len(), "compilation failed");
        return Err(diagnostics);
    }

    let spec = Specification {
        alphabet: compiler.alphabet,
        substitutions: compiler.substitutions,
        axiom,
    };
    tracing::debug!(
        alphabet = spec.alphabet.len(),
        rules = spec.substitutions.len(),
        programs = app.programs.len(),
        warnings = diagnostics.len(),
        "compiled"
    );
    Ok(CompileOutput {
        spec,
        app,
        constants,
        warnings: diagnostics,
    })
}

fn sort_diagnostics(diagnostics: &mut [CompilerError]) {
    diagnostics.sort_by_key(|d| (d.span.start, d.span.end));
}

#[derive(Default)]
struct Compiler {
    alphabet: Vec<String>,
    members: HashSet<String>,
    substitutions: HashMap<String, Vec<String>>,
    diagnostics: Vec<CompilerError>,
}

impl Compiler {
    fn error(&mut self, kind: ErrorKind, span: Span, message: String) {
        self.diagnostics
            .push(CompilerError::new(kind, message).with_span(span));
    }

    fn register(&mut self, symbol: &Ident) {
        if self.members.insert(symbol.name.clone()) {
            self.alphabet.push(symbol.name.clone());
        }
    }

    fn is_member(&self, symbol: &Ident) -> bool {
        self.members.contains(&symbol.name)
    }

    fn unknown_symbol(&mut self, symbol: &Ident) {
        self.error(
            ErrorKind::UnknownAlphabetSymbol,
            symbol.span,
            format!(
                "Alphabet does not contain the symbol '{}'. You may have spelled it wrong or forgot to add it to a production rule.",
                symbol.name
            ),
        );
    }

    // -- pass 2 --

    fn productions(&mut self, program: &Program) {
        for statement in &program.statements {
            let Statement::Production {
                symbol,
                replacement,
                span,
            } = statement
            else {
                continue;
            };

            self.register(symbol);
            for s in replacement {
                self.register(s);
            }
            if self.substitutions.contains_key(&symbol.name) {
                self.error(
                    ErrorKind::DuplicateProductionRule,
                    *span,
                    format!("A replacement for the symbol '{}' already exists!", symbol.name),
                );
                continue;
            }
            self.substitutions.insert(
                symbol.name.clone(),
                replacement.iter().map(|s| s.name.clone()).collect(),
            );
        }
    }

    // -- pass 3 --

    fn instruction_blocks(&mut self, program: &Program, env: &Environment) -> Application<String> {
        let mut app = Application::default();
        let mut seen = HashSet::new();

        for statement in &program.statements {
            let Statement::Instructions {
                symbol,
                instructions,
                ..
            } = statement
            else {
                continue;
            };

            let known = self.is_member(symbol);
            if !known {
                self.unknown_symbol(symbol);
            }
            let first = seen.insert(symbol.name.clone());
            if !first {
                self.error(
                    ErrorKind::DuplicateInstructionBlock,
                    symbol.span,
                    format!("Instructions for the symbol '{}' are already defined.", symbol.name),
                );
            }

            // Compiled even when unusable, to surface its diagnostics.
            let compiled = self.block(instructions, env);
            if known && first {
                app.programs.insert(symbol.name.clone(), compiled);
            }
        }
        app
    }

    fn block(&mut self, instructions: &[Instruction], env: &Environment) -> TransformProgram {
        let mut program = TransformProgram::new();
        for instruction in instructions {
            let name = &instruction.name.name;
            let Some(function) = Function::lookup(name) else {
                self.error(
                    ErrorKind::UnknownInstruction,
                    instruction.span,
                    format!("Function '{name}' does not exist."),
                );
                continue;
            };

            let arity = instruction.operands.len();
            if !function.arities().contains(&arity) {
                let available = function
                    .arities()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.error(
                    ErrorKind::NoMatchingOverload,
                    instruction.span,
                    format!(
                        "No variant of function '{name}' takes {arity} operands. Variants exist with the following number of operands: {available}"
                    ),
                );
                continue;
            }

            let mut values = Vec::with_capacity(arity);
            let mut failed = false;
            for operand in &instruction.operands {
                match evaluate(operand, env) {
                    Ok(evaluated) => {
                        values.push(evaluated.value);
                        self.diagnostics.extend(evaluated.warnings);
                    }
                    Err(errors) => {
                        self.diagnostics.extend(errors);
                        failed = true;
                    }
                }
            }
            if failed {
                continue;
            }

            let Some(op) = function.resolve(&values) else {
                continue;
            };
            if op.is_draw() && program.is_degenerate() {
                self.diagnostics.push(
                    CompilerError::new(
                        ErrorKind::DegenerateTransform,
                        "Draw after a transform that collapses space; the drawn instance is flat.",
                    )
                    .with_span(instruction.span),
                );
            }
            program.push(op);
        }
        program
    }

    // -- pass 4 --

    fn axiom(&mut self, program: &Program) -> Vec<String> {
        let axioms: Vec<(&[Ident], Span)> = program
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::Axiom { symbols, span } => Some((symbols.as_slice(), *span)),
                _ => None,
            })
            .collect();

        let Some(&(symbols, _)) = axioms.first() else {
            self.error(
                ErrorKind::MissingAxiom,
                program.span,
                "An L-system must have exactly one start sequence, or axiom.".to_owned(),
            );
            return Vec::new();
        };
        if let Some(&(_, second)) = axioms.get(1) {
            self.error(
                ErrorKind::MultipleAxioms,
                second,
                "An L-system may not have more than one start sequence, or axiom.".to_owned(),
            );
        }

        for symbol in symbols {
            if !self.is_member(symbol) {
                self.unknown_symbol(symbol);
            }
        }
        symbols.iter().map(|s| s.name.clone()).collect()
    }
}
