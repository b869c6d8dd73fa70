use std::f64::consts::FRAC_PI_4;

use lsys_graphics::transform::rotation_y;
use lsys_graphics::types::{Vec3, EPSILON};

use super::*;
use crate::function::Op;

const SAMPLE: &str = "
angle1 = 30+15;
angle2 = 30;

branch ->
  push
  left
  branch
  right
  branch
  pop;

push :
  my 1,
  ry angle1,
  s 0.8;

left :
  rz angle2;

right :
  rz -1*angle2;

pop :
  rz angle2,
  s 1.25,
  ry -1*angle1,
  dy -1;

^ branch;";

fn ok(src: &str) -> CompileOutput {
    match compile_source(src, &Overrides::new()) {
        Ok(output) => output,
        Err(errors) => panic!("unexpected errors: {errors:?}"),
    }
}

fn errors(src: &str) -> Vec<CompilerError> {
    match compile_source(src, &Overrides::new()) {
        Ok(_) => panic!("expected errors for {src:?}"),
        Err(errors) => errors,
    }
}

fn kinds(diagnostics: &[CompilerError]) -> Vec<ErrorKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn sample_program_compiles() {
    let out = ok(SAMPLE);
    assert!(out.warnings.is_empty());
    assert_eq!(
        out.spec.alphabet,
        strings(&["branch", "push", "left", "right", "pop"])
    );
    assert_eq!(
        out.spec.rule(&"branch".to_owned()),
        Some(&strings(&["push", "left", "branch", "right", "branch", "pop"])[..])
    );
    assert_eq!(out.spec.axiom, strings(&["branch"]));
    assert_eq!(out.app.programs.len(), 4);
    assert_eq!(out.app.draw_count(&"pop".to_owned()), 1);
    assert_eq!(out.app.draw_count(&"push".to_owned()), 0);
    assert_eq!(out.constants.get("angle1"), Some(45.0));
}

#[test]
fn only_literal_constants_are_simple() {
    let out = ok(SAMPLE);
    let simple = out.simple_constants();
    assert_eq!(simple.len(), 1);
    assert_eq!(simple[0].name, "angle2");
    assert!((simple[0].value - 30.0).abs() < EPSILON);
    assert_eq!(simple[0].span.slice(SAMPLE), Some("30"));
}

#[test]
fn constant_resolves_into_rotation() {
    let out = ok("angle1 = 30+15; A -> A; A : ry angle1; ^ A;");
    let program = out.app.get(&"A".to_owned()).unwrap();
    let Op::Rotate { radians, axis } = program.ops()[0] else {
        panic!("expected a rotation, got {:?}", program.ops()[0]);
    };
    assert!((radians - FRAC_PI_4).abs() < EPSILON);
    assert_eq!(axis, Vec3::Y);
    assert!(program.net().approx_eq(&rotation_y(FRAC_PI_4), EPSILON));
}

#[test]
fn division_by_zero_is_only_a_warning() {
    let out = ok("A -> A; A : s 1/0; ^ A;");
    assert_eq!(kinds(&out.warnings), [ErrorKind::DivisionByZero]);
    assert!(out.app.get(&"A".to_owned()).is_some());
}

#[test]
fn undefined_variable_fails_compilation() {
    let errs = errors("A -> A;\nA : rz undefinedVar;\n^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::UndefinedVariable]);
    assert_eq!(errs[0].span, Span::new(15, 27));
    assert_eq!(errs[0].message, "Variable 'undefinedVar' is not defined.");
}

#[test]
fn independent_errors_are_all_reported() {
    let errs = errors("A -> B; A : rz nope; B : wobble 1; ^ A;");
    assert_eq!(
        kinds(&errs),
        [ErrorKind::UndefinedVariable, ErrorKind::UnknownInstruction]
    );
    assert_eq!(errs[1].message, "Function 'wobble' does not exist.");
}

#[test]
fn operand_errors_within_one_instruction_are_all_reported() {
    let errs = errors("A -> A; A : m a b 0; ^ A;");
    assert_eq!(
        kinds(&errs),
        [ErrorKind::UndefinedVariable, ErrorKind::UndefinedVariable]
    );
}

#[test]
fn compiling_twice_is_identical() {
    let a = ok(SAMPLE);
    let b = ok(SAMPLE);
    assert_eq!(a.spec, b.spec);
    assert_eq!(a.app, b.app);
    assert_eq!(a.constants, b.constants);
}

#[test]
fn overrides_change_programs_not_defaults() {
    let src = "len = 1; F -> F F; F : dy len; ^ F;";
    let overrides = Overrides::from([("len".to_owned(), 3.0)]);
    let out = compile_source(src, &overrides).unwrap();
    let program = out.app.get(&"F".to_owned()).unwrap();
    assert_eq!(program.draws()[0].offset, Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(out.simple_constants()[0].value, 1.0);
    assert_eq!(out.constants.get("len"), Some(3.0));
}

#[test]
fn recompiling_a_parsed_tree_with_new_overrides() {
    let (program, diags) = parse("len = 1; F -> F; F : dy len; ^ F;");
    assert!(diags.is_empty());
    let first = compile(&program, &Overrides::new()).unwrap();
    let second = compile(&program, &Overrides::from([("len".to_owned(), 2.0)])).unwrap();
    let offset = |out: &CompileOutput| out.app.get(&"F".to_owned()).unwrap().draws()[0].offset;
    assert_eq!(offset(&first).y, 1.0);
    assert_eq!(offset(&second).y, 2.0);
}

#[test]
fn missing_axiom() {
    let errs = errors("A -> A;");
    assert_eq!(kinds(&errs), [ErrorKind::MissingAxiom]);
    assert_eq!(errs[0].span, Span::new(0, 7));
}

#[test]
fn multiple_axioms_reported_at_second() {
    let errs = errors("A -> A;\n^ A;\n^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::MultipleAxioms]);
    assert_eq!(errs[0].span, Span::new(13, 17));
}

#[test]
fn axiom_symbol_must_be_in_alphabet() {
    let errs = errors("A -> A; ^ A Q;");
    assert_eq!(kinds(&errs), [ErrorKind::UnknownAlphabetSymbol]);
    assert_eq!(errs[0].span, Span::new(12, 13));
}

#[test]
fn duplicate_production_rule() {
    let errs = errors("A -> B;\nA -> A;\n^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::DuplicateProductionRule]);
    assert_eq!(errs[0].span, Span::new(8, 15));
    assert!(errs[0].message.contains("'A'"));
}

#[test]
fn duplicate_rule_still_declares_its_symbols() {
    let errs = errors("A -> B;\nA -> C;\nC : dy 1;\n^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::DuplicateProductionRule]);
}

#[test]
fn deeply_nested_constant_is_a_diagnostic() {
    let depth = 200_000;
    let src = format!(
        "x = {}1{}; A -> A; ^ A;",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let errs = errors(&src);
    assert_eq!(kinds(&errs), [ErrorKind::NestingTooDeep]);
}

#[test]
fn instructions_for_unknown_symbol() {
    let errs = errors("A -> A; Z : dy 1; ^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::UnknownAlphabetSymbol]);
    assert_eq!(errs[0].span, Span::new(8, 9));
}

#[test]
fn unknown_symbol_block_still_reports_its_own_errors() {
    let errs = errors("A -> A; Z : wobble; ^ A;");
    assert_eq!(
        kinds(&errs),
        [ErrorKind::UnknownAlphabetSymbol, ErrorKind::UnknownInstruction]
    );
}

#[test]
fn duplicate_instruction_block() {
    let errs = errors("A -> A; A : dy 1; A : dx 1; ^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::DuplicateInstructionBlock]);
    assert_eq!(errs[0].span, Span::new(18, 19));
}

#[test]
fn arity_mismatch_lists_available_overloads() {
    let errs = errors("A -> A; A : s 1 2; ^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::NoMatchingOverload]);
    assert_eq!(
        errs[0].message,
        "No variant of function 's' takes 2 operands. Variants exist with the following number of operands: 1, 3"
    );
    assert_eq!(errs[0].span, Span::new(12, 17));
}

#[test]
fn instruction_names_are_case_sensitive() {
    let errs = errors("A -> A; A : DY 1; ^ A;");
    assert_eq!(kinds(&errs), [ErrorKind::UnknownInstruction]);
}

#[test]
fn aliases_resolve_like_short_names() {
    let short = ok("A -> A; A : dy 1, rz 10, s 2; ^ A;");
    let long = ok("A -> A; A : drawy 1, rotatez 10, scale 2; ^ A;");
    assert_eq!(short.app, long.app);
}

#[test]
fn draw_after_zero_scale_warns() {
    let out = ok("A -> A; A : s 0, dy 1; ^ A;");
    assert_eq!(kinds(&out.warnings), [ErrorKind::DegenerateTransform]);
    assert_eq!(out.warnings[0].span, Span::new(17, 21));
}

#[test]
fn parse_and_compile_errors_are_merged() {
    let errs = errors("A -> A; A : dy $; ^ A;");
    assert_eq!(
        kinds(&errs),
        [ErrorKind::NoMatchingOverload, ErrorKind::InvalidCharacter]
    );
}

#[test]
fn warnings_accompany_parse_errors() {
    let errs = errors("x = 1/0; A -> A; ^ A; ?");
    assert_eq!(
        kinds(&errs),
        [ErrorKind::DivisionByZero, ErrorKind::InvalidCharacter]
    );
}

#[test]
fn empty_rule_and_empty_block() {
    let out = ok("A -> ; B -> A B; A : ; ^ B;");
    assert_eq!(out.spec.alphabet, strings(&["A", "B"]));
    assert_eq!(out.spec.rule(&"A".to_owned()), Some(&[][..]));
    assert_eq!(out.app.draw_count(&"A".to_owned()), 0);
    assert!(out.app.get(&"B".to_owned()).is_none());
}

#[test]
fn alphabet_is_first_mention_order() {
    let out = ok("B -> C A; A -> D; ^ A;");
    assert_eq!(out.spec.alphabet, strings(&["B", "C", "A", "D"]));
}

#[test]
fn ruleless_symbols_from_right_hand_sides_are_members() {
    let out = ok("A -> A F; F : dy 1; ^ F;");
    assert_eq!(out.spec.rule(&"F".to_owned()), None);
    assert_eq!(out.app.draw_count(&"F".to_owned()), 1);
}

#[test]
fn diagnostics_display_with_span() {
    let errs = errors("A -> A; A : rz nope; ^ A;");
    assert_eq!(errs[0].to_string(), "[15..19] Variable 'nope' is not defined.");
}
