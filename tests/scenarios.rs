//! End-to-end tests for the concrete scenarios seeded in the specification
//! (S1–S6), driven entirely in-memory.

use zopt::io::{InMemorySink, InMemorySource};
use zopt::Engine;

fn run(rule_src: &str, input: Vec<&str>) -> Vec<String> {
    let mut engine = Engine::new();
    let mut rule_source = InMemorySource::new(rule_src.lines().collect());
    let (rules, window_size) = engine.load_rules(&mut rule_source).unwrap();

    let mut source = InMemorySource::new(input);
    let mut sink = InMemorySink::default();
    engine
        .optimize(&rules, window_size, &mut source, &mut sink)
        .unwrap();
    sink.lines
}

#[test]
fn s1_simple_single_line_rewrite() {
    let rules = "pattern:\nld a, 0\nreplacement:\nxor a\n";
    assert_eq!(
        run(rules, vec!["ld a, 0", "ret"]),
        vec!["xor a".to_string(), "ret".to_string()]
    );
}

#[test]
fn s2_variable_binding_with_constraint() {
    let rules =
        "pattern:\nld $0, $1\nreplacement:\nld $0, $1\nconstraints:\nisnumeric $1 and $1 = 0\n";
    assert_eq!(run(rules, vec!["ld a, 0"]), vec!["ld a, 0".to_string()]);
    assert_eq!(run(rules, vec!["ld a, 5"]), vec!["ld a, 5".to_string()]);
}

#[test]
fn s3_two_line_pattern_collapses() {
    // "-" stores an empty replacement line rather than omitting it, so a
    // 2-line pattern replaced by two "-" rows keeps the window size (P ==
    // R) and emits two blank lines ahead of the untouched tail.
    let rules = "pattern:\npush $0\npop $0\nreplacement:\n-\n-\n";
    assert_eq!(
        run(rules, vec!["push bc", "pop bc", "ret"]),
        vec!["".to_string(), "".to_string(), "ret".to_string()]
    );
}

#[test]
fn s4_eval_expression() {
    let rules = "pattern:\nadd $0, $1\nconstraints:\nisnumeric $1\nreplacement:\nadd $0, $eval($1+1)\n";
    assert_eq!(run(rules, vec!["add hl, 3"]), vec!["add hl, 4".to_string()]);
}

#[test]
fn s5_repeated_variable() {
    let rules = "pattern:\nmov $0, $0\nreplacement:\n-\n";
    assert_eq!(
        run(rules, vec!["mov r1, r1", "mov r1, r2"]),
        vec!["".to_string(), "mov r1, r2".to_string()]
    );
}

#[test]
fn s6_cascaded_rewrite() {
    let rules = "pattern:\nld a, 0\nreplacement:\nxor a\npattern:\nxor a\nreplacement:\nld a, 255\n";
    assert_eq!(run(rules, vec!["ld a, 0"]), vec!["ld a, 255".to_string()]);
}

#[test]
fn empty_rule_file_is_identity() {
    let rules = "";
    assert_eq!(
        run(rules, vec!["ld a, 0", "ret"]),
        vec!["ld a, 0".to_string(), "ret".to_string()]
    );
}

#[test]
fn identical_pattern_and_replacement_is_a_noop() {
    let rules = "pattern:\nnop\nreplacement:\nnop\n";
    assert_eq!(run(rules, vec!["nop"]), vec!["nop".to_string()]);
}

#[test]
fn trailing_placeholder_captures_tail() {
    let rules = "pattern:\npush $0\nreplacement:\npop $0\n";
    assert_eq!(run(rules, vec!["push hl"]), vec!["pop hl".to_string()]);
}
