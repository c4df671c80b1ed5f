//! subst expands a replacement template against a set of bindings.
//!
//! Ported from `substitute_line` in the original implementation: literal
//! text passes through unchanged, `$d` is replaced by its binding (or
//! nothing, if the slot was never captured), `$eval(...)` is replaced by
//! the decimal rendering of its evaluated body, and `$$` collapses to a
//! literal `$`.

use crate::config::MAX_LINE_LENGTH;
use crate::error::Error;
use crate::expr::{compile, Evaluator};
use crate::interner::Interner;
use crate::pattern::Bindings;

/// expand renders `template` against `bindings`, truncating the result to
/// `MAX_LINE_LENGTH` bytes (`spec.md` §4.6: "source behavior").
pub fn expand(
    template: &str,
    bindings: &Bindings,
    interner: &mut Interner,
    evaluator: &mut Evaluator,
    lineno: usize,
) -> Result<String, Error> {
    let bytes = template.as_bytes();
    let mut out = String::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            out.push(bytes[i] as char);
            i += 1;
            continue;
        }

        if bytes.get(i + 1) == Some(&b'$') {
            out.push('$');
            i += 2;
            continue;
        }

        if let Some(d) = bytes.get(i + 1).filter(|b| b.is_ascii_digit()) {
            let slot = d - b'0';
            if let Some(bound) = bindings.get(slot) {
                out.push_str(bound.as_str());
            }
            i += 2;
            continue;
        }

        if template[i..].starts_with("$eval(") {
            let body_start = i + "$eval(".len();
            let (body, after) = scan_balanced(template, body_start)?;
            let expr = compile(body, Some(lineno), interner)?;
            let value = evaluator.eval(&expr, bindings, Some(lineno))?;
            out.push_str(&value.to_string());
            i = after;
            continue;
        }

        out.push('$');
        i += 1;
    }

    out.truncate(find_char_boundary(&out, MAX_LINE_LENGTH));
    Ok(out)
}

/// scan_balanced finds the body of a `$eval(...)` call starting right after
/// its opening parenthesis, returning the body slice and the byte offset
/// just past the matching closing parenthesis.
fn scan_balanced(template: &str, start: usize) -> Result<(&str, usize), Error> {
    let bytes = template.as_bytes();
    let mut depth = 1i32;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&template[start..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    Err(Error::InvalidExpression(
        Some(0),
        "unterminated $eval(...)".to_string(),
    ))
}

fn find_char_boundary(s: &str, max_bytes: usize) -> usize {
    if s.len() <= max_bytes {
        return s.len();
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(template: &str, bindings: &Bindings) -> String {
        let mut interner = Interner::new();
        let mut evaluator = Evaluator::new();
        expand(template, bindings, &mut interner, &mut evaluator, 1).unwrap()
    }

    #[test]
    fn substitutes_binding() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(1, interner.intern("hl"));
        assert_eq!(expand_str("ld a, $1", &bindings), "ld a, hl");
    }

    #[test]
    fn unbound_slot_expands_to_nothing() {
        let bindings = Bindings::new();
        assert_eq!(expand_str("ld a, $1", &bindings), "ld a, ");
    }

    #[test]
    fn escapes_literal_dollar() {
        let bindings = Bindings::new();
        assert_eq!(expand_str("cost is $$5", &bindings), "cost is $5");
    }

    #[test]
    fn evaluates_eval_expression() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(1, interner.intern("3"));
        assert_eq!(expand_str("ld a, $eval($1 + 1)", &bindings), "ld a, 4");
    }

    #[test]
    fn truncates_long_output() {
        let bindings = Bindings::new();
        let template = "x".repeat(200);
        assert_eq!(expand_str(&template, &bindings).len(), MAX_LINE_LENGTH);
    }
}
