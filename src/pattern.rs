//! pattern matches a single pattern line against a single source line,
//! capturing `$0`..`$9` placeholder bindings.
//!
//! Ported from `match_pattern_line` in the original implementation: a
//! two-cursor scan, skipping elastic whitespace on both sides, greedily
//! anchoring on the literal text that follows each placeholder.

use crate::config::BINDING_SLOTS;
use crate::interner::{InternedStr, Interner};

/// Bindings holds the `$0`..`$9` captures accumulated while matching the
/// pattern lines of one rule against one window.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    slots: [Option<InternedStr>; BINDING_SLOTS],
}

impl Bindings {
    /// new returns an empty binding set.
    pub fn new() -> Bindings {
        Bindings::default()
    }

    /// get returns the binding for `slot`, if any.
    pub fn get(&self, slot: u8) -> Option<&InternedStr> {
        self.slots.get(slot as usize).and_then(|s| s.as_ref())
    }

    /// bind records a value for `slot`, overwriting any previous one.
    pub fn bind(&mut self, slot: u8, value: InternedStr) {
        if let Some(cell) = self.slots.get_mut(slot as usize) {
            *cell = Some(value);
        }
    }

    /// clear drops every captured binding, reusing the allocation.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

/// match_line attempts to match `pattern` against `line`, threading capture
/// consistency through `bindings` (a placeholder bound earlier in the same
/// rule must agree with every later occurrence). Returns `false` without
/// mutating `bindings` further once a mismatch is found, though bindings
/// made before the mismatch are not rolled back — the caller discards the
/// whole `Bindings` value on failure.
pub fn match_line(pattern: &str, line: &str, bindings: &mut Bindings, interner: &mut Interner) -> bool {
    let pattern = pattern.as_bytes();
    let line_bytes = line.as_bytes();
    let mut p = 0usize;
    let mut l = 0usize;

    while p < pattern.len() {
        while pattern.get(p) == Some(&b' ') {
            p += 1;
        }
        while line_bytes.get(l) == Some(&b' ') {
            l += 1;
        }

        if p >= pattern.len() {
            break;
        }

        if pattern[p] == b'$' && pattern.get(p + 1).is_some_and(u8::is_ascii_digit) {
            let slot = pattern[p + 1] - b'0';
            p += 2;

            let lit_start = p;
            while p < pattern.len() && !(pattern[p] == b'$' && pattern.get(p + 1).is_some_and(u8::is_ascii_digit)) {
                p += 1;
            }
            let literal = &pattern[lit_start..p];

            if literal.is_empty() {
                let rest = &line[l..];
                if !bind_or_check(bindings, slot, rest, interner) {
                    return false;
                }
                l = line.len();
            } else {
                let literal_str = std::str::from_utf8(literal).unwrap_or("");
                let rest = &line[l..];
                let found = match rest.find(literal_str) {
                    Some(offset) => offset,
                    None => return false,
                };
                let captured = &rest[..found];
                if !bind_or_check(bindings, slot, captured, interner) {
                    return false;
                }
                l += found + literal_str.len();
            }
        } else {
            if line_bytes.get(l) != Some(&pattern[p]) {
                return false;
            }
            p += 1;
            l += 1;
        }
    }

    matches!(line_bytes.get(l), None | Some(b'\n'))
}

fn bind_or_check(bindings: &mut Bindings, slot: u8, captured: &str, interner: &mut Interner) -> bool {
    match bindings.get(slot) {
        Some(existing) => existing.as_str() == captured,
        None => {
            bindings.bind(slot, interner.intern(captured));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        assert!(match_line("ld a, 0", "ld a, 0", &mut bindings, &mut interner));
    }

    #[test]
    fn captures_placeholder() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        assert!(match_line("ld a, $1", "ld a, 42", &mut bindings, &mut interner));
        assert_eq!(bindings.get(1).unwrap().as_str(), "42");
    }

    #[test]
    fn repeat_binding_must_agree() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        assert!(match_line("ld $1, $1", "ld a, a", &mut bindings, &mut interner));
        let mut bindings = Bindings::new();
        assert!(!match_line("ld $1, $1", "ld a, b", &mut bindings, &mut interner));
    }

    #[test]
    fn trailing_garbage_rejected() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        assert!(!match_line("ld a, 0", "ld a, 0 ; comment", &mut bindings, &mut interner));
    }

    #[test]
    fn elastic_whitespace() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        assert!(match_line("ld a, 0", "ld   a,   0", &mut bindings, &mut interner));
    }

    #[test]
    fn trailing_placeholder_grabs_rest() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        assert!(match_line("push $0", "push hl", &mut bindings, &mut interner));
        assert_eq!(bindings.get(0).unwrap().as_str(), "hl");
    }
}
