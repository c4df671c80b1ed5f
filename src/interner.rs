//! interner canonicalizes immutable strings to a single stable allocation.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// InternedStr is a cheap handle to a canonical, immutable byte string.
///
/// Two `InternedStr` values produced by the same [`Interner`] compare equal
/// iff their underlying bytes are equal; callers must not rely on pointer
/// identity, per Design Note §9, even though this implementation happens to
/// guarantee it within a single `Interner`.
#[derive(Clone, Eq)]
pub struct InternedStr(Rc<str>);

impl InternedStr {
    /// as_str exposes the underlying bytes.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// is_empty reports whether the interned string has zero length.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for InternedStr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl std::hash::Hash for InternedStr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for InternedStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Interner deduplicates byte strings to one canonical allocation each.
///
/// Lifetime spans the owning [`crate::engine::Engine`]; there is no
/// deletion, matching the source's bulk-free-at-shutdown string table.
#[derive(Default)]
pub struct Interner {
    table: HashMap<Box<str>, InternedStr>,
}

impl Interner {
    /// new constructs an empty interner.
    pub fn new() -> Interner {
        Interner {
            table: HashMap::new(),
        }
    }

    /// intern returns the canonical handle for `s`, allocating it on first
    /// sight. Repeated calls with equal bytes return values that compare
    /// equal to each other.
    pub fn intern(&mut self, s: &str) -> InternedStr {
        if let Some(existing) = self.table.get(s) {
            return existing.clone();
        }

        let handle = InternedStr(Rc::from(s));
        self.table.insert(Box::from(s), handle.clone());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("ld a, 0");
        let b = interner.intern("ld a, 0");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_are_distinct() {
        let mut interner = Interner::new();
        let a = interner.intern("xor a");
        let b = interner.intern("ld a, 0");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_interns() {
        let mut interner = Interner::new();
        let a = interner.intern("");
        assert!(a.is_empty());
    }
}
