//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup. Interned strings are leaked to
//! obtain `&'static str`, which is acceptable for a compiler process
//! whose identifier set is bounded by its inputs.

use super::Name;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Interior storage for the interner.
struct Inner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw`.
    strings: Vec<&'static str>,
}

/// String interner producing `Name` handles.
///
/// Interning the same string twice yields the same `Name`, so name
/// equality is a `u32` comparison. The empty string is pre-interned
/// as `Name::EMPTY`.
pub struct StringInterner {
    inner: Mutex<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        let empty: &'static str = "";
        map.insert(empty, 0);
        StringInterner {
            inner: Mutex::new(Inner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        let mut inner = self.inner.lock();
        if let Some(&idx) = inner.map.get(s) {
            return Name::from_raw(idx);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(inner.strings.len())
            .unwrap_or_else(|_| panic!("interner capacity exceeded: {} strings", u32::MAX));
        inner.strings.push(leaked);
        inner.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Look up the textual form of a `Name`.
    ///
    /// # Panics
    /// Panics if the name was not produced by this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        let inner = self.inner.lock();
        inner.strings[name.raw() as usize]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.lock().strings.len()
    }

    /// Whether only the pre-interned empty string is stored.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("toString");
        let b = interner.intern("toString");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "toString");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let interner = StringInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("y");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_is_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
    }
}
