//! String interning for names
//!
//! Every short name, package segment and string constant that flows through
//! descriptor deserialization is interned once per session. Descriptors only
//! carry the resulting [`Symbol`] handles, which are `Copy` and compare in O(1).

pub use lasso::Spur as Symbol;
use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::Arc;

/// Thread-safe string interner
///
/// Cloning is cheap and yields a handle to the same table, so symbols
/// produced through one clone resolve through every other.
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Creates an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Interns `text`, returning the existing symbol when it was seen before
    pub fn intern(&self, text: &str) -> Symbol {
        self.inner.get_or_intern(text)
    }

    /// Looks up the symbol of an already interned string without inserting it
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.inner.get(text)
    }

    /// Resolves a symbol to an owned string
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> String {
        self.inner.resolve(sym).to_owned()
    }

    /// Resolves a symbol, returning `None` for symbols from another interner
    #[must_use]
    pub fn try_resolve(&self, sym: &Symbol) -> Option<String> {
        self.inner.try_resolve(sym).map(ToOwned::to_owned)
    }

    /// Runs `with` on the borrowed text of `sym` without allocating
    pub fn with_text<R>(&self, sym: &Symbol, with: impl FnOnce(&str) -> R) -> R {
        with(self.inner.resolve(sym))
    }

    /// Number of distinct strings interned so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been interned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let interner = Interner::new();
        let first = interner.intern("values");
        let second = interner.intern("values");
        assert_eq!(first, second);
        assert_eq!(interner.len(), 1);
        assert_eq!(interner.resolve(&first), "values");
    }

    #[test]
    fn test_clones_share_the_table() {
        let interner = Interner::new();
        let other = interner.clone();
        let sym = other.intern("valueOf");
        assert_eq!(interner.get("valueOf"), Some(sym));
        assert!(interner.with_text(&sym, |text| text.starts_with("value")));
    }
}
