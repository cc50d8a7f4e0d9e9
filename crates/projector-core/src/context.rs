//! Scoped variable bindings visible while matching a document region.
//!
//! A [`Context`] is an immutable chain of frames. Extending a context creates
//! a child frame that points at its parent, so entering a block never
//! disturbs the bindings seen by sibling regions.

use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
struct Frame {
    bindings: BTreeMap<String, Option<String>>,
    parent: Option<Arc<Frame>>,
}

/// Parent-linked map from context-variable names to bound identifier text.
///
/// A name may be bound without a value ("unset"); such a name still gates
/// patterns that require it, but a context-variable placeholder naming it
/// will not match any identifier.
///
/// # Example
///
/// ```
/// use projector_core::Context;
///
/// let outer = Context::new().extend([("dsl", Some("mathdsl"))]);
/// let inner = outer.extend([("sheet", None::<&str>)]);
///
/// assert_eq!(inner.value("dsl"), Some("mathdsl"));
/// assert!(inner.contains("sheet"));
/// assert_eq!(inner.value("sheet"), None);
/// assert!(!outer.contains("sheet"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    frame: Option<Arc<Frame>>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self { frame: None }
    }

    /// Returns a child context adding `bindings` on top of this one.
    ///
    /// The receiver is left untouched. A binding in the child shadows a
    /// binding of the same name further up the chain.
    #[must_use]
    pub fn extend<K, V, I>(&self, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, Option<V>)>,
    {
        let bindings: BTreeMap<String, Option<String>> = entries
            .into_iter()
            .map(|(name, value)| (name.into(), value.map(Into::into)))
            .collect();
        if bindings.is_empty() {
            return self.clone();
        }
        Self {
            frame: Some(Arc::new(Frame {
                bindings,
                parent: self.frame.clone(),
            })),
        }
    }

    /// Returns `true` when `name` is bound in this scope or any ancestor.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Returns the identifier text bound to `name`, if it is bound and set.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(Option::as_deref)
    }

    /// Returns `true` when every name in `names` is bound.
    #[must_use]
    pub fn contains_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.contains(name.as_ref()))
    }

    /// Returns every visible name, nearest binding first, without duplicates.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut frame = self.frame.as_deref();
        while let Some(current) = frame {
            for name in current.bindings.keys() {
                if !seen.contains(&name.as_str()) {
                    seen.push(name);
                }
            }
            frame = current.parent.as_deref();
        }
        seen
    }

    /// Returns the number of frames between this scope and the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.frame.as_deref();
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent.as_deref();
        }
        depth
    }

    fn lookup(&self, name: &str) -> Option<&Option<String>> {
        let mut frame = self.frame.as_deref();
        while let Some(current) = frame {
            if let Some(value) = current.bindings.get(name) {
                return Some(value);
            }
            frame = current.parent.as_deref();
        }
        None
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Context
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self::new().extend(iter)
    }
}
