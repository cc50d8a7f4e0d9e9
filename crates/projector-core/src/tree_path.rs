//! Child-index routes through a syntax tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A sequence of child indices leading from one node to a descendant.
///
/// Step `n` selects the `n`-th child (counting every child, named or not)
/// of the node reached by the previous steps. An empty path names the
/// starting node itself.
///
/// # Example
///
/// ```
/// use projector_core::TreePath;
///
/// let path = TreePath::from(vec![0, 1]);
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.last_step(), Some(1));
/// assert_eq!(path.parent(), TreePath::from(vec![0]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    /// Returns the empty path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the individual steps.
    #[must_use]
    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the final step, if any.
    #[must_use]
    pub fn last_step(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Returns the path without its final step.
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut steps = self.0.clone();
        steps.pop();
        Self(steps)
    }

    /// Appends a single step.
    pub fn push(&mut self, step: usize) {
        self.0.push(step);
    }

    /// Removes and returns the final step.
    pub fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    /// Returns a new path made of this path followed by `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut steps = self.0.clone();
        steps.extend_from_slice(&other.0);
        Self(steps)
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl From<&[usize]> for TreePath {
    fn from(steps: &[usize]) -> Self {
        Self(steps.to_vec())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, step) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{step}")?;
        }
        f.write_str("]")
    }
}
