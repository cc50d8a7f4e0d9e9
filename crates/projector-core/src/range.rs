//! Byte ranges used to report where matches and their sub-regions sit.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open byte range `[from, to)` inside a UTF-8 document.
///
/// Ranges are reported for whole matches and for the sub-regions a match
/// leaves editable (block bodies, aggregation parts, chain links).
///
/// # Example
///
/// ```
/// use projector_core::CodeRange;
///
/// let range = CodeRange::new(10, 42);
/// assert_eq!(range.start(), 10);
/// assert_eq!(range.end(), 42);
/// assert!(range.contains(&CodeRange::new(12, 20)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CodeRange {
    /// Start byte offset (inclusive).
    pub from: usize,
    /// End byte offset (exclusive).
    pub to: usize,
}

impl CodeRange {
    /// Creates a new range. An inverted pair collapses to an empty range at
    /// `from`.
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        if to < from {
            Self { from, to: from }
        } else {
            Self { from, to }
        }
    }

    /// Returns the inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.from
    }

    /// Returns the exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.to
    }

    /// Returns the number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Returns `true` when the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    /// Returns `true` when `other` lies entirely inside this range.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// Returns `true` when the two ranges share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// Returns the range as a standard library [`Range`].
    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.from..self.to
    }
}

impl From<Range<usize>> for CodeRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<CodeRange> for Range<usize> {
    fn from(range: CodeRange) -> Self {
        range.from..range.to
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}
