//! Matcher configuration for nesting limits and tolerance switches.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Matcher configuration controlling recursion limits and how strictly the
/// verifier compares pattern trees with document trees.
///
/// # Defaults
///
/// - `max_nesting_depth`: 64 nested sub-regions
/// - `skip_body_comments`: `true`
/// - `unwrap_parenthesized_calls`: `true`
/// - `empty_placeholder_prefix`: `"__empty_"`
///
/// # Example
///
/// ```
/// use projector_core::MatcherConfig;
///
/// let config = MatcherConfig::default().with_max_nesting_depth(8);
/// assert_eq!(config.max_nesting_depth(), 8);
/// assert!(config.skip_body_comments());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Maximum depth of nested match regions explored from one root match.
    max_nesting_depth: usize,
    /// Whether comments leading a `body` field are stepped over.
    skip_body_comments: bool,
    /// Whether a parenthesised call is compared as the call it wraps.
    unwrap_parenthesized_calls: bool,
    /// Identifier prefix marking an editor placeholder for another node type.
    empty_placeholder_prefix: String,
}

impl MatcherConfig {
    /// Creates a configuration with explicit values.
    #[must_use]
    pub const fn new(
        max_nesting_depth: usize,
        skip_body_comments: bool,
        unwrap_parenthesized_calls: bool,
        empty_placeholder_prefix: String,
    ) -> Self {
        Self {
            max_nesting_depth,
            skip_body_comments,
            unwrap_parenthesized_calls,
            empty_placeholder_prefix,
        }
    }

    /// Returns the maximum nesting depth.
    #[must_use]
    pub const fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    /// Returns whether leading body comments are skipped.
    #[must_use]
    pub const fn skip_body_comments(&self) -> bool {
        self.skip_body_comments
    }

    /// Returns whether parenthesised calls are unwrapped.
    #[must_use]
    pub const fn unwrap_parenthesized_calls(&self) -> bool {
        self.unwrap_parenthesized_calls
    }

    /// Returns the empty-placeholder identifier prefix.
    #[must_use]
    pub fn empty_placeholder_prefix(&self) -> &str {
        &self.empty_placeholder_prefix
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Enables or disables skipping of leading body comments.
    #[must_use]
    pub const fn with_skip_body_comments(mut self, enabled: bool) -> Self {
        self.skip_body_comments = enabled;
        self
    }

    /// Enables or disables parenthesised call unwrapping.
    #[must_use]
    pub const fn with_unwrap_parenthesized_calls(mut self, enabled: bool) -> Self {
        self.unwrap_parenthesized_calls = enabled;
        self
    }

    /// Replaces the empty-placeholder prefix. An empty prefix disables the
    /// rewrite.
    #[must_use]
    pub fn with_empty_placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.empty_placeholder_prefix = prefix.into();
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroNestingDepth`] when no region could ever be
    /// entered.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ZeroNestingDepth);
        }
        Ok(())
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 64,
            skip_body_comments: true,
            unwrap_parenthesized_calls: true,
            empty_placeholder_prefix: "__empty_".to_owned(),
        }
    }
}
