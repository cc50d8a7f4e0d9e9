//! Errors raised while validating configuration tables.

use thiserror::Error;

/// A language or matcher configuration that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An aggregatable node type has an empty start or end token.
    #[error("aggregatable node type '{node_type}' is missing its {token} token")]
    MissingAggregationToken {
        /// The offending node type.
        node_type: String,
        /// Which token is missing (`start` or `end`).
        token: &'static str,
    },

    /// A chain table cannot be walked.
    #[error("chain configuration for '{node_type}' is invalid: {message}")]
    InvalidChain {
        /// The configured chain node type.
        node_type: String,
        /// Description of the problem.
        message: String,
    },

    /// A required node type name was empty.
    #[error("{field} must name a node type")]
    EmptyNodeType {
        /// The configuration field that was empty.
        field: &'static str,
    },

    /// The matcher nesting limit leaves no room for a single region.
    #[error("max_nesting_depth must be at least 1")]
    ZeroNestingDepth,
}

impl ConfigError {
    /// Creates an invalid chain error.
    #[must_use]
    pub fn invalid_chain(node_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidChain {
            node_type: node_type.into(),
            message: message.into(),
        }
    }
}
