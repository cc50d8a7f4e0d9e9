//! Core data model for the projector structural matching engine.
//!
//! This crate holds the language-neutral types shared by the pattern
//! builder and the matcher: byte ranges, scoped context bindings, tree
//! paths, per-language structural tables, and matcher configuration. The
//! Tree-sitter specific machinery lives in `projector-syntax`.
//!
//! # Core types
//!
//! - [`CodeRange`] - half-open byte range inside a document
//! - [`Context`] - immutable, parent-linked variable scope
//! - [`TreePath`] - child-index route from one syntax node to another
//! - [`LanguageConfig`] - aggregation, chain, and block tables per language
//! - [`MatcherConfig`] - limits and behaviour switches for matching
//!
//! # Example
//!
//! ```
//! use projector_core::{CodeRange, Context};
//!
//! let root = Context::new().extend([("dsl", Some("dsl"))]);
//! let inner = root.extend([("sheet", Some("sheet"))]);
//! assert!(inner.contains("dsl"));
//! assert!(!root.contains("sheet"));
//! assert_eq!(CodeRange::new(4, 9).len(), 5);
//! ```

mod config;
mod context;
mod error;
mod language_config;
mod range;
mod tree_path;

pub use config::MatcherConfig;
pub use context::Context;
pub use error::ConfigError;
pub use language_config::{
    AggregatableNodeType, AggregationsConfig, BlockDelimiter, BlocksConfig, ChainsConfig,
    LanguageConfig,
};
pub use range::CodeRange;
pub use tree_path::TreePath;

#[cfg(test)]
mod tests;
