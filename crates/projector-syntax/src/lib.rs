//! Tree-sitter powered structural pattern matching for projectional editing.
//!
//! A projectional editor shows parts of a source file as widgets. This crate
//! decides where those widgets go: it compiles *templates* (code with typed
//! holes) into *patterns*, and finds the places in a parsed document where a
//! pattern fits, together with the sub-regions the widget leaves editable.
//!
//! # Pipeline
//!
//! 1. Declare parameters with [`define_argument`], [`define_context_variable`],
//!    [`define_block`], [`define_aggregation`], and [`define_chain`].
//! 2. Write a [`Template`] around them and compile it with a
//!    [`PatternBuilder`] (or [`compile_template`]).
//! 3. Register the patterns in a [`PatternRegistry`]; more specific patterns
//!    (more leaves) are tried first.
//! 4. Parse the document with a [`Parser`] and scan it with a [`Matcher`].
//!
//! # Supported Languages
//!
//! - Python (`.py`, `.pyi`)
//! - TypeScript (`.ts`, `.tsx`, `.mts`, `.cts`)
//! - Rust (`.rs`)
//!
//! # Example
//!
//! ```
//! use projector_core::Context;
//! use projector_syntax::{
//!     Matcher, Parser, PatternBuilder, PatternRegistry, SupportedLanguage, Template,
//!     define_argument,
//! };
//!
//! let template = Template::expression(
//!     "norm",
//!     SupportedLanguage::Python,
//!     "np.linalg.norm(${v}, ${ord})",
//!     [
//!         ("v", define_argument("v", ["identifier"])),
//!         ("ord", define_argument("ord", ["integer"])),
//!     ],
//! )?;
//! let mut builder = PatternBuilder::new(SupportedLanguage::Python)?;
//! let mut registry = PatternRegistry::new(SupportedLanguage::Python);
//! registry.register(builder.compile(&template)?)?;
//!
//! let mut parser = Parser::new(SupportedLanguage::Python)?;
//! let document = parser.parse("n = np.linalg.norm(x, 2)\n")?;
//! let matches = Matcher::new(&registry).find_all(&document, &Context::new());
//! assert_eq!(matches[0].arg_text("v"), Some("x"));
//! # Ok::<(), projector_syntax::ProjectorError>(())
//! ```

mod builder;
mod cursor;
mod error;
pub mod inspect;
mod language;
mod matcher;
mod parser;
mod pattern;
mod registry;
mod template;

pub use builder::{PatternBuilder, compile_template};
pub use cursor::{AstCursor, Keyword};
pub use error::ProjectorError;
pub use language::SupportedLanguage;
pub use matcher::{AggregationRanges, BlockRange, ChainRanges, Match, Matcher, SubRange};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use pattern::{
    ANY_NODE_TYPE, AggregationDecorator, ChainDecorator, Pattern, PatternId, PatternNode,
    PatternNodeKind,
};
pub use registry::{PatternMap, PatternRegistry, SubPatternRole};
pub use template::{
    CodeString, Parameter, ParameterEntry, ParameterKind, Template, TemplateKind,
    define_aggregation, define_argument, define_block, define_chain, define_context_variable,
};

#[cfg(test)]
mod tests;
