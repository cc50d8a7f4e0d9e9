//! Tree-sitter parsing for documents and template code strings.
//!
//! Documents are parsed leniently: a tree with error nodes is still a valid
//! input for matching, and error nodes simply never verify. Template code
//! strings must parse cleanly, so [`ParseResult::errors`] is what the
//! pattern builder reports back when one does not.

use std::ops::Range;

use crate::cursor::AstCursor;
use crate::error::ProjectorError;
use crate::language::SupportedLanguage;

/// A parsed document together with the text it was parsed from.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the parsed text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language of the parsed text.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns a cursor positioned on the root node.
    #[must_use]
    pub fn cursor(&self) -> AstCursor<'_> {
        AstCursor::new(self.tree.root_node(), &self.source)
    }

    /// Returns whether the tree contains error or missing nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects every error and missing node in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }
}

/// Location and description of a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// The erroneous text, shortened to at most fifty characters.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();
        let text = source.get(byte_range.clone()).unwrap_or_default();
        let context = if text.chars().count() > 50 {
            let head: String = text.chars().take(47).collect();
            format!("{head}...")
        } else {
            text.to_owned()
        };
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            format!("unexpected '{context}'")
        };
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

/// A Tree-sitter parser bound to one language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::ParserInit`] if the grammar cannot be
    /// loaded.
    pub fn new(language: SupportedLanguage) -> Result<Self, ProjectorError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ProjectorError::parser_init(language, e.to_string()))?;
        Ok(Self { inner, language })
    }

    /// Returns the language this parser is configured for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source` from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::Parse`] if Tree-sitter produces no tree,
    /// which only happens when parsing is cancelled.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, ProjectorError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| ProjectorError::parse(self.language, "parser returned no tree"))?;
        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Converts a zero-based Tree-sitter point into one-based line and column.
pub(crate) fn point_to_one_based(point: tree_sitter::Point) -> (u32, u32) {
    let line = u32::try_from(point.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(point.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}
