//! Candidate verification: structural comparison of one pattern tree against
//! one syntax subtree.
//!
//! Verification never moves the caller's cursor: every step that descends
//! captures the position first and restores it on the way out, whether the
//! comparison succeeded or not.

use std::collections::BTreeMap;

use projector_core::{BlockDelimiter, CodeRange, Context};
use tracing::debug;
use tree_sitter::Node;

use super::MATCHER_TARGET;
use super::capture::{Captures, SubRange};
use super::chain;
use super::context::MatchContext;
use crate::cursor::{AstCursor, Keyword, node_text};
use crate::pattern::{ANY_NODE_TYPE, Pattern, PatternNode, PatternNodeKind};

const BODY_FIELD: &str = "body";

/// Why a candidate did not fit. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Mismatch(pub(super) &'static str);

pub(super) type Verdict = Result<(), Mismatch>;

/// Verifies `pattern` against the subtree rooted at `node`, returning the
/// captured bindings on success.
pub(super) fn verify<'t>(
    ctx: &MatchContext<'_, 't>,
    pattern: &Pattern,
    node: Node<'t>,
    context: &Context,
) -> Option<Captures<'t>> {
    let mut cursor = AstCursor::new(node, ctx.source);
    let mut verifier = Verifier {
        ctx,
        pattern,
        context,
        captures: Captures::default(),
    };
    match verifier.node(pattern.root(), &mut cursor, None) {
        Ok(()) => {
            debug!(
                target: MATCHER_TARGET,
                pattern = pattern.name(),
                at = node.start_byte(),
                "candidate matched"
            );
            Some(verifier.captures)
        }
        Err(Mismatch(reason)) => {
            debug!(
                target: MATCHER_TARGET,
                pattern = pattern.name(),
                at = node.start_byte(),
                reason,
                "candidate rejected"
            );
            None
        }
    }
}

struct Verifier<'a, 't> {
    ctx: &'a MatchContext<'a, 't>,
    pattern: &'a Pattern,
    context: &'a Context,
    captures: Captures<'t>,
}

impl<'t> Verifier<'_, 't> {
    fn node(
        &mut self,
        expected: &PatternNode,
        cursor: &mut AstCursor<'t>,
        keyword: Option<Keyword<'t>>,
    ) -> Verdict {
        if matches!(expected.kind(), PatternNodeKind::ChainContinuation) {
            return Ok(());
        }
        if expected.field_name() != cursor.field_name() {
            return Err(Mismatch("field name differs"));
        }
        if cursor.is_error_token() {
            return Err(Mismatch("error token"));
        }
        if self.wraps_call(expected, cursor) {
            let at = cursor.snapshot();
            let verdict = if enter_parenthesized(cursor) {
                self.compare(expected, cursor, keyword)
            } else {
                Err(Mismatch("empty parentheses"))
            };
            cursor.restore(&at);
            return verdict;
        }
        self.compare(expected, cursor, keyword)
    }

    fn compare(
        &mut self,
        expected: &PatternNode,
        cursor: &mut AstCursor<'t>,
        keyword: Option<Keyword<'t>>,
    ) -> Verdict {
        match expected.kind() {
            PatternNodeKind::Regular {
                node_type,
                text,
                tokens,
                children,
            } => self.regular(node_type, text.as_deref(), tokens, children, cursor),
            PatternNodeKind::Argument {
                name,
                allowed_types,
            } => self.argument(name, allowed_types, cursor),
            PatternNodeKind::ContextVariable { name, node_type } => {
                self.context_variable(name, node_type, cursor)
            }
            PatternNodeKind::Block { declared } => self.block(declared, cursor, keyword),
            PatternNodeKind::Aggregation {
                name,
                node_type,
                has_start,
            } => self.aggregation(name, node_type, *has_start, cursor),
            PatternNodeKind::Chain {
                name,
                minimum_length,
            } => {
                let (start, links) = chain::walk(
                    self.ctx,
                    self.pattern,
                    self.context,
                    name,
                    *minimum_length,
                    cursor,
                )?;
                self.captures.add_chain(name, start, links);
                Ok(())
            }
            PatternNodeKind::ChainContinuation => Ok(()),
        }
    }

    fn regular(
        &mut self,
        node_type: &str,
        text: Option<&str>,
        tokens: &[String],
        children: &[PatternNode],
        cursor: &mut AstCursor<'t>,
    ) -> Verdict {
        if cursor.node_type() != node_type {
            return Err(Mismatch("node type differs"));
        }
        if children.is_empty() {
            return match text {
                Some(expected) if expected != cursor.text() => Err(Mismatch("leaf text differs")),
                _ => Ok(()),
            };
        }
        if !cursor.has_children() {
            return Err(Mismatch("expected children"));
        }
        if !same_tokens(cursor.node(), self.ctx.source, tokens) {
            return Err(Mismatch("keyword signature differs"));
        }
        let at = cursor.snapshot();
        let verdict = self.children(children, cursor);
        cursor.restore(&at);
        verdict
    }

    /// Pairs pattern children with the named AST children, stepping over
    /// anonymous tokens.
    fn children(&mut self, expected: &[PatternNode], cursor: &mut AstCursor<'t>) -> Verdict {
        let mut present = cursor.goto_first_child();
        for child in expected {
            if !present {
                return Err(Mismatch("fewer children than pattern"));
            }
            let (found, mut keyword) = cursor.skip_keywords();
            if !found {
                return Err(Mismatch("fewer children than pattern"));
            }
            if self.skips_comments(child) {
                while self.ctx.language().is_comment(cursor.node_type()) {
                    if !cursor.goto_next_sibling() {
                        return Err(Mismatch("body missing after comment"));
                    }
                    let (more, after) = cursor.skip_keywords();
                    if !more {
                        return Err(Mismatch("body missing after comment"));
                    }
                    keyword = after.or(keyword);
                }
            }
            self.node(child, cursor, keyword)?;
            present = cursor.goto_next_sibling();
        }
        while present && cursor.is_keyword() {
            present = cursor.goto_next_sibling();
        }
        if present {
            Err(Mismatch("more children than pattern"))
        } else {
            Ok(())
        }
    }

    fn skips_comments(&self, child: &PatternNode) -> bool {
        self.ctx.config.skip_body_comments() && child.field_name() == Some(BODY_FIELD)
    }

    fn argument(&mut self, name: &str, allowed: &[String], cursor: &AstCursor<'t>) -> Verdict {
        self.captures.bind(name, cursor.node());
        let actual = self.effective_type(cursor);
        if allowed
            .iter()
            .any(|kind| kind == ANY_NODE_TYPE || kind == actual)
        {
            Ok(())
        } else {
            Err(Mismatch("argument type not allowed"))
        }
    }

    /// Returns the node type, reading `__empty_<type>` identifiers as a
    /// node of `<type>`.
    fn effective_type(&self, cursor: &AstCursor<'t>) -> &'t str {
        let node_type = cursor.node_type();
        if node_type != self.ctx.language().identifier_node_type {
            return node_type;
        }
        cursor
            .text()
            .strip_prefix(self.ctx.config.empty_placeholder_prefix())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(node_type)
    }

    fn context_variable(&self, name: &str, node_type: &str, cursor: &AstCursor<'t>) -> Verdict {
        if !self.context.contains(name) {
            // Unbound variables compare as the identifier written in the
            // template.
            return if cursor.node_type() == node_type && cursor.text() == name {
                Ok(())
            } else {
                Err(Mismatch("identifier differs"))
            };
        }
        if cursor.node_type() != self.ctx.language().identifier_node_type {
            return Err(Mismatch("context variable is not an identifier"));
        }
        match self.context.value(name) {
            Some(bound) if bound != cursor.text() => {
                Err(Mismatch("context variable bound to another identifier"))
            }
            _ => Ok(()),
        }
    }

    fn block(
        &mut self,
        declared: &BTreeMap<String, String>,
        cursor: &AstCursor<'t>,
        keyword: Option<Keyword<'t>>,
    ) -> Verdict {
        let blocks = &self.ctx.language().blocks;
        if cursor.node_type() != blocks.block_node_type {
            return Err(Mismatch("not a block"));
        }
        let node = cursor.node();
        let range = block_range(blocks.delimiter, CodeRange::from(node.byte_range()), keyword);
        self.captures.add_block(SubRange::new(range, node), declared);
        Ok(())
    }

    fn aggregation(
        &mut self,
        name: &str,
        node_type: &str,
        has_start: bool,
        cursor: &AstCursor<'t>,
    ) -> Verdict {
        if cursor.node_type() != node_type {
            return Err(Mismatch("aggregation node type differs"));
        }
        let Some(tokens) = self.ctx.language().aggregations.get(node_type) else {
            return Err(Mismatch("aggregation has no token table"));
        };
        let node = cursor.node();
        let mut walk = node.walk();
        let mut elements = Vec::new();
        for child in node.children(&mut walk) {
            if child.is_error() || child.is_missing() {
                return Err(Mismatch("error token in aggregation"));
            }
            if !tokens.is_structural_token(node_text(child, self.ctx.source)) {
                elements.push(SubRange::of(child));
            }
        }
        let start = if has_start && !elements.is_empty() {
            Some(elements.remove(0))
        } else {
            None
        };
        self.captures.add_aggregation(name, start, elements);
        Ok(())
    }

    /// Whether a parenthesised chain call stands where `expected` wants the
    /// call itself.
    fn wraps_call(&self, expected: &PatternNode, cursor: &AstCursor<'t>) -> bool {
        let language = self.ctx.language();
        if !self.ctx.config.unwrap_parenthesized_calls()
            || cursor.node_type() != language.parenthesized_node_type
        {
            return false;
        }
        if matches!(
            expected.kind(),
            PatternNodeKind::Regular { node_type, .. } if *node_type == language.parenthesized_node_type
        ) {
            return false;
        }
        let Some(chains) = language.chains.as_ref() else {
            return false;
        };
        let node = cursor.node();
        node.named_child_count() == 1
            && node
                .named_child(0)
                .is_some_and(|inner| inner.kind() == chains.chain_node_type)
    }
}

/// Returns the editable range of a block node spanning `node`. Colon blocks
/// start one byte past their `:` so header comments stay inside; brace
/// blocks lose both braces.
pub(super) fn block_range(
    delimiter: BlockDelimiter,
    node: CodeRange,
    keyword: Option<Keyword<'_>>,
) -> CodeRange {
    match delimiter {
        BlockDelimiter::Colon => {
            let from = keyword
                .filter(|token| token.text == ":")
                .map_or(node.start(), |token| token.start);
            CodeRange::new(from + 1, node.end())
        }
        BlockDelimiter::Brace => CodeRange::new(node.start() + 1, node.end().saturating_sub(1)),
    }
}

fn enter_parenthesized(cursor: &mut AstCursor<'_>) -> bool {
    cursor.goto_first_child() && cursor.skip_keywords().0
}

fn same_tokens(node: Node<'_>, source: &str, expected: &[String]) -> bool {
    let mut walk = node.walk();
    let same = node
        .children(&mut walk)
        .filter(|child| !child.is_named())
        .map(|child| node_text(child, source))
        .eq(expected.iter().map(String::as_str));
    same
}
