//! Pattern matching engine for projecting code structures.
//!
//! The matcher scans a parsed document with the patterns of a
//! [`PatternRegistry`]. Each node is claimed by at most one pattern (the most
//! specific that verifies), scanning resumes at the next sibling, and the
//! regions a match carves out are scanned again with the patterns that
//! belong to them. Matches come back in document order.

mod capture;
mod chain;
mod context;
mod matching;
mod verify;

use std::collections::BTreeMap;
use std::sync::Arc;

use projector_core::{CodeRange, Context, MatcherConfig};
use tracing::Dispatch;
use tree_sitter::Node;

use crate::cursor::{AstCursor, node_text};
use crate::error::ProjectorError;
use crate::parser::{ParseResult, point_to_one_based};
use crate::pattern::Pattern;
use crate::registry::PatternRegistry;

pub use capture::{AggregationRanges, BlockRange, ChainRanges, SubRange};

use capture::Captures;
use context::MatchContext;

const MATCHER_TARGET: &str = "projector::matcher";

/// A pattern that claimed a node.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    pattern: Arc<Pattern>,
    node: Node<'t>,
    source: &'t str,
    range: CodeRange,
    depth: usize,
    args: BTreeMap<String, Node<'t>>,
    blocks: Vec<BlockRange<'t>>,
    aggregations: BTreeMap<String, AggregationRanges<'t>>,
    chains: BTreeMap<String, ChainRanges<'t>>,
}

impl<'t> Match<'t> {
    fn new(
        pattern: Arc<Pattern>,
        node: Node<'t>,
        source: &'t str,
        depth: usize,
        captures: Captures<'t>,
    ) -> Self {
        Self {
            pattern,
            node,
            source,
            range: CodeRange::from(node.byte_range()),
            depth,
            args: captures.args,
            blocks: captures.blocks,
            aggregations: captures.aggregations,
            chains: captures.chains,
        }
    }

    const fn set_range(&mut self, range: CodeRange) {
        self.range = range;
    }

    /// Returns the pattern that matched.
    #[must_use]
    pub const fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    /// Returns the matched node.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.node
    }

    /// Returns the consumed byte range. For a chain link this starts at the
    /// link's member-access token rather than at the call.
    #[must_use]
    pub const fn range(&self) -> CodeRange {
        self.range
    }

    /// Returns the text of the consumed range.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.text_at(self.range)
    }

    /// Returns the document text inside `range`, which need not lie within
    /// the match.
    #[must_use]
    pub fn text_at(&self, range: CodeRange) -> &'t str {
        self.source.get(range.as_range()).unwrap_or_default()
    }

    /// Returns how many carved regions enclose this match; top-level
    /// matches have depth zero.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the start position (line, column) of the matched node.
    ///
    /// Both line and column are one-based for display purposes.
    #[must_use]
    pub fn start_position(&self) -> (u32, u32) {
        point_to_one_based(self.node.start_position())
    }

    /// Returns the end position (line, column) of the matched node.
    ///
    /// Both line and column are one-based for display purposes.
    #[must_use]
    pub fn end_position(&self) -> (u32, u32) {
        point_to_one_based(self.node.end_position())
    }

    /// Returns every argument binding.
    #[must_use]
    pub const fn args(&self) -> &BTreeMap<String, Node<'t>> {
        &self.args
    }

    /// Returns the node bound to argument `name`.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<Node<'t>> {
        self.args.get(name).copied()
    }

    /// Returns the text bound to argument `name`.
    #[must_use]
    pub fn arg_text(&self, name: &str) -> Option<&'t str> {
        self.arg(name).map(|node| node_text(node, self.source))
    }

    /// Returns the block interiors in document order.
    #[must_use]
    pub fn blocks(&self) -> &[BlockRange<'t>] {
        &self.blocks
    }

    /// Returns the aggregation regions keyed by aggregation name.
    #[must_use]
    pub const fn aggregations(&self) -> &BTreeMap<String, AggregationRanges<'t>> {
        &self.aggregations
    }

    /// Returns the regions of aggregation `name`.
    #[must_use]
    pub fn aggregation(&self, name: &str) -> Option<&AggregationRanges<'t>> {
        self.aggregations.get(name)
    }

    /// Returns the chain regions keyed by chain name.
    #[must_use]
    pub const fn chains(&self) -> &BTreeMap<String, ChainRanges<'t>> {
        &self.chains
    }

    /// Returns the regions of chain `name`.
    #[must_use]
    pub fn chain(&self, name: &str) -> Option<&ChainRanges<'t>> {
        self.chains.get(name)
    }

    /// Returns every carved region, sorted by start offset.
    #[must_use]
    pub fn sub_ranges(&self) -> Vec<CodeRange> {
        let mut ranges: Vec<CodeRange> = self.blocks.iter().map(BlockRange::range).collect();
        for aggregation in self.aggregations.values() {
            ranges.extend(aggregation.start().map(SubRange::range));
            ranges.extend(aggregation.parts().iter().map(SubRange::range));
        }
        for chain in self.chains.values() {
            ranges.push(chain.start().range());
            ranges.extend(chain.links().iter().map(SubRange::range));
        }
        ranges.sort_by_key(|range| (range.start(), range.end()));
        ranges
    }

    /// Returns the parts of the consumed range not covered by any carved
    /// region. These are the pieces a projection renders itself.
    #[must_use]
    pub fn segments(&self) -> Vec<CodeRange> {
        let mut segments = Vec::new();
        let mut at = self.range.start();
        for sub in self.sub_ranges() {
            if sub.start() > at {
                segments.push(CodeRange::new(at, sub.start().min(self.range.end())));
            }
            at = at.max(sub.end());
        }
        if at < self.range.end() {
            segments.push(CodeRange::new(at, self.range.end()));
        }
        segments
    }
}

/// Finds pattern matches in parsed documents.
#[derive(Debug, Clone)]
pub struct Matcher<'r> {
    registry: &'r PatternRegistry,
    config: MatcherConfig,
    dispatch: Option<Dispatch>,
}

impl<'r> Matcher<'r> {
    /// Creates a matcher over `registry` with the default configuration.
    #[must_use]
    pub fn new(registry: &'r PatternRegistry) -> Self {
        Self {
            registry,
            config: MatcherConfig::default(),
            dispatch: None,
        }
    }

    /// Replaces the matcher configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::Config`] if `config` does not validate.
    pub fn with_config(mut self, config: MatcherConfig) -> Result<Self, ProjectorError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Routes every diagnostic event of this matcher to `dispatch` instead of
    /// the ambient subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Returns the registry the matcher draws candidates from.
    #[must_use]
    pub const fn registry(&self) -> &'r PatternRegistry {
        self.registry
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Scans the node under `cursor` and its following siblings, stopping at
    /// the first node that starts at or after `upto`. The cursor is returned
    /// to where it started.
    #[must_use]
    pub fn find_matches<'t>(
        &self,
        cursor: &mut AstCursor<'t>,
        context: &Context,
        upto: Option<usize>,
    ) -> Vec<Match<'t>> {
        self.traced(|| {
            let ctx = MatchContext::new(self.registry, &self.config, cursor.source());
            let entry = cursor.snapshot();
            let mut out = Vec::new();
            matching::scan_siblings(
                &ctx,
                cursor,
                self.registry.roots(),
                context,
                upto,
                0,
                &mut out,
            );
            cursor.restore(&entry);
            out
        })
    }

    /// Scans a whole document.
    #[must_use]
    pub fn find_all<'t>(&self, parsed: &'t ParseResult, context: &Context) -> Vec<Match<'t>> {
        let mut cursor = parsed.cursor();
        self.find_matches(&mut cursor, context, None)
    }

    /// Scans the nodes of a document that start inside `range`.
    #[must_use]
    pub fn find_matches_in<'t>(
        &self,
        parsed: &'t ParseResult,
        range: CodeRange,
        context: &Context,
    ) -> Vec<Match<'t>> {
        let mut cursor = parsed.cursor();
        while cursor.start_byte() < range.start() {
            if !cursor.goto_first_child_for_byte(range.start()) {
                break;
            }
        }
        let mut out = Vec::new();
        loop {
            if cursor.start_byte() >= range.end() {
                break;
            }
            if cursor.start_byte() < range.start() {
                // The descent stopped on a node that begins before the
                // range; its later siblings may still lie inside.
                if cursor.goto_next_sibling() {
                    continue;
                }
            } else {
                out.extend(self.find_matches(&mut cursor, context, Some(range.end())));
                while cursor.goto_next_sibling() {}
            }
            if !climb(&mut cursor) {
                break;
            }
        }
        out
    }

    /// Verifies the candidates for the node under `cursor` only: no descent,
    /// no siblings, and no scan of the match's sub-regions.
    #[must_use]
    pub fn match_root<'t>(&self, cursor: &AstCursor<'t>, context: &Context) -> Option<Match<'t>> {
        self.traced(|| {
            let ctx = MatchContext::new(self.registry, &self.config, cursor.source());
            matching::match_node(&ctx, cursor.node(), self.registry.roots(), context, 0)
        })
    }

    fn traced<R>(&self, run: impl FnOnce() -> R) -> R {
        if let Some(dispatch) = &self.dispatch {
            return tracing::dispatcher::with_default(dispatch, run);
        }
        run()
    }
}

/// Moves to the next sibling of the nearest ancestor that has one.
fn climb(cursor: &mut AstCursor<'_>) -> bool {
    loop {
        if !cursor.goto_parent() {
            return false;
        }
        if cursor.goto_next_sibling() {
            return true;
        }
    }
}

#[cfg(test)]
mod tests;
