//! Capture types for pattern matching.
//!
//! A successful verification binds argument names to syntax nodes and carves
//! sub-ranges out of the matched node: block interiors, aggregation parts,
//! and chain starts and links. Each sub-range is matched again on its own.

use std::collections::BTreeMap;

use projector_core::CodeRange;
use tree_sitter::Node;

/// A carved region of a match together with the node it is matched at.
#[derive(Debug, Clone, Copy)]
pub struct SubRange<'t> {
    range: CodeRange,
    node: Node<'t>,
}

impl<'t> SubRange<'t> {
    pub(super) const fn new(range: CodeRange, node: Node<'t>) -> Self {
        Self { range, node }
    }

    pub(super) fn of(node: Node<'t>) -> Self {
        Self::new(CodeRange::from(node.byte_range()), node)
    }

    /// Returns the byte range.
    #[must_use]
    pub const fn range(&self) -> CodeRange {
        self.range
    }

    /// Returns the node the region is matched at.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.node
    }
}

/// The editable interior of a block, with the bindings it introduces.
#[derive(Debug, Clone)]
pub struct BlockRange<'t> {
    region: SubRange<'t>,
    declared: BTreeMap<String, String>,
}

impl<'t> BlockRange<'t> {
    pub(super) const fn new(region: SubRange<'t>, declared: BTreeMap<String, String>) -> Self {
        Self { region, declared }
    }

    /// Returns the interior byte range.
    #[must_use]
    pub const fn range(&self) -> CodeRange {
        self.region.range
    }

    /// Returns the block node.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.region.node
    }

    /// Returns the context variables bound inside the block.
    #[must_use]
    pub const fn declared(&self) -> &BTreeMap<String, String> {
        &self.declared
    }
}

/// Regions of one aggregation.
#[derive(Debug, Clone, Default)]
pub struct AggregationRanges<'t> {
    start: Option<SubRange<'t>>,
    parts: Vec<SubRange<'t>>,
}

impl<'t> AggregationRanges<'t> {
    /// Returns the distinguished first element, if the aggregation has one.
    #[must_use]
    pub const fn start(&self) -> Option<&SubRange<'t>> {
        self.start.as_ref()
    }

    /// Returns the parts in document order.
    #[must_use]
    pub fn parts(&self) -> &[SubRange<'t>] {
        &self.parts
    }
}

/// Regions of one chain.
#[derive(Debug, Clone)]
pub struct ChainRanges<'t> {
    start: SubRange<'t>,
    links: Vec<SubRange<'t>>,
}

impl<'t> ChainRanges<'t> {
    /// Returns the receiver the chain starts from.
    #[must_use]
    pub const fn start(&self) -> &SubRange<'t> {
        &self.start
    }

    /// Returns the links in document order. Each range starts at the link's
    /// member-access token; the node is the link's call.
    #[must_use]
    pub fn links(&self) -> &[SubRange<'t>] {
        &self.links
    }
}

/// Bindings accumulated while verifying one candidate.
#[derive(Debug, Default)]
pub(super) struct Captures<'t> {
    pub(super) args: BTreeMap<String, Node<'t>>,
    pub(super) blocks: Vec<BlockRange<'t>>,
    pub(super) aggregations: BTreeMap<String, AggregationRanges<'t>>,
    pub(super) chains: BTreeMap<String, ChainRanges<'t>>,
}

impl<'t> Captures<'t> {
    pub(super) fn bind(&mut self, name: &str, node: Node<'t>) {
        self.args.insert(name.to_owned(), node);
    }

    pub(super) fn add_block(&mut self, region: SubRange<'t>, declared: &BTreeMap<String, String>) {
        self.blocks.push(BlockRange::new(region, declared.clone()));
    }

    pub(super) fn add_aggregation(
        &mut self,
        name: &str,
        start: Option<SubRange<'t>>,
        parts: Vec<SubRange<'t>>,
    ) {
        self.aggregations
            .insert(name.to_owned(), AggregationRanges { start, parts });
    }

    pub(super) fn add_chain(&mut self, name: &str, start: SubRange<'t>, links: Vec<SubRange<'t>>) {
        self.chains
            .insert(name.to_owned(), ChainRanges { start, links });
    }
}
