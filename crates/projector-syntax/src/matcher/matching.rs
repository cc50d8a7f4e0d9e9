//! Scanning algorithms for the [`Matcher`](super::Matcher) implementation.
//!
//! A scan walks a run of siblings. At each node the candidates registered
//! for its type are verified in priority order and the first success claims
//! the node; otherwise the scan descends into the node's children. After a
//! match, every region carved out of it is scanned again with the pattern
//! map that belongs to the region.

use std::collections::BTreeMap;
use std::sync::Arc;

use projector_core::{CodeRange, Context};
use tracing::{debug, warn};
use tree_sitter::Node;

use super::context::MatchContext;
use super::verify::verify;
use super::{MATCHER_TARGET, Match};
use crate::cursor::AstCursor;
use crate::pattern::Pattern;
use crate::registry::{PatternMap, SubPatternRole};

/// A region carved out of a match, awaiting its own scan.
struct Region<'t> {
    range: CodeRange,
    node: Node<'t>,
    kind: RegionKind,
}

enum RegionKind {
    Block(BTreeMap<String, String>),
    Slot(SubPatternRole, String),
}

/// Scans the node under the cursor and its following siblings, stopping at
/// the first node that starts at or after `upto`.
pub(super) fn scan_siblings<'t>(
    ctx: &MatchContext<'_, 't>,
    cursor: &mut AstCursor<'t>,
    map: &PatternMap,
    context: &Context,
    upto: Option<usize>,
    depth: usize,
    out: &mut Vec<Match<'t>>,
) {
    loop {
        if upto.is_some_and(|limit| cursor.start_byte() >= limit) {
            break;
        }
        match match_node(ctx, cursor.node(), map, context, depth) {
            Some(found) => emit(ctx, found, map, context, out),
            None if cursor.goto_first_child() => {
                scan_siblings(ctx, cursor, map, context, upto, depth, out);
                cursor.goto_parent();
            }
            None => {}
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

/// Verifies the candidates for `node` in priority order and returns the
/// first match.
pub(super) fn match_node<'t>(
    ctx: &MatchContext<'_, 't>,
    node: Node<'t>,
    map: &PatternMap,
    context: &Context,
    depth: usize,
) -> Option<Match<'t>> {
    if !node.is_named() || node.is_error() {
        return None;
    }
    map.candidates(node.kind()).into_iter().find_map(|pattern| {
        if !context.contains_all(pattern.required_context()) {
            debug!(
                target: MATCHER_TARGET,
                pattern = pattern.name(),
                "required context not bound"
            );
            return None;
        }
        verify(ctx, pattern, node, context)
            .map(|captures| Match::new(Arc::clone(pattern), node, ctx.source, depth, captures))
    })
}

/// Records `found` and scans the regions carved out of it.
fn emit<'t>(
    ctx: &MatchContext<'_, 't>,
    found: Match<'t>,
    map: &PatternMap,
    context: &Context,
    out: &mut Vec<Match<'t>>,
) {
    let pattern = Arc::clone(found.pattern());
    let depth = found.depth();
    let regions = regions_of(&found);
    out.push(found);
    if regions.is_empty() {
        return;
    }
    if depth >= ctx.config.max_nesting_depth() {
        warn!(
            target: MATCHER_TARGET,
            pattern = pattern.name(),
            depth,
            "nesting limit reached; sub-regions left unmatched"
        );
        return;
    }
    for region in regions {
        scan_region(ctx, &pattern, region, map, context, depth + 1, out);
    }
}

fn scan_region<'t>(
    ctx: &MatchContext<'_, 't>,
    owner: &Pattern,
    region: Region<'t>,
    outer: &PatternMap,
    context: &Context,
    depth: usize,
    out: &mut Vec<Match<'t>>,
) {
    match region.kind {
        RegionKind::Block(declared) => {
            let inner = context.extend(
                declared
                    .iter()
                    .map(|(name, value)| (name.as_str(), Some(value.as_str()))),
            );
            let mut cursor = AstCursor::new(region.node, ctx.source);
            if cursor.goto_first_child() {
                scan_siblings(
                    ctx,
                    &mut cursor,
                    outer,
                    &inner,
                    Some(region.range.end()),
                    depth,
                    out,
                );
            }
        }
        RegionKind::Slot(role, name) => {
            let Some(map) = ctx.registry.sub_patterns(owner.id(), role, &name) else {
                return;
            };
            if role == SubPatternRole::ChainLink {
                // Links are matched at their call only; the call's receiver
                // is the rest of the chain and is scanned as its own region.
                if let Some(mut found) = match_node(ctx, region.node, map, context, depth) {
                    found.set_range(region.range);
                    emit(ctx, found, map, context, out);
                }
            } else {
                let mut cursor = AstCursor::new(region.node, ctx.source);
                scan_siblings(ctx, &mut cursor, map, context, None, depth, out);
            }
        }
    }
}

/// Lists the regions of `found` in document order.
fn regions_of<'t>(found: &Match<'t>) -> Vec<Region<'t>> {
    let mut regions: Vec<Region<'t>> = found
        .blocks()
        .iter()
        .map(|block| Region {
            range: block.range(),
            node: block.node(),
            kind: RegionKind::Block(block.declared().clone()),
        })
        .collect();
    for (name, aggregation) in found.aggregations() {
        if let Some(start) = aggregation.start() {
            regions.push(Region {
                range: start.range(),
                node: start.node(),
                kind: RegionKind::Slot(SubPatternRole::AggregationStart, name.clone()),
            });
        }
        regions.extend(aggregation.parts().iter().map(|part| Region {
            range: part.range(),
            node: part.node(),
            kind: RegionKind::Slot(SubPatternRole::AggregationPart, name.clone()),
        }));
    }
    for (name, chain) in found.chains() {
        regions.push(Region {
            range: chain.start().range(),
            node: chain.start().node(),
            kind: RegionKind::Slot(SubPatternRole::ChainStart, name.clone()),
        });
        regions.extend(chain.links().iter().map(|link| Region {
            range: link.range(),
            node: link.node(),
            kind: RegionKind::Slot(SubPatternRole::ChainLink, name.clone()),
        }));
    }
    regions.sort_by_key(|region| region.range.start());
    regions
}
