//! Method-chain walking.
//!
//! A chain is read from its outermost call inwards along the language's
//! next-link path. Every call on that spine is a link. The first node that
//! is not a call must verify against one of the chain's start patterns,
//! tried in priority order, or the chain does not match.

use projector_core::{ChainsConfig, CodeRange, Context};
use tracing::trace;
use tree_sitter::Node;

use super::MATCHER_TARGET;
use super::capture::SubRange;
use super::context::MatchContext;
use super::verify::{Mismatch, verify};
use crate::cursor::AstCursor;
use crate::pattern::Pattern;
use crate::registry::SubPatternRole;

/// Walks the chain rooted at the cursor, returning the start region and the
/// link regions in document order. The cursor is left where it started.
pub(super) fn walk<'t>(
    ctx: &MatchContext<'_, 't>,
    owner: &Pattern,
    context: &Context,
    name: &str,
    minimum_length: usize,
    cursor: &mut AstCursor<'t>,
) -> Result<(SubRange<'t>, Vec<SubRange<'t>>), Mismatch> {
    if !cursor.has_children() {
        return Err(Mismatch("chain needs children"));
    }
    let Some(chains) = ctx.language().chains.as_ref() else {
        return Err(Mismatch("language has no chain table"));
    };
    let entry = cursor.snapshot();
    let (spine, begins) = read_spine(cursor, chains);
    cursor.restore(&entry);
    trace!(
        target: MATCHER_TARGET,
        chain = name,
        spine = spine.len(),
        "walked chain spine"
    );

    let Some(&last) = spine.last() else {
        return Err(Mismatch("chain needs children"));
    };
    if last.kind() == chains.chain_node_type {
        return Err(Mismatch("chain path ends before its start"));
    }
    let depth = begins.len();
    if depth < minimum_length {
        return Err(Mismatch("chain shorter than minimum"));
    }
    let starts = ctx
        .registry
        .sub_patterns(owner.id(), SubPatternRole::ChainStart, name)
        .ok_or(Mismatch("chain start not registered"))?;
    let claimed = starts
        .candidates(last.kind())
        .into_iter()
        .filter(|start| context.contains_all(start.required_context()))
        .any(|start| verify(ctx, start, last, context).is_some());
    if !claimed {
        return Err(Mismatch("chain start does not match"));
    }

    let start = SubRange::of(last);
    let mut links: Vec<SubRange<'t>> = spine
        .iter()
        .zip(begins.iter())
        .map(|(node, begin)| SubRange::new(CodeRange::new(*begin, node.end_byte()), *node))
        .collect();
    links.reverse();
    Ok((start, links))
}

/// Follows the next-link path from the cursor for as long as the node is a
/// call with a member-access shape. Returns every node visited and, for each
/// node that was left through its next-link path, the byte where its link
/// text begins.
fn read_spine<'t>(cursor: &mut AstCursor<'t>, chains: &ChainsConfig) -> (Vec<Node<'t>>, Vec<usize>) {
    let mut spine = Vec::new();
    let mut begins = Vec::new();
    loop {
        let node = cursor.node();
        spine.push(node);
        if node.kind() != chains.chain_node_type {
            break;
        }
        let at = cursor.snapshot();
        if !cursor.follow(&chains.path_to_link_begin) {
            break;
        }
        let begin = cursor.start_byte();
        cursor.restore(&at);
        if !cursor.follow(&chains.path_to_next_link) {
            break;
        }
        begins.push(begin);
    }
    (spine, begins)
}
