//! Human-readable dumps of pattern trees and matches.
//!
//! Both renderings are stable and meant for debugging output and snapshot
//! tests.

use std::fmt;

use crate::matcher::Match;
use crate::pattern::{PatternNode, PatternNodeKind};

const INDENT: &str = "  ";

/// Renders a pattern tree as an indented outline.
#[must_use]
pub fn pattern_to_string(root: &PatternNode) -> String {
    PatternOutline(root).to_string()
}

/// Renders a match's bindings and carved regions.
#[must_use]
pub fn match_to_string(found: &Match<'_>) -> String {
    MatchOutline(found).to_string()
}

struct PatternOutline<'a>(&'a PatternNode);

impl fmt::Display for PatternOutline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.0, 0)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &PatternNode, level: usize) -> fmt::Result {
    write!(f, "{}", INDENT.repeat(level))?;
    if let Some(field) = node.field_name() {
        write!(f, "{field}: ")?;
    }
    match node.kind() {
        PatternNodeKind::Regular {
            node_type,
            text,
            tokens,
            children,
        } => {
            write!(f, "{node_type}")?;
            if let Some(literal) = text {
                write!(f, " {literal:?}")?;
            }
            if !tokens.is_empty() {
                write!(f, " {tokens:?}")?;
            }
            if children.is_empty() {
                return writeln!(f);
            }
            writeln!(f, " {{")?;
            for child in children {
                write_node(f, child, level + 1)?;
            }
            writeln!(f, "{}}}", INDENT.repeat(level))
        }
        PatternNodeKind::Argument {
            name,
            allowed_types,
        } => writeln!(f, "<argument {name}: {}>", allowed_types.join(" | ")),
        PatternNodeKind::ContextVariable { name, node_type } => {
            writeln!(f, "<context {name}: {node_type}>")
        }
        PatternNodeKind::Block { declared } => {
            write!(f, "<block")?;
            for (name, value) in declared {
                write!(f, " {name}={value}")?;
            }
            writeln!(f, ">")
        }
        PatternNodeKind::Aggregation {
            name,
            node_type,
            has_start,
        } => {
            let start = if *has_start { " with start" } else { "" };
            writeln!(f, "<aggregation {name}: {node_type}{start}>")
        }
        PatternNodeKind::Chain {
            name,
            minimum_length,
        } => writeln!(f, "<chain {name}: at least {minimum_length}>"),
        PatternNodeKind::ChainContinuation => writeln!(f, "<continuation>"),
    }
}

struct MatchOutline<'a, 't>(&'a Match<'t>);

impl fmt::Display for MatchOutline<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = self.0;
        writeln!(
            f,
            "{} @ {} {:?}",
            found.pattern().name(),
            found.range(),
            found.text()
        )?;
        for (name, node) in found.args() {
            writeln!(
                f,
                "{INDENT}arg {name} = {} {:?}",
                node.kind(),
                found.arg_text(name).unwrap_or_default()
            )?;
        }
        for block in found.blocks() {
            write!(f, "{INDENT}block {}", block.range())?;
            for (name, value) in block.declared() {
                write!(f, " {name}={value}")?;
            }
            writeln!(f)?;
        }
        for (name, aggregation) in found.aggregations() {
            writeln!(f, "{INDENT}aggregation {name}")?;
            if let Some(start) = aggregation.start() {
                let range = start.range();
                writeln!(f, "{INDENT}{INDENT}start {range} {:?}", found.text_at(range))?;
            }
            for part in aggregation.parts() {
                let range = part.range();
                writeln!(f, "{INDENT}{INDENT}part {range} {:?}", found.text_at(range))?;
            }
        }
        for (name, chain) in found.chains() {
            writeln!(f, "{INDENT}chain {name}")?;
            let start = chain.start().range();
            writeln!(f, "{INDENT}{INDENT}start {start} {:?}", found.text_at(start))?;
            for link in chain.links() {
                let range = link.range();
                writeln!(f, "{INDENT}{INDENT}link {range} {:?}", found.text_at(range))?;
            }
        }
        Ok(())
    }
}
