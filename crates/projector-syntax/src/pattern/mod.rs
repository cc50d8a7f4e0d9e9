//! Compiled patterns.
//!
//! A [`Pattern`] is an immutable pattern tree plus the metadata the
//! registry and matcher need: a process-unique identity, a priority, the
//! context variables that gate it, and, for templates containing
//! aggregations or chains, the sub-patterns those constructs are matched
//! with.

mod node;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use node::{ANY_NODE_TYPE, PatternNode, PatternNodeKind};

use crate::language::SupportedLanguage;

static NEXT_PATTERN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique pattern identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(u64);

impl PatternId {
    fn next() -> Self {
        Self(NEXT_PATTERN_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sub-patterns for the aggregations of a pattern, keyed by aggregation name.
#[derive(Debug, Clone, Default)]
pub struct AggregationDecorator {
    parts: BTreeMap<String, Vec<Arc<Pattern>>>,
    starts: BTreeMap<String, Arc<Pattern>>,
}

impl AggregationDecorator {
    /// Returns the part sub-patterns of every aggregation.
    #[must_use]
    pub const fn parts(&self) -> &BTreeMap<String, Vec<Arc<Pattern>>> {
        &self.parts
    }

    /// Returns the start sub-patterns of aggregations that have one.
    #[must_use]
    pub const fn starts(&self) -> &BTreeMap<String, Arc<Pattern>> {
        &self.starts
    }

    pub(crate) fn insert(
        &mut self,
        name: &str,
        parts: Vec<Arc<Pattern>>,
        start: Option<Arc<Pattern>>,
    ) {
        self.parts.insert(name.to_owned(), parts);
        if let Some(first) = start {
            self.starts.insert(name.to_owned(), first);
        }
    }

    fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.starts.is_empty()
    }
}

/// Sub-patterns for the chains of a pattern, keyed by chain name.
#[derive(Debug, Clone, Default)]
pub struct ChainDecorator {
    starts: BTreeMap<String, Arc<Pattern>>,
    links: BTreeMap<String, Vec<Arc<Pattern>>>,
}

impl ChainDecorator {
    /// Returns the start sub-pattern of every chain.
    #[must_use]
    pub const fn starts(&self) -> &BTreeMap<String, Arc<Pattern>> {
        &self.starts
    }

    /// Returns the link sub-patterns of every chain.
    #[must_use]
    pub const fn links(&self) -> &BTreeMap<String, Vec<Arc<Pattern>>> {
        &self.links
    }

    pub(crate) fn insert(&mut self, name: &str, start: Arc<Pattern>, links: Vec<Arc<Pattern>>) {
        self.starts.insert(name.to_owned(), start);
        self.links.insert(name.to_owned(), links);
    }

    fn is_empty(&self) -> bool {
        self.starts.is_empty() && self.links.is_empty()
    }
}

/// A compiled, immutable pattern.
#[derive(Debug)]
pub struct Pattern {
    id: PatternId,
    name: String,
    language: SupportedLanguage,
    root: PatternNode,
    priority: usize,
    required_context: Vec<String>,
    aggregations: Option<AggregationDecorator>,
    chains: Option<ChainDecorator>,
}

impl Pattern {
    pub(crate) fn new(
        name: &str,
        language: SupportedLanguage,
        root: PatternNode,
        required_context: Vec<String>,
        aggregations: AggregationDecorator,
        chains: ChainDecorator,
    ) -> Self {
        let priority = root.leaf_count();
        Self {
            id: PatternId::next(),
            name: name.to_owned(),
            language,
            root,
            priority,
            required_context,
            aggregations: (!aggregations.is_empty()).then_some(aggregations),
            chains: (!chains.is_empty()).then_some(chains),
        }
    }

    /// Returns the pattern identity.
    #[must_use]
    pub const fn id(&self) -> PatternId {
        self.id
    }

    /// Returns the template name the pattern was compiled from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pattern language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the root of the pattern tree.
    #[must_use]
    pub const fn root(&self) -> &PatternNode {
        &self.root
    }

    /// Returns the priority: the number of leaves in the pattern tree. More
    /// specific patterns have more leaves and are tried first.
    #[must_use]
    pub const fn priority(&self) -> usize {
        self.priority
    }

    /// Returns the context variables that must be bound for this pattern to
    /// be tried.
    #[must_use]
    pub fn required_context(&self) -> &[String] {
        &self.required_context
    }

    /// Returns the aggregation sub-patterns, if the pattern has any
    /// aggregation.
    #[must_use]
    pub const fn aggregation_decorator(&self) -> Option<&AggregationDecorator> {
        self.aggregations.as_ref()
    }

    /// Returns the chain sub-patterns, if the pattern has any chain.
    #[must_use]
    pub const fn chain_decorator(&self) -> Option<&ChainDecorator> {
        self.chains.as_ref()
    }

    /// Returns the start sub-pattern of chain `name`.
    #[must_use]
    pub fn chain_start(&self, name: &str) -> Option<&Arc<Self>> {
        self.chains.as_ref().and_then(|chains| chains.starts.get(name))
    }
}
