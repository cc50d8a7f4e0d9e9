//! Pattern registry: priority-ordered candidate lookup by node type.
//!
//! A [`PatternRegistry`] owns one [`PatternMap`] of root patterns plus one
//! map per aggregation and chain slot of every registered pattern. The
//! matcher scans a carved sub-region with the map that belongs to it, so
//! aggregation parts and chain links never see unrelated patterns.
//!
//! Every mutation is applied to a copy of the registry and swapped in only
//! when the whole batch succeeds, so a failed registration leaves the
//! registry as it was.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use projector_core::LanguageConfig;
use tracing::debug;

use crate::error::ProjectorError;
use crate::language::SupportedLanguage;
use crate::pattern::{Pattern, PatternId};

const REGISTRY_TARGET: &str = "projector::registry";

/// Which sub-pattern slot of a parent pattern a map serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubPatternRole {
    /// Patterns for the parts of an aggregation.
    AggregationPart,
    /// Patterns for the distinguished first element of an aggregation.
    AggregationStart,
    /// Patterns for the receiver a chain starts from.
    ChainStart,
    /// Patterns for the links of a chain.
    ChainLink,
}

impl fmt::Display for SubPatternRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AggregationPart => "aggregation part",
            Self::AggregationStart => "aggregation start",
            Self::ChainStart => "chain start",
            Self::ChainLink => "chain link",
        })
    }
}

#[derive(Debug, Clone)]
struct Entry {
    sequence: usize,
    pattern: Arc<Pattern>,
}

impl Entry {
    fn order_key(&self) -> (Reverse<usize>, usize) {
        (Reverse(self.pattern.priority()), self.sequence)
    }
}

/// Patterns indexed by the node types their roots can match.
///
/// Candidates come back most specific first: descending priority, then
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct PatternMap {
    by_type: HashMap<String, Vec<Entry>>,
    any_root: Vec<Entry>,
    names: HashSet<String>,
    registered: Vec<Arc<Pattern>>,
}

impl PatternMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the candidates for a node of type `node_type`, most specific
    /// first. Patterns that can root at any node type are merged in.
    #[must_use]
    pub fn candidates(&self, node_type: &str) -> Vec<&Arc<Pattern>> {
        let typed = self.by_type.get(node_type).map_or(&[][..], Vec::as_slice);
        if self.any_root.is_empty() {
            return typed.iter().map(|entry| &entry.pattern).collect();
        }
        let mut merged: Vec<&Entry> = typed.iter().chain(self.any_root.iter()).collect();
        merged.sort_by_key(|entry| entry.order_key());
        merged.into_iter().map(|entry| &entry.pattern).collect()
    }

    /// Looks a pattern up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Pattern>> {
        self.registered.iter().find(|pattern| pattern.name() == name)
    }

    /// Returns every pattern in registration order.
    #[must_use]
    pub fn patterns(&self) -> &[Arc<Pattern>] {
        &self.registered
    }

    /// Returns the number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Returns `true` when no pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    fn insert(&mut self, pattern: Arc<Pattern>, config: &LanguageConfig) -> Result<(), ProjectorError> {
        if !self.names.insert(pattern.name().to_owned()) {
            return Err(ProjectorError::DuplicatePattern {
                name: pattern.name().to_owned(),
            });
        }
        let entry = Entry {
            sequence: self.registered.len(),
            pattern: Arc::clone(&pattern),
        };
        let chain_type = config.chains.as_ref().map(|chains| chains.chain_node_type.as_str());
        let Some(types) = pattern
            .root()
            .root_types(&config.blocks.block_node_type, chain_type)
        else {
            insert_sorted(&mut self.any_root, entry);
            self.registered.push(pattern);
            return Ok(());
        };
        for node_type in types {
            insert_sorted(self.by_type.entry(node_type).or_default(), entry.clone());
        }
        self.registered.push(pattern);
        Ok(())
    }
}

fn insert_sorted(entries: &mut Vec<Entry>, entry: Entry) {
    let key = entry.order_key();
    let at = entries.partition_point(|existing| existing.order_key() <= key);
    entries.insert(at, entry);
}

/// Root and sub-pattern maps for one language.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    language: SupportedLanguage,
    config: LanguageConfig,
    roots: PatternMap,
    sub_maps: HashMap<(PatternId, SubPatternRole, String), PatternMap>,
}

impl PatternRegistry {
    /// Creates an empty registry using the language's bundled tables.
    #[must_use]
    pub fn new(language: SupportedLanguage) -> Self {
        Self {
            language,
            config: language.default_config().clone(),
            roots: PatternMap::new(),
            sub_maps: HashMap::new(),
        }
    }

    /// Creates an empty registry using custom structural tables.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::Config`] if `config` does not validate.
    pub fn with_language_config(
        language: SupportedLanguage,
        config: LanguageConfig,
    ) -> Result<Self, ProjectorError> {
        config.validate()?;
        Ok(Self {
            language,
            config,
            roots: PatternMap::new(),
            sub_maps: HashMap::new(),
        })
    }

    /// Returns the registry's language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the structural tables used for indexing and matching.
    #[must_use]
    pub const fn language_config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Returns the root pattern map.
    #[must_use]
    pub const fn roots(&self) -> &PatternMap {
        &self.roots
    }

    /// Returns the map serving slot `name` of the pattern `parent`.
    #[must_use]
    pub fn sub_patterns(&self, parent: PatternId, role: SubPatternRole, name: &str) -> Option<&PatternMap> {
        self.sub_maps.get(&(parent, role, name.to_owned()))
    }

    /// Registers a root pattern together with all its sub-patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::DuplicatePattern`] if the name is taken,
    /// or [`ProjectorError::LanguageMismatch`] if the pattern was compiled
    /// for another language. The registry is unchanged on error.
    pub fn register(&mut self, pattern: Arc<Pattern>) -> Result<(), ProjectorError> {
        self.register_all([pattern])
    }

    /// Registers several root patterns as one batch: either all of them are
    /// registered or none is.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::register`] for the first offending pattern.
    pub fn register_all(
        &mut self,
        patterns: impl IntoIterator<Item = Arc<Pattern>>,
    ) -> Result<(), ProjectorError> {
        self.transaction(|staged| {
            for pattern in patterns {
                staged.check_language(&pattern)?;
                staged.roots.insert(Arc::clone(&pattern), &staged.config)?;
                staged.attach_sub_patterns(&pattern)?;
                debug!(
                    target: REGISTRY_TARGET,
                    pattern = pattern.name(),
                    priority = pattern.priority(),
                    "registered pattern"
                );
            }
            Ok(())
        })
    }

    /// Adds part patterns to aggregation `aggregation` of the registered
    /// pattern `parent`, as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::UnknownPattern`] if `parent` is not
    /// registered here, [`ProjectorError::UnknownSubPattern`] if it has no
    /// such aggregation, or fails like [`Self::register`] for a part.
    pub fn register_aggregation_parts(
        &mut self,
        parent: &Pattern,
        aggregation: &str,
        parts: impl IntoIterator<Item = Arc<Pattern>>,
    ) -> Result<(), ProjectorError> {
        self.extend_slot(parent, SubPatternRole::AggregationPart, aggregation, parts)
    }

    /// Adds link patterns to chain `chain` of the registered pattern
    /// `parent`, as one batch.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::register_aggregation_parts`].
    pub fn register_chain_links(
        &mut self,
        parent: &Pattern,
        chain: &str,
        links: impl IntoIterator<Item = Arc<Pattern>>,
    ) -> Result<(), ProjectorError> {
        self.extend_slot(parent, SubPatternRole::ChainLink, chain, links)
    }

    /// Returns the number of root patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` when no root pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn extend_slot(
        &mut self,
        parent: &Pattern,
        role: SubPatternRole,
        name: &str,
        patterns: impl IntoIterator<Item = Arc<Pattern>>,
    ) -> Result<(), ProjectorError> {
        if !self.is_known(parent.id()) {
            return Err(ProjectorError::UnknownPattern {
                name: parent.name().to_owned(),
            });
        }
        let key = (parent.id(), role, name.to_owned());
        if !self.sub_maps.contains_key(&key) {
            return Err(ProjectorError::unknown_sub_pattern(parent.name(), name));
        }
        self.transaction(|staged| {
            for pattern in patterns {
                staged.check_language(&pattern)?;
                staged.insert_sub(key.clone(), Arc::clone(&pattern))?;
                debug!(
                    target: REGISTRY_TARGET,
                    parent = parent.name(),
                    slot = name,
                    role = %role,
                    pattern = pattern.name(),
                    "registered sub-pattern"
                );
            }
            Ok(())
        })
    }

    fn transaction(
        &mut self,
        apply: impl FnOnce(&mut Self) -> Result<(), ProjectorError>,
    ) -> Result<(), ProjectorError> {
        let mut staged = self.clone();
        apply(&mut staged)?;
        *self = staged;
        Ok(())
    }

    fn is_known(&self, id: PatternId) -> bool {
        self.roots.patterns().iter().any(|pattern| pattern.id() == id)
            || self.sub_maps.values().any(|map| {
                map.patterns().iter().any(|pattern| pattern.id() == id)
            })
    }

    fn check_language(&self, pattern: &Pattern) -> Result<(), ProjectorError> {
        if pattern.language() == self.language {
            Ok(())
        } else {
            Err(ProjectorError::LanguageMismatch {
                template: pattern.name().to_owned(),
                expected: self.language,
                found: pattern.language(),
            })
        }
    }

    fn insert_sub(
        &mut self,
        key: (PatternId, SubPatternRole, String),
        pattern: Arc<Pattern>,
    ) -> Result<(), ProjectorError> {
        self.attach_sub_patterns(&pattern)?;
        self.sub_maps
            .entry(key)
            .or_default()
            .insert(pattern, &self.config)
    }

    /// Creates the slot maps of `pattern` and fills them with the
    /// sub-patterns compiled alongside it, recursively.
    fn attach_sub_patterns(&mut self, pattern: &Pattern) -> Result<(), ProjectorError> {
        let id = pattern.id();
        if let Some(aggregations) = pattern.aggregation_decorator() {
            for (name, parts) in aggregations.parts() {
                let key = (id, SubPatternRole::AggregationPart, name.clone());
                self.sub_maps.entry(key.clone()).or_default();
                for part in parts {
                    self.insert_sub(key.clone(), Arc::clone(part))?;
                }
            }
            for (name, start) in aggregations.starts() {
                self.insert_sub(
                    (id, SubPatternRole::AggregationStart, name.clone()),
                    Arc::clone(start),
                )?;
            }
        }
        if let Some(chains) = pattern.chain_decorator() {
            for (name, start) in chains.starts() {
                self.insert_sub((id, SubPatternRole::ChainStart, name.clone()), Arc::clone(start))?;
            }
            for (name, links) in chains.links() {
                let key = (id, SubPatternRole::ChainLink, name.clone());
                self.sub_maps.entry(key.clone()).or_default();
                for link in links {
                    self.insert_sub(key.clone(), Arc::clone(link))?;
                }
            }
        }
        Ok(())
    }
}
