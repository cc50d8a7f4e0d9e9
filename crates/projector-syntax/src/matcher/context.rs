//! Matching context shared across recursive operations.

use projector_core::{LanguageConfig, MatcherConfig};

use crate::registry::PatternRegistry;

pub(super) struct MatchContext<'a, 't> {
    pub(super) registry: &'a PatternRegistry,
    pub(super) config: &'a MatcherConfig,
    pub(super) source: &'t str,
}

impl<'a, 't> MatchContext<'a, 't> {
    pub(super) const fn new(
        registry: &'a PatternRegistry,
        config: &'a MatcherConfig,
        source: &'t str,
    ) -> Self {
        Self {
            registry,
            config,
            source,
        }
    }

    pub(super) const fn language(&self) -> &'a LanguageConfig {
        self.registry.language_config()
    }
}
