//! Error types for template compilation, registration, and matching setup.
//!
//! Matching itself never fails: a candidate that does not verify is simply
//! not a match. Everything here is raised while turning templates into
//! patterns or while loading patterns into a registry.

use projector_core::ConfigError;
use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from building or registering patterns.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectorError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInit {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter produced no tree at all.
    #[error("failed to parse {language}: {message}")]
    Parse {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// A template's code string does not parse cleanly.
    #[error("template '{template}' does not parse at {line}:{column}: {message}")]
    TemplateSyntax {
        /// Name of the template.
        template: String,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the first error.
        message: String,
    },

    /// A template was assembled from inconsistent pieces.
    #[error("invalid template '{template}': {message}")]
    InvalidTemplate {
        /// Name of the template.
        template: String,
        /// Description of the problem.
        message: String,
    },

    /// A template was compiled with a builder for another language.
    #[error("template '{template}' targets {found}, builder targets {expected}")]
    LanguageMismatch {
        /// Name of the template.
        template: String,
        /// Language of the builder or registry.
        expected: SupportedLanguage,
        /// Language of the template.
        found: SupportedLanguage,
    },

    /// An aggregation names a node type the language cannot aggregate.
    #[error("{language} has no aggregatable node type '{node_type}'")]
    UnsupportedAggregation {
        /// The template language.
        language: SupportedLanguage,
        /// The requested node type.
        node_type: String,
    },

    /// A chain was used where the language has no usable chain table.
    #[error("chains are not usable for {language}: {message}")]
    UnsupportedChain {
        /// The template language.
        language: SupportedLanguage,
        /// Description of the problem.
        message: String,
    },

    /// A chain parameter was declared with unusable bounds.
    #[error("chain '{name}' is malformed: {message}")]
    MalformedChain {
        /// Name of the chain parameter.
        name: String,
        /// Description of the problem.
        message: String,
    },

    /// A code-string substitution target does not occur.
    #[error("placeholder '{placeholder}' does not occur in the code string")]
    PlaceholderNotFound {
        /// The missing placeholder text.
        placeholder: String,
    },

    /// A code-string substitution target occurs more than once.
    #[error("placeholder '{placeholder}' occurs {count} times in the code string")]
    PlaceholderAmbiguous {
        /// The repeated placeholder text.
        placeholder: String,
        /// Number of occurrences.
        count: usize,
    },

    /// A parameter did not end up in the compiled pattern tree.
    #[error("template '{template}' lost parameter '{parameter}' while parsing")]
    PatternPathNotFound {
        /// Name of the template.
        template: String,
        /// Description of the parameter.
        parameter: String,
    },

    /// A pattern with the same name is already registered in the same map.
    #[error("a pattern named '{name}' is already registered")]
    DuplicatePattern {
        /// The duplicated name.
        name: String,
    },

    /// A referenced parent pattern is not registered.
    #[error("pattern '{name}' is not registered")]
    UnknownPattern {
        /// Name of the missing pattern.
        name: String,
    },

    /// A parent pattern has no aggregation or chain with the given name.
    #[error("pattern '{pattern}' has no sub-pattern slot '{name}'")]
    UnknownSubPattern {
        /// Name of the parent pattern.
        pattern: String,
        /// Name of the missing aggregation or chain.
        name: String,
    },

    /// A configuration table was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProjectorError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInit {
            language,
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::Parse {
            language,
            message: message.into(),
        }
    }

    /// Creates an invalid template error.
    #[must_use]
    pub fn invalid_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported chain error.
    #[must_use]
    pub fn unsupported_chain(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::UnsupportedChain {
            language,
            message: message.into(),
        }
    }

    /// Creates a malformed chain error.
    #[must_use]
    pub fn malformed_chain(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedChain {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a lost-parameter error.
    #[must_use]
    pub fn pattern_path_not_found(
        template: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        Self::PatternPathNotFound {
            template: template.into(),
            parameter: parameter.into(),
        }
    }

    /// Creates an unknown sub-pattern error.
    #[must_use]
    pub fn unknown_sub_pattern(pattern: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownSubPattern {
            pattern: pattern.into(),
            name: name.into(),
        }
    }
}
