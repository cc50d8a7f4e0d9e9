//! Languages the projector can parse, with their grammars and default
//! structural tables.

use std::fmt;

use once_cell::sync::Lazy;
use projector_core::LanguageConfig;

static PYTHON_CONFIG: Lazy<LanguageConfig> = Lazy::new(LanguageConfig::python);
static TYPESCRIPT_CONFIG: Lazy<LanguageConfig> = Lazy::new(LanguageConfig::typescript);
static RUST_CONFIG: Lazy<LanguageConfig> = Lazy::new(LanguageConfig::rust);

/// Languages with a bundled Tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// Python.
    #[default]
    Python,
    /// TypeScript, parsed with the TSX grammar.
    TypeScript,
    /// Rust.
    Rust,
}

impl SupportedLanguage {
    /// Returns the Tree-sitter grammar.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            // The TSX grammar is a superset and also accepts plain `.ts`.
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Returns the bundled structural tables for this language.
    #[must_use]
    pub fn default_config(self) -> &'static LanguageConfig {
        match self {
            Self::Python => &PYTHON_CONFIG,
            Self::TypeScript => &TYPESCRIPT_CONFIG,
            Self::Rust => &RUST_CONFIG,
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn display_uses_the_lower_case_name() {
        assert_eq!(SupportedLanguage::TypeScript.to_string(), "typescript");
    }

    #[rstest]
    #[case(SupportedLanguage::Python, "block")]
    #[case(SupportedLanguage::TypeScript, "statement_block")]
    #[case(SupportedLanguage::Rust, "block")]
    fn default_config_matches_the_grammar(
        #[case] language: SupportedLanguage,
        #[case] block_type: &str,
    ) {
        let config = language.default_config();
        assert_eq!(config.blocks.block_node_type, block_type);
        assert!(config.validate().is_ok());
    }
}
