//! Per-language structural tables.
//!
//! The builder and matcher never hard-code grammar node names. Everything
//! that differs between grammars (which nodes hold comma separated parts,
//! how a method chain nests, what a block looks like) is read from a
//! [`LanguageConfig`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tree_path::TreePath;

/// Delimiter tokens of a node type whose children form a variable-length
/// list, such as a call's argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatableNodeType {
    /// Token opening the list, e.g. `(`.
    pub start_token: String,
    /// Token separating two parts, e.g. `,`.
    pub delimiter_token: String,
    /// Token closing the list, e.g. `)`.
    pub end_token: String,
}

impl AggregatableNodeType {
    /// Creates a token table.
    #[must_use]
    pub fn new(start: &str, delimiter: &str, end: &str) -> Self {
        Self {
            start_token: start.to_owned(),
            delimiter_token: delimiter.to_owned(),
            end_token: end.to_owned(),
        }
    }

    /// Returns `true` when `text` is one of the three structural tokens.
    #[must_use]
    pub fn is_structural_token(&self, text: &str) -> bool {
        text == self.start_token || text == self.delimiter_token || text == self.end_token
    }
}

/// Aggregatable node types keyed by grammar node type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationsConfig {
    /// Token tables per node type.
    pub aggregatable_node_types: BTreeMap<String, AggregatableNodeType>,
}

impl AggregationsConfig {
    /// Returns the token table for `node_type`, if it is aggregatable.
    #[must_use]
    pub fn get(&self, node_type: &str) -> Option<&AggregatableNodeType> {
        self.aggregatable_node_types.get(node_type)
    }
}

/// Shape of a method-call chain in the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsConfig {
    /// Node type of one chain link, e.g. `call`.
    pub chain_node_type: String,
    /// Path from a link node to the token where the link's own text
    /// begins (the member-access dot).
    pub path_to_link_begin: TreePath,
    /// Path from a link node to the receiver expression, which is either
    /// the next link or the chain start.
    pub path_to_next_link: TreePath,
}

/// How a grammar opens a statement block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockDelimiter {
    /// The block follows a `:` token and is delimited by indentation.
    Colon,
    /// The block node itself is wrapped in `{` and `}`.
    Brace,
}

/// Block node description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksConfig {
    /// Node type of a statement block.
    pub block_node_type: String,
    /// How the block is delimited.
    pub delimiter: BlockDelimiter,
}

/// Structural tables for one grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Node types holding variable-length part lists.
    #[serde(default)]
    pub aggregations: AggregationsConfig,
    /// Method-chain shape, if the grammar supports chains.
    #[serde(default)]
    pub chains: Option<ChainsConfig>,
    /// Block shape.
    pub blocks: BlocksConfig,
    /// Node type of a plain identifier.
    #[serde(default = "default_identifier_type")]
    pub identifier_node_type: String,
    /// Node type wrapping an expression used as a statement.
    #[serde(default = "default_expression_statement_type")]
    pub expression_statement_node_type: String,
    /// Node type of a parenthesised expression.
    #[serde(default = "default_parenthesized_type")]
    pub parenthesized_node_type: String,
    /// Node types the grammar uses for comments.
    #[serde(default = "default_comment_types")]
    pub comment_node_types: Vec<String>,
    /// Text appended to expression templates so they parse as statements.
    #[serde(default)]
    pub expression_suffix: Option<String>,
}

fn default_identifier_type() -> String {
    "identifier".to_owned()
}

fn default_expression_statement_type() -> String {
    "expression_statement".to_owned()
}

fn default_parenthesized_type() -> String {
    "parenthesized_expression".to_owned()
}

fn default_comment_types() -> Vec<String> {
    vec!["comment".to_owned()]
}

impl LanguageConfig {
    /// Tables for the Python grammar.
    #[must_use]
    pub fn python() -> Self {
        Self {
            aggregations: aggregations([("argument_list", AggregatableNodeType::new("(", ",", ")"))]),
            chains: Some(ChainsConfig {
                chain_node_type: "call".to_owned(),
                path_to_link_begin: TreePath::from(vec![0, 1]),
                path_to_next_link: TreePath::from(vec![0, 0]),
            }),
            blocks: BlocksConfig {
                block_node_type: "block".to_owned(),
                delimiter: BlockDelimiter::Colon,
            },
            identifier_node_type: default_identifier_type(),
            expression_statement_node_type: default_expression_statement_type(),
            parenthesized_node_type: default_parenthesized_type(),
            comment_node_types: default_comment_types(),
            expression_suffix: None,
        }
    }

    /// Tables for the TypeScript (TSX) grammar.
    #[must_use]
    pub fn typescript() -> Self {
        Self {
            aggregations: aggregations([("arguments", AggregatableNodeType::new("(", ",", ")"))]),
            chains: Some(ChainsConfig {
                chain_node_type: "call_expression".to_owned(),
                path_to_link_begin: TreePath::from(vec![0, 1]),
                path_to_next_link: TreePath::from(vec![0, 0]),
            }),
            blocks: BlocksConfig {
                block_node_type: "statement_block".to_owned(),
                delimiter: BlockDelimiter::Brace,
            },
            identifier_node_type: default_identifier_type(),
            expression_statement_node_type: default_expression_statement_type(),
            parenthesized_node_type: default_parenthesized_type(),
            comment_node_types: default_comment_types(),
            expression_suffix: None,
        }
    }

    /// Tables for the Rust grammar.
    #[must_use]
    pub fn rust() -> Self {
        Self {
            aggregations: aggregations([("arguments", AggregatableNodeType::new("(", ",", ")"))]),
            chains: Some(ChainsConfig {
                chain_node_type: "call_expression".to_owned(),
                path_to_link_begin: TreePath::from(vec![0, 1]),
                path_to_next_link: TreePath::from(vec![0, 0]),
            }),
            blocks: BlocksConfig {
                block_node_type: "block".to_owned(),
                delimiter: BlockDelimiter::Brace,
            },
            identifier_node_type: default_identifier_type(),
            expression_statement_node_type: default_expression_statement_type(),
            parenthesized_node_type: default_parenthesized_type(),
            comment_node_types: vec!["line_comment".to_owned(), "block_comment".to_owned()],
            expression_suffix: Some(";".to_owned()),
        }
    }

    /// Returns `true` when `node_type` is one of the grammar's comment nodes.
    #[must_use]
    pub fn is_comment(&self, node_type: &str) -> bool {
        self.comment_node_types.iter().any(|kind| kind == node_type)
    }

    /// Checks that the tables can drive the builder and matcher.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first unusable entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks.block_node_type.is_empty() {
            return Err(ConfigError::EmptyNodeType {
                field: "blocks.block_node_type",
            });
        }
        if self.identifier_node_type.is_empty() {
            return Err(ConfigError::EmptyNodeType {
                field: "identifier_node_type",
            });
        }
        for (node_type, tokens) in &self.aggregations.aggregatable_node_types {
            if tokens.start_token.is_empty() {
                return Err(ConfigError::MissingAggregationToken {
                    node_type: node_type.clone(),
                    token: "start",
                });
            }
            if tokens.end_token.is_empty() {
                return Err(ConfigError::MissingAggregationToken {
                    node_type: node_type.clone(),
                    token: "end",
                });
            }
        }
        if let Some(chains) = &self.chains {
            if chains.chain_node_type.is_empty() {
                return Err(ConfigError::EmptyNodeType {
                    field: "chains.chain_node_type",
                });
            }
            if chains.path_to_next_link.is_empty() {
                return Err(ConfigError::invalid_chain(
                    &chains.chain_node_type,
                    "path_to_next_link must not be empty",
                ));
            }
            if chains.path_to_link_begin.is_empty() {
                return Err(ConfigError::invalid_chain(
                    &chains.chain_node_type,
                    "path_to_link_begin must not be empty",
                ));
            }
        }
        Ok(())
    }
}

fn aggregations<const N: usize>(
    entries: [(&str, AggregatableNodeType); N],
) -> AggregationsConfig {
    AggregationsConfig {
        aggregatable_node_types: entries
            .into_iter()
            .map(|(node_type, tokens)| (node_type.to_owned(), tokens))
            .collect(),
    }
}
