//! Typed placeholders that can be embedded in a template.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::OnceCell;
use projector_core::{BlockDelimiter, LanguageConfig};

use crate::error::ProjectorError;
use crate::language::SupportedLanguage;
use crate::template::Template;

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(1);

const MARKER_PREFIX: &str = "__pj_";
const MARKER_SUFFIX: &str = "__";

/// What a placeholder stands for.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParameterKind {
    /// Binds any single node whose type is listed (or any node for `*`).
    Argument {
        /// Binding name.
        name: String,
        /// Accepted node types.
        allowed_types: Vec<String>,
    },
    /// Must match the identifier bound to `name` in the current context.
    ContextVariable {
        /// Context-variable name.
        name: String,
    },
    /// Marks a statement block whose inner range stays editable.
    Block {
        /// Context bindings added inside the block, variable name to
        /// identifier text.
        declared: BTreeMap<String, String>,
    },
    /// A variable-length, delimiter separated list of parts.
    Aggregation {
        /// Aggregation name.
        name: String,
        /// Grammar node type of the list container.
        node_type: String,
        /// Templates a part may take.
        parts: Vec<Arc<Template>>,
        /// Template for a distinguished first element.
        start: Option<Arc<Template>>,
    },
    /// A method-call chain of at least `minimum_length` links.
    Chain {
        /// Chain name.
        name: String,
        /// Template for the receiver the chain starts from.
        start: Arc<Template>,
        /// Templates a link may take.
        links: Vec<Arc<Template>>,
        /// Least number of links that counts as a chain.
        minimum_length: usize,
    },
}

#[derive(Debug)]
struct Inner {
    id: OnceCell<u64>,
    kind: ParameterKind,
}

/// A shared, cheaply clonable placeholder.
///
/// Each parameter receives a process-unique identifier the first time its
/// code string is requested; the identifier never changes afterwards, so
/// the same template always produces byte-identical code strings.
#[derive(Clone)]
pub struct Parameter(Arc<Inner>);

impl Parameter {
    fn from_kind(kind: ParameterKind) -> Self {
        Self(Arc::new(Inner {
            id: OnceCell::new(),
            kind,
        }))
    }

    /// Returns what the placeholder stands for.
    #[must_use]
    pub fn kind(&self) -> &ParameterKind {
        &self.0.kind
    }

    /// Returns the parameter's identifier, assigning one on first use.
    #[must_use]
    pub fn id(&self) -> u64 {
        *self
            .0
            .id
            .get_or_init(|| NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the binding, aggregation, chain, or variable name. Blocks
    /// have none.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.kind() {
            ParameterKind::Argument { name, .. }
            | ParameterKind::ContextVariable { name }
            | ParameterKind::Aggregation { name, .. }
            | ParameterKind::Chain { name, .. } => Some(name),
            ParameterKind::Block { .. } => None,
        }
    }

    /// Returns `true` when both handles refer to the same parameter.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the identifier-shaped text that stands in for the parameter
    /// inside its code-string marker.
    #[must_use]
    pub fn placeholder(&self) -> String {
        match self.kind() {
            ParameterKind::Argument { .. } => self.tagged("arg"),
            ParameterKind::ContextVariable { name } => name.clone(),
            ParameterKind::Block { .. } => self.tagged("block"),
            ParameterKind::Aggregation { .. } => self.tagged("agg"),
            ParameterKind::Chain { .. } => self.tagged("chain"),
        }
    }

    /// Returns the full text written into a code string for this
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::UnsupportedAggregation`] when an
    /// aggregation names a node type the language cannot aggregate.
    pub fn marker(
        &self,
        language: SupportedLanguage,
        config: &LanguageConfig,
    ) -> Result<String, ProjectorError> {
        let placeholder = self.placeholder();
        match self.kind() {
            ParameterKind::Block { .. } => Ok(match config.blocks.delimiter {
                BlockDelimiter::Colon => placeholder,
                BlockDelimiter::Brace => format!("{{ {placeholder} }}"),
            }),
            ParameterKind::Aggregation { node_type, .. } => {
                let tokens = config.aggregations.get(node_type).ok_or_else(|| {
                    ProjectorError::UnsupportedAggregation {
                        language,
                        node_type: node_type.clone(),
                    }
                })?;
                Ok(format!(
                    "{}{placeholder}{}",
                    tokens.start_token, tokens.end_token
                ))
            }
            ParameterKind::Argument { .. }
            | ParameterKind::ContextVariable { .. }
            | ParameterKind::Chain { .. } => Ok(placeholder),
        }
    }

    /// Returns the text shown for this parameter in a draft rendering.
    #[must_use]
    pub fn draft_text(&self, config: &LanguageConfig) -> String {
        match self.kind() {
            ParameterKind::Argument { name, .. } | ParameterKind::ContextVariable { name } => {
                name.clone()
            }
            ParameterKind::Block { .. } => match config.blocks.delimiter {
                BlockDelimiter::Colon => "pass".to_owned(),
                BlockDelimiter::Brace => "{}".to_owned(),
            },
            ParameterKind::Aggregation {
                node_type, parts, ..
            } => {
                let inner = parts
                    .first()
                    .map(|part| part.to_draft_string(config))
                    .unwrap_or_default();
                let Some(tokens) = config.aggregations.get(node_type) else {
                    return inner;
                };
                format!("{}{inner}{}", tokens.start_token, tokens.end_token)
            }
            ParameterKind::Chain { start, .. } => start.to_draft_string(config),
        }
    }

    fn tagged(&self, tag: &str) -> String {
        format!("{MARKER_PREFIX}{tag}_{}{MARKER_SUFFIX}", self.id())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parameter").field(&self.0.kind).finish()
    }
}

/// Declares an argument accepting any of `allowed_types`.
///
/// Use `"*"` to accept a node of any type.
#[must_use]
pub fn define_argument<S: Into<String>>(
    name: impl Into<String>,
    allowed_types: impl IntoIterator<Item = S>,
) -> Parameter {
    Parameter::from_kind(ParameterKind::Argument {
        name: name.into(),
        allowed_types: allowed_types.into_iter().map(Into::into).collect(),
    })
}

/// Declares a reference to a context variable.
#[must_use]
pub fn define_context_variable(name: impl Into<String>) -> Parameter {
    Parameter::from_kind(ParameterKind::ContextVariable { name: name.into() })
}

/// Declares a block adding `declared` bindings to the context of its body.
#[must_use]
pub fn define_block<K: Into<String>, V: Into<String>>(
    declared: impl IntoIterator<Item = (K, V)>,
) -> Parameter {
    Parameter::from_kind(ParameterKind::Block {
        declared: declared
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect(),
    })
}

/// Declares an aggregation over a `node_type` list.
///
/// Whether `node_type` is aggregatable is checked when the enclosing
/// template is compiled, since that depends on the language.
#[must_use]
pub fn define_aggregation(
    name: impl Into<String>,
    node_type: impl Into<String>,
    parts: Vec<Arc<Template>>,
    start: Option<Arc<Template>>,
) -> Parameter {
    Parameter::from_kind(ParameterKind::Aggregation {
        name: name.into(),
        node_type: node_type.into(),
        parts,
        start,
    })
}

/// Declares a method chain.
///
/// # Errors
///
/// Returns [`ProjectorError::MalformedChain`] when `minimum_length` is below
/// two or `links` is empty.
pub fn define_chain(
    chain_name: impl Into<String>,
    start: Arc<Template>,
    links: Vec<Arc<Template>>,
    minimum_length: usize,
) -> Result<Parameter, ProjectorError> {
    let name = chain_name.into();
    if minimum_length < 2 {
        return Err(ProjectorError::malformed_chain(
            name,
            format!("minimum length {minimum_length} is below 2"),
        ));
    }
    if links.is_empty() {
        return Err(ProjectorError::malformed_chain(name, "no link templates"));
    }
    Ok(Parameter::from_kind(ParameterKind::Chain {
        name,
        start,
        links,
        minimum_length,
    }))
}
