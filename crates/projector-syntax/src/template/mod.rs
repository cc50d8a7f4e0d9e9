//! Templates: literal code fragments interleaved with typed parameters.
//!
//! A template is the authoring form of a pattern. It is written the way the
//! code it should recognise is written, with `${name}` holes for the parts
//! that vary:
//!
//! ```text
//! with ${dsl}.load_sheet(${file}, ${sheet}) as sheet:
//!     ${body}
//! ```
//!
//! Compiling a template (see [`crate::PatternBuilder`]) turns it into a
//! [`CodeString`], parses that, and converts the syntax tree into a pattern
//! tree. The compiled pattern is memoised on the template.

mod code_string;
mod parameter;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use projector_core::LanguageConfig;

pub use code_string::{CodeString, ParameterEntry};
pub use parameter::{
    Parameter, ParameterKind, define_aggregation, define_argument, define_block, define_chain,
    define_context_variable,
};

use crate::error::ProjectorError;
use crate::language::SupportedLanguage;
use crate::pattern::Pattern;

/// Which part of the parsed template becomes the pattern root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// The first top-level statement.
    Statement,
    /// The expression inside the first expression statement.
    Expression,
}

/// Literal fragments interleaved with parameters.
///
/// `fragments` always holds exactly one more element than `parameters`.
pub struct Template {
    name: String,
    language: SupportedLanguage,
    kind: TemplateKind,
    fragments: Vec<String>,
    parameters: Vec<Parameter>,
    required_context: Vec<String>,
    compiled: OnceCell<Arc<Pattern>>,
}

impl Template {
    /// Creates a template from explicit fragments and parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::InvalidTemplate`] unless there is exactly
    /// one more fragment than parameters.
    pub fn new(
        template_name: impl Into<String>,
        language: SupportedLanguage,
        kind: TemplateKind,
        fragments: Vec<String>,
        parameters: Vec<Parameter>,
    ) -> Result<Self, ProjectorError> {
        let name = template_name.into();
        if fragments.len() != parameters.len() + 1 {
            return Err(ProjectorError::invalid_template(
                name,
                format!(
                    "{} fragments cannot surround {} parameters",
                    fragments.len(),
                    parameters.len()
                ),
            ));
        }
        Ok(Self {
            name,
            language,
            kind,
            fragments,
            parameters,
            required_context: Vec::new(),
            compiled: OnceCell::new(),
        })
    }

    /// Creates a template from source text with `${key}` holes, looking each
    /// key up in `parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::InvalidTemplate`] for an unterminated hole
    /// or a key with no parameter.
    pub fn from_source<'k>(
        template_name: impl Into<String>,
        language: SupportedLanguage,
        kind: TemplateKind,
        source: &str,
        parameters: impl IntoIterator<Item = (&'k str, Parameter)>,
    ) -> Result<Self, ProjectorError> {
        let name = template_name.into();
        let lookup: HashMap<&str, Parameter> = parameters.into_iter().collect();
        let mut fragments = Vec::new();
        let mut ordered = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find("${") {
            let (literal, hole) = rest.split_at(open);
            let body = hole.get(2..).unwrap_or_default();
            let close = body.find('}').ok_or_else(|| {
                ProjectorError::invalid_template(&name, "unterminated '${' hole")
            })?;
            let (key, after) = body.split_at(close);
            let parameter = lookup.get(key.trim()).ok_or_else(|| {
                ProjectorError::invalid_template(&name, format!("no parameter for '${{{key}}}'"))
            })?;
            fragments.push(literal.to_owned());
            ordered.push(parameter.clone());
            rest = after.get(1..).unwrap_or_default();
        }
        fragments.push(rest.to_owned());
        Self::new(name, language, kind, fragments, ordered)
    }

    /// Shorthand for a statement template written as source text.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::from_source`].
    pub fn statement<'k>(
        name: impl Into<String>,
        language: SupportedLanguage,
        source: &str,
        parameters: impl IntoIterator<Item = (&'k str, Parameter)>,
    ) -> Result<Self, ProjectorError> {
        Self::from_source(name, language, TemplateKind::Statement, source, parameters)
    }

    /// Shorthand for an expression template written as source text.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::from_source`].
    pub fn expression<'k>(
        name: impl Into<String>,
        language: SupportedLanguage,
        source: &str,
        parameters: impl IntoIterator<Item = (&'k str, Parameter)>,
    ) -> Result<Self, ProjectorError> {
        Self::from_source(name, language, TemplateKind::Expression, source, parameters)
    }

    /// Requires every name in `names` to be bound in the matching context
    /// before this template's pattern is tried.
    #[must_use]
    pub fn with_required_context<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_context = names.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the template language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns which node becomes the pattern root.
    #[must_use]
    pub const fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Returns the literal fragments.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Returns the parameters in source order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the context variables that gate this template.
    #[must_use]
    pub fn required_context(&self) -> &[String] {
        &self.required_context
    }

    /// Returns the memoised pattern, if this template has been compiled.
    #[must_use]
    pub fn compiled(&self) -> Option<&Arc<Pattern>> {
        self.compiled.get()
    }

    pub(crate) const fn compiled_cell(&self) -> &OnceCell<Arc<Pattern>> {
        &self.compiled
    }

    /// Renders the parseable code string for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::UnsupportedAggregation`] when an
    /// aggregation parameter names a node type `config` cannot aggregate.
    pub fn to_code_string(&self, config: &LanguageConfig) -> Result<CodeString, ProjectorError> {
        let mut code = CodeString::default();
        for (fragment, parameter) in self.fragments.iter().zip(self.parameters.iter()) {
            code.push_text(fragment);
            code.push_marker(&parameter.marker(self.language, config)?, parameter.clone());
        }
        if let Some(last) = self.fragments.last() {
            code.push_text(last);
        }
        Ok(code)
    }

    /// Renders a human-readable instance of the template, with each
    /// parameter replaced by a draft value.
    #[must_use]
    pub fn to_draft_string(&self, config: &LanguageConfig) -> String {
        let mut draft = String::new();
        for (fragment, parameter) in self.fragments.iter().zip(self.parameters.iter()) {
            draft.push_str(fragment);
            draft.push_str(&parameter.draft_text(config));
        }
        if let Some(last) = self.fragments.last() {
            draft.push_str(last);
        }
        draft
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("language", &self.language)
            .field("kind", &self.kind)
            .field("fragments", &self.fragments)
            .field("parameters", &self.parameters.len())
            .field("compiled", &self.compiled.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> &'static LanguageConfig {
        SupportedLanguage::Python.default_config()
    }

    #[test]
    fn fragment_count_must_surround_parameters() {
        let result = Template::new(
            "bad",
            SupportedLanguage::Python,
            TemplateKind::Expression,
            vec![String::from("f()")],
            vec![define_argument("x", ["identifier"])],
        );
        assert!(matches!(result, Err(ProjectorError::InvalidTemplate { .. })));
    }

    #[test]
    fn holes_split_the_source_into_fragments() {
        let template = Template::expression(
            "evaluate",
            SupportedLanguage::Python,
            "${dsl}.evaluate(${latex}, locals())",
            [
                ("dsl", define_context_variable("dsl")),
                ("latex", define_argument("latex", ["string"])),
            ],
        )
        .expect("template");
        assert_eq!(template.fragments(), &["", ".evaluate(", ", locals())"]);
        assert_eq!(template.parameters().len(), 2);
    }

    #[test]
    fn unknown_hole_is_rejected() {
        let result = Template::expression("t", SupportedLanguage::Python, "f(${nope})", []);
        assert!(matches!(result, Err(ProjectorError::InvalidTemplate { .. })));
    }

    #[test]
    fn code_string_is_stable_and_locates_markers() {
        let template = Template::expression(
            "call",
            SupportedLanguage::Python,
            "${dsl}.run(${value})",
            [
                ("dsl", define_context_variable("dsl")),
                ("value", define_argument("value", ["integer"])),
            ],
        )
        .expect("template");
        let first = template.to_code_string(python()).expect("code string");
        let second = template.to_code_string(python()).expect("code string");
        assert_eq!(first.raw(), second.raw());
        assert!(first.raw().starts_with("dsl.run(__pj_arg_"));
        assert!(first.parameter_at(0..3).is_some());
    }

    #[test]
    fn aggregation_marker_carries_list_tokens() {
        let part = Arc::new(
            Template::expression(
                "column",
                SupportedLanguage::Python,
                "${c}",
                [("c", define_argument("c", ["identifier"]))],
            )
            .expect("part"),
        );
        let columns = define_aggregation("columns", "argument_list", vec![part], None);
        let placeholder = columns.placeholder();
        let template = Template::expression(
            "select",
            SupportedLanguage::Python,
            "select${columns}",
            [("columns", columns)],
        )
        .expect("template");
        let code = template.to_code_string(python()).expect("code string");
        assert_eq!(code.raw(), format!("select({placeholder})"));
    }

    #[test]
    fn unknown_aggregation_node_type_is_rejected() {
        let template = Template::expression(
            "bad",
            SupportedLanguage::Python,
            "f${items}",
            [("items", define_aggregation("items", "tuple", Vec::new(), None))],
        )
        .expect("template");
        assert!(matches!(
            template.to_code_string(python()),
            Err(ProjectorError::UnsupportedAggregation { .. })
        ));
    }

    #[test]
    fn draft_replaces_parameters_with_readable_text() {
        let body = define_block([("sheet", "sheet")]);
        let template = Template::statement(
            "load_sheet",
            SupportedLanguage::Python,
            "with ${dsl}.load_sheet(${file}) as sheet:\n    ${body}",
            [
                ("dsl", define_context_variable("dsl")),
                ("file", define_argument("file", ["string"])),
                ("body", body),
            ],
        )
        .expect("template");
        insta::assert_snapshot!(
            template.to_draft_string(python()),
            @r"
        with dsl.load_sheet(file) as sheet:
            pass
        "
        );
    }

    #[test]
    fn chain_requires_two_links_and_a_link_template() {
        let start = Arc::new(
            Template::expression("start", SupportedLanguage::Python, "df", []).expect("start"),
        );
        let link = Arc::new(
            Template::expression("link", SupportedLanguage::Python, "head()", []).expect("link"),
        );
        assert!(matches!(
            define_chain("ops", Arc::clone(&start), vec![Arc::clone(&link)], 1),
            Err(ProjectorError::MalformedChain { .. })
        ));
        assert!(matches!(
            define_chain("ops", Arc::clone(&start), Vec::new(), 2),
            Err(ProjectorError::MalformedChain { .. })
        ));
        assert!(define_chain("ops", start, vec![link], 2).is_ok());
    }
}
