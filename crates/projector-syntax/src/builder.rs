//! Compiles templates into pattern trees.
//!
//! The builder renders a template's code string, parses it with the
//! template's grammar, and converts the resulting syntax tree into a
//! [`PatternNode`] tree, replacing every node that covers a parameter marker
//! with the matching semantic node.
//!
//! Aggregation parts and chain links are compiled by substitution: the part
//! or link template is written into the host's code string, the combined
//! text is parsed, and the sub-tree sitting where the part or link landed is
//! cut out. Sub-patterns therefore always see the syntactic surroundings
//! they will be matched in.

use std::sync::Arc;

use projector_core::{LanguageConfig, TreePath};
use tracing::debug;
use tree_sitter::Node;

use crate::cursor::node_text;
use crate::error::ProjectorError;
use crate::language::SupportedLanguage;
use crate::parser::{ParseResult, Parser};
use crate::pattern::{AggregationDecorator, ChainDecorator, Pattern, PatternNode, PatternNodeKind};
use crate::template::{CodeString, Parameter, ParameterKind, Template, TemplateKind};

const BUILDER_TARGET: &str = "projector::builder";

/// Receiver text a link template is attached to before parsing.
const LINK_HOST: &str = "a.__pj_link__";
/// Slot inside [`LINK_HOST`] replaced by the link's code string.
const LINK_SLOT: &str = "__pj_link__";

/// Where a template's pattern root sits inside a parsed code string.
struct CompileUnit {
    code: CodeString,
    kind: TemplateKind,
    /// Named-child path from the statement or expression root to the
    /// pattern root.
    prefix: TreePath,
    /// Raw child path, from the expression root, of the node replaced by a
    /// chain continuation.
    continuation: Option<TreePath>,
}

/// Compiles [`Template`]s for one language.
#[derive(Debug)]
pub struct PatternBuilder {
    parser: Parser,
    config: LanguageConfig,
}

impl PatternBuilder {
    /// Creates a builder using the language's bundled tables.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::ParserInit`] if the grammar cannot be
    /// loaded.
    pub fn new(language: SupportedLanguage) -> Result<Self, ProjectorError> {
        Ok(Self {
            parser: Parser::new(language)?,
            config: language.default_config().clone(),
        })
    }

    /// Creates a builder using custom structural tables.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::Config`] if `config` does not validate, or
    /// [`ProjectorError::ParserInit`] if the grammar cannot be loaded.
    pub fn with_language_config(
        language: SupportedLanguage,
        config: LanguageConfig,
    ) -> Result<Self, ProjectorError> {
        config.validate()?;
        Ok(Self {
            parser: Parser::new(language)?,
            config,
        })
    }

    /// Returns the builder's language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.parser.language()
    }

    /// Returns the structural tables in use.
    #[must_use]
    pub const fn config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Compiles `template` into a root pattern.
    ///
    /// The result is memoised on the template: compiling the same template
    /// again returns the same [`Arc`].
    ///
    /// # Errors
    ///
    /// Returns an error when the template targets another language, its
    /// code string does not parse, a parameter is lost while parsing, or an
    /// aggregation or chain cannot be expressed in this language.
    pub fn compile(&mut self, template: &Template) -> Result<Arc<Pattern>, ProjectorError> {
        if let Some(pattern) = template.compiled() {
            return Ok(Arc::clone(pattern));
        }
        let unit = self.root_unit(template)?;
        let pattern = Arc::new(self.build(template, unit)?);
        Ok(Arc::clone(
            template.compiled_cell().get_or_init(|| pattern),
        ))
    }

    /// Compiles an additional part template for aggregation `aggregation`
    /// of `host`, ready for [`crate::PatternRegistry::register_aggregation_parts`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::UnknownSubPattern`] if `host` has no such
    /// aggregation, or any error [`Self::compile`] can raise.
    pub fn compile_aggregation_part(
        &mut self,
        host: &Template,
        aggregation: &str,
        part: &Template,
    ) -> Result<Arc<Pattern>, ProjectorError> {
        let host_pattern = self.compile(host)?;
        let parameter = host
            .parameters()
            .iter()
            .find(|p| {
                matches!(p.kind(), ParameterKind::Aggregation { name, .. } if name == aggregation)
            })
            .ok_or_else(|| ProjectorError::unknown_sub_pattern(host.name(), aggregation))?;
        let path = host_pattern
            .root()
            .find_path(&|node| is_aggregation(node, aggregation))
            .ok_or_else(|| ProjectorError::unknown_sub_pattern(host.name(), aggregation))?;
        let unit = self.root_unit(host)?;
        self.build_variant(&unit, &path, parameter, part).map(Arc::new)
    }

    /// Compiles an additional link template for chain `chain` of `host`,
    /// ready for [`crate::PatternRegistry::register_chain_links`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjectorError::UnknownSubPattern`] if `host` has no such
    /// chain, or any error [`Self::compile`] can raise.
    pub fn compile_chain_link(
        &mut self,
        host: &Template,
        chain: &str,
        link: &Template,
    ) -> Result<Arc<Pattern>, ProjectorError> {
        let declared = host
            .parameters()
            .iter()
            .any(|p| matches!(p.kind(), ParameterKind::Chain { name, .. } if name == chain));
        if !declared {
            return Err(ProjectorError::unknown_sub_pattern(host.name(), chain));
        }
        self.build_link(link).map(Arc::new)
    }

    fn root_unit(&self, template: &Template) -> Result<CompileUnit, ProjectorError> {
        self.check_language(template)?;
        Ok(CompileUnit {
            code: template.to_code_string(&self.config)?,
            kind: template.kind(),
            prefix: TreePath::root(),
            continuation: None,
        })
    }

    fn check_language(&self, template: &Template) -> Result<(), ProjectorError> {
        if template.language() == self.language() {
            Ok(())
        } else {
            Err(ProjectorError::LanguageMismatch {
                template: template.name().to_owned(),
                expected: self.language(),
                found: template.language(),
            })
        }
    }

    fn build(&mut self, template: &Template, unit: CompileUnit) -> Result<Pattern, ProjectorError> {
        self.check_language(template)?;
        let root = self.transform(template.name(), &unit)?;
        check_placement(template, &root)?;
        if unit.continuation.is_some()
            && !root.contains(&|node| matches!(node.kind(), PatternNodeKind::ChainContinuation))
        {
            return Err(ProjectorError::unsupported_chain(
                self.language(),
                format!("link '{}' has no receiver at the next-link path", template.name()),
            ));
        }

        let mut aggregations = AggregationDecorator::default();
        let mut chains = ChainDecorator::default();
        for parameter in template.parameters() {
            match parameter.kind() {
                ParameterKind::Aggregation {
                    name, parts, start, ..
                } => {
                    let path = root
                        .find_path(&|node| is_aggregation(node, name))
                        .ok_or_else(|| lost(template, parameter))?;
                    let part_patterns = parts
                        .iter()
                        .map(|part| self.build_variant(&unit, &path, parameter, part).map(Arc::new))
                        .collect::<Result<Vec<_>, _>>()?;
                    let start_pattern = start
                        .as_ref()
                        .map(|first| self.build_variant(&unit, &path, parameter, first).map(Arc::new))
                        .transpose()?;
                    aggregations.insert(name, part_patterns, start_pattern);
                }
                ParameterKind::Chain {
                    name, start, links, ..
                } => {
                    let start_unit = CompileUnit {
                        code: start.to_code_string(&self.config)?,
                        kind: TemplateKind::Expression,
                        prefix: TreePath::root(),
                        continuation: None,
                    };
                    let start_pattern = Arc::new(self.build(start, start_unit)?);
                    let link_patterns = links
                        .iter()
                        .map(|link| self.build_link(link).map(Arc::new))
                        .collect::<Result<Vec<_>, _>>()?;
                    chains.insert(name, start_pattern, link_patterns);
                }
                _ => {}
            }
        }

        let pattern = Pattern::new(
            template.name(),
            self.language(),
            root,
            template.required_context().to_vec(),
            aggregations,
            chains,
        );
        debug!(
            target: BUILDER_TARGET,
            template = template.name(),
            priority = pattern.priority(),
            "compiled pattern"
        );
        Ok(pattern)
    }

    /// Compiles `part` by writing it into the host's aggregation slot.
    fn build_variant(
        &mut self,
        unit: &CompileUnit,
        path: &TreePath,
        parameter: &Parameter,
        part: &Template,
    ) -> Result<Pattern, ProjectorError> {
        self.check_language(part)?;
        let replacement = part.to_code_string(&self.config)?;
        let code = unit.code.replace(&parameter.placeholder(), &replacement)?;
        let mut prefix = unit.prefix.join(path);
        prefix.push(0);
        self.build(
            part,
            CompileUnit {
                code,
                kind: unit.kind,
                prefix,
                continuation: None,
            },
        )
    }

    /// Compiles `link` by attaching it to a placeholder receiver.
    fn build_link(&mut self, link: &Template) -> Result<Pattern, ProjectorError> {
        self.check_language(link)?;
        let next_link = self
            .config
            .chains
            .as_ref()
            .map(|chains| chains.path_to_next_link.clone())
            .ok_or_else(|| {
                ProjectorError::unsupported_chain(self.language(), "no chain table configured")
            })?;
        let code = link
            .to_code_string(&self.config)?
            .insert_into(LINK_HOST, LINK_SLOT)?;
        self.build(
            link,
            CompileUnit {
                code,
                kind: TemplateKind::Expression,
                prefix: TreePath::root(),
                continuation: Some(next_link),
            },
        )
    }

    fn transform(&mut self, template: &str, unit: &CompileUnit) -> Result<PatternNode, ProjectorError> {
        let mut text = unit.code.raw().to_owned();
        if unit.kind == TemplateKind::Expression {
            if let Some(suffix) = &self.config.expression_suffix {
                text.push_str(suffix);
            }
        }
        let parsed = self.parser.parse(&text)?;
        if let Some(error) = parsed.errors().into_iter().next() {
            return Err(ProjectorError::TemplateSyntax {
                template: template.to_owned(),
                line: error.line,
                column: error.column,
                message: error.message,
            });
        }
        let start = self.extract_root(&parsed, unit.kind).ok_or_else(|| {
            ProjectorError::TemplateSyntax {
                template: template.to_owned(),
                line: 1,
                column: 1,
                message: match unit.kind {
                    TemplateKind::Statement => "no statement".to_owned(),
                    TemplateKind::Expression => "no expression statement".to_owned(),
                },
            }
        })?;
        let converter = Converter {
            code: &unit.code,
            source: parsed.source(),
            config: &self.config,
            continuation: unit.continuation.as_ref(),
        };
        let tree = converter.convert(start, None, &mut Vec::new());
        tree.into_descendant(&unit.prefix)
            .ok_or_else(|| ProjectorError::pattern_path_not_found(template, unit.prefix.to_string()))
    }

    fn extract_root<'t>(&self, parsed: &'t ParseResult, kind: TemplateKind) -> Option<Node<'t>> {
        let top = parsed.root_node();
        match kind {
            TemplateKind::Statement => top.named_child(0),
            TemplateKind::Expression => {
                find_first(top, &self.config.expression_statement_node_type)
                    .and_then(|statement| statement.named_child(0))
            }
        }
    }
}

/// Compiles literal `fragments` interleaved with `parameters` in one step.
///
/// # Errors
///
/// Fails like [`Template::new`] and [`PatternBuilder::compile`].
pub fn compile_template(
    name: &str,
    language: SupportedLanguage,
    kind: TemplateKind,
    fragments: Vec<String>,
    parameters: Vec<Parameter>,
) -> Result<Arc<Pattern>, ProjectorError> {
    let template = Template::new(name, language, kind, fragments, parameters)?;
    PatternBuilder::new(language)?.compile(&template)
}

/// Converts a template syntax tree into a pattern tree.
struct Converter<'c> {
    code: &'c CodeString,
    source: &'c str,
    config: &'c LanguageConfig,
    continuation: Option<&'c TreePath>,
}

impl Converter<'_> {
    fn convert(&self, node: Node<'_>, field: Option<String>, raw_path: &mut Vec<usize>) -> PatternNode {
        if self
            .continuation
            .is_some_and(|path| path.steps() == raw_path.as_slice())
        {
            return PatternNode::new(field, PatternNodeKind::ChainContinuation);
        }

        let text = node_text(node, self.source);
        let end = node.start_byte() + text.trim_end().len();
        if let Some(kind) = self
            .code
            .parameter_at(node.start_byte()..end)
            .and_then(|parameter| self.semantic_kind(parameter, node))
        {
            return PatternNode::new(field, kind);
        }

        let mut tokens = Vec::new();
        let mut children = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            let mut index = 0;
            loop {
                let child = cursor.node();
                raw_path.push(index);
                if child.is_named() {
                    let child_field = cursor.field_name().map(str::to_owned);
                    children.push(self.convert(child, child_field, raw_path));
                } else {
                    tokens.push(node_text(child, self.source).to_owned());
                }
                raw_path.pop();
                index += 1;
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        PatternNode::new(
            field,
            PatternNodeKind::Regular {
                node_type: node.kind().to_owned(),
                text: (node.child_count() == 0).then(|| text.to_owned()),
                tokens,
                children,
            },
        )
    }

    /// Returns the semantic node for `parameter` if `node` is where its
    /// marker belongs. Identifier-shaped markers land on the leaf; blocks and
    /// aggregations land on the node of their configured type.
    fn semantic_kind(&self, parameter: &Parameter, node: Node<'_>) -> Option<PatternNodeKind> {
        let leaf = node.child_count() == 0;
        match parameter.kind() {
            ParameterKind::Argument {
                name,
                allowed_types,
            } if leaf => Some(PatternNodeKind::Argument {
                name: name.clone(),
                allowed_types: allowed_types.clone(),
            }),
            ParameterKind::ContextVariable { name } if leaf => {
                Some(PatternNodeKind::ContextVariable {
                    name: name.clone(),
                    node_type: node.kind().to_owned(),
                })
            }
            ParameterKind::Chain {
                name,
                minimum_length,
                ..
            } if leaf => Some(PatternNodeKind::Chain {
                name: name.clone(),
                minimum_length: *minimum_length,
            }),
            ParameterKind::Block { declared } if node.kind() == self.config.blocks.block_node_type => {
                Some(PatternNodeKind::Block {
                    declared: declared.clone(),
                })
            }
            ParameterKind::Aggregation {
                name,
                node_type,
                start,
                ..
            } if node.kind() == node_type => Some(PatternNodeKind::Aggregation {
                name: name.clone(),
                node_type: node_type.clone(),
                has_start: start.is_some(),
            }),
            _ => None,
        }
    }
}

fn find_first<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find_map(|child| find_first(child, kind));
    found
}

fn is_aggregation(node: &PatternNode, wanted: &str) -> bool {
    matches!(node.kind(), PatternNodeKind::Aggregation { name, .. } if name == wanted)
}

fn lost(template: &Template, parameter: &Parameter) -> ProjectorError {
    let description = parameter
        .name()
        .map_or_else(|| parameter.placeholder(), str::to_owned);
    ProjectorError::pattern_path_not_found(template.name(), description)
}

/// Checks that every parameter of `template` became a semantic node.
fn check_placement(template: &Template, root: &PatternNode) -> Result<(), ProjectorError> {
    for parameter in template.parameters() {
        let placed = match parameter.kind() {
            ParameterKind::Argument { name, .. } => root.contains(
                &|node| matches!(node.kind(), PatternNodeKind::Argument { name: n, .. } if n == name),
            ),
            ParameterKind::ContextVariable { name } => root.contains(&|node| {
                matches!(node.kind(), PatternNodeKind::ContextVariable { name: n, .. } if n == name)
            }),
            ParameterKind::Block { declared } => root.contains(&|node| {
                matches!(node.kind(), PatternNodeKind::Block { declared: d } if d == declared)
            }),
            ParameterKind::Aggregation { name, .. } => root.contains(&|node| is_aggregation(node, name)),
            ParameterKind::Chain { name, .. } => root.contains(
                &|node| matches!(node.kind(), PatternNodeKind::Chain { name: n, .. } if n == name),
            ),
        };
        if !placed {
            return Err(lost(template, parameter));
        }
    }
    Ok(())
}
