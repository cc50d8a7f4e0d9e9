//! Pattern tree nodes.

use std::collections::BTreeMap;

use projector_core::TreePath;

/// The allowed-types entry that accepts any node.
pub const ANY_NODE_TYPE: &str = "*";

/// What a pattern node compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatternNodeKind {
    /// A literal syntax node copied from the template.
    Regular {
        /// Grammar node type.
        node_type: String,
        /// Source text, kept for leaves only.
        text: Option<String>,
        /// Anonymous tokens between the named children, in order.
        tokens: Vec<String>,
        /// Named children.
        children: Vec<PatternNode>,
    },
    /// Binds one node of an allowed type.
    Argument {
        /// Binding name.
        name: String,
        /// Accepted node types; `*` accepts anything.
        allowed_types: Vec<String>,
    },
    /// Matches the identifier bound to a context variable.
    ContextVariable {
        /// Context-variable name.
        name: String,
        /// Node type the name parsed as inside the template.
        node_type: String,
    },
    /// A statement block left editable by the projection.
    Block {
        /// Bindings added to the context inside the block.
        declared: BTreeMap<String, String>,
    },
    /// A delimiter separated list whose parts are matched separately.
    Aggregation {
        /// Aggregation name.
        name: String,
        /// Grammar node type of the list.
        node_type: String,
        /// Whether the first element is matched by a start sub-pattern.
        has_start: bool,
    },
    /// The outermost link of a method chain.
    Chain {
        /// Chain name.
        name: String,
        /// Least number of links that counts as a chain.
        minimum_length: usize,
    },
    /// Stands for "the rest of the chain" inside a link sub-pattern.
    ChainContinuation,
}

/// A node of a compiled pattern tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternNode {
    field_name: Option<String>,
    kind: PatternNodeKind,
}

impl PatternNode {
    /// Creates a node hanging off its parent under `field_name`.
    #[must_use]
    pub const fn new(field_name: Option<String>, kind: PatternNodeKind) -> Self {
        Self { field_name, kind }
    }

    /// Returns the field name under which this node hangs off its parent.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    /// Returns what the node compares against.
    #[must_use]
    pub const fn kind(&self) -> &PatternNodeKind {
        &self.kind
    }

    /// Returns the named children of a regular node.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            PatternNodeKind::Regular { children, .. } => children,
            _ => &[],
        }
    }

    /// Returns the number of leaves below (and including) this node.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            PatternNodeKind::Regular { children, .. } if !children.is_empty() => {
                children.iter().map(Self::leaf_count).sum()
            }
            _ => 1,
        }
    }

    /// Returns the node types this node can match at, or `None` when it can
    /// match any node type.
    #[must_use]
    pub fn root_types(&self, block_type: &str, chain_type: Option<&str>) -> Option<Vec<String>> {
        match &self.kind {
            PatternNodeKind::Regular { node_type, .. }
            | PatternNodeKind::ContextVariable { node_type, .. }
            | PatternNodeKind::Aggregation { node_type, .. } => Some(vec![node_type.clone()]),
            PatternNodeKind::Argument { allowed_types, .. } => {
                if allowed_types.iter().any(|kind| kind == ANY_NODE_TYPE) {
                    None
                } else {
                    Some(allowed_types.clone())
                }
            }
            PatternNodeKind::Block { .. } => Some(vec![block_type.to_owned()]),
            PatternNodeKind::Chain { .. } => Some(chain_type.map(str::to_owned).into_iter().collect()),
            PatternNodeKind::ChainContinuation => Some(Vec::new()),
        }
    }

    /// Returns the path (in named-child indices) to the first node in
    /// pre-order satisfying `predicate`.
    #[must_use]
    pub fn find_path(&self, predicate: &impl Fn(&Self) -> bool) -> Option<TreePath> {
        if predicate(self) {
            return Some(TreePath::root());
        }
        self.children()
            .iter()
            .enumerate()
            .find_map(|(index, child)| {
                child
                    .find_path(predicate)
                    .map(|rest| TreePath::from(vec![index]).join(&rest))
            })
    }

    /// Returns `true` when any node in the tree satisfies `predicate`.
    #[must_use]
    pub fn contains(&self, predicate: &impl Fn(&Self) -> bool) -> bool {
        self.find_path(predicate).is_some()
    }

    /// Consumes the tree and returns the descendant at `path`, detached from
    /// its parent (its field name is cleared).
    #[must_use]
    pub fn into_descendant(self, path: &TreePath) -> Option<Self> {
        let mut node = self;
        for &step in path.steps() {
            node = match node.kind {
                PatternNodeKind::Regular { children, .. } => children.into_iter().nth(step)?,
                _ => return None,
            };
        }
        node.field_name = None;
        Some(node)
    }
}
