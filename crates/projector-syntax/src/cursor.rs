//! Path-tracking cursor over a Tree-sitter syntax tree.
//!
//! [`AstCursor`] wraps [`tree_sitter::TreeCursor`] and remembers the child
//! index taken at every level below its root. A position can therefore be
//! captured as a [`TreePath`] and re-established later, which is how the
//! matcher guarantees that every verification attempt leaves the cursor
//! where it found it.

use projector_core::TreePath;
use tree_sitter::{Node, TreeCursor};

/// An anonymous token seen while stepping over a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword<'a> {
    /// Token text, e.g. `:` or `with`.
    pub text: &'a str,
    /// Byte offset of the token.
    pub start: usize,
}

/// A cursor that can only move inside the subtree of its root node.
#[derive(Clone)]
pub struct AstCursor<'a> {
    inner: TreeCursor<'a>,
    root: Node<'a>,
    source: &'a str,
    path: Vec<usize>,
}

impl<'a> AstCursor<'a> {
    /// Creates a cursor rooted at `node`. `source` must be the text the tree
    /// was parsed from.
    #[must_use]
    pub fn new(node: Node<'a>, source: &'a str) -> Self {
        Self {
            inner: node.walk(),
            root: node,
            source,
            path: Vec::new(),
        }
    }

    /// Returns the node under the cursor.
    #[must_use]
    pub fn node(&self) -> Node<'a> {
        self.inner.node()
    }

    /// Returns the cursor's root node.
    #[must_use]
    pub const fn root(&self) -> Node<'a> {
        self.root
    }

    /// Returns the document text.
    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.source
    }

    /// Returns the grammar node type under the cursor.
    #[must_use]
    pub fn node_type(&self) -> &'static str {
        self.inner.node().kind()
    }

    /// Returns the source text of the node under the cursor.
    #[must_use]
    pub fn text(&self) -> &'a str {
        node_text(self.inner.node(), self.source)
    }

    /// Returns the field name under which the current node hangs off its
    /// parent. Always `None` at the cursor root.
    #[must_use]
    pub fn field_name(&self) -> Option<&'static str> {
        if self.path.is_empty() {
            None
        } else {
            self.inner.field_name()
        }
    }

    /// Returns the start byte of the current node.
    #[must_use]
    pub fn start_byte(&self) -> usize {
        self.inner.node().start_byte()
    }

    /// Returns the end byte of the current node.
    #[must_use]
    pub fn end_byte(&self) -> usize {
        self.inner.node().end_byte()
    }

    /// Returns `true` for anonymous tokens such as punctuation and keywords.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        !self.inner.node().is_named()
    }

    /// Returns `true` for error and missing nodes.
    #[must_use]
    pub fn is_error_token(&self) -> bool {
        let node = self.inner.node();
        node.is_error() || node.is_missing()
    }

    /// Returns `true` if the current node has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.inner.node().child_count() > 0
    }

    /// Returns the child-index path from the root to the current node.
    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Moves to the first child.
    pub fn goto_first_child(&mut self) -> bool {
        if self.inner.goto_first_child() {
            self.path.push(0);
            true
        } else {
            false
        }
    }

    /// Moves to the next sibling. Never leaves the root.
    pub fn goto_next_sibling(&mut self) -> bool {
        if self.path.is_empty() || !self.inner.goto_next_sibling() {
            return false;
        }
        if let Some(last) = self.path.last_mut() {
            *last += 1;
        }
        true
    }

    /// Moves to the previous sibling. Never leaves the root.
    pub fn goto_previous_sibling(&mut self) -> bool {
        if self.path.is_empty() || !self.inner.goto_previous_sibling() {
            return false;
        }
        if let Some(last) = self.path.last_mut() {
            *last = last.saturating_sub(1);
        }
        true
    }

    /// Moves to the parent. Fails at the root.
    pub fn goto_parent(&mut self) -> bool {
        if self.path.is_empty() || !self.inner.goto_parent() {
            return false;
        }
        self.path.pop();
        true
    }

    /// Moves to the first child that extends beyond `byte`.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> bool {
        let Some(index) = self.inner.goto_first_child_for_byte(byte) else {
            return false;
        };
        self.path.push(index);
        true
    }

    /// Captures the current position.
    #[must_use]
    pub fn snapshot(&self) -> TreePath {
        TreePath::from(self.path.clone())
    }

    /// Returns to a position captured by [`Self::snapshot`] on this cursor.
    pub fn restore(&mut self, position: &TreePath) {
        if position.steps() == self.path.as_slice() {
            return;
        }
        self.inner.reset(self.root);
        self.path.clear();
        // A snapshot of this cursor always names an existing descendant.
        let _ = self.descend(position.steps());
    }

    /// Follows `path` from the current node. On failure the cursor is left
    /// where it started and `false` is returned.
    pub fn follow(&mut self, path: &TreePath) -> bool {
        let start = self.snapshot();
        if self.descend(path.steps()) {
            true
        } else {
            self.restore(&start);
            false
        }
    }

    /// Steps over anonymous tokens starting at the current node, reporting
    /// the last one seen. Returns `false` if the siblings ran out before a
    /// named node was reached.
    pub fn skip_keywords(&mut self) -> (bool, Option<Keyword<'a>>) {
        let mut last = None;
        while self.is_keyword() {
            last = Some(Keyword {
                text: self.text(),
                start: self.start_byte(),
            });
            if !self.goto_next_sibling() {
                return (false, last);
            }
        }
        (true, last)
    }

    fn descend(&mut self, steps: &[usize]) -> bool {
        for &step in steps {
            if !self.goto_first_child() {
                return false;
            }
            for _ in 0..step {
                if !self.goto_next_sibling() {
                    return false;
                }
            }
        }
        true
    }
}

impl std::fmt::Debug for AstCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstCursor")
            .field("node_type", &self.node_type())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Returns the source text covered by `node`.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parser, SupportedLanguage};

    fn parse(source: &str) -> crate::ParseResult {
        let mut parser = Parser::new(SupportedLanguage::Python).expect("parser init");
        parser.parse(source).expect("parse")
    }

    #[test]
    fn follow_and_restore_round_trip() {
        let parsed = parse("a.b().c()\n");
        let mut cursor = parsed.cursor();
        // module > expression_statement > call
        assert!(cursor.follow(&TreePath::from(vec![0, 0])));
        assert_eq!(cursor.node_type(), "call");
        let at_call = cursor.snapshot();

        assert!(cursor.follow(&TreePath::from(vec![0, 0])));
        assert_eq!(cursor.node_type(), "call");
        assert_eq!(cursor.text(), "a.b()");

        cursor.restore(&at_call);
        assert_eq!(cursor.text(), "a.b().c()");
        assert_eq!(cursor.path(), &[0, 0]);
    }

    #[test]
    fn failed_follow_leaves_cursor_in_place() {
        let parsed = parse("x\n");
        let mut cursor = parsed.cursor();
        assert!(cursor.goto_first_child());
        let before = cursor.snapshot();
        assert!(!cursor.follow(&TreePath::from(vec![0, 5])));
        assert_eq!(cursor.snapshot(), before);
        assert_eq!(cursor.node_type(), "expression_statement");
    }

    #[test]
    fn root_has_no_siblings_or_field() {
        let parsed = parse("x\ny\n");
        let mut cursor = parsed.cursor();
        assert!(!cursor.goto_next_sibling());
        assert!(!cursor.goto_parent());
        assert_eq!(cursor.field_name(), None);
    }

    #[test]
    fn field_names_are_reported_below_the_root() {
        let parsed = parse("f(x)\n");
        let mut cursor = parsed.cursor();
        assert!(cursor.follow(&TreePath::from(vec![0, 0, 1])));
        assert_eq!(cursor.node_type(), "argument_list");
        assert_eq!(cursor.field_name(), Some("arguments"));
    }

    #[test]
    fn skip_keywords_reports_the_last_token() {
        let parsed = parse("f(x)\n");
        let mut cursor = parsed.cursor();
        assert!(cursor.follow(&TreePath::from(vec![0, 0, 1])));
        assert!(cursor.goto_first_child());
        let (found, keyword) = cursor.skip_keywords();
        assert!(found);
        assert_eq!(keyword.map(|k| k.text), Some("("));
        assert_eq!(cursor.text(), "x");
    }
}
