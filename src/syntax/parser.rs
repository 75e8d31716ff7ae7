use crate::pool;
use crate::syntax::errors::SyntaxError;
use crate::syntax::lang::SourceLang;
use std::ops::Range;
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser bound to one source language.
pub struct SourceParser {
    parser: Parser,
    lang: SourceLang,
}

impl SourceParser {
    pub fn new(lang: SourceLang) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&lang.ts_language())
            .map_err(|_| SyntaxError::LanguageSet { lang })?;
        Ok(Self { parser, lang })
    }

    pub fn lang(&self) -> SourceLang {
        self.lang
    }

    /// Parse source code into a raw tree-sitter tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser
            .parse(source, None)
            .ok_or(SyntaxError::ParseFailed { lang: self.lang })
    }
}

/// Index of a node inside a [`SyntaxTree`] arena.
///
/// Nodes are stored in pre-order, so comparing ids compares document order
/// and a node's subtree is the contiguous id range `id + 1 .. subtree_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    span: Range<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    subtree_end: u32,
}

/// Immutable arena copy of a parse tree, borrowing the text it came from.
///
/// Because the tree (and every [`NodeRef`] derived from it) borrows the
/// source, the owning `String` cannot be rewritten while any handle is
/// alive: rewrites must produce new text and parse it again.
#[derive(Debug, Clone)]
pub struct SyntaxTree<'src> {
    source: &'src str,
    lang: SourceLang,
    nodes: Vec<NodeData>,
    error_count: usize,
    first_error: Option<usize>,
}

impl<'src> SyntaxTree<'src> {
    /// Parse `source` with the pooled parser for `lang`.
    pub fn parse(source: &'src str, lang: SourceLang) -> Result<Self, SyntaxError> {
        let tree = pool::with_parser(lang, |parser| parser.parse(source))??;
        Ok(Self::from_tree(source, lang, &tree))
    }

    fn from_tree(source: &'src str, lang: SourceLang, tree: &Tree) -> Self {
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut error_count = 0;
        let mut first_error = None;
        // Ancestors of the cursor's current node
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cursor = tree.walk();

        loop {
            let node = cursor.node();
            let id = NodeId(nodes.len() as u32);
            if node.is_error() || node.is_missing() {
                error_count += 1;
                first_error.get_or_insert(node.start_byte());
            }
            let parent = stack.last().copied();
            nodes.push(NodeData {
                kind: node.kind(),
                field: cursor.field_name(),
                named: node.is_named(),
                span: node.byte_range(),
                parent,
                children: Vec::new(),
                subtree_end: id.0 + 1,
            });
            if let Some(parent) = parent {
                nodes[parent.index()].children.push(id);
            }

            if cursor.goto_first_child() {
                stack.push(id);
                continue;
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Self {
                        source,
                        lang,
                        nodes,
                        error_count,
                        first_error,
                    };
                }
                if let Some(done) = stack.pop() {
                    nodes[done.index()].subtree_end = nodes.len() as u32;
                }
            }
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn lang(&self) -> SourceLang {
        self.lang
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of ERROR or MISSING nodes in the tree.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Byte offset of the first ERROR or MISSING node.
    pub fn first_error(&self) -> Option<usize> {
        self.first_error
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId(0))
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// All nodes in document (pre-order) order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len() as u32).map(move |idx| self.node(NodeId(idx)))
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Lightweight handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SyntaxTree<'a>,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.span())
    }
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a SyntaxTree<'a> {
        self.tree
    }

    pub fn kind(&self) -> &'static str {
        self.tree.data(self.id).kind
    }

    pub fn is_named(&self) -> bool {
        self.tree.data(self.id).named
    }

    /// Field name this node occupies in its parent, if any.
    pub fn field_name(&self) -> Option<&'static str> {
        self.tree.data(self.id).field
    }

    pub fn span(&self) -> Range<usize> {
        self.tree.data(self.id).span.clone()
    }

    pub fn byte_start(&self) -> usize {
        self.tree.data(self.id).span.start
    }

    pub fn byte_end(&self) -> usize {
        self.tree.data(self.id).span.end
    }

    pub fn text(&self) -> &'a str {
        &self.tree.source[self.span()]
    }

    /// Text with string-literal quotes removed.
    pub fn literal_value(&self) -> &'a str {
        let text = self.text();
        match self.kind() {
            "string" | "template_string" if text.len() >= 2 => &text[1..text.len() - 1],
            _ => text,
        }
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.data(self.id).children.iter().map(move |id| tree.node(*id))
    }

    pub fn named_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(|child| child.is_named())
    }

    /// First child stored under `field`.
    pub fn child_by_field(&self, field: &str) -> Option<NodeRef<'a>> {
        self.children()
            .find(|child| child.field_name() == Some(field))
    }

    pub fn children_by_field(&self, field: &'a str) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children()
            .filter(move |child| child.field_name() == Some(field))
    }

    /// Strict descendants in document order.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        let end = tree.data(self.id).subtree_end;
        (self.id.0 + 1..end).map(move |idx| tree.node(NodeId(idx)))
    }

    /// Whether `other` lies strictly inside this node's subtree.
    pub fn contains(&self, other: NodeRef<'_>) -> bool {
        other.id.0 > self.id.0 && other.id.0 < self.tree.data(self.id).subtree_end
    }

    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let mut siblings = parent.children().skip_while(|child| child.id != self.id);
        siblings.next();
        siblings.next()
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        parent.children().take_while(|child| child.id != self.id).last()
    }

    /// Whether an unnamed child token with exactly this text exists.
    pub fn has_token(&self, token: &str) -> bool {
        self.children()
            .any(|child| !child.is_named() && child.kind() == token)
    }
}
