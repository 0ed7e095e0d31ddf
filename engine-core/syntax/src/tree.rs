use la_arena::{Arena, Idx};
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::NodeKind;

pub type NodeId = Idx<NodeData>;

#[derive(Debug, PartialEq, Eq)]
pub struct NodeData {
    kind: NodeKind,
    range: TextRange,
    text: Option<SmolStr>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable tree over a single file's source text.
#[derive(Debug, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Arena<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id].range
    }

    /// The name carried by a named leaf, `None` for interior nodes and
    /// markers.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].text.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// The node itself, then its parent chain up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&id| self.parent(id))
    }

    pub fn enclosing_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id).find(|&id| self.kind(id) == kind)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        siblings.get(position + 1).copied()
    }

    /// Siblings after `id`, in source order.
    pub fn following_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.next_sibling(id), |&id| self.next_sibling(id))
    }

    /// Preorder traversal of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev().copied());
            Some(next)
        })
    }

    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&child| self.kind(child) == kind)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(move |&child| self.kind(child) == kind)
    }

    /// The deepest node whose range contains `offset`.
    ///
    /// Falls back to the nearest enclosing node when `offset` sits in
    /// whitespace between children.
    pub fn node_at_offset(&self, offset: TextSize) -> Option<NodeId> {
        if !self.range(self.root).contains(offset) {
            return None;
        }
        let mut current = self.root;
        loop {
            let next = self
                .children(current)
                .iter()
                .copied()
                .find(|&child| self.range(child).contains(offset));
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Named leaves below `id` (including `id` itself) in source order.
    pub fn named_leaves(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id).filter(|&id| self.kind(id).is_named_leaf())
    }
}

/// Builds a [`SyntaxTree`] from nested start/finish events, in the manner
/// of a green-node builder. The first started node becomes the root; every
/// `start_node` must be paired with a `finish_node` before `finish`.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Arena<NodeData>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder::default()
    }

    pub fn start_node(&mut self, kind: NodeKind, start: TextSize) {
        let parent = self.stack.last().copied();
        let id = self.nodes.alloc(NodeData {
            kind,
            range: TextRange::empty(start),
            text: None,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => {
                assert!(self.root.is_none(), "invariant violated: more than one root");
                self.root = Some(id);
            }
        }
        self.stack.push(id);
    }

    pub fn finish_node(&mut self, end: TextSize) {
        let id = self.stack.pop().expect("invariant violated: finish without start");
        let start = self.nodes[id].range.start();
        self.nodes[id].range = TextRange::new(start, end.max(start));
    }

    /// A named leaf carrying its own text.
    pub fn token(&mut self, kind: NodeKind, text: impl Into<SmolStr>, range: TextRange) {
        self.leaf(kind, Some(text.into()), range);
    }

    /// A textless marker leaf, e.g. the `qualified` keyword.
    pub fn marker(&mut self, kind: NodeKind, range: TextRange) {
        self.leaf(kind, None, range);
    }

    fn leaf(&mut self, kind: NodeKind, text: Option<SmolStr>, range: TextRange) {
        let parent =
            self.stack.last().copied().expect("invariant violated: leaf outside of a node");
        let id = self
            .nodes
            .alloc(NodeData { kind, range, text, parent: Some(parent), children: Vec::new() });
        self.nodes[parent].children.push(id);
    }

    pub fn finish(self) -> SyntaxTree {
        assert!(self.stack.is_empty(), "invariant violated: unfinished nodes");
        let root = self.root.expect("invariant violated: no root node");
        SyntaxTree { nodes: self.nodes, root }
    }
}
