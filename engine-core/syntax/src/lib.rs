//! Arena-backed syntax trees for Haskell source.
//!
//! Nodes live in a single arena and are addressed by stable [`NodeId`]
//! indices; traversal is a set of pure functions over the arena rather than
//! a live object graph. Only name-bearing tokens become leaves, so the tree
//! is a navigation skeleton, not a lossless token stream.

pub mod ast;
mod tree;

pub use tree::{NodeData, NodeId, SyntaxTree, TreeBuilder};

pub use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a source file.
    Module,
    /// `module A.B (exports) where`
    ModuleHeader,
    ExportList,
    ImportDecl,
    /// `(a, B, C(..))` after an import.
    ImportList,
    /// `hiding (a, b)` after an import.
    HidingList,
    ImportItem,

    /// `foo, bar :: Int -> Int`
    TypeSignature,
    /// Everything right of `::`.
    TypeBody,
    /// `foo x = ...`, including operator definitions.
    ValueEquation,
    /// A pattern variable on an equation's left-hand side.
    Binder,
    /// An equation's right-hand side, including trailing `where` blocks.
    Expression,

    DataDecl,
    NewtypeDecl,
    TypeSynonym,
    ClassDecl,
    InstanceDecl,
    /// A top-level chunk this parser does not model (fixity, foreign, ...).
    OtherDecl,

    /// `M.foo`: a [`NodeKind::Qualifier`] leaf followed by a name leaf.
    QualifiedName,

    /// Leaf: dotted module id, e.g. `Data.List`.
    ModuleName,
    /// Leaf: a qualifier prefix or an import alias, e.g. `M` or `Data.Map`.
    Qualifier,
    /// Leaf: a variable, constructor or operator name.
    Identifier,
    /// Leaf marker for the `qualified` keyword of an import.
    Qualified,
}

impl NodeKind {
    /// Leaves that carry a name usable as a navigation occurrence.
    pub fn is_named_leaf(self) -> bool {
        matches!(self, NodeKind::ModuleName | NodeKind::Qualifier | NodeKind::Identifier)
    }

    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::TypeSignature
                | NodeKind::ValueEquation
                | NodeKind::DataDecl
                | NodeKind::NewtypeDecl
                | NodeKind::TypeSynonym
                | NodeKind::ClassDecl
                | NodeKind::InstanceDecl
                | NodeKind::OtherDecl
        )
    }
}
