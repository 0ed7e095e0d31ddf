//! Typed views over [`SyntaxTree`] nodes.
//!
//! A view is a copyable wrapper around a [`NodeId`] that is known to have a
//! particular [`NodeKind`]; accessors take the tree explicitly.

use smol_str::SmolStr;

use crate::{NodeId, NodeKind, SyntaxTree};

macro_rules! ast_node {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(NodeId);

            impl $name {
                pub fn can_cast(kind: NodeKind) -> bool {
                    matches!(kind, NodeKind::$name)
                }

                pub fn cast(tree: &SyntaxTree, id: NodeId) -> Option<$name> {
                    if Self::can_cast(tree.kind(id)) { Some($name(id)) } else { None }
                }

                pub fn id(self) -> NodeId {
                    self.0
                }
            }
        )*
    };
}

ast_node!(
    Module,
    ModuleHeader,
    ImportDecl,
    TypeSignature,
    ValueEquation,
    DataDecl,
    NewtypeDecl,
    TypeSynonym,
    ClassDecl,
    InstanceDecl,
    QualifiedName,
);

impl Module {
    pub fn header(self, tree: &SyntaxTree) -> Option<ModuleHeader> {
        let id = tree.child_of_kind(self.0, NodeKind::ModuleHeader)?;
        ModuleHeader::cast(tree, id)
    }

    pub fn imports(self, tree: &SyntaxTree) -> impl Iterator<Item = ImportDecl> + '_ {
        tree.children_of_kind(self.0, NodeKind::ImportDecl)
            .filter_map(|id| ImportDecl::cast(tree, id))
    }

    /// Top-level declarations in source order, imports and header excluded.
    pub fn declarations(self, tree: &SyntaxTree) -> impl Iterator<Item = NodeId> + '_ {
        tree.children(self.0).iter().copied().filter(|&id| tree.kind(id).is_declaration())
    }
}

impl ModuleHeader {
    pub fn name(self, tree: &SyntaxTree) -> Option<SmolStr> {
        let id = tree.child_of_kind(self.0, NodeKind::ModuleName)?;
        tree.text(id).map(SmolStr::new)
    }
}

impl ImportDecl {
    pub fn module_name(self, tree: &SyntaxTree) -> Option<SmolStr> {
        let id = self.module_name_node(tree)?;
        tree.text(id).map(SmolStr::new)
    }

    pub fn module_name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::ModuleName)
    }

    pub fn is_qualified(self, tree: &SyntaxTree) -> bool {
        tree.child_of_kind(self.0, NodeKind::Qualified).is_some()
    }

    /// The `as` alias, if any.
    pub fn alias(self, tree: &SyntaxTree) -> Option<SmolStr> {
        let id = self.alias_node(tree)?;
        tree.text(id).map(SmolStr::new)
    }

    pub fn alias_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Qualifier)
    }

    pub fn is_hiding(self, tree: &SyntaxTree) -> bool {
        tree.child_of_kind(self.0, NodeKind::HidingList).is_some()
    }

    /// Names listed in the import or hiding list, in source order. Constructor
    /// sub-lists count: `Bar(Con)` lists both `Bar` and `Con`.
    pub fn item_names(self, tree: &SyntaxTree) -> Vec<SmolStr> {
        let list = tree
            .child_of_kind(self.0, NodeKind::ImportList)
            .or_else(|| tree.child_of_kind(self.0, NodeKind::HidingList));
        let Some(list) = list else {
            return Vec::new();
        };
        tree.children_of_kind(list, NodeKind::ImportItem)
            .flat_map(|item| tree.children_of_kind(item, NodeKind::Identifier))
            .filter_map(|id| tree.text(id).map(SmolStr::new))
            .collect()
    }

    /// The alias if present, else the bare module name: the qualifier under
    /// which names can refer to this import's module.
    pub fn effective_qualifier(self, tree: &SyntaxTree) -> Option<SmolStr> {
        self.alias(tree).or_else(|| self.module_name(tree))
    }
}

impl TypeSignature {
    /// The name list left of `::`.
    pub fn names(self, tree: &SyntaxTree) -> impl Iterator<Item = NodeId> + '_ {
        tree.children_of_kind(self.0, NodeKind::Identifier)
    }
}

impl ValueEquation {
    /// The bound name: the direct identifier child, binders excluded.
    pub fn name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Identifier)
    }

    pub fn name(self, tree: &SyntaxTree) -> Option<SmolStr> {
        let id = self.name_node(tree)?;
        tree.text(id).map(SmolStr::new)
    }
}

impl DataDecl {
    pub fn name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Identifier)
    }

    /// Constructor names, the type name excluded.
    pub fn constructors(self, tree: &SyntaxTree) -> impl Iterator<Item = NodeId> + '_ {
        tree.children_of_kind(self.0, NodeKind::Identifier).skip(1)
    }
}

impl NewtypeDecl {
    pub fn name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Identifier)
    }

    pub fn constructors(self, tree: &SyntaxTree) -> impl Iterator<Item = NodeId> + '_ {
        tree.children_of_kind(self.0, NodeKind::Identifier).skip(1)
    }
}

impl TypeSynonym {
    pub fn name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Identifier)
    }
}

impl ClassDecl {
    pub fn name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Identifier)
    }

    /// Signatures and default equations in the indented member block.
    pub fn members(self, tree: &SyntaxTree) -> impl Iterator<Item = NodeId> + '_ {
        tree.children(self.0).iter().copied().filter(|&id| tree.kind(id).is_declaration())
    }
}

impl InstanceDecl {
    /// The class being instantiated, an identifier leaf or a qualified name.
    pub fn class_ref(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.children(self.0).iter().copied().find(|&id| {
            matches!(tree.kind(id), NodeKind::Identifier | NodeKind::QualifiedName)
        })
    }

    pub fn members(self, tree: &SyntaxTree) -> impl Iterator<Item = NodeId> + '_ {
        tree.children(self.0).iter().copied().filter(|&id| tree.kind(id).is_declaration())
    }
}

impl QualifiedName {
    pub fn qualifier_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Qualifier)
    }

    pub fn qualifier(self, tree: &SyntaxTree) -> Option<SmolStr> {
        let id = self.qualifier_node(tree)?;
        tree.text(id).map(SmolStr::new)
    }

    pub fn name_node(self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.child_of_kind(self.0, NodeKind::Identifier)
    }
}
