use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use syntax::{NodeId, NodeKind, SyntaxTree, ast};

use crate::{HeaderName, Import};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Site {
    TopLevel,
    Class,
    Instance,
}

#[derive(Debug, Default)]
pub(super) struct State {
    pub(super) imports: Vec<Import>,
    pub(super) equations: FxHashMap<SmolStr, Vec<NodeId>>,
    pub(super) headers: FxHashMap<SmolStr, Vec<HeaderName>>,
}

impl State {
    fn add_header(&mut self, tree: &SyntaxTree, node: NodeId, class_site: bool) {
        let Some(name) = tree.text(node) else {
            return;
        };
        self.headers
            .entry(SmolStr::new(name))
            .or_default()
            .push(HeaderName { node, class_site });
    }

    fn add_equation(&mut self, tree: &SyntaxTree, node: NodeId) {
        let Some(name) = tree.text(node) else {
            return;
        };
        self.equations.entry(SmolStr::new(name)).or_default().push(node);
    }
}

pub(super) fn index_module(tree: &SyntaxTree, module: ast::Module) -> State {
    let mut state = State::default();
    for import in module.imports(tree) {
        index_import(&mut state, tree, import);
    }
    for declaration in module.declarations(tree) {
        index_declaration(&mut state, tree, declaration, Site::TopLevel);
    }
    // Class declarations outrank instance re-declarations; the sort is
    // stable, so source order survives within each group.
    for names in state.headers.values_mut() {
        names.sort_by_key(|name| !name.class_site);
    }
    state
}

fn index_import(state: &mut State, tree: &SyntaxTree, decl: ast::ImportDecl) {
    let Some(module_node) = decl.module_name_node(tree) else {
        return;
    };
    let Some(module) = tree.text(module_node).map(SmolStr::new) else {
        return;
    };
    let has_list = tree.child_of_kind(decl.id(), NodeKind::ImportList).is_some()
        || tree.child_of_kind(decl.id(), NodeKind::HidingList).is_some();
    state.imports.push(Import {
        node: decl.id(),
        module,
        module_node,
        alias: decl.alias(tree),
        alias_node: decl.alias_node(tree),
        qualified: decl.is_qualified(tree),
        hiding: decl.is_hiding(tree),
        items: has_list.then(|| decl.item_names(tree)),
    });
}

fn index_declaration(state: &mut State, tree: &SyntaxTree, id: NodeId, site: Site) {
    match tree.kind(id) {
        NodeKind::TypeSignature => {
            let signature = ast::TypeSignature::cast(tree, id)
                .expect("invariant violated: expected TypeSignature");
            for name in signature.names(tree) {
                state.add_header(tree, name, site == Site::Class);
            }
        }
        NodeKind::ValueEquation => {
            let equation = ast::ValueEquation::cast(tree, id)
                .expect("invariant violated: expected ValueEquation");
            let Some(name) = equation.name_node(tree) else {
                return;
            };
            match site {
                Site::TopLevel => state.add_equation(tree, name),
                Site::Class => state.add_header(tree, name, true),
                Site::Instance => state.add_header(tree, name, false),
            }
        }
        NodeKind::DataDecl => {
            let data =
                ast::DataDecl::cast(tree, id).expect("invariant violated: expected DataDecl");
            if let Some(name) = data.name_node(tree) {
                state.add_header(tree, name, false);
            }
            for constructor in data.constructors(tree) {
                state.add_header(tree, constructor, false);
            }
        }
        NodeKind::NewtypeDecl => {
            let newtype =
                ast::NewtypeDecl::cast(tree, id).expect("invariant violated: expected NewtypeDecl");
            if let Some(name) = newtype.name_node(tree) {
                state.add_header(tree, name, false);
            }
            for constructor in newtype.constructors(tree) {
                state.add_header(tree, constructor, false);
            }
        }
        NodeKind::TypeSynonym => {
            let synonym =
                ast::TypeSynonym::cast(tree, id).expect("invariant violated: expected TypeSynonym");
            if let Some(name) = synonym.name_node(tree) {
                state.add_header(tree, name, false);
            }
        }
        NodeKind::ClassDecl => {
            let class =
                ast::ClassDecl::cast(tree, id).expect("invariant violated: expected ClassDecl");
            if let Some(name) = class.name_node(tree) {
                state.add_header(tree, name, true);
            }
            for member in class.members(tree) {
                index_declaration(state, tree, member, Site::Class);
            }
        }
        NodeKind::InstanceDecl => {
            let instance = ast::InstanceDecl::cast(tree, id)
                .expect("invariant violated: expected InstanceDecl");
            for member in instance.members(tree) {
                index_declaration(state, tree, member, Site::Instance);
            }
        }
        _ => {}
    }
}
