//! Per-file declaration index.
//!
//! Separates the two shapes a name can be declared in: top-level expression
//! bindings (value equations), and declaration headers (signatures, data and
//! class heads, constructors, class and instance members). Imports are kept
//! in source order with their filtering lists.

mod algorithm;

use parsing::ParsedModule;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use syntax::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The `ImportDecl` node.
    pub node: NodeId,
    pub module: SmolStr,
    pub module_node: NodeId,
    pub alias: Option<SmolStr>,
    pub alias_node: Option<NodeId>,
    pub qualified: bool,
    pub hiding: bool,
    /// `None` when the import has no list at all.
    pub items: Option<Vec<SmolStr>>,
}

impl Import {
    /// The name this import answers to in qualified references.
    pub fn effective_qualifier(&self) -> &SmolStr {
        self.alias.as_ref().unwrap_or(&self.module)
    }

    /// The node a qualifier occurrence resolves to: the alias when present,
    /// the module id otherwise.
    pub fn qualifier_target(&self) -> NodeId {
        self.alias_node.unwrap_or(self.module_node)
    }

    /// Whether `name` comes through this import, honoring explicit item
    /// lists and hiding lists.
    pub fn exposes(&self, name: &str) -> bool {
        match &self.items {
            None => true,
            Some(listed) => {
                let mentioned = listed.iter().any(|item| item == name);
                if self.hiding { !mentioned } else { mentioned }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderName {
    pub(crate) node: NodeId,
    pub(crate) class_site: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IndexedModule {
    pub module_name: Option<SmolStr>,
    imports: Vec<Import>,
    equations: FxHashMap<SmolStr, Vec<NodeId>>,
    headers: FxHashMap<SmolStr, Vec<HeaderName>>,
}

impl IndexedModule {
    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// The unique import answering to `qualifier`: alias matches first, then
    /// the bare module name of a qualified import. `None` when no import
    /// matches, or when more than one does.
    pub fn import_for_qualifier(&self, qualifier: &str) -> Option<&Import> {
        let mut aliased =
            self.imports.iter().filter(|import| import.alias.as_deref() == Some(qualifier));
        if let Some(import) = aliased.next() {
            return aliased.next().is_none().then_some(import);
        }
        let mut bare = self.imports.iter().filter(|import| {
            import.qualified && import.alias.is_none() && import.module == qualifier
        });
        let import = bare.next()?;
        bare.next().is_none().then_some(import)
    }

    /// Top-level expression bindings for `name`, in source order.
    pub fn equations(&self, name: &str) -> &[NodeId] {
        self.equations.get(name).map_or(&[], |nodes| nodes.as_slice())
    }

    /// Declaration-header occurrences of `name`. Names declared by a class
    /// come before instance re-declarations and everything else.
    pub fn headers(&self, name: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.headers.get(name).into_iter().flatten().map(|header| header.node)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.equations.contains_key(name) || self.headers.contains_key(name)
    }
}

pub fn index_module(parsed: &ParsedModule) -> IndexedModule {
    let tree = parsed.tree();
    let algorithm::State { imports, equations, headers } =
        algorithm::index_module(tree, parsed.module());
    IndexedModule { module_name: parsed.module_name(), imports, equations, headers }
}
