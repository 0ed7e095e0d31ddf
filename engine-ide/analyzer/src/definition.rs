//! Reference resolution: from an occurrence in a tree to its definition.

use cancelling::CancelToken;
use files::FileId;
use resolving::{ModuleIndex, NameInfo, NoInfo};
use syntax::{NodeId, NodeKind, SyntaxTree, ast};

use crate::{Analyzer, locate};

/// The outcome of resolving a reference occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A node in some file's tree.
    Element { file: FileId, node: NodeId },
    /// A whole file, for references to a module.
    File { file: FileId },
    /// The lookup ran to completion and failed in a way worth reporting.
    Failed(NoInfo),
}

/// How an occurrence participates in a reference. Dispatch follows the
/// variant order: module ids first, then qualifiers, then plain names.
enum Occurrence {
    ModuleId(NodeId),
    Qualifier(NodeId),
    Name(NodeId),
    Other,
}

fn classify(tree: &SyntaxTree, node: NodeId) -> Occurrence {
    match tree.kind(node) {
        NodeKind::ModuleName => Occurrence::ModuleId(node),
        NodeKind::Qualifier => Occurrence::Qualifier(node),
        NodeKind::Identifier => Occurrence::Name(node),
        _ => Occurrence::Other,
    }
}

/// Resolves the reference occurrence at `node` in `file`.
///
/// `None` means the node is not a reference, nothing was found, or the
/// request was cancelled; failures worth reporting come back as
/// [`Resolution::Failed`].
pub fn resolve(
    analyzer: &Analyzer,
    file: FileId,
    node: NodeId,
    token: &CancelToken,
) -> Option<Resolution> {
    token.guard()?;
    let parsed = analyzer.engine.parsed(file);
    let tree = parsed.tree();
    match classify(tree, node) {
        Occurrence::ModuleId(node) => {
            let module = tree.text(node)?;
            module_resolution(analyzer, module, token)
        }
        Occurrence::Qualifier(node) => qualifier_resolution(analyzer, file, tree, node, token),
        Occurrence::Name(node) => name_resolution(analyzer, file, tree, node, token),
        Occurrence::Other => None,
    }
}

/// Resolves whatever reference occurrence sits at a 1-based position.
pub fn resolve_at(
    analyzer: &Analyzer,
    file: FileId,
    line: u32,
    column: u32,
    token: &CancelToken,
) -> Option<Resolution> {
    token.guard()?;
    let content = analyzer.engine.content(file);
    let parsed = analyzer.engine.parsed(file);
    let tree = parsed.tree();
    let offset = locate::position_to_offset(&content, line, column)?;
    let node = tree.node_at_offset(offset)?;
    resolve(analyzer, file, node, token)
}

fn module_resolution(
    analyzer: &Analyzer,
    module: &str,
    token: &CancelToken,
) -> Option<Resolution> {
    match analyzer.engine.files_for_module(module, token) {
        Ok(files) => {
            token.guard()?;
            let file = files.first().copied()?;
            Some(Resolution::File { file })
        }
        Err(error) => Some(Resolution::Failed(error)),
    }
}

fn qualifier_resolution(
    analyzer: &Analyzer,
    file: FileId,
    tree: &SyntaxTree,
    node: NodeId,
    token: &CancelToken,
) -> Option<Resolution> {
    let qualifier = tree.text(node)?;
    let indexed = analyzer.engine.indexed(file);
    if let Some(import) = indexed.import_for_qualifier(qualifier) {
        return Some(Resolution::Element { file, node: import.qualifier_target() });
    }
    tracing::debug!("No unique import answers to '{qualifier}'; resolving it as a module");
    module_resolution(analyzer, qualifier, token)
}

fn name_resolution(
    analyzer: &Analyzer,
    file: FileId,
    tree: &SyntaxTree,
    node: NodeId,
    token: &CancelToken,
) -> Option<Resolution> {
    let name = tree.text(node)?;

    // A name inside an import declaration points into the imported module.
    if let Some(decl) = tree.enclosing_of_kind(node, NodeKind::ImportDecl) {
        let indexed = analyzer.engine.indexed(file);
        let import = indexed.imports().iter().find(|import| import.node == decl)?;
        return member_resolution(analyzer, &import.module, name, token);
    }

    // The name part of `M.foo` resolves under its qualifier.
    if let Some(parent) = tree.parent(node).filter(|&id| tree.kind(id) == NodeKind::QualifiedName)
    {
        let qualifier = ast::QualifiedName::cast(tree, parent)?.qualifier(tree)?;
        return name_lookup(analyzer, file, Some(&qualifier), name, token);
    }

    // A name declared by a type signature belongs to the equation that
    // follows; the ordinary lookup below stands in when none does.
    if let Some(signature) = naming_signature(tree, node) {
        tracing::debug!("'{name}' names a signature; scanning forward for its equation");
        if let Some(found) = next_equation_name(tree, signature, name) {
            return Some(Resolution::Element { file, node: found });
        }
    }

    name_lookup(analyzer, file, None, name, token)
}

/// The enclosing type signature, provided `node` is one of the names it
/// declares rather than part of its type.
fn naming_signature(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let signature = tree.enclosing_of_kind(node, NodeKind::TypeSignature)?;
    let names = ast::TypeSignature::cast(tree, signature)?;
    names.names(tree).any(|id| id == node).then_some(signature)
}

/// The declared name of the next equation following `signature`, when it
/// matches `name` exactly.
fn next_equation_name(tree: &SyntaxTree, signature: NodeId, name: &str) -> Option<NodeId> {
    let equation = tree
        .following_siblings(signature)
        .find(|&id| tree.kind(id) == NodeKind::ValueEquation)?;
    let identifier = ast::ValueEquation::cast(tree, equation)?.name_node(tree)?;
    (tree.text(identifier) == Some(name)).then_some(identifier)
}

/// Occurrence-relative lookup: the file's own declarations and imports
/// decide where `name` comes from.
fn name_lookup(
    analyzer: &Analyzer,
    file: FileId,
    qualifier: Option<&str>,
    name: &str,
    token: &CancelToken,
) -> Option<Resolution> {
    let infos = match resolving::name_infos(
        &analyzer.engine,
        &analyzer.engine,
        file,
        qualifier,
        name,
        token,
    ) {
        Ok(infos) => infos,
        Err(error) => return Some(Resolution::Failed(error)),
    };
    token.guard()?;
    infos
        .iter()
        .find_map(|info| info_element(analyzer, info, name, token))
        .map(|(file, node)| Resolution::Element { file, node })
}

/// Module-direct lookup, used for names that sit inside import lists.
fn member_resolution(
    analyzer: &Analyzer,
    module: &str,
    name: &str,
    token: &CancelToken,
) -> Option<Resolution> {
    let infos = match resolving::module_name_infos(
        &analyzer.engine,
        &analyzer.engine,
        module,
        name,
        token,
    ) {
        Ok(infos) => infos,
        Err(error) => return Some(Resolution::Failed(error)),
    };
    token.guard()?;
    infos
        .iter()
        .find_map(|info| info_element(analyzer, info, name, token))
        .map(|(file, node)| Resolution::Element { file, node })
}

/// Turns one name info into a concrete tree node: project infos land on
/// their recorded position, library infos on the module's headers.
pub(crate) fn info_element(
    analyzer: &Analyzer,
    info: &NameInfo,
    name: &str,
    token: &CancelToken,
) -> Option<(FileId, NodeId)> {
    match info {
        NameInfo::Project { file, position, .. } => {
            let node = locate::identifier_by_location(
                &analyzer.engine,
                *file,
                position.line,
                position.column,
                name,
                token,
            )?;
            Some((*file, node))
        }
        NameInfo::Library { module } => {
            let engine = &analyzer.engine;
            locate::identifiers_by_module_name(engine, engine, module, name, token)
                .into_iter()
                .next()
        }
    }
}
