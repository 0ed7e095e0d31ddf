//! Locating identifier nodes from external coordinates.
//!
//! Positions arriving from resolvers and editors are 1-based and do not
//! always land exactly on the identifier they mean, so lookup by location
//! recovers through a sequence of widening strategies.

use cancelling::CancelToken;
use files::FileId;
use line_index::{LineCol, LineIndex};
use querying::QueryEngine;
use resolving::ModuleIndex;
use syntax::{NodeId, NodeKind, SyntaxTree, TextSize, ast};

/// Converts a 1-based line and column into a byte offset, clamping the
/// column to the end of its line.
pub fn position_to_offset(content: &str, line: u32, column: u32) -> Option<TextSize> {
    let line_index = LineIndex::new(content);
    let line = line.checked_sub(1)?;
    let column = column.checked_sub(1)?;
    let range = line_index.line(line)?;
    let text = content[range].trim_end_matches(['\n', '\r']);
    let col = column.min(text.len() as u32);
    line_index.offset(LineCol { line, col })
}

/// Declaration sites of `name` across the files providing `module`, project
/// files first. Library files answer from declaration headers only; project
/// files prefer expression bindings and fall back to headers.
pub fn identifiers_by_module_name(
    engine: &QueryEngine,
    index: &impl ModuleIndex,
    module: &str,
    name: &str,
    token: &CancelToken,
) -> Vec<(FileId, NodeId)> {
    let Ok(files) = index.files_for_module(module, token) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for file in files {
        if token.guard().is_none() {
            return Vec::new();
        }
        let indexed = engine.indexed(file);
        if engine.file_kind(file).is_library() {
            found.extend(indexed.headers(name).map(|node| (file, node)));
        } else if indexed.equations(name).is_empty() {
            found.extend(indexed.headers(name).map(|node| (file, node)));
        } else {
            found.extend(indexed.equations(name).iter().map(|&node| (file, node)));
        }
    }
    found
}

/// The identifier node meant by a 1-based position in `file`.
///
/// The offset rarely lands exactly on the right leaf, so recovery widens
/// step by step: the named element at the position itself, any matching
/// identifier inside the outermost enclosing declaration, the name of an
/// enclosing qualified name, and finally the name list of an enclosing
/// type signature. The first exact name match wins.
pub fn identifier_by_location(
    engine: &QueryEngine,
    file: FileId,
    line: u32,
    column: u32,
    name: &str,
    token: &CancelToken,
) -> Option<NodeId> {
    token.guard()?;
    let content = engine.content(file);
    let parsed = engine.parsed(file);
    let tree = parsed.tree();
    let offset = position_to_offset(&content, line, column)?;
    let node = tree.node_at_offset(offset)?;
    named_element_at(tree, node, name)
        .or_else(|| declaration_identifier(tree, node, name))
        .or_else(|| qualified_name_identifier(tree, node, name))
        .or_else(|| signature_list_identifier(tree, node, name))
}

fn named_element_at(tree: &SyntaxTree, node: NodeId, name: &str) -> Option<NodeId> {
    tree.ancestors(node).find(|&id| tree.kind(id).is_named_leaf() && tree.text(id) == Some(name))
}

fn declaration_identifier(tree: &SyntaxTree, node: NodeId, name: &str) -> Option<NodeId> {
    let declaration = tree.ancestors(node).filter(|&id| tree.kind(id).is_declaration()).last()?;
    tree.descendants(declaration)
        .find(|&id| tree.kind(id) == NodeKind::Identifier && tree.text(id) == Some(name))
}

fn qualified_name_identifier(tree: &SyntaxTree, node: NodeId, name: &str) -> Option<NodeId> {
    let qualified = tree.enclosing_of_kind(node, NodeKind::QualifiedName)?;
    let identifier = ast::QualifiedName::cast(tree, qualified)?.name_node(tree)?;
    (tree.text(identifier) == Some(name)).then_some(identifier)
}

fn signature_list_identifier(tree: &SyntaxTree, node: NodeId, name: &str) -> Option<NodeId> {
    let signature = tree.enclosing_of_kind(node, NodeKind::TypeSignature)?;
    let signature = ast::TypeSignature::cast(tree, signature)?;
    signature.names(tree).find(|&id| tree.text(id) == Some(name))
}
