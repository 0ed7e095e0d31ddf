use cancelling::CancelToken;
use files::{FileId, FileKind};
use indexing::IndexedModule;
use line_index::{LineCol, LineIndex};
use parsing::Position;
use smol_str::SmolStr;
use syntax::TextSize;

use crate::{External, ModuleIndex, NameInfo, NoInfo};

pub(super) fn qualified(
    queries: &impl External,
    index: &impl ModuleIndex,
    file: FileId,
    qualifier: &str,
    name: &str,
    token: &CancelToken,
) -> Result<Vec<NameInfo>, NoInfo> {
    let indexed = queries.indexed(file);
    let Some(import) = indexed.import_for_qualifier(qualifier) else {
        return Err(NoInfo::NoInfoAvailable {
            name: SmolStr::new(name),
            context: format!("no unique import answers to {qualifier}"),
        });
    };
    let module = import.module.clone();
    let infos = in_module(queries, index, &module, name, token)?;
    if token.guard().is_none() {
        return Ok(Vec::new());
    }
    if infos.is_empty() {
        tracing::debug!("No declaration of '{name}' behind qualifier '{qualifier}'");
        return Err(NoInfo::NoInfoAvailable {
            name: SmolStr::new(name),
            context: format!("qualified lookup via {qualifier} in {module}"),
        });
    }
    Ok(infos)
}

pub(super) fn unqualified(
    queries: &impl External,
    index: &impl ModuleIndex,
    file: FileId,
    name: &str,
    token: &CancelToken,
) -> Result<Vec<NameInfo>, NoInfo> {
    let indexed = queries.indexed(file);
    if let Some(own) = own_file_info(queries, file, &indexed, name) {
        return Ok(vec![own]);
    }
    for import in indexed.imports() {
        if !import.exposes(name) {
            continue;
        }
        let infos = in_module(queries, index, &import.module, name, token)?;
        if token.guard().is_none() {
            return Ok(Vec::new());
        }
        if !infos.is_empty() {
            return Ok(infos);
        }
    }
    tracing::debug!("No info available for '{name}'");
    Err(NoInfo::NoInfoAvailable {
        name: SmolStr::new(name),
        context: unqualified_context(queries, file, &indexed),
    })
}

/// Collects infos for every file providing `module`. An unknown module is
/// an empty vec, as is a cancelled walk; callers check the token before
/// reading anything into emptiness.
pub(super) fn in_module(
    queries: &impl External,
    index: &impl ModuleIndex,
    module: &str,
    name: &str,
    token: &CancelToken,
) -> Result<Vec<NameInfo>, NoInfo> {
    let mut infos = Vec::new();
    for file in index.files_for_module(module, token)? {
        if token.guard().is_none() {
            return Ok(Vec::new());
        }
        match queries.kind(file) {
            FileKind::Project => infos.extend(project_info(queries, file, name)),
            FileKind::Library => {
                if !queries.indexed(file).declares(name) {
                    continue;
                }
                let info = NameInfo::Library { module: SmolStr::new(module) };
                if !infos.contains(&info) {
                    infos.push(info);
                }
            }
        }
    }
    Ok(infos)
}

fn own_file_info(
    queries: &impl External,
    file: FileId,
    indexed: &IndexedModule,
    name: &str,
) -> Option<NameInfo> {
    match queries.kind(file) {
        FileKind::Project => project_info(queries, file, name),
        FileKind::Library => {
            if !indexed.declares(name) {
                return None;
            }
            let module = indexed.module_name.clone()?;
            Some(NameInfo::Library { module })
        }
    }
}

/// The declared position of `name` in a project file: the first expression
/// binding when one exists, the first declaration header otherwise.
fn project_info(queries: &impl External, file: FileId, name: &str) -> Option<NameInfo> {
    let indexed = queries.indexed(file);
    let node = indexed.equations(name).first().copied().or_else(|| indexed.headers(name).next())?;
    let parsed = queries.parsed(file);
    let offset = parsed.tree().range(node).start();
    let content = queries.content(file);
    Some(NameInfo::Project {
        file,
        path: queries.path(file),
        position: offset_position(&content, offset),
    })
}

fn offset_position(content: &str, offset: TextSize) -> Position {
    let line_index = LineIndex::new(content);
    let LineCol { line, col } = line_index.line_col(offset);
    Position { line: line + 1, column: col + 1 }
}

fn unqualified_context(queries: &impl External, file: FileId, indexed: &IndexedModule) -> String {
    match &indexed.module_name {
        Some(module) => format!("unqualified lookup in {module}"),
        None => format!("unqualified lookup in {}", queries.path(file)),
    }
}
