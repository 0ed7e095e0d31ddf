//! Resolution of a name occurrence to where its declaration lives.
//!
//! An occurrence is resolved relative to the file it appears in: an optional
//! import qualifier narrows the search to a single import, otherwise the file
//! itself is consulted first and its imports after, in source order. The
//! outcome distinguishes project declarations, which carry an exact file
//! position, from library modules, which are navigable by module name only.

mod algorithm;
mod error;

pub use error::*;

use std::sync::Arc;

use cancelling::CancelToken;
use files::{FileId, FileKind};
use indexing::IndexedModule;
use parsing::{ParsedModule, Position};
use smol_str::SmolStr;

/// External dependencies used in name-info resolution.
pub trait External {
    fn kind(&self, id: FileId) -> FileKind;

    fn path(&self, id: FileId) -> Arc<str>;

    fn content(&self, id: FileId) -> Arc<str>;

    fn parsed(&self, id: FileId) -> Arc<ParsedModule>;

    fn indexed(&self, id: FileId) -> Arc<IndexedModule>;
}

/// Maps module names onto the files that provide them.
pub trait ModuleIndex {
    /// An empty vec means the module is unknown but the index answered;
    /// `Err` means the index itself could not be queried. Project files
    /// come before library files.
    fn files_for_module(&self, module: &str, token: &CancelToken) -> Result<Vec<FileId>, NoInfo>;
}

/// Where a declaration physically lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameInfo {
    /// Declared by a project source file at a 1-based position.
    Project { file: FileId, path: Arc<str>, position: Position },
    /// Provided by a library module; library sources carry no position.
    Library { module: SmolStr },
}

/// Resolves `name` as it occurs in `file`, optionally behind a qualifier.
///
/// Cancellation aborts with an empty `Ok`. A lookup that ran to completion
/// without finding anything reports `NoInfo::NoInfoAvailable`, so callers
/// can tell a miss apart from an abandoned request.
pub fn name_infos(
    queries: &impl External,
    index: &impl ModuleIndex,
    file: FileId,
    qualifier: Option<&str>,
    name: &str,
    token: &CancelToken,
) -> Result<Vec<NameInfo>, NoInfo> {
    if token.guard().is_none() {
        return Ok(Vec::new());
    }
    match qualifier {
        Some(qualifier) => algorithm::qualified(queries, index, file, qualifier, name, token),
        None => algorithm::unqualified(queries, index, file, name, token),
    }
}

/// Resolves `name` directly against a module, with no occurrence context.
pub fn module_name_infos(
    queries: &impl External,
    index: &impl ModuleIndex,
    module: &str,
    name: &str,
    token: &CancelToken,
) -> Result<Vec<NameInfo>, NoInfo> {
    if token.guard().is_none() {
        return Ok(Vec::new());
    }
    algorithm::in_module(queries, index, module, name, token)
}
