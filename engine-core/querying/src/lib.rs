//! In-memory storage and caching for workspace files.
//!
//! The engine holds file contents as inputs and derives parses and indexes
//! on demand, caching them until the file's text changes. Queries take
//! `&self` and go through a read-write lock, so concurrent readers share
//! the same derived values. Writing a file's text drops its cached parse
//! and index and re-registers it in the module map.

use std::sync::Arc;

use cancelling::CancelToken;
use files::{FileId, FileKind, Files};
use indexing::{IndexedModule, index_module};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use parsing::{ParsedModule, parse};
use resolving::{External, ModuleIndex, NoInfo};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

#[derive(Default)]
struct Storage {
    files: Files,
    content: FxHashMap<FileId, Arc<str>>,
    parsed: FxHashMap<FileId, Arc<ParsedModule>>,
    indexed: FxHashMap<FileId, Arc<IndexedModule>>,
    modules: FxHashMap<SmolStr, Vec<FileId>>,
}

/// Parses `id` from the cache, or from its content when the cache is cold.
/// The caller decides whether the result is worth storing.
fn cached_or_parse(storage: &Storage, id: FileId) -> Arc<ParsedModule> {
    match storage.parsed.get(&id) {
        Some(parsed) => Arc::clone(parsed),
        None => {
            let content =
                storage.content.get(&id).expect("invariant violated: file content not set");
            Arc::new(parse(content))
        }
    }
}

/// Re-registers `id` in the module map after its text changed, keeping the
/// parse paid for along the way.
fn refresh_module(storage: &mut Storage, id: FileId) {
    for files in storage.modules.values_mut() {
        files.retain(|&file| file != id);
    }
    storage.modules.retain(|_, files| !files.is_empty());
    let parsed = cached_or_parse(storage, id);
    if let Some(module) = parsed.module_name() {
        storage.modules.entry(module).or_default().push(id);
    }
    storage.parsed.insert(id, parsed);
}

#[derive(Default)]
pub struct QueryEngine {
    storage: RwLock<Storage>,
}

impl QueryEngine {
    pub fn new() -> QueryEngine {
        QueryEngine::default()
    }

    /// Registers a file with its initial text. Inserting a known path again
    /// behaves like [`QueryEngine::set_file_text`]; the kind of an existing
    /// file does not change.
    pub fn insert_file(&self, path: &str, kind: FileKind, text: &str) -> FileId {
        let mut storage = self.storage.write();
        let id = storage.files.insert(path, kind);
        storage.content.insert(id, Arc::from(text));
        storage.parsed.remove(&id);
        storage.indexed.remove(&id);
        refresh_module(&mut storage, id);
        id
    }

    /// Replaces a file's text, invalidating its cached parse and index and
    /// updating the module map.
    pub fn set_file_text(&self, id: FileId, text: &str) {
        let mut storage = self.storage.write();
        storage.content.insert(id, Arc::from(text));
        storage.parsed.remove(&id);
        storage.indexed.remove(&id);
        refresh_module(&mut storage, id);
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.storage.read().files.id(path)
    }

    pub fn file_path(&self, id: FileId) -> Arc<str> {
        Arc::from(self.storage.read().files.path(id))
    }

    pub fn file_kind(&self, id: FileId) -> FileKind {
        self.storage.read().files.kind(id)
    }

    pub fn content(&self, id: FileId) -> Arc<str> {
        let storage = self.storage.read();
        let content = storage.content.get(&id).expect("invariant violated: file content not set");
        Arc::clone(content)
    }

    pub fn parsed(&self, id: FileId) -> Arc<ParsedModule> {
        let storage = self.storage.upgradable_read();
        if let Some(parsed) = storage.parsed.get(&id) {
            return Arc::clone(parsed);
        }
        let parsed = cached_or_parse(&storage, id);
        let mut storage = RwLockUpgradableReadGuard::upgrade(storage);
        storage.parsed.insert(id, Arc::clone(&parsed));
        parsed
    }

    pub fn indexed(&self, id: FileId) -> Arc<IndexedModule> {
        let storage = self.storage.upgradable_read();
        if let Some(indexed) = storage.indexed.get(&id) {
            return Arc::clone(indexed);
        }
        let parsed = cached_or_parse(&storage, id);
        let indexed = Arc::new(index_module(&parsed));
        let mut storage = RwLockUpgradableReadGuard::upgrade(storage);
        storage.parsed.entry(id).or_insert_with(|| Arc::clone(&parsed));
        storage.indexed.insert(id, Arc::clone(&indexed));
        indexed
    }

    /// All files registered under `module`, project files before library
    /// files; registration order survives within each kind.
    pub fn module_files(&self, module: &str) -> Vec<FileId> {
        let storage = self.storage.read();
        let Some(files) = storage.modules.get(module) else {
            return Vec::new();
        };
        let (mut project, library): (Vec<_>, Vec<_>) =
            files.iter().copied().partition(|&id| !storage.files.kind(id).is_library());
        project.extend(library);
        project
    }
}

impl External for QueryEngine {
    fn kind(&self, id: FileId) -> FileKind {
        QueryEngine::file_kind(self, id)
    }

    fn path(&self, id: FileId) -> Arc<str> {
        QueryEngine::file_path(self, id)
    }

    fn content(&self, id: FileId) -> Arc<str> {
        QueryEngine::content(self, id)
    }

    fn parsed(&self, id: FileId) -> Arc<ParsedModule> {
        QueryEngine::parsed(self, id)
    }

    fn indexed(&self, id: FileId) -> Arc<IndexedModule> {
        QueryEngine::indexed(self, id)
    }
}

impl ModuleIndex for QueryEngine {
    fn files_for_module(&self, module: &str, token: &CancelToken) -> Result<Vec<FileId>, NoInfo> {
        if token.guard().is_none() {
            return Ok(Vec::new());
        }
        Ok(self.module_files(module))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cancelling::CancelToken;
    use files::FileKind;
    use resolving::ModuleIndex;

    use super::QueryEngine;

    #[test]
    fn queries_share_cached_values() {
        let engine = QueryEngine::new();
        let id = engine.insert_file("src/Main.hs", FileKind::Project, "module Main where\n");

        let parsed_a = engine.parsed(id);
        let parsed_b = engine.parsed(id);
        assert!(Arc::ptr_eq(&parsed_a, &parsed_b));

        let indexed_a = engine.indexed(id);
        let indexed_b = engine.indexed(id);
        assert!(Arc::ptr_eq(&indexed_a, &indexed_b));
    }

    #[test]
    fn set_file_text_invalidates_derived_values() {
        let engine = QueryEngine::new();
        let id = engine.insert_file("src/Main.hs", FileKind::Project, "module Main where\n");

        let before = engine.parsed(id);
        let indexed_before = engine.indexed(id);
        engine.set_file_text(id, "module Main where\n\nlife = 42\n");

        let after = engine.parsed(id);
        assert!(!Arc::ptr_eq(&before, &after));
        let indexed_after = engine.indexed(id);
        assert!(!Arc::ptr_eq(&indexed_before, &indexed_after));
        assert!(indexed_after.declares("life"));
    }

    #[test]
    fn module_map_follows_header_changes() {
        let engine = QueryEngine::new();
        let id = engine.insert_file("src/A.hs", FileKind::Project, "module A where\n");
        assert_eq!(engine.module_files("A"), vec![id]);

        engine.set_file_text(id, "module B where\n");
        assert_eq!(engine.module_files("A"), Vec::new());
        assert_eq!(engine.module_files("B"), vec![id]);
    }

    #[test]
    fn module_files_put_project_files_first() {
        let engine = QueryEngine::new();
        let library =
            engine.insert_file("lib/Data/List.hs", FileKind::Library, "module Data.List where\n");
        let project =
            engine.insert_file("src/Data/List.hs", FileKind::Project, "module Data.List where\n");

        assert_eq!(engine.module_files("Data.List"), vec![project, library]);
    }

    #[test]
    fn files_for_module_honours_cancellation() {
        let engine = QueryEngine::new();
        engine.insert_file("src/A.hs", FileKind::Project, "module A where\n");

        let token = CancelToken::new();
        token.cancel();
        assert_eq!(engine.files_for_module("A", &token), Ok(Vec::new()));
    }
}
