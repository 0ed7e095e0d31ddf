//! Path and identity bookkeeping for project and library source files.

use indexmap::IndexMap;
use la_arena::{Arena, Idx};
use rustc_hash::FxBuildHasher;

/// Whether a file belongs to the project or to an attached dependency.
///
/// Library sources are navigable but carry no live expression-level
/// information, which restricts how identifiers are searched within them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Project,
    Library,
}

impl FileKind {
    pub fn is_library(self) -> bool {
        matches!(self, FileKind::Library)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FileData {
    path: String,
    kind: FileKind,
}

pub type FileId = Idx<FileData>;

/// Registry of known files, preserving registration order.
#[derive(Debug, Default)]
pub struct Files {
    arena: Arena<FileData>,
    by_path: IndexMap<String, FileId, FxBuildHasher>,
}

impl Files {
    /// Registers a path, returning the existing id if it is already known.
    /// The kind of an already-registered file is not changed.
    pub fn insert(&mut self, path: impl Into<String>, kind: FileKind) -> FileId {
        let path = path.into();
        if let Some(&id) = self.by_path.get(&path) {
            return id;
        }
        let id = self.arena.alloc(FileData { path: path.clone(), kind });
        self.by_path.insert(path, id);
        id
    }

    pub fn id(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    pub fn path(&self, id: FileId) -> &str {
        &self.arena[id].path
    }

    pub fn kind(&self, id: FileId) -> FileKind {
        self.arena[id].kind
    }

    pub fn iter_id(&self) -> impl Iterator<Item = FileId> + '_ {
        self.arena.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileKind, Files};

    #[test]
    fn insert_is_idempotent() {
        let mut files = Files::default();
        let a = files.insert("src/Main.hs", FileKind::Project);
        let b = files.insert("src/Main.hs", FileKind::Library);
        assert_eq!(a, b);
        assert_eq!(files.kind(a), FileKind::Project);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn lookup_round_trip() {
        let mut files = Files::default();
        let id = files.insert("lib/Data/List.hs", FileKind::Library);
        assert_eq!(files.id("lib/Data/List.hs"), Some(id));
        assert_eq!(files.path(id), "lib/Data/List.hs");
        assert!(files.kind(id).is_library());
    }

    #[test]
    fn iteration_preserves_registration_order() {
        let mut files = Files::default();
        let a = files.insert("A.hs", FileKind::Project);
        let b = files.insert("B.hs", FileKind::Project);
        let c = files.insert("C.hs", FileKind::Library);
        let collected: Vec<_> = files.iter_id().collect();
        assert_eq!(collected, vec![a, b, c]);
    }
}
