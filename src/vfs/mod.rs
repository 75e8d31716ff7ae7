//! Project file trees.
//!
//! Everything above this module sees a project only through [`FileTree`]:
//! project-relative paths mapped to text. [`MemoryTree`] backs tests and dry
//! runs, [`DiskTree`] a real checkout.

pub mod disk;
pub mod errors;
pub mod ignore;
pub mod memory;

pub use disk::DiskTree;
pub use errors::TreeError;
pub use ignore::IgnoreRules;
pub use memory::MemoryTree;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directories never traversed.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Path-keyed text store.
pub trait FileTree {
    /// Text of a file, `None` when absent or unreadable.
    fn read(&self, path: &Path) -> Option<String>;

    fn write(&mut self, path: &Path, content: &str) -> Result<(), TreeError>;

    fn exists(&self, path: &Path) -> bool;

    /// Every non-ignored file under `dir`, sorted.
    fn files_under(&self, dir: &Path) -> Vec<PathBuf>;

    /// Original contents of every file written so far.
    fn journal(&self) -> &Journal;

    fn visit(&self, dir: &Path, visitor: &mut dyn FnMut(&Path)) {
        for file in self.files_under(dir) {
            visitor(&file);
        }
    }

    /// Files whose content differs from before the first write.
    fn changes(&self) -> Vec<FileChange> {
        self.journal()
            .entries()
            .filter_map(|(path, before)| {
                let after = self.read(path)?;
                (before.as_deref() != Some(after.as_str())).then(|| FileChange {
                    path: path.to_path_buf(),
                    before: before.clone(),
                    after,
                })
            })
            .collect()
    }
}

/// One modified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    /// `None` for files created during the run
    pub before: Option<String>,
    pub after: String,
}

/// First-write record of original file contents.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    originals: BTreeMap<PathBuf, Option<String>>,
}

impl Journal {
    /// Record `before` unless `path` was already recorded.
    pub fn record(&mut self, path: &Path, before: Option<String>) {
        self.originals.entry(path.to_path_buf()).or_insert(before);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Path, &Option<String>)> {
        self.originals
            .iter()
            .map(|(path, before)| (path.as_path(), before))
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

/// Whether any component of a relative path is a skipped directory.
pub(crate) fn in_skipped_dir(path: &Path) -> bool {
    path.components()
        .any(|c| SKIPPED_DIRS.iter().any(|dir| c.as_os_str() == *dir))
}
