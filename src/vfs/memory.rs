use crate::safety::normalize;
use crate::vfs::errors::TreeError;
use crate::vfs::ignore::IgnoreRules;
use crate::vfs::{in_skipped_dir, FileTree, Journal};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// In-memory file tree.
///
/// Honors the root `.gitignore` as currently stored in the tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, String>,
    journal: Journal,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(path, content)` pairs without journaling.
    pub fn from_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<Path>,
        C: Into<String>,
    {
        let files = files
            .into_iter()
            .map(|(path, content)| (normalize(path.as_ref()), content.into()))
            .collect();
        Self {
            files,
            journal: Journal::default(),
        }
    }

    /// Insert a file without journaling.
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    fn ignore_rules(&self) -> IgnoreRules {
        self.files
            .get(Path::new(".gitignore"))
            .map(|text| IgnoreRules::parse(text))
            .unwrap_or_default()
    }
}

impl FileTree for MemoryTree {
    fn read(&self, path: &Path) -> Option<String> {
        self.files.get(&normalize(path)).cloned()
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), TreeError> {
        let path = normalize(path);
        let before = self.files.get(&path).cloned();
        self.journal.record(&path, before);
        self.files.insert(path, content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn files_under(&self, dir: &Path) -> Vec<PathBuf> {
        let dir = normalize(dir);
        let rules = self.ignore_rules();
        self.files
            .keys()
            .filter(|path| path.starts_with(&dir))
            .filter(|path| !in_skipped_dir(path) && !rules.is_ignored(path, false))
            .cloned()
            .collect()
    }

    fn journal(&self) -> &Journal {
        &self.journal
    }
}

/// A [`MemoryTree`] that refuses writes to some paths.
#[cfg(test)]
pub(crate) struct RefusingTree {
    pub inner: MemoryTree,
    pub refused: Vec<PathBuf>,
}

#[cfg(test)]
impl FileTree for RefusingTree {
    fn read(&self, path: &Path) -> Option<String> {
        self.inner.read(path)
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), TreeError> {
        let path = normalize(path);
        if self.refused.contains(&path) {
            return Err(TreeError::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.write(&path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn files_under(&self, dir: &Path) -> Vec<PathBuf> {
        self.inner.files_under(dir)
    }

    fn journal(&self) -> &Journal {
        self.inner.journal()
    }
}
