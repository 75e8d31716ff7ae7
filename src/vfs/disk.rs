use crate::safety::{normalize, ProjectGuard};
use crate::vfs::errors::TreeError;
use crate::vfs::ignore::IgnoreRules;
use crate::vfs::memory::MemoryTree;
use crate::vfs::{FileTree, Journal, SKIPPED_DIRS};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A project checkout on disk.
///
/// Writes are atomic and confined to the project root by a
/// [`ProjectGuard`]. The root `.gitignore` is read once at construction.
#[derive(Debug)]
pub struct DiskTree {
    guard: ProjectGuard,
    ignore: IgnoreRules,
    journal: Journal,
}

impl DiskTree {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, TreeError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(TreeError::NotADirectory(root.to_path_buf()));
        }
        let guard = ProjectGuard::new(root)?;
        let ignore = fs::read_to_string(guard.project_root().join(".gitignore"))
            .map(|text| IgnoreRules::parse(&text))
            .unwrap_or_default();
        Ok(Self {
            guard,
            ignore,
            journal: Journal::default(),
        })
    }

    pub fn root(&self) -> &Path {
        self.guard.project_root()
    }

    /// Copy every non-ignored UTF-8 file into a [`MemoryTree`].
    pub fn snapshot(&self) -> MemoryTree {
        let mut tree = MemoryTree::new();
        for path in self.files_under(Path::new(".")) {
            match self.read(&path) {
                Some(content) => tree.insert(&path, content),
                None => debug!(path = %path.display(), "skipping unreadable or binary file"),
            }
        }
        tree
    }
}

impl FileTree for DiskTree {
    fn read(&self, path: &Path) -> Option<String> {
        let absolute = self.guard.resolve(path).ok()?;
        fs::read_to_string(absolute).ok()
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), TreeError> {
        let absolute = self.guard.resolve(path)?;
        let before = fs::read_to_string(&absolute).ok();
        if before.as_deref() == Some(content) {
            return Ok(());
        }

        let parent = absolute
            .parent()
            .ok_or_else(|| TreeError::NotADirectory(absolute.clone()))?;
        fs::create_dir_all(parent).map_err(|source| TreeError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
        atomic_write(&absolute, content.as_bytes()).map_err(|source| TreeError::Io {
            path: absolute.clone(),
            source,
        })?;

        self.journal.record(&normalize(path), before);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.guard
            .resolve(path)
            .is_ok_and(|absolute| absolute.is_file())
    }

    fn files_under(&self, dir: &Path) -> Vec<PathBuf> {
        let root = self.root();
        let start = root.join(normalize(dir));
        let mut files: Vec<PathBuf> = WalkDir::new(&start)
            .into_iter()
            .filter_entry(|entry| {
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    return false;
                };
                if relative.as_os_str().is_empty() {
                    return true;
                }
                let is_dir = entry.file_type().is_dir();
                let skipped = is_dir
                    && SKIPPED_DIRS
                        .iter()
                        .any(|skip| entry.file_name() == *skip);
                !skipped && !self.ignore.is_ignored(relative, is_dir)
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
            .collect();
        files.sort();
        files
    }

    fn journal(&self) -> &Journal {
        &self.journal
    }
}

/// Tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
