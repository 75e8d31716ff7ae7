use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directories no migration may write into.
const FORBIDDEN_DIRS: &[&str] = &["node_modules", ".git"];

/// Project boundary checks to prevent writing outside the migrated project.
#[derive(Debug, Clone)]
pub struct ProjectGuard {
    /// Canonical path to project root
    project_root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside the project: {path} (project: {project})")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("path is in forbidden directory '{dir}': {path}")]
    ForbiddenPath { path: PathBuf, dir: String },

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// Leading `..` components that cannot be folded are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

impl ProjectGuard {
    /// Create a guard for the given project root.
    ///
    /// The root is canonicalized to handle symlinks correctly.
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Ok(Self {
            project_root: project_root.as_ref().canonicalize()?,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve a project-relative (or absolute) path and check it is safe to
    /// write.
    ///
    /// The check is lexical so it works for files that do not exist yet;
    /// existing files are additionally canonicalized to catch symlink escapes.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = normalize(&self.project_root.join(path));
        self.check(&absolute)?;

        if absolute.exists() {
            let canonical = absolute.canonicalize()?;
            self.check(&canonical)?;
        }
        Ok(absolute)
    }

    /// Path relative to the project root, if inside it.
    pub fn relative(&self, absolute: &Path) -> Option<PathBuf> {
        absolute
            .strip_prefix(&self.project_root)
            .ok()
            .map(Path::to_path_buf)
    }

    fn check(&self, absolute: &Path) -> Result<(), SafetyError> {
        let Ok(relative) = absolute.strip_prefix(&self.project_root) else {
            return Err(SafetyError::OutsideProject {
                path: absolute.to_path_buf(),
                project: self.project_root.clone(),
            });
        };

        for component in relative.components() {
            if let Component::Normal(name) = component {
                if let Some(dir) = FORBIDDEN_DIRS.iter().find(|dir| name.to_str() == Some(**dir)) {
                    return Err(SafetyError::ForbiddenPath {
                        path: absolute.to_path_buf(),
                        dir: dir.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
