//! Advisory warnings collected during a run.
//!
//! Steps record warnings instead of printing them; the orchestrator flushes
//! them once, one line per distinct message.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One advisory message and the files it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Unique, in first-seen order
    pub affected_files: Vec<PathBuf>,
}

impl Warning {
    /// Console form, `None` when no file is affected.
    pub fn render(&self) -> Option<String> {
        if self.affected_files.is_empty() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Found in: ", self.message)?;
        for (idx, path) in self.affected_files.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

/// Warning accumulator threaded through every step.
#[derive(Debug, Default)]
pub struct MigrationContext {
    warnings: Vec<Warning>,
}

impl MigrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `message` applies to `file`.
    pub fn warn(&mut self, message: &str, file: &Path) {
        let warning = match self.warnings.iter_mut().find(|w| w.message == message) {
            Some(warning) => warning,
            None => {
                self.warnings.push(Warning {
                    message: message.to_string(),
                    affected_files: Vec::new(),
                });
                let last = self.warnings.len() - 1;
                &mut self.warnings[last]
            }
        };
        if !warning.affected_files.iter().any(|p| p == file) {
            warning.affected_files.push(file.to_path_buf());
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Log every warning with affected files and hand them over.
    pub fn flush(&mut self) -> Vec<Warning> {
        let warnings = std::mem::take(&mut self.warnings);
        for line in warnings.iter().filter_map(Warning::render) {
            warn!("{line}");
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_message() {
        let mut ctx = MigrationContext::new();
        ctx.warn("select() is async now.", Path::new("src/a.ts"));
        ctx.warn("select() is async now.", Path::new("src/b.ts"));
        ctx.warn("select() is async now.", Path::new("src/a.ts"));

        let warnings = ctx.flush();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].render().as_deref(),
            Some("select() is async now. Found in: src/a.ts, src/b.ts")
        );
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn distinct_messages_keep_their_order() {
        let mut ctx = MigrationContext::new();
        ctx.warn("second", Path::new("b.ts"));
        ctx.warn("first", Path::new("a.ts"));
        let messages: Vec<&str> = ctx.warnings().iter().map(|w| w.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn empty_warning_renders_nothing() {
        let warning = Warning {
            message: "unused".to_string(),
            affected_files: Vec::new(),
        };
        assert_eq!(warning.render(), None);
    }
}
