use std::fmt;
use std::path::PathBuf;

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "StepOutcome should be checked for failures"]
pub enum StepOutcome {
    /// The step ran; `changed` lists rewritten files, `failed_files` those
    /// that could not be processed.
    Completed {
        changed: Vec<PathBuf>,
        failed_files: Vec<PathBuf>,
    },
    /// An expected file or field was missing
    Skipped { reason: String },
    /// The step returned an error or panicked
    Failed { reason: String },
}

impl StepOutcome {
    pub fn completed(changed: Vec<PathBuf>) -> Self {
        StepOutcome::Completed {
            changed,
            failed_files: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    pub fn changed(&self) -> &[PathBuf] {
        match self {
            StepOutcome::Completed { changed, .. } => changed,
            _ => &[],
        }
    }

    pub fn failed_files(&self) -> &[PathBuf] {
        match self {
            StepOutcome::Completed { failed_files, .. } => failed_files,
            _ => &[],
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Completed {
                changed,
                failed_files,
            } => {
                match changed.len() {
                    0 => write!(f, "nothing to change")?,
                    1 => write!(f, "changed 1 file")?,
                    n => write!(f, "changed {n} files")?,
                }
                if !failed_files.is_empty() {
                    write!(f, " ({} failed)", failed_files.len())?;
                }
                Ok(())
            }
            StepOutcome::Skipped { reason } => write!(f, "skipped: {reason}"),
            StepOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Outcome of one plan entry, named by its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub id: String,
    pub outcome: StepOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_summaries() {
        assert_eq!(StepOutcome::completed(Vec::new()).to_string(), "nothing to change");
        assert_eq!(
            StepOutcome::Completed {
                changed: vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")],
                failed_files: vec![PathBuf::from("c.ts")],
            }
            .to_string(),
            "changed 2 files (1 failed)"
        );
        assert_eq!(
            StepOutcome::Skipped {
                reason: "no package.json".to_string()
            }
            .to_string(),
            "skipped: no package.json"
        );
    }
}
