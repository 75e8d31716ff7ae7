//! The one external code-generation command a plan may run.

use crate::migration::schema::CodegenCommand;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", exit_description(.code))]
    Failed { command: String, code: Option<i32> },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Runs external commands. Swapped out in tests and dry runs.
pub trait CommandRunner {
    fn run(&mut self, command: &CodegenCommand, cwd: &Path) -> Result<(), CodegenError>;
}

/// Runs the command for real: blocking, inherited stdio, no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &CodegenCommand, cwd: &Path) -> Result<(), CodegenError> {
        info!(command = %command, cwd = %cwd.display(), "running code generation");
        let status = Command::new(&command.command)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| CodegenError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CodegenError::Failed {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}

/// Records commands without running them.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    pub commands: Vec<String>,
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &CodegenCommand, _cwd: &Path) -> Result<(), CodegenError> {
        info!(command = %command, "not running code generation");
        self.commands.push(command.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(program: &str, args: &[&str]) -> CodegenCommand {
        CodegenCommand {
            command: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    #[cfg(unix)]
    fn runs_in_the_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = SystemRunner;
        runner
            .run(&command("sh", &["-c", "touch generated.txt"]), dir.path())
            .unwrap();
        assert!(dir.path().join("generated.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run(&command("sh", &["-c", "exit 3"]), dir.path())
            .unwrap_err();
        assert!(matches!(err, CodegenError::Failed { code: Some(3), .. }));
        assert_eq!(err.to_string(), "`sh -c exit 3` exited with status 3");
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run(&command("uplift-no-such-program", &[]), dir.path())
            .unwrap_err();
        assert!(matches!(err, CodegenError::Spawn { .. }));
    }

    #[test]
    fn recording_runner_only_records() {
        let mut runner = RecordingRunner::default();
        runner
            .run(&command("npx", &["acme", "generate"]), Path::new("."))
            .unwrap();
        assert_eq!(runner.commands, vec!["npx acme generate"]);
    }
}
