use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git exited with {}: {message}", describe_exit(.exit_code))]
    Command {
        exit_code: Option<i32>,
        message: String,
    },
    #[error("{program} killed after running longer than {limit:?}")]
    Timeout { program: String, limit: Duration },
    #[error("not a directory: {}", .path.display())]
    NoSuchDirectory { path: PathBuf },
    #[error("not a git repository: {}", .path.display())]
    NotARepo { path: PathBuf },
    #[error("no common ancestor between HEAD and '{target}'")]
    NoCommonAncestor { target: String },
    #[error("unexpected git output line: {raw_line:?}")]
    Parse { raw_line: String },
    #[error("invalid ref {reference:?}: {reason}")]
    InvalidRef { reference: String, reason: &'static str },
    #[error("invalid repository path {path:?}")]
    InvalidPath { path: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no status".to_string(),
    }
}

impl GitError {
    /// True when git ran and reported failure, as opposed to never starting.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, GitError::Command { .. })
    }

    /// True only when git ran to completion and exited nonzero. Killed and
    /// timed-out calls are not.
    pub fn is_git_refusal(&self) -> bool {
        matches!(
            self,
            GitError::Command {
                exit_code: Some(_),
                ..
            }
        )
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::Command { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}
