use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use super::error::GitError;

/// Environment forced on every git invocation so diagnostics stay untranslated
/// and read-only queries never contend for the index lock.
const GIT_ENV: [(&str, &str); 2] = [("LC_ALL", "C"), ("GIT_OPTIONAL_LOCKS", "0")];

/// Executes one git invocation and yields its stdout.
///
/// Implementations must take an argument vector, never a shell string, and
/// must run in `cwd` rather than the process's ambient directory.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        cwd: &Path,
        args: &[&str],
    ) -> impl Future<Output = Result<String, GitError>> + Send;
}

/// Runs the real `git` binary through `tokio::process`.
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: String,
    timeout: Option<Duration>,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
            timeout: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill the subprocess and fail if it has not exited within `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for GitRunner {
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        debug!(cwd = %cwd.display(), "{} {}", self.program, args.join(" "));

        // A missing cwd would otherwise surface as ENOENT from spawn.
        if !cwd.is_dir() {
            return Err(GitError::NoSuchDirectory {
                path: cwd.to_path_buf(),
            });
        }

        let child = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .envs(GIT_ENV)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GitError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping `child` on timeout kills it; partial output is discarded.
        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    debug!("{} {} timed out", self.program, args.join(" "));
                    return Err(GitError::Timeout {
                        program: self.program.clone(),
                        limit,
                    });
                }
            },
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| GitError::Command {
            exit_code: None,
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let exit_code = output.status.code();
            debug!(?exit_code, "{} {} failed", self.program, args.join(" "));
            return Err(GitError::Command {
                exit_code,
                message: failure_message(&output.stdout, &output.stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Git's own diagnostic: stderr, or stdout when stderr is empty.
fn failure_message(stdout: &[u8], stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    String::from_utf8_lossy(stdout).trim().to_string()
}
