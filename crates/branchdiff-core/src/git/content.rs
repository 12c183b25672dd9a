use std::path::Path;

use tracing::debug;

use super::error::GitError;
use super::refs::validate_ref;
use super::runner::CommandRunner;

/// Content of `relative_path` as of `reference`, decoded lossily.
///
/// A path that does not exist at `reference` (typically an added file) makes
/// git exit nonzero and yields an empty string: the base pane is simply empty.
/// A call that never completed (spawn failure, timeout, killed) is an error.
pub async fn get_file_content<R: CommandRunner>(
    runner: &R,
    cwd: &Path,
    reference: &str,
    relative_path: &str,
) -> Result<String, GitError> {
    validate_ref(reference)?;
    if relative_path.is_empty() || relative_path.starts_with('/') {
        return Err(GitError::InvalidPath {
            path: relative_path.to_string(),
        });
    }

    let object = format!("{reference}:{relative_path}");
    match runner.run(cwd, &["show", &object]).await {
        Ok(content) => Ok(content),
        Err(GitError::Command {
            exit_code: Some(code),
            message,
        }) => {
            debug!(code, "{object} not found, using empty base: {message}");
            Ok(String::new())
        }
        Err(other) => Err(other),
    }
}
