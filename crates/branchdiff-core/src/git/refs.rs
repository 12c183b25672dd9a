use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::GitError;
use super::runner::CommandRunner;
use super::types::RefResolution;

/// Rejects refs git would misread as options or that cannot be a revision.
pub fn validate_ref(reference: &str) -> Result<(), GitError> {
    let reason = if reference.is_empty() {
        "ref is empty"
    } else if reference.starts_with('-') {
        "ref must not start with '-'"
    } else if reference.contains(['\0', '\n', '\r']) {
        "ref contains a control character"
    } else {
        return Ok(());
    };
    Err(GitError::InvalidRef {
        reference: reference.to_string(),
        reason,
    })
}

/// Top-level directory of the work tree containing `cwd`.
///
/// Only a completed git call that exits nonzero, or a `cwd` that is not a
/// directory, means "not a repository". Timeouts and spawn failures pass
/// through unchanged.
pub async fn get_repo_root<R: CommandRunner>(
    runner: &R,
    cwd: &Path,
) -> Result<PathBuf, GitError> {
    let out = runner
        .run(cwd, &["rev-parse", "--show-toplevel"])
        .await
        .map_err(|e| match e {
            GitError::Command {
                exit_code: Some(code),
                message,
            } => {
                debug!(code, "{} is not a work tree: {message}", cwd.display());
                GitError::NotARepo {
                    path: cwd.to_path_buf(),
                }
            }
            GitError::NoSuchDirectory { path } => GitError::NotARepo { path },
            other => other,
        })?;

    let root = out.trim();
    if root.is_empty() {
        return Err(GitError::NotARepo {
            path: cwd.to_path_buf(),
        });
    }
    Ok(PathBuf::from(root))
}

/// Commit id of the best common ancestor of `target` and `source`.
///
/// Git refusing the query (unrelated histories, unknown ref) is reported as
/// [`GitError::NoCommonAncestor`] naming `target`; diffing against the branch
/// tip instead would silently include upstream commits. A call that never
/// exited, such as one killed by the timeout, keeps its own error.
pub async fn get_merge_base<R: CommandRunner>(
    runner: &R,
    repo_root: &Path,
    target: &str,
    source: &str,
) -> Result<String, GitError> {
    validate_ref(target)?;
    validate_ref(source)?;

    let no_ancestor = || GitError::NoCommonAncestor {
        target: target.to_string(),
    };

    let out = match runner.run(repo_root, &["merge-base", target, source]).await {
        Ok(out) => out,
        Err(GitError::Command {
            exit_code: Some(code),
            message,
        }) => {
            debug!(code, "merge-base {target} {source} failed: {message}");
            return Err(no_ancestor());
        }
        Err(other) => return Err(other),
    };

    let commit = out.trim();
    if commit.is_empty() {
        return Err(no_ancestor());
    }
    Ok(commit.to_string())
}

pub async fn get_merge_base_with_head<R: CommandRunner>(
    runner: &R,
    repo_root: &Path,
    target: &str,
) -> Result<String, GitError> {
    get_merge_base(runner, repo_root, target, "HEAD").await
}

/// Root first, then merge-base; each step needs the previous one.
pub async fn resolve_diff_ref<R: CommandRunner>(
    runner: &R,
    cwd: &Path,
    target: &str,
) -> Result<RefResolution, GitError> {
    validate_ref(target)?;
    let repo_root = get_repo_root(runner, cwd).await?;
    let diff_ref = get_merge_base_with_head(runner, &repo_root, target).await?;
    debug!("{target} resolves to merge-base {diff_ref}");
    Ok(RefResolution {
        repo_root,
        target: target.to_string(),
        diff_ref,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::runner::fake::{FakeRunner, Reply};
    use crate::git::runner::GitRunner;

    const ROOT_ARGS: [&str; 2] = ["rev-parse", "--show-toplevel"];

    #[test]
    fn test_validate_ref() {
        assert!(validate_ref("main").is_ok());
        assert!(validate_ref("origin/feature-x").is_ok());
        assert!(validate_ref("v1.0^{commit}").is_ok());
        assert!(matches!(validate_ref(""), Err(GitError::InvalidRef { .. })));
        assert!(matches!(
            validate_ref("--output=/tmp/x"),
            Err(GitError::InvalidRef { .. })
        ));
        assert!(matches!(
            validate_ref("main\nHEAD"),
            Err(GitError::InvalidRef { .. })
        ));
    }

    #[tokio::test]
    async fn test_repo_root_trims_output() {
        let runner = FakeRunner::new().ok(&ROOT_ARGS, "/home/dev/project\n");
        let root = get_repo_root(&runner, Path::new("/home/dev/project/src"))
            .await
            .unwrap();
        assert_eq!(root, PathBuf::from("/home/dev/project"));
        assert_eq!(runner.calls()[0].0, "/home/dev/project/src");
    }

    #[tokio::test]
    async fn test_repo_root_failure_is_not_a_repo() {
        let runner = FakeRunner::new().fail(
            &ROOT_ARGS,
            128,
            "fatal: not a git repository (or any of the parent directories): .git",
        );
        let err = get_repo_root(&runner, Path::new("/tmp")).await.unwrap_err();
        assert!(matches!(err, GitError::NotARepo { ref path } if path == Path::new("/tmp")));
    }

    #[tokio::test]
    async fn test_repo_root_spawn_error_propagates() {
        let runner = FakeRunner::new().reply(&ROOT_ARGS, Reply::SpawnFail);
        let err = get_repo_root(&runner, Path::new("/tmp")).await.unwrap_err();
        assert!(matches!(err, GitError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_repo_root_timeout_is_not_a_repo_answer() {
        let runner = FakeRunner::new().reply(&ROOT_ARGS, Reply::TimedOut);
        let err = get_repo_root(&runner, Path::new("/tmp")).await.unwrap_err();
        assert!(matches!(err, GitError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_repo_root_of_missing_directory_is_not_a_repo() {
        let dir = tempfile::TempDir::new().unwrap();
        let gone = dir.path().join("removed");
        let err = get_repo_root(&GitRunner::new(), &gone).await.unwrap_err();
        assert!(matches!(err, GitError::NotARepo { ref path } if *path == gone));
    }

    #[tokio::test]
    async fn test_merge_base_returns_commit() {
        let runner = FakeRunner::new().ok(&["merge-base", "main", "HEAD"], "3f2a9c1\n");
        let base = get_merge_base_with_head(&runner, Path::new("/r"), "main")
            .await
            .unwrap();
        assert_eq!(base, "3f2a9c1");
    }

    #[tokio::test]
    async fn test_unrelated_histories_name_target() {
        let runner = FakeRunner::new().fail(&["merge-base", "orphan", "HEAD"], 1, "");
        let err = get_merge_base_with_head(&runner, Path::new("/r"), "orphan")
            .await
            .unwrap_err();
        match err {
            GitError::NoCommonAncestor { target } => assert_eq!(target, "orphan"),
            other => panic!("expected NoCommonAncestor, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_target_is_no_common_ancestor() {
        let runner = FakeRunner::new().fail(
            &["merge-base", "nope", "HEAD"],
            128,
            "fatal: Not a valid object name nope",
        );
        let err = get_merge_base_with_head(&runner, Path::new("/r"), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::NoCommonAncestor { .. }));
    }

    #[tokio::test]
    async fn test_interrupted_merge_base_keeps_its_error() {
        let runner = FakeRunner::new()
            .reply(&["merge-base", "main", "HEAD"], Reply::TimedOut)
            .reply(&["merge-base", "dev", "HEAD"], Reply::Killed);
        let repo = Path::new("/r");

        let err = get_merge_base_with_head(&runner, repo, "main")
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::Timeout { .. }));

        let err = get_merge_base_with_head(&runner, repo, "dev")
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::Command { exit_code: None, .. }));
    }

    #[tokio::test]
    async fn test_option_like_target_never_reaches_git() {
        let runner = FakeRunner::new();
        let err = resolve_diff_ref(&runner, Path::new("/r"), "--exec=evil")
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::InvalidRef { .. }));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_runs_merge_base_in_repo_root() {
        let runner = FakeRunner::new()
            .ok(&ROOT_ARGS, "/repo\n")
            .ok(&["merge-base", "develop", "HEAD"], "abc123\n");
        let resolution = resolve_diff_ref(&runner, Path::new("/repo/nested/dir"), "develop")
            .await
            .unwrap();
        assert_eq!(
            resolution,
            RefResolution {
                repo_root: PathBuf::from("/repo"),
                target: "develop".to_string(),
                diff_ref: "abc123".to_string(),
            }
        );
        let calls = runner.calls();
        assert_eq!(calls[0].0, "/repo/nested/dir");
        assert_eq!(calls[1], ("/repo".to_string(), "merge-base develop HEAD".to_string()));
    }
}
