use std::path::{Path, PathBuf};

use super::branches::get_branches;
use super::changes::get_changed_files;
use super::content::get_file_content;
use super::error::GitError;
use super::refs::{get_merge_base_with_head, get_repo_root, resolve_diff_ref};
use super::runner::{CommandRunner, GitRunner};
use super::types::{BranchListing, BranchSet, Comparison, FileChange, FileStatus, RefResolution};

/// Entry point for UI shells. Holds only the runner; every operation takes
/// its working directory or root explicitly, so independent comparisons can
/// run side by side on one bridge.
#[derive(Debug, Clone, Default)]
pub struct GitBridge<R = GitRunner> {
    runner: R,
}

impl GitBridge<GitRunner> {
    pub fn new() -> Self {
        Self::with_runner(GitRunner::new())
    }
}

impl<R: CommandRunner> GitBridge<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn repo_root(&self, cwd: &Path) -> Result<PathBuf, GitError> {
        get_repo_root(&self.runner, cwd).await
    }

    pub async fn merge_base(&self, repo_root: &Path, target: &str) -> Result<String, GitError> {
        get_merge_base_with_head(&self.runner, repo_root, target).await
    }

    pub async fn resolve(&self, cwd: &Path, target: &str) -> Result<RefResolution, GitError> {
        resolve_diff_ref(&self.runner, cwd, target).await
    }

    pub async fn changed_files(
        &self,
        repo_root: &Path,
        diff_ref: &str,
    ) -> Result<Vec<FileChange>, GitError> {
        get_changed_files(&self.runner, repo_root, diff_ref).await
    }

    pub async fn file_content(
        &self,
        cwd: &Path,
        reference: &str,
        relative_path: &str,
    ) -> Result<String, GitError> {
        get_file_content(&self.runner, cwd, reference, relative_path).await
    }

    pub async fn branches(&self, cwd: &Path) -> Result<BranchListing, GitError> {
        get_branches(&self.runner, cwd).await
    }

    /// Enumerated branches with the default-branch policy applied.
    pub async fn branch_set(
        &self,
        cwd: &Path,
        saved_default: Option<&str>,
    ) -> Result<BranchSet, GitError> {
        let listing = self.branches(cwd).await?;
        Ok(BranchSet::resolve(listing, saved_default))
    }

    /// Merge-base of `target` and HEAD, then everything changed since it.
    pub async fn compare(&self, cwd: &Path, target: &str) -> Result<Comparison, GitError> {
        let resolution = self.resolve(cwd, target).await?;
        let changes = self
            .changed_files(&resolution.repo_root, &resolution.diff_ref)
            .await?;
        Ok(Comparison {
            resolution,
            changes,
        })
    }

    /// Left-hand text for `change`: its pre-rename path at the merge-base.
    pub async fn base_content(
        &self,
        resolution: &RefResolution,
        change: &FileChange,
    ) -> Result<String, GitError> {
        if change.status == FileStatus::Added {
            return Ok(String::new());
        }
        self.file_content(
            &resolution.repo_root,
            &resolution.diff_ref,
            change.base_path(),
        )
        .await
    }
}
