//! Diff-set resolution for comparing the working tree against a branch.
//!
//! Everything goes through the `git` CLI: [`git::GitBridge`] resolves the
//! merge-base of a target ref and HEAD, lists the files that changed since
//! it, and fetches base-side content for a side-by-side viewer.

pub mod git;

pub use git::types::{
    BranchListing, BranchSet, Comparison, FileChange, FileStatus, RefResolution,
};
pub use git::{CommandRunner, GitBridge, GitError, GitRunner};
