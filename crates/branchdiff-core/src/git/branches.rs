use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use super::error::GitError;
use super::runner::CommandRunner;
use super::types::{BranchListing, BranchSet};

/// Conventional primary branch names, in order of preference.
pub const PRIMARY_BRANCHES: [&str; 2] = ["main", "master"];

const HEAD_MARKER: &str = "HEAD";

/// Local and remote branches plus the checked-out one. The two queries are
/// independent and read-only, so they run concurrently.
///
/// On an unborn HEAD (no commits yet) git refuses to name the current branch;
/// that is reported as `current: None` rather than failing the listing.
pub async fn get_branches<R: CommandRunner>(
    runner: &R,
    cwd: &Path,
) -> Result<BranchListing, GitError> {
    let current = async {
        match runner.run(cwd, &["rev-parse", "--abbrev-ref", "HEAD"]).await {
            Ok(out) => Ok(parse_current_branch(&out)),
            Err(e) if e.is_git_refusal() => {
                debug!("no current branch: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    };
    let (list, current) = tokio::try_join!(
        runner.run(cwd, &["branch", "-a", "--format=%(refname:short)"]),
        current,
    )?;
    Ok(BranchListing {
        current,
        all: parse_branch_list(&list),
    })
}

/// Drops blank lines, any `HEAD` pseudo-entry (`origin/HEAD`,
/// `(HEAD detached at 1a2b3c)`) and repeats, keeping first-seen order.
pub fn parse_branch_list(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.contains(HEAD_MARKER))
        .filter(|name| seen.insert(*name))
        .map(String::from)
        .collect()
}

/// `None` on a detached HEAD, where git prints the literal `HEAD`.
pub fn parse_current_branch(output: &str) -> Option<String> {
    match output.trim() {
        "" | HEAD_MARKER => None,
        name => Some(name.to_string()),
    }
}

/// Saved default if it still exists, else a conventional primary name, else
/// the first branch.
pub fn resolve_default_branch(branches: &[String], saved: Option<&str>) -> Option<String> {
    if let Some(saved) = saved {
        if branches.iter().any(|b| b == saved) {
            return Some(saved.to_string());
        }
        warn!("saved default branch '{saved}' no longer exists");
    }
    PRIMARY_BRANCHES
        .iter()
        .find(|primary| branches.iter().any(|b| b == *primary))
        .map(|primary| primary.to_string())
        .or_else(|| branches.first().cloned())
}

/// Default first, the rest lexicographic.
pub fn order_branches(branches: &[String], default: Option<&str>) -> Vec<String> {
    let mut rest: Vec<String> = branches
        .iter()
        .filter(|b| Some(b.as_str()) != default)
        .cloned()
        .collect();
    rest.sort();

    match default.filter(|d| branches.iter().any(|b| b == d)) {
        Some(default) => std::iter::once(default.to_string()).chain(rest).collect(),
        None => rest,
    }
}

impl BranchSet {
    pub fn resolve(listing: BranchListing, saved: Option<&str>) -> Self {
        let default_branch = resolve_default_branch(&listing.all, saved);
        Self {
            branches: order_branches(&listing.all, default_branch.as_deref()),
            current: listing.current,
            default_branch,
        }
    }
}
