use std::io::Write;

use branchdiff_core::{FileChange, FileStatus, RefResolution};

use super::{fail, normalize_repo_path, Context};

pub struct ShowOptions {
    pub branch: String,
    pub path: String,
}

/// Left-hand side of a comparison for one path.
pub struct BaseSide {
    pub resolution: RefResolution,
    /// The path as it is in the working tree.
    pub change: FileChange,
    pub content: String,
}

/// Resolves `branch` and reads `path` at the merge-base. Paths listed in the
/// change set follow renames; any other path is read as-is.
pub async fn load_base_side(ctx: &Context, branch: &str, path: &str) -> BaseSide {
    let path = normalize_repo_path(path);
    let comparison = match ctx.bridge.compare(&ctx.cwd, branch).await {
        Ok(comparison) => comparison,
        Err(e) => fail(e),
    };

    let change = comparison
        .changes
        .iter()
        .find(|c| c.path == path)
        .cloned()
        .unwrap_or_else(|| FileChange::new(FileStatus::Modified, path));

    let content = ctx
        .bridge
        .base_content(&comparison.resolution, &change)
        .await
        .unwrap_or_else(|e| fail(e));

    BaseSide {
        resolution: comparison.resolution,
        change,
        content,
    }
}

pub async fn show_command(ctx: &Context, opts: ShowOptions) {
    let base = load_base_side(ctx, &opts.branch, &opts.path).await;
    let mut stdout = std::io::stdout().lock();
    let written = stdout
        .write_all(base.content.as_bytes())
        .and_then(|_| stdout.flush());
    if let Err(e) = written {
        fail(e);
    }
}
