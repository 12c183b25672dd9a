use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitStatus;

use tempfile::NamedTempFile;
use tracing::debug;

use super::show::{load_base_side, BaseSide};
use super::{fail, Context};

pub struct OpenOptions {
    pub branch: String,
    pub path: String,
    /// Overrides the configured viewer argv.
    pub tool: Vec<String>,
}

/// Both panes as files on disk. Temp files are removed on drop.
struct ViewerSides {
    left: NamedTempFile,
    right: PathBuf,
    _empty_right: Option<NamedTempFile>,
}

impl ViewerSides {
    fn stage(base: &BaseSide) -> io::Result<Self> {
        let label = format!("{} ({})", base.change.file_name(), base.resolution.target);
        let left = temp_with_content(&label, &base.content)?;

        // deleted files have nothing on disk; compare against an empty file
        let live = base.change.absolute_path(&base.resolution.repo_root);
        if live.is_file() {
            return Ok(Self {
                left,
                right: live,
                _empty_right: None,
            });
        }
        let empty = temp_with_content(base.change.file_name(), "")?;
        Ok(Self {
            left,
            right: empty.path().to_path_buf(),
            _empty_right: Some(empty),
        })
    }
}

/// Writes the merge-base version to a temp file and hands it, with the live
/// file, to the diff viewer.
pub async fn open_command(ctx: &Context, opts: OpenOptions) {
    let base = load_base_side(ctx, &opts.branch, &opts.path).await;

    let tool = if opts.tool.is_empty() {
        ctx.load_preferences().diff_tool()
    } else {
        opts.tool
    };
    let Some((program, tool_args)) = tool.split_first() else {
        fail("diff tool is empty");
    };

    let sides = ViewerSides::stage(&base)
        .unwrap_or_else(|e| fail(format!("cannot create temp file: {e}")));
    let launched = launch_viewer(program, tool_args, &sides).await;
    // fail() exits without running destructors
    drop(sides);

    match launched {
        // diff tools exit nonzero when the sides differ
        Ok(status) => debug!(?status, "diff viewer exited"),
        Err(e) => fail(format!("cannot launch {program}: {e}")),
    }
}

async fn launch_viewer(
    program: &str,
    tool_args: &[String],
    sides: &ViewerSides,
) -> io::Result<ExitStatus> {
    debug!(
        "{program} {:?} {} {}",
        tool_args,
        sides.left.path().display(),
        sides.right.display()
    );
    tokio::process::Command::new(program)
        .args(tool_args)
        .arg(sides.left.path())
        .arg(&sides.right)
        .status()
        .await
}

fn temp_with_content(label: &str, content: &str) -> io::Result<NamedTempFile> {
    let suffix = format!("-{}", label.replace(['/', '\\'], "_"));
    let mut file = tempfile::Builder::new()
        .prefix("branchdiff-")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchdiff_core::{FileChange, FileStatus, RefResolution};
    use std::fs;
    use tempfile::TempDir;

    fn base_side(repo_root: PathBuf, change: FileChange) -> BaseSide {
        BaseSide {
            resolution: RefResolution {
                repo_root,
                target: "main".to_string(),
                diff_ref: "abc123".to_string(),
            },
            change,
            content: "before\n".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failed_launch_leaves_no_temp_files() {
        let repo = TempDir::new().unwrap();
        let change = FileChange::new(FileStatus::Deleted, "gone.txt");
        let sides = ViewerSides::stage(&base_side(repo.path().to_path_buf(), change)).unwrap();

        let left = sides.left.path().to_path_buf();
        let right = sides.right.clone();
        assert_eq!(fs::read_to_string(&left).unwrap(), "before\n");
        assert_eq!(fs::read_to_string(&right).unwrap(), "");

        let launched = launch_viewer("branchdiff-no-such-viewer", &[], &sides).await;
        assert!(launched.is_err());

        drop(sides);
        assert!(!left.exists());
        assert!(!right.exists());
    }

    #[test]
    fn test_live_file_is_right_side() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("kept.txt"), "after\n").unwrap();
        let change = FileChange::new(FileStatus::Modified, "kept.txt");

        let sides = ViewerSides::stage(&base_side(repo.path().to_path_buf(), change)).unwrap();
        assert_eq!(sides.right, repo.path().join("kept.txt"));
        assert!(sides._empty_right.is_none());

        drop(sides);
        assert!(repo.path().join("kept.txt").exists());
    }
}
