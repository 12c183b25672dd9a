pub mod branches;
pub mod changes;
pub mod default;
pub mod open;
pub mod show;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;

use branchdiff_core::GitBridge;
use colored::Colorize;

use crate::config::Preferences;

/// Shared by every subcommand: where to run and how to reach git.
pub struct Context {
    pub cwd: PathBuf,
    pub bridge: GitBridge,
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn preferences_path(&self) -> PathBuf {
        match &self.config_path {
            Some(path) => path.clone(),
            None => Preferences::default_path().unwrap_or_else(|e| fail(e)),
        }
    }

    pub fn load_preferences(&self) -> Preferences {
        Preferences::load(&self.preferences_path()).unwrap_or_else(|e| fail(e))
    }

    pub async fn repo_root(&self) -> PathBuf {
        self.bridge
            .repo_root(&self.cwd)
            .await
            .unwrap_or_else(|e| fail(e))
    }

    /// `branch` if given, else the saved or conventional default.
    pub async fn target_or_default(&self, branch: Option<String>) -> String {
        if let Some(branch) = branch {
            return branch;
        }
        let root = self.repo_root().await;
        let prefs = self.load_preferences();
        let set = self
            .bridge
            .branch_set(&root, prefs.default_branch(&root))
            .await
            .unwrap_or_else(|e| fail(e));
        set.default_branch
            .unwrap_or_else(|| fail("no branches to compare against"))
    }
}

pub fn fail(err: impl Display) -> ! {
    eprintln!("{} {err}", "error:".red().bold());
    process::exit(1);
}

/// Accepts `./a/b` or `a\b` for the repository-relative `a/b`.
pub fn normalize_repo_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let trimmed = path.trim_start_matches("./");
    Path::new(trimmed)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| c != ".")
        .collect::<Vec<_>>()
        .join("/")
}
