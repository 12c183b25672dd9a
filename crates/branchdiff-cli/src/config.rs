use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides the preferences file location.
pub const CONFIG_ENV: &str = "BRANCHDIFF_CONFIG";

const DEFAULT_DIFF_TOOL: [&str; 4] = ["git", "diff", "--no-index", "--"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid preferences JSON: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no config directory on this system; set BRANCHDIFF_CONFIG")]
    NoConfigDir,
}

/// User preferences persisted between runs. The saved default branch is
/// keyed by repository root so each checkout keeps its own.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub default_branches: BTreeMap<String, String>,
    /// Viewer argv; the base file and the working file are appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_tool: Option<Vec<String>>,
}

impl Preferences {
    /// `$BRANCHDIFF_CONFIG`, else `<config dir>/branchdiff/preferences.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("branchdiff").join("preferences.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// A missing file means defaults; an unreadable or corrupt one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content + "\n").map_err(write_err)
    }

    pub fn default_branch(&self, repo_root: &Path) -> Option<&str> {
        self.default_branches
            .get(&repo_key(repo_root))
            .map(String::as_str)
    }

    /// `None` forgets the saved default for `repo_root`.
    pub fn set_default_branch(&mut self, repo_root: &Path, branch: Option<String>) {
        let key = repo_key(repo_root);
        match branch {
            Some(branch) => {
                self.default_branches.insert(key, branch);
            }
            None => {
                self.default_branches.remove(&key);
            }
        }
    }

    pub fn diff_tool(&self) -> Vec<String> {
        match &self.diff_tool {
            Some(tool) if !tool.is_empty() => tool.clone(),
            _ => DEFAULT_DIFF_TOOL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn repo_key(repo_root: &Path) -> String {
    repo_root.to_string_lossy().into_owned()
}
