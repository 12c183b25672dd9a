use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Unmerged,
}

impl FileStatus {
    /// Maps the leading letter of a name-status code.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(FileStatus::Added),
            'M' => Some(FileStatus::Modified),
            'D' => Some(FileStatus::Deleted),
            'R' => Some(FileStatus::Renamed),
            'C' => Some(FileStatus::Copied),
            'T' => Some(FileStatus::TypeChanged),
            'U' => Some(FileStatus::Unmerged),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Copied => 'C',
            FileStatus::TypeChanged => 'T',
            FileStatus::Unmerged => 'U',
        }
    }

    /// Renames and copies name a source path in addition to the current one.
    pub fn carries_original_path(self) -> bool {
        matches!(self, FileStatus::Renamed | FileStatus::Copied)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Deleted => write!(f, "deleted"),
            FileStatus::Renamed => write!(f, "renamed"),
            FileStatus::Copied => write!(f, "copied"),
            FileStatus::TypeChanged => write!(f, "typechanged"),
            FileStatus::Unmerged => write!(f, "unmerged"),
        }
    }
}

/// One differing path, repository-root-relative and `/`-separated as git
/// prints it. `original_path` is set exactly for renames and copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub status: FileStatus,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
}

impl FileChange {
    pub fn new(status: FileStatus, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
            original_path: None,
        }
    }

    pub fn moved(status: FileStatus, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            status,
            path: to.into(),
            original_path: Some(from.into()),
        }
    }

    /// Host path of the file under `root`. Recomputed on each call since the
    /// root is resolved per operation.
    pub fn absolute_path(&self, root: &Path) -> PathBuf {
        let mut full = root.to_path_buf();
        full.extend(self.path.split('/').filter(|s| !s.is_empty()));
        full
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Directory part of `path`, empty for files at the repository root.
    pub fn parent_dir(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Path to read on the base side of the comparison.
    pub fn base_path(&self) -> &str {
        self.original_path.as_deref().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefResolution {
    pub repo_root: PathBuf,
    /// The ref the user picked.
    pub target: String,
    /// Merge-base commit of `target` and HEAD.
    pub diff_ref: String,
}

/// Raw enumerator output before any default-branch policy is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchListing {
    pub current: Option<String>,
    pub all: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSet {
    /// Presentation order: default first, then lexicographic.
    pub branches: Vec<String>,
    pub current: Option<String>,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub resolution: RefResolution,
    pub changes: Vec<FileChange>,
}
