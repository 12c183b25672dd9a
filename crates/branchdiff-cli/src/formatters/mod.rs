pub mod json;
pub mod terminal;

use branchdiff_core::{FileChange, FileStatus};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Terminal,
        }
    }
}

/// Per-status totals for the summary line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub copied: usize,
    /// Type changes and unmerged paths.
    pub other: usize,
}

impl StatusCounts {
    pub fn tally(changes: &[FileChange]) -> Self {
        let mut counts = StatusCounts {
            total: changes.len(),
            ..Default::default()
        };
        for change in changes {
            match change.status {
                FileStatus::Added => counts.added += 1,
                FileStatus::Modified => counts.modified += 1,
                FileStatus::Deleted => counts.deleted += 1,
                FileStatus::Renamed => counts.renamed += 1,
                FileStatus::Copied => counts.copied += 1,
                FileStatus::TypeChanged | FileStatus::Unmerged => counts.other += 1,
            }
        }
        counts
    }
}
