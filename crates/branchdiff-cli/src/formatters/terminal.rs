use branchdiff_core::{BranchSet, Comparison, FileStatus};
use colored::Colorize;

use super::StatusCounts;

pub fn format_branches(set: &BranchSet) -> String {
    if set.branches.is_empty() {
        return "No branches found.".dimmed().to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    for name in &set.branches {
        let marker = if set.current.as_deref() == Some(name.as_str()) {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        let mut line = format!("{marker} {name}");
        if set.default_branch.as_deref() == Some(name.as_str()) {
            line = format!("{line} {}", "[default]".cyan());
        }
        lines.push(line);
    }

    if set.current.is_none() {
        lines.push(String::new());
        lines.push("HEAD is detached.".dimmed().to_string());
    }

    lines.join("\n")
}

pub fn format_comparison(comparison: &Comparison) -> String {
    let resolution = &comparison.resolution;
    let short_ref = &resolution.diff_ref[..7.min(resolution.diff_ref.len())];

    let header = format!("─ {} @ {short_ref} ", resolution.target);
    let pad_len = 55usize.saturating_sub(header.chars().count());
    let mut lines: Vec<String> = vec![
        format!("┌{header}{}", "─".repeat(pad_len)).dimmed().to_string(),
        "│".dimmed().to_string(),
    ];

    if comparison.changes.is_empty() {
        lines.push(format!(
            "{}  {}",
            "│".dimmed(),
            "No changes since merge-base.".dimmed()
        ));
    }

    for change in &comparison.changes {
        let tag = match change.status {
            FileStatus::Added => format!("{:<12}", "[added]").green(),
            FileStatus::Modified => format!("{:<12}", "[modified]").yellow(),
            FileStatus::Deleted => format!("{:<12}", "[deleted]").red(),
            FileStatus::Renamed => format!("{:<12}", "[renamed]").cyan(),
            FileStatus::Copied => format!("{:<12}", "[copied]").blue(),
            FileStatus::TypeChanged => format!("{:<12}", "[type]").magenta(),
            FileStatus::Unmerged => format!("{:<12}", "[unmerged]").red().bold(),
        };

        lines.push(format!("{}  {} {}", "│".dimmed(), tag, change.path.bold()));

        if let Some(ref original) = change.original_path {
            lines.push(format!(
                "{}    {}",
                "│".dimmed(),
                format!("from {original}").dimmed(),
            ));
        }
    }

    lines.push("│".dimmed().to_string());
    lines.push(format!("└{}", "─".repeat(55)).dimmed().to_string());

    let counts = StatusCounts::tally(&comparison.changes);
    if counts.total > 0 {
        let files_label = if counts.total == 1 { "file" } else { "files" };
        lines.push(format!(
            "Summary: {} across {} {files_label}",
            summary_parts(&counts).join(", "),
            counts.total,
        ));
    }

    lines.join("\n")
}

fn summary_parts(counts: &StatusCounts) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    if counts.added > 0 {
        parts.push(format!("{} added", counts.added).green().to_string());
    }
    if counts.modified > 0 {
        parts.push(format!("{} modified", counts.modified).yellow().to_string());
    }
    if counts.deleted > 0 {
        parts.push(format!("{} deleted", counts.deleted).red().to_string());
    }
    if counts.renamed > 0 {
        parts.push(format!("{} renamed", counts.renamed).cyan().to_string());
    }
    if counts.copied > 0 {
        parts.push(format!("{} copied", counts.copied).blue().to_string());
    }
    if counts.other > 0 {
        parts.push(format!("{} other", counts.other).magenta().to_string());
    }
    parts
}
