use branchdiff_core::{BranchSet, Comparison};
use serde_json::json;

use super::StatusCounts;

pub fn format_branches_json(set: &BranchSet) -> String {
    serde_json::to_string_pretty(set).unwrap_or_default()
}

pub fn format_comparison_json(comparison: &Comparison) -> String {
    let counts = StatusCounts::tally(&comparison.changes);
    let output = json!({
        "resolution": comparison.resolution,
        "summary": {
            "fileCount": counts.total,
            "added": counts.added,
            "modified": counts.modified,
            "deleted": counts.deleted,
            "renamed": counts.renamed,
            "copied": counts.copied,
            "other": counts.other,
        },
        "changes": comparison.changes,
    });

    serde_json::to_string_pretty(&output).unwrap_or_default()
}
