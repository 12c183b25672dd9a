use crate::formatters::json::format_branches_json;
use crate::formatters::terminal::format_branches;
use crate::formatters::OutputFormat;

use super::{fail, Context};

pub async fn branches_command(ctx: &Context, format: OutputFormat) {
    let root = ctx.repo_root().await;
    let prefs = ctx.load_preferences();

    let saved = prefs.default_branch(&root);
    let set = match ctx.bridge.branch_set(&root, saved).await {
        Ok(set) => set,
        Err(e) => fail(e),
    };

    match format {
        OutputFormat::Json => println!("{}", format_branches_json(&set)),
        OutputFormat::Terminal => println!("{}", format_branches(&set)),
    }
}
