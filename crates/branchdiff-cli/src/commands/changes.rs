use crate::formatters::json::format_comparison_json;
use crate::formatters::terminal::format_comparison;
use crate::formatters::OutputFormat;

use super::{fail, Context};

pub struct ChangesOptions {
    pub branch: Option<String>,
    pub format: OutputFormat,
}

pub async fn changes_command(ctx: &Context, opts: ChangesOptions) {
    let target = ctx.target_or_default(opts.branch).await;

    let comparison = match ctx.bridge.compare(&ctx.cwd, &target).await {
        Ok(comparison) => comparison,
        Err(e) => fail(e),
    };

    match opts.format {
        OutputFormat::Json => println!("{}", format_comparison_json(&comparison)),
        OutputFormat::Terminal => println!("{}", format_comparison(&comparison)),
    }
}
