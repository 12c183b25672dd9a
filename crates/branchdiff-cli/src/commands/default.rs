use colored::Colorize;

use super::{fail, Context};

pub struct DefaultOptions {
    pub branch: Option<String>,
    pub clear: bool,
}

/// Shows, saves or forgets this repository's default comparison branch.
pub async fn default_command(ctx: &Context, opts: DefaultOptions) {
    let root = ctx.repo_root().await;
    let path = ctx.preferences_path();
    let mut prefs = ctx.load_preferences();

    if opts.clear {
        prefs.set_default_branch(&root, None);
        prefs.save(&path).unwrap_or_else(|e| fail(e));
        println!("{}", "Cleared saved default branch.".dimmed());
        return;
    }

    let saved = prefs.default_branch(&root);
    let set = match ctx.bridge.branch_set(&root, saved).await {
        Ok(set) => set,
        Err(e) => fail(e),
    };

    match opts.branch {
        Some(branch) => {
            if !set.branches.contains(&branch) {
                fail(format!("unknown branch '{branch}'"));
            }
            prefs.set_default_branch(&root, Some(branch.clone()));
            prefs.save(&path).unwrap_or_else(|e| fail(e));
            println!("Default branch set to {}.", branch.bold());
        }
        None => match set.default_branch {
            Some(default) => {
                let origin = if prefs.default_branch(&root) == Some(default.as_str()) {
                    "saved"
                } else {
                    "auto"
                };
                println!("{} {}", default.bold(), format!("({origin})").dimmed());
            }
            None => println!("{}", "No branches found.".dimmed()),
        },
    }
}
