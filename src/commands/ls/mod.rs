// src/commands/ls/mod.rs
use async_trait::async_trait;
use crate::commands::utils::format::long_line;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::commands::types::EXIT_INTERRUPTED;
use crate::fs::listing::{list, ListOptions, Listing};
use crate::fs::Lookup;

pub struct LsCommand;

/// Depth used by `--tree` when no `--depth=N` is given
pub const DEFAULT_TREE_DEPTH: usize = 10;

const USAGE: &str = "ls: usage: ls [-a] [-l] [--tree] [--depth=N] [path]\n";

#[async_trait]
impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        run_ls(&ctx, "ls").await
    }
}

/// Shared by `ls` and its `tree` alias.
pub(crate) async fn run_ls(ctx: &CommandContext, name: &str) -> CommandResult {
    let mut options = ListOptions::default();
    let mut long_format = false;
    let mut depth: Option<usize> = None;
    let mut path: Option<&str> = None;

    for arg in &ctx.args {
        match arg.as_str() {
            "-a" => options.show_hidden = true,
            "-l" => long_format = true,
            "-la" | "-al" => { long_format = true; options.show_hidden = true; }
            "--tree" => options.tree = true,
            _ if arg.starts_with("--depth=") => {
                match arg["--depth=".len()..].parse::<usize>() {
                    Ok(n) => depth = Some(n),
                    Err(_) => {
                        return CommandResult::usage(format!("{}: invalid depth: '{}'\n", name, arg));
                    }
                }
                options.tree = true;
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return CommandResult::usage(format!("{}: invalid option '{}'\n{}", name, arg, USAGE));
            }
            _ => {
                if path.is_some() {
                    return CommandResult::usage(USAGE.to_string());
                }
                path = Some(arg.as_str());
            }
        }
    }
    options.depth = depth.unwrap_or(DEFAULT_TREE_DEPTH);

    // 链接本身也要能列出，不跟随最后一级
    let target = match ctx.resolve(path, Lookup::NoFollow).await {
        Ok(t) => t,
        Err(e) => {
            return CommandResult::error(format!(
                "{}: cannot access '{}': {}\n",
                name,
                path.unwrap_or("."),
                e.reason()
            ));
        }
    };

    let display_root = path.unwrap_or(".");
    let listing = match list(ctx.fs.as_ref(), &target, display_root, options, &ctx.interrupt).await {
        Ok(l) => l,
        Err(e) => {
            return CommandResult::error(format!("{}: cannot open '{}': {}\n", name, display_root, e.reason()));
        }
    };

    let mut stdout = String::new();
    match listing {
        Listing::Single(entry) => {
            let shown = path.map(String::from).unwrap_or_else(|| entry.name());
            if long_format {
                stdout.push_str(&long_line(&entry, &shown));
            } else {
                stdout.push_str(&shown);
            }
            stdout.push('\n');
        }
        Listing::Flat(entries) => {
            for entry in &entries {
                let line = if long_format { long_line(entry, &entry.name()) } else { entry.name() };
                stdout.push_str(&line);
                stdout.push('\n');
            }
        }
        Listing::Tree { lines, interrupted } => {
            for line in &lines {
                stdout.push_str(&line.display);
                stdout.push('\n');
            }
            if interrupted {
                return CommandResult::with_exit_code(stdout, format!("{}: interrupted\n", name), EXIT_INTERRUPTED);
            }
        }
    }

    CommandResult::success(stdout)
}
