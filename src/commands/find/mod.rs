// src/commands/find/mod.rs
use async_trait::async_trait;
use crate::commands::types::{Command, CommandContext, CommandResult, EXIT_INTERRUPTED};
use crate::fs::search::{NameMatcher, Search};
use crate::fs::Lookup;

pub struct FindCommand;

const USAGE: &str = "find: usage: find [pattern] [-r] [--in=dir] [--depth=N]\n";

#[async_trait]
impl Command for FindCommand {
    fn name(&self) -> &'static str {
        "find"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut regex_mode = false;
        let mut root: Option<&str> = None;
        let mut max_depth: Option<usize> = None;
        let mut pattern: Option<&str> = None;

        for arg in &ctx.args {
            match arg.as_str() {
                "-r" => regex_mode = true,
                _ if arg.starts_with("--in=") => root = Some(&arg["--in=".len()..]),
                _ if arg.starts_with("--depth=") => match arg["--depth=".len()..].parse::<usize>() {
                    Ok(n) => max_depth = Some(n),
                    Err(_) => return CommandResult::usage(format!("find: invalid depth: '{}'\n", arg)),
                },
                _ => {
                    if pattern.is_some() {
                        return CommandResult::usage(USAGE.to_string());
                    }
                    pattern = Some(arg.as_str());
                }
            }
        }
        let pattern = pattern.unwrap_or("");

        // 正则只编译一次
        let matcher = if regex_mode {
            match NameMatcher::regex(pattern) {
                Ok(m) => m,
                Err(e) => return CommandResult::usage(format!("find: invalid regex '{}': {}\n", pattern, e)),
            }
        } else {
            NameMatcher::substring(pattern)
        };

        let root_path = match ctx.resolve(root, Lookup::Follow).await {
            Ok(p) => p,
            Err(e) => {
                return CommandResult::error(format!("find: '{}': {}\n", root.unwrap_or("."), e.reason()));
            }
        };

        tracing::debug!(root = %root_path, pattern, regex_mode, "search started");
        let mut search = Search::new(ctx.fs.as_ref(), &root_path, matcher, max_depth, ctx.interrupt.clone());
        let mut stdout = String::new();
        while let Some(item) = search.next().await {
            match item {
                Ok(path) => ctx.emit(&mut stdout, &path.display().to_string()),
                Err(e) if e.is_interrupted() => {
                    return CommandResult::with_exit_code(stdout, "find: interrupted\n".to_string(), EXIT_INTERRUPTED);
                }
                Err(e) => {
                    return CommandResult::with_exit_code(
                        stdout,
                        format!("find: '{}': {}\n", root.unwrap_or("."), e.reason()),
                        1,
                    );
                }
            }
        }

        CommandResult::success(stdout)
    }
}
