// src/commands/rm/mod.rs
use async_trait::async_trait;
use crate::commands::types::EXIT_INTERRUPTED;
use crate::commands::utils::report::push_report;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::tree_ops::delete;
use crate::fs::Lookup;

pub struct RmCommand;

#[async_trait]
impl Command for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let paths: Vec<&String> = ctx
            .args
            .iter()
            // 总是递归删除
            .filter(|a| !matches!(a.as_str(), "-r" | "-R" | "-rf" | "-fr" | "--recursive"))
            .collect();
        if paths.is_empty() {
            return CommandResult::usage("rm: usage: rm <path>...\n".to_string());
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for path in paths {
            let target = match ctx.resolve(Some(path), Lookup::NoFollow).await {
                Ok(t) => t,
                Err(e) if e.is_not_found() => {
                    stderr.push_str(&format!("rm: no such file or directory: {}\n", path));
                    exit_code = 1;
                    continue;
                }
                Err(e) => {
                    stderr.push_str(&format!("rm: cannot remove '{}': {}\n", path, e.reason()));
                    exit_code = 1;
                    continue;
                }
            };

            if target.is_root() {
                stderr.push_str("rm: refusing to remove '/'\n");
                exit_code = 1;
                continue;
            }

            if ctx.confirm_destructive {
                let prompt = format!("Delete '{}' recursively? [y/N]: ", target);
                if !ctx.confirm(prompt).await {
                    stdout.push_str(&format!("rm: skipped '{}'\n", target));
                    continue;
                }
            }

            tracing::debug!(target = %target, "removing");
            match delete(ctx.fs.as_ref(), &target, &ctx.interrupt).await {
                Ok(report) => {
                    if push_report("rm", &report, &mut stderr) {
                        exit_code = 1;
                    }
                    if report.interrupted {
                        // 中断后不再处理剩余参数
                        return CommandResult::with_exit_code(stdout, stderr, EXIT_INTERRUPTED);
                    }
                }
                Err(e) => {
                    stderr.push_str(&format!("rm: cannot remove '{}': {}\n", path, e.reason()));
                    exit_code = 1;
                }
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}
