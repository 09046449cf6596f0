// src/commands/mv/mod.rs
use async_trait::async_trait;
use crate::commands::cp::landing_path;
use crate::commands::types::EXIT_INTERRUPTED;
use crate::commands::utils::report::push_report;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::tree_ops::move_path;
use crate::fs::Lookup;

pub struct MvCommand;

const USAGE: &str = "mv: usage: mv <src> <dst>\n";

#[async_trait]
impl Command for MvCommand {
    fn name(&self) -> &'static str {
        "mv"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.len() != 2 {
            return CommandResult::usage(USAGE.to_string());
        }
        let (src, dest) = (ctx.args[0].as_str(), ctx.args[1].as_str());

        // 移动的是链接本身
        let src_path = match ctx.resolve(Some(src), Lookup::NoFollow).await {
            Ok(p) => p,
            Err(e) => {
                return CommandResult::error(format!("mv: cannot stat '{}': {}\n", src, e.reason()));
            }
        };
        let dest_path = match ctx.resolve(Some(dest), Lookup::Create).await {
            Ok(p) => p,
            Err(e) => {
                return CommandResult::error(format!("mv: cannot move to '{}': {}\n", dest, e.reason()));
            }
        };
        let target = landing_path(&ctx, &src_path, dest, dest_path).await;

        if target == src_path {
            return CommandResult::error(format!("mv: '{}' and '{}' are the same file\n", src, dest));
        }

        let report = match move_path(ctx.fs.as_ref(), &src_path, &target, &ctx.interrupt).await {
            Ok(r) => r,
            Err(e) => return CommandResult::error(format!("mv: {}: {}\n", src, e.reason())),
        };

        let mut stderr = String::new();
        if !push_report("mv", &report, &mut stderr) {
            return CommandResult::success(String::new());
        }
        let code = if report.interrupted { EXIT_INTERRUPTED } else { 1 };
        CommandResult::with_exit_code(String::new(), stderr, code)
    }
}
