// src/commands/chmod/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::{decode, FsError, Lookup, PermissionSet};

pub struct ChmodCommand;

async fn apply(ctx: &CommandContext, mode: &str, file: &str) -> Result<(), FsError> {
    let path = ctx.resolve(Some(file), Lookup::Follow).await?;
    let current = ctx.fs.stat(&path).await?.permissions();
    // 模式已校验过，这里不会失败
    let next = decode(mode, current).unwrap_or(current);
    let (from, to) = (format!("{:o}", current), format!("{:o}", next));
    tracing::debug!(path = %path, from = %from, to = %to, "chmod");
    ctx.fs.chmod(&path, next).await
}

#[async_trait]
impl Command for ChmodCommand {
    fn name(&self) -> &'static str {
        "chmod"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.len() < 2 {
            return CommandResult::usage("chmod: usage: chmod <octal|spec> <path>...\n".to_string());
        }
        let mode = ctx.args[0].as_str();
        if let Err(e) = decode(mode, PermissionSet::empty()) {
            return CommandResult::error(format!("chmod: {}\n", e));
        }

        let mut stderr = String::new();
        let mut exit_code = 0;
        for file in &ctx.args[1..] {
            if let Err(e) = apply(&ctx, mode, file).await {
                stderr.push_str(&format!("chmod: cannot change permissions of '{}': {}\n", file, e.reason()));
                exit_code = 1;
            }
        }

        CommandResult::with_exit_code(String::new(), stderr, exit_code)
    }
}
