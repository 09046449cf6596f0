// src/commands/mkdir/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::Lookup;

pub struct MkdirCommand;

#[async_trait]
impl Command for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        // 父目录总是自动创建，-p 接受但忽略
        let dirs: Vec<&String> = ctx.args.iter().filter(|a| !matches!(a.as_str(), "-p" | "--parents")).collect();
        if dirs.is_empty() {
            return CommandResult::usage("mkdir: usage: mkdir <dir>...\n".to_string());
        }

        let mut stderr = String::new();
        let mut exit_code = 0;

        for dir in dirs {
            let result = match ctx.resolve(Some(dir), Lookup::Create).await {
                Ok(path) => ctx.fs.mkdir_all(&path).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                stderr.push_str(&format!("mkdir: cannot create directory '{}': {}\n", dir, e.reason()));
                exit_code = 1;
            }
        }

        CommandResult::with_exit_code(String::new(), stderr, exit_code)
    }
}
