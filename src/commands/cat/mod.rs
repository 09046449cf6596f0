// src/commands/cat/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::Lookup;

pub struct CatCommand;

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.len() != 1 {
            return CommandResult::usage("cat: usage: cat <file>\n".to_string());
        }
        let file = ctx.args[0].as_str();

        let path = match ctx.resolve(Some(file), Lookup::Follow).await {
            Ok(p) => p,
            Err(e) => return CommandResult::error(format!("cat: {}: {}\n", file, e.reason())),
        };
        match ctx.fs.stat(&path).await {
            Ok(st) if st.is_directory() => {
                return CommandResult::error(format!("cat: {}: Is a directory\n", file));
            }
            Ok(_) => {}
            Err(e) => return CommandResult::error(format!("cat: {}: {}\n", file, e.reason())),
        }

        match ctx.fs.read_file(&path).await {
            // 非 UTF-8 内容按有损方式输出
            Ok(bytes) => CommandResult::success(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => CommandResult::error(format!("cat: {}: {}\n", file, e.reason())),
        }
    }
}
