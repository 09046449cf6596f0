// src/commands/tree_cmd.rs
use async_trait::async_trait;
use crate::commands::ls::run_ls;
use crate::commands::{Command, CommandContext, CommandResult};

/// `tree [path] [--depth=N]`, an alias for `ls --tree`
pub struct TreeCommand;

#[async_trait]
impl Command for TreeCommand {
    fn name(&self) -> &'static str {
        "tree"
    }

    async fn execute(&self, mut ctx: CommandContext) -> CommandResult {
        ctx.args.insert(0, "--tree".to_string());
        run_ls(&ctx, "tree").await
    }
}
