// src/commands/info_cmd/mod.rs
use async_trait::async_trait;
use crate::commands::utils::format::{format_time, human_size, owner_name};
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::{EntryKind, Lookup};

pub struct InfoCommand;

#[async_trait]
impl Command for InfoCommand {
    fn name(&self) -> &'static str {
        "info"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.len() > 1 {
            return CommandResult::usage("info: usage: info [path]\n".to_string());
        }
        let token = ctx.args.first().map(String::as_str);

        let entry = match ctx.resolve(token, Lookup::NoFollow).await {
            Ok(path) => ctx.fs.entry(&path).await,
            Err(e) => Err(e),
        };
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                return CommandResult::error(format!("info: cannot access '{}': {}\n", token.unwrap_or("."), e.reason()));
            }
        };

        let mut stdout = String::new();
        stdout.push_str(&format!("Path: {}\n", entry.path.display()));
        stdout.push_str(&format!("Type: {}\n", entry.kind.label()));
        if let (EntryKind::Regular, Some(bytes)) = (entry.kind, entry.size) {
            stdout.push_str(&format!("Size: {} ({} bytes)\n", human_size(bytes), bytes));
        }
        if let Some(target) = &entry.symlink_target {
            stdout.push_str(&format!("Target: {}\n", target.display()));
        }
        stdout.push_str(&format!(
            "Perms: {} ({:03o})\n",
            entry.permissions.to_rwx_string(),
            entry.permissions
        ));
        stdout.push_str(&format!("Owner: {}\n", owner_name(entry.uid)));
        stdout.push_str(&format!("Modified: {}\n", format_time(entry.modified)));

        CommandResult::success(stdout)
    }
}
