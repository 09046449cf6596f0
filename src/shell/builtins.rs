//! Builtins that read or change the session itself.

use crate::commands::CommandResult;
use crate::fs::{resolve, FileSystem, Lookup};

use super::session::Session;

pub const HELP_TEXT: &str = "\
Commands:
  pwd                              - print current directory
  ls [-a] [-l] [--tree] [--depth=N] [path]
  cd [path]                        - change directory (default: $HOME)
  cp <src> <dst>                   - copy file/dir (recursive)
  mv <src> <dst>                   - move/rename
  rm <path> [more...]              - remove file/dir (recursive, asks to confirm)
  mkdir <dir> [more...]            - create directories (parents as needed)
  touch <file> [more...]           - create/update files
  cat <file>                       - print file content
  find [pattern] [-r] [--in=dir] [--depth=N]
                                   - search by substring (default) or regex (-r)
  chmod <octal|spec> <path> [...]  - change permissions, e.g. 755 or u+x,g-w,a+r
  info [path]                      - show metadata (size, perms, owner)
  tree [path] [--depth=N]          - alias for ls --tree [--depth=N]
  force on|off                     - toggle destructive operations confirmation
  help                             - this help
  exit / quit                      - leave program
";

/// Names handled here rather than by the command registry.
pub fn is_builtin(name: &str) -> bool {
    matches!(name, "cd" | "pwd" | "force" | "help" | "exit" | "quit")
}

/// Handle the cd builtin
pub async fn handle_cd(session: &mut Session, fs: &dyn FileSystem, args: &[String]) -> CommandResult {
    if args.len() > 1 {
        return CommandResult::usage("cd: usage: cd [path]\n".to_string());
    }
    let target = match args.first().map(String::as_str) {
        None | Some("~") => session.home.clone(),
        Some(t) => t.to_string(),
    };

    let path = match resolve(fs, Some(&target), &session.cwd, Lookup::Follow).await {
        Ok(p) => p,
        Err(e) => return CommandResult::error(format!("cd: {}: {}\n", target, e.reason())),
    };
    match fs.stat(&path).await {
        Ok(st) if st.is_directory() => {}
        Ok(_) => return CommandResult::error(format!("cd: {}: Not a directory\n", target)),
        Err(e) => return CommandResult::error(format!("cd: {}: {}\n", target, e.reason())),
    }

    tracing::debug!(from = %session.cwd, to = %path, "changing directory");
    session.cwd = path;
    CommandResult::success(String::new())
}

/// Handle the force builtin. `force on` turns confirmation off.
pub fn handle_force(session: &mut Session, args: &[String]) -> CommandResult {
    match args {
        [] => {
            let state = if session.confirm_destructive { "off" } else { "on" };
            CommandResult::success(format!("force is {}\n", state))
        }
        [arg] if arg == "on" => {
            session.confirm_destructive = false;
            CommandResult::success(String::new())
        }
        [arg] if arg == "off" => {
            session.confirm_destructive = true;
            CommandResult::success(String::new())
        }
        _ => CommandResult::usage("force: usage: force on|off\n".to_string()),
    }
}

pub fn handle_pwd(session: &Session) -> CommandResult {
    CommandResult::success(format!("{}\n", session.cwd))
}

pub fn handle_help() -> CommandResult {
    CommandResult::success(HELP_TEXT.to_string())
}
