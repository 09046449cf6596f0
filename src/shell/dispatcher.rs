//! Session/command dispatcher.
//!
//! Owns the session and routes each tokenized command either to a builtin
//! or to the command registry.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::commands::types::{ConfirmFn, StreamFn};
use crate::commands::{create_default_registry, CommandContext, CommandRegistry, CommandResult};
use crate::fs::{AbsolutePath, FileSystem, RealFs};
use crate::interrupt::Interrupt;

use super::builtins::{handle_cd, handle_force, handle_help, handle_pwd, is_builtin};
use super::session::Session;
use super::tokenize::tokenize;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Cannot access start directory: {dir}")]
    StartDirectory { dir: String },
}

/// Options for creating a shell.
pub struct ShellOptions {
    /// Initial directory; the process working directory when absent
    pub start_dir: Option<String>,
    /// Ask before recursive deletes (`--force` clears it)
    pub confirm_destructive: bool,
    /// Target of a bare `cd`; `$HOME`, then `/`, when absent
    pub home: Option<String>,
    /// File system instance (defaults to RealFs)
    pub fs: Option<Arc<dyn FileSystem>>,
    pub confirm_fn: Option<ConfirmFn>,
    pub stream_fn: Option<StreamFn>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            start_dir: None,
            confirm_destructive: true,
            home: None,
            fs: None,
            confirm_fn: None,
            stream_fn: None,
        }
    }
}

/// Result of dispatching one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Every command on the line ran; output is concatenated and the exit
    /// code is the last command's
    Done(CommandResult),
    /// `exit`/`quit` was reached; output of earlier commands on the line
    Exit(CommandResult),
}

pub struct Shell {
    fs: Arc<dyn FileSystem>,
    registry: CommandRegistry,
    session: Session,
    interrupt: Interrupt,
    confirm_fn: Option<ConfirmFn>,
    stream_fn: Option<StreamFn>,
}

impl Shell {
    /// Create a shell rooted at the resolved start directory.
    pub async fn new(options: ShellOptions) -> Result<Self, StartupError> {
        let fs: Arc<dyn FileSystem> = options.fs.unwrap_or_else(|| Arc::new(RealFs::new()));

        let requested = options.start_dir.unwrap_or_else(|| ".".to_string());
        let start_error = || StartupError::StartDirectory { dir: requested.clone() };
        let joined = match std::env::current_dir() {
            Ok(cwd) => cwd.join(&requested),
            Err(_) => PathBuf::from(&requested),
        };
        let canonical = fs.canonicalize(&joined).await.map_err(|_| start_error())?;
        match fs.stat(&canonical).await {
            Ok(st) if st.is_directory() => {}
            _ => return Err(start_error()),
        }
        let cwd = AbsolutePath::from_canonical(canonical).ok_or_else(start_error)?;

        let home = options
            .home
            .or_else(|| std::env::var("HOME").ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "/".to_string());

        tracing::info!(cwd = %cwd, confirm = options.confirm_destructive, "session started");

        Ok(Self {
            fs,
            registry: create_default_registry(),
            session: Session::new(cwd, options.confirm_destructive, home),
            interrupt: Interrupt::new(),
            confirm_fn: options.confirm_fn,
            stream_fn: options.stream_fn,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The token polled by every command this shell runs.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn prompt(&self) -> String {
        self.session.prompt()
    }

    /// Tokenize and run one input line.
    pub async fn exec_line(&mut self, line: &str) -> Dispatch {
        let commands = match tokenize(line) {
            Ok(c) => c,
            Err(e) => return Dispatch::Done(CommandResult::usage(format!("file-explorer: {}\n", e))),
        };

        let mut combined = CommandResult::success(String::new());
        for words in commands {
            let Some((name, args)) = words.split_first() else {
                continue;
            };
            if name == "exit" || name == "quit" {
                tracing::info!("session ending");
                return Dispatch::Exit(combined);
            }
            let result = self.exec_command(name, args).await;
            combined.stdout.push_str(&result.stdout);
            combined.stderr.push_str(&result.stderr);
            combined.exit_code = result.exit_code;
        }
        Dispatch::Done(combined)
    }

    async fn exec_command(&mut self, name: &str, args: &[String]) -> CommandResult {
        tracing::debug!(command = name, ?args, "dispatch");

        if is_builtin(name) {
            return match name {
                "cd" => handle_cd(&mut self.session, self.fs.as_ref(), args).await,
                "pwd" => handle_pwd(&self.session),
                "force" => handle_force(&mut self.session, args),
                _ => handle_help(),
            };
        }

        let Some(cmd) = self.registry.get(name) else {
            return CommandResult::with_exit_code(
                String::new(),
                format!("{}: command not found (type 'help')\n", name),
                127,
            );
        };

        let ctx = CommandContext {
            args: args.to_vec(),
            cwd: self.session.cwd.clone(),
            fs: self.fs.clone(),
            interrupt: self.interrupt.clone(),
            confirm_destructive: self.session.confirm_destructive,
            confirm_fn: self.confirm_fn.clone(),
            stream_fn: self.stream_fn.clone(),
        };
        cmd.execute(ctx).await
    }
}
