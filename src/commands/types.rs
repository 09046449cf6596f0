// src/commands/types.rs
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::fs::{resolve, AbsolutePath, FileSystem, FsError, Lookup, RealFs};
use crate::interrupt::Interrupt;

/// Callback asking the user a yes/no question (used by rm)
/// Parameter: the prompt text, without trailing newline
pub type ConfirmFn = Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// Callback receiving output lines as they are produced (used by find)
pub type StreamFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Exit code of a command stopped by an interrupt
pub const EXIT_INTERRUPTED: i32 = 130;

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(stdout: String) -> Self {
        Self { stdout, stderr: String::new(), exit_code: 0 }
    }

    pub fn error(stderr: String) -> Self {
        Self { stdout: String::new(), stderr, exit_code: 1 }
    }

    /// Wrong argument count or shape
    pub fn usage(stderr: String) -> Self {
        Self { stdout: String::new(), stderr, exit_code: 2 }
    }

    pub fn with_exit_code(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self { stdout, stderr, exit_code }
    }
}

/// 命令执行上下文
pub struct CommandContext {
    pub args: Vec<String>,
    pub cwd: AbsolutePath,
    pub fs: Arc<dyn FileSystem>,
    pub interrupt: Interrupt,
    /// Ask before each destructive top-level operation
    pub confirm_destructive: bool,
    pub confirm_fn: Option<ConfirmFn>,
    /// When set, streaming commands hand lines here instead of buffering
    pub stream_fn: Option<StreamFn>,
}

impl CommandContext {
    /// Context over the real filesystem with confirmation disabled.
    pub fn new(args: Vec<String>, cwd: AbsolutePath) -> Self {
        Self {
            args,
            cwd,
            fs: Arc::new(RealFs::new()),
            interrupt: Interrupt::new(),
            confirm_destructive: false,
            confirm_fn: None,
            stream_fn: None,
        }
    }

    /// Resolve a path argument against the current directory.
    pub async fn resolve(&self, token: Option<&str>, lookup: Lookup) -> Result<AbsolutePath, FsError> {
        resolve(self.fs.as_ref(), token, &self.cwd, lookup).await
    }

    /// Ask `prompt`; without a callback the answer is no.
    pub async fn confirm(&self, prompt: String) -> bool {
        match &self.confirm_fn {
            Some(f) => f(prompt).await,
            None => false,
        }
    }

    /// Write one line of output, streaming it if a sink is attached.
    pub fn emit(&self, stdout: &mut String, line: &str) {
        match &self.stream_fn {
            Some(f) => f(line),
            None => {
                stdout.push_str(line);
                stdout.push('\n');
            }
        }
    }
}

/// 命令 trait
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    async fn execute(&self, ctx: CommandContext) -> CommandResult;
}
