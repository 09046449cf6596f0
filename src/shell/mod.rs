//! Session/command dispatcher and the interactive surface around it.

pub mod builtins;
pub mod dispatcher;
pub mod repl;
pub mod session;
pub mod tokenize;

pub use dispatcher::{Dispatch, Shell, ShellOptions, StartupError};
pub use repl::{run_interactive, stdin_confirm, stdout_stream};
pub use session::Session;
pub use tokenize::{tokenize, TokenizeError};
