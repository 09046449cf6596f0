//! file-explorer - an interactive shell for exploring and changing a
//! filesystem tree
//!
//! The `fs` module holds the engine: path resolution, the permission codec,
//! recursive copy/move/delete, search and directory listing. `commands`
//! exposes each operation as a shell command, and `shell` ties them to a
//! session with a current directory.

pub mod commands;
pub mod fs;
pub mod interrupt;
pub mod shell;

pub use interrupt::Interrupt;
pub use shell::{Shell, ShellOptions};
