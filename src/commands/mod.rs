// src/commands/mod.rs
pub mod cat;
pub mod chmod;
pub mod cp;
pub mod find;
pub mod info_cmd;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod registry;
pub mod rm;
pub mod touch;
pub mod tree_cmd;
pub mod types;
pub mod utils;

pub use registry::{create_default_registry, CommandRegistry};
pub use types::{Command, CommandContext, CommandResult};
