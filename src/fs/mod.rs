//! File System Module
//!
//! The command engine over the real filesystem:
//! - `RealFs`: the `FileSystem` backend over `tokio::fs`
//! - `path`: resolution of user-supplied path tokens
//! - `permissions`: chmod mode decoding
//! - `tree_ops`: recursive copy, move and delete
//! - `search`: lazy filename search
//! - `listing`: flat and tree directory listings

pub mod types;
pub mod real_fs;
pub mod path;
pub mod permissions;
pub mod tree_ops;
pub mod search;
pub mod listing;

pub use types::*;
pub use real_fs::RealFs;
pub use path::{resolve, AbsolutePath, Lookup};
pub use permissions::{decode, InvalidModeSpec, PermissionSet};
