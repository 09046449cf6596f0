//! Session state owned by the dispatcher.

use crate::fs::AbsolutePath;

/// Mutable state that lives for the whole session. Only `cd` and `force`
/// change it.
#[derive(Debug, Clone)]
pub struct Session {
    pub cwd: AbsolutePath,
    /// Ask before each top-level recursive delete
    pub confirm_destructive: bool,
    /// Target of a bare `cd`
    pub home: String,
}

impl Session {
    pub fn new(cwd: AbsolutePath, confirm_destructive: bool, home: String) -> Self {
        Self { cwd, confirm_destructive, home }
    }

    /// `[<cwd>]$ `
    pub fn prompt(&self) -> String {
        format!("[{}]$ ", self.cwd)
    }
}
