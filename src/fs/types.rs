//! File System Types
//!
//! Core types and traits for the filesystem backend.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

use super::permissions::PermissionSet;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("is a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("permission denied, {operation} '{path}'")]
    PermissionDenied { path: String, operation: String },

    #[error("unsupported file type, {operation} '{path}'")]
    Unsupported { path: String, operation: String },

    #[error("cannot {operation} a directory into itself, '{path}'")]
    IntoItself { path: String, operation: String },

    #[error("cross-device link, {operation} '{path}'")]
    CrossDevice { path: String, operation: String },

    #[error("interrupted, {operation} '{path}'")]
    Interrupted { path: String, operation: String },

    #[error("{message}, {operation} '{path}'")]
    Io { path: String, operation: String, message: String },
}

impl FsError {
    /// Map an io::Error raised by `operation` on `path`.
    pub fn from_io(err: io::Error, operation: &str, path: &Path) -> Self {
        let path = path.display().to_string();
        let operation = operation.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path, operation },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path, operation },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path, operation },
            _ => match err.raw_os_error() {
                Some(libc::EISDIR) => FsError::IsDirectory { path, operation },
                Some(libc::ENOTDIR) => FsError::NotDirectory { path, operation },
                Some(libc::EXDEV) => FsError::CrossDevice { path, operation },
                _ => FsError::Io { path, operation, message: err.to_string() },
            },
        }
    }

    pub fn not_found(operation: &str, path: &Path) -> Self {
        FsError::NotFound { path: path.display().to_string(), operation: operation.to_string() }
    }

    pub fn interrupted(operation: &str, path: &Path) -> Self {
        FsError::Interrupted { path: path.display().to_string(), operation: operation.to_string() }
    }

    /// Short, `strerror`-like reason without the operation and path.
    pub fn reason(&self) -> String {
        match self {
            FsError::NotFound { .. } => "No such file or directory".into(),
            FsError::AlreadyExists { .. } => "File exists".into(),
            FsError::IsDirectory { .. } => "Is a directory".into(),
            FsError::NotDirectory { .. } => "Not a directory".into(),
            FsError::PermissionDenied { .. } => "Permission denied".into(),
            FsError::Unsupported { .. } => "Unsupported file type".into(),
            FsError::IntoItself { operation, .. } => format!("cannot {} a directory into itself", operation),
            FsError::CrossDevice { .. } => "Invalid cross-device link".into(),
            FsError::Interrupted { .. } => "Interrupted".into(),
            FsError::Io { message, .. } => message.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, FsError::Interrupted { .. })
    }
}

/// Kind of a filesystem entry, as seen without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_file() {
            EntryKind::Regular
        } else {
            EntryKind::Other
        }
    }

    /// Single-character tag used by long listings
    pub fn tag(self) -> char {
        match self {
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
            EntryKind::Regular => '-',
            EntryKind::Other => '?',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Regular => "file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
            EntryKind::Other => "other",
        }
    }
}

/// File status information
#[derive(Debug, Clone)]
pub struct FsStat {
    pub kind: EntryKind,
    /// Full st_mode permission bits, including setuid/setgid/sticky
    pub mode: u32,
    pub size: u64,
    pub uid: u32,
    pub mtime: SystemTime,
}

impl FsStat {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::Regular
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    pub fn permissions(&self) -> PermissionSet {
        PermissionSet::from_mode(self.mode)
    }
}

/// Directory entry with type information
#[derive(Debug, Clone)]
pub struct DirentEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// A single visited filesystem entry. Built on demand during traversal and
/// dropped afterwards, never cached between commands.
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Only present for regular files
    pub size: Option<u64>,
    pub permissions: PermissionSet,
    pub uid: u32,
    pub modified: SystemTime,
    pub symlink_target: Option<PathBuf>,
}

impl FsEntry {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Abstract filesystem interface. Every path handed to it is expected to be
/// absolute; resolution against the session directory happens in `fs::path`.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the contents of a file as bytes
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Create an empty file if it does not exist yet
    async fn create_file(&self, path: &Path) -> Result<(), FsError>;

    /// Check if a path exists (without following a final symlink)
    async fn exists(&self, path: &Path) -> bool {
        self.lstat(path).await.is_ok()
    }

    /// Get file/directory information (follows symlinks)
    async fn stat(&self, path: &Path) -> Result<FsStat, FsError>;

    /// Get file/directory information (does not follow symlinks)
    async fn lstat(&self, path: &Path) -> Result<FsStat, FsError>;

    /// Create a directory and every missing parent
    async fn mkdir_all(&self, path: &Path) -> Result<(), FsError>;

    /// Read directory contents with file type information, in backend order
    async fn readdir(&self, path: &Path) -> Result<Vec<DirentEntry>, FsError>;

    /// Remove a file or symlink
    async fn remove_file(&self, path: &Path) -> Result<(), FsError>;

    /// Remove an empty directory
    async fn remove_dir(&self, path: &Path) -> Result<(), FsError>;

    /// Copy a regular file's contents, overwriting the destination
    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64, FsError>;

    /// Atomically rename a file or directory
    async fn rename(&self, src: &Path, dest: &Path) -> Result<(), FsError>;

    /// Replace the rwx bits of a path, keeping its special bits
    async fn chmod(&self, path: &Path, permissions: PermissionSet) -> Result<(), FsError>;

    /// Create a symbolic link at `link_path` whose text is `target`
    async fn symlink(&self, target: &Path, link_path: &Path) -> Result<(), FsError>;

    /// Read the unresolved target text of a symbolic link
    async fn readlink(&self, path: &Path) -> Result<PathBuf, FsError>;

    /// Resolve all symlinks and `.`/`..` in an existing path
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError>;

    /// Set modification time of a file
    async fn set_mtime(&self, path: &Path, mtime: SystemTime) -> Result<(), FsError>;

    /// Describe `path` without following it
    async fn entry(&self, path: &Path) -> Result<FsEntry, FsError> {
        let st = self.lstat(path).await?;
        let symlink_target = if st.is_symlink() {
            self.readlink(path).await.ok()
        } else {
            None
        };
        Ok(FsEntry {
            path: path.to_path_buf(),
            kind: st.kind,
            size: if st.is_file() { Some(st.size) } else { None },
            permissions: st.permissions(),
            uid: st.uid,
            modified: st.mtime,
            symlink_target,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
