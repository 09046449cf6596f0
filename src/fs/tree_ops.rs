//! Recursive Tree Operator
//!
//! Copy, move and delete over a file or a whole directory subtree. Regular
//! files, directories and symlinks are handled distinctly: symlinks are
//! recreated from their unresolved target text and never dereferenced.
//!
//! Per-entry failures do not abort the walk. They are collected in a
//! `TreeReport` and the walk continues with the next entry. Only an observed
//! interrupt stops a walk early.

use std::path::{Path, PathBuf};

use super::path::AbsolutePath;
use super::types::{DirentEntry, EntryKind, FileSystem, FsError};
use crate::interrupt::Interrupt;

/// Outcome of a tree operation.
#[derive(Debug, Default)]
pub struct TreeReport {
    /// Entries copied, moved or removed
    pub entries: usize,
    /// Failures in walk order
    pub failures: Vec<FsError>,
    /// The walk stopped early because an interrupt was observed
    pub interrupted: bool,
}

impl TreeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    fn record(&mut self, result: Result<(), FsError>) {
        match result {
            Ok(()) => self.entries += 1,
            Err(e) => {
                tracing::warn!(error = %e, "tree operation entry failed");
                self.failures.push(e);
            }
        }
    }

    fn absorb(&mut self, other: TreeReport) {
        self.entries += other.entries;
        self.failures.extend(other.failures);
        self.interrupted |= other.interrupted;
    }
}

/// Children of `dir` sorted by name so walks are repeatable.
pub(crate) async fn sorted_children(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<DirentEntry>, FsError> {
    let mut entries = fs.readdir(dir).await?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn is_strictly_inside(path: &Path, ancestor: &Path) -> bool {
    path != ancestor && path.starts_with(ancestor)
}

async fn copy_symlink(fs: &dyn FileSystem, src: &Path, dst: &Path) -> Result<(), FsError> {
    let target = fs.readlink(src).await?;
    if let Ok(existing) = fs.lstat(dst).await {
        if !existing.is_directory() {
            fs.remove_file(dst).await?;
        }
    }
    fs.symlink(&target, dst).await
}

async fn copy_regular(fs: &dyn FileSystem, src: &Path, dst: &Path) -> Result<(), FsError> {
    if let Some(parent) = dst.parent() {
        fs.mkdir_all(parent).await?;
    }
    fs.copy_file(src, dst).await.map(|_| ())
}

/// Copy `src` to `dst`.
///
/// A directory source is recreated under `dst` with the same relative layout.
/// Existing regular files at the destination are overwritten.
pub async fn copy(
    fs: &dyn FileSystem,
    src: &AbsolutePath,
    dst: &AbsolutePath,
    interrupt: &Interrupt,
) -> Result<TreeReport, FsError> {
    let st = fs.lstat(src).await?;
    let mut report = TreeReport::default();

    match st.kind {
        EntryKind::Regular => report.record(copy_regular(fs, src, dst).await),
        EntryKind::Symlink => report.record(copy_symlink(fs, src, dst).await),
        EntryKind::Other => report.record(Err(FsError::Unsupported {
            path: src.to_string(),
            operation: "copy".into(),
        })),
        EntryKind::Directory => {
            if is_strictly_inside(dst, src) {
                return Err(FsError::IntoItself { path: src.to_string(), operation: "copy".into() });
            }
            fs.mkdir_all(dst).await?;
            report.entries += 1;
            copy_tree(fs, src, dst, interrupt, &mut report).await;
        }
    }

    Ok(report)
}

async fn copy_tree(
    fs: &dyn FileSystem,
    src_root: &Path,
    dst_root: &Path,
    interrupt: &Interrupt,
    report: &mut TreeReport,
) {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src_root.to_path_buf(), dst_root.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        let children = match sorted_children(fs, &src_dir).await {
            Ok(c) => c,
            Err(e) => {
                report.record(Err(e));
                continue;
            }
        };

        for child in children {
            if interrupt.is_triggered() {
                report.interrupted = true;
                return;
            }
            let from = src_dir.join(&child.name);
            let to = dst_dir.join(&child.name);
            match child.kind {
                EntryKind::Directory => {
                    let made = fs.mkdir_all(&to).await;
                    let ok = made.is_ok();
                    report.record(made);
                    if ok {
                        pending.push((from, to));
                    }
                }
                EntryKind::Symlink => report.record(copy_symlink(fs, &from, &to).await),
                EntryKind::Regular => report.record(copy_regular(fs, &from, &to).await),
                EntryKind::Other => report.record(Err(FsError::Unsupported {
                    path: from.display().to_string(),
                    operation: "copy".into(),
                })),
            }
        }
    }
}

/// Remove `target` and everything beneath it. A symlink is removed itself,
/// never the tree it points to.
pub async fn delete(
    fs: &dyn FileSystem,
    target: &AbsolutePath,
    interrupt: &Interrupt,
) -> Result<TreeReport, FsError> {
    let st = fs.lstat(target).await?;
    let mut report = TreeReport::default();

    if !st.is_directory() {
        report.record(fs.remove_file(target).await);
        return Ok(report);
    }

    // directories in pre-order; removed in reverse once emptied
    let mut dirs: Vec<PathBuf> = vec![target.to_path_buf()];
    let mut pending: Vec<PathBuf> = vec![target.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let children = match sorted_children(fs, &dir).await {
            Ok(c) => c,
            Err(e) => {
                report.record(Err(e));
                continue;
            }
        };
        for child in children {
            if interrupt.is_triggered() {
                report.interrupted = true;
                return Ok(report);
            }
            let path = dir.join(&child.name);
            if child.kind == EntryKind::Directory {
                dirs.push(path.clone());
                pending.push(path);
            } else {
                report.record(fs.remove_file(&path).await);
            }
        }
    }

    for dir in dirs.iter().rev() {
        if interrupt.is_triggered() {
            report.interrupted = true;
            return Ok(report);
        }
        report.record(fs.remove_dir(dir).await);
    }

    Ok(report)
}

/// Move `src` to `dst`.
///
/// A rename is tried first. When it fails because the two paths are on
/// different devices, the tree is copied and the source deleted. That
/// fallback is not transactional: if the copy is incomplete the source is
/// left in place, and if the delete fails both copies remain. Neither case is
/// rolled back; the failures are returned in the report.
pub async fn move_path(
    fs: &dyn FileSystem,
    src: &AbsolutePath,
    dst: &AbsolutePath,
    interrupt: &Interrupt,
) -> Result<TreeReport, FsError> {
    let st = fs.lstat(src).await?;
    if st.is_directory() && is_strictly_inside(dst, src) {
        return Err(FsError::IntoItself { path: src.to_string(), operation: "move".into() });
    }
    if let Some(parent) = dst.parent() {
        fs.mkdir_all(&parent).await?;
    }

    match fs.rename(src, dst).await {
        Ok(()) => Ok(TreeReport { entries: 1, ..TreeReport::default() }),
        Err(FsError::CrossDevice { .. }) => {
            tracing::debug!(src = %src, dst = %dst, "rename crossed devices, copying instead");
            move_by_copy(fs, src, dst, interrupt).await
        }
        Err(e) => Err(e),
    }
}

/// The copy-then-delete half of `move_path`.
pub async fn move_by_copy(
    fs: &dyn FileSystem,
    src: &AbsolutePath,
    dst: &AbsolutePath,
    interrupt: &Interrupt,
) -> Result<TreeReport, FsError> {
    let mut report = copy(fs, src, dst, interrupt).await?;
    if !report.is_clean() {
        report.failures.push(FsError::Io {
            path: src.to_string(),
            operation: "move".into(),
            message: "copy incomplete, source left in place".into(),
        });
        return Ok(report);
    }

    let removed = delete(fs, src, interrupt).await?;
    if !removed.is_clean() {
        tracing::warn!(src = %src, "source only partially removed after copy");
    }
    report.absorb(removed);
    Ok(report)
}
