//! Directory Lister
//!
//! Flat and tree listings of a directory, always sorted by file name.
//! Rendering to text is left to the caller.

use std::path::PathBuf;

use super::path::AbsolutePath;
use super::tree_ops::sorted_children;
use super::types::{DirentEntry, EntryKind, FileSystem, FsEntry, FsError};
use crate::interrupt::Interrupt;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Include names starting with `.`
    pub show_hidden: bool,
    /// Tree mode: recurse into subdirectories
    pub tree: bool,
    /// Levels of recursion in tree mode; 0 lists only the top directory
    pub depth: usize,
}

/// One line of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// `<parent prefix>/<name>`
    pub display: String,
    pub kind: EntryKind,
}

#[derive(Debug)]
pub enum Listing {
    /// The target is not a directory; describes the target itself
    Single(FsEntry),
    /// Direct children of the target
    Flat(Vec<FsEntry>),
    Tree { lines: Vec<TreeLine>, interrupted: bool },
}

fn visible(entry: &DirentEntry, show_hidden: bool) -> bool {
    show_hidden || !entry.name.starts_with('.')
}

fn join_display(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

/// List `target`. `display_root` is the prefix printed for the top
/// directory in tree mode (usually the path as the user typed it).
pub async fn list(
    fs: &dyn FileSystem,
    target: &AbsolutePath,
    display_root: &str,
    options: ListOptions,
    interrupt: &Interrupt,
) -> Result<Listing, FsError> {
    let is_dir = fs.stat(target).await.map(|st| st.is_directory()).unwrap_or(false);
    if !is_dir {
        return Ok(Listing::Single(fs.entry(target).await?));
    }

    let children = sorted_children(fs, target).await?;

    if !options.tree {
        let mut entries = Vec::with_capacity(children.len());
        for child in children.iter().filter(|c| visible(c, options.show_hidden)) {
            match fs.entry(&target.join(&child.name)).await {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::debug!(error = %e, "entry vanished while listing"),
            }
        }
        return Ok(Listing::Flat(entries));
    }

    struct Frame {
        dir: PathBuf,
        prefix: String,
        children: std::vec::IntoIter<DirentEntry>,
        levels_left: usize,
    }

    let mut lines = Vec::new();
    let mut stack = vec![Frame {
        dir: target.to_path_buf(),
        prefix: display_root.to_string(),
        children: children.into_iter(),
        levels_left: options.depth,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(child) = frame.children.next() else {
            stack.pop();
            continue;
        };
        if !visible(&child, options.show_hidden) {
            continue;
        }
        if interrupt.is_triggered() {
            return Ok(Listing::Tree { lines, interrupted: true });
        }

        let display = join_display(&frame.prefix, &child.name);
        let path = frame.dir.join(&child.name);
        let levels_left = frame.levels_left;
        lines.push(TreeLine { display: display.clone(), kind: child.kind });

        if child.kind == EntryKind::Directory && levels_left > 0 {
            match sorted_children(fs, &path).await {
                Ok(grandchildren) => stack.push(Frame {
                    dir: path,
                    prefix: display,
                    children: grandchildren.into_iter(),
                    levels_left: levels_left - 1,
                }),
                Err(e) => tracing::debug!(error = %e, "skipping unreadable directory"),
            }
        }
    }

    Ok(Listing::Tree { lines, interrupted: false })
}
