//! Traversal/Search Engine
//!
//! Depth-first, pre-order walk below a root directory that yields the paths
//! whose file name matches. Results are produced one at a time as the walk
//! advances, so a caller can print them as they are found and stop at any
//! point.

use std::path::PathBuf;

use regex_lite::Regex;

use super::path::AbsolutePath;
use super::tree_ops::sorted_children;
use super::types::{DirentEntry, EntryKind, FileSystem, FsError};
use crate::interrupt::Interrupt;

/// How a file name is matched.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Literal substring; the empty pattern matches every name
    Substring(String),
    /// Unanchored regex search against the file name only
    Regex(Regex),
}

impl NameMatcher {
    pub fn substring(pattern: &str) -> Self {
        NameMatcher::Substring(pattern.to_string())
    }

    /// Compile `pattern` once for the whole walk.
    pub fn regex(pattern: &str) -> Result<Self, regex_lite::Error> {
        Regex::new(pattern).map(NameMatcher::Regex)
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Substring(p) => name.contains(p.as_str()),
            NameMatcher::Regex(re) => re.is_match(name),
        }
    }
}

struct Frame {
    dir: PathBuf,
    children: std::vec::IntoIter<DirentEntry>,
    /// depth of `children`; the root's children are at depth 1
    depth: usize,
}

/// A lazy search. Call `next` until it returns `None`.
pub struct Search<'a> {
    fs: &'a dyn FileSystem,
    root: Option<PathBuf>,
    matcher: NameMatcher,
    max_depth: Option<usize>,
    interrupt: Interrupt,
    stack: Vec<Frame>,
    finished: bool,
}

impl<'a> Search<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        root: &AbsolutePath,
        matcher: NameMatcher,
        max_depth: Option<usize>,
        interrupt: Interrupt,
    ) -> Self {
        Search {
            fs,
            root: Some(root.to_path_buf()),
            matcher,
            max_depth,
            interrupt,
            stack: Vec::new(),
            finished: false,
        }
    }

    /// Advance to the next match.
    ///
    /// Directories that cannot be read are skipped. If the interrupt is
    /// raised, yields `FsError::Interrupted` once and then ends.
    pub async fn next(&mut self) -> Option<Result<PathBuf, FsError>> {
        if let Some(root) = self.root.take() {
            if self.max_depth == Some(0) {
                self.finished = true;
            } else {
                match sorted_children(self.fs, &root).await {
                    Ok(children) => self.stack.push(Frame { dir: root, children: children.into_iter(), depth: 1 }),
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                }
            }
        }

        while !self.finished {
            let Some(frame) = self.stack.last_mut() else {
                self.finished = true;
                break;
            };
            let Some(child) = frame.children.next() else {
                self.stack.pop();
                continue;
            };
            let path = frame.dir.join(&child.name);
            let depth = frame.depth;

            if self.interrupt.is_triggered() {
                self.finished = true;
                return Some(Err(FsError::interrupted("search", &path)));
            }

            if child.kind == EntryKind::Directory && self.max_depth.map_or(true, |max| depth < max) {
                match sorted_children(self.fs, &path).await {
                    Ok(children) => self.stack.push(Frame {
                        dir: path.clone(),
                        children: children.into_iter(),
                        depth: depth + 1,
                    }),
                    Err(e) => tracing::debug!(error = %e, "skipping unreadable directory"),
                }
            }

            if self.matcher.matches(&child.name) {
                return Some(Ok(path));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AbsolutePath) {
        let tmp = TempDir::new().unwrap();
        let base = std::fs::canonicalize(tmp.path()).unwrap();
        std::fs::create_dir_all(base.join("a/deep")).unwrap();
        std::fs::create_dir_all(base.join("b")).unwrap();
        std::fs::write(base.join("a/notes.txt"), "").unwrap();
        std::fs::write(base.join("a/deep/report.md"), "").unwrap();
        std::fs::write(base.join("b/notes.md"), "").unwrap();
        std::fs::write(base.join("top.txt"), "").unwrap();
        (tmp, AbsolutePath::from_canonical(base).unwrap())
    }

    async fn drain(mut search: Search<'_>, base: &AbsolutePath) -> (Vec<String>, Option<FsError>) {
        let mut found = Vec::new();
        while let Some(item) = search.next().await {
            match item {
                Ok(p) => found.push(p.strip_prefix(base.as_path()).unwrap().display().to_string()),
                Err(e) => return (found, Some(e)),
            }
        }
        (found, None)
    }

    #[tokio::test]
    async fn test_empty_substring_matches_everything_in_order() {
        let (_tmp, base) = setup();
        let search = Search::new(&RealFs, &base, NameMatcher::substring(""), None, Interrupt::new());
        let (found, err) = drain(search, &base).await;
        assert!(err.is_none());
        assert_eq!(
            found,
            vec!["a", "a/deep", "a/deep/report.md", "a/notes.txt", "b", "b/notes.md", "top.txt"]
        );
    }

    #[tokio::test]
    async fn test_substring_matches_file_name_only() {
        let (_tmp, base) = setup();
        let search = Search::new(&RealFs, &base, NameMatcher::substring("notes"), None, Interrupt::new());
        let (found, _) = drain(search, &base).await;
        assert_eq!(found, vec!["a/notes.txt", "b/notes.md"]);

        // "deep" is a path component of report.md, not part of its name
        let search = Search::new(&RealFs, &base, NameMatcher::substring("deep"), None, Interrupt::new());
        let (found, _) = drain(search, &base).await;
        assert_eq!(found, vec!["a/deep"]);
    }

    #[tokio::test]
    async fn test_anchored_regex() {
        let (_tmp, base) = setup();
        let matcher = NameMatcher::regex(r"\.md$").unwrap();
        let search = Search::new(&RealFs, &base, matcher, None, Interrupt::new());
        let (found, _) = drain(search, &base).await;
        assert_eq!(found, vec!["a/deep/report.md", "b/notes.md"]);

        let matcher = NameMatcher::regex("^a$").unwrap();
        let search = Search::new(&RealFs, &base, matcher, None, Interrupt::new());
        let (found, _) = drain(search, &base).await;
        assert_eq!(found, vec!["a"]);
    }

    #[test]
    fn test_invalid_regex() {
        assert!(NameMatcher::regex("(unclosed").is_err());
    }

    #[tokio::test]
    async fn test_max_depth_bounds_walk() {
        let (_tmp, base) = setup();
        let search = Search::new(&RealFs, &base, NameMatcher::substring(""), Some(1), Interrupt::new());
        let (found, _) = drain(search, &base).await;
        assert_eq!(found, vec!["a", "b", "top.txt"]);

        let search = Search::new(&RealFs, &base, NameMatcher::substring(""), Some(0), Interrupt::new());
        let (found, _) = drain(search, &base).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_ends_search_with_error() {
        let (_tmp, base) = setup();
        let interrupt = Interrupt::new();
        let mut search = Search::new(&RealFs, &base, NameMatcher::substring(""), None, interrupt.clone());

        let first = search.next().await.unwrap().unwrap();
        assert!(first.ends_with("a"));
        interrupt.trigger();
        let err = search.next().await.unwrap().unwrap_err();
        assert!(err.is_interrupted());
        assert!(search.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_skipped() {
        if unsafe { libc::geteuid() } == 0 {
            // root ignores directory permissions
            return;
        }
        let (_tmp, base) = setup();
        let locked = base.join("b");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let search = Search::new(&RealFs, &base, NameMatcher::substring("notes"), None, Interrupt::new());
        let (found, err) = drain(search, &base).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(err.is_none());
        assert_eq!(found, vec!["a/notes.txt"]);
    }
}
