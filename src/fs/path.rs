//! Path resolution.
//!
//! Turns a user-supplied path token plus the session directory into an
//! `AbsolutePath`. Nothing downstream of this module sees a raw token.

use std::fmt;
use std::ops::Deref;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

use super::types::{FileSystem, FsError};

/// A rooted path with `.`/`..` removed and, depending on how it was
/// resolved, symlinks followed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsolutePath(PathBuf);

impl AbsolutePath {
    /// Wrap a path already known to be canonical (e.g. from `canonicalize`).
    pub fn from_canonical(path: PathBuf) -> Option<Self> {
        if path.is_absolute() {
            Some(AbsolutePath(path))
        } else {
            None
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Append a single file name. Callers pass names read from a directory,
    /// never user tokens.
    pub fn child(&self, name: &str) -> AbsolutePath {
        AbsolutePath(self.0.join(name))
    }

    pub fn parent(&self) -> Option<AbsolutePath> {
        self.0.parent().map(|p| AbsolutePath(p.to_path_buf()))
    }

    pub fn file_name(&self) -> Option<String> {
        self.0.file_name().map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_root(&self) -> bool {
        self.0.parent().is_none()
    }
}

impl Deref for AbsolutePath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for AbsolutePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// How the final path component is treated during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The path must exist; every symlink, including the last, is followed.
    Follow,
    /// The path must exist; a symlink in the last position is kept as is.
    NoFollow,
    /// The path may not exist yet; the longest existing prefix is
    /// canonicalized and the rest appended.
    Create,
}

/// Resolve `token` against `base`. An absent token resolves to `base`.
pub async fn resolve(
    fs: &dyn FileSystem,
    token: Option<&str>,
    base: &AbsolutePath,
    lookup: Lookup,
) -> Result<AbsolutePath, FsError> {
    let joined = match token {
        None => base.as_path().to_path_buf(),
        Some(t) if Path::new(t).is_absolute() => PathBuf::from(t),
        Some(t) => base.as_path().join(t),
    };

    let resolved = match lookup {
        Lookup::Follow => fs.canonicalize(&joined).await?,
        Lookup::NoFollow => {
            let resolved = match split_last_name(&joined) {
                Some((parent, name)) => fs.canonicalize(&parent).await?.join(name),
                None => fs.canonicalize(&joined).await?,
            };
            fs.lstat(&resolved).await?;
            resolved
        }
        Lookup::Create => weakly_canonical(fs, &joined).await?,
    };

    AbsolutePath::from_canonical(resolved.clone())
        .ok_or_else(|| FsError::not_found("resolve", &resolved))
}

/// Split off a final plain name. `None` when the path ends in `/`, `.` or
/// `..`, which always name a directory and so are resolved in full.
fn split_last_name(path: &Path) -> Option<(PathBuf, &OsStr)> {
    let bytes = path.as_os_str().as_bytes();
    if bytes.ends_with(b"/") || bytes.ends_with(b"/.") {
        return None;
    }
    let components: Vec<Component> = path.components().collect();
    match components.split_last() {
        Some((Component::Normal(name), rest)) => Some((rest.iter().collect(), *name)),
        _ => None,
    }
}

/// Canonicalize the longest existing prefix of `path` as given, so `..`
/// after a symlink is taken relative to the link's target. Only the missing
/// suffix is folded lexically.
async fn weakly_canonical(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf, FsError> {
    let components: Vec<Component> = path.components().collect();
    let mut split = components.len();
    loop {
        let prefix: PathBuf = components[..split].iter().collect();
        match fs.canonicalize(&prefix).await {
            Ok(mut canonical) => {
                for component in &components[split..] {
                    match component {
                        Component::ParentDir => {
                            canonical.pop();
                        }
                        Component::Normal(name) => canonical.push(name),
                        _ => {}
                    }
                }
                return Ok(canonical);
            }
            Err(e) if e.is_not_found() && split > 1 => split -= 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFs;
    use tempfile::TempDir;

    async fn base(tmp: &TempDir) -> AbsolutePath {
        let canonical = std::fs::canonicalize(tmp.path()).unwrap();
        AbsolutePath::from_canonical(canonical).unwrap()
    }

    #[tokio::test]
    async fn test_absent_token_is_base() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        let got = resolve(&RealFs, None, &base, Lookup::Follow).await.unwrap();
        assert_eq!(got, base);
    }

    #[tokio::test]
    async fn test_relative_and_dotdot() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        std::fs::create_dir_all(base.join("a/b")).unwrap();

        let got = resolve(&RealFs, Some("a/b/.."), &base, Lookup::Follow).await.unwrap();
        assert_eq!(got.as_path(), base.join("a"));

        let abs = base.join("a/b").display().to_string();
        let got = resolve(&RealFs, Some(&abs), &base, Lookup::Follow).await.unwrap();
        assert_eq!(got.as_path(), base.join("a/b"));
    }

    #[tokio::test]
    async fn test_missing_path_fails_when_required() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        let err = resolve(&RealFs, Some("nope"), &base, Lookup::Follow).await.unwrap_err();
        assert!(err.is_not_found());
        let err = resolve(&RealFs, Some("nope"), &base, Lookup::NoFollow).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_follow_resolves_symlink() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        std::fs::create_dir(base.join("real")).unwrap();
        std::os::unix::fs::symlink("real", base.join("link")).unwrap();

        let followed = resolve(&RealFs, Some("link"), &base, Lookup::Follow).await.unwrap();
        assert_eq!(followed.as_path(), base.join("real"));

        let kept = resolve(&RealFs, Some("link"), &base, Lookup::NoFollow).await.unwrap();
        assert_eq!(kept.as_path(), base.join("link"));
    }

    #[tokio::test]
    async fn test_no_follow_accepts_dangling_link() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        std::os::unix::fs::symlink("missing-target", base.join("dangling")).unwrap();

        let got = resolve(&RealFs, Some("dangling"), &base, Lookup::NoFollow).await.unwrap();
        assert_eq!(got.as_path(), base.join("dangling"));
        assert!(resolve(&RealFs, Some("dangling"), &base, Lookup::Follow).await.is_err());
    }

    #[tokio::test]
    async fn test_create_allows_missing_leaf_and_parents() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        std::fs::create_dir(base.join("real")).unwrap();
        std::os::unix::fs::symlink("real", base.join("link")).unwrap();

        let got = resolve(&RealFs, Some("link/new/file.txt"), &base, Lookup::Create).await.unwrap();
        assert_eq!(got.as_path(), base.join("real/new/file.txt"));

        let got = resolve(&RealFs, Some("x/../y"), &base, Lookup::Create).await.unwrap();
        assert_eq!(got.as_path(), base.join("y"));
    }

    #[tokio::test]
    async fn test_dotdot_after_symlink_uses_link_target() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        std::fs::create_dir_all(base.join("real/inner")).unwrap();
        std::fs::write(base.join("real/victim.txt"), "r").unwrap();
        std::fs::write(base.join("victim.txt"), "b").unwrap();
        std::os::unix::fs::symlink("real/inner", base.join("link")).unwrap();

        for lookup in [Lookup::Follow, Lookup::NoFollow, Lookup::Create] {
            let got = resolve(&RealFs, Some("link/../victim.txt"), &base, lookup).await.unwrap();
            assert_eq!(got.as_path(), base.join("real/victim.txt"), "{:?}", lookup);
        }

        let got = resolve(&RealFs, Some("link/../new/x"), &base, Lookup::Create).await.unwrap();
        assert_eq!(got.as_path(), base.join("real/new/x"));
    }

    #[tokio::test]
    async fn test_no_follow_trailing_slash_or_dot_follows_link() {
        let tmp = TempDir::new().unwrap();
        let base = base(&tmp).await;
        std::fs::create_dir(base.join("real")).unwrap();
        std::os::unix::fs::symlink("real", base.join("link")).unwrap();

        for token in ["link/", "link/.", "link/sub/.."] {
            std::fs::create_dir_all(base.join("real/sub")).unwrap();
            let got = resolve(&RealFs, Some(token), &base, Lookup::NoFollow).await.unwrap();
            assert_eq!(got.as_path(), base.join("real"), "{}", token);
        }
    }
}
