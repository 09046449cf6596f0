//! Real filesystem backend.
//!
//! Thin mapping of the `FileSystem` trait onto `tokio::fs`. Errors are
//! converted to `FsError` tagged with the operation and path.

use async_trait::async_trait;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::permissions::PermissionSet;
use super::types::{DirentEntry, EntryKind, FileSystem, FsError, FsStat};

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        RealFs
    }
}

fn to_stat(meta: &std::fs::Metadata) -> FsStat {
    FsStat {
        kind: EntryKind::from_file_type(meta.file_type()),
        mode: meta.mode(),
        size: meta.size(),
        uid: meta.uid(),
        mtime: meta.modified().unwrap_or(UNIX_EPOCH),
    }
}

#[async_trait]
impl FileSystem for RealFs {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| FsError::from_io(e, "open", path))
    }

    async fn create_file(&self, path: &Path) -> Result<(), FsError> {
        tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .open(path)
            .await
            .map(|_| ())
            .map_err(|e| FsError::from_io(e, "open", path))
    }

    async fn stat(&self, path: &Path) -> Result<FsStat, FsError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| FsError::from_io(e, "stat", path))?;
        Ok(to_stat(&meta))
    }

    async fn lstat(&self, path: &Path) -> Result<FsStat, FsError> {
        let meta = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| FsError::from_io(e, "lstat", path))?;
        Ok(to_stat(&meta))
    }

    async fn mkdir_all(&self, path: &Path) -> Result<(), FsError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| FsError::from_io(e, "mkdir", path))
    }

    async fn readdir(&self, path: &Path) -> Result<Vec<DirentEntry>, FsError> {
        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| FsError::from_io(e, "scandir", path))?;
        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(e, "scandir", path))?
        {
            let kind = match entry.file_type().await {
                Ok(ft) => EntryKind::from_file_type(ft),
                Err(_) => EntryKind::Other,
            };
            entries.push(DirentEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| FsError::from_io(e, "unlink", path))
    }

    async fn remove_dir(&self, path: &Path) -> Result<(), FsError> {
        tokio::fs::remove_dir(path)
            .await
            .map_err(|e| FsError::from_io(e, "rmdir", path))
    }

    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64, FsError> {
        tokio::fs::copy(src, dest)
            .await
            .map_err(|e| FsError::from_io(e, "copyfile", dest))
    }

    async fn rename(&self, src: &Path, dest: &Path) -> Result<(), FsError> {
        tokio::fs::rename(src, dest)
            .await
            .map_err(|e| FsError::from_io(e, "rename", src))
    }

    async fn chmod(&self, path: &Path, permissions: PermissionSet) -> Result<(), FsError> {
        let current = self.stat(path).await?.mode;
        let mode = (current & !0o777 & 0o7777) | permissions.bits();
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(|e| FsError::from_io(e, "chmod", path))
    }

    async fn symlink(&self, target: &Path, link_path: &Path) -> Result<(), FsError> {
        tokio::fs::symlink(target, link_path)
            .await
            .map_err(|e| FsError::from_io(e, "symlink", link_path))
    }

    async fn readlink(&self, path: &Path) -> Result<PathBuf, FsError> {
        tokio::fs::read_link(path)
            .await
            .map_err(|e| FsError::from_io(e, "readlink", path))
    }

    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        tokio::fs::canonicalize(path)
            .await
            .map_err(|e| FsError::from_io(e, "realpath", path))
    }

    async fn set_mtime(&self, path: &Path, mtime: SystemTime) -> Result<(), FsError> {
        // 按路径设置，不打开文件（FIFO 上 open 会阻塞）
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| FsError::Io {
            path: path.display().to_string(),
            operation: "utimes".into(),
            message: "path contains a NUL byte".into(),
        })?;
        let since_epoch = mtime.duration_since(UNIX_EPOCH).unwrap_or_default();
        let times = [
            libc::timespec { tv_sec: 0, tv_nsec: libc::UTIME_OMIT },
            libc::timespec {
                tv_sec: since_epoch.as_secs() as libc::time_t,
                tv_nsec: since_epoch.subsec_nanos() as libc::c_long,
            },
        ];
        let rc = unsafe { libc::utimensat(libc::AT_FDCWD, c_path.as_ptr(), times.as_ptr(), 0) };
        if rc != 0 {
            return Err(FsError::from_io(std::io::Error::last_os_error(), "utimes", path));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stat_and_lstat() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        let file = tmp.path().join("a.txt");
        std::fs::write(&file, b"hello").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink("a.txt", &link).unwrap();

        let st = fs.stat(&link).await.unwrap();
        assert!(st.is_file());
        assert_eq!(st.size, 5);

        let lst = fs.lstat(&link).await.unwrap();
        assert!(lst.is_symlink());
        assert_eq!(fs.readlink(&link).await.unwrap(), PathBuf::from("a.txt"));
    }

    #[tokio::test]
    async fn test_readdir_reports_kinds() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("f"), b"").unwrap();

        let mut entries = fs.readdir(tmp.path()).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "f");
        assert_eq!(entries[0].kind, EntryKind::Regular);
        assert_eq!(entries[1].kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn test_chmod_replaces_rwx_bits() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        let file = tmp.path().join("f");
        std::fs::write(&file, b"").unwrap();

        fs.chmod(&file, PermissionSet::from_mode(0o640)).await.unwrap();
        let st = fs.stat(&file).await.unwrap();
        assert_eq!(st.mode & 0o777, 0o640);
    }

    #[tokio::test]
    async fn test_create_file_keeps_content() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        let file = tmp.path().join("f");
        std::fs::write(&file, b"keep").unwrap();

        fs.create_file(&file).await.unwrap();
        assert_eq!(fs.read_file(&file).await.unwrap(), b"keep");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        let err = fs.stat(&tmp.path().join("nope")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!fs.exists(&tmp.path().join("nope")).await);
    }

    #[tokio::test]
    async fn test_set_mtime_does_not_open_fifo() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        let pipe = tmp.path().join("pipe");
        let c_path = CString::new(pipe.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) }, 0);

        let past = UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        tokio::time::timeout(std::time::Duration::from_secs(5), fs.set_mtime(&pipe, past))
            .await
            .expect("set_mtime blocked on a FIFO")
            .unwrap();
        assert_eq!(std::fs::metadata(&pipe).unwrap().modified().unwrap(), past);
    }

    #[tokio::test]
    async fn test_set_mtime_on_write_only_file() {
        let tmp = TempDir::new().unwrap();
        let fs = RealFs::new();
        let file = tmp.path().join("w");
        std::fs::write(&file, b"").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o200)).unwrap();

        let past = UNIX_EPOCH + std::time::Duration::from_secs(2_000_000);
        fs.set_mtime(&file, past).await.unwrap();
        assert_eq!(std::fs::metadata(&file).unwrap().modified().unwrap(), past);
    }
}
