// src/commands/utils/format.rs
//! Human-readable rendering of sizes, times, owners and listing lines.

use std::ffi::CStr;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::fs::{EntryKind, FsEntry};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// `512 B`, `1.5 KB`, `3.0 GB`
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.1} {}", value, SIZE_UNITS[unit])
    }
}

/// Local time as `YYYY-MM-DD HH:MM`
pub fn format_time(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// User name for `uid`, or the number itself when the user database has no
/// entry.
pub fn owner_name(uid: u32) -> String {
    let mut buf_len = 1024usize;
    loop {
        let mut buf: Vec<libc::c_char> = vec![0; buf_len];
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf_len < 64 * 1024 {
            buf_len *= 2;
            continue;
        }
        if rc == 0 && !result.is_null() && !pwd.pw_name.is_null() {
            // pw_name points into `buf`, which is still alive here
            let name = unsafe { CStr::from_ptr(pwd.pw_name) };
            return name.to_string_lossy().into_owned();
        }
        return uid.to_string();
    }
}

/// One `ls -l` line:
/// `<kind><perms> <owner> <size> <time>  <name>[ -> <target>]`
pub fn long_line(entry: &FsEntry, name: &str) -> String {
    let size = match (entry.kind, entry.size) {
        (EntryKind::Regular, Some(bytes)) => human_size(bytes),
        _ => "-".to_string(),
    };
    let mut line = format!(
        "{}{} {:>8} {:>10} {}  {}",
        entry.kind.tag(),
        entry.permissions.to_rwx_string(),
        owner_name(entry.uid),
        size,
        format_time(entry.modified),
        name
    );
    if let Some(target) = &entry.symlink_target {
        line.push_str(&format!(" -> {}", target.display()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::PermissionSet;
    use std::path::PathBuf;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_size(3 * 1024u64.pow(5)), "3072.0 TB");
    }

    #[test]
    fn test_format_time_shape() {
        let s = format_time(SystemTime::now());
        assert_eq!(s.len(), 16);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[13..14], ":");
    }

    #[test]
    fn test_owner_name_of_current_user() {
        let uid = unsafe { libc::getuid() };
        assert!(!owner_name(uid).is_empty());
        // uids without a passwd entry fall back to the number
        assert_eq!(owner_name(4_000_000_000), "4000000000");
    }

    #[test]
    fn test_long_line_for_symlink() {
        let entry = FsEntry {
            path: PathBuf::from("/tmp/link"),
            kind: EntryKind::Symlink,
            size: None,
            permissions: PermissionSet::from_mode(0o777),
            uid: unsafe { libc::getuid() },
            modified: SystemTime::now(),
            symlink_target: Some(PathBuf::from("target.txt")),
        };
        let line = long_line(&entry, "link");
        assert!(line.starts_with("lrwxrwxrwx "));
        assert!(line.ends_with("  link -> target.txt"));
        assert!(line.contains(&format!(" {:>10} ", "-")));
    }
}
