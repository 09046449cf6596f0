// src/commands/touch/mod.rs
use async_trait::async_trait;
use std::time::SystemTime;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::{FsError, Lookup};

pub struct TouchCommand;

async fn touch(ctx: &CommandContext, file: &str) -> Result<(), FsError> {
    let path = ctx.resolve(Some(file), Lookup::Create).await?;
    // 父目录必须已存在
    if let Some(parent) = path.parent() {
        let st = ctx.fs.stat(&parent).await?;
        if !st.is_directory() {
            return Err(FsError::NotDirectory { path: parent.to_string(), operation: "touch".into() });
        }
    }
    // stat 跟随链接：悬空链接会创建其目标
    if ctx.fs.stat(&path).await.is_err() {
        ctx.fs.create_file(&path).await?;
    }
    ctx.fs.set_mtime(&path, SystemTime::now()).await
}

#[async_trait]
impl Command for TouchCommand {
    fn name(&self) -> &'static str {
        "touch"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.is_empty() {
            return CommandResult::usage("touch: usage: touch <file>...\n".to_string());
        }

        let mut stderr = String::new();
        let mut exit_code = 0;

        for file in &ctx.args {
            if let Err(e) = touch(&ctx, file).await {
                stderr.push_str(&format!("touch: cannot touch '{}': {}\n", file, e.reason()));
                exit_code = 1;
            }
        }

        CommandResult::with_exit_code(String::new(), stderr, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{make_ctx, sandbox};
    use std::time::Duration;

    #[tokio::test]
    async fn test_touch_creates_empty_file() {
        let (_tmp, base) = sandbox();
        let result = TouchCommand.execute(make_ctx(vec!["new.txt"], &base)).await;
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
        assert_eq!(std::fs::read(base.join("new.txt")).unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_touch_keeps_content_and_updates_mtime() {
        let (_tmp, base) = sandbox();
        let file = base.join("old.txt");
        std::fs::write(&file, "data").unwrap();
        let past = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options().write(true).open(&file).unwrap().set_modified(past).unwrap();

        let result = TouchCommand.execute(make_ctx(vec!["old.txt"], &base)).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "data");
        let modified = std::fs::metadata(&file).unwrap().modified().unwrap();
        assert!(modified > past + Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_touch_missing_parent() {
        let (_tmp, base) = sandbox();
        let result = TouchCommand.execute(make_ctx(vec!["no/such/file"], &base)).await;
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "touch: cannot touch 'no/such/file': No such file or directory\n");
        assert!(!base.join("no").exists());
    }

    #[tokio::test]
    async fn test_touch_dangling_link_creates_target() {
        let (_tmp, base) = sandbox();
        std::os::unix::fs::symlink("target.txt", base.join("dangling")).unwrap();

        let result = TouchCommand.execute(make_ctx(vec!["dangling"], &base)).await;
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
        assert!(base.join("target.txt").is_file());
        assert!(std::fs::symlink_metadata(base.join("dangling")).unwrap().file_type().is_symlink());
    }

    #[tokio::test]
    async fn test_touch_fifo_returns() {
        use std::os::unix::ffi::OsStrExt;
        let (_tmp, base) = sandbox();
        let pipe = base.join("pipe");
        let c_path = std::ffi::CString::new(pipe.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) }, 0);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            TouchCommand.execute(make_ctx(vec!["pipe"], &base)),
        )
        .await
        .expect("touch blocked on a FIFO");
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
    }

    #[tokio::test]
    async fn test_touch_usage() {
        let (_tmp, base) = sandbox();
        let result = TouchCommand.execute(make_ctx(vec![], &base)).await;
        assert_eq!(result.exit_code, 2);
    }
}
