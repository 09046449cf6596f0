// src/commands/cp/mod.rs
use async_trait::async_trait;
use crate::commands::utils::report::push_report;
use crate::commands::{Command, CommandContext, CommandResult};
use crate::commands::types::EXIT_INTERRUPTED;
use crate::fs::tree_ops::copy;
use crate::fs::{AbsolutePath, Lookup};

pub struct CpCommand;

const USAGE: &str = "cp: usage: cp <src> <dst>\n";

/// Where `src` lands for destination token `dest`: inside it when it is an
/// existing directory or ends with `/`.
pub(crate) async fn landing_path(
    ctx: &CommandContext,
    src: &AbsolutePath,
    dest: &str,
    dest_path: AbsolutePath,
) -> AbsolutePath {
    let dest_is_dir = match ctx.fs.stat(&dest_path).await {
        Ok(stat) => stat.is_directory(),
        Err(_) => false,
    };
    match src.file_name() {
        Some(name) if dest_is_dir || dest.ends_with('/') => dest_path.child(&name),
        _ => dest_path,
    }
}

#[async_trait]
impl Command for CpCommand {
    fn name(&self) -> &'static str {
        "cp"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let paths: Vec<&String> = ctx
            .args
            .iter()
            // 目录总是递归复制，-r 接受但忽略
            .filter(|a| !matches!(a.as_str(), "-r" | "-R" | "--recursive"))
            .collect();
        if paths.len() != 2 {
            return CommandResult::usage(USAGE.to_string());
        }
        let (src, dest) = (paths[0].as_str(), paths[1].as_str());

        // 检查源是否存在
        let src_path = match ctx.resolve(Some(src), Lookup::Follow).await {
            Ok(p) => p,
            Err(e) => {
                return CommandResult::error(format!("cp: cannot stat '{}': {}\n", src, e.reason()));
            }
        };
        let dest_path = match ctx.resolve(Some(dest), Lookup::Create).await {
            Ok(p) => p,
            Err(e) => {
                return CommandResult::error(format!("cp: cannot create '{}': {}\n", dest, e.reason()));
            }
        };
        let target = landing_path(&ctx, &src_path, dest, dest_path).await;

        if target == src_path {
            return CommandResult::error(format!("cp: '{}' and '{}' are the same file\n", src, dest));
        }

        let report = match copy(ctx.fs.as_ref(), &src_path, &target, &ctx.interrupt).await {
            Ok(r) => r,
            Err(e) => return CommandResult::error(format!("cp: {}: {}\n", src, e.reason())),
        };

        let mut stderr = String::new();
        if !push_report("cp", &report, &mut stderr) {
            return CommandResult::success(String::new());
        }
        let code = if report.interrupted { EXIT_INTERRUPTED } else { 1 };
        CommandResult::with_exit_code(String::new(), stderr, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{make_ctx, sandbox};

    #[tokio::test]
    async fn test_cp_file() {
        let (_tmp, base) = sandbox();
        std::fs::write(base.join("src.txt"), "content").unwrap();

        let result = CpCommand.execute(make_ctx(vec!["src.txt", "dest.txt"], &base)).await;
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
        assert_eq!(std::fs::read_to_string(base.join("dest.txt")).unwrap(), "content");
        assert!(base.join("src.txt").exists());
    }

    #[tokio::test]
    async fn test_cp_overwrites() {
        let (_tmp, base) = sandbox();
        std::fs::write(base.join("src.txt"), "new").unwrap();
        std::fs::write(base.join("dest.txt"), "old").unwrap();

        let result = CpCommand.execute(make_ctx(vec!["src.txt", "dest.txt"], &base)).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(std::fs::read_to_string(base.join("dest.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_cp_to_directory() {
        let (_tmp, base) = sandbox();
        std::fs::write(base.join("src.txt"), "content").unwrap();
        std::fs::create_dir(base.join("destdir")).unwrap();

        let result = CpCommand.execute(make_ctx(vec!["src.txt", "destdir"], &base)).await;
        assert_eq!(result.exit_code, 0);
        assert!(base.join("destdir/src.txt").exists());
    }

    #[tokio::test]
    async fn test_cp_creates_missing_parents() {
        let (_tmp, base) = sandbox();
        std::fs::write(base.join("src.txt"), "content").unwrap();

        let result = CpCommand.execute(make_ctx(vec!["src.txt", "x/y/z.txt"], &base)).await;
        assert_eq!(result.exit_code, 0);
        assert!(base.join("x/y/z.txt").exists());
    }

    #[tokio::test]
    async fn test_cp_directory_recursively() {
        let (_tmp, base) = sandbox();
        std::fs::create_dir_all(base.join("tree/sub")).unwrap();
        std::fs::write(base.join("tree/sub/f.txt"), "f").unwrap();
        std::os::unix::fs::symlink("sub/f.txt", base.join("tree/link")).unwrap();

        let result = CpCommand.execute(make_ctx(vec!["tree", "copy"], &base)).await;
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
        assert_eq!(std::fs::read_to_string(base.join("copy/sub/f.txt")).unwrap(), "f");
        let link = std::fs::read_link(base.join("copy/link")).unwrap();
        assert_eq!(link, std::path::PathBuf::from("sub/f.txt"));
    }

    #[tokio::test]
    async fn test_cp_same_file() {
        let (_tmp, base) = sandbox();
        std::fs::write(base.join("a.txt"), "keep").unwrap();
        let result = CpCommand.execute(make_ctx(vec!["a.txt", "./a.txt"], &base)).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("are the same file"));
        assert_eq!(std::fs::read_to_string(base.join("a.txt")).unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_cp_into_itself() {
        let (_tmp, base) = sandbox();
        std::fs::create_dir(base.join("d")).unwrap();
        let result = CpCommand.execute(make_ctx(vec!["d", "d/inner"], &base)).await;
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "cp: d: cannot copy a directory into itself\n");
    }

    #[tokio::test]
    async fn test_cp_nonexistent() {
        let (_tmp, base) = sandbox();
        let result = CpCommand.execute(make_ctx(vec!["missing", "dest"], &base)).await;
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "cp: cannot stat 'missing': No such file or directory\n");
    }

    #[tokio::test]
    async fn test_cp_dest_dotdot_through_symlink() {
        let (_tmp, base) = sandbox();
        std::fs::create_dir_all(base.join("real/inner")).unwrap();
        std::fs::write(base.join("f.txt"), "f").unwrap();
        std::os::unix::fs::symlink("real/inner", base.join("link")).unwrap();

        let result = CpCommand.execute(make_ctx(vec!["f.txt", "link/../g.txt"], &base)).await;
        assert_eq!(result.exit_code, 0, "{}", result.stderr);
        assert_eq!(std::fs::read_to_string(base.join("real/g.txt")).unwrap(), "f");
        assert!(!base.join("g.txt").exists());
    }

    #[tokio::test]
    async fn test_cp_usage() {
        let (_tmp, base) = sandbox();
        let result = CpCommand.execute(make_ctx(vec!["only-one"], &base)).await;
        assert_eq!(result.exit_code, 2);
        assert_eq!(result.stderr, USAGE);
    }
}
