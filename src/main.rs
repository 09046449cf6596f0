use clap::Parser;
use file_explorer::shell::{run_interactive, stdin_confirm, stdout_stream, Dispatch, Shell, ShellOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "file-explorer")]
#[command(about = "An interactive shell for navigating and changing a filesystem tree")]
#[command(version)]
struct Cli {
    /// Directory to start in (defaults to the current directory)
    #[arg()]
    start_dir: Option<String>,

    /// Do not ask before recursive deletes
    #[arg(long = "force")]
    force: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,

    /// Run ';'-separated commands and exit
    #[arg(short = 'c')]
    commands: Option<String>,

    /// With -c, output results as JSON (stdout, stderr, exitCode)
    #[arg(long = "json")]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let interactive = cli.commands.is_none();
    let mut shell = match Shell::new(ShellOptions {
        start_dir: cli.start_dir,
        confirm_destructive: !cli.force,
        confirm_fn: Some(stdin_confirm()),
        // 交互模式下 find 的结果边找边打印
        stream_fn: if interactive { Some(stdout_stream()) } else { None },
        ..Default::default()
    })
    .await
    {
        Ok(shell) => shell,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let Some(script) = cli.commands else {
        let code = run_interactive(&mut shell).await;
        std::process::exit(code);
    };

    let result = match shell.exec_line(&script).await {
        Dispatch::Done(result) | Dispatch::Exit(result) => result,
    };

    if cli.json {
        println!("{}", serde_json::json!({
            "stdout": result.stdout,
            "stderr": result.stderr,
            "exitCode": result.exit_code,
        }));
    } else {
        if !result.stdout.is_empty() {
            print!("{}", result.stdout);
        }
        if !result.stderr.is_empty() {
            eprint!("{}", result.stderr);
        }
    }

    std::process::exit(result.exit_code);
}
