//! Interactive read-eval loop over standard input.

use std::future::Future;
use std::io::{BufRead, Write};
use std::pin::Pin;
use std::sync::Arc;

use crate::commands::types::{ConfirmFn, StreamFn};
use crate::commands::CommandResult;

use super::dispatcher::{Dispatch, Shell};

pub const INTERRUPTED_NOTICE: &str = "Interrupted. Type 'exit' to quit.";

/// Read one line from standard input without blocking the runtime.
/// `None` at end of input.
pub async fn read_line() -> Option<String> {
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read standard input");
                None
            }
        }
    })
    .await;
    read.ok().flatten()
}

fn print_flush(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

/// Prints the question and reads the answer; anything starting with `y` or
/// `Y` is a yes.
pub fn stdin_confirm() -> ConfirmFn {
    Arc::new(|prompt: String| -> Pin<Box<dyn Future<Output = bool> + Send>> {
        Box::pin(async move {
            print_flush(&prompt);
            match read_line().await {
                Some(answer) => answer.trim_start().starts_with(['y', 'Y']),
                None => false,
            }
        })
    })
}

/// Prints each streamed line as soon as it is produced.
pub fn stdout_stream() -> StreamFn {
    Arc::new(|line: &str| print_flush(&format!("{}\n", line)))
}

fn write_result(result: &CommandResult) {
    print_flush(&result.stdout);
    if !result.stderr.is_empty() {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(result.stderr.as_bytes());
        let _ = stderr.flush();
    }
}

/// Run one input line. A Ctrl+C pressed while idle at the prompt is reported
/// and cleared first so it cannot cut the line short; the flag reports
/// whether the line itself was interrupted.
async fn run_line(shell: &mut Shell, line: &str) -> (Dispatch, bool) {
    if shell.interrupt().clear() {
        println!("{}", INTERRUPTED_NOTICE);
    }
    let dispatch = shell.exec_line(line).await;
    (dispatch, shell.interrupt().clear())
}

/// Run the prompt loop until `exit`/`quit` or end of input. Returns the
/// process exit code.
pub async fn run_interactive(shell: &mut Shell) -> i32 {
    print_flush(&format!(
        "File explorer, starting in {}\nType 'help' for commands. Ctrl+C to interrupt long ops.\n",
        shell.session().cwd
    ));
    shell.interrupt().listen_for_ctrl_c();

    loop {
        print_flush(&shell.prompt());

        let Some(line) = read_line().await else {
            // EOF
            println!();
            break;
        };

        let (dispatch, interrupted) = run_line(shell, &line).await;
        match dispatch {
            Dispatch::Done(result) => write_result(&result),
            Dispatch::Exit(result) => {
                write_result(&result);
                break;
            }
        }
        if interrupted {
            println!("{}", INTERRUPTED_NOTICE);
        }
    }

    tracing::info!("session closed");
    0
}
