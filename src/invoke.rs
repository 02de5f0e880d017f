use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::catalog::TestCase;

/// What became of one run of the program under test.
#[derive(Debug)]
pub enum Invocation {
    /// Exit code 0.
    Completed { stdout: Vec<u8>, stderr: Vec<u8> },
    /// Nonzero exit, or killed by a signal (`code` is then `None`).
    Exited {
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// The process could not be started at all.
    LaunchFailed(std::io::Error),
}

/// Run the case's program to completion with its argument vector.
///
/// Empty arguments are dropped. Stdin is closed; stdout and stderr are
/// collected in full. `Command::output` waits for the child and closes both
/// pipes on every path, so no handle outlives this call. There is no
/// timeout: a program that never exits blocks the caller.
pub fn invoke(case: &TestCase) -> Invocation {
    let args = case.args.iter().filter(|a| !a.is_empty());
    debug!("executing {}", case.command_line());
    let output = Command::new(&case.program)
        .args(args)
        .stdin(Stdio::null())
        .output();
    match output {
        Ok(out) => classify(out.status, out.stdout, out.stderr),
        Err(e) => Invocation::LaunchFailed(e),
    }
}

fn classify(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Invocation {
    if status.success() {
        Invocation::Completed { stdout, stderr }
    } else {
        Invocation::Exited {
            code: status.code(),
            stdout,
            stderr,
        }
    }
}
