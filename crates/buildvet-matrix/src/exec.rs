//! Bounded external command execution.
//!
//! Every external wait in the engine (backend configure/compile, artifact
//! run, size inspection) goes through [`run_command`], which enforces a
//! wall-clock limit. A hung build tool expires instead of stalling the
//! session indefinitely.

use std::path::Path;
use std::process::Stdio;

use buildvet_core::Result;
use tokio::process::Command;

/// Captured output of a completed command.
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best diagnostic text: stderr when present, stdout otherwise.
    pub fn diagnostics(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        text.trim().to_string()
    }
}

/// Outcome of a bounded wait.
#[derive(Debug)]
pub(crate) enum ExecOutcome {
    Completed(CommandOutput),
    TimedOut,
}

/// Run `program` with `args` in `cwd`, waiting at most `timeout_secs`.
///
/// A `timeout_secs` of 0 disables the bound.
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    timeout_secs: u64,
) -> Result<ExecOutcome> {
    let mut command = Command::new(program);
    command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let child = command.spawn()?;

    let output = if timeout_secs > 0 {
        match tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Ok(ExecOutcome::TimedOut),
        }
    } else {
        child.wait_with_output().await?
    };

    Ok(ExecOutcome::Completed(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_command_captures_stdout() {
        let outcome = run_command("echo", &["hello".to_string()], None, 60)
            .await
            .expect("spawn failed");
        match outcome {
            ExecOutcome::Completed(output) => {
                assert!(output.success());
                assert!(output.stdout.contains("hello"));
            }
            ExecOutcome::TimedOut => panic!("echo should not time out"),
        }
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit() {
        let outcome = run_command("false", &[], None, 60).await.expect("spawn failed");
        match outcome {
            ExecOutcome::Completed(output) => {
                assert!(!output.success());
                assert_ne!(output.exit_code, 0);
            }
            ExecOutcome::TimedOut => panic!("false should not time out"),
        }
    }

    #[tokio::test]
    async fn test_run_command_times_out() {
        let outcome = run_command("sleep", &["5".to_string()], None, 1)
            .await
            .expect("spawn failed");
        assert!(matches!(outcome, ExecOutcome::TimedOut));
    }

    #[tokio::test]
    async fn test_run_command_missing_program_is_io_error() {
        let result = run_command("/nonexistent-binary-that-does-not-exist", &[], None, 5).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_diagnostics_prefers_stderr() {
        let output = CommandOutput {
            exit_code: 1,
            stdout: "progress line\n".to_string(),
            stderr: "error: undefined reference\n".to_string(),
        };
        assert_eq!(output.diagnostics(), "error: undefined reference");

        let output = CommandOutput {
            exit_code: 1,
            stdout: "only stdout\n".to_string(),
            stderr: "  \n".to_string(),
        };
        assert_eq!(output.diagnostics(), "only stdout");
    }
}
