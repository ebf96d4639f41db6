//! Shell command execution.

use crate::error::{CookError, Result};
use crate::shell::quote::join;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Convert a non-zero exit into [`CookError::CommandFailed`].
    pub fn into_checked(self, command: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(CookError::CommandFailed {
                command: command.to_string(),
                code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<std::path::PathBuf>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,

    /// Bytes fed to the command's stdin (stdin is null when unset).
    pub stdin: Option<Vec<u8>>,
}

impl CommandOptions {
    /// Options that capture both output streams.
    pub fn captured() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }
}

/// Execute a program with arguments, without going through a shell.
pub fn execute_program(program: &str, args: &[String], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    let display = display_command(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    if options.capture_stdout {
        cmd.stdout(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
    }

    if options.capture_stderr {
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stderr(Stdio::inherit());
    }

    if options.stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("Failed to spawn {}: {}", program, e);
        CookError::CommandFailed {
            command: display.clone(),
            code: None,
            stderr: e.to_string(),
        }
    })?;

    // Feed stdin from a separate thread so a chatty child cannot deadlock us.
    let writer = match (options.stdin.clone(), child.stdin.take()) {
        (Some(input), Some(mut pipe)) => Some(thread::spawn(move || pipe.write_all(&input))),
        _ => None,
    };

    let output = child.wait_with_output().map_err(|e| CookError::CommandFailed {
        command: display.clone(),
        code: None,
        stderr: e.to_string(),
    })?;

    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("{} closed stdin early", program);
            }
            Ok(Err(e)) => return Err(CookError::Io(e)),
            Err(_) => {
                return Err(CookError::Other(anyhow::anyhow!(
                    "stdin writer thread panicked for {}",
                    program
                )))
            }
        }
    }

    let duration = start.elapsed();

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Execute a shell command line with `/bin/sh -c`.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    execute_program("/bin/sh", &["-c".to_string(), command.to_string()], options)
}

/// Copy-pasteable form of a program invocation, for errors and logs.
fn display_command(program: &str, args: &[String]) -> String {
    join(std::iter::once(program).chain(args.iter().map(String::as_str)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &CommandOptions::captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &CommandOptions::captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..CommandOptions::captured()
        };

        let result = execute("pwd", &options).unwrap();

        assert!(result.success);
    }

    #[test]
    fn execute_feeds_stdin() {
        let options = CommandOptions {
            stdin: Some(b"piped input\n".to_vec()),
            ..CommandOptions::captured()
        };

        let result = execute("cat", &options).unwrap();

        assert!(result.success);
        assert_eq!(result.stdout, "piped input\n");
    }

    #[test]
    fn spawn_failure_shows_quoted_command() {
        let err = execute_program(
            "/definitely/not/a/real/program",
            &["two words".to_string(), "plain".to_string()],
            &CommandOptions::captured(),
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("/definitely/not/a/real/program 'two words' plain"));
    }

    #[test]
    fn missing_program_is_command_failed() {
        let err = execute_program(
            "/definitely/not/a/real/program",
            &[],
            &CommandOptions::captured(),
        )
        .unwrap_err();
        assert!(matches!(err, CookError::CommandFailed { code: None, .. }));
    }

    #[test]
    fn into_checked_rejects_failure() {
        let result = execute("echo oops >&2; exit 1", &CommandOptions::captured()).unwrap();
        let err = result.into_checked("oops").unwrap_err();
        match err {
            CookError::CommandFailed {
                command, stderr, ..
            } => {
                assert_eq!(command, "oops");
                assert!(stderr.contains("oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
