//! Thin synchronous wrappers around external commands.
//!
//! Single attempt, blocking wait, no timeout; a nonzero exit status is a
//! failure.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Result, SetupError};

/// Run a command to completion, discarding its output.
pub fn run_command(program: &str, args: &[&str]) -> Result<()> {
    debug!("Running command: {} {}", program, args.join(" "));

    let status = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| SetupError::command(program, format!("could not start: {e}")))?;

    if !status.success() {
        return Err(SetupError::command(
            program,
            match status.code() {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            },
        ));
    }

    Ok(())
}

/// Run a command and return its stdout with trailing whitespace trimmed.
pub fn run_command_stdout(program: &str, args: &[&str]) -> Result<String> {
    debug!("Running command: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| SetupError::command(program, format!("could not start: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SetupError::command(
            program,
            format!(
                "exit status {:?}: {}",
                output.status.code(),
                stderr.trim_end()
            ),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_success() {
        run_command("true", &[]).unwrap();
    }

    #[test]
    fn test_run_command_nonzero_exit() {
        let err = run_command("false", &[]).unwrap_err();
        assert!(matches!(err, SetupError::CommandFailed { .. }));
    }

    #[test]
    fn test_run_command_missing_program() {
        let err = run_command("definitely-not-a-real-program-xyz", &[]).unwrap_err();
        assert!(matches!(err, SetupError::CommandFailed { .. }));
    }

    #[test]
    fn test_run_command_stdout_trims_trailing_whitespace() {
        let out = run_command_stdout("echo", &["hello"]).unwrap();
        assert_eq!(out, "hello");
    }
}
