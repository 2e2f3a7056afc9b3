//! Command execution abstraction for testability.
//!
//! A trait-based seam over the process primitives so installer logic can
//! be exercised without touching a real package manager.

#![allow(dead_code)]

use crate::error::Result;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion, discarding output
    fn run(&self, program: &str, args: &[&str]) -> Result<()>;

    /// Run a command and return its stdout, trailing whitespace trimmed
    fn run_stdout(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        super::command::run_command(program, args)
    }

    fn run_stdout(&self, program: &str, args: &[&str]) -> Result<String> {
        super::command::run_command_stdout(program, args)
    }
}

/// A mock executor that records calls and returns configured responses.
/// Available to integration tests as well.
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use crate::error::SetupError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
    }

    #[derive(Clone, Default)]
    pub struct MockExecutor {
        calls: Arc<Mutex<Vec<CommandCall>>>,
        failures: Arc<Mutex<HashMap<String, String>>>,
        stdout: Arc<Mutex<HashMap<String, String>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every invocation of `program` fail with `reason`
        pub fn fail_on(self, program: &str, reason: &str) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert(program.to_string(), reason.to_string());
            self
        }

        /// Configure the stdout returned for `program`
        pub fn stdout_for(self, program: &str, output: &str) -> Self {
            self.stdout
                .lock()
                .unwrap()
                .insert(program.to_string(), output.to_string());
            self
        }

        pub fn calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn was_called(&self, program: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.program == program)
        }

        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        fn record(&self, program: &str, args: &[&str]) -> Result<()> {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            });

            if let Some(reason) = self.failures.lock().unwrap().get(program) {
                return Err(SetupError::command(program, reason.clone()));
            }
            Ok(())
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> Result<()> {
            self.record(program, args)
        }

        fn run_stdout(&self, program: &str, args: &[&str]) -> Result<String> {
            self.record(program, args)?;
            Ok(self
                .stdout
                .lock()
                .unwrap()
                .get(program)
                .cloned()
                .unwrap_or_default())
        }
    }
}
