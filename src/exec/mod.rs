//! Subprocess execution with an inspectable history
//!
//! Every invocation goes through an [`Executor`], which runs the program to
//! completion and appends an [`Execution`] record to its history. The history
//! is the observable side-channel tests use to assert on invocation order and
//! arguments.

mod process;
mod recording;

pub use process::ProcessExecutor;
pub use recording::RecordingExecutor;

use crate::error::ExecutionError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One program invocation: binary, working directory and arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub bin: PathBuf,
    pub dir: PathBuf,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(bin: impl Into<PathBuf>, dir: impl AsRef<Path>) -> Self {
        Self {
            bin: bin.into(),
            dir: dir.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bin.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Record of a finished (or failed to start) invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    pub command: Command,
    /// Combined stdout and stderr
    pub output: String,
    /// `None` when the program never started or was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Runs commands synchronously and remembers what it ran
pub trait Executor {
    /// Run `command` to completion and return its combined output.
    ///
    /// A non-zero exit is an error carrying the captured output. The
    /// invocation is recorded in the history whether it succeeded or not.
    fn execute(&mut self, command: Command) -> Result<String, ExecutionError>;

    /// Invocations in the order they were executed
    fn history(&self) -> &[Execution];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let command = Command::new("/app/mvnw", "/app").args(["-Dmaven.test.skip=true", "package"]);
        assert_eq!(command.bin, PathBuf::from("/app/mvnw"));
        assert_eq!(command.dir, PathBuf::from("/app"));
        assert_eq!(command.args, vec!["-Dmaven.test.skip=true", "package"]);
    }

    #[test]
    fn test_command_display() {
        let command = Command::new("/app/gradlew", "/app").args(["-x", "test", "build"]);
        assert_eq!(command.to_string(), "/app/gradlew -x test build");
    }
}
