use super::{Command, Execution, Executor};
use crate::error::ExecutionError;
use std::collections::VecDeque;
use tracing::debug;

/// Scripted executor that never spawns a process
///
/// Each call consumes the next canned output (empty once exhausted). A call
/// at the configured failure index exits with code 1 instead.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    outputs: VecDeque<String>,
    fail_at: Option<usize>,
    history: Vec<Execution>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outputs<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outputs: outputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Fail the invocation with the given zero-based index
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, command: Command) -> Result<String, ExecutionError> {
        let index = self.history.len();
        let output = self.outputs.pop_front().unwrap_or_default();
        let success = self.fail_at != Some(index);
        debug!(command = %command, index, success, "Recording command");

        let bin = command.bin.clone();
        self.history.push(Execution {
            command,
            output: output.clone(),
            exit_code: Some(if success { 0 } else { 1 }),
            success,
        });

        if success {
            Ok(output)
        } else {
            Err(ExecutionError::Failed {
                bin,
                code: Some(1),
                output,
            })
        }
    }

    fn history(&self) -> &[Execution] {
        &self.history
    }
}
