use super::{Command, Execution, Executor};
use crate::error::ExecutionError;
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Executor backed by real child processes
#[derive(Debug, Default)]
pub struct ProcessExecutor {
    history: Vec<Execution>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for ProcessExecutor {
    fn execute(&mut self, command: Command) -> Result<String, ExecutionError> {
        info!(command = %command, dir = %command.dir.display(), "Executing");

        let result = std::process::Command::new(&command.bin)
            .args(&command.args)
            .current_dir(&command.dir)
            .stdin(Stdio::null())
            .output();

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!(command = %command, error = %e, "Failed to launch");
                let bin = command.bin.clone();
                self.history.push(Execution {
                    command,
                    output: String::new(),
                    exit_code: None,
                    success: false,
                });
                return Err(ExecutionError::Launch { bin, source: e });
            }
        };

        // stdout first, then stderr; the two streams are not interleaved
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let success = output.status.success();
        let exit_code = output.status.code();
        debug!(command = %command, exit_code = ?exit_code, output_len = combined.len(), "Command finished");

        let bin = command.bin.clone();
        self.history.push(Execution {
            command,
            output: combined.clone(),
            exit_code,
            success,
        });

        if success {
            Ok(combined)
        } else {
            Err(ExecutionError::Failed {
                bin,
                code: exit_code,
                output: combined,
            })
        }
    }

    fn history(&self) -> &[Execution] {
        &self.history
    }
}
