//! Normalized result of one execution attempt.

use super::error::ExecutionError;

pub const TRANSPORT_ERROR_HEADER: &str = "Error executing code:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The service ran the code and reported no stderr.
    Success(Vec<String>),
    /// The service ran the code and stderr was non-empty.
    Failure(Vec<String>),
    /// The request never produced a usable response.
    TransportError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl ExecutionOutcome {
    /// Build an outcome from a validated `run` block.
    ///
    /// Output is split on `\n` exactly, so a trailing newline yields a trailing
    /// empty line. Only stderr decides the error flag.
    pub fn from_run(output: &str, stderr: &str) -> Self {
        let lines = output.split('\n').map(str::to_string).collect();
        if stderr.is_empty() {
            ExecutionOutcome::Success(lines)
        } else {
            ExecutionOutcome::Failure(lines)
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            ExecutionOutcome::Success(lines) | ExecutionOutcome::Failure(lines) => lines.clone(),
            ExecutionOutcome::TransportError(message) => {
                vec![TRANSPORT_ERROR_HEADER.to_string(), message.clone()]
            }
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ExecutionOutcome::Success(_))
    }

    /// Banner text and kind raised once the outcome is displayed.
    pub fn notification(&self) -> (&'static str, NotificationKind) {
        match self {
            ExecutionOutcome::Success(_) => ("Code executed successfully", NotificationKind::Success),
            ExecutionOutcome::Failure(_) => ("Execution failed", NotificationKind::Error),
            ExecutionOutcome::TransportError(_) => ("Failed to execute code", NotificationKind::Error),
        }
    }
}

impl From<ExecutionError> for ExecutionOutcome {
    fn from(err: ExecutionError) -> Self {
        ExecutionOutcome::TransportError(err.to_string())
    }
}
