use thiserror::Error;

/// Exit codes for the solver subprocess protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success (check the status field in the solution for optimality).
    Success = 0,
    /// Invalid input (malformed JSON, missing fields).
    InvalidInput = 1,
    /// Solver error (numerical issue, model rejected).
    SolverError = 2,
    /// Timeout (the plugin's own internal watchdog, if any, fired).
    Timeout = 3,
}

impl ExitCode {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => ExitCode::Success,
            1 => ExitCode::InvalidInput,
            3 => ExitCode::Timeout,
            _ => ExitCode::SolverError,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver {solver} is not installed (looked for '{binary}' in ~/.retrofit/solvers and PATH)")]
    NotInstalled {
        solver: crate::SolverId,
        binary: String,
    },

    #[error("no solver available: {0}")]
    NoSolverAvailable(String),

    #[error("failed to start solver process: {0}")]
    ProcessStart(#[source] std::io::Error),

    #[error("solver process failed with exit code {exit_code:?}: {message}")]
    ProcessFailed { exit_code: ExitCode, message: String },

    #[error("solver timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;
