use thiserror::Error;

#[derive(Debug, Error)]
pub enum HybridError {
    #[error(transparent)]
    Validation(#[from] retrofit_core::ValidationError),

    #[error("no LP solver available: {0}")]
    SolverUnavailable(String),

    #[error("solver invocation failed: {0}")]
    Solver(#[from] retrofit_solver_common::SolverError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type HybridResult<T> = Result<T, HybridError>;
