use thiserror::Error;

#[derive(Debug, Error)]
pub enum ByogError {
    #[error(transparent)]
    Validation(#[from] retrofit_core::ValidationError),

    #[error("guardrail violated: {0}")]
    Guardrail(String),

    #[error("invalid parameter path '{0}'")]
    BadParameterPath(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ByogResult<T> = Result<T, ByogError>;
