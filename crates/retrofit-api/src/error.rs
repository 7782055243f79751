use thiserror::Error;

/// Unified error surface for the four external operations. Validation
/// errors are client errors carrying no partial result; everything else is
/// an internal fault surfaced with its source chain.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] retrofit_core::ValidationError),

    #[error(transparent)]
    Hybrid(#[from] retrofit_hybrid::HybridError),

    #[error(transparent)]
    Byog(#[from] retrofit_byog::ByogError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
