use thiserror::Error;

/// Malformed or out-of-range input. Surfaced as a client error at the API
/// boundary; never paired with a partial result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be > 0, got {value}")]
    MustBePositive { field: &'static str, value: f64 },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown cost scenario '{0}'")]
    UnknownScenario(String),

    #[error("solar profile must have 288 or 8760 entries, got {0}")]
    BadProfileLength(usize),

    #[error("commissioning year must be in [2024, 2040], got {0}")]
    BadCommissioningYear(i32),

    #[error("{0}")]
    Guardrail(String),
}
