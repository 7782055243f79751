use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Termination status a solver plugin reports. Anything other than
/// `Infeasible` or `Error` is treated as advisory by the orchestrator: a
/// `TimeLimit` solution is still used if it has a finite objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Optimal,
    TimeLimit,
    Infeasible,
    Unbounded,
    Error,
}

impl SolutionStatus {
    pub fn is_usable(&self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::TimeLimit)
    }
}

/// The entire payload crossing the subprocess boundary on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpSolution {
    pub status: SolutionStatus,
    pub objective: f64,
    pub values: HashMap<String, f64>,
    pub solve_time_ms: u64,
    pub error_message: Option<String>,
}

impl LpSolution {
    pub fn value(&self, var: &str) -> f64 {
        self.values.get(var).copied().unwrap_or(0.0)
    }

    pub fn error(message: impl Into<String>) -> Self {
        LpSolution {
            status: SolutionStatus::Error,
            objective: f64::NAN,
            values: HashMap::new(),
            solve_time_ms: 0,
            error_message: Some(message.into()),
        }
    }
}
