//! Typed request/response surface over the hybrid dispatch optimizer and
//! the BYOG engine: four synchronous operations over plain `serde`-derivable
//! structs. Transport, routing, and serialization-framework wiring belong to
//! whatever embeds this crate.

pub mod catalog;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

pub use error::{ApiError, ApiResult};
pub use service::{cost_scenarios, optimize, optimize_byog, simulate};
pub use types::{
    AxisSpec, ByogJob, ConstraintOperator, ConstraintSpec, DecisionVariableSpec, GoalDirection,
    OptimizeByogRequest, OptimizeByogResponse, OptimizeRequest, SimulateRequest,
};
