//! Shared cost primitives, percentage duck-typing, and the cost-scenario
//! vocabulary used by both the hybrid dispatch optimizer and the BYOG
//! financial engine.
//!
//! Neither engine depends on the other; this crate is the intersection of
//! what they both need: capital recovery math, the `CostScenario` record,
//! and a `ValidationError` type the API boundary surfaces verbatim.

pub mod cost;
pub mod error;
pub mod pct;
pub mod scenario;

pub use cost::{capital_recovery_factor, gas_only_lcoe_per_mwh, gas_variable_cost_per_mwh};
pub use error::ValidationError;
pub use pct::normalize_pct;
pub use scenario::CostScenario;
