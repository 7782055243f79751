//! Boundary validation shared across operations. Per-field checks that are
//! intrinsic to a single engine (load > 0, commissioning year range, solar
//! profile length) live in that engine and are exercised through its own
//! error type; this module covers checks that only make sense at the API
//! edge, such as resolving a scenario name against the catalog.

use crate::catalog;
use crate::error::ApiResult;
use retrofit_core::{CostScenario, ValidationError};

/// Resolve a cost-scenario name against the built-in catalog.
pub fn resolve_scenario(name: &str) -> ApiResult<CostScenario> {
    Ok(catalog::resolve(name)?)
}

/// A fraction field (conflict pct, gas backup pct) must land in `[0, 1]`.
pub fn require_unit_interval(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_accepts_bounds() {
        assert!(require_unit_interval("x", 0.0).is_ok());
        assert!(require_unit_interval("x", 1.0).is_ok());
    }

    #[test]
    fn unit_interval_rejects_outside_range() {
        assert!(require_unit_interval("x", 1.5).is_err());
        assert!(require_unit_interval("x", -0.1).is_err());
    }

    #[test]
    fn resolve_scenario_finds_base() {
        assert!(resolve_scenario("base").is_ok());
    }
}
