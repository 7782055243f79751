//! Orchestration: capital rollup -> priority sizing -> cash-flow projection
//! -> IRR/NPV/KPI rollup, with the lease-rate calibration loop.

use crate::cashflow::{self, CashFlowInputs, CashFlowYear};
use crate::capital::{self, CapitalStack};
use crate::config::ByogConfig;
use crate::curtailment::{self, CurtailmentCost};
use crate::error::ByogResult as Fallible;
use crate::irr::{irr_bisection, npv, payback_years};
use crate::sizing::{self, ResourceSizing};
use retrofit_core::{capital_recovery_factor, pct::normalize_pct};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

const CALIBRATION_GROWTH_FACTOR: f64 = 1.25;
const CALIBRATION_MAX_BRACKET_ITERATIONS: usize = 64;
const CALIBRATION_BISECTION_ITERATIONS: usize = 40;
const TARGET_POSITIVE_CASHFLOW_FRACTION: f64 = 0.60;

#[derive(Debug, Clone, Serialize)]
pub struct ByogSummary {
    pub project_irr_unlevered_pct: Option<f64>,
    /// Reported identically to `project_irr_unlevered_pct`: the engine never
    /// computes a separate levered IRR despite accepting debt-ratio inputs.
    /// This alias is preserved deliberately, not a bug.
    pub project_irr_levered_pct: Option<f64>,
    pub npv_usd: f64,
    pub moic: f64,
    pub payback_years: Option<f64>,
    pub lcoe_usd_per_mwh: f64,
    /// Debt-service coverage: average year-1..debt-term EBITDA over the
    /// level-payment annual debt service implied by `analysis.debt_ratio_pct`
    /// / `debt_rate_pct` / `debt_term_years`.
    pub coverage_ratio: f64,
    /// Firm-capacity coverage: accredited (ELCC-weighted) firm MW against
    /// the gross firm-capacity requirement. Battery is sized to close this
    /// gap exactly, so it is ~1.0 by construction; it is a sizing sanity
    /// check, not a financial metric like `coverage_ratio`.
    pub firm_capacity_coverage_ratio: f64,
    pub firm_capacity_required_mw: f64,
    pub firm_capacity_available_mw: f64,
    pub positive_cashflow_years: u32,
    pub total_project_cost_usd: f64,
    pub lease_rate_usd_per_mw_month: f64,
    pub calibration_applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ByogSimulationResult {
    pub summary: ByogSummary,
    pub cashflows: Vec<CashFlowYear>,
    pub capital: CapitalStackView,
    pub sizing: ResourceSizingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapitalStackView {
    pub land_usd: f64,
    pub preconstruction_usd: f64,
    pub power_infrastructure_usd: f64,
    pub dc_capex_usd: f64,
    pub byoc_capex_usd: f64,
    pub total_project_cost_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSizingView {
    pub esa_mw: f64,
    pub solar_mw: f64,
    pub gas_mw: f64,
    pub battery_power_mw: f64,
    pub battery_energy_mwh: f64,
}

/// Run the full BYOG engine over a raw overrides tree (deep-merged over the
/// built-in defaults). This is the entry point both the API layer and the
/// optimizer shell call. A guardrail-violating overrides tree is reported as
/// an error rather than a partial result.
pub fn simulate(overrides: Option<&Value>) -> Fallible<ByogSimulationResult> {
    let config = validate(overrides)?;
    Ok(simulate_config(&config))
}

/// Validate a raw overrides tree and report guardrail failures, without
/// running the (comparatively expensive) simulation.
pub fn validate(overrides: Option<&Value>) -> Fallible<ByogConfig> {
    let mut config = ByogConfig::from_overrides(overrides)
        .map_err(|e| crate::error::ByogError::Internal(e.to_string()))?;
    config.validate_and_reconcile()?;
    Ok(config)
}

fn simulate_config(config: &ByogConfig) -> ByogSimulationResult {
    let sizing = sizing::size_resources(config);
    let stack = capital::rollup(config, &sizing);
    let curtailment_cost = curtailment::weighted_curtailment_cost(config, sizing.annual_curtailment_mwh);

    let base_rate = config.revenue.base_lease_rate_usd_per_mw_month;
    let base_scenario = evaluate_scenario(config, &sizing, &stack, curtailment_cost, base_rate);

    let hurdle = normalize_pct(config.analysis.hurdle_irr_pct);
    let buffer = normalize_pct(config.analysis.target_irr_buffer_pct);
    let target_irr = hurdle + buffer;

    let needs_calibration = config.analysis.dynamic_pricing_enabled
        && (base_scenario.irr.unwrap_or(f64::NEG_INFINITY) < target_irr
            || base_scenario.positive_fraction < TARGET_POSITIVE_CASHFLOW_FRACTION);

    let (chosen, calibration_applied, lease_rate) = if needs_calibration {
        let (best, rate) = calibrate_lease_rate(config, &sizing, &stack, curtailment_cost, base_rate, target_irr);
        (best, true, rate)
    } else {
        (base_scenario, false, base_rate)
    };

    let debt_ratio = normalize_pct(config.analysis.debt_ratio_pct);
    let debt_rate = normalize_pct(config.analysis.debt_rate_pct);
    let debt_amount = stack.total_project_cost_usd * debt_ratio;
    let debt_crf = capital_recovery_factor(debt_rate, config.analysis.debt_term_years as f64);
    let annual_debt_service = debt_amount * debt_crf;
    let coverage_window = (config.analysis.debt_term_years as usize).min(chosen.rows.len().saturating_sub(1)).max(1);
    let avg_ebitda: f64 = chosen.rows[1..=coverage_window].iter().map(|r| r.ebitda_usd).sum::<f64>()
        / coverage_window as f64;
    let coverage_ratio = if annual_debt_service > 0.0 {
        avg_ebitda / annual_debt_service
    } else {
        f64::INFINITY
    };
    let firm_capacity_coverage_ratio = if sizing.gross_firm_required_mw > 0.0 {
        sizing.total_firm_accredited_mw / sizing.gross_firm_required_mw
    } else {
        f64::INFINITY
    };

    let discount_rate = normalize_pct(config.analysis.discount_rate_pct);
    let npv_value = npv(discount_rate, &chosen.fcf_series());

    let total_fcf_returned: f64 = chosen.rows[1..].iter().map(|r| r.fcf_usd).sum();
    let moic = total_fcf_returned / stack.total_project_cost_usd;

    let lcoe_crf = capital_recovery_factor(discount_rate, config.analysis.period_years as f64);
    let year1_power_costs = chosen.rows[1].power_costs_usd;
    let lcoe = (stack.total_project_cost_usd * lcoe_crf + year1_power_costs) / sizing.annual_energy_demand_mwh;

    let positive_years = chosen.rows[1..].iter().filter(|r| r.fcf_usd > 0.0).count() as u32;

    info!(
        irr = ?chosen.irr,
        lease_rate,
        calibration_applied,
        "byog simulation complete"
    );

    ByogSimulationResult {
        summary: ByogSummary {
            project_irr_unlevered_pct: chosen.irr.map(|r| r * 100.0),
            project_irr_levered_pct: chosen.irr.map(|r| r * 100.0),
            npv_usd: npv_value,
            moic,
            payback_years: payback_years(&chosen.fcf_series()),
            lcoe_usd_per_mwh: lcoe,
            coverage_ratio,
            firm_capacity_coverage_ratio,
            firm_capacity_required_mw: sizing.gross_firm_required_mw,
            firm_capacity_available_mw: sizing.total_firm_accredited_mw,
            positive_cashflow_years: positive_years,
            total_project_cost_usd: stack.total_project_cost_usd,
            lease_rate_usd_per_mw_month: lease_rate,
            calibration_applied,
        },
        cashflows: chosen.rows,
        capital: CapitalStackView {
            land_usd: stack.powered_land.land_usd,
            preconstruction_usd: stack.powered_land.preconstruction_usd,
            power_infrastructure_usd: stack.powered_land.power_infrastructure_usd,
            dc_capex_usd: stack.dc_capex_usd,
            byoc_capex_usd: stack.byoc_capex_usd,
            total_project_cost_usd: stack.total_project_cost_usd,
        },
        sizing: ResourceSizingView {
            esa_mw: sizing.esa_mw,
            solar_mw: sizing.solar_mw,
            gas_mw: sizing.gas_mw,
            battery_power_mw: sizing.battery_power_mw,
            battery_energy_mwh: sizing.battery_energy_mwh,
        },
    }
}

struct Scenario {
    rows: Vec<CashFlowYear>,
    irr: Option<f64>,
    positive_fraction: f64,
}

impl Scenario {
    fn fcf_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.fcf_usd).collect()
    }

    fn meets_targets(&self, target_irr: f64) -> bool {
        self.irr.unwrap_or(f64::NEG_INFINITY) >= target_irr
            && self.positive_fraction >= TARGET_POSITIVE_CASHFLOW_FRACTION
    }
}

fn evaluate_scenario(
    config: &ByogConfig,
    sizing: &ResourceSizing,
    stack: &CapitalStack,
    curtailment_cost: CurtailmentCost,
    lease_rate: f64,
) -> Scenario {
    let inputs = CashFlowInputs {
        config,
        sizing,
        total_project_cost_usd: stack.total_project_cost_usd,
        curtailment_cost,
        lease_rate_usd_per_mw_month: lease_rate,
    };
    let rows = cashflow::project(&inputs);
    let fcf: Vec<f64> = rows.iter().map(|r| r.fcf_usd).collect();
    let irr = irr_bisection(&fcf);
    let operating_years = rows.len() - 1;
    let positive = rows[1..].iter().filter(|r| r.fcf_usd > 0.0).count();
    let positive_fraction = if operating_years > 0 {
        positive as f64 / operating_years as f64
    } else {
        0.0
    };

    Scenario {
        rows,
        irr,
        positive_fraction,
    }
}

/// Grow the upper bracket geometrically, then bisect, tracking the
/// best-IRR scenario seen at any point in the search.
fn calibrate_lease_rate(
    config: &ByogConfig,
    sizing: &ResourceSizing,
    stack: &CapitalStack,
    curtailment_cost: CurtailmentCost,
    base_rate: f64,
    target_irr: f64,
) -> (Scenario, f64) {
    let max_rate = config.analysis.max_lease_rate_usd_per_mw_month;

    let mut lo = base_rate;
    let mut hi = base_rate;
    let mut best_rate = base_rate;
    let mut best_scenario = evaluate_scenario(config, sizing, stack, curtailment_cost, base_rate);
    let mut best_irr = best_scenario.irr.unwrap_or(f64::NEG_INFINITY);

    for _ in 0..CALIBRATION_MAX_BRACKET_ITERATIONS {
        hi *= CALIBRATION_GROWTH_FACTOR;
        let scenario = evaluate_scenario(config, sizing, stack, curtailment_cost, hi);
        let irr = scenario.irr.unwrap_or(f64::NEG_INFINITY);
        let meets = scenario.meets_targets(target_irr);
        if irr > best_irr {
            best_irr = irr;
            best_rate = hi;
            best_scenario = scenario;
        }
        if hi > max_rate || meets {
            break;
        }
    }

    for _ in 0..CALIBRATION_BISECTION_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        let scenario = evaluate_scenario(config, sizing, stack, curtailment_cost, mid);
        let irr = scenario.irr.unwrap_or(f64::NEG_INFINITY);
        let meets = scenario.meets_targets(target_irr);
        if irr > best_irr {
            best_irr = irr;
            best_rate = mid;
            best_scenario = scenario;
        }
        if meets {
            hi = mid;
        } else {
            lo = mid;
        }
        debug!(mid, irr, "lease rate calibration bisection step");
    }

    (best_scenario, best_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_simulation_meets_end_to_end_expectations() {
        let result = simulate(None).expect("default payload is always valid");
        assert!(result.summary.total_project_cost_usd > 1.5e9);
        assert!(result.summary.total_project_cost_usd < 2.5e9);
        assert!(result.summary.coverage_ratio >= 1.0 || result.summary.project_irr_unlevered_pct.is_some());
        assert!(result.summary.positive_cashflow_years >= 15);
    }

    #[test]
    fn levered_and_unlevered_irr_are_reported_identically() {
        let result = simulate(None).expect("default payload is always valid");
        assert_eq!(
            result.summary.project_irr_levered_pct,
            result.summary.project_irr_unlevered_pct
        );
    }

    #[test]
    fn guardrail_violation_is_reported_as_an_error_not_a_panic() {
        let overrides = serde_json::json!({ "load_profile": { "peak_it_load_mw": 500.0 } });
        assert!(simulate(Some(&overrides)).is_err());
    }
}
