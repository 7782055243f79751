//! Full pipeline: resolve inputs, run the MILP, roll up costs and emissions.

use crate::conflict::sample_conflict_hours;
use crate::error::{HybridError, HybridResult};
use crate::milp::{build_problem, extract_dispatch, MilpInputs};
use crate::profile::{resolve_supplied_profile, synthesize, rescale_to_hint};
use crate::types::{
    DispatchRow, HybridRequest, HybridResponse, LcoeComponent, SolverStatus, ANNUALIZATION_SCALE,
    REP_HOURS,
};
use retrofit_core::{capital_recovery_factor, gas_only_lcoe_per_mwh, gas_variable_cost_per_mwh};
use retrofit_solver_common::{SolutionStatus, SolverId, SolverProcess};
use tracing::{info, warn};

/// Kilograms of CO2 per MMBtu of natural gas burned, used to derive the
/// emissions factor from heat rate.
const GAS_CO2_KG_PER_MMBTU: f64 = 53.1;

/// Run the joint sizing + dispatch optimization end to end.
pub fn optimize(req: &HybridRequest) -> HybridResult<HybridResponse> {
    req.cost_scenario.validate()?;
    if req.target_load_mw <= 0.0 {
        return Err(retrofit_core::ValidationError::MustBePositive {
            field: "target_load_mw",
            value: req.target_load_mw,
        }
        .into());
    }
    if !(0.0..=1.0).contains(&req.max_gas_backup_pct) {
        return Err(retrofit_core::ValidationError::OutOfRange {
            field: "max_gas_backup_pct",
            value: req.max_gas_backup_pct,
            min: 0.0,
            max: 1.0,
        }
        .into());
    }
    if !(2024..=2040).contains(&req.commissioning_year) {
        return Err(retrofit_core::ValidationError::BadCommissioningYear(req.commissioning_year).into());
    }

    let mut profile = match &req.solar_profile {
        Some(series) => resolve_supplied_profile(series)?,
        None => synthesize(req.latitude.unwrap_or(35.0)),
    };
    if let Some(hint) = req.solar_cf_hint {
        profile = rescale_to_hint(&profile, hint);
    }

    let gas_heat_rate = req.gas_heat_rate();
    let gas_variable_cost = gas_variable_cost_per_mwh(gas_heat_rate, req.cost_scenario.gas_price_per_mmbtu);

    let conflict_hours = match req.conflict_pct {
        Some(pct) if pct > 0.0 => sample_conflict_hours(&profile, pct),
        _ => Default::default(),
    };

    let milp_inputs = MilpInputs {
        load_mw: req.target_load_mw,
        profile: &profile,
        gas_capacity_mw: req.target_load_mw,
        gas_variable_cost_per_mwh: gas_variable_cost,
        max_gas_backup_pct: req.max_gas_backup_pct,
        max_solar_mw: req.max_solar_mw,
        conflict_hours: &conflict_hours,
        scenario: &req.cost_scenario,
    };
    let problem = build_problem(&milp_inputs);

    let solution = solve(&problem)?;
    let status = match solution.status {
        SolutionStatus::Optimal => SolverStatus::Optimal,
        SolutionStatus::TimeLimit => SolverStatus::TimeLimited,
        _ => SolverStatus::Infeasible,
    };

    let (solar_cap, batt_power, batt_energy, points) = extract_dispatch(&solution, &req.cost_scenario);

    let load_mw = req.target_load_mw;
    let annual_load_mwh = load_mw * 8760.0;

    let crf_solar =
        capital_recovery_factor(req.cost_scenario.wacc, req.cost_scenario.solar_life_years);
    let crf_batt =
        capital_recovery_factor(req.cost_scenario.wacc, req.cost_scenario.battery_life_years);
    let solar_annual_cost = solar_cap
        * (req.cost_scenario.solar_capex_per_kw * crf_solar + req.cost_scenario.solar_om_per_kw_year)
        * 1000.0;
    let batt_energy_annual_cost =
        batt_energy * req.cost_scenario.battery_energy_capex_per_kwh * crf_batt * 1000.0;
    let batt_power_annual_cost = batt_power
        * (req.cost_scenario.battery_power_capex_per_kw * crf_batt
            + req.cost_scenario.battery_om_per_kw_year)
        * 1000.0;

    let total_gas_mwh_rep: f64 = points.iter().map(|p| p.gas_mw).sum();
    let annual_gas_mwh = total_gas_mwh_rep * ANNUALIZATION_SCALE;
    let gas_annual_cost = annual_gas_mwh * gas_variable_cost;

    let total_annual_cost = solar_annual_cost + batt_energy_annual_cost + batt_power_annual_cost + gas_annual_cost;
    let net_lcoe = total_annual_cost / annual_load_mwh;

    let reference_gas_only_lcoe = gas_only_lcoe_per_mwh(
        gas_heat_rate,
        req.cost_scenario.gas_price_per_mmbtu,
        0.0,
        0.0,
        req.gas_capacity_factor(),
        req.cost_scenario.wacc,
        req.cost_scenario.solar_life_years,
    );

    let gas_backup_actual = annual_gas_mwh / annual_load_mwh;

    let emissions_factor = gas_heat_rate * GAS_CO2_KG_PER_MMBTU / 1000.0;

    let total_solar_mwh_rep: f64 = points.iter().map(|p| p.solar_mw).sum();
    let annual_solar_mwh = total_solar_mwh_rep * ANNUALIZATION_SCALE;
    let excess_solar_mwh = (annual_solar_mwh - annual_load_mwh).max(0.0);

    let dispatch: Vec<DispatchRow> = points
        .into_iter()
        .enumerate()
        .map(|(t, p)| DispatchRow {
            t,
            solar_mw: p.solar_mw,
            battery_net_mw: p.battery_net_mw,
            gas_mw: p.gas_mw,
            soc_mwh: p.soc_mwh,
            load_mw,
        })
        .collect();

    let lcoe_breakdown = vec![
        LcoeComponent {
            component: "solar".to_string(),
            dollars_per_mwh: solar_annual_cost / annual_load_mwh,
        },
        LcoeComponent {
            component: "battery_energy".to_string(),
            dollars_per_mwh: batt_energy_annual_cost / annual_load_mwh,
        },
        LcoeComponent {
            component: "battery_power".to_string(),
            dollars_per_mwh: batt_power_annual_cost / annual_load_mwh,
        },
        LcoeComponent {
            component: "gas_variable".to_string(),
            dollars_per_mwh: gas_annual_cost / annual_load_mwh,
        },
    ];

    Ok(HybridResponse {
        solar_capacity_mw: solar_cap,
        battery_power_mw: batt_power,
        battery_energy_mwh: batt_energy,
        net_lcoe_per_mwh: net_lcoe,
        reference_gas_only_lcoe_per_mwh: reference_gas_only_lcoe,
        gas_backup_actual_pct: gas_backup_actual,
        emissions_factor_kg_per_mwh: emissions_factor,
        excess_solar_mwh,
        conflict_hours_count: conflict_hours.len(),
        solver_status: status,
        lcoe_breakdown,
        dispatch,
    })
}

/// Invoke HiGHS first; fall back silently to CBC when HiGHS is unavailable.
/// A non-optimal outcome from whichever solver runs is returned to the
/// caller as an advisory status, not an error.
fn solve(problem: &retrofit_solver_common::LpProblem) -> HybridResult<retrofit_solver_common::LpSolution> {
    for solver_id in [SolverId::Highs, SolverId::Cbc] {
        match SolverProcess::find_binary(solver_id) {
            Ok(path) => {
                let process = SolverProcess::new(solver_id, path, problem.timeout_seconds);
                match process.solve_blocking(problem) {
                    Ok(solution) => {
                        info!(solver = %solver_id, status = ?solution.status, "solve complete");
                        return Ok(solution);
                    }
                    Err(e) => {
                        warn!(solver = %solver_id, error = %e, "solver invocation failed, trying fallback");
                    }
                }
            }
            Err(_) => {
                warn!(solver = %solver_id, "solver binary not found, trying fallback");
            }
        }
    }
    Err(HybridError::SolverUnavailable(
        "neither HiGHS nor CBC solver binaries were found".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_core::CostScenario;

    fn base_scenario() -> CostScenario {
        CostScenario {
            name: "base".to_string(),
            solar_capex_per_kw: 900.0,
            solar_om_per_kw_year: 12.0,
            solar_life_years: 25.0,
            battery_energy_capex_per_kwh: 250.0,
            battery_power_capex_per_kw: 150.0,
            battery_om_per_kw_year: 5.0,
            battery_life_years: 15.0,
            inverter_efficiency: 0.97,
            battery_rte: 0.88,
            wacc: 0.07,
            gas_price_per_mmbtu: 3.50,
        }
    }

    #[test]
    fn rejects_nonpositive_load() {
        let req = HybridRequest {
            plant_id: "p1".to_string(),
            target_load_mw: 0.0,
            max_gas_backup_pct: 0.2,
            commissioning_year: 2026,
            cost_scenario: base_scenario(),
            latitude: Some(35.0),
            conflict_pct: None,
            solar_profile: None,
            gas_heat_rate_btu_per_kwh: None,
            gas_capacity_factor: None,
            solar_cf_hint: None,
            max_solar_mw: None,
        };
        assert!(optimize(&req).is_err());
    }

    #[test]
    fn rejects_commissioning_year_out_of_range() {
        let req = HybridRequest {
            plant_id: "p1".to_string(),
            target_load_mw: 100.0,
            max_gas_backup_pct: 0.2,
            commissioning_year: 2099,
            cost_scenario: base_scenario(),
            latitude: Some(35.0),
            conflict_pct: None,
            solar_profile: None,
            gas_heat_rate_btu_per_kwh: None,
            gas_capacity_factor: None,
            solar_cf_hint: None,
            max_solar_mw: None,
        };
        assert!(optimize(&req).is_err());
    }
}
