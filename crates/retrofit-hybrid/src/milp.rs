//! Joint sizing + dispatch LP: formulate as a [`LpProblem`] and extract a
//! solved dispatch back out of an [`LpSolution`].

use crate::types::{ANNUALIZATION_SCALE, MAX_BATTERY_DURATION_HOURS, REP_HOURS};
use retrofit_core::capital_recovery_factor;
use retrofit_core::CostScenario;
use retrofit_solver_common::{Constraint, LpProblem, LpSolution, LpTerm, Sense, Variable};
use std::collections::BTreeSet;

const VAR_SOLAR_CAP: &str = "solar_cap";
const VAR_BATT_POWER: &str = "batt_power";
const VAR_BATT_ENERGY: &str = "batt_energy";

fn var_solar_gen(t: usize) -> String {
    format!("solar_gen_{t}")
}
fn var_batt_charge(t: usize) -> String {
    format!("batt_charge_{t}")
}
fn var_batt_discharge(t: usize) -> String {
    format!("batt_discharge_{t}")
}
fn var_gas_gen(t: usize) -> String {
    format!("gas_gen_{t}")
}
fn var_soc(t: usize) -> String {
    format!("soc_{t}")
}

/// Parameters the LP builder needs beyond the cost scenario: the load, the
/// resolved solar profile, the gas capacity ceiling (the existing plant's
/// nameplate, assumed always available), the gas variable cost, the annual
/// gas-use cap, optional max solar cap, and the conflict-hour set.
pub struct MilpInputs<'a> {
    pub load_mw: f64,
    pub profile: &'a [f64],
    pub gas_capacity_mw: f64,
    pub gas_variable_cost_per_mwh: f64,
    pub max_gas_backup_pct: f64,
    pub max_solar_mw: Option<f64>,
    pub conflict_hours: &'a BTreeSet<usize>,
    pub scenario: &'a CostScenario,
}

/// Build the sizing + dispatch LP described in the energy-balance,
/// storage-continuity, and capacity-bound invariants.
pub fn build_problem(inputs: &MilpInputs) -> LpProblem {
    assert_eq!(inputs.profile.len(), REP_HOURS);

    let crf_solar = capital_recovery_factor(inputs.scenario.wacc, inputs.scenario.solar_life_years);
    let crf_batt = capital_recovery_factor(inputs.scenario.wacc, inputs.scenario.battery_life_years);

    let solar_coeff =
        (inputs.scenario.solar_capex_per_kw * crf_solar + inputs.scenario.solar_om_per_kw_year) * 1000.0;
    let batt_energy_coeff = inputs.scenario.battery_energy_capex_per_kwh * crf_batt * 1000.0;
    let batt_power_coeff =
        (inputs.scenario.battery_power_capex_per_kw * crf_batt + inputs.scenario.battery_om_per_kw_year)
            * 1000.0;

    let sqrt_rte = inputs.scenario.battery_rte.sqrt();
    let eta_inv = inputs.scenario.inverter_efficiency;

    let mut variables = Vec::with_capacity(3 + REP_HOURS * 5);
    variables.push(Variable::new(
        VAR_SOLAR_CAP,
        0.0,
        inputs.max_solar_mw.unwrap_or(f64::INFINITY),
    ));
    variables.push(Variable::new(VAR_BATT_POWER, 0.0, f64::INFINITY));
    variables.push(Variable::new(VAR_BATT_ENERGY, 0.0, f64::INFINITY));

    for t in 0..REP_HOURS {
        let gas_upper = if inputs.conflict_hours.contains(&t) {
            0.0
        } else {
            inputs.gas_capacity_mw
        };
        variables.push(Variable::new(var_solar_gen(t), 0.0, f64::INFINITY));
        variables.push(Variable::new(var_batt_charge(t), 0.0, f64::INFINITY));
        variables.push(Variable::new(var_batt_discharge(t), 0.0, f64::INFINITY));
        variables.push(Variable::new(var_gas_gen(t), 0.0, gas_upper));
        variables.push(Variable::new(var_soc(t), 0.0, f64::INFINITY));
    }

    let mut objective = vec![
        LpTerm::new(VAR_SOLAR_CAP, solar_coeff),
        LpTerm::new(VAR_BATT_POWER, batt_power_coeff),
        LpTerm::new(VAR_BATT_ENERGY, batt_energy_coeff),
    ];
    for t in 0..REP_HOURS {
        objective.push(LpTerm::new(
            var_gas_gen(t),
            inputs.gas_variable_cost_per_mwh * ANNUALIZATION_SCALE,
        ));
    }

    let mut constraints = Vec::with_capacity(REP_HOURS * 4 + 3);

    for t in 0..REP_HOURS {
        // Energy balance: solar*eta + discharge*sqrt_rte - charge/sqrt_rte + gas >= load
        constraints.push(Constraint::ge(
            format!("balance_{t}"),
            vec![
                LpTerm::new(var_solar_gen(t), eta_inv),
                LpTerm::new(var_batt_discharge(t), sqrt_rte),
                LpTerm::new(var_batt_charge(t), -1.0 / sqrt_rte),
                LpTerm::new(var_gas_gen(t), 1.0),
            ],
            inputs.load_mw,
        ));

        // Storage continuity: soc[t] - soc[t-1 mod N] - charge[t] + discharge[t] = 0
        let prev = (t + REP_HOURS - 1) % REP_HOURS;
        constraints.push(Constraint::eq(
            format!("soc_continuity_{t}"),
            vec![
                LpTerm::new(var_soc(t), 1.0),
                LpTerm::new(var_soc(prev), -1.0),
                LpTerm::new(var_batt_charge(t), -1.0),
                LpTerm::new(var_batt_discharge(t), 1.0),
            ],
            0.0,
        ));

        // solar_gen[t] <= solar_cap * profile[t]
        constraints.push(Constraint::le(
            format!("solar_bound_{t}"),
            vec![
                LpTerm::new(var_solar_gen(t), 1.0),
                LpTerm::new(VAR_SOLAR_CAP, -inputs.profile[t]),
            ],
            0.0,
        ));

        // charge/discharge <= batt_power
        constraints.push(Constraint::le(
            format!("charge_bound_{t}"),
            vec![
                LpTerm::new(var_batt_charge(t), 1.0),
                LpTerm::new(VAR_BATT_POWER, -1.0),
            ],
            0.0,
        ));
        constraints.push(Constraint::le(
            format!("discharge_bound_{t}"),
            vec![
                LpTerm::new(var_batt_discharge(t), 1.0),
                LpTerm::new(VAR_BATT_POWER, -1.0),
            ],
            0.0,
        ));

        // soc[t] <= batt_energy
        constraints.push(Constraint::le(
            format!("soc_bound_{t}"),
            vec![
                LpTerm::new(var_soc(t), 1.0),
                LpTerm::new(VAR_BATT_ENERGY, -1.0),
            ],
            0.0,
        ));
    }

    // Structural: batt_energy <= 6 * batt_power
    constraints.push(Constraint::le(
        "max_battery_duration",
        vec![
            LpTerm::new(VAR_BATT_ENERGY, 1.0),
            LpTerm::new(VAR_BATT_POWER, -MAX_BATTERY_DURATION_HOURS),
        ],
        0.0,
    ));

    // Structural: batt_power <= solar_cap
    constraints.push(Constraint::le(
        "battery_no_larger_than_solar",
        vec![
            LpTerm::new(VAR_BATT_POWER, 1.0),
            LpTerm::new(VAR_SOLAR_CAP, -1.0),
        ],
        0.0,
    ));

    // Annual gas-use cap: sum_t gas_gen[t] <= max_gas_backup_pct * load * 288
    let gas_terms: Vec<LpTerm> = (0..REP_HOURS).map(|t| LpTerm::new(var_gas_gen(t), 1.0)).collect();
    constraints.push(Constraint::le(
        "annual_gas_cap",
        gas_terms,
        inputs.max_gas_backup_pct * inputs.load_mw * REP_HOURS as f64,
    ));

    LpProblem::new(variables, objective, constraints).with_timeout(120)
}

/// Extracted dispatch for a single representative hour.
pub struct DispatchPoint {
    pub solar_mw: f64,
    pub battery_net_mw: f64,
    pub gas_mw: f64,
    pub soc_mwh: f64,
}

/// Extract sizing and per-hour dispatch from a solved LP solution.
pub fn extract_dispatch(solution: &LpSolution, scenario: &CostScenario) -> (f64, f64, f64, Vec<DispatchPoint>) {
    let solar_cap = solution.value(VAR_SOLAR_CAP);
    let batt_power = solution.value(VAR_BATT_POWER);
    let batt_energy = solution.value(VAR_BATT_ENERGY);
    let sqrt_rte = scenario.battery_rte.sqrt();
    let eta_inv = scenario.inverter_efficiency;

    let dispatch = (0..REP_HOURS)
        .map(|t| {
            let solar_gen = solution.value(&var_solar_gen(t));
            let charge = solution.value(&var_batt_charge(t));
            let discharge = solution.value(&var_batt_discharge(t));
            let gas = solution.value(&var_gas_gen(t));
            let soc = solution.value(&var_soc(t));
            DispatchPoint {
                solar_mw: solar_gen * eta_inv,
                battery_net_mw: discharge * sqrt_rte - charge / sqrt_rte,
                gas_mw: gas,
                soc_mwh: soc,
            }
        })
        .collect();

    (solar_cap, batt_power, batt_energy, dispatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::synthesize;
    use retrofit_core::CostScenario;

    fn scenario() -> CostScenario {
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
    fn problem_has_expected_variable_and_constraint_counts() {
        let profile = synthesize(35.0);
        let scenario = scenario();
        let conflict = BTreeSet::new();
        let inputs = MilpInputs {
            load_mw: 100.0,
            profile: &profile,
            gas_capacity_mw: 100.0,
            gas_variable_cost_per_mwh: 33.25,
            max_gas_backup_pct: 0.2,
            max_solar_mw: None,
            conflict_hours: &conflict,
            scenario: &scenario,
        };
        let problem = build_problem(&inputs);
        assert_eq!(problem.variables.len(), 3 + REP_HOURS * 5);
        // 4 per-timestep rows + balance + continuity = 6, plus 3 structural rows.
        assert_eq!(problem.constraints.len(), REP_HOURS * 6 + 3);
    }

    #[test]
    fn conflict_hours_zero_the_gas_variable_upper_bound() {
        let profile = synthesize(35.0);
        let scenario = scenario();
        let mut conflict = BTreeSet::new();
        conflict.insert(5);
        let inputs = MilpInputs {
            load_mw: 100.0,
            profile: &profile,
            gas_capacity_mw: 100.0,
            gas_variable_cost_per_mwh: 33.25,
            max_gas_backup_pct: 0.2,
            max_solar_mw: None,
            conflict_hours: &conflict,
            scenario: &scenario,
        };
        let problem = build_problem(&inputs);
        let gas5 = problem
            .variables
            .iter()
            .find(|v| v.name == var_gas_gen(5))
            .unwrap();
        assert_eq!(gas5.upper, 0.0);
    }
}
