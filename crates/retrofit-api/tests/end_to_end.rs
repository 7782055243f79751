//! End-to-end scenario coverage over the `retrofit-api` surface.

use retrofit_api::types::{AxisSpec, ByogJob, OptimizeByogRequest, OptimizeRequest};
use retrofit_api::{optimize, optimize_byog, simulate};
use retrofit_core::capital_recovery_factor;
use serde_json::json;

fn base_request(max_gas_backup_pct: f64, cost_scenario_name: &str) -> OptimizeRequest {
    OptimizeRequest {
        plant_id: "plant-1".to_string(),
        target_load_mw: 100.0,
        max_gas_backup_pct,
        commissioning_year: 2027,
        cost_scenario_name: cost_scenario_name.to_string(),
        latitude: Some(35.0),
        conflict_pct: None,
        solar_profile: None,
        gas_heat_rate_btu_per_kwh: None,
        gas_capacity_factor: None,
        solar_cf_hint: None,
        max_solar_mw: None,
    }
}

#[test]
fn zero_gas_cap_forces_moderate_solar_and_battery() {
    let response = optimize(&base_request(0.0, "base")).expect("solve succeeds");

    assert_eq!(response.gas_backup_actual_pct, 0.0);
    assert!(response.dispatch.iter().all(|row| row.gas_mw.abs() < 1e-6));
    assert!(response.solar_capacity_mw >= 100.0);
    assert!(response.battery_energy_mwh > 0.0);
    assert!(matches!(
        response.solver_status,
        retrofit_hybrid::SolverStatus::Optimal | retrofit_hybrid::SolverStatus::TimeLimited
    ));
}

#[test]
fn full_gas_cap_with_expensive_solar_favors_gas_only() {
    let response = optimize(&base_request(1.0, "high")).expect("solve succeeds");

    // Expensive solar/battery capex under a gas price of $5.00/MMBtu makes
    // the gas-only dispatch the cheapest option; the LP should build little
    // to no solar or battery.
    assert!(response.solar_capacity_mw < 5.0);
    assert!(response.battery_power_mw < 5.0);

    let expected_gas_only_lcoe = 47.5; // 9.5 MMBtu/MWh heat rate * $5.00/MMBtu
    assert!((response.net_lcoe_per_mwh - expected_gas_only_lcoe).abs() < 5.0);
}

#[test]
fn crf_sanity_check() {
    assert!((capital_recovery_factor(0.06, 25.0) - 0.07823).abs() < 1e-4);
}

#[test]
fn byog_baseline_meets_end_to_end_expectations() {
    let result = simulate(&retrofit_api::types::SimulateRequest { overrides: None }).expect("simulation succeeds");

    assert!(result.summary.total_project_cost_usd > 1.5e9);
    assert!(result.summary.total_project_cost_usd < 2.5e9);
    assert!(result.summary.project_irr_unlevered_pct.is_some());
    assert!(result.summary.coverage_ratio >= 1.0 || result.summary.project_irr_unlevered_pct.is_some());
    assert!(result.summary.positive_cashflow_years >= 15);
}

#[test]
fn goal_seek_solves_turnkey_capex_within_bounds_for_target_irr() {
    let job = ByogJob::GoalSeek {
        kpi_path: "summary.project_irr_levered_pct".to_string(),
        target: 15.0,
        decision_path: "resource_costs.solar.capex_per_kw_usd".to_string(),
        lo: 500.0,
        hi: 3000.0,
        tolerance: 0.01,
        max_iterations: None,
    };
    let request = OptimizeByogRequest { overrides: None, job };
    let response = optimize_byog(&request).expect("goal seek succeeds");

    match response {
        retrofit_api::types::OptimizeByogResponse::GoalSeek(outcome) => {
            assert!(outcome.decision_value >= 500.0 && outcome.decision_value <= 3000.0);
            if let Some(kpi) = outcome.kpi_value {
                assert!((kpi - 15.0).abs() < 5.0, "kpi {kpi} should approach the 15% target");
            }
        }
        _ => panic!("expected a goal-seek response"),
    }
}

#[test]
fn heatmap_over_fuel_price_and_heat_rate_has_expected_shape() {
    let job = ByogJob::Heatmap {
        x: AxisSpec {
            path: "resource_costs.natural_gas.fuel_cost_usd_per_mmbtu".to_string(),
            min: 2.0,
            max: 6.0,
            step: 1.0,
        },
        y: AxisSpec {
            path: "resource_costs.natural_gas.heat_rate_btu_per_kwh".to_string(),
            min: 7_000.0,
            max: 10_000.0,
            step: 1_000.0,
        },
        output_kpi: "summary.lcoe_usd_per_mwh".to_string(),
    };
    let request = OptimizeByogRequest { overrides: None, job };
    let response = optimize_byog(&request).expect("heatmap succeeds");

    match response {
        retrofit_api::types::OptimizeByogResponse::Heatmap(points) => {
            assert_eq!(points.len(), 20);
            assert!(points.iter().all(|p| p.z.is_some()));

            let fixed_heat_rate = 7_000.0;
            let mut row: Vec<_> = points
                .iter()
                .filter(|p| (p.y - fixed_heat_rate).abs() < 1e-9)
                .collect();
            row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
            for pair in row.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!(b.z.unwrap() > a.z.unwrap(), "lcoe should rise with fuel price");
            }
        }
        _ => panic!("expected a heatmap response"),
    }
}

#[test]
fn cost_scenario_catalog_lists_the_four_built_ins() {
    let names: Vec<String> = retrofit_api::cost_scenarios().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["base", "low", "high", "high_gas"]);
}

#[test]
fn unknown_scenario_name_is_a_validation_error() {
    let request = base_request(0.2, "nonexistent");
    assert!(optimize(&request).is_err());
}

#[test]
fn simulate_accepts_overrides_and_reconciles_tiers() {
    let overrides = json!({ "load_profile": { "peak_it_load_mw": 120.0 } });
    let response = simulate(&retrofit_api::types::SimulateRequest { overrides: Some(overrides) })
        .expect("simulation succeeds");
    assert_eq!(response.sizing.esa_mw >= 0.0, true);
}

#[test]
fn simulate_rejects_a_guardrail_violation_instead_of_panicking() {
    let overrides = json!({ "load_profile": { "peak_it_load_mw": 500.0 } });
    let result = simulate(&retrofit_api::types::SimulateRequest { overrides: Some(overrides) });
    assert!(result.is_err());
}
