//! Dispatch functions for the four external operations: `optimize`,
//! `simulate`, `optimize/byog`, and `cost-scenarios`.

use crate::catalog;
use crate::error::ApiResult;
use crate::types::{
    ByogJob, ConstraintOperator, OptimizeByogRequest, OptimizeByogResponse, OptimizeRequest,
    SimulateRequest,
};
use crate::validation;
use retrofit_byog::{ByogSimulationResult, ConstraintOp, DecisionVariable, Goal, GoalSeekRequest, GridConstraint, GridSearchRequest, HeatmapAxis, HeatmapRequest};
use retrofit_hybrid::{HybridRequest, HybridResponse};

/// Run the joint sizing + dispatch optimization for a single plant.
pub fn optimize(request: &OptimizeRequest) -> ApiResult<HybridResponse> {
    let scenario = catalog::resolve(&request.cost_scenario_name)?;

    if let Some(pct) = request.conflict_pct {
        validation::require_unit_interval("conflict_pct", pct)?;
    }

    let hybrid_request = HybridRequest {
        plant_id: request.plant_id.clone(),
        target_load_mw: request.target_load_mw,
        max_gas_backup_pct: request.max_gas_backup_pct,
        commissioning_year: request.commissioning_year,
        cost_scenario: scenario,
        latitude: request.latitude,
        conflict_pct: request.conflict_pct,
        solar_profile: request.solar_profile.clone(),
        gas_heat_rate_btu_per_kwh: request.gas_heat_rate_btu_per_kwh,
        gas_capacity_factor: request.gas_capacity_factor,
        solar_cf_hint: request.solar_cf_hint,
        max_solar_mw: request.max_solar_mw,
    };

    Ok(retrofit_hybrid::optimize(&hybrid_request)?)
}

/// Run the BYOG engine once over a raw overrides tree.
pub fn simulate(request: &SimulateRequest) -> ApiResult<ByogSimulationResult> {
    Ok(retrofit_byog::simulate(request.overrides.as_ref())?)
}

/// Run one of the three BYOG optimizer-shell modes.
pub fn optimize_byog(request: &OptimizeByogRequest) -> ApiResult<OptimizeByogResponse> {
    let overrides = request.overrides.as_ref();

    match &request.job {
        ByogJob::GoalSeek {
            kpi_path,
            target,
            decision_path,
            lo,
            hi,
            tolerance,
            max_iterations,
        } => {
            let goal_seek_request = GoalSeekRequest {
                overrides,
                kpi_path: kpi_path.clone(),
                target: *target,
                decision_path: decision_path.clone(),
                lo: *lo,
                hi: *hi,
                tolerance: *tolerance,
                max_iterations: *max_iterations,
            };
            Ok(OptimizeByogResponse::GoalSeek(retrofit_byog::goal_seek(&goal_seek_request)))
        }
        ByogJob::GridSearch {
            target_kpi,
            goal,
            constraints,
            decision_variables,
        } => {
            let goal = match goal {
                crate::types::GoalDirection::Maximize => Goal::Maximize,
                crate::types::GoalDirection::Minimize => Goal::Minimize,
            };
            let constraints = constraints
                .iter()
                .map(|c| GridConstraint {
                    metric: c.metric.clone(),
                    op: convert_operator(c.op),
                    value: c.value,
                })
                .collect();
            let decision_variables = decision_variables
                .iter()
                .map(|d| DecisionVariable {
                    path: d.path.clone(),
                    min: d.min,
                    max: d.max,
                    step: d.step,
                })
                .collect();
            let grid_request = GridSearchRequest {
                overrides,
                target_kpi: target_kpi.clone(),
                goal,
                constraints,
                decision_variables,
            };
            Ok(OptimizeByogResponse::GridSearch(retrofit_byog::grid_search(&grid_request)))
        }
        ByogJob::Heatmap { x, y, output_kpi } => {
            let heatmap_request = HeatmapRequest {
                overrides,
                x: HeatmapAxis {
                    path: x.path.clone(),
                    min: x.min,
                    max: x.max,
                    step: x.step,
                },
                y: HeatmapAxis {
                    path: y.path.clone(),
                    min: y.min,
                    max: y.max,
                    step: y.step,
                },
                output_kpi: output_kpi.clone(),
            };
            Ok(OptimizeByogResponse::Heatmap(retrofit_byog::heatmap(&heatmap_request)))
        }
    }
}

/// The built-in cost-scenario catalog.
pub fn cost_scenarios() -> Vec<retrofit_core::CostScenario> {
    catalog::catalog()
}

fn convert_operator(op: ConstraintOperator) -> ConstraintOp {
    match op {
        ConstraintOperator::LessThan => ConstraintOp::LessThan,
        ConstraintOperator::LessThanEqual => ConstraintOp::LessThanEqual,
        ConstraintOperator::GreaterThan => ConstraintOp::GreaterThan,
        ConstraintOperator::GreaterThanEqual => ConstraintOp::GreaterThanEqual,
        ConstraintOperator::Equal => ConstraintOp::Equal,
    }
}
