//! Request/response types for the four external operations. Transport and
//! routing are out of scope; these structs are plain `serde`-derivable data
//! so an embedding HTTP layer can wire them directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    pub plant_id: String,
    pub target_load_mw: f64,
    pub max_gas_backup_pct: f64,
    pub commissioning_year: i32,
    pub cost_scenario_name: String,
    pub latitude: Option<f64>,
    pub conflict_pct: Option<f64>,
    pub solar_profile: Option<Vec<f64>>,
    pub gas_heat_rate_btu_per_kwh: Option<f64>,
    pub gas_capacity_factor: Option<f64>,
    pub solar_cf_hint: Option<f64>,
    pub max_solar_mw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulateRequest {
    /// Site context, asset parameters, and financial assumptions, deep-merged
    /// over the built-in BYOG defaults.
    pub overrides: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOperator {
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintSpec {
    pub metric: String,
    pub op: ConstraintOperator,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionVariableSpec {
    pub path: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AxisSpec {
    pub path: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// The job descriptor for `optimize/byog`, tagged by `mode`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ByogJob {
    GoalSeek {
        kpi_path: String,
        target: f64,
        decision_path: String,
        lo: f64,
        hi: f64,
        tolerance: f64,
        max_iterations: Option<u32>,
    },
    GridSearch {
        target_kpi: String,
        goal: GoalDirection,
        #[serde(default)]
        constraints: Vec<ConstraintSpec>,
        decision_variables: Vec<DecisionVariableSpec>,
    },
    Heatmap {
        x: AxisSpec,
        y: AxisSpec,
        output_kpi: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeByogRequest {
    pub overrides: Option<Value>,
    pub job: ByogJob,
}

/// Mode-dependent response: goal-seek solved value + simulation, grid-search
/// best config + simulation + counts, or a heatmap point list.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OptimizeByogResponse {
    GoalSeek(retrofit_byog::GoalSeekOutcome),
    GridSearch(retrofit_byog::GridSearchOutcome),
    Heatmap(Vec<retrofit_byog::HeatmapPoint>),
}
