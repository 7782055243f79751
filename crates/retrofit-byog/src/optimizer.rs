//! Goal-seek, grid-search, and sensitivity-heatmap shells over the BYOG
//! engine. Each evaluation deep-copies the base payload before mutating it
//! so search branches never share state, and grid/heatmap evaluation fans
//! out across `rayon` the way the batch runner this is grounded on
//! evaluates independent scenarios in parallel.

use crate::engine::{self, ByogSimulationResult};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A decision-variable or KPI address: either the payload root itself, or a
/// dotted path into it (e.g. `revenue.base_lease_rate_usd_per_mw_month`).
pub enum ParameterPath {
    Root,
    Path(String),
}

impl ParameterPath {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == "." {
            ParameterPath::Root
        } else {
            ParameterPath::Path(raw.to_string())
        }
    }
}

/// Set `path` to `value` within `payload`, creating intermediate objects as
/// needed. A non-object node encountered along the path is replaced.
pub fn set_at(payload: &mut Value, path: &ParameterPath, value: f64) {
    match path {
        ParameterPath::Root => *payload = Value::from(value),
        ParameterPath::Path(dotted) => set_at_dotted(payload, dotted, value),
    }
}

fn set_at_dotted(payload: &mut Value, dotted: &str, value: f64) {
    if !payload.is_object() {
        *payload = Value::Object(serde_json::Map::new());
    }
    let segments: Vec<&str> = dotted.split('.').collect();
    let mut current = payload;
    for (i, seg) in segments.iter().enumerate() {
        let map = current.as_object_mut().expect("current node is an object");
        if i == segments.len() - 1 {
            map.insert((*seg).to_string(), Value::from(value));
            return;
        }
        let entry = map
            .entry((*seg).to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(serde_json::Map::new());
        }
        current = entry;
    }
}

/// Read a dotted path out of an arbitrary JSON value, e.g. a simulation
/// result that has been re-serialized to `Value` for KPI lookup.
fn get_at(root: &Value, dotted: &str) -> Option<f64> {
    let mut current = root;
    for seg in dotted.split('.') {
        current = current.get(seg)?;
    }
    current.as_f64()
}

/// Evaluate the engine at a single decision-variable override. A
/// guardrail-violating combination (e.g. one that drives
/// `peak_it_load_mw` past `total_it_capacity_mw`) is reported as `None`
/// rather than propagated, the same way a solver time-limit is reported as
/// an advisory status rather than a request failure: one infeasible point
/// in a search shouldn't abort the whole search.
fn simulate_with_override(base: Option<&Value>, path: &str, value: f64) -> Option<ByogSimulationResult> {
    let mut overlay = base.cloned().unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    set_at(&mut overlay, &ParameterPath::parse(path), value);
    engine::simulate(Some(&overlay)).ok()
}

fn kpi_value(result: Option<&ByogSimulationResult>, kpi_path: &str) -> Option<f64> {
    let result = result?;
    let as_value = serde_json::to_value(result).expect("result is always serializable");
    get_at(&as_value, kpi_path)
}

// ---------------------------------------------------------------------
// Single-variable goal seek
// ---------------------------------------------------------------------

const GOAL_SEEK_DEFAULT_MAX_ITERATIONS: u32 = 50;

pub struct GoalSeekRequest<'a> {
    pub overrides: Option<&'a Value>,
    pub kpi_path: String,
    pub target: f64,
    pub decision_path: String,
    pub lo: f64,
    pub hi: f64,
    pub tolerance: f64,
    pub max_iterations: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalSeekOutcome {
    pub decision_value: f64,
    pub kpi_value: Option<f64>,
    pub iterations: u32,
    pub converged: bool,
    pub result: Option<ByogSimulationResult>,
}

/// Bisect the decision variable until the KPI lands within `tolerance` of
/// `target`, assuming the KPI decreases as the decision variable increases
/// (the relationship the bracket-narrowing below encodes). Tracks and
/// returns the lowest-error candidate seen even if the search never
/// converges within the iteration cap.
pub fn goal_seek(request: &GoalSeekRequest) -> GoalSeekOutcome {
    let max_iterations = request.max_iterations.unwrap_or(GOAL_SEEK_DEFAULT_MAX_ITERATIONS);

    let mut lo = request.lo;
    let mut hi = request.hi;

    let mut best_value = lo;
    let mut best_result = simulate_with_override(request.overrides, &request.decision_path, lo);
    let mut best_kpi = kpi_value(best_result.as_ref(), &request.kpi_path);
    let mut best_error = best_kpi.map(|k| (k - request.target).abs()).unwrap_or(f64::INFINITY);
    let mut converged = false;
    let mut iterations_run = 0;

    for iteration in 1..=max_iterations {
        iterations_run = iteration;
        let mid = (lo + hi) / 2.0;
        let result = simulate_with_override(request.overrides, &request.decision_path, mid);
        let kpi = kpi_value(result.as_ref(), &request.kpi_path);
        let error = kpi.map(|k| (k - request.target).abs()).unwrap_or(f64::INFINITY);

        if error < best_error {
            best_error = error;
            best_value = mid;
            best_kpi = kpi;
            best_result = result;
        }

        if error <= request.tolerance {
            converged = true;
            break;
        }

        match kpi {
            Some(k) if k > request.target => lo = mid,
            _ => hi = mid,
        }
    }

    GoalSeekOutcome {
        decision_value: best_value,
        kpi_value: best_kpi,
        iterations: iterations_run,
        converged,
        result: best_result,
    }
}

// ---------------------------------------------------------------------
// Multi-variable grid search
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DecisionVariable {
    pub path: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
}

const EQUALITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct GridConstraint {
    pub metric: String,
    pub op: ConstraintOp,
    pub value: f64,
}

impl GridConstraint {
    fn holds(&self, result: Option<&ByogSimulationResult>) -> bool {
        let Some(result) = result else {
            return false;
        };
        let as_value = serde_json::to_value(result).expect("result is always serializable");
        let Some(observed) = get_at(&as_value, &self.metric) else {
            return false;
        };
        match self.op {
            ConstraintOp::LessThan => observed < self.value,
            ConstraintOp::LessThanEqual => observed <= self.value,
            ConstraintOp::GreaterThan => observed > self.value,
            ConstraintOp::GreaterThanEqual => observed >= self.value,
            ConstraintOp::Equal => (observed - self.value).abs() <= EQUALITY_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Maximize,
    Minimize,
}

pub struct GridSearchRequest<'a> {
    pub overrides: Option<&'a Value>,
    pub target_kpi: String,
    pub goal: Goal,
    pub constraints: Vec<GridConstraint>,
    pub decision_variables: Vec<DecisionVariable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridPoint {
    pub values: HashMap<String, f64>,
    pub kpi: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridSearchOutcome {
    pub evaluated: usize,
    pub feasible: usize,
    pub best: Option<GridPoint>,
    pub best_result: Option<ByogSimulationResult>,
}

fn axis_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || min >= max {
        return vec![min];
    }
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + 1e-9 {
        values.push(v);
        v += step;
    }
    values
}

fn cartesian_combinations(variables: &[DecisionVariable]) -> Vec<Vec<f64>> {
    variables
        .iter()
        .map(|v| axis_values(v.min, v.max, v.step))
        .fold(vec![Vec::new()], |acc, axis| {
            acc.into_iter()
                .flat_map(|prefix| {
                    axis.iter().map(move |&value| {
                        let mut next = prefix.clone();
                        next.push(value);
                        next
                    })
                })
                .collect()
        })
}

pub fn grid_search(request: &GridSearchRequest) -> GridSearchOutcome {
    let combinations = cartesian_combinations(&request.decision_variables);

    let evaluations: Vec<(HashMap<String, f64>, Option<ByogSimulationResult>, bool)> = combinations
        .par_iter()
        .map(|combo| {
            let mut overlay = request
                .overrides
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
            let mut values = HashMap::with_capacity(combo.len());
            for (variable, value) in request.decision_variables.iter().zip(combo.iter()) {
                set_at(&mut overlay, &ParameterPath::parse(&variable.path), *value);
                values.insert(variable.path.clone(), *value);
            }
            let result = engine::simulate(Some(&overlay)).ok();
            let feasible = request.constraints.iter().all(|c| c.holds(result.as_ref()));
            (values, result, feasible)
        })
        .collect();

    let evaluated = evaluations.len();
    let feasible = evaluations.iter().filter(|(_, _, ok)| *ok).count();

    let best = evaluations
        .into_iter()
        .filter(|(_, _, ok)| *ok)
        .filter_map(|(values, result, _)| {
            kpi_value(result.as_ref(), &request.target_kpi).map(|kpi| (values, result, kpi))
        })
        .fold(None, |best: Option<(HashMap<String, f64>, Option<ByogSimulationResult>, f64)>, candidate| {
            match &best {
                None => Some(candidate),
                Some(current) => {
                    let better = match request.goal {
                        Goal::Maximize => candidate.2 > current.2,
                        Goal::Minimize => candidate.2 < current.2,
                    };
                    if better {
                        Some(candidate)
                    } else {
                        best
                    }
                }
            }
        });

    match best {
        Some((values, result, kpi)) => GridSearchOutcome {
            evaluated,
            feasible,
            best: Some(GridPoint { values, kpi: Some(kpi) }),
            best_result: result,
        },
        None => GridSearchOutcome {
            evaluated,
            feasible,
            best: None,
            best_result: None,
        },
    }
}

// ---------------------------------------------------------------------
// 2-D sensitivity heatmap
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HeatmapAxis {
    pub path: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

pub struct HeatmapRequest<'a> {
    pub overrides: Option<&'a Value>,
    pub x: HeatmapAxis,
    pub y: HeatmapAxis,
    pub output_kpi: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeatmapPoint {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

pub fn heatmap(request: &HeatmapRequest) -> Vec<HeatmapPoint> {
    let xs = axis_values(request.x.min, request.x.max, request.x.step);
    let ys = axis_values(request.y.min, request.y.max, request.y.step);

    let grid: Vec<(f64, f64)> = xs.iter().flat_map(|&x| ys.iter().map(move |&y| (x, y))).collect();

    grid.par_iter()
        .map(|&(x, y)| {
            let mut overlay = request
                .overrides
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
            set_at(&mut overlay, &ParameterPath::parse(&request.x.path), x);
            set_at(&mut overlay, &ParameterPath::parse(&request.y.path), y);
            let result = engine::simulate(Some(&overlay)).ok();
            let z = kpi_value(result.as_ref(), &request.output_kpi);
            HeatmapPoint { x, y, z }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_at_dotted_creates_missing_intermediate_objects() {
        let mut payload = Value::Object(serde_json::Map::new());
        set_at(&mut payload, &ParameterPath::parse("revenue.base_lease_rate_usd_per_mw_month"), 150_000.0);
        assert_eq!(
            payload["revenue"]["base_lease_rate_usd_per_mw_month"],
            150_000.0
        );
    }

    #[test]
    fn set_at_does_not_mutate_a_cloned_sibling() {
        let base = serde_json::json!({ "revenue": { "escalation_pct": 2.5 } });
        let mut branch_a = base.clone();
        let mut branch_b = base.clone();
        set_at(&mut branch_a, &ParameterPath::parse("revenue.base_lease_rate_usd_per_mw_month"), 1.0);
        set_at(&mut branch_b, &ParameterPath::parse("revenue.base_lease_rate_usd_per_mw_month"), 2.0);
        assert_eq!(branch_a["revenue"]["base_lease_rate_usd_per_mw_month"], 1.0);
        assert_eq!(branch_b["revenue"]["base_lease_rate_usd_per_mw_month"], 2.0);
        assert_eq!(branch_a["revenue"]["escalation_pct"], 2.5);
    }

    #[test]
    fn goal_seek_finds_lease_rate_near_target_irr() {
        let request = GoalSeekRequest {
            overrides: None,
            kpi_path: "summary.project_irr_unlevered_pct".to_string(),
            target: 14.0,
            decision_path: "revenue.base_lease_rate_usd_per_mw_month".to_string(),
            lo: 50_000.0,
            hi: 400_000.0,
            tolerance: 0.5,
            max_iterations: None,
        };
        let outcome = goal_seek(&request);
        assert!(outcome.kpi_value.is_some());
        assert!(outcome.iterations > 0);
    }

    #[test]
    fn grid_search_evaluates_full_cartesian_product() {
        let request = GridSearchRequest {
            overrides: None,
            target_kpi: "summary.npv_usd".to_string(),
            goal: Goal::Maximize,
            constraints: vec![],
            decision_variables: vec![
                DecisionVariable {
                    path: "revenue.base_lease_rate_usd_per_mw_month".to_string(),
                    min: 100_000.0,
                    max: 140_000.0,
                    step: 20_000.0,
                },
                DecisionVariable {
                    path: "revenue.escalation_pct".to_string(),
                    min: 2.0,
                    max: 3.0,
                    step: 1.0,
                },
            ],
        };
        let outcome = grid_search(&request);
        assert_eq!(outcome.evaluated, 3 * 2);
        assert!(outcome.best.is_some());
    }

    #[test]
    fn heatmap_emits_a_point_per_axis_combination() {
        let request = HeatmapRequest {
            overrides: None,
            x: HeatmapAxis {
                path: "revenue.base_lease_rate_usd_per_mw_month".to_string(),
                min: 100_000.0,
                max: 140_000.0,
                step: 20_000.0,
            },
            y: HeatmapAxis {
                path: "analysis.discount_rate_pct".to_string(),
                min: 8.0,
                max: 10.0,
                step: 1.0,
            },
            output_kpi: "summary.npv_usd".to_string(),
        };
        let points = heatmap(&request);
        assert_eq!(points.len(), 3 * 3);
        assert!(points.iter().all(|p| p.z.is_some()));
    }
}
