use serde::{Deserialize, Serialize};

/// Number of representative timesteps in a year: 12 months x 24 hours.
pub const REP_HOURS: usize = 288;

/// Hours per representative step when annualizing: 365 / 12.
pub const ANNUALIZATION_SCALE: f64 = 365.0 / 12.0;

/// Maximum battery duration, in hours of power, the sizing LP will accept.
pub const MAX_BATTERY_DURATION_HOURS: f64 = 6.0;

/// Request to the joint sizing + dispatch optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridRequest {
    pub plant_id: String,
    pub target_load_mw: f64,
    pub max_gas_backup_pct: f64,
    pub commissioning_year: i32,
    pub cost_scenario: retrofit_core::CostScenario,
    pub latitude: Option<f64>,
    pub conflict_pct: Option<f64>,
    pub solar_profile: Option<Vec<f64>>,
    pub gas_heat_rate_btu_per_kwh: Option<f64>,
    pub gas_capacity_factor: Option<f64>,
    pub solar_cf_hint: Option<f64>,
    pub max_solar_mw: Option<f64>,
}

impl HybridRequest {
    pub fn gas_heat_rate(&self) -> f64 {
        self.gas_heat_rate_btu_per_kwh.unwrap_or(9_500.0)
    }

    pub fn gas_capacity_factor(&self) -> f64 {
        self.gas_capacity_factor.unwrap_or(0.55)
    }
}

/// Termination state reported by the LP solver, as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Optimal,
    TimeLimited,
    Infeasible,
}

/// One representative hour's dispatch, as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRow {
    pub t: usize,
    pub solar_mw: f64,
    pub battery_net_mw: f64,
    pub gas_mw: f64,
    pub soc_mwh: f64,
    pub load_mw: f64,
}

/// $/MWh contribution of a single cost component to the blended net LCOE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcoeComponent {
    pub component: String,
    pub dollars_per_mwh: f64,
}

/// Response from the joint sizing + dispatch optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridResponse {
    pub solar_capacity_mw: f64,
    pub battery_power_mw: f64,
    pub battery_energy_mwh: f64,
    pub net_lcoe_per_mwh: f64,
    pub reference_gas_only_lcoe_per_mwh: f64,
    pub gas_backup_actual_pct: f64,
    pub emissions_factor_kg_per_mwh: f64,
    pub excess_solar_mwh: f64,
    pub conflict_hours_count: usize,
    pub solver_status: SolverStatus,
    pub lcoe_breakdown: Vec<LcoeComponent>,
    pub dispatch: Vec<DispatchRow>,
}
