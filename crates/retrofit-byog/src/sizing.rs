//! Priority-ordered resource allocation against a firm-capacity
//! requirement: ESA grid, then solar, then gas, then battery absorbs the
//! residual firm gap.

use crate::config::ByogConfig;
use retrofit_core::pct::normalize_pct;

/// Nameplate/energy sizing for each resource, plus the annual generation
/// estimates the cash-flow model consumes.
#[derive(Debug, Clone)]
pub struct ResourceSizing {
    pub esa_mw: f64,
    pub solar_mw: f64,
    pub gas_mw: f64,
    pub battery_power_mw: f64,
    pub battery_energy_mwh: f64,

    pub annual_esa_mwh: f64,
    pub annual_solar_mwh: f64,
    pub annual_gas_mwh: f64,
    pub annual_battery_discharge_mwh: f64,
    pub annual_curtailment_mwh: f64,

    pub required_firm_mw: f64,
    pub annual_energy_demand_mwh: f64,

    /// Gross firm-capacity requirement before any resource's ELCC credit is
    /// applied: `peak_it_load_mw * firm_pct * (1 + reserve_margin_pct)`.
    pub gross_firm_required_mw: f64,
    /// Sum of each resource's accredited (ELCC-weighted) firm-capacity
    /// contribution. Battery is sized to close the residual gap exactly, so
    /// this equals `gross_firm_required_mw` by construction.
    pub total_firm_accredited_mw: f64,
}

/// ESA import is assumed to run at a flat 50% duty factor; this literal
/// value has no documented rationale upstream and should be preserved
/// as-is rather than re-derived.
const ESA_DUTY_FACTOR: f64 = 0.5;

/// Fraction of the battery's residual firm-gap coverage assumed curtailed.
const CURTAILMENT_SURPLUS_FRACTION: f64 = 0.05;

pub fn size_resources(config: &ByogConfig) -> ResourceSizing {
    let peak = config.load_profile.peak_it_load_mw;
    let firm_pct = normalize_pct(config.firmness.firm_pct);
    let reserve_margin_pct = normalize_pct(config.firmness.reserve_margin_pct);
    let gross_firm_required = peak * firm_pct * (1.0 + reserve_margin_pct);
    let mut required_firm = gross_firm_required;

    let load_factor = normalize_pct(config.load_profile.load_factor_pct);
    let annual_energy_demand = peak * load_factor * 8760.0;

    // 1. ESA grid.
    let esa = &config.resource_costs.esa_grid;
    let esa_elcc = normalize_pct(esa.elcc_pct);
    let esa_mw = if esa.available {
        required_firm.min(esa.max_capacity_mw).min(esa.import_limit_mw).max(0.0)
    } else {
        0.0
    };
    required_firm -= esa_mw * esa_elcc;
    required_firm = required_firm.max(0.0);

    // 2. Solar.
    let solar = &config.resource_costs.solar;
    let solar_cf = normalize_pct(solar.capacity_factor_pct);
    let solar_elcc = normalize_pct(solar.elcc_pct);
    let land_ceiling_mw = config.site_land.acres / solar.acres_per_mw.max(1e-9);
    let deployable_ceiling = land_ceiling_mw.min(solar.max_capacity_mw);
    let energy_equivalent_mw = if solar_cf > 0.0 {
        annual_energy_demand / (solar_cf * 8760.0)
    } else {
        0.0
    };
    let solar_mw = deployable_ceiling.min(energy_equivalent_mw).max(0.0);
    required_firm -= solar_mw * solar_elcc;
    required_firm = required_firm.max(0.0);

    // 3. Gas: only covers a capped fraction of what's left.
    let gas = &config.resource_costs.natural_gas;
    let gas_elcc = normalize_pct(gas.elcc_pct).max(1e-9);
    let max_gas_backup_pct = normalize_pct(config.firmness.max_gas_backup_pct);
    let gas_firm_credit = required_firm * max_gas_backup_pct;
    let gas_mw = gas_firm_credit / gas_elcc;
    let firm_after_gas = (required_firm - gas_firm_credit).max(0.0);

    // 4. Battery absorbs whatever firm gap remains.
    let battery = &config.resource_costs.battery;
    let battery_elcc = normalize_pct(battery.elcc_pct).max(1e-9);
    let battery_power_mw = firm_after_gas / battery_elcc;
    let battery_energy_mwh = battery_power_mw * battery.duration_hours;

    // Annual generation estimates.
    let annual_esa_mwh = esa_mw * 8760.0 * ESA_DUTY_FACTOR;
    let annual_solar_mwh = solar_mw * solar_cf * 8760.0;
    let remaining_after_solar_esa = (annual_energy_demand - annual_solar_mwh - annual_esa_mwh).max(0.0);
    let annual_gas_mwh = (gas_mw * 8760.0).min(remaining_after_solar_esa);
    let remaining_after_solar_esa_gas = (remaining_after_solar_esa - annual_gas_mwh).max(0.0);
    let annual_battery_discharge_mwh = remaining_after_solar_esa_gas;

    let annual_curtailment_mwh = remaining_after_solar_esa_gas * CURTAILMENT_SURPLUS_FRACTION;

    let total_firm_accredited = esa_mw * esa_elcc
        + solar_mw * solar_elcc
        + gas_firm_credit
        + battery_power_mw * battery_elcc;

    ResourceSizing {
        esa_mw,
        solar_mw,
        gas_mw,
        battery_power_mw,
        battery_energy_mwh,
        annual_esa_mwh,
        annual_solar_mwh,
        annual_gas_mwh,
        annual_battery_discharge_mwh,
        annual_curtailment_mwh,
        required_firm_mw: required_firm,
        annual_energy_demand_mwh: annual_energy_demand,
        gross_firm_required_mw: gross_firm_required,
        total_firm_accredited_mw: total_firm_accredited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_sizing_produces_nonnegative_quantities() {
        let mut config = ByogConfig::from_overrides(None).unwrap();
        config.validate_and_reconcile().unwrap();
        let sizing = size_resources(&config);
        assert!(sizing.esa_mw >= 0.0);
        assert!(sizing.solar_mw >= 0.0);
        assert!(sizing.gas_mw >= 0.0);
        assert!(sizing.battery_power_mw >= 0.0);
        assert!(sizing.battery_energy_mwh >= 0.0);
    }

    #[test]
    fn disabling_esa_routes_more_firm_requirement_downstream() {
        let overlay = serde_json::json!({ "resource_costs": { "esa_grid": { "available": false } } });
        let mut with_esa = ByogConfig::from_overrides(None).unwrap();
        with_esa.validate_and_reconcile().unwrap();
        let mut without_esa = ByogConfig::from_overrides(Some(&overlay)).unwrap();
        without_esa.validate_and_reconcile().unwrap();

        let sized_with = size_resources(&with_esa);
        let sized_without = size_resources(&without_esa);

        assert_eq!(sized_without.esa_mw, 0.0);
        assert!(sized_without.battery_power_mw >= sized_with.battery_power_mw);
    }
}
