//! Capital stack rollup: site/infrastructure/data-center costs, plus the
//! generation-asset capex contributed by the priority sizing pass.

use crate::config::ByogConfig;
use crate::sizing::ResourceSizing;
use retrofit_core::pct::normalize_pct;

/// Land, preconstruction, and power-infrastructure costs combined, before
/// any generation or data-center capex.
#[derive(Debug, Clone)]
pub struct PoweredLandCost {
    pub land_usd: f64,
    pub preconstruction_usd: f64,
    pub power_infrastructure_usd: f64,
    pub total_usd: f64,
}

pub fn powered_land_cost(config: &ByogConfig) -> PoweredLandCost {
    let land_usd = config.site_land.acres * config.site_land.price_per_acre;

    let preconstruction_usd = config.preconstruction.line_items_usd
        * (1.0 + normalize_pct(config.preconstruction.contingency_pct));

    let power_infra_base = config.power_infrastructure.substation_cost_usd
        + config.power_infrastructure.transmission_cost_per_mile_usd
            * config.power_infrastructure.distance_miles
        + config.power_infrastructure.network_cost_usd
        + config.power_infrastructure.distribution_cost_usd;
    let power_infrastructure_usd =
        power_infra_base * (1.0 + normalize_pct(config.power_infrastructure.contingency_pct));

    PoweredLandCost {
        land_usd,
        preconstruction_usd,
        power_infrastructure_usd,
        total_usd: land_usd + preconstruction_usd + power_infrastructure_usd,
    }
}

/// Data-center shell and fit-out capex.
pub fn data_center_capex(config: &ByogConfig) -> f64 {
    let base = config.data_center.total_it_capacity_mw * config.data_center.cost_per_kw_usd * 1000.0
        + config.data_center.ffe_cost_usd
        + config.data_center.owners_cost_usd;
    base * (1.0 + normalize_pct(config.data_center.contingency_pct))
}

/// Generation and storage capex sized by the priority allocation pass.
pub fn byoc_capex(config: &ByogConfig, sizing: &ResourceSizing) -> f64 {
    let solar = sizing.solar_mw * config.resource_costs.solar.capex_per_kw_usd * 1000.0;
    let gas = sizing.gas_mw * config.resource_costs.natural_gas.capex_per_kw_usd * 1000.0;
    let battery = sizing.battery_power_mw * config.resource_costs.battery.power_capex_per_kw_usd * 1000.0
        + sizing.battery_energy_mwh * config.resource_costs.battery.energy_capex_per_kwh_usd * 1000.0;
    // The ESA grid is a contractual import, not owned generation; it carries
    // no capex line here.
    solar + gas + battery
}

/// Full rollup: `total_project_cost = powered_land + dc_capex + byoc_capex`.
#[derive(Debug, Clone)]
pub struct CapitalStack {
    pub powered_land: PoweredLandCost,
    pub dc_capex_usd: f64,
    pub byoc_capex_usd: f64,
    pub total_project_cost_usd: f64,
}

pub fn rollup(config: &ByogConfig, sizing: &ResourceSizing) -> CapitalStack {
    let powered_land = powered_land_cost(config);
    let dc_capex_usd = data_center_capex(config);
    let byoc_capex_usd = byoc_capex(config, sizing);
    CapitalStack {
        total_project_cost_usd: powered_land.total_usd + dc_capex_usd + byoc_capex_usd,
        powered_land,
        dc_capex_usd,
        byoc_capex_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ByogConfig;
    use crate::sizing::size_resources;

    #[test]
    fn total_project_cost_equals_sum_of_three_parts() {
        let mut config = ByogConfig::from_overrides(None).unwrap();
        config.validate_and_reconcile().unwrap();
        let sizing = size_resources(&config);
        let stack = rollup(&config, &sizing);
        let expected = stack.powered_land.total_usd + stack.dc_capex_usd + stack.byoc_capex_usd;
        assert!((stack.total_project_cost_usd - expected).abs() < 1e-6);
    }

    #[test]
    fn baseline_total_project_cost_is_in_plausible_billions_range() {
        let mut config = ByogConfig::from_overrides(None).unwrap();
        config.validate_and_reconcile().unwrap();
        let sizing = size_resources(&config);
        let stack = rollup(&config, &sizing);
        assert!(stack.total_project_cost_usd > 1.5e9);
        assert!(stack.total_project_cost_usd < 2.5e9);
    }
}
