//! Annual cash-flow projection: occupancy ramp, revenue, power costs,
//! curtailment loss, and operating costs rolled up into EBITDA and free
//! cash flow.

use crate::config::ByogConfig;
use crate::curtailment::CurtailmentCost;
use crate::sizing::ResourceSizing;
use retrofit_core::pct::normalize_pct;

/// One row of the cash-flow waterfall. Year 0 is the capital outflow; years
/// 1..=period are operating years.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CashFlowYear {
    pub year: u32,
    pub occupancy_pct: f64,
    pub gross_revenue_usd: f64,
    pub power_costs_usd: f64,
    pub curtailment_loss_usd: f64,
    pub opex_usd: f64,
    pub ebitda_usd: f64,
    pub fcf_usd: f64,
}

pub struct CashFlowInputs<'a> {
    pub config: &'a ByogConfig,
    pub sizing: &'a ResourceSizing,
    pub total_project_cost_usd: f64,
    pub curtailment_cost: CurtailmentCost,
    pub lease_rate_usd_per_mw_month: f64,
}

/// Project the full cash-flow series, including the year-0 capital outflow.
pub fn project(inputs: &CashFlowInputs) -> Vec<CashFlowYear> {
    let config = inputs.config;
    let sizing = inputs.sizing;

    let leasable_mw = config.load_profile.leasable_it_capacity_mw;
    let stabilized_occ = normalize_pct(config.revenue.stabilized_occupancy_pct);
    let absorption_years = config.revenue.absorption_period_years;
    let escalation = normalize_pct(config.revenue.escalation_pct);
    let inflation = normalize_pct(config.opex.general_inflation_pct);
    let opex_escalation = normalize_pct(config.opex.opex_escalation_rate_pct);
    let fuel_price_escalation = normalize_pct(config.resource_costs.natural_gas.fuel_price_escalation_pct);
    let energy_escalation = normalize_pct(config.resource_costs.esa_grid.energy_escalation_pct);
    let asset_mgmt_fee_pct = normalize_pct(config.revenue.asset_mgmt_fee_pct);

    let solar_om_base = sizing.solar_mw * config.resource_costs.solar.om_per_kw_year_usd * 1000.0;
    let battery_om_base =
        sizing.battery_power_mw * config.resource_costs.battery.om_per_kw_year_usd * 1000.0;
    let gas_om_base = sizing.gas_mw * config.resource_costs.natural_gas.om_per_kw_year_usd * 1000.0;
    let gas_fuel_cost_per_mwh = retrofit_core::gas_variable_cost_per_mwh(
        config.resource_costs.natural_gas.heat_rate_btu_per_kwh,
        config.resource_costs.natural_gas.fuel_cost_usd_per_mmbtu,
    );
    let gas_var_om_per_mwh = config.resource_costs.natural_gas.var_om_per_mwh_usd;
    let esa_energy_base = sizing.annual_esa_mwh * config.resource_costs.esa_grid.energy_price_usd_per_mwh;
    let esa_demand_usd = config.resource_costs.esa_grid.demand_charge_usd_per_kw_month
        * sizing.esa_mw
        * 1000.0
        * 12.0;

    let property_tax_usd =
        normalize_pct(config.opex.property_tax_rate_pct) * inputs.total_project_cost_usd;
    let insurance_usd_per_mw_year = config.opex.insurance_usd_per_mw_year_usd;

    let period = config.analysis.period_years;
    let mut rows = Vec::with_capacity(period as usize + 1);
    rows.push(CashFlowYear {
        year: 0,
        occupancy_pct: 0.0,
        gross_revenue_usd: 0.0,
        power_costs_usd: 0.0,
        curtailment_loss_usd: 0.0,
        opex_usd: 0.0,
        ebitda_usd: 0.0,
        fcf_usd: -inputs.total_project_cost_usd,
    });

    for year in 1..=period {
        let occ = if absorption_years > 0.0 {
            (year as f64 / absorption_years).min(1.0) * stabilized_occ
        } else {
            stabilized_occ
        };

        let escalator = (1.0 + escalation).powi((year - 1) as i32);
        let inflator = (1.0 + inflation).powi((year - 1) as i32);
        let opex_escalator = (1.0 + opex_escalation).powi((year - 1) as i32);
        let fuel_escalator = (1.0 + fuel_price_escalation).powi((year - 1) as i32);
        let energy_escalator = (1.0 + energy_escalation).powi((year - 1) as i32);

        let occupied_mw = leasable_mw * occ;
        let gross_revenue = occupied_mw * inputs.lease_rate_usd_per_mw_month * escalator * 12.0;

        let solar_om = solar_om_base * inflator;
        let battery_om = battery_om_base * inflator;
        let gas_om = gas_om_base * inflator;
        let gas_fuel_cost = sizing.annual_gas_mwh * gas_fuel_cost_per_mwh * fuel_escalator;
        let gas_var_om_cost = sizing.annual_gas_mwh * gas_var_om_per_mwh;
        let gas_generation = gas_fuel_cost + gas_var_om_cost;
        let occ_ratio = if stabilized_occ > 0.0 { occ / stabilized_occ } else { 0.0 };
        let esa_energy = esa_energy_base * occ_ratio * energy_escalator;
        let power_costs_usd = solar_om + battery_om + gas_om + gas_generation + esa_energy + esa_demand_usd;

        let curtailment_loss_usd = inputs.curtailment_cost.annual_revenue_lost_usd * occ_ratio;

        let insurance_usd = occupied_mw * insurance_usd_per_mw_year * opex_escalator;
        let facility_ops = config.opex.facility_ops_cost_usd * inflator;
        let other_ga = config.opex.other_ga_cost_usd * inflator;
        let asset_mgmt_fee = gross_revenue * asset_mgmt_fee_pct;
        let opex_usd = facility_ops + property_tax_usd + insurance_usd + asset_mgmt_fee + other_ga;

        let ebitda_usd = gross_revenue - power_costs_usd - curtailment_loss_usd - opex_usd;

        rows.push(CashFlowYear {
            year,
            occupancy_pct: occ,
            gross_revenue_usd: gross_revenue,
            power_costs_usd,
            curtailment_loss_usd,
            opex_usd,
            ebitda_usd,
            fcf_usd: ebitda_usd,
        });
    }

    rows
}
