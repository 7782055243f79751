//! Nested BYOG configuration: built-in defaults, deep-merge of caller
//! overrides, and the typed tree the rest of the engine consumes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Recursively merge `overlay` onto `base`. Mapping values recurse;
/// everything else (scalars, arrays, mapping-over-scalar or vice versa)
/// replaces the base value outright.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// The built-in default BYOG configuration tree.
pub fn default_payload() -> Value {
    json!({
        "site_land": {
            "acres": 400.0,
            "price_per_acre": 45_000.0
        },
        "preconstruction": {
            "line_items_usd": 18_000_000.0,
            "contingency_pct": 10.0
        },
        "power_infrastructure": {
            "substation_cost_usd": 35_000_000.0,
            "transmission_cost_per_mile_usd": 2_500_000.0,
            "distance_miles": 3.0,
            "network_cost_usd": 6_000_000.0,
            "distribution_cost_usd": 9_000_000.0,
            "contingency_pct": 10.0
        },
        "data_center": {
            "total_it_capacity_mw": 100.0,
            "cost_per_kw_usd": 9_000.0,
            "ffe_cost_usd": 40_000_000.0,
            "owners_cost_usd": 25_000_000.0,
            "contingency_pct": 8.0
        },
        "load_profile": {
            "peak_it_load_mw": 90.0,
            "min_operating_load_mw": 30.0,
            "leasable_it_capacity_mw": 90.0,
            "load_factor_pct": 85.0
        },
        "curtailment": {
            "tiers": [
                { "name": "tier1", "mw": 90.0, "revenue_loss_rate_usd_per_mwh": 0.0, "max_event_hours": 0.0, "max_events": 0.0 }
            ]
        },
        "firmness": {
            "firm_pct": 100.0,
            "reserve_margin_pct": 15.0,
            "max_gas_backup_pct": 30.0
        },
        "resource_costs": {
            "solar": {
                "capex_per_kw_usd": 900.0,
                "om_per_kw_year_usd": 12.0,
                "life_years": 25.0,
                "capacity_factor_pct": 24.0,
                "max_capacity_mw": 200.0,
                "acres_per_mw": 6.0,
                "elcc_pct": 30.0
            },
            "wind": {
                "capex_per_kw_usd": 1_400.0,
                "om_per_kw_year_usd": 35.0,
                "life_years": 25.0,
                "capacity_factor_pct": 35.0,
                "elcc_pct": 15.0
            },
            "battery": {
                "energy_capex_per_kwh_usd": 250.0,
                "power_capex_per_kw_usd": 150.0,
                "om_per_kw_year_usd": 5.0,
                "rte_pct": 88.0,
                "elcc_pct": 90.0,
                "duration_hours": 4.0
            },
            "natural_gas": {
                "capex_per_kw_usd": 900.0,
                "om_per_kw_year_usd": 15.0,
                "heat_rate_btu_per_kwh": 9_500.0,
                "fuel_cost_usd_per_mmbtu": 3.50,
                "fuel_price_escalation_pct": 3.0,
                "var_om_per_mwh_usd": 2.50,
                "elcc_pct": 95.0
            },
            "esa_grid": {
                "available": true,
                "max_capacity_mw": 40.0,
                "import_limit_mw": 40.0,
                "elcc_pct": 95.0,
                "energy_price_usd_per_mwh": 45.0,
                "energy_escalation_pct": 2.5,
                "demand_charge_usd_per_kw_month": 12.0
            }
        },
        "revenue": {
            "base_lease_rate_usd_per_mw_month": 120_000.0,
            "escalation_pct": 2.5,
            "stabilized_occupancy_pct": 95.0,
            "absorption_period_years": 2.0,
            "asset_mgmt_fee_pct": 2.0
        },
        "opex": {
            "facility_ops_cost_usd": 4_000_000.0,
            "property_tax_rate_pct": 1.2,
            "insurance_usd_per_mw_year_usd": 8_000.0,
            "other_ga_cost_usd": 1_500_000.0,
            "general_inflation_pct": 2.5,
            "opex_escalation_rate_pct": 2.5
        },
        "analysis": {
            "period_years": 25,
            "discount_rate_pct": 9.0,
            "hurdle_irr_pct": 14.0,
            "target_irr_buffer_pct": 1.0,
            "dynamic_pricing_enabled": true,
            "max_lease_rate_usd_per_mw_month": 400_000.0,
            "debt_ratio_pct": 60.0,
            "debt_rate_pct": 7.0,
            "debt_term_years": 15
        }
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLand {
    pub acres: f64,
    pub price_per_acre: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preconstruction {
    pub line_items_usd: f64,
    pub contingency_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerInfrastructure {
    pub substation_cost_usd: f64,
    pub transmission_cost_per_mile_usd: f64,
    pub distance_miles: f64,
    pub network_cost_usd: f64,
    pub distribution_cost_usd: f64,
    pub contingency_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCenter {
    pub total_it_capacity_mw: f64,
    pub cost_per_kw_usd: f64,
    pub ffe_cost_usd: f64,
    pub owners_cost_usd: f64,
    pub contingency_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadProfile {
    pub peak_it_load_mw: f64,
    pub min_operating_load_mw: f64,
    pub leasable_it_capacity_mw: f64,
    pub load_factor_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurtailmentTier {
    pub name: String,
    pub mw: f64,
    pub revenue_loss_rate_usd_per_mwh: f64,
    pub max_event_hours: f64,
    pub max_events: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curtailment {
    pub tiers: Vec<CurtailmentTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firmness {
    pub firm_pct: f64,
    pub reserve_margin_pct: f64,
    pub max_gas_backup_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarCosts {
    pub capex_per_kw_usd: f64,
    pub om_per_kw_year_usd: f64,
    pub life_years: f64,
    pub capacity_factor_pct: f64,
    pub max_capacity_mw: f64,
    pub acres_per_mw: f64,
    pub elcc_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindCosts {
    pub capex_per_kw_usd: f64,
    pub om_per_kw_year_usd: f64,
    pub life_years: f64,
    pub capacity_factor_pct: f64,
    pub elcc_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryCosts {
    pub energy_capex_per_kwh_usd: f64,
    pub power_capex_per_kw_usd: f64,
    pub om_per_kw_year_usd: f64,
    pub rte_pct: f64,
    pub elcc_pct: f64,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaturalGasCosts {
    pub capex_per_kw_usd: f64,
    pub om_per_kw_year_usd: f64,
    pub heat_rate_btu_per_kwh: f64,
    pub fuel_cost_usd_per_mmbtu: f64,
    pub fuel_price_escalation_pct: f64,
    pub var_om_per_mwh_usd: f64,
    pub elcc_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsaGridCosts {
    pub available: bool,
    pub max_capacity_mw: f64,
    pub import_limit_mw: f64,
    pub elcc_pct: f64,
    pub energy_price_usd_per_mwh: f64,
    pub energy_escalation_pct: f64,
    pub demand_charge_usd_per_kw_month: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCosts {
    pub solar: SolarCosts,
    pub wind: WindCosts,
    pub battery: BatteryCosts,
    pub natural_gas: NaturalGasCosts,
    pub esa_grid: EsaGridCosts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revenue {
    pub base_lease_rate_usd_per_mw_month: f64,
    pub escalation_pct: f64,
    pub stabilized_occupancy_pct: f64,
    pub absorption_period_years: f64,
    pub asset_mgmt_fee_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opex {
    pub facility_ops_cost_usd: f64,
    pub property_tax_rate_pct: f64,
    pub insurance_usd_per_mw_year_usd: f64,
    pub other_ga_cost_usd: f64,
    pub general_inflation_pct: f64,
    pub opex_escalation_rate_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub period_years: u32,
    pub discount_rate_pct: f64,
    pub hurdle_irr_pct: f64,
    pub target_irr_buffer_pct: f64,
    pub dynamic_pricing_enabled: bool,
    pub max_lease_rate_usd_per_mw_month: f64,
    pub debt_ratio_pct: f64,
    pub debt_rate_pct: f64,
    pub debt_term_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByogConfig {
    pub site_land: SiteLand,
    pub preconstruction: Preconstruction,
    pub power_infrastructure: PowerInfrastructure,
    pub data_center: DataCenter,
    pub load_profile: LoadProfile,
    pub curtailment: Curtailment,
    pub firmness: Firmness,
    pub resource_costs: ResourceCosts,
    pub revenue: Revenue,
    pub opex: Opex,
    pub analysis: Analysis,
}

impl ByogConfig {
    /// Merge `overrides` over the built-in defaults and deserialize into the
    /// typed tree.
    pub fn from_overrides(overrides: Option<&Value>) -> Result<Self, serde_json::Error> {
        let mut tree = default_payload();
        if let Some(overlay) = overrides {
            deep_merge(&mut tree, overlay);
        }
        serde_json::from_value(tree)
    }

    /// Reconcile `Σ tier.mw == peak_it_load_mw` by adjusting tier1's MW to
    /// absorb the discrepancy, and validate the remaining guardrails.
    pub fn validate_and_reconcile(&mut self) -> Result<(), retrofit_core::ValidationError> {
        use retrofit_core::ValidationError;

        if self.load_profile.peak_it_load_mw > self.data_center.total_it_capacity_mw {
            return Err(ValidationError::Guardrail(
                "peak_it_load_mw must be <= total_it_capacity_mw".to_string(),
            ));
        }
        if self.load_profile.min_operating_load_mw > self.load_profile.peak_it_load_mw {
            return Err(ValidationError::Guardrail(
                "min_operating_load_mw must be <= peak_it_load_mw".to_string(),
            ));
        }
        if self.load_profile.leasable_it_capacity_mw > self.data_center.total_it_capacity_mw {
            return Err(ValidationError::Guardrail(
                "leasable_it_capacity_mw must be <= total_it_capacity_mw".to_string(),
            ));
        }
        if self.resource_costs.natural_gas.fuel_cost_usd_per_mmbtu <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "resource_costs.natural_gas.fuel_cost_usd_per_mmbtu",
                value: self.resource_costs.natural_gas.fuel_cost_usd_per_mmbtu,
            });
        }

        let tier_sum: f64 = self.curtailment.tiers.iter().map(|t| t.mw).sum();
        let discrepancy = self.load_profile.peak_it_load_mw - tier_sum;
        if discrepancy.abs() > 1e-3 {
            if let Some(tier1) = self.curtailment.tiers.first_mut() {
                tier1.mw += discrepancy;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_payload_deserializes_into_typed_config() {
        let config = ByogConfig::from_overrides(None).expect("defaults should deserialize");
        assert_eq!(config.load_profile.peak_it_load_mw, 90.0);
    }

    #[test]
    fn overrides_replace_scalars_and_recurse_into_mappings() {
        let overlay = json!({
            "load_profile": { "peak_it_load_mw": 120.0 },
            "resource_costs": { "solar": { "capacity_factor_pct": 26.0 } }
        });
        let config = ByogConfig::from_overrides(Some(&overlay)).unwrap();
        assert_eq!(config.load_profile.peak_it_load_mw, 120.0);
        assert_eq!(config.resource_costs.solar.capacity_factor_pct, 26.0);
        // Untouched sibling fields survive the merge.
        assert_eq!(config.load_profile.min_operating_load_mw, 30.0);
        assert_eq!(config.resource_costs.solar.elcc_pct, 30.0);
    }

    #[test]
    fn tier_mismatch_is_reconciled_against_tier1() {
        let overlay = json!({ "load_profile": { "peak_it_load_mw": 150.0 } });
        let mut config = ByogConfig::from_overrides(Some(&overlay)).unwrap();
        config.validate_and_reconcile().unwrap();
        let tier_sum: f64 = config.curtailment.tiers.iter().map(|t| t.mw).sum();
        assert!((tier_sum - 150.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_peak_load_above_total_capacity() {
        let overlay = json!({ "load_profile": { "peak_it_load_mw": 500.0 } });
        let mut config = ByogConfig::from_overrides(Some(&overlay)).unwrap();
        assert!(config.validate_and_reconcile().is_err());
    }
}
