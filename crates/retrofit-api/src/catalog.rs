//! Built-in cost-scenario catalog: `base`, `low`, `high`, `high_gas`.

use retrofit_core::{CostScenario, ValidationError};

fn base() -> CostScenario {
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

fn low() -> CostScenario {
    CostScenario {
        name: "low".to_string(),
        solar_capex_per_kw: 650.0,
        solar_om_per_kw_year: 9.0,
        battery_energy_capex_per_kwh: 180.0,
        battery_power_capex_per_kw: 110.0,
        battery_om_per_kw_year: 3.5,
        gas_price_per_mmbtu: 2.50,
        wacc: 0.06,
        ..base()
    }
}

fn high() -> CostScenario {
    CostScenario {
        name: "high".to_string(),
        solar_capex_per_kw: 1_250.0,
        solar_om_per_kw_year: 16.0,
        battery_energy_capex_per_kwh: 340.0,
        battery_power_capex_per_kw: 200.0,
        battery_om_per_kw_year: 7.0,
        gas_price_per_mmbtu: 5.00,
        wacc: 0.09,
        ..base()
    }
}

fn high_gas() -> CostScenario {
    CostScenario {
        name: "high_gas".to_string(),
        gas_price_per_mmbtu: 7.00,
        ..base()
    }
}

/// All built-in scenarios, in catalog order.
pub fn catalog() -> Vec<CostScenario> {
    vec![base(), low(), high(), high_gas()]
}

/// Look up a scenario by name, or report it as unknown.
pub fn resolve(name: &str) -> Result<CostScenario, ValidationError> {
    catalog()
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ValidationError::UnknownScenario(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_the_four_documented_scenarios() {
        let names: Vec<String> = catalog().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["base", "low", "high", "high_gas"]);
    }

    #[test]
    fn every_catalog_entry_validates() {
        for scenario in catalog() {
            assert!(scenario.validate().is_ok(), "{} failed validation", scenario.name);
        }
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        assert!(resolve("nonexistent").is_err());
    }
}
