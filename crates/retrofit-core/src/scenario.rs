use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A named bundle of cost assumptions, immutable for the lifetime of a
/// single optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostScenario {
    pub name: String,
    pub solar_capex_per_kw: f64,
    pub solar_om_per_kw_year: f64,
    pub solar_life_years: f64,
    pub battery_energy_capex_per_kwh: f64,
    pub battery_power_capex_per_kw: f64,
    pub battery_om_per_kw_year: f64,
    pub battery_life_years: f64,
    pub inverter_efficiency: f64,
    pub battery_rte: f64,
    pub wacc: f64,
    pub gas_price_per_mmbtu: f64,
}

impl CostScenario {
    /// Reject scenarios with parameters outside their documented domains.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_open_unit_interval("inverter_efficiency", self.inverter_efficiency)?;
        check_open_unit_interval("battery_rte", self.battery_rte)?;
        if !(0.0..1.0).contains(&self.wacc) {
            return Err(ValidationError::OutOfRange {
                field: "wacc",
                value: self.wacc,
                min: 0.0,
                max: 1.0,
            });
        }
        check_positive("solar_capex_per_kw", self.solar_capex_per_kw)?;
        check_positive("battery_energy_capex_per_kwh", self.battery_energy_capex_per_kwh)?;
        check_positive("battery_power_capex_per_kw", self.battery_power_capex_per_kw)?;
        check_positive("solar_life_years", self.solar_life_years)?;
        check_positive("battery_life_years", self.battery_life_years)?;
        check_positive("gas_price_per_mmbtu", self.gas_price_per_mmbtu)?;
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::MustBePositive { field, value })
    }
}

fn check_open_unit_interval(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CostScenario {
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

    #[test]
    fn accepts_well_formed_scenario() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_wacc_at_or_above_one() {
        let mut s = valid();
        s.wacc = 1.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_zero_round_trip_efficiency() {
        let mut s = valid();
        s.battery_rte = 0.0;
        assert!(s.validate().is_err());
    }
}
