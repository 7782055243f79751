//! Capital recovery and gas cost primitives.
//!
//! These three functions are the entire "leaf" layer of the cost model:
//! every annualized coefficient the LP builder and the BYOG engine use is
//! built from [`capital_recovery_factor`], and every gas dollar figure
//! traces back to [`gas_variable_cost_per_mwh`].

/// Capital recovery factor for rate `r` and term `n` years.
///
/// `CRF(r,n) = r(1+r)^n / ((1+r)^n - 1)`, converting a lump-sum capital
/// expenditure into its equivalent uniform annual payment. The zero-rate
/// limit `CRF(0,n) = 1/n` is handled explicitly rather than left to float
/// division, since `(1+0)^n - 1 == 0` would otherwise divide by zero.
pub fn capital_recovery_factor(rate: f64, term_years: f64) -> f64 {
    if rate.abs() < 1e-12 {
        return 1.0 / term_years;
    }
    let growth = (1.0 + rate).powf(term_years);
    rate * growth / (growth - 1.0)
}

/// Gas variable cost in $/MWh from heat rate (BTU/kWh) and fuel price ($/MMBtu).
///
/// `H` is BTU per kWh delivered; dividing by 1000 converts BTU/kWh into
/// MMBtu/MWh so the product with `$/MMBtu` comes out in $/MWh.
pub fn gas_variable_cost_per_mwh(heat_rate_btu_per_kwh: f64, gas_price_per_mmbtu: f64) -> f64 {
    heat_rate_btu_per_kwh * gas_price_per_mmbtu / 1000.0
}

/// Reference LCOE for a gas-only plant, in $/MWh.
///
/// `fixed_om_per_kw_year` and `capex_per_kw` are both zero for an existing
/// plant being retrofitted, collapsing the second and third terms to zero
/// and leaving just the fuel cost — that's the `scenario 2` check in the
/// end-to-end test suite.
pub fn gas_only_lcoe_per_mwh(
    heat_rate_btu_per_kwh: f64,
    gas_price_per_mmbtu: f64,
    fixed_om_per_kw_year: f64,
    capex_per_kw: f64,
    capacity_factor: f64,
    discount_rate: f64,
    term_years: f64,
) -> f64 {
    let fuel = gas_variable_cost_per_mwh(heat_rate_btu_per_kwh, gas_price_per_mmbtu);
    let annual_mwh_per_kw = capacity_factor * 8760.0 / 1000.0;
    let fixed_om_term = fixed_om_per_kw_year / annual_mwh_per_kw;
    let crf = capital_recovery_factor(discount_rate, term_years);
    let capex_term = capex_per_kw * crf / annual_mwh_per_kw;
    fuel + fixed_om_term + capex_term
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crf_zero_rate_is_inverse_term() {
        assert!((capital_recovery_factor(0.0, 25.0) - 1.0 / 25.0).abs() < 1e-12);
    }

    #[test]
    fn crf_matches_annuity_identity() {
        let r = 0.06;
        let n = 25.0;
        let crf = capital_recovery_factor(r, n);
        let growth = (1.0 + r).powf(n);
        assert!((crf * (growth - 1.0) / r - growth).abs() < 1e-9);
    }

    #[test]
    fn crf_sanity_value() {
        // CRF(0.06, 25) ~= 0.07823
        assert!((capital_recovery_factor(0.06, 25.0) - 0.07823).abs() < 1e-4);
    }

    #[test]
    fn gas_only_lcoe_reduces_to_fuel_for_existing_plant() {
        let lcoe = gas_only_lcoe_per_mwh(9.5 * 1000.0, 5.00, 0.0, 0.0, 0.85, 0.06, 25.0);
        // H (BTU/kWh) * P ($/MMBtu) / 1000 = 9.5 * 5.00 = 47.5 $/MWh (H given as MMBtu/MWh-equivalent
        // units in the end-to-end scenario: 9.5 MMBtu/MWh heat rate * 1000 BTU/kWh per MMBtu/MWh).
        assert!((lcoe - 47.5).abs() < 1.0);
    }
}
