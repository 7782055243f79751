//! Net present value and internal rate of return via bisection.

const IRR_LOW: f64 = -0.99;
const IRR_HIGH: f64 = 3.0;
const IRR_MAX_ITERATIONS: usize = 200;
const IRR_TOLERANCE: f64 = 1e-7;

/// `Σ cashflows[t] / (1+rate)^t`, with `cashflows[0]` undiscounted (t=0).
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Bisect for a rate where NPV crosses zero. Returns `None` (not a
/// sentinel) when `NPV(low)` and `NPV(high)` share sign, i.e. there is no
/// real root in the bracket.
pub fn irr_bisection(cashflows: &[f64]) -> Option<f64> {
    let npv_low = npv(IRR_LOW, cashflows);
    let npv_high = npv(IRR_HIGH, cashflows);

    if npv_low.signum() == npv_high.signum() {
        return None;
    }

    let mut lo = IRR_LOW;
    let mut hi = IRR_HIGH;
    let mut npv_lo = npv_low;
    let mut mid = (lo + hi) / 2.0;

    for _ in 0..IRR_MAX_ITERATIONS {
        mid = (lo + hi) / 2.0;
        let npv_mid = npv(mid, cashflows);
        if npv_mid.abs() <= IRR_TOLERANCE {
            return Some(mid);
        }
        if npv_mid.signum() == npv_lo.signum() {
            lo = mid;
            npv_lo = npv_mid;
        } else {
            hi = mid;
        }
    }

    Some(mid)
}

/// First year where cumulative cash flow crosses zero, linearly
/// interpolated within that year. `cashflows[0]` is the year-0 outflow.
pub fn payback_years(cashflows: &[f64]) -> Option<f64> {
    let mut cumulative = cashflows[0];
    for (year, &cf) in cashflows.iter().enumerate().skip(1) {
        let prev_cumulative = cumulative;
        cumulative += cf;
        if prev_cumulative < 0.0 && cumulative >= 0.0 {
            let fraction = -prev_cumulative / cf;
            return Some((year - 1) as f64 + fraction);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npv_at_zero_rate_is_the_undiscounted_sum() {
        let cfs = vec![-100.0, 40.0, 40.0, 40.0];
        assert!((npv(0.0, &cfs) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn irr_satisfies_npv_near_zero() {
        let cfs = vec![-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0];
        let rate = irr_bisection(&cfs).expect("should find a crossing");
        assert!(npv(rate, &cfs).abs() < 1e-4);
    }

    #[test]
    fn no_sign_change_returns_none() {
        let cfs = vec![100.0, 100.0, 100.0];
        assert!(irr_bisection(&cfs).is_none());
    }

    #[test]
    fn payback_interpolates_within_crossing_year() {
        let cfs = vec![-100.0, 40.0, 40.0, 40.0];
        let payback = payback_years(&cfs).unwrap();
        // cumulative: -100, -60, -20, +20 -> crosses during year 3
        assert!((payback - 2.5).abs() < 1e-9);
    }

    #[test]
    fn payback_is_none_when_never_recovered() {
        let cfs = vec![-100.0, 10.0, 10.0];
        assert!(payback_years(&cfs).is_none());
    }
}
