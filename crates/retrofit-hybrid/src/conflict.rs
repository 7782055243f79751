//! Deterministic weighted sampling of representative hours where gas
//! dispatch is forbidden.

use crate::types::REP_HOURS;
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// Fixed seed so identical `(pct, profile)` inputs always yield the same
/// conflict set.
const CONFLICT_SEED: u64 = 42;

/// Select `round(288 * pct)` representative hours, weighted toward
/// low-solar periods, to mark as gas-forbidden.
///
/// Returns an empty set when `pct <= 0`.
pub fn sample_conflict_hours(profile: &[f64], pct: f64) -> BTreeSet<usize> {
    if pct <= 0.0 {
        return BTreeSet::new();
    }

    let target = (REP_HOURS as f64 * pct).round() as usize;
    if target == 0 {
        return BTreeSet::new();
    }

    let weights: Vec<f64> = profile.iter().map(|&cf| 1.0 - cf + 0.1).collect();
    let dist = match WeightedIndex::new(&weights) {
        Ok(d) => d,
        Err(_) => return BTreeSet::new(),
    };

    let mut rng = StdRng::seed_from_u64(CONFLICT_SEED);
    let mut set = BTreeSet::new();
    // Drawing with replacement until the set fills; weights are static, so
    // this converges quickly except for pathological (all-zero-except-one)
    // weight vectors, which can't occur here since every weight is >= 0.1.
    while set.len() < target.min(REP_HOURS) {
        let idx = rng.sample(&dist);
        set.insert(idx);
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::synthesize;

    #[test]
    fn zero_pct_yields_empty_set() {
        let profile = synthesize(35.0);
        assert!(sample_conflict_hours(&profile, 0.0).is_empty());
    }

    #[test]
    fn negative_pct_yields_empty_set() {
        let profile = synthesize(35.0);
        assert!(sample_conflict_hours(&profile, -0.5).is_empty());
    }

    #[test]
    fn set_size_matches_rounded_target() {
        let profile = synthesize(35.0);
        let set = sample_conflict_hours(&profile, 0.10);
        assert_eq!(set.len(), (REP_HOURS as f64 * 0.10).round() as usize);
    }

    #[test]
    fn same_inputs_produce_identical_sets() {
        let profile = synthesize(35.0);
        let a = sample_conflict_hours(&profile, 0.25);
        let b = sample_conflict_hours(&profile, 0.25);
        assert_eq!(a, b);
    }

    #[test]
    fn full_coverage_selects_every_hour() {
        let profile = synthesize(35.0);
        let set = sample_conflict_hours(&profile, 1.0);
        assert_eq!(set.len(), REP_HOURS);
    }
}
