//! Solar capacity-factor profile synthesis and 8760-to-288 compression.

use crate::types::REP_HOURS;
use retrofit_core::ValidationError;
use std::f64::consts::PI;

const DAYS_PER_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Synthesize a 288-step (12 month x 24 hour) capacity-factor profile from
/// latitude, using a raised-cosine daylight shape with a monthly peak CF
/// and day-length model.
pub fn synthesize(latitude: f64) -> Vec<f64> {
    let mut profile = vec![0.0; REP_HOURS];

    for m in 0..12 {
        let phase = 2.0 * PI * (m as f64 - 2.5) / 12.0;
        let day_length = (12.0 + 2.5 * phase.sin() + 2.0 * (latitude.abs() / 90.0) * phase.sin())
            .clamp(8.0, 16.0);
        let peak_cf = (0.22 + 0.08 * phase.sin() + 0.05 * (1.0 - latitude.abs() / 60.0))
            .clamp(0.10, 0.40);

        let sunrise = 12.0 - day_length / 2.0;
        let sunset = 12.0 + day_length / 2.0;

        for h in 0..24 {
            let hf = h as f64;
            let cf = if hf >= sunrise && hf <= sunset {
                let shape = (PI * (hf - 12.0) / (day_length / 2.0)).cos().max(0.0);
                peak_cf * shape
            } else {
                0.0
            };
            profile[m * 24 + h] = cf;
        }
    }

    profile
}

/// Rescale a 288-step profile so its mean equals `hint`, clamping each
/// sample to [0, 1].
pub fn rescale_to_hint(profile: &[f64], hint: f64) -> Vec<f64> {
    let mean = profile.iter().sum::<f64>() / profile.len() as f64;
    if mean <= 0.0 {
        return profile.to_vec();
    }
    let factor = hint / mean;
    profile.iter().map(|cf| (cf * factor).clamp(0.0, 1.0)).collect()
}

/// Compress an 8760-hour series into a 288-step representative profile by
/// averaging each month's h-th hour across all days of that month.
pub fn compress_8760(series: &[f64]) -> Result<Vec<f64>, ValidationError> {
    if series.len() != 8760 {
        return Err(ValidationError::BadProfileLength(series.len()));
    }

    let mut sums = vec![0.0; REP_HOURS];
    let mut offset = 0usize;
    for (m, &days) in DAYS_PER_MONTH.iter().enumerate() {
        for _ in 0..days {
            for h in 0..24 {
                sums[m * 24 + h] += series[offset + h];
            }
            offset += 24;
        }
    }

    Ok(sums
        .into_iter()
        .enumerate()
        .map(|(idx, sum)| {
            let m = idx / 24;
            sum / DAYS_PER_MONTH[m] as f64
        })
        .collect())
}

/// Accept either a 288-step profile as-is or an 8760-step series to compress.
pub fn resolve_supplied_profile(series: &[f64]) -> Result<Vec<f64>, ValidationError> {
    match series.len() {
        REP_HOURS => Ok(series.to_vec()),
        8760 => compress_8760(series),
        n => Err(ValidationError::BadProfileLength(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_profile_stays_in_unit_interval() {
        for &lat in &[0.0, 20.0, 35.0, 60.0, -40.0] {
            let profile = synthesize(lat);
            assert_eq!(profile.len(), REP_HOURS);
            for &cf in &profile {
                assert!((0.0..=1.0).contains(&cf), "lat={lat} cf={cf}");
            }
        }
    }

    #[test]
    fn synthesized_profile_has_positive_total_for_moderate_latitudes() {
        for &lat in &[0.0, 20.0, 35.0, 60.0] {
            let total: f64 = synthesize(lat).iter().sum();
            assert!(total > 0.0, "lat={lat}");
        }
    }

    #[test]
    fn midnight_and_eleven_pm_hours_are_dark() {
        for &lat in &[0.0, 20.0, 35.0, 60.0] {
            let profile = synthesize(lat);
            for m in 0..12 {
                assert_eq!(profile[m * 24], 0.0);
                assert_eq!(profile[m * 24 + 23], 0.0);
            }
        }
    }

    #[test]
    fn rescale_matches_hint_mean() {
        let base = synthesize(35.0);
        let rescaled = rescale_to_hint(&base, 0.20);
        let mean = rescaled.iter().sum::<f64>() / rescaled.len() as f64;
        assert!((mean - 0.20).abs() < 1e-3);
    }

    #[test]
    fn compression_round_trips_a_constant_per_hour_series() {
        let mut series = vec![0.0; 8760];
        let mut offset = 0usize;
        for (m, &days) in DAYS_PER_MONTH.iter().enumerate() {
            for _ in 0..days {
                for h in 0..24 {
                    series[offset + h] = (m * 24 + h) as f64 * 0.001;
                }
                offset += 24;
            }
        }
        let compressed = compress_8760(&series).unwrap();
        for idx in 0..REP_HOURS {
            assert!((compressed[idx] - idx as f64 * 0.001).abs() < 1e-9);
        }
    }

    #[test]
    fn compression_rejects_wrong_length() {
        assert!(compress_8760(&vec![0.0; 100]).is_err());
    }
}
