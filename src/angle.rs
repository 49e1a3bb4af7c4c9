//! Azimuth normalization.
//!
//! Azimuths are brought into the 360° window centred on the first finite sample, after that sample
//! is itself wrapped into `[0, 360)`. A path crossing north therefore stays continuous instead of
//! jumping between 359° and 0°. NaN samples (failed boresight solves) pass through unchanged.
use crate::constants::Degree;

/// Wrap `values` into `[low, low + 360)` with `low = first.rem_euclid(360) − 180`, `first` being
/// the first finite value. Without any finite value the input is returned as is.
pub fn normalize_azimuth(values: &[Degree]) -> Vec<Degree> {
    let Some(first) = values.iter().find(|v| v.is_finite()) else {
        return values.to_vec();
    };
    let low = first.rem_euclid(360.0) - 180.0;
    values
        .iter()
        .map(|v| (v - low).rem_euclid(360.0) + low)
        .collect()
}

#[cfg(test)]
mod angle_test {
    use super::*;
    use approx::assert_relative_eq;
    use itertools::Itertools;

    #[test]
    fn test_first_sample_in_range() {
        let out = normalize_azimuth(&[-10.0, 5.0, 700.0]);
        assert_relative_eq!(out[0], 350.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 365.0, epsilon = 1e-12);
        assert_relative_eq!(out[2], 340.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_jump_across_north() {
        // true motion: 350 -> 370 in 0.5 deg steps, reported modulo 360
        let raw: Vec<f64> = (0..41).map(|i| (350.0 + 0.5 * i as f64) % 360.0).collect();
        let out = normalize_azimuth(&raw);
        for (a, b) in out.iter().tuple_windows() {
            assert_relative_eq!(b - a, 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_window_centered_on_first() {
        let raw = [100.0, 279.0, -79.0, 281.0];
        let out = normalize_azimuth(&raw);
        assert!(out.iter().all(|v| (-80.0..280.0).contains(v)));
        assert_relative_eq!(out[3], -79.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty() {
        assert!(normalize_azimuth(&[]).is_empty());
    }

    #[test]
    fn test_leading_nan_keeps_the_rest() {
        let out = normalize_azimuth(&[f64::NAN, -10.0, f64::NAN, 5.0]);
        assert!(out[0].is_nan() && out[2].is_nan());
        assert_relative_eq!(out[1], 350.0, epsilon = 1e-12);
        assert_relative_eq!(out[3], 365.0, epsilon = 1e-12);

        let all_nan = normalize_azimuth(&[f64::NAN, f64::NAN]);
        assert!(all_nan.iter().all(|v| v.is_nan()));
    }
}
