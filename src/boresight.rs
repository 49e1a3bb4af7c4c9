//! # Boresight / module transform
//!
//! A module at polar offset `(d, θ)` from the boresight (see [`ModuleOffset`]) looks at a
//! different horizontal direction than the boresight itself. With the boresight at `(az₀, a₀)`:
//!
//! ```text
//! sin a₁ = sin a₀ cos d + sin d cos a₀ sin(θ + a₀)
//! ```
//!
//! and `az₁` follows from the matching sine/cosine pair, see [`module_from_boresight`].
//!
//! ## Inverse
//!
//! Going from the module path back to the boresight path requires solving the altitude equation
//! for `a₀`, one sample at a time:
//!
//! ```text
//! f(a₀) = sin a₀ cos d + sin d cos a₀ sin(θ + a₀) − sin a₁ = 0,      a₀ ∈ [−90°, 90°]
//! ```
//!
//! [`solve_boresight_altitude`] uses Brent's method from the `roots` crate. Consecutive samples
//! are close, so each solve first tries a narrow bracket around the previous solution and only
//! falls back to the full `[−90°, 90°]` bracket when the narrow one does not bracket a root.
//! A sample with no root becomes NaN and the batch carries on.
//!
//! The azimuth difference then comes from the spherical law of cosines,
//! `cos Δ = (cos d − sin a₀ sin a₁) / (cos a₀ cos a₁)`, and takes the sign of `cos(θ + a₀)`.
//!
//! A zero distance is an exact identity in both directions.
use log::warn;
use roots::{find_root_brent, SimpleConvergency};

use crate::constants::{Degree, Radian, RADEG};
use crate::instrument::ModuleOffset;

const HALF_PI: Radian = std::f64::consts::FRAC_PI_2;

/// Half-width of the warm-start bracket around the previous solution, in radians.
const WARM_BRACKET: Radian = 0.01;

/// Horizontal direction seen by a module when the boresight points at `(az, alt)`.
///
/// Return
/// ----------
/// * `(az, alt)` of the module, in degrees. The azimuth is in `(−180, 180]`.
pub fn module_from_boresight(az: Degree, alt: Degree, offset: &ModuleOffset) -> (Degree, Degree) {
    if offset.is_boresight() {
        return (az, alt);
    }

    let (d, theta) = (offset.distance * RADEG, offset.position_angle * RADEG);
    let (az0, alt0) = (az * RADEG, alt * RADEG);
    let (sin_d, cos_d) = d.sin_cos();
    let (sin_a0, cos_a0) = alt0.sin_cos();
    let (sin_az0, cos_az0) = az0.sin_cos();
    let (sin_ta, cos_ta) = (theta + alt0).sin_cos();

    let alt1 = (sin_a0 * cos_d + sin_d * cos_a0 * sin_ta).asin();

    // the common 1 / cos(alt1) factor cancels in atan2
    let sin_az1 = cos_a0 * sin_az0 * cos_d + cos_az0 * cos_ta * sin_d
        - sin_a0 * sin_az0 * sin_d * sin_ta;
    let cos_az1 = cos_a0 * cos_az0 * cos_d
        - sin_az0 * cos_ta * sin_d
        - sin_a0 * cos_az0 * sin_d * sin_ta;

    (sin_az1.atan2(cos_az1) / RADEG, alt1 / RADEG)
}

/// Solve the boresight altitude that puts the module at altitude `target`.
///
/// Arguments
/// -----------------
/// * `offset`: the module offset.
/// * `previous_guess`: boresight altitude of the previous sample, in radians.
/// * `target`: module altitude, in radians.
///
/// Return
/// ----------
/// * The boresight altitude in radians, or `None` if no root lies in `[−π/2, π/2]`.
pub fn solve_boresight_altitude(
    offset: &ModuleOffset,
    previous_guess: Radian,
    target: Radian,
) -> Option<Radian> {
    let (d, theta) = (offset.distance * RADEG, offset.position_angle * RADEG);
    let (sin_d, cos_d) = d.sin_cos();
    let sin_target = target.sin();

    let f = |a: f64| a.sin() * cos_d + sin_d * a.cos() * (theta + a).sin() - sin_target;

    let mut convergency = SimpleConvergency {
        eps: 1e-12f64,
        max_iter: 100,
    };

    if previous_guess.is_finite() {
        let low = (previous_guess - WARM_BRACKET).max(-HALF_PI);
        let high = (previous_guess + WARM_BRACKET).min(HALF_PI);
        if let Ok(root) = find_root_brent(low, high, &f, &mut convergency) {
            return Some(root);
        }
    }

    find_root_brent(-HALF_PI, HALF_PI, &f, &mut convergency).ok()
}

/// Boresight direction that puts a module at `(az, alt)`, given the boresight altitude.
fn boresight_azimuth(az1: Radian, alt1: Radian, alt0: Radian, d: Radian, theta: Radian) -> Radian {
    let cos_diff =
        ((d.cos() - alt0.sin() * alt1.sin()) / (alt0.cos() * alt1.cos())).clamp(-1.0, 1.0);
    let mut diff = cos_diff.acos();
    if (theta + alt0).cos() < 0.0 {
        diff = -diff;
    }
    az1 - diff
}

/// Module path seen from a boresight path.
///
/// Return
/// ----------
/// * `(az, alt)` series in degrees. The azimuth is left for the caller to normalize.
pub fn view_from_boresight(
    az: &[Degree],
    alt: &[Degree],
    offset: &ModuleOffset,
) -> (Vec<Degree>, Vec<Degree>) {
    az.iter()
        .zip(alt)
        .map(|(a, h)| module_from_boresight(*a, *h, offset))
        .unzip()
}

/// Boresight path producing a given module path.
///
/// The altitude of each sample is solved with [`solve_boresight_altitude`], warm-started from the
/// previous sample (the first sample starts from its own module altitude). Samples without a
/// solution are NaN in both outputs.
///
/// Return
/// ----------
/// * `(az, alt)` series in degrees. The azimuth is left for the caller to normalize.
pub fn boresight_from_module(
    az: &[Degree],
    alt: &[Degree],
    offset: &ModuleOffset,
) -> (Vec<Degree>, Vec<Degree>) {
    if offset.is_boresight() {
        return (az.to_vec(), alt.to_vec());
    }

    let (d, theta) = (offset.distance * RADEG, offset.position_angle * RADEG);
    let mut guess = alt.first().map_or(0.0, |a| a * RADEG);
    let mut failed = 0usize;

    let (az0, alt0): (Vec<Degree>, Vec<Degree>) = az
        .iter()
        .zip(alt)
        .enumerate()
        .map(|(i, (a1, h1))| {
            let (az1, alt1) = (a1 * RADEG, h1 * RADEG);
            match solve_boresight_altitude(offset, guess, alt1) {
                Some(alt0) => {
                    guess = alt0;
                    let az0 = boresight_azimuth(az1, alt1, alt0, d, theta);
                    (az0 / RADEG, alt0 / RADEG)
                }
                None => {
                    warn!("No boresight altitude for sample {i} (module alt = {h1} deg)");
                    failed += 1;
                    (f64::NAN, f64::NAN)
                }
            }
        })
        .unzip();

    if failed > 0 {
        warn!(
            "{failed} of {} samples have no boresight solution",
            alt.len()
        );
    }
    (az0, alt0)
}

#[cfg(test)]
mod boresight_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_offset_is_identity() {
        let offset = ModuleOffset::BORESIGHT;
        assert_eq!(module_from_boresight(123.4, 56.7, &offset), (123.4, 56.7));

        let az = [10.0, 10.5, 11.0];
        let alt = [40.0, 40.2, 40.4];
        let (az_b, alt_b) = boresight_from_module(&az, &alt, &offset);
        assert_eq!(alt_b, alt.to_vec());
        assert_eq!(az_b, az.to_vec());
    }

    #[test]
    fn test_module_altitude_offset() {
        // theta + alt = 90 deg: the module sits straight above the boresight
        let offset = ModuleOffset::new(1.5, 45.0);
        let (az, alt) = module_from_boresight(200.0, 45.0, &offset);
        assert_relative_eq!(alt, 46.5, epsilon = 1e-9);
        assert_relative_eq!(az, 200.0 - 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solver_recovers_altitude() {
        let offset = ModuleOffset::new(1.78, -30.0);
        for alt0 in [-20.0f64, 10.0, 45.0, 70.0] {
            let (_, alt1) = module_from_boresight(0.0, alt0, &offset);
            // cold start from the module altitude and warm start from the answer
            for guess in [alt1 * RADEG, alt0 * RADEG, f64::NAN] {
                let root = solve_boresight_altitude(&offset, guess, alt1 * RADEG).unwrap();
                assert_relative_eq!(root, alt0 * RADEG, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_unreachable_target_is_none() {
        // a module below the boresight never climbs above 90 - d
        let offset = ModuleOffset::new(5.0, 180.0);
        assert!(solve_boresight_altitude(&offset, 0.0, 89.9 * RADEG).is_none());
    }

    #[test]
    fn test_round_trip() {
        for (d, theta) in [(1.78, -90.0), (1.78, 30.0), (0.5, 150.0), (2.0, -150.0)] {
            let offset = ModuleOffset::new(d, theta);
            let az: Vec<f64> = (0..50).map(|i| 120.0 + 0.05 * i as f64).collect();
            let alt: Vec<f64> = (0..50).map(|i| 35.0 + 0.02 * i as f64).collect();

            let (az_m, alt_m) = view_from_boresight(&az, &alt, &offset);
            let (az_b, alt_b) = boresight_from_module(&az_m, &alt_m, &offset);
            for i in 0..az.len() {
                assert_relative_eq!(alt_b[i], alt[i], epsilon = 1e-6);
                assert_relative_eq!(az_b[i], az[i], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_failed_samples_are_nan() {
        let offset = ModuleOffset::new(5.0, 180.0);
        let (az, alt) = boresight_from_module(&[10.0, 10.0, 10.0], &[30.0, 89.9, 30.2], &offset);
        assert!(alt[1].is_nan() && az[1].is_nan());
        assert!(alt[0].is_finite() && alt[2].is_finite());
    }
}
