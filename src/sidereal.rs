//! # Sidereal clock
//!
//! Converts the start convention of an [`ObservationSpec`] into the local sidereal time (LST) of
//! the first sample, then advances it along the time offsets of a trajectory:
//!
//! ```text
//! lst(t) = lst0 + t / 3600 · 1.002737909350795          (hours)
//! ```
//!
//! ## Start conventions
//!
//! * **Datetime**: Greenwich mean sidereal time ([`gmst`], IAU 1982 polynomial) at the epoch, UTC
//!   standing in for UT1, plus the site longitude. Nutation is not applied.
//! * **Hour angle** `h`: `lst0 = h + (extra_ra_offset + ra) / 15`.
//! * **LST** `l`: `lst0 = l`.
//! * **Elevation** `(el, moving_up)`: the hour angle at which the target (declination shifted by
//!   `extra_dec_offset`) reaches `el` has two candidates `±ha`, see [`HourAngleBranch`]. Each one is
//!   classified rising or setting by probing the altitude 1° later in hour angle, and exactly one
//!   candidate must move in the requested direction.
//!
//! `lst0` is wrapped into `[0, 24)` hours.
use hifitime::Epoch;

use crate::constants::{
    Degree, Hour, Radian, Second, BRANCH_PROBE, DEG_PER_HOUR, DPI, MJD, RADEG, SECONDS_PER_DAY,
    SECONDS_PER_HOUR, SIDEREAL_RATE, T2000,
};
use crate::observation::{ObservationSpec, StartBasis};
use crate::scan_errors::ScanError;

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982 polynomial formula for the mean sidereal time at 0h UT1,
/// plus the fractional-day correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # References
/// * IAU 1982, IERS Conventions 1996/2000.
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: MJD) -> Radian {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    // fraction of the current day, in radians of a solar day
    let h = (tjm - itjm) * DPI;
    (gmst0 + h * RAP).rem_euclid(DPI)
}

/// Local mean sidereal time at a UTC epoch and east longitude.
///
/// Return
/// ----------
/// * LST in hours, in `[0, 24)`.
pub fn local_sidereal_time(epoch: &Epoch, longitude: Degree) -> Hour {
    let gmst_deg = gmst(epoch.to_mjd_utc_days()) / RADEG;
    (gmst_deg + longitude).rem_euclid(360.0) / DEG_PER_HOUR
}

/// Altitude of a source at hour angle `ha` and declination `dec` seen from latitude `lat`.
pub fn altitude(dec: Radian, lat: Radian, ha: Radian) -> Radian {
    (dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos()).asin()
}

/// The two hour angles at which a source crosses a given elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourAngleBranch {
    /// `+acos(…)`, west of the meridian.
    Positive,
    /// `−acos(…)`, east of the meridian.
    Negative,
}

impl HourAngleBranch {
    pub const ALL: [HourAngleBranch; 2] = [HourAngleBranch::Positive, HourAngleBranch::Negative];

    /// Signed hour angle of this branch for the principal solution `ha ∈ [0, π]`.
    pub fn apply(&self, ha: Radian) -> Radian {
        match self {
            HourAngleBranch::Positive => ha,
            HourAngleBranch::Negative => -ha,
        }
    }
}

/// Whether a source is gaining altitude at a given hour angle.
///
/// The altitude is compared with the one [`BRANCH_PROBE`] degrees later in hour angle.
pub fn is_rising(dec: Radian, lat: Radian, ha: Radian) -> bool {
    altitude(dec, lat, ha + BRANCH_PROBE * RADEG) - altitude(dec, lat, ha) > 0.0
}

/// Hour angle at which a source reaches `elevation`, on the side given by `moving_up`.
///
/// Arguments
/// -----------------
/// * `elevation`: requested altitude, in degrees.
/// * `dec`: source declination, in degrees.
/// * `latitude`: site latitude, in degrees.
/// * `moving_up`: `true` to pick the rising crossing.
///
/// Return
/// ----------
/// * The hour angle in degrees, in `[-180, 180]`.
///
/// Errors
/// ----------
/// * [`ScanError::UnreachableElevation`] if the source never reaches `elevation`.
/// * [`ScanError::AmbiguousHourAngleBranch`] unless exactly one branch moves in the requested
///   direction (for instance at transit, where both candidates coincide).
pub fn elevation_hour_angle(
    elevation: Degree,
    dec: Degree,
    latitude: Degree,
    moving_up: bool,
) -> Result<Degree, ScanError> {
    let (alt, d, lat) = (elevation * RADEG, dec * RADEG, latitude * RADEG);
    let cos_ha = (alt.sin() - d.sin() * lat.sin()) / (d.cos() * lat.cos());
    if !(-1.0..=1.0).contains(&cos_ha) {
        return Err(ScanError::UnreachableElevation {
            elevation,
            dec,
            latitude,
        });
    }
    let ha = cos_ha.acos();

    let matching: Vec<HourAngleBranch> = HourAngleBranch::ALL
        .into_iter()
        .filter(|branch| is_rising(d, lat, branch.apply(ha)) == moving_up)
        .collect();

    match matching.as_slice() {
        [branch] => Ok(branch.apply(ha) / RADEG),
        _ => Err(ScanError::AmbiguousHourAngleBranch {
            matching: matching.len(),
            moving_up,
        }),
    }
}

/// Local sidereal time of an observation, anchored on its first sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiderealClock {
    start_lst: Hour,
}

impl SiderealClock {
    /// Resolve the start convention of `spec`.
    ///
    /// Arguments
    /// -----------------
    /// * `spec`: the observation.
    /// * `extra_ra_offset`, `extra_dec_offset`: offsets of the first pattern sample, in degrees.
    ///
    /// Errors
    /// ----------
    /// * The errors of [`elevation_hour_angle`] for an elevation start.
    pub fn new(
        spec: &ObservationSpec,
        extra_ra_offset: Degree,
        extra_dec_offset: Degree,
    ) -> Result<Self, ScanError> {
        let target_hours = (extra_ra_offset + spec.ra) / DEG_PER_HOUR;

        let start_lst = match spec.start {
            StartBasis::Datetime(epoch) => local_sidereal_time(&epoch, spec.site.longitude),
            StartBasis::HourAngle(h) => h + target_hours,
            StartBasis::Lst(l) => l,
            StartBasis::Elevation {
                elevation,
                moving_up,
            } => {
                let ha = elevation_hour_angle(
                    elevation,
                    spec.dec + extra_dec_offset,
                    spec.site.latitude,
                    moving_up,
                )?;
                ha / DEG_PER_HOUR + target_hours
            }
        };

        Ok(SiderealClock {
            start_lst: start_lst.rem_euclid(24.0),
        })
    }

    /// Clock starting at a known sidereal time.
    pub fn from_start_lst(start_lst: Hour) -> Self {
        SiderealClock {
            start_lst: start_lst.rem_euclid(24.0),
        }
    }

    pub fn start_lst(&self) -> Hour {
        self.start_lst
    }

    /// Sidereal time `time_offset` seconds after the first sample.
    pub fn lst_at(&self, time_offset: Second) -> Hour {
        self.start_lst + time_offset / SECONDS_PER_HOUR * SIDEREAL_RATE
    }

    pub fn lst_series(&self, time_offset: &[Second]) -> Vec<Hour> {
        time_offset.iter().map(|t| self.lst_at(*t)).collect()
    }
}

#[cfg(test)]
mod sidereal_test {
    use super::*;
    use crate::observation::Site;
    use approx::assert_relative_eq;
    use hifitime::TimeScale;

    #[test]
    fn test_gmst() {
        // 2000-01-01 12:00 UT1: 18h41m50.548s
        let expected = (18.0 + 41.0 / 60.0 + 50.54841 / 3600.0) * 15.0 * RADEG;
        assert_relative_eq!(gmst(T2000), expected, epsilon = 1e-9);
        assert!((0.0..DPI).contains(&gmst(60000.123)));
    }

    #[test]
    fn test_local_sidereal_time_longitude() {
        let epoch = Epoch::from_gregorian(2000, 1, 1, 12, 0, 0, 0, TimeScale::UTC);
        let greenwich = local_sidereal_time(&epoch, 0.0);
        let east = local_sidereal_time(&epoch, 30.0);
        assert_relative_eq!((east - greenwich).rem_euclid(24.0), 2.0, epsilon = 1e-9);
        assert!((0.0..24.0).contains(&local_sidereal_time(&epoch, -67.74)));
    }

    #[test]
    fn test_sidereal_rate() {
        let clock = SiderealClock::from_start_lst(5.0);
        let lst = clock.lst_series(&[0.0, 3600.0, 86400.0]);
        assert_eq!(lst[0], 5.0);
        assert_relative_eq!(lst[1], 5.0 + SIDEREAL_RATE, epsilon = 1e-12);
        assert_relative_eq!(lst[2], 5.0 + 24.0 * SIDEREAL_RATE, epsilon = 1e-9);
    }

    #[test]
    fn test_hour_angle_basis() {
        let spec = ObservationSpec::builder()
            .ra(30.0)
            .dec(-10.0)
            .start_hrang(1.5)
            .build()
            .unwrap();
        let clock = SiderealClock::new(&spec, 15.0, 2.0).unwrap();
        assert_relative_eq!(clock.start_lst(), 1.5 + 3.0, epsilon = 1e-12);

        let spec = ObservationSpec::builder()
            .ra(30.0)
            .dec(-10.0)
            .start_lst(25.0)
            .build()
            .unwrap();
        assert_relative_eq!(
            SiderealClock::new(&spec, 0.0, 0.0).unwrap().start_lst(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_elevation_branches() {
        let lat = Site::fyst().latitude;
        let rising = elevation_hour_angle(45.0, -23.0, lat, true).unwrap();
        let setting = elevation_hour_angle(45.0, -23.0, lat, false).unwrap();
        assert!(rising < 0.0);
        assert_relative_eq!(rising, -setting, epsilon = 1e-12);

        // both candidates reproduce the requested elevation
        for ha in [rising, setting] {
            let alt = altitude(-23.0 * RADEG, lat * RADEG, ha * RADEG) / RADEG;
            assert_relative_eq!(alt, 45.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_unreachable_elevation() {
        let lat = Site::fyst().latitude;
        let err = elevation_hour_angle(45.0, 60.0, lat, true).unwrap_err();
        assert_eq!(
            err,
            ScanError::UnreachableElevation {
                elevation: 45.0,
                dec: 60.0,
                latitude: lat
            }
        );
    }

    #[test]
    fn test_transit_is_ambiguous() {
        let err = elevation_hour_angle(90.0, 0.0, 0.0, true).unwrap_err();
        assert_eq!(
            err,
            ScanError::AmbiguousHourAngleBranch {
                matching: 0,
                moving_up: true
            }
        );
    }
}
