//! # Horizontal projection
//!
//! Spherical-trigonometry conversions between the tangent-plane offsets of a sky pattern and the
//! horizontal frame (azimuth from north through east, altitude above the horizon).
//!
//! ## Forward
//!
//! With `δ = dec + y` and `h = 15·lst − (x + ra)`:
//!
//! ```text
//! sin alt = sin δ sin φ + cos δ cos φ cos h
//! cos az  = (sin δ − sin alt sin φ) / (cos alt cos φ)      clipped to [−1, 1]
//! az      = 360° − acos(cos az)   when sin h > 0 (west of the meridian)
//! ```
//!
//! The offsets are added to `(ra, dec)` directly, which is the small-field approximation used by
//! the scan planners.
//!
//! ## Inverse
//!
//! ```text
//! sin δ = sin φ sin alt + cos φ cos alt cos az
//! cos h = (sin alt − sin δ sin φ) / (cos δ cos φ)          clipped to [−1, 1]
//! h     = −acos(cos h)   when sin az > 0 (east of the meridian)
//! ra    = 15·lst − h
//! ```
//!
//! The parallactic angle is `q = atan2(sin h, cos δ tan φ − sin δ cos h)`; the field rotation
//! angle of an alt-az mount is `q + alt`.
//!
//! Both directions are singular at the zenith and at the celestial poles, where azimuth or hour
//! angle is undefined; samples there come out as NaN.
use itertools::izip;

use crate::constants::{Degree, Hour, DEG_PER_HOUR, RADEG};
use crate::scan_errors::ScanError;

/// Horizontal coordinates of a source at hour angle `ha` and declination `dec`.
///
/// Return
/// ----------
/// * `(az, alt)` in degrees, `az ∈ [0, 360]`.
pub fn equatorial_to_horizontal(ha: Degree, dec: Degree, latitude: Degree) -> (Degree, Degree) {
    let (h, d, lat) = (ha * RADEG, dec * RADEG, latitude * RADEG);

    let alt = (d.sin() * lat.sin() + d.cos() * lat.cos() * h.cos()).asin();
    let cos_az = ((d.sin() - alt.sin() * lat.sin()) / (alt.cos() * lat.cos())).clamp(-1.0, 1.0);

    let mut az = cos_az.acos();
    if h.sin() > 0.0 {
        az = std::f64::consts::TAU - az;
    }
    (az / RADEG, alt / RADEG)
}

/// Declination of a horizontal direction.
pub fn declination(az: Degree, alt: Degree, latitude: Degree) -> Degree {
    let (a, h, lat) = (az * RADEG, alt * RADEG, latitude * RADEG);
    (lat.sin() * h.sin() + lat.cos() * h.cos() * a.cos()).asin() / RADEG
}

/// Hour angle of a horizontal direction whose declination is `dec`.
///
/// Return
/// ----------
/// * The hour angle in degrees, in `[-180, 180]`, negative east of the meridian.
pub fn hour_angle(az: Degree, alt: Degree, dec: Degree, latitude: Degree) -> Degree {
    let (a, h, d, lat) = (az * RADEG, alt * RADEG, dec * RADEG, latitude * RADEG);
    let cos_ha = ((h.sin() - d.sin() * lat.sin()) / (d.cos() * lat.cos())).clamp(-1.0, 1.0);
    let ha = cos_ha.acos() / RADEG;
    if a.sin() > 0.0 {
        -ha
    } else {
        ha
    }
}

/// Parallactic angle of a source at hour angle `ha` and declination `dec`.
pub fn parallactic_angle(ha: Degree, dec: Degree, latitude: Degree) -> Degree {
    let (h, d, lat) = (ha * RADEG, dec * RADEG, latitude * RADEG);
    h.sin().atan2(d.cos() * lat.tan() - d.sin() * h.cos()) / RADEG
}

/// Project tangent-plane offsets around `(ra, dec)` into the horizontal frame.
///
/// Arguments
/// -----------------
/// * `lst`: local sidereal time of each sample, in hours.
/// * `x_offset`, `y_offset`: offsets of each sample, in degrees.
/// * `ra`, `dec`: the target, in degrees.
/// * `latitude`: site latitude, in degrees.
///
/// Return
/// ----------
/// * `(az, alt)` series in degrees. The azimuth is not normalized.
///
/// Errors
/// ----------
/// * [`ScanError::MismatchedLengths`] if the three series differ in length.
pub fn project(
    lst: &[Hour],
    x_offset: &[Degree],
    y_offset: &[Degree],
    ra: Degree,
    dec: Degree,
    latitude: Degree,
) -> Result<(Vec<Degree>, Vec<Degree>), ScanError> {
    if lst.len() != x_offset.len() || lst.len() != y_offset.len() {
        return Err(ScanError::MismatchedLengths(format!(
            "lst: {}, x_offset: {}, y_offset: {}",
            lst.len(),
            x_offset.len(),
            y_offset.len()
        )));
    }

    Ok(izip!(lst, x_offset, y_offset)
        .map(|(l, x, y)| {
            let ha = l * DEG_PER_HOUR - (x + ra);
            equatorial_to_horizontal(ha, dec + y, latitude)
        })
        .unzip())
}
