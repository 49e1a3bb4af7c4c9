//! # Observation description
//!
//! An [`ObservationSpec`] ties a sky pattern to the sky and to the clock:
//!
//! * the target position `(ra, dec)` in degrees,
//! * the observing [`Site`],
//! * exactly one [`StartBasis`] fixing the local sidereal time of the first sample.
//!
//! | Basis                        | Record keys                | Meaning                               |
//! |------------------------------|----------------------------|---------------------------------------|
//! | [`StartBasis::Datetime`]     | `start_datetime`           | UTC start of the observation          |
//! | [`StartBasis::HourAngle`]    | `start_hrang`              | hour angle of the target, in hours    |
//! | [`StartBasis::Lst`]          | `start_lst`                | local sidereal time, in hours         |
//! | [`StartBasis::Elevation`]    | `start_el`, `moving_up`    | elevation and direction of motion     |
//!
//! The [`ObservationSpecBuilder`] counts the bases it was given and refuses zero or several.
//! [`ObservationRecord`] is the flat serde form used by [`export`](crate::export).
use std::str::FromStr;
use std::sync::LazyLock;

use hifitime::Epoch;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Hour, Meter};
use crate::scan_errors::ScanError;

static DMS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+(?:\.\d*)?)d(?:(\d+(?:\.\d*)?)m)?(?:(\d+(?:\.\d*)?)s)?$")
        .expect("sexagesimal pattern is a valid regex")
});

/// Observing site on the Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Geodetic latitude, in degrees.
    pub latitude: Degree,
    /// Longitude, in degrees, east positive.
    pub longitude: Degree,
    /// Height above the ellipsoid, in meters.
    pub height: Meter,
}

impl Site {
    pub fn new(latitude: Degree, longitude: Degree, height: Meter) -> Result<Self, ScanError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ScanError::InvalidParameter(format!(
                "latitude must lie in [-90, 90] deg, got {latitude}"
            )));
        }
        if !longitude.is_finite() || !height.is_finite() {
            return Err(ScanError::InvalidParameter(format!(
                "longitude and height must be finite, got {longitude} and {height}"
            )));
        }
        Ok(Site {
            latitude,
            longitude,
            height,
        })
    }

    /// Fred Young Submillimeter Telescope, Cerro Chajnantor.
    pub fn fyst() -> Self {
        Site {
            latitude: -(22.0 + 59.0 / 60.0 + 8.30 / 3600.0),
            longitude: -(67.0 + 44.0 / 60.0 + 25.00 / 3600.0),
            height: 5611.8,
        }
    }

    /// Build a site from sexagesimal strings such as `"-22d59m08.30s"`.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::InvalidSexagesimal`] if a string cannot be parsed.
    /// * The range errors of [`Site::new`].
    pub fn from_dms(latitude: &str, longitude: &str, height: Meter) -> Result<Self, ScanError> {
        Site::new(parse_dms(latitude)?, parse_dms(longitude)?, height)
    }
}

/// Parse an angle written as `[+-]DDdMMmSS.SSs` (minutes and seconds optional) or as decimal
/// degrees.
///
/// Return
/// ----------
/// * The angle in degrees. The sign applies to the whole angle.
pub fn parse_dms(text: &str) -> Result<Degree, ScanError> {
    let trimmed = text.trim();
    if let Ok(deg) = trimmed.parse::<f64>() {
        return Ok(deg);
    }

    let caps = DMS_REGEX
        .captures(trimmed)
        .ok_or_else(|| ScanError::InvalidSexagesimal(text.to_string()))?;

    let field = |i: usize| -> Result<f64, ScanError> {
        caps.get(i)
            .map_or(Ok(0.0), |m| m.as_str().parse::<f64>())
            .map_err(|_| ScanError::InvalidSexagesimal(text.to_string()))
    };
    let (d, m, s) = (field(2)?, field(3)?, field(4)?);
    if m >= 60.0 || s >= 60.0 {
        return Err(ScanError::InvalidSexagesimal(text.to_string()));
    }

    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -1.0,
        _ => 1.0,
    };
    Ok(sign * (d + m / 60.0 + s / 3600.0))
}

/// Convention fixing the local sidereal time at the first sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartBasis {
    /// UTC date and time of the first sample.
    Datetime(Epoch),
    /// Hour angle of the target at the first sample, in hours.
    HourAngle(Hour),
    /// Local sidereal time of the first sample, in hours.
    Lst(Hour),
    /// Elevation of the target at the first sample and whether it is rising.
    Elevation { elevation: Degree, moving_up: bool },
}

/// Where and when a pattern is observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSpec {
    pub ra: Degree,
    pub dec: Degree,
    pub site: Site,
    pub start: StartBasis,
}

impl ObservationSpec {
    pub fn builder() -> ObservationSpecBuilder {
        ObservationSpecBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if !self.ra.is_finite() {
            return Err(ScanError::InvalidParameter(format!(
                "ra must be finite, got {}",
                self.ra
            )));
        }
        if !(-90.0..=90.0).contains(&self.dec) {
            return Err(ScanError::InvalidParameter(format!(
                "dec must lie in [-90, 90] deg, got {}",
                self.dec
            )));
        }
        Site::new(self.site.latitude, self.site.longitude, self.site.height)?;

        match self.start {
            StartBasis::Datetime(_) => Ok(()),
            StartBasis::HourAngle(h) | StartBasis::Lst(h) if !h.is_finite() => Err(
                ScanError::InvalidParameter(format!("start time must be finite, got {h} h")),
            ),
            StartBasis::Elevation { elevation, .. } if !(-90.0..=90.0).contains(&elevation) => {
                Err(ScanError::InvalidParameter(format!(
                    "start_el must lie in [-90, 90] deg, got {elevation}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Builder for [`ObservationSpec`].
///
/// The site defaults to [`Site::fyst`] and `moving_up` defaults to `true` when `start_el` is set.
#[derive(Debug, Clone, Default)]
pub struct ObservationSpecBuilder {
    ra: Option<Degree>,
    dec: Option<Degree>,
    site: Option<Site>,
    start_datetime: Option<Epoch>,
    start_hrang: Option<Hour>,
    start_lst: Option<Hour>,
    start_el: Option<Degree>,
    moving_up: Option<bool>,
}

impl ObservationSpecBuilder {
    pub fn ra(mut self, v: Degree) -> Self {
        self.ra = Some(v);
        self
    }
    pub fn dec(mut self, v: Degree) -> Self {
        self.dec = Some(v);
        self
    }
    pub fn site(mut self, v: Site) -> Self {
        self.site = Some(v);
        self
    }
    pub fn start_datetime(mut self, v: Epoch) -> Self {
        self.start_datetime = Some(v);
        self
    }
    pub fn start_hrang(mut self, v: Hour) -> Self {
        self.start_hrang = Some(v);
        self
    }
    pub fn start_lst(mut self, v: Hour) -> Self {
        self.start_lst = Some(v);
        self
    }
    pub fn start_el(mut self, v: Degree) -> Self {
        self.start_el = Some(v);
        self
    }
    pub fn moving_up(mut self, v: bool) -> Self {
        self.moving_up = Some(v);
        self
    }

    /// Finalize the builder.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::MissingObservationField`] if `ra` or `dec` is missing.
    /// * [`ScanError::MissingStartBasis`] if no start basis was given.
    /// * [`ScanError::MultipleStartBases`] if more than one was given.
    /// * [`ScanError::InvalidParameter`] for `moving_up` without `start_el`, or out-of-range values.
    pub fn build(self) -> Result<ObservationSpec, ScanError> {
        let ra = self.ra.ok_or(ScanError::MissingObservationField("ra"))?;
        let dec = self.dec.ok_or(ScanError::MissingObservationField("dec"))?;

        let given = [
            self.start_datetime.is_some(),
            self.start_hrang.is_some(),
            self.start_lst.is_some(),
            self.start_el.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();

        match given {
            0 => return Err(ScanError::MissingStartBasis),
            1 => {}
            n => return Err(ScanError::MultipleStartBases(n)),
        }
        if self.moving_up.is_some() && self.start_el.is_none() {
            return Err(ScanError::InvalidParameter(
                "moving_up can only be given with start_el".into(),
            ));
        }

        let start = if let Some(epoch) = self.start_datetime {
            StartBasis::Datetime(epoch)
        } else if let Some(h) = self.start_hrang {
            StartBasis::HourAngle(h)
        } else if let Some(l) = self.start_lst {
            StartBasis::Lst(l)
        } else {
            StartBasis::Elevation {
                elevation: self.start_el.unwrap_or_default(),
                moving_up: self.moving_up.unwrap_or(true),
            }
        };

        let spec = ObservationSpec {
            ra,
            dec,
            site: self.site.unwrap_or_else(Site::fyst),
            start,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Flat serde form of an [`ObservationSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationRecord {
    pub ra: Degree,
    pub dec: Degree,
    pub lat: Degree,
    pub lon: Degree,
    pub height: Meter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hrang: Option<Hour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_lst: Option<Hour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_el: Option<Degree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving_up: Option<bool>,
}

impl From<&ObservationSpec> for ObservationRecord {
    fn from(spec: &ObservationSpec) -> Self {
        let mut record = ObservationRecord {
            ra: spec.ra,
            dec: spec.dec,
            lat: spec.site.latitude,
            lon: spec.site.longitude,
            height: spec.site.height,
            start_datetime: None,
            start_hrang: None,
            start_lst: None,
            start_el: None,
            moving_up: None,
        };
        match spec.start {
            StartBasis::Datetime(epoch) => record.start_datetime = Some(epoch.to_string()),
            StartBasis::HourAngle(h) => record.start_hrang = Some(h),
            StartBasis::Lst(l) => record.start_lst = Some(l),
            StartBasis::Elevation {
                elevation,
                moving_up,
            } => {
                record.start_el = Some(elevation);
                record.moving_up = Some(moving_up);
            }
        }
        record
    }
}

impl TryFrom<ObservationRecord> for ObservationSpec {
    type Error = ScanError;

    fn try_from(record: ObservationRecord) -> Result<Self, Self::Error> {
        let mut builder = ObservationSpec::builder()
            .ra(record.ra)
            .dec(record.dec)
            .site(Site::new(record.lat, record.lon, record.height)?);

        if let Some(text) = record.start_datetime {
            let epoch = Epoch::from_str(&text).map_err(|e| {
                ScanError::InvalidParameter(format!("start_datetime {text:?}: {e}"))
            })?;
            builder = builder.start_datetime(epoch);
        }
        if let Some(h) = record.start_hrang {
            builder = builder.start_hrang(h);
        }
        if let Some(l) = record.start_lst {
            builder = builder.start_lst(l);
        }
        if let Some(el) = record.start_el {
            builder = builder.start_el(el);
        }
        if let Some(up) = record.moving_up {
            builder = builder.moving_up(up);
        }
        builder.build()
    }
}

#[cfg(test)]
mod observation_test {
    use super::*;
    use approx::assert_relative_eq;
    use hifitime::TimeScale;

    #[test]
    fn test_fyst_from_dms() {
        let site = Site::from_dms("-22d59m08.30s", "-67d44m25.00s", 5611.8).unwrap();
        let fyst = Site::fyst();
        assert_relative_eq!(site.latitude, fyst.latitude, epsilon = 1e-12);
        assert_relative_eq!(site.longitude, fyst.longitude, epsilon = 1e-12);
        assert_relative_eq!(fyst.latitude, -22.985638888888889, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_dms() {
        assert_eq!(parse_dms("12.5").unwrap(), 12.5);
        assert_eq!(parse_dms("10d30m").unwrap(), 10.5);
        assert_eq!(parse_dms("-0d30m").unwrap(), -0.5);
        assert_eq!(parse_dms("+45d").unwrap(), 45.0);
        assert!(matches!(
            parse_dms("12h30m"),
            Err(ScanError::InvalidSexagesimal(_))
        ));
        assert!(parse_dms("10d75m").is_err());
    }

    #[test]
    fn test_site_range() {
        assert!(Site::new(91.0, 0.0, 0.0).is_err());
        assert!(Site::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(Site::new(-90.0, 180.0, 0.0).is_ok());
    }

    #[test]
    fn test_start_basis_count() {
        let base = ObservationSpec::builder().ra(10.0).dec(-20.0);
        assert_eq!(
            base.clone().build().unwrap_err(),
            ScanError::MissingStartBasis
        );
        assert_eq!(
            base.clone()
                .start_lst(3.0)
                .start_hrang(1.0)
                .start_el(40.0)
                .build()
                .unwrap_err(),
            ScanError::MultipleStartBases(3)
        );
        assert_eq!(
            ObservationSpec::builder()
                .dec(1.0)
                .start_lst(2.0)
                .build()
                .unwrap_err(),
            ScanError::MissingObservationField("ra")
        );
        assert!(base.clone().moving_up(false).start_lst(1.0).build().is_err());

        let spec = base.start_el(40.0).build().unwrap();
        assert_eq!(
            spec.start,
            StartBasis::Elevation {
                elevation: 40.0,
                moving_up: true
            }
        );
        assert_eq!(spec.site, Site::fyst());
    }

    #[test]
    fn test_record_conversion() {
        let epoch = Epoch::from_gregorian(2024, 3, 21, 4, 30, 0, 0, TimeScale::UTC);
        let spec = ObservationSpec::builder()
            .ra(83.6)
            .dec(22.0)
            .start_datetime(epoch)
            .build()
            .unwrap();
        let record = ObservationRecord::from(&spec);
        assert!(record.start_datetime.is_some());
        assert!(record.start_hrang.is_none());

        let back = ObservationSpec::try_from(record).unwrap();
        assert_eq!(back.site, spec.site);
        match back.start {
            StartBasis::Datetime(e) => {
                assert_relative_eq!(
                    e.to_mjd_utc_days(),
                    epoch.to_mjd_utc_days(),
                    epsilon = 1e-9
                )
            }
            other => panic!("unexpected basis {other:?}"),
        }
    }
}
