//! # Horizontal trajectory
//!
//! [`HorizontalTrajectory`] is the path of the telescope boresight in the horizontal frame:
//! `(time_offset, lst, az, alt)` samples observed from a [`Site`].
//!
//! ## Building from a sky pattern
//!
//! [`HorizontalTrajectory::from_sky_pattern`] runs the whole pipeline:
//!
//! 1. [`SiderealClock`] resolves the start convention, using the offsets of the first pattern
//!    sample, and produces the LST of every sample.
//! 2. [`project`] converts the offsets around `(ra, dec)` into `(az, alt)`.
//! 3. If the pattern describes a module rather than the boresight,
//!    [`boresight_from_module`] recovers the boresight path.
//! 4. [`normalize_azimuth`] makes the azimuth continuous.
//!
//! ## Derived quantities
//!
//! Declination, hour angle, right ascension, parallactic and rotation angles are recomputed from
//! `(lst, az, alt)` on demand, and so are the derivatives of the path (see
//! [`kinematic`](HorizontalTrajectory::kinematic)). [`sky_pattern`](HorizontalTrajectory::sky_pattern)
//! goes back to tangent-plane offsets relative to the first sample.
use itertools::izip;
use log::debug;

use crate::angle::normalize_azimuth;
use crate::boresight::{boresight_from_module, view_from_boresight};
use crate::constants::{Degree, Hour, Second, DEG_PER_HOUR};
use crate::horizontal::{declination, hour_angle, parallactic_angle, project};
use crate::instrument::{ModuleLocator, ModuleOffset};
use crate::kinematics::{differentiate, magnitude, Kinematic};
use crate::observation::{ObservationSpec, Site};
use crate::scan_errors::ScanError;
use crate::sidereal::SiderealClock;
use crate::trajectory::{sample_interval_of, StoredKinematics, Trajectory};

/// Component of a horizontal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAxis {
    Az,
    Alt,
}

impl HorizontalAxis {
    pub fn prefix(&self) -> &'static str {
        match self {
            HorizontalAxis::Az => "az",
            HorizontalAxis::Alt => "alt",
        }
    }
}

/// Boresight path in the horizontal frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalTrajectory {
    time_offset: Vec<Second>,
    lst: Vec<Hour>,
    az: Vec<Degree>,
    alt: Vec<Degree>,
    sample_interval: Second,
    site: Site,
}

impl HorizontalTrajectory {
    /// Observe a sky pattern.
    ///
    /// Arguments
    /// -----------------
    /// * `sky`: the tangent-plane pattern.
    /// * `spec`: target, site and start convention.
    /// * `module`: offset of the module following `sky`, `None` when the boresight follows it.
    ///
    /// Return
    /// ----------
    /// * The boresight path. Samples for which the boresight altitude cannot be solved are NaN.
    ///
    /// Errors
    /// ----------
    /// * The validation errors of [`ObservationSpec::validate`].
    /// * The start convention errors of [`SiderealClock::new`].
    pub fn from_sky_pattern(
        sky: &Trajectory,
        spec: &ObservationSpec,
        module: Option<ModuleOffset>,
    ) -> Result<Self, ScanError> {
        spec.validate()?;

        let extra_ra = sky.x_offset().first().copied().unwrap_or_default();
        let extra_dec = sky.y_offset().first().copied().unwrap_or_default();
        let clock = SiderealClock::new(spec, extra_ra, extra_dec)?;
        let lst = clock.lst_series(sky.time_offset());

        let (mut az, mut alt) = project(
            &lst,
            sky.x_offset(),
            sky.y_offset(),
            spec.ra,
            spec.dec,
            spec.site.latitude,
        )?;

        if let Some(offset) = module.filter(|m| !m.is_boresight()) {
            debug!(
                "Moving {} samples from module ({}, {}) to the boresight",
                sky.len(),
                offset.distance,
                offset.position_angle
            );
            (az, alt) = boresight_from_module(&az, &alt, &offset);
        }

        Ok(HorizontalTrajectory {
            time_offset: sky.time_offset().to_vec(),
            lst,
            az: normalize_azimuth(&az),
            alt,
            sample_interval: sky.sample_interval(),
            site: spec.site,
        })
    }

    /// Build from recorded horizontal samples.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::MismatchedLengths`] if the columns differ in length.
    /// * The sample interval errors (fewer than two samples, non-uniform sampling).
    pub fn from_samples(
        time_offset: Vec<Second>,
        lst: Vec<Hour>,
        az: Vec<Degree>,
        alt: Vec<Degree>,
        site: Site,
    ) -> Result<Self, ScanError> {
        let n = time_offset.len();
        if lst.len() != n || az.len() != n || alt.len() != n {
            return Err(ScanError::MismatchedLengths(format!(
                "time_offset: {n}, lst: {}, az: {}, alt: {}",
                lst.len(),
                az.len(),
                alt.len()
            )));
        }
        let sample_interval = sample_interval_of(&time_offset)?;
        Ok(HorizontalTrajectory {
            time_offset,
            lst,
            az: normalize_azimuth(&az),
            alt,
            sample_interval,
            site,
        })
    }

    /// Build from recorded horizontal samples without sidereal times.
    ///
    /// The LST column is rebuilt from the start convention of `spec`, taken at the target itself.
    pub fn from_samples_at(
        time_offset: Vec<Second>,
        az: Vec<Degree>,
        alt: Vec<Degree>,
        spec: &ObservationSpec,
    ) -> Result<Self, ScanError> {
        spec.validate()?;
        let lst = SiderealClock::new(spec, 0.0, 0.0)?.lst_series(&time_offset);
        Self::from_samples(time_offset, lst, az, alt, spec.site)
    }

    pub fn len(&self) -> usize {
        self.time_offset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_offset.is_empty()
    }

    pub fn time_offset(&self) -> &[Second] {
        &self.time_offset
    }

    pub fn lst(&self) -> &[Hour] {
        &self.lst
    }

    pub fn az(&self) -> &[Degree] {
        &self.az
    }

    pub fn alt(&self) -> &[Degree] {
        &self.alt
    }

    pub fn coordinate(&self, axis: HorizontalAxis) -> &[Degree] {
        match axis {
            HorizontalAxis::Az => &self.az,
            HorizontalAxis::Alt => &self.alt,
        }
    }

    pub fn sample_interval(&self) -> Second {
        self.sample_interval
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Derivative of azimuth or altitude, by repeated central differences.
    pub fn kinematic(&self, kinematic: Kinematic, axis: HorizontalAxis) -> Vec<f64> {
        differentiate(
            self.coordinate(axis),
            self.sample_interval,
            kinematic.order(),
        )
    }

    /// `hypot` of the azimuth and altitude derivatives.
    pub fn kinematic_magnitude(&self, kinematic: Kinematic) -> Vec<f64> {
        magnitude(
            &self.kinematic(kinematic, HorizontalAxis::Az),
            &self.kinematic(kinematic, HorizontalAxis::Alt),
        )
    }

    /// Declination of each sample, in degrees.
    pub fn dec(&self) -> Vec<Degree> {
        let lat = self.site.latitude;
        izip!(&self.az, &self.alt)
            .map(|(az, alt)| declination(*az, *alt, lat))
            .collect()
    }

    /// Hour angle of each sample, in hours within `[-12, 12]`.
    pub fn hour_angle(&self) -> Vec<Hour> {
        let lat = self.site.latitude;
        izip!(&self.az, &self.alt, self.dec())
            .map(|(az, alt, dec)| hour_angle(*az, *alt, dec, lat) / DEG_PER_HOUR)
            .collect()
    }

    /// Right ascension of each sample, in degrees, continuous around the first sample.
    pub fn ra(&self) -> Vec<Degree> {
        let ra: Vec<Degree> = izip!(&self.lst, self.hour_angle())
            .map(|(lst, ha)| (lst - ha) * DEG_PER_HOUR)
            .collect();
        normalize_azimuth(&ra)
    }

    /// Parallactic angle of each sample, in degrees.
    pub fn para_angle(&self) -> Vec<Degree> {
        let lat = self.site.latitude;
        let para: Vec<Degree> = izip!(self.hour_angle(), self.dec())
            .map(|(ha, dec)| parallactic_angle(ha * DEG_PER_HOUR, dec, lat))
            .collect();
        normalize_azimuth(&para)
    }

    /// Field rotation angle `parallactic angle + altitude`, in degrees.
    pub fn rot_angle(&self) -> Vec<Degree> {
        let rot: Vec<Degree> = izip!(self.para_angle(), &self.alt)
            .map(|(para, alt)| para + alt)
            .collect();
        normalize_azimuth(&rot)
    }

    /// Path followed by a module while the boresight follows this path.
    pub fn view_module(&self, offset: ModuleOffset) -> HorizontalTrajectory {
        if offset.is_boresight() {
            return self.clone();
        }
        let (az, alt) = view_from_boresight(&self.az, &self.alt, &offset);
        HorizontalTrajectory {
            time_offset: self.time_offset.clone(),
            lst: self.lst.clone(),
            az: normalize_azimuth(&az),
            alt,
            sample_interval: self.sample_interval,
            site: self.site,
        }
    }

    /// Path followed by a named module of an instrument.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::UnknownModule`] if the locator does not know `name`.
    pub fn view_named_module(
        &self,
        locator: &impl ModuleLocator,
        name: &str,
    ) -> Result<HorizontalTrajectory, ScanError> {
        Ok(self.view_module(locator.true_location(name)?))
    }

    /// Tangent-plane pattern traced on the sky, relative to the first sample.
    ///
    /// Unsolved (NaN) samples stay NaN; the reference is then the first finite sample.
    pub fn sky_pattern(&self) -> Result<Trajectory, ScanError> {
        let ra = self.ra();
        let dec = self.dec();
        let (ra0, dec0) = izip!(&ra, &dec)
            .find(|(r, d)| r.is_finite() && d.is_finite())
            .map_or((0.0, 0.0), |(r, d)| (*r, *d));

        Trajectory::generated(
            self.time_offset.clone(),
            ra.iter().map(|r| r - ra0).collect(),
            dec.iter().map(|d| d - dec0).collect(),
            self.sample_interval,
            StoredKinematics::default(),
        )
    }
}
