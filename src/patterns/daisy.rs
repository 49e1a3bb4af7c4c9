//! # Constant-velocity Daisy pattern
//!
//! The Daisy scan crosses the field centre repeatedly, turning on arcs of radius `Rt` once it has
//! left the inner radius `R0`. The path is obtained by explicit forward integration of the
//! telescope heading, one step per sample.
//!
//! ## Step rule
//!
//! For each of the `N = ⌊T / dt⌋` steps, with heading `v` (unit vector, starts at `(1, 0)`) and
//! position `p` (starts at `(0, y_offset)`):
//!
//! 1. The speed ramps up by `start_acc · dt` and is capped at `velocity`.
//! 2. Inside `R0` the telescope moves straight.
//! 3. Outside `R0`, if the heading points towards the centre closer than the avoidance radius
//!    `Ra` allows (`−p̂·v > √(1 − (Ra/r)²)`), the telescope keeps moving straight.
//! 4. Otherwise it turns along an arc of radius `Rt`, to the side given by the sign of
//!    `−x̂·vy + ŷ·vx`. The arc step uses the third-order Taylor expansion in the step length
//!    `s = speed · dt`, which slowly drifts from a unit heading; this drift is kept as is.
//!
//! When `Ra > r` the clearance term `1 − (Ra/r)²` is negative and the step always curves. At
//! `Ra == r` the threshold is zero, so any inward heading keeps going straight.
//! At `r = 0` the radial direction is undefined and the step is straight, whatever `R0` is.
//!
//! The stored velocity is `speed · v` at the end of each step; acceleration and jerk come from
//! finite differences.
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Second, DEFAULT_SAMPLE_INTERVAL};
use crate::patterns::pong::default_sample_interval;
use crate::patterns::{ge0, gt0};
use crate::scan_errors::ScanError;
use crate::trajectory::{StoredKinematics, Trajectory};

/// Parameters of a constant-velocity Daisy scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaisyParams {
    /// Cruise speed, in deg/s.
    pub velocity: f64,
    /// Speed ramp at startup, in deg/s².
    pub start_acc: f64,
    /// Radius of the straight inner region.
    #[serde(rename = "R0")]
    pub r0: Degree,
    /// Turn radius.
    #[serde(rename = "Rt")]
    pub rt: Degree,
    /// Avoidance radius.
    #[serde(rename = "Ra")]
    pub ra: Degree,
    /// Total integration time.
    #[serde(rename = "T")]
    pub t: Second,
    #[serde(default = "default_sample_interval")]
    pub sample_interval: Second,
    #[serde(default)]
    pub y_offset: Degree,
}

/// Which way the telescope moves during one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Straight,
    Curve,
}

impl DaisyParams {
    pub fn builder() -> DaisyParamsBuilder {
        DaisyParamsBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        let positive = [
            ("velocity", self.velocity),
            ("R0", self.r0),
            ("Rt", self.rt),
            ("T", self.t),
            ("sample_interval", self.sample_interval),
        ];
        for (name, value) in positive {
            if !gt0(value) || !value.is_finite() {
                return Err(ScanError::InvalidParameter(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        for (name, value) in [("start_acc", self.start_acc), ("Ra", self.ra)] {
            if !ge0(value) || !value.is_finite() {
                return Err(ScanError::InvalidParameter(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        if !self.y_offset.is_finite() {
            return Err(ScanError::InvalidParameter(format!(
                "y_offset must be finite, got {}",
                self.y_offset
            )));
        }
        if self.num_steps() == 0 {
            return Err(ScanError::InvalidParameter(format!(
                "T = {} s is shorter than one sample interval ({} s)",
                self.t, self.sample_interval
            )));
        }
        Ok(())
    }

    /// Number of integration steps, `⌊T / sample_interval⌋`.
    pub fn num_steps(&self) -> usize {
        (self.t / self.sample_interval).floor() as usize
    }

    fn step_kind(&self, p: &Vector2<f64>, v: &Vector2<f64>) -> Step {
        let r = p.norm();
        if r == 0.0 || r < self.r0 {
            return Step::Straight;
        }

        let radial = p / r;
        let clearance = 1.0 - (self.ra / r).powi(2);
        if clearance >= 0.0 && -radial.dot(v) > clearance.sqrt() {
            Step::Straight
        } else {
            Step::Curve
        }
    }

    /// Integrate the pattern.
    ///
    /// Return
    /// ----------
    /// * A [`Trajectory`] of `⌊T / sample_interval⌋` samples carrying the step velocity.
    pub fn generate(&self) -> Result<Trajectory, ScanError> {
        self.validate()?;

        let n = self.num_steps();
        let dt = self.sample_interval;
        let rt = self.rt;

        let mut v = Vector2::new(1.0, 0.0);
        let mut p = Vector2::new(0.0, self.y_offset);
        let mut speed = 0.0;

        let mut time_offset = Vec::with_capacity(n);
        let (mut x, mut y) = (Vec::with_capacity(n), Vec::with_capacity(n));
        let (mut vel_x, mut vel_y) = (Vec::with_capacity(n), Vec::with_capacity(n));
        let mut curved = 0usize;

        for i in 0..n {
            speed = f64::min(speed + self.start_acc * dt, self.velocity);

            match self.step_kind(&p, &v) {
                Step::Straight => p += v * (speed * dt),
                Step::Curve => {
                    let radial = p / p.norm();
                    let normal = if -radial.x * v.y + radial.y * v.x > 0.0 {
                        Vector2::new(v.y, -v.x)
                    } else {
                        Vector2::new(-v.y, v.x)
                    };

                    let s = speed * dt;
                    p += v * (s - s.powi(3) / rt.powi(2) / 6.0) + normal * (s * s / rt / 2.0);
                    let dv = v * (-s * s / rt.powi(2) / 2.0)
                        + normal * (s / rt + s.powi(3) / rt.powi(3) / 6.0);
                    v += dv;
                    curved += 1;
                }
            }

            time_offset.push(i as f64 * dt);
            x.push(p.x);
            y.push(p.y);
            vel_x.push(speed * v.x);
            vel_y.push(speed * v.y);
        }

        debug!(
            "Daisy pattern: {} steps over {:.3} s, {} curved",
            n,
            n as f64 * dt,
            curved
        );

        Trajectory::generated(
            time_offset,
            x,
            y,
            dt,
            StoredKinematics {
                velocity: Some((vel_x, vel_y)),
                ..Default::default()
            },
        )
    }
}

/// Builder for [`DaisyParams`], validated on [`build`](DaisyParamsBuilder::build).
#[derive(Debug, Clone)]
pub struct DaisyParamsBuilder {
    params: DaisyParams,
}

impl Default for DaisyParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DaisyParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: DaisyParams {
                velocity: 0.0,
                start_acc: 0.0,
                r0: 0.0,
                rt: 0.0,
                ra: 0.0,
                t: 0.0,
                sample_interval: DEFAULT_SAMPLE_INTERVAL,
                y_offset: 0.0,
            },
        }
    }

    pub fn velocity(mut self, v: f64) -> Self {
        self.params.velocity = v;
        self
    }
    pub fn start_acc(mut self, v: f64) -> Self {
        self.params.start_acc = v;
        self
    }
    pub fn r0(mut self, v: Degree) -> Self {
        self.params.r0 = v;
        self
    }
    pub fn rt(mut self, v: Degree) -> Self {
        self.params.rt = v;
        self
    }
    pub fn ra(mut self, v: Degree) -> Self {
        self.params.ra = v;
        self
    }
    pub fn t(mut self, v: Second) -> Self {
        self.params.t = v;
        self
    }
    pub fn sample_interval(mut self, v: Second) -> Self {
        self.params.sample_interval = v;
        self
    }
    pub fn y_offset(mut self, v: Degree) -> Self {
        self.params.y_offset = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::InvalidParameter`] if a positive quantity is not strictly positive,
    ///   `start_acc` or `Ra` is negative, or `T` does not cover a single sample.
    pub fn build(self) -> Result<DaisyParams, ScanError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
