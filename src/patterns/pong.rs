//! # Curvy Pong pattern
//!
//! A Pong scan bounces inside a `width × height` box along lines at 45° to the box edges. The
//! "curvy" variant replaces the triangle wave of each axis by the first `num_term` odd terms of its
//! Fourier series, which rounds off the turnarounds at the box edges.
//!
//! ## Vertex counts
//!
//! The number of reflection points along each side is chosen so that the path covers the whole
//! lattice before repeating:
//!
//! 1. `vert_spacing = √2 · spacing`, `x_numvert = ⌈width / vert_spacing⌉`,
//!    `y_numvert = ⌈height / vert_spacing⌉`.
//! 2. If both counts have the same parity, the smaller one is incremented (y on ties).
//! 3. The larger count is increased by 2 until both counts are coprime.
//!
//! The result always has opposite parities and `gcd = 1`.
//!
//! ## Axis motion
//!
//! ```text
//! pos(t) = a · Σ_{n = 1, 3, …, 2·num_term − 1} (−1)^((n−1)/2) / n² · sin(b·n·t)
//! a = 8·amp / π²        b = 2π / peri        amp = numvert · vert_spacing / 2
//! ```
//!
//! Velocity, acceleration and jerk are the term-wise derivatives of the same series and are stored
//! on the generated [`Trajectory`]. Everything is finally rotated by the box position angle.
//!
//! ## See also
//! * [`DaisyParams`](crate::patterns::daisy::DaisyParams) – the other pattern family.
//! * [`tile`](crate::repeat::tile) – repetition of the generated period.
use log::debug;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

use crate::constants::{Degree, Second, DEFAULT_SAMPLE_INTERVAL, RADEG};
use crate::patterns::gt0;
use crate::scan_errors::ScanError;
use crate::trajectory::{StoredKinematics, Trajectory};

/// Number of reflection points along each side of the Pong box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexCounts {
    pub x_numvert: u64,
    pub y_numvert: u64,
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Choose coprime vertex counts of opposite parity for a box and line spacing.
///
/// Arguments
/// -----------------
/// * `width`, `height`: size of the box, in degrees.
/// * `spacing`: distance between adjacent parallel scan lines, in degrees.
///
/// Return
/// ----------
/// * The vertex counts along x and y.
///
/// Remarks
/// -------------
/// * The caller is expected to pass strictly positive, finite values; [`PongParams::validate`]
///   guarantees this for generated patterns.
pub fn vertex_counts(width: Degree, height: Degree, spacing: Degree) -> VertexCounts {
    let vert_spacing = SQRT_2 * spacing;
    let mut x_numvert = (width / vert_spacing).ceil() as u64;
    let mut y_numvert = (height / vert_spacing).ceil() as u64;

    if x_numvert % 2 == y_numvert % 2 {
        if x_numvert >= y_numvert {
            y_numvert += 1;
        } else {
            x_numvert += 1;
        }
    }

    // adding 2 keeps the parity of the larger count
    while gcd(x_numvert, y_numvert) != 1 {
        if x_numvert > y_numvert {
            x_numvert += 2;
        } else {
            y_numvert += 2;
        }
    }

    VertexCounts {
        x_numvert,
        y_numvert,
    }
}

/// Truncated Fourier series of a triangle wave and its first three derivatives.
///
/// Arguments
/// -----------------
/// * `num_term`: number of odd harmonics kept.
/// * `amp`: amplitude of the triangle wave, in degrees.
/// * `t`: time, in seconds.
/// * `peri`: period of the triangle wave, in seconds.
///
/// Return
/// ----------
/// * `[position, velocity, acceleration, jerk]` at `t`.
pub fn fourier_expansion(num_term: u32, amp: Degree, t: Second, peri: Second) -> [f64; 4] {
    let a = 8.0 * amp / PI.powi(2);
    let b = 2.0 * PI / peri;

    let mut out = [0.0; 4];
    for k in 0..num_term {
        let n = (2 * k + 1) as f64;
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let c = sign / n.powi(2);
        let w = b * n;
        let (s, co) = (w * t).sin_cos();

        out[0] += c * s;
        out[1] += c * w * co;
        out[2] -= c * w.powi(2) * s;
        out[3] -= c * w.powi(3) * co;
    }
    out.map(|v| v * a)
}

/// Parameters of a curvy Pong scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PongParams {
    /// Number of terms in the triangle wave expansion.
    pub num_term: u32,
    pub width: Degree,
    pub height: Degree,
    /// Distance between adjacent parallel scan lines.
    pub spacing: Degree,
    /// Target speed away from the turnarounds, in deg/s.
    pub velocity: f64,
    /// Position angle of the box in the offset frame.
    #[serde(default)]
    pub angle: Degree,
    #[serde(default = "default_sample_interval")]
    pub sample_interval: Second,
}

pub(crate) fn default_sample_interval() -> Second {
    DEFAULT_SAMPLE_INTERVAL
}

impl PongParams {
    pub fn builder() -> PongParamsBuilder {
        PongParamsBuilder::new()
    }

    /// Check every field; used by the builder and after reading a parameter record.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.num_term == 0 {
            return Err(ScanError::InvalidParameter(
                "num_term must be positive".into(),
            ));
        }
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("spacing", self.spacing),
            ("velocity", self.velocity),
            ("sample_interval", self.sample_interval),
        ] {
            if !gt0(value) || !value.is_finite() {
                return Err(ScanError::InvalidParameter(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !self.angle.is_finite() {
            return Err(ScanError::InvalidParameter(format!(
                "angle must be finite, got {}",
                self.angle
            )));
        }
        Ok(())
    }

    pub fn vertex_counts(&self) -> VertexCounts {
        vertex_counts(self.width, self.height, self.spacing)
    }

    /// Duration of one full period of the pattern, in seconds.
    pub fn period(&self) -> Second {
        let VertexCounts {
            x_numvert,
            y_numvert,
        } = self.vertex_counts();
        let vert_spacing = SQRT_2 * self.spacing;
        (x_numvert * y_numvert) as f64 * vert_spacing * 2.0 / self.velocity
    }

    /// Generate one period of the pattern.
    ///
    /// Return
    /// ----------
    /// * A [`Trajectory`] of `⌈period / sample_interval⌉` samples at `t = i · sample_interval`,
    ///   carrying the closed-form velocity, acceleration and jerk.
    pub fn generate(&self) -> Result<Trajectory, ScanError> {
        self.validate()?;

        let counts = self.vertex_counts();
        let vert_spacing = SQRT_2 * self.spacing;
        let vavg = self.velocity;
        let peri_x = counts.x_numvert as f64 * vert_spacing * 2.0 / vavg;
        let peri_y = counts.y_numvert as f64 * vert_spacing * 2.0 / vavg;
        let period = self.period();
        let amp_x = counts.x_numvert as f64 * vert_spacing / 2.0;
        let amp_y = counts.y_numvert as f64 * vert_spacing / 2.0;

        let n = (period / self.sample_interval).ceil() as usize;
        let rot = Rotation2::new(self.angle * RADEG);

        let mut time_offset = Vec::with_capacity(n);
        let mut columns: [(Vec<f64>, Vec<f64>); 4] = Default::default();
        for (x, y) in columns.iter_mut() {
            x.reserve(n);
            y.reserve(n);
        }

        for i in 0..n {
            let t = i as f64 * self.sample_interval;
            let fx = fourier_expansion(self.num_term, amp_x, t, peri_x);
            let fy = fourier_expansion(self.num_term, amp_y, t, peri_y);

            for (order, (x, y)) in columns.iter_mut().enumerate() {
                let v = rot * Vector2::new(fx[order], fy[order]);
                x.push(v.x);
                y.push(v.y);
            }
            time_offset.push(t);
        }

        debug!(
            "Pong pattern: vertices = ({}, {}), period = {:.3} s, {} samples",
            counts.x_numvert, counts.y_numvert, period, n
        );

        let [(x, y), vel, acc, jerk] = columns;
        Trajectory::generated(
            time_offset,
            x,
            y,
            self.sample_interval,
            StoredKinematics {
                velocity: Some(vel),
                acceleration: Some(acc),
                jerk: Some(jerk),
            },
        )
    }
}

/// Builder for [`PongParams`], validated on [`build`](PongParamsBuilder::build).
#[derive(Debug, Clone)]
pub struct PongParamsBuilder {
    params: PongParams,
}

impl Default for PongParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PongParamsBuilder {
    /// Create a builder with unset (zero) sizes, `angle = 0` and the default cadence.
    pub fn new() -> Self {
        Self {
            params: PongParams {
                num_term: 0,
                width: 0.0,
                height: 0.0,
                spacing: 0.0,
                velocity: 0.0,
                angle: 0.0,
                sample_interval: DEFAULT_SAMPLE_INTERVAL,
            },
        }
    }

    pub fn num_term(mut self, v: u32) -> Self {
        self.params.num_term = v;
        self
    }
    pub fn width(mut self, v: Degree) -> Self {
        self.params.width = v;
        self
    }
    pub fn height(mut self, v: Degree) -> Self {
        self.params.height = v;
        self
    }
    pub fn spacing(mut self, v: Degree) -> Self {
        self.params.spacing = v;
        self
    }
    pub fn velocity(mut self, v: f64) -> Self {
        self.params.velocity = v;
        self
    }
    pub fn angle(mut self, v: Degree) -> Self {
        self.params.angle = v;
        self
    }
    pub fn sample_interval(mut self, v: Second) -> Self {
        self.params.sample_interval = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::InvalidParameter`] if `num_term` is zero, or if any size, the velocity or the
    ///   sample interval is not strictly positive (NaN included).
    pub fn build(self) -> Result<PongParams, ScanError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
