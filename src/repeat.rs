//! # Repeat tiling
//!
//! Repeatable patterns may be concatenated with themselves to cover a longer observation. The
//! number of copies is given either directly or through a maximum scan duration, never both:
//!
//! * [`RepeatControl::NumRepeat`]: `n ≥ 1` copies.
//! * [`RepeatControl::MaxScanDuration`]: `n = ⌊max_scan_duration / one_period⌋` copies, with
//!   `one_period = last time_offset + sample_interval`; `n < 1` is an error.
//!
//! Copy `k` is shifted in time by `k · one_period`, so the tiled time column keeps a constant step
//! across every repeat boundary. Stored kinematics are tiled together with the positions.
use log::debug;

use crate::constants::Second;
use crate::patterns::gt0;
use crate::scan_errors::ScanError;
use crate::trajectory::Trajectory;

/// How many times a generated period is laid end to end.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RepeatControl {
    #[default]
    Single,
    NumRepeat(u32),
    MaxScanDuration(Second),
}

impl RepeatControl {
    pub fn builder() -> RepeatControlBuilder {
        RepeatControlBuilder::default()
    }

    /// Number of copies for a period lasting `one_period` seconds.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::InvalidRepeat`] for `NumRepeat(0)`.
    /// * [`ScanError::InvalidParameter`] for a non-positive maximum duration.
    /// * [`ScanError::ScanDurationTooShort`] if the maximum duration does not fit one period.
    pub fn num_repeat(&self, one_period: Second) -> Result<u32, ScanError> {
        match *self {
            RepeatControl::Single => Ok(1),
            RepeatControl::NumRepeat(0) => Err(ScanError::InvalidRepeat(0)),
            RepeatControl::NumRepeat(n) => Ok(n),
            RepeatControl::MaxScanDuration(d) => {
                if !gt0(d) {
                    return Err(ScanError::InvalidParameter(format!(
                        "max_scan_duration must be positive, got {d}"
                    )));
                }
                let n = (d / one_period).floor();
                if n < 1.0 {
                    return Err(ScanError::ScanDurationTooShort {
                        max_scan_duration: d,
                        period: one_period,
                    });
                }
                Ok(n as u32)
            }
        }
    }
}

/// Builder rejecting conflicting repeat requests.
#[derive(Debug, Clone, Default)]
pub struct RepeatControlBuilder {
    num_repeat: Option<u32>,
    max_scan_duration: Option<Second>,
}

impl RepeatControlBuilder {
    pub fn num_repeat(mut self, v: u32) -> Self {
        self.num_repeat = Some(v);
        self
    }

    pub fn max_scan_duration(mut self, v: Second) -> Self {
        self.max_scan_duration = Some(v);
        self
    }

    /// Finalize the builder.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::ConflictingRepeat`] if both fields were set.
    /// * [`ScanError::InvalidRepeat`] for `num_repeat = 0`.
    /// * [`ScanError::InvalidParameter`] for a non-positive `max_scan_duration`.
    pub fn build(self) -> Result<RepeatControl, ScanError> {
        match (self.num_repeat, self.max_scan_duration) {
            (Some(_), Some(_)) => Err(ScanError::ConflictingRepeat),
            (Some(0), None) => Err(ScanError::InvalidRepeat(0)),
            (Some(n), None) => Ok(RepeatControl::NumRepeat(n)),
            (None, Some(d)) if !gt0(d) => Err(ScanError::InvalidParameter(format!(
                "max_scan_duration must be positive, got {d}"
            ))),
            (None, Some(d)) => Ok(RepeatControl::MaxScanDuration(d)),
            (None, None) => Ok(RepeatControl::Single),
        }
    }
}

/// Lay `period` end to end according to `control`.
///
/// Arguments
/// -----------------
/// * `period`: the generated trajectory.
/// * `control`: the repeat request.
/// * `repeatable`: whether the pattern family accepts repeats.
///
/// Return
/// ----------
/// * The tiled trajectory, with `num_repeat` multiplied by the number of copies.
///
/// Errors
/// ----------
/// * [`ScanError::NotRepeatable`] for any repeat request on a non-repeatable pattern.
/// * The errors of [`RepeatControl::num_repeat`].
pub fn tile(
    period: &Trajectory,
    control: RepeatControl,
    repeatable: bool,
) -> Result<Trajectory, ScanError> {
    if control == RepeatControl::Single {
        return Ok(period.clone());
    }
    if !repeatable {
        return Err(ScanError::NotRepeatable);
    }

    let one_period = period.scan_duration();
    let n = control.num_repeat(one_period)?;
    if n == 1 {
        return Ok(period.clone());
    }
    let copies = n as usize;

    let time_offset: Vec<Second> = (0..copies)
        .flat_map(|k| {
            let shift = one_period * k as f64;
            period.time_offset().iter().map(move |t| t + shift)
        })
        .collect();

    debug!(
        "Tiling {} samples {} times ({:.3} s per period)",
        period.len(),
        copies,
        one_period
    );

    Ok(Trajectory::tiled_parts(
        time_offset,
        period.x_offset().repeat(copies),
        period.y_offset().repeat(copies),
        period.sample_interval(),
        period.num_repeat() * n,
        period.stored().tiled(copies),
    ))
}

#[cfg(test)]
mod repeat_test {
    use super::*;
    use crate::kinematics::Kinematic;
    use crate::patterns::pong::PongParams;
    use crate::trajectory::Axis;
    use approx::assert_relative_eq;
    use itertools::Itertools;

    fn small_pong() -> Trajectory {
        PongParams::builder()
            .num_term(3)
            .width(0.5)
            .height(0.5)
            .spacing(0.1)
            .velocity(1.0)
            .sample_interval(0.01)
            .build()
            .unwrap()
            .generate()
            .unwrap()
    }

    #[test]
    fn test_num_repeat_tiling() {
        let period = small_pong();
        let tiled = tile(&period, RepeatControl::NumRepeat(3), true).unwrap();
        assert_eq!(tiled.len(), 3 * period.len());
        assert_eq!(tiled.num_repeat(), 3);

        for (a, b) in tiled.time_offset().iter().tuple_windows() {
            assert!(b > a);
            assert_relative_eq!(b - a, 0.01, epsilon = 1e-9);
        }
        assert_eq!(&tiled.x_offset()[period.len()..2 * period.len()], period.x_offset());
        assert_eq!(
            tiled.kinematic(Kinematic::Velocity, Axis::Y).len(),
            tiled.len()
        );
        assert_eq!(tiled.first_period(), period);
    }

    #[test]
    fn test_max_scan_duration() {
        let period = small_pong();
        let one = period.scan_duration();
        let tiled = tile(&period, RepeatControl::MaxScanDuration(2.5 * one), true).unwrap();
        assert_eq!(tiled.num_repeat(), 2);

        let err = tile(&period, RepeatControl::MaxScanDuration(0.5 * one), true).unwrap_err();
        assert_eq!(
            err,
            ScanError::ScanDurationTooShort {
                max_scan_duration: 0.5 * one,
                period: one
            }
        );
    }

    #[test]
    fn test_invalid_requests() {
        let period = small_pong();
        assert_eq!(
            tile(&period, RepeatControl::NumRepeat(0), true).unwrap_err(),
            ScanError::InvalidRepeat(0)
        );
        assert_eq!(
            tile(&period, RepeatControl::NumRepeat(2), false).unwrap_err(),
            ScanError::NotRepeatable
        );
        assert_eq!(
            tile(&period, RepeatControl::Single, false).unwrap(),
            period
        );
    }

    #[test]
    fn test_builder() {
        assert_eq!(
            RepeatControl::builder().build().unwrap(),
            RepeatControl::Single
        );
        assert_eq!(
            RepeatControl::builder().num_repeat(4).build().unwrap(),
            RepeatControl::NumRepeat(4)
        );
        assert_eq!(
            RepeatControl::builder()
                .num_repeat(2)
                .max_scan_duration(60.0)
                .build()
                .unwrap_err(),
            ScanError::ConflictingRepeat
        );
        assert!(RepeatControl::builder()
            .max_scan_duration(f64::NAN)
            .build()
            .is_err());
    }
}
