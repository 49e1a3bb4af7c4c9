//! # Scan pattern generators
//!
//! Each pattern family produces **one period** of a tangent-plane [`Trajectory`] from a validated
//! parameter struct:
//!
//! | Family | Parameters                | Repeatable | Stored kinematics            |
//! |--------|---------------------------|------------|------------------------------|
//! | Pong   | [`pong::PongParams`]      | yes        | velocity, acceleration, jerk |
//! | Daisy  | [`daisy::DaisyParams`]    | no         | velocity                     |
//!
//! [`PatternParameters`] is the closed set of families. It is (de)serialized as a flat record tagged
//! by a `pattern` key (`"pong"` or `"daisy"`), see [`export`](crate::export).
//!
//! ## Example
//!
//! ```rust
//! use skyscan::patterns::{pong::PongParams, PatternParameters};
//! use skyscan::repeat::RepeatControl;
//!
//! let pong = PongParams::builder()
//!     .num_term(5)
//!     .width(2.0)
//!     .height(1.5)
//!     .spacing(0.1)
//!     .velocity(0.5)
//!     .sample_interval(0.01)
//!     .build()?;
//!
//! let scan = PatternParameters::Pong(pong).scan(RepeatControl::NumRepeat(2))?;
//! assert_eq!(scan.len(), 2 * 11540);
//! # Ok::<(), skyscan::scan_errors::ScanError>(())
//! ```
use std::cmp::Ordering::{Equal, Greater};

use serde::{Deserialize, Serialize};

use crate::repeat::{tile, RepeatControl};
use crate::scan_errors::ScanError;
use crate::trajectory::Trajectory;

pub mod daisy;
pub mod pong;

use daisy::DaisyParams;
use pong::PongParams;

/// Return true iff x > 0.0 and comparable (i.e., not NaN).
#[inline]
pub(crate) fn gt0(x: f64) -> bool {
    x.partial_cmp(&0.0) == Some(Greater)
}

/// Return true iff x >= 0.0 and comparable (i.e., not NaN).
#[inline]
pub(crate) fn ge0(x: f64) -> bool {
    matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
}

/// Parameters of any supported pattern family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "lowercase")]
pub enum PatternParameters {
    Pong(PongParams),
    Daisy(DaisyParams),
}

impl PatternParameters {
    /// Whether the family may be tiled by [`tile`].
    pub fn is_repeatable(&self) -> bool {
        matches!(self, PatternParameters::Pong(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatternParameters::Pong(_) => "pong",
            PatternParameters::Daisy(_) => "daisy",
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        match self {
            PatternParameters::Pong(p) => p.validate(),
            PatternParameters::Daisy(p) => p.validate(),
        }
    }

    /// Generate a single period.
    pub fn generate(&self) -> Result<Trajectory, ScanError> {
        match self {
            PatternParameters::Pong(p) => p.generate(),
            PatternParameters::Daisy(p) => p.generate(),
        }
    }

    /// Generate a period and tile it according to `repeat`.
    ///
    /// Errors
    /// ----------
    /// * Any generation error.
    /// * [`ScanError::NotRepeatable`] if `repeat` asks for repeats of a Daisy pattern.
    /// * The tiling errors of [`tile`].
    pub fn scan(&self, repeat: RepeatControl) -> Result<Trajectory, ScanError> {
        if !self.is_repeatable() && repeat != RepeatControl::Single {
            return Err(ScanError::NotRepeatable);
        }
        let period = self.generate()?;
        tile(&period, repeat, self.is_repeatable())
    }
}

impl From<PongParams> for PatternParameters {
    fn from(p: PongParams) -> Self {
        PatternParameters::Pong(p)
    }
}

impl From<DaisyParams> for PatternParameters {
    fn from(p: DaisyParams) -> Self {
        PatternParameters::Daisy(p)
    }
}

#[cfg(test)]
mod patterns_test {
    use super::*;

    #[test]
    fn test_nan_helpers() {
        assert!(gt0(1e-300));
        assert!(!gt0(0.0));
        assert!(!gt0(f64::NAN));
        assert!(ge0(0.0));
        assert!(!ge0(-1e-300));
        assert!(!ge0(f64::NAN));
    }

    #[test]
    fn test_daisy_is_not_repeatable() {
        let daisy = DaisyParams::builder()
            .velocity(0.3)
            .start_acc(0.1)
            .r0(0.4)
            .rt(0.2)
            .ra(0.15)
            .t(2.0)
            .build()
            .unwrap();
        let params = PatternParameters::from(daisy);
        assert!(!params.is_repeatable());
        assert_eq!(params.name(), "daisy");
        assert_eq!(
            params.scan(RepeatControl::NumRepeat(1)).unwrap_err(),
            ScanError::NotRepeatable
        );
        assert_eq!(
            params.scan(RepeatControl::MaxScanDuration(100.0)).unwrap_err(),
            ScanError::NotRepeatable
        );
        assert_eq!(params.scan(RepeatControl::Single).unwrap().len(), 800);
    }
}
