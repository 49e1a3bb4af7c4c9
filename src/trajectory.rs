//! # Sky-plane trajectory
//!
//! A [`Trajectory`] is the ordered, uniformly sampled series `(time_offset, x_offset, y_offset)`
//! produced by the pattern generators, in a tangent-plane offset frame centred on the target.
//!
//! ## Kinematics
//!
//! Generators may attach **stored kinematics** to the samples:
//!
//! * the Pong generator stores its closed-form velocity, acceleration and jerk,
//! * the Daisy generator stores the velocity of its integration state.
//!
//! Every order that is not stored is derived **on demand** from the next lower order with
//! [`central_diff`](crate::kinematics::central_diff); derived series are never cached.
//!
//! ```text
//! position ──d/dt──► velocity ──d/dt──► acceleration ──d/dt──► jerk
//!             ▲ stored?            ▲ stored?                ▲ stored?
//! ```
//!
//! ## Invariants
//!
//! * All columns have the same length.
//! * Sample intervals are constant: `std(dt) / mean(dt) <= 1%`
//!   ([`MAX_SAMPLE_SPREAD`](crate::constants::MAX_SAMPLE_SPREAD)).
//! * A trajectory is immutable once built; tiling and exports produce new values.
use itertools::Itertools;

use crate::constants::{Degree, Second, MAX_SAMPLE_SPREAD};
use crate::kinematics::{central_diff, magnitude, Kinematic};
use crate::scan_errors::ScanError;

/// Component of a sky-plane offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn prefix(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Pair of component series for one derivative order.
pub(crate) type ComponentPair = (Vec<f64>, Vec<f64>);

/// Derivative series attached by a generator, one optional pair per order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StoredKinematics {
    pub velocity: Option<ComponentPair>,
    pub acceleration: Option<ComponentPair>,
    pub jerk: Option<ComponentPair>,
}

impl StoredKinematics {
    pub(crate) fn get(&self, kinematic: Kinematic) -> Option<&ComponentPair> {
        match kinematic {
            Kinematic::Velocity => self.velocity.as_ref(),
            Kinematic::Acceleration => self.acceleration.as_ref(),
            Kinematic::Jerk => self.jerk.as_ref(),
        }
    }

    fn pairs_mut(&mut self) -> impl Iterator<Item = &mut ComponentPair> {
        [&mut self.velocity, &mut self.acceleration, &mut self.jerk]
            .into_iter()
            .flatten()
    }

    fn lengths_match(&self, n: usize) -> bool {
        [&self.velocity, &self.acceleration, &self.jerk]
            .into_iter()
            .flatten()
            .all(|(x, y)| x.len() == n && y.len() == n)
    }

    /// Keep the first `n` samples of every stored series.
    fn truncated(&self, n: usize) -> Self {
        let mut out = self.clone();
        for (x, y) in out.pairs_mut() {
            x.truncate(n);
            y.truncate(n);
        }
        out
    }

    /// Append `num_repeat - 1` copies of every stored series after itself.
    pub(crate) fn tiled(&self, num_repeat: usize) -> Self {
        let mut out = self.clone();
        for (x, y) in out.pairs_mut() {
            *x = x.repeat(num_repeat);
            *y = y.repeat(num_repeat);
        }
        out
    }
}

/// Infer the sample interval of a time column and enforce its uniformity.
///
/// Arguments
/// -----------------
/// * `time_offset`: the time column, in seconds.
///
/// Return
/// ----------
/// * The mean interval between consecutive samples.
///
/// Errors
/// ----------
/// * [`ScanError::NotEnoughSamples`] with fewer than two samples.
/// * [`ScanError::InvalidParameter`] if the column is not increasing on average.
/// * [`ScanError::NonUniformSampling`] if `std / mean` of the intervals exceeds 1%.
pub(crate) fn sample_interval_of(time_offset: &[Second]) -> Result<Second, ScanError> {
    if time_offset.len() < 2 {
        return Err(ScanError::NotEnoughSamples {
            found: time_offset.len(),
            required: 2,
        });
    }

    let steps: Vec<f64> = time_offset
        .iter()
        .tuple_windows()
        .map(|(a, b)| b - a)
        .collect();
    let n = steps.len() as f64;
    let mean = steps.iter().sum::<f64>() / n;
    if !(mean > 0.0) {
        return Err(ScanError::InvalidParameter(
            "time_offset must be increasing".into(),
        ));
    }

    let var = steps.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let spread = var.sqrt() / mean;
    if !(spread <= MAX_SAMPLE_SPREAD) {
        return Err(ScanError::NonUniformSampling { spread });
    }
    Ok(mean)
}

/// Uniformly sampled tangent-plane path.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    time_offset: Vec<Second>,
    x_offset: Vec<Degree>,
    y_offset: Vec<Degree>,
    sample_interval: Second,
    num_repeat: u32,
    stored: StoredKinematics,
}

impl Trajectory {
    /// Build a trajectory from raw samples, inferring the sample interval.
    ///
    /// Arguments
    /// -----------------
    /// * `time_offset`: time of each sample from the start of the scan, in seconds.
    /// * `x_offset`, `y_offset`: tangent-plane offsets, in degrees.
    ///
    /// Return
    /// ----------
    /// * A single-period trajectory without stored kinematics.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::MismatchedLengths`] if the columns differ in length.
    /// * Any error of the interval check (fewer than two samples, non-uniform sampling).
    pub fn from_samples(
        time_offset: Vec<Second>,
        x_offset: Vec<Degree>,
        y_offset: Vec<Degree>,
    ) -> Result<Self, ScanError> {
        check_lengths(&time_offset, &x_offset, &y_offset)?;
        let sample_interval = sample_interval_of(&time_offset)?;
        Ok(Trajectory {
            time_offset,
            x_offset,
            y_offset,
            sample_interval,
            num_repeat: 1,
            stored: StoredKinematics::default(),
        })
    }

    /// Build a generated period whose sample interval is known by construction.
    pub(crate) fn generated(
        time_offset: Vec<Second>,
        x_offset: Vec<Degree>,
        y_offset: Vec<Degree>,
        sample_interval: Second,
        stored: StoredKinematics,
    ) -> Result<Self, ScanError> {
        check_lengths(&time_offset, &x_offset, &y_offset)?;
        if time_offset.is_empty() {
            return Err(ScanError::NotEnoughSamples {
                found: 0,
                required: 1,
            });
        }
        if !stored.lengths_match(time_offset.len()) {
            return Err(ScanError::MismatchedLengths(
                "stored kinematics do not match the sample count".into(),
            ));
        }
        Ok(Trajectory {
            time_offset,
            x_offset,
            y_offset,
            sample_interval,
            num_repeat: 1,
            stored,
        })
    }

    /// Assemble an already tiled trajectory; the tiler guarantees consistent lengths.
    pub(crate) fn tiled_parts(
        time_offset: Vec<Second>,
        x_offset: Vec<Degree>,
        y_offset: Vec<Degree>,
        sample_interval: Second,
        num_repeat: u32,
        stored: StoredKinematics,
    ) -> Self {
        Trajectory {
            time_offset,
            x_offset,
            y_offset,
            sample_interval,
            num_repeat,
            stored,
        }
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

    pub fn x_offset(&self) -> &[Degree] {
        &self.x_offset
    }

    pub fn y_offset(&self) -> &[Degree] {
        &self.y_offset
    }

    pub fn offset(&self, axis: Axis) -> &[Degree] {
        match axis {
            Axis::X => &self.x_offset,
            Axis::Y => &self.y_offset,
        }
    }

    pub fn sample_interval(&self) -> Second {
        self.sample_interval
    }

    /// Number of periods tiled into this trajectory (1 when never repeated).
    pub fn num_repeat(&self) -> u32 {
        self.num_repeat
    }

    pub(crate) fn stored(&self) -> &StoredKinematics {
        &self.stored
    }

    /// Total duration covered by the samples, `last time_offset + sample_interval`.
    pub fn scan_duration(&self) -> Second {
        self.time_offset.last().copied().unwrap_or(0.0) + self.sample_interval
    }

    /// Derivative of one offset component.
    ///
    /// A stored series is returned as is; otherwise the next lower order (stored or derived) is
    /// differentiated with [`central_diff`].
    pub fn kinematic(&self, kinematic: Kinematic, axis: Axis) -> Vec<f64> {
        if let Some((x, y)) = self.stored.get(kinematic) {
            return match axis {
                Axis::X => x.clone(),
                Axis::Y => y.clone(),
            };
        }

        let base = match kinematic.lower() {
            None => self.offset(axis).to_vec(),
            Some(lower) => self.kinematic(lower, axis),
        };
        central_diff(&base, self.sample_interval)
    }

    /// Norm of the two components of a derivative.
    pub fn kinematic_magnitude(&self, kinematic: Kinematic) -> Vec<f64> {
        magnitude(
            &self.kinematic(kinematic, Axis::X),
            &self.kinematic(kinematic, Axis::Y),
        )
    }

    /// The first period of a tiled trajectory (the trajectory itself when never repeated).
    pub fn first_period(&self) -> Trajectory {
        let n = self.len() / self.num_repeat.max(1) as usize;
        Trajectory {
            time_offset: self.time_offset[..n].to_vec(),
            x_offset: self.x_offset[..n].to_vec(),
            y_offset: self.y_offset[..n].to_vec(),
            sample_interval: self.sample_interval,
            num_repeat: 1,
            stored: self.stored.truncated(n),
        }
    }
}

fn check_lengths(time: &[f64], x: &[f64], y: &[f64]) -> Result<(), ScanError> {
    if time.len() != x.len() || time.len() != y.len() {
        return Err(ScanError::MismatchedLengths(format!(
            "time_offset: {}, x_offset: {}, y_offset: {}",
            time.len(),
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod trajectory_test {
    use super::*;
    use approx::assert_relative_eq;

    fn line(n: usize, dt: f64) -> Trajectory {
        let t: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let x: Vec<f64> = t.iter().map(|t| 0.5 * t).collect();
        let y: Vec<f64> = t.iter().map(|t| -0.25 * t).collect();
        Trajectory::from_samples(t, x, y).unwrap()
    }

    #[test]
    fn test_sample_interval_inferred() {
        let traj = line(10, 0.01);
        assert_relative_eq!(traj.sample_interval(), 0.01, epsilon = 1e-15);
        assert_relative_eq!(traj.scan_duration(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_non_uniform_rejected() {
        let t = vec![0.0, 0.1, 0.2, 0.35, 0.4];
        let res = Trajectory::from_samples(t, vec![0.0; 5], vec![0.0; 5]);
        assert!(matches!(res, Err(ScanError::NonUniformSampling { .. })));
    }

    #[test]
    fn test_small_jitter_accepted() {
        let t = vec![0.0, 0.1, 0.2001, 0.3, 0.4];
        assert!(Trajectory::from_samples(t, vec![0.0; 5], vec![0.0; 5]).is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let res = Trajectory::from_samples(vec![0.0, 1.0], vec![0.0], vec![0.0, 1.0]);
        assert!(matches!(res, Err(ScanError::MismatchedLengths(_))));
    }

    #[test]
    fn test_single_sample_rejected() {
        let res = Trajectory::from_samples(vec![0.0], vec![0.0], vec![0.0]);
        assert_eq!(
            res.unwrap_err(),
            ScanError::NotEnoughSamples {
                found: 1,
                required: 2
            }
        );
    }

    #[test]
    fn test_derived_kinematics() {
        let traj = line(20, 0.05);
        for v in traj.kinematic(Kinematic::Velocity, Axis::X) {
            assert_relative_eq!(v, 0.5, epsilon = 1e-9);
        }
        for v in traj.kinematic(Kinematic::Velocity, Axis::Y) {
            assert_relative_eq!(v, -0.25, epsilon = 1e-9);
        }
        for a in traj.kinematic(Kinematic::Acceleration, Axis::X) {
            assert!(a.abs() < 1e-9);
        }
        let speed = traj.kinematic_magnitude(Kinematic::Velocity);
        assert_relative_eq!(speed[5], (0.5f64.powi(2) + 0.25f64.powi(2)).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_stored_kinematics_take_precedence() {
        let t = vec![0.0, 1.0, 2.0];
        let stored = StoredKinematics {
            velocity: Some((vec![9.0; 3], vec![8.0; 3])),
            ..Default::default()
        };
        let traj = Trajectory::generated(t, vec![0.0; 3], vec![0.0; 3], 1.0, stored).unwrap();
        assert_eq!(traj.kinematic(Kinematic::Velocity, Axis::X), vec![9.0; 3]);
        assert_eq!(traj.kinematic(Kinematic::Velocity, Axis::Y), vec![8.0; 3]);
        // acceleration is derived from the stored velocity, not from the positions
        assert_eq!(traj.kinematic(Kinematic::Acceleration, Axis::X), vec![0.0; 3]);
    }
}
