//! # Finite-difference kinematics
//!
//! Velocity, acceleration and jerk of a uniformly sampled series, obtained by repeated
//! application of [`central_diff`].
//!
//! ## Scheme
//!
//! ```text
//! d[0]   = (a[1]   - a[0])   / h
//! d[i]   = (a[i+1] - a[i-1]) / (2h)      0 < i < n-1
//! d[n-1] = (a[n-1] - a[n-2]) / h
//! ```
//!
//! The scheme assumes a constant step `h`; [`Trajectory`](crate::trajectory::Trajectory) and
//! [`HorizontalTrajectory`](crate::telescope::HorizontalTrajectory) enforce this at construction
//! so nothing here re-checks it.

/// Derivative order exposed by the trajectory accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kinematic {
    Velocity,
    Acceleration,
    Jerk,
}

impl Kinematic {
    /// Number of differentiations separating this quantity from the position.
    pub fn order(&self) -> usize {
        match self {
            Kinematic::Velocity => 1,
            Kinematic::Acceleration => 2,
            Kinematic::Jerk => 3,
        }
    }

    /// The quantity this one is the derivative of, `None` for velocity.
    pub fn lower(&self) -> Option<Kinematic> {
        match self {
            Kinematic::Velocity => None,
            Kinematic::Acceleration => Some(Kinematic::Velocity),
            Kinematic::Jerk => Some(Kinematic::Acceleration),
        }
    }

    /// Column suffix used in exported tables (`vel`, `acc`, `jerk`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Kinematic::Velocity => "vel",
            Kinematic::Acceleration => "acc",
            Kinematic::Jerk => "jerk",
        }
    }
}

/// Central finite difference of a uniformly sampled series.
///
/// Arguments
/// -----------------
/// * `a`: the sampled values.
/// * `h`: the constant sample interval.
///
/// Return
/// ----------
/// * A series of the same length as `a`. Interior samples use the central difference, the first
///   and last samples the one-sided difference. A single sample has a zero derivative and an empty
///   series stays empty.
pub fn central_diff(a: &[f64], h: f64) -> Vec<f64> {
    let n = a.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut d = Vec::with_capacity(n);
            d.push((a[1] - a[0]) / h);
            d.extend(a.windows(3).map(|w| (w[2] - w[0]) / (2.0 * h)));
            d.push((a[n - 1] - a[n - 2]) / h);
            d
        }
    }
}

/// Differentiate `a` `order` times with [`central_diff`].
pub fn differentiate(a: &[f64], h: f64, order: usize) -> Vec<f64> {
    let mut out = a.to_vec();
    for _ in 0..order {
        out = central_diff(&out, h);
    }
    out
}

/// Euclidean norm of two component series.
pub(crate) fn magnitude(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x.hypot(*y)).collect()
}
