#![allow(dead_code)]

use approx::assert_relative_eq;
use skyscan::observation::{ObservationSpec, Site};
use skyscan::patterns::pong::PongParams;

/// The reference Pong box: 2° × 1.5°, 0.1° spacing, 0.5 deg/s.
pub fn reference_pong(sample_interval: f64) -> PongParams {
    PongParams::builder()
        .num_term(5)
        .width(2.0)
        .height(1.5)
        .spacing(0.1)
        .velocity(0.5)
        .sample_interval(sample_interval)
        .build()
        .unwrap()
}

/// Target at `ra = 0`, `dec = −23°`, seen from FYST while rising through 45° elevation.
pub fn fyst_rising_spec() -> ObservationSpec {
    ObservationSpec::builder()
        .ra(0.0)
        .dec(-23.0)
        .site(Site::fyst())
        .start_el(45.0)
        .moving_up(true)
        .build()
        .unwrap()
}

pub fn assert_series_close(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}
