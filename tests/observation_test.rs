mod common;

use approx::assert_relative_eq;
use skyscan::constants::{RADEG, SIDEREAL_RATE};
use skyscan::observation::{ObservationSpec, Site};
use skyscan::scan_errors::ScanError;
use skyscan::sidereal::SiderealClock;
use skyscan::telescope::HorizontalTrajectory;
use skyscan::trajectory::Trajectory;

use crate::common::{assert_series_close, fyst_rising_spec, reference_pong};

/// Pointing straight at the target, one sample per minute.
fn stare(num_samples: usize) -> Trajectory {
    let time: Vec<f64> = (0..num_samples).map(|i| 60.0 * i as f64).collect();
    Trajectory::from_samples(time, vec![0.0; num_samples], vec![0.0; num_samples]).unwrap()
}

fn expected_hour_angle(elevation: f64, dec: f64, latitude: f64) -> f64 {
    let (el, d, lat) = (elevation * RADEG, dec * RADEG, latitude * RADEG);
    ((el.sin() - d.sin() * lat.sin()) / (d.cos() * lat.cos())).acos() / RADEG / 15.0
}

#[test]
fn test_rising_start_at_fyst() {
    let spec = fyst_rising_spec();
    let ha = expected_hour_angle(45.0, -23.0, Site::fyst().latitude);

    let clock = SiderealClock::new(&spec, 0.0, 0.0).unwrap();
    assert_relative_eq!(clock.start_lst(), 24.0 - ha, epsilon = 1e-12);

    let telescope = HorizontalTrajectory::from_sky_pattern(&stare(10), &spec, None).unwrap();
    assert_relative_eq!(telescope.alt()[0], 45.0, epsilon = 1e-9);
    assert_relative_eq!(telescope.hour_angle()[0], -ha, epsilon = 1e-6);
    assert!(telescope.alt().windows(2).all(|w| w[1] > w[0]));

    // the hour angle follows the sidereal rate
    let step = telescope.hour_angle()[1] - telescope.hour_angle()[0];
    assert_relative_eq!(step, 60.0 / 3600.0 * SIDEREAL_RATE, epsilon = 1e-6);
}

#[test]
fn test_setting_start_at_fyst() {
    let spec = ObservationSpec::builder()
        .ra(0.0)
        .dec(-23.0)
        .start_el(45.0)
        .moving_up(false)
        .build()
        .unwrap();
    let ha = expected_hour_angle(45.0, -23.0, Site::fyst().latitude);

    let telescope = HorizontalTrajectory::from_sky_pattern(&stare(10), &spec, None).unwrap();
    assert_relative_eq!(telescope.hour_angle()[0], ha, epsilon = 1e-6);
    assert!(telescope.alt().windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_unreachable_elevation() {
    // highest altitude at FYST for dec = 60 is about 7 deg
    let spec = ObservationSpec::builder()
        .ra(10.0)
        .dec(60.0)
        .start_el(45.0)
        .build()
        .unwrap();
    let res = HorizontalTrajectory::from_sky_pattern(&stare(3), &spec, None);
    assert!(matches!(
        res,
        Err(ScanError::UnreachableElevation { elevation, .. }) if elevation == 45.0
    ));
}

#[test]
fn test_sky_pattern_round_trip() {
    let sky = reference_pong(0.05).generate().unwrap();
    let spec = ObservationSpec::builder()
        .ra(150.0)
        .dec(2.2)
        .start_hrang(-1.0)
        .build()
        .unwrap();

    let telescope = HorizontalTrajectory::from_sky_pattern(&sky, &spec, None).unwrap();
    let back = telescope.sky_pattern().unwrap();
    assert_series_close(back.x_offset(), sky.x_offset(), 1e-6);
    assert_series_close(back.y_offset(), sky.y_offset(), 1e-6);
    assert_relative_eq!(telescope.ra()[0], 150.0, epsilon = 1e-6);
    assert_relative_eq!(telescope.dec()[0], 2.2, epsilon = 1e-9);
}

#[test]
fn test_start_conventions_agree() {
    // the same instant described by an hour angle and by a sidereal time
    let sky = stare(5);
    let by_hrang = ObservationSpec::builder()
        .ra(45.0)
        .dec(-40.0)
        .start_hrang(1.5)
        .build()
        .unwrap();
    let by_lst = ObservationSpec::builder()
        .ra(45.0)
        .dec(-40.0)
        .start_lst(4.5)
        .build()
        .unwrap();

    let a = HorizontalTrajectory::from_sky_pattern(&sky, &by_hrang, None).unwrap();
    let b = HorizontalTrajectory::from_sky_pattern(&sky, &by_lst, None).unwrap();
    assert_series_close(a.az(), b.az(), 1e-12);
    assert_series_close(a.alt(), b.alt(), 1e-12);
}
