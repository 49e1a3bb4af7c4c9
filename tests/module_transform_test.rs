mod common;

use skyscan::boresight::{boresight_from_module, view_from_boresight};
use skyscan::instrument::{InstrumentLayout, InstrumentPlacement, ModuleLocator, ModuleOffset};
use skyscan::scan_errors::ScanError;
use skyscan::telescope::HorizontalTrajectory;

use crate::common::{assert_series_close, fyst_rising_spec, reference_pong};

#[test]
fn test_module_follows_the_pattern() {
    let sky = reference_pong(0.05).generate().unwrap();
    let spec = fyst_rising_spec();
    let camera = InstrumentLayout::prime_cam(InstrumentPlacement::default());

    let module = camera.true_location("i1").unwrap();
    let boresight = HorizontalTrajectory::from_sky_pattern(&sky, &spec, Some(module)).unwrap();
    let seen = boresight.view_named_module(&camera, "i1").unwrap();
    let direct = HorizontalTrajectory::from_sky_pattern(&sky, &spec, None).unwrap();

    assert!(boresight.alt().iter().all(|alt| alt.is_finite()));
    assert_series_close(seen.alt(), direct.alt(), 1e-6);
    assert_series_close(seen.az(), direct.az(), 1e-6);

    // i1 sits at position angle -90, below the boresight near 45 deg elevation
    let gap = boresight.alt()[0] - direct.alt()[0];
    assert!(gap > 1.0 && gap < 1.78, "gap = {gap}");
}

#[test]
fn test_centre_module_is_identity() {
    let sky = reference_pong(0.05).generate().unwrap();
    let spec = fyst_rising_spec();
    let camera = InstrumentLayout::mod_cam(InstrumentPlacement::default());

    let centre = camera.true_location("c").unwrap();
    let through_module =
        HorizontalTrajectory::from_sky_pattern(&sky, &spec, Some(centre)).unwrap();
    let direct = HorizontalTrajectory::from_sky_pattern(&sky, &spec, None).unwrap();
    assert_eq!(through_module, direct);
    assert_eq!(direct.view_module(ModuleOffset::BORESIGHT), direct);
}

#[test]
fn test_rotated_instrument_round_trip() {
    let placement = InstrumentPlacement {
        offset_x: 0.3,
        offset_y: -0.2,
        rotation: 25.0,
    };
    let mut camera = InstrumentLayout::prime_cam(placement);
    camera.mount("SFH", "i4").unwrap();
    let offset = camera.true_location("SFH").unwrap();

    let az: Vec<f64> = (0..200).map(|i| 350.0 + 0.1 * i as f64).collect();
    let alt: Vec<f64> = (0..200).map(|i| 60.0 - 0.05 * i as f64).collect();
    let (az_m, alt_m) = view_from_boresight(&az, &alt, &offset);
    let (az_b, alt_b) = boresight_from_module(&az_m, &alt_m, &offset);

    assert_series_close(&alt_b, &alt, 1e-6);
    let az_b = skyscan::angle::normalize_azimuth(&az_b);
    assert_series_close(&az_b, &az, 1e-6);

    assert_eq!(
        camera.true_location("PCam280").unwrap_err(),
        ScanError::UnknownModule("PCam280".into())
    );
}
