//! Observe a Pong scan from FYST and write the sky and horizontal tables.
//!
//! ```text
//! cargo run --example pong_at_fyst -- <output directory>
//! ```
use std::path::PathBuf;

use skyscan::export::{
    write_horizontal_csv_file, write_pattern_json, write_sky_csv_file, HorizontalTableOptions,
    SkyTableOptions,
};
use skyscan::instrument::{InstrumentLayout, InstrumentPlacement, ModuleLocator};
use skyscan::kinematics::Kinematic;
use skyscan::observation::ObservationSpec;
use skyscan::patterns::pong::PongParams;
use skyscan::patterns::PatternParameters;
use skyscan::repeat::RepeatControl;
use skyscan::scan_errors::ScanError;
use skyscan::telescope::HorizontalTrajectory;

fn main() -> Result<(), ScanError> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    let pattern = PatternParameters::Pong(
        PongParams::builder()
            .num_term(5)
            .width(2.0)
            .height(2.0)
            .spacing(0.1)
            .velocity(1.0 / 3.0)
            .angle(15.0)
            .build()?,
    );
    let repeat = RepeatControl::builder().max_scan_duration(1200.0).build()?;
    let sky = pattern.scan(repeat)?;

    let spec = ObservationSpec::builder()
        .ra(0.0)
        .dec(-23.0)
        .start_el(45.0)
        .moving_up(true)
        .build()?;

    // the pattern is traced by the i1 optics tube of PrimeCam
    let camera = InstrumentLayout::prime_cam(InstrumentPlacement::default());
    let module = camera.true_location("i1")?;
    let telescope = HorizontalTrajectory::from_sky_pattern(&sky, &spec, Some(module))?;

    let max_speed = telescope
        .kinematic_magnitude(Kinematic::Velocity)
        .into_iter()
        .fold(0.0, f64::max);
    println!(
        "{} samples over {:.1} s ({} periods), max boresight speed {:.3} deg/s",
        sky.len(),
        sky.scan_duration(),
        sky.num_repeat(),
        max_speed
    );

    write_pattern_json(
        std::fs::File::create(out_dir.join("pong.json"))?,
        &pattern,
        repeat,
    )?;
    write_sky_csv_file(
        out_dir.join("pong_sky.csv"),
        &sky,
        SkyTableOptions {
            include_kinematics: true,
            include_repeats: false,
        },
    )?;
    write_horizontal_csv_file(
        out_dir.join("pong_fyst.csv"),
        &telescope,
        HorizontalTableOptions {
            include_kinematics: true,
            include_angles: true,
        },
    )?;
    println!("tables written to {}", out_dir.display());
    Ok(())
}
