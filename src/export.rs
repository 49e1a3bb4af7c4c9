//! # Tables and parameter records
//!
//! Scans leave the crate in two forms:
//!
//! * **CSV tables** (through the `csv` crate), one row per sample. The sky table has the columns
//!   `time_offset, x_offset, y_offset`, the horizontal table `time_offset, lst, az, alt`. Both can
//!   carry the kinematics (`<axis>_<vel|acc|jerk>` and the magnitude `<vel|acc|jerk>`), and the
//!   horizontal table can also carry `hour_angle, para_angle, rot_angle, ra, dec`.
//!   Readers only use the leading columns and ignore the others.
//! * **JSON records** (through `serde_json`): a flat object holding the pattern parameters tagged by
//!   `pattern`, plus `num_repeat` or `max_scan_duration`; and a flat object for an
//!   [`ObservationSpec`] (see [`ObservationRecord`]). Records are validated again when read.
//!
//! Writers and readers work on any [`std::io::Write`] / [`std::io::Read`], with `*_file`
//! convenience wrappers taking a path.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::{Degree, Hour, Second};
use crate::kinematics::Kinematic;
use crate::observation::{ObservationRecord, ObservationSpec, Site};
use crate::patterns::PatternParameters;
use crate::repeat::RepeatControl;
use crate::scan_errors::ScanError;
use crate::telescope::{HorizontalAxis, HorizontalTrajectory};
use crate::trajectory::{Axis, Trajectory};

const KINEMATICS: [Kinematic; 3] = [
    Kinematic::Velocity,
    Kinematic::Acceleration,
    Kinematic::Jerk,
];

const NUM_REPEAT_KEY: &str = "num_repeat";
const MAX_SCAN_DURATION_KEY: &str = "max_scan_duration";

/// Columns written with a sky table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyTableOptions {
    /// Add velocity, acceleration and jerk columns.
    pub include_kinematics: bool,
    /// Write every tiled period, not only the first one.
    pub include_repeats: bool,
}

impl Default for SkyTableOptions {
    fn default() -> Self {
        SkyTableOptions {
            include_kinematics: false,
            include_repeats: true,
        }
    }
}

/// Columns written with a horizontal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HorizontalTableOptions {
    /// Add velocity, acceleration and jerk columns.
    pub include_kinematics: bool,
    /// Add hour angle, parallactic angle, rotation angle, right ascension and declination.
    pub include_angles: bool,
}

type Column = (String, Vec<f64>);

fn write_columns<W: Write>(writer: W, columns: &[Column]) -> Result<(), ScanError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns.iter().map(|(name, _)| name.as_str()))?;

    let rows = columns.first().map_or(0, |(_, values)| values.len());
    for i in 0..rows {
        csv_writer.write_record(columns.iter().map(|(_, values)| values[i].to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a sky-plane trajectory as a CSV table.
///
/// Arguments
/// -----------------
/// * `writer`: destination of the table.
/// * `trajectory`: the scan.
/// * `options`: optional columns, and whether the tiled periods after the first one are written.
///
/// Errors
/// ----------
/// * [`ScanError::CsvError`] or [`ScanError::IoError`] if the table cannot be written.
pub fn write_sky_csv<W: Write>(
    writer: W,
    trajectory: &Trajectory,
    options: SkyTableOptions,
) -> Result<(), ScanError> {
    let first_period;
    let trajectory = if options.include_repeats {
        trajectory
    } else {
        first_period = trajectory.first_period();
        &first_period
    };

    let mut columns: Vec<Column> = vec![
        ("time_offset".into(), trajectory.time_offset().to_vec()),
        ("x_offset".into(), trajectory.x_offset().to_vec()),
        ("y_offset".into(), trajectory.y_offset().to_vec()),
    ];
    if options.include_kinematics {
        for kinematic in KINEMATICS {
            for axis in [Axis::X, Axis::Y] {
                columns.push((
                    format!("{}_{}", axis.prefix(), kinematic.suffix()),
                    trajectory.kinematic(kinematic, axis),
                ));
            }
            columns.push((
                kinematic.suffix().to_string(),
                trajectory.kinematic_magnitude(kinematic),
            ));
        }
    }
    write_columns(writer, &columns)
}

/// Write a horizontal trajectory as a CSV table.
///
/// Errors
/// ----------
/// * [`ScanError::CsvError`] or [`ScanError::IoError`] if the table cannot be written.
pub fn write_horizontal_csv<W: Write>(
    writer: W,
    trajectory: &HorizontalTrajectory,
    options: HorizontalTableOptions,
) -> Result<(), ScanError> {
    let mut columns: Vec<Column> = vec![
        ("time_offset".into(), trajectory.time_offset().to_vec()),
        ("lst".into(), trajectory.lst().to_vec()),
        ("az".into(), trajectory.az().to_vec()),
        ("alt".into(), trajectory.alt().to_vec()),
    ];
    if options.include_kinematics {
        for kinematic in KINEMATICS {
            for axis in [HorizontalAxis::Az, HorizontalAxis::Alt] {
                columns.push((
                    format!("{}_{}", axis.prefix(), kinematic.suffix()),
                    trajectory.kinematic(kinematic, axis),
                ));
            }
            columns.push((
                kinematic.suffix().to_string(),
                trajectory.kinematic_magnitude(kinematic),
            ));
        }
    }
    if options.include_angles {
        columns.extend([
            ("hour_angle".into(), trajectory.hour_angle()),
            ("para_angle".into(), trajectory.para_angle()),
            ("rot_angle".into(), trajectory.rot_angle()),
            ("ra".into(), trajectory.ra()),
            ("dec".into(), trajectory.dec()),
        ]);
    }
    write_columns(writer, &columns)
}

#[derive(Debug, Deserialize)]
struct SkyRow {
    time_offset: Second,
    x_offset: Degree,
    y_offset: Degree,
}

#[derive(Debug, Deserialize)]
struct HorizontalRow {
    time_offset: Second,
    lst: Hour,
    az: Degree,
    alt: Degree,
}

/// Read a sky table back into a [`Trajectory`].
///
/// The sample interval is inferred from `time_offset`, so the table must be uniformly sampled.
/// Stored kinematics are not read back: every derivative is recomputed on demand.
pub fn read_sky_csv<R: Read>(reader: R) -> Result<Trajectory, ScanError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let (mut time_offset, mut x_offset, mut y_offset) = (Vec::new(), Vec::new(), Vec::new());
    for row in csv_reader.deserialize::<SkyRow>() {
        let row = row?;
        time_offset.push(row.time_offset);
        x_offset.push(row.x_offset);
        y_offset.push(row.y_offset);
    }
    Trajectory::from_samples(time_offset, x_offset, y_offset)
}

/// Read a horizontal table back into a [`HorizontalTrajectory`] observed from `site`.
pub fn read_horizontal_csv<R: Read>(reader: R, site: Site) -> Result<HorizontalTrajectory, ScanError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut columns: [Vec<f64>; 4] = Default::default();
    for row in csv_reader.deserialize::<HorizontalRow>() {
        let row = row?;
        for (column, value) in columns.iter_mut().zip([row.time_offset, row.lst, row.az, row.alt]) {
            column.push(value);
        }
    }
    let [time_offset, lst, az, alt] = columns;
    HorizontalTrajectory::from_samples(time_offset, lst, az, alt, site)
}

pub fn write_sky_csv_file(
    path: impl AsRef<Path>,
    trajectory: &Trajectory,
    options: SkyTableOptions,
) -> Result<(), ScanError> {
    write_sky_csv(File::create(path)?, trajectory, options)
}

pub fn write_horizontal_csv_file(
    path: impl AsRef<Path>,
    trajectory: &HorizontalTrajectory,
    options: HorizontalTableOptions,
) -> Result<(), ScanError> {
    write_horizontal_csv(File::create(path)?, trajectory, options)
}

pub fn read_sky_csv_file(path: impl AsRef<Path>) -> Result<Trajectory, ScanError> {
    read_sky_csv(File::open(path)?)
}

pub fn read_horizontal_csv_file(
    path: impl AsRef<Path>,
    site: Site,
) -> Result<HorizontalTrajectory, ScanError> {
    read_horizontal_csv(File::open(path)?, site)
}

/// Flat record of a pattern and its repetition.
///
/// Return
/// ----------
/// * The pattern fields, the `pattern` tag, and `num_repeat` or `max_scan_duration` unless
///   `repeat` is [`RepeatControl::Single`].
pub fn pattern_record(
    pattern: &PatternParameters,
    repeat: RepeatControl,
) -> Result<Map<String, Value>, ScanError> {
    let Value::Object(mut record) = serde_json::to_value(pattern)? else {
        return Err(ScanError::InvalidParameter(format!(
            "{} parameters do not serialize to a flat record",
            pattern.name()
        )));
    };
    match repeat {
        RepeatControl::Single => {}
        RepeatControl::NumRepeat(n) => {
            record.insert(NUM_REPEAT_KEY.into(), n.into());
        }
        RepeatControl::MaxScanDuration(d) => {
            record.insert(MAX_SCAN_DURATION_KEY.into(), d.into());
        }
    }
    Ok(record)
}

/// Parse a flat pattern record.
///
/// Errors
/// ----------
/// * [`ScanError::JsonError`] on unknown or missing fields, or an unknown `pattern` tag.
/// * The validation errors of the pattern parameters and of [`RepeatControl::builder`].
/// * [`ScanError::NotRepeatable`] if a repeat is recorded for a Daisy pattern.
pub fn pattern_from_record(
    mut record: Map<String, Value>,
) -> Result<(PatternParameters, RepeatControl), ScanError> {
    let mut repeat = RepeatControl::builder();
    if let Some(n) = record.remove(NUM_REPEAT_KEY) {
        repeat = repeat.num_repeat(serde_json::from_value(n)?);
    }
    if let Some(d) = record.remove(MAX_SCAN_DURATION_KEY) {
        repeat = repeat.max_scan_duration(serde_json::from_value(d)?);
    }
    let repeat = repeat.build()?;

    let pattern: PatternParameters = serde_json::from_value(Value::Object(record))?;
    pattern.validate()?;
    if !pattern.is_repeatable() && repeat != RepeatControl::Single {
        return Err(ScanError::NotRepeatable);
    }
    Ok((pattern, repeat))
}

pub fn write_pattern_json<W: Write>(
    writer: W,
    pattern: &PatternParameters,
    repeat: RepeatControl,
) -> Result<(), ScanError> {
    serde_json::to_writer_pretty(writer, &pattern_record(pattern, repeat)?)?;
    Ok(())
}

pub fn read_pattern_json<R: Read>(
    reader: R,
) -> Result<(PatternParameters, RepeatControl), ScanError> {
    pattern_from_record(serde_json::from_reader(reader)?)
}

pub fn write_observation_json<W: Write>(
    writer: W,
    spec: &ObservationSpec,
) -> Result<(), ScanError> {
    serde_json::to_writer_pretty(writer, &ObservationRecord::from(spec))?;
    Ok(())
}

/// Parse a flat observation record and run the builder checks on it.
pub fn read_observation_json<R: Read>(reader: R) -> Result<ObservationSpec, ScanError> {
    let record: ObservationRecord = serde_json::from_reader(reader)?;
    ObservationSpec::try_from(record)
}
