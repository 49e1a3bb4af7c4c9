//! # Constants and type definitions for skyscan
//!
//! This module centralizes the **conversion factors**, **physical constants** and **unit type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Angular conversions (degrees ↔ radians, hours ↔ degrees)
//! - Sidereal rate used to advance local sidereal time
//! - Default readout cadence of the scan patterns
//! - Unit aliases documenting what a bare `f64` carries
//!
//! Public APIs speak **degrees**, **seconds** and **hours** (hour-angle units); radians only appear
//! inside the trigonometric kernels.

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Hour angle → degrees (1h = 15°)
pub const DEG_PER_HOUR: f64 = 15.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

// -------------------------------------------------------------------------------------------------
// Scan constants
// -------------------------------------------------------------------------------------------------

/// Ratio converting elapsed solar seconds into sidereal hour-angle units
pub const SIDEREAL_RATE: f64 = 1.002737909350795;

/// Default readout cadence of a scan (400 Hz)
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 1.0 / 400.0;

/// Maximum relative spread (std / mean) tolerated between consecutive sample intervals
pub const MAX_SAMPLE_SPREAD: f64 = 0.01;

/// Step of the altitude probe used to tell a rising hour angle from a setting one
pub const BRANCH_PROBE: Degree = 1.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in hour-angle units (24h = 360°)
pub type Hour = f64;
/// Duration or time offset in seconds
pub type Second = f64;
/// Distance in meters
pub type Meter = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
