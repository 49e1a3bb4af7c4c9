//! # skyscan
//!
//! Telescope scan-trajectory simulation: periodic scan patterns (Pong, Daisy) generated in a
//! tangent-plane offset frame, tiled in time, and projected into the horizontal frame of an
//! observing site, including the transform between the boresight and an off-axis detector module.
//!
//! ```rust
//! use skyscan::observation::ObservationSpec;
//! use skyscan::patterns::pong::PongParams;
//! use skyscan::telescope::HorizontalTrajectory;
//!
//! let sky = PongParams::builder()
//!     .num_term(4)
//!     .width(1.0)
//!     .height(1.0)
//!     .spacing(0.1)
//!     .velocity(0.5)
//!     .sample_interval(0.05)
//!     .build()?
//!     .generate()?;
//!
//! let spec = ObservationSpec::builder()
//!     .ra(0.0)
//!     .dec(-23.0)
//!     .start_el(45.0)
//!     .moving_up(true)
//!     .build()?;
//!
//! let telescope = HorizontalTrajectory::from_sky_pattern(&sky, &spec, None)?;
//! assert_eq!(telescope.len(), sky.len());
//! # Ok::<(), skyscan::scan_errors::ScanError>(())
//! ```
pub mod angle;
pub mod boresight;
pub mod constants;
pub mod export;
pub mod horizontal;
pub mod instrument;
pub mod kinematics;
pub mod observation;
pub mod patterns;
pub mod repeat;
pub mod scan_errors;
pub mod sidereal;
pub mod telescope;
pub mod trajectory;
