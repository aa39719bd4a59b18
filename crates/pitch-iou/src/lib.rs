//! High-level facade crate for the `pitch-iou-*` workspace.
//!
//! This crate provides:
//! - re-exports of the camera model, field geometry and metric crates
//! - [`evaluate`]: one synthetic calibration round on a football pitch. The
//!   true camera projects the pitch, a homography is re-estimated from the
//!   FIFA template to the projected points, and the estimate is scored with
//!   segment IoU and whole-field IoU
//! - [`evaluate_sweep`]: many scenarios in parallel
//! - JSON configs and reports, and (feature `cli`) the `pitch-iou` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pitch_iou::{evaluate, EvaluateOptions, ScenarioParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = evaluate(&ScenarioParams::default(), &EvaluateOptions::default())?;
//! println!(
//!     "aggregate {:.3}, whole field {:.3}",
//!     report.aggregate_iou, report.whole_field_iou
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `pitch_iou::core`: camera, projection, DLT, raster helpers.
//! - `pitch_iou::field`: pitch dimensions and the 245-point field model.
//! - `pitch_iou::metrics`: region catalog, masks, IoU scorers.

pub use pitch_iou_core as core;
pub use pitch_iou_field as field;
pub use pitch_iou_metrics as metrics;

pub use pitch_iou_core::{CameraParameters, Homography, ImageSize, ProjectionMatrix};
pub use pitch_iou_field::{FieldGeometry, FieldOrigin, PitchDimensions};
pub use pitch_iou_metrics::{Region, RegionScore, SegmentScores};

mod io;
mod pipeline;
mod sweep;

#[cfg(feature = "image")]
pub use io::write_mask_png;
pub use io::{EvaluateConfig, IoError, RandomPitches, SweepConfig, SweepReport};
pub use pipeline::{
    estimated_homography, evaluate, evaluate_with_points, CameraPose, CorrespondenceNoise,
    EvaluateError, EvaluateOptions, Evaluation, EvaluationReport, OffImagePolicy, ScenarioParams,
};
pub use sweep::{evaluate_sweep, random_pitch_scenarios, SweepEntry, SweepSummary};
