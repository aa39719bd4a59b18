//! Core geometry for pitch calibration evaluation.
//!
//! This crate is purely numerical: a pan/tilt/zoom pinhole camera model,
//! point projection through projection or homography matrices, a DLT
//! homography estimator and the small grayscale raster helpers (sampling,
//! perspective warp, bicubic resize) used by the IoU metrics.
//!
//! It knows nothing about football pitches; field layout lives in
//! `pitch-iou-field` and the scoring in `pitch-iou-metrics`.

mod camera;
mod homography;
mod image;
mod logger;
mod projection;

pub use camera::{
    base_orientation, compute_projection_matrix, pan_tilt_rotation, rotate_x_axis, rotate_y_axis,
    CameraError, CameraParameters, ProjectionMatrix, RotationSpec,
};
pub use homography::{
    estimate_homography, estimate_homography_with, reprojection_rms, warp_perspective_gray,
    DltOptions, Homography, HomographyError,
};
pub use image::{
    resize_bicubic, sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, ImageSize,
};
pub use projection::{
    batch_project, extract_homography, project_point, PointProjector, ProjectionError, WorldPoint,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV};
