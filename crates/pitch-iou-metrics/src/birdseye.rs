//! Whole-field IoU through a birdseye warp of the camera frame.

use crate::error::MetricsError;
use crate::iou::pixel_iou;
use crate::raster::Mask;
use pitch_iou_core::{resize_bicubic, warp_perspective_gray, GrayImage, Homography, ImageSize};
use pitch_iou_field::PitchDimensions;

/// Comparison frame: one pixel per metre of a FIFA pitch.
pub const CANONICAL_BIRDSEYE: ImageSize = ImageSize::new(105, 68);

/// Birdseye frame for a pitch, one pixel per metre, rounded.
pub fn birdseye_size(dims: PitchDimensions) -> Result<ImageSize, MetricsError> {
    let (w, h) = (dims.length.round(), dims.width.round());
    if !(w.is_finite() && h.is_finite() && w >= 1.0 && h >= 1.0) {
        return Err(MetricsError::EmptyBirdseye {
            length: dims.length,
            width: dims.width,
        });
    }
    Ok(ImageSize::new(w as usize, h as usize))
}

/// Footprint of the camera frame on the pitch plane, at canonical size.
///
/// `h` maps pitch coordinates (corner origin, metres) to image pixels. A
/// white frame of size `image` is pulled back through it onto a
/// `dims`-sized birdseye grid, which is then resampled to
/// [`CANONICAL_BIRDSEYE`] when the sizes differ.
pub fn birdseye_mask(
    h: &Homography,
    dims: PitchDimensions,
    image: ImageSize,
) -> Result<GrayImage, MetricsError> {
    let size = birdseye_size(dims)?;
    let frame = GrayImage::filled(image, 255);
    let warped = warp_perspective_gray(&frame.view(), *h, size.width, size.height);
    if size == CANONICAL_BIRDSEYE {
        return Ok(warped);
    }
    log::trace!(
        "resampling birdseye {}x{} to canonical",
        size.width,
        size.height
    );
    Ok(resize_bicubic(
        &warped.view(),
        CANONICAL_BIRDSEYE.width,
        CANONICAL_BIRDSEYE.height,
    ))
}

/// IoU of the true and predicted birdseye footprints.
///
/// The true mapping lives on the real pitch (`true_dims`); the predicted
/// one was fitted against the FIFA template, so it is warped at the
/// canonical size directly.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(true_h, pred_h))
)]
pub fn whole_field_iou(
    true_h: &Homography,
    pred_h: &Homography,
    true_dims: PitchDimensions,
    image: ImageSize,
) -> Result<f64, MetricsError> {
    let truth = birdseye_mask(true_h, true_dims, image)?;
    let pred = birdseye_mask(pred_h, PitchDimensions::fifa(), image)?;
    let iou = pixel_iou(&Mask::from(truth), &Mask::from(pred))?;
    log::debug!("whole-field iou {:.4}", iou);
    Ok(iou)
}
