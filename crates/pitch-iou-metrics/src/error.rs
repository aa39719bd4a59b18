use crate::regions::Region;
use pitch_iou_core::ImageSize;

/// Errors returned by the rasterizer and the IoU scorers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("region {region:?} needs point #{needed} but only {got} points were given")]
    MissingPoints {
        region: Region,
        needed: usize,
        got: usize,
    },
    #[error("mask sizes differ ({a:?} vs {b:?})")]
    SizeMismatch { a: ImageSize, b: ImageSize },
    #[error("true and predicted point arrays differ in length ({truth} vs {predicted})")]
    PointCountMismatch { truth: usize, predicted: usize },
    #[error("birdseye frame for a {length}x{width} field is empty")]
    EmptyBirdseye { length: f64, width: f64 },
}
