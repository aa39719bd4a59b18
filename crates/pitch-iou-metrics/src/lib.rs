//! IoU metrics for recovered pitch homographies.
//!
//! Two complementary scores:
//! - **segment IoU**: each of the eight named field regions is rasterized
//!   from the true and the predicted image points and compared pixelwise;
//!   the aggregate averages the regions that are visible at all.
//! - **whole-field IoU**: the camera frame is warped back onto the pitch
//!   plane through each homography and the two birdseye footprints are
//!   compared at a canonical 105x68 resolution.
//!
//! Everything here is a pure function of its inputs.

mod birdseye;
mod error;
mod iou;
mod raster;
mod regions;

pub use birdseye::{birdseye_mask, birdseye_size, whole_field_iou, CANONICAL_BIRDSEYE};
pub use error::MetricsError;
pub use iou::{
    aggregate_scores, pixel_iou, segment_scores, segment_scores_in_order, RegionScore,
    SegmentScores,
};
pub use raster::{fill_polygon, rasterize, render_region_overview, Mask};
pub use regions::{region_polygon, region_polygon_points, Region, RegionIndices, RegionSpec};
