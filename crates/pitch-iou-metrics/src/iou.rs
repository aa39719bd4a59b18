use crate::error::MetricsError;
use crate::raster::{rasterize, Mask};
use crate::regions::Region;
use nalgebra::Point2;
use pitch_iou_core::ImageSize;
use serde::{Deserialize, Serialize};

/// Intersection over union of the nonzero pixels of two masks.
///
/// Two empty masks score `0.0`.
pub fn pixel_iou(a: &Mask, b: &Mask) -> Result<f64, MetricsError> {
    if a.size() != b.size() {
        return Err(MetricsError::SizeMismatch {
            a: a.size(),
            b: b.size(),
        });
    }
    let (mut inter, mut union) = (0usize, 0usize);
    for (&pa, &pb) in a.data.iter().zip(&b.data) {
        let (ia, ib) = (pa != 0, pb != 0);
        inter += (ia && ib) as usize;
        union += (ia || ib) as usize;
    }
    if union == 0 {
        return Ok(0.0);
    }
    Ok(inter as f64 / union as f64)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionScore {
    pub region: Region,
    pub iou: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentScores {
    /// Mean over regions with a nonzero score; `0.0` when none has one.
    pub aggregate: f64,
    pub regions: Vec<RegionScore>,
}

impl SegmentScores {
    pub fn get(&self, region: Region) -> Option<f64> {
        self.regions
            .iter()
            .find(|s| s.region == region)
            .map(|s| s.iou)
    }

    /// Regions that contributed to the aggregate.
    pub fn visible(&self) -> impl Iterator<Item = &RegionScore> + '_ {
        self.regions.iter().filter(|s| s.iou != 0.0)
    }
}

/// Mean of the nonzero scores, or `0.0` if there are none.
pub fn aggregate_scores(scores: &[f64]) -> f64 {
    let (sum, n) = scores
        .iter()
        .filter(|&&s| s != 0.0)
        .fold((0.0, 0usize), |(sum, n), &s| (sum + s, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Per-region IoU over all eight regions in the fixed scoring order.
pub fn segment_scores(
    true_points: &[Point2<i64>],
    pred_points: &[Point2<i64>],
    size: ImageSize,
) -> Result<SegmentScores, MetricsError> {
    segment_scores_in_order(true_points, pred_points, &Region::ALL, size)
}

/// Like [`segment_scores`] over a caller-chosen list of regions.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(true_points, pred_points), fields(regions = order.len()))
)]
pub fn segment_scores_in_order(
    true_points: &[Point2<i64>],
    pred_points: &[Point2<i64>],
    order: &[Region],
    size: ImageSize,
) -> Result<SegmentScores, MetricsError> {
    if true_points.len() != pred_points.len() {
        return Err(MetricsError::PointCountMismatch {
            truth: true_points.len(),
            predicted: pred_points.len(),
        });
    }

    let mut regions = Vec::with_capacity(order.len());
    for &region in order {
        let subtract = region.subtract();
        let subtract = subtract.as_slice();
        let truth = rasterize(true_points, &[region], subtract, size)?;
        let pred = rasterize(pred_points, &[region], subtract, size)?;
        let iou = pixel_iou(&truth, &pred)?;
        log::debug!("{}: iou {:.4}", region.name(), iou);
        regions.push(RegionScore { region, iou });
    }

    let scores: Vec<f64> = regions.iter().map(|s| s.iou).collect();
    let aggregate = aggregate_scores(&scores);
    if aggregate == 0.0 {
        log::info!("no region is visible in both masks");
    }
    Ok(SegmentScores { aggregate, regions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::fill_polygon;
    use approx::assert_relative_eq;
    use pitch_iou_field::{generate_field, FieldOrigin, PitchDimensions};

    fn rect(size: ImageSize, x0: f64, y0: f64, x1: f64, y1: f64) -> Mask {
        let mut m = Mask::new(size);
        fill_polygon(
            &mut m,
            &[
                Point2::new(x0, y0),
                Point2::new(x1, y0),
                Point2::new(x1, y1),
                Point2::new(x0, y1),
            ],
            1,
        );
        m
    }

    /// FIFA field at `scale` px per metre, 20 px margin, shifted right by `dx`.
    fn pixel_field(scale: f64, dx: f64) -> Vec<Point2<i64>> {
        generate_field(PitchDimensions::fifa(), FieldOrigin::Corner)
            .unwrap()
            .points()
            .iter()
            .map(|p| {
                Point2::new(
                    (p.x * scale + 20.0 + dx).round() as i64,
                    (p.y * scale + 20.0).round() as i64,
                )
            })
            .collect()
    }

    #[test]
    fn identical_masks_score_one() {
        let size = ImageSize::new(40, 30);
        let m = rect(size, 3.0, 4.0, 20.0, 25.0);
        assert_eq!(pixel_iou(&m, &m).unwrap(), 1.0);
    }

    #[test]
    fn disjoint_and_empty_masks_score_zero() {
        let size = ImageSize::new(40, 30);
        let a = rect(size, 0.0, 0.0, 10.0, 10.0);
        let b = rect(size, 20.0, 15.0, 30.0, 25.0);
        assert_eq!(pixel_iou(&a, &b).unwrap(), 0.0);
        let empty = Mask::new(size);
        assert_eq!(pixel_iou(&empty, &empty).unwrap(), 0.0);
        assert_eq!(pixel_iou(&a, &empty).unwrap(), 0.0);
    }

    #[test]
    fn partial_overlap_counts_pixels() {
        let size = ImageSize::new(40, 30);
        // 11 columns x 10 rows each, shifted by 5 columns.
        let a = rect(size, 0.0, 0.0, 10.0, 10.0);
        let b = rect(size, 5.0, 0.0, 15.0, 10.0);
        assert_relative_eq!(pixel_iou(&a, &b).unwrap(), 60.0 / 160.0);
    }

    #[test]
    fn labels_do_not_matter_only_occupancy() {
        let size = ImageSize::new(8, 8);
        let a = rect(size, 1.0, 1.0, 5.0, 5.0);
        let mut b = a.clone();
        b.data.iter_mut().filter(|v| **v != 0).for_each(|v| *v = 7);
        assert_eq!(pixel_iou(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let a = Mask::new(ImageSize::new(4, 4));
        let b = Mask::new(ImageSize::new(4, 5));
        assert!(matches!(
            pixel_iou(&a, &b),
            Err(MetricsError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn aggregate_ignores_zero_scores() {
        assert_eq!(aggregate_scores(&[]), 0.0);
        assert_eq!(aggregate_scores(&[0.0, 0.0, 0.0]), 0.0);
        assert_relative_eq!(aggregate_scores(&[0.5, 0.0, 1.0, 0.0]), 0.75);
    }

    #[test]
    fn identical_point_sets_score_one_everywhere() {
        let pts = pixel_field(8.0, 0.0);
        let s = segment_scores(&pts, &pts, ImageSize::new(900, 600)).unwrap();
        assert_eq!(s.regions.len(), 8);
        for r in &s.regions {
            assert_eq!(r.iou, 1.0, "{:?}", r.region);
        }
        assert_eq!(s.aggregate, 1.0);
        assert_eq!(s.visible().count(), 8);
    }

    #[test]
    fn aggregate_is_independent_of_region_order() {
        let size = ImageSize::new(900, 600);
        let truth = pixel_field(8.0, 0.0);
        let pred = pixel_field(8.0, 6.0);
        let forward = segment_scores(&truth, &pred, size).unwrap();
        let mut reversed_order = Region::ALL;
        reversed_order.reverse();
        let reversed = segment_scores_in_order(&truth, &pred, &reversed_order, size).unwrap();
        assert_relative_eq!(forward.aggregate, reversed.aggregate, epsilon = 1e-12);
        for r in Region::ALL {
            assert_eq!(forward.get(r), reversed.get(r));
        }
        assert!(forward.aggregate > 0.0 && forward.aggregate < 1.0);
    }

    #[test]
    fn off_frame_fields_score_zero_without_error() {
        let truth: Vec<_> = pixel_field(8.0, 0.0)
            .into_iter()
            .map(|p| Point2::new(p.x, p.y - 5000))
            .collect();
        let s = segment_scores(&truth, &truth, ImageSize::new(900, 600)).unwrap();
        assert_eq!(s.aggregate, 0.0);
        assert_eq!(s.visible().count(), 0);
    }

    #[test]
    fn mismatched_point_arrays_fail() {
        let pts = pixel_field(8.0, 0.0);
        assert!(matches!(
            segment_scores(&pts, &pts[..100], ImageSize::new(64, 64)),
            Err(MetricsError::PointCountMismatch {
                truth: 245,
                predicted: 100
            })
        ));
    }
}
