use crate::error::MetricsError;
use crate::regions::{region_polygon_points, Region};
use nalgebra::Point2;
use pitch_iou_core::{GrayImage, ImageSize};

/// Labeled raster; `0` is empty, any other value marks a filled region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // row-major, len = w*h
}

impl Mask {
    pub fn new(size: ImageSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.area()],
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Number of pixels carrying `label`.
    pub fn count_label(&self, label: u8) -> usize {
        self.data.iter().filter(|&&v| v == label).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Stretch labels over the 8-bit range for viewing.
    pub fn to_gray_image(&self, max_label: u8) -> GrayImage {
        let scale = if max_label == 0 {
            0
        } else {
            255 / max_label as u16
        };
        GrayImage {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .map(|&v| (v as u16 * scale).min(255) as u8)
                .collect(),
        }
    }
}

impl From<GrayImage> for Mask {
    fn from(img: GrayImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            data: img.data,
        }
    }
}

/// Paint the interior of `polygon` with `value` (even-odd rule).
///
/// Pixel `(x, y)` is inside when its integer coordinate is. Each scanline
/// counts an edge on the half-open span `[y_lo, y_hi)`, so rows through a
/// vertex are not crossed twice. Vertices may lie anywhere; whatever falls
/// outside the raster is clipped.
pub fn fill_polygon(mask: &mut Mask, polygon: &[Point2<f64>], value: u8) {
    if polygon.len() < 3 || mask.width == 0 || mask.height == 0 {
        return;
    }

    let (y_min, y_max) = polygon
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    if !(y_min.is_finite() && y_max.is_finite()) {
        return;
    }
    let row_lo = y_min.ceil().max(0.0);
    let row_hi = y_max.floor().min((mask.height - 1) as f64);
    if row_lo > row_hi {
        return;
    }

    let x_limit = (mask.width - 1) as f64;
    let mut crossings: Vec<f64> = Vec::with_capacity(polygon.len());

    for row in row_lo as usize..=row_hi as usize {
        let yc = row as f64;
        crossings.clear();
        for (i, a) in polygon.iter().enumerate() {
            let b = &polygon[(i + 1) % polygon.len()];
            if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);

        let base = row * mask.width;
        for span in crossings.chunks_exact(2) {
            let x0 = span[0].ceil().max(0.0);
            let x1 = span[1].floor().min(x_limit);
            if x0 > x1 {
                continue;
            }
            mask.data[base + x0 as usize..=base + x1 as usize].fill(value);
        }
    }
}

fn outline(region: Region, points: &[Point2<i64>]) -> Result<Vec<Point2<f64>>, MetricsError> {
    Ok(region_polygon_points(region, points)?
        .into_iter()
        .map(|p| Point2::new(p.x as f64, p.y as f64))
        .collect())
}

/// Build a mask from projected field points.
///
/// Regions in `fill` are painted in order with their labels, later ones
/// overwriting earlier ones; regions in `subtract` are then cleared back to
/// zero.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "trace", skip(points), fields(n = points.len()))
)]
pub fn rasterize(
    points: &[Point2<i64>],
    fill: &[Region],
    subtract: &[Region],
    size: ImageSize,
) -> Result<Mask, MetricsError> {
    let mut mask = Mask::new(size);
    for &region in fill {
        fill_polygon(&mut mask, &outline(region, points)?, region.label());
    }
    for &region in subtract {
        fill_polygon(&mut mask, &outline(region, points)?, 0);
    }
    Ok(mask)
}

/// All eight regions in scoring order, without subtraction.
pub fn render_region_overview(points: &[Point2<i64>], size: ImageSize) -> Result<Mask, MetricsError> {
    rasterize(points, &Region::ALL, &[], size)
}
