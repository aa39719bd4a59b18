use crate::{sample_bilinear_u8, GrayImage, GrayImageView};
use nalgebra::{DMatrix, Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Planar projective mapping, stored with `h[(2, 2)] == 1` whenever it came
/// out of [`estimate_homography`] or [`crate::extract_homography`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomographyError {
    #[error("correspondence shape mismatch: {source_len} source vs {target_len} target points")]
    ShapeMismatch {
        source_len: usize,
        target_len: usize,
    },
    #[error("not enough correspondences for a homography (need >= 4, got {0})")]
    NotEnoughPoints(usize),
    #[error("singular value decomposition did not produce V^T")]
    SvdFailed,
    #[error("estimated homography is degenerate (h33 ~ 0)")]
    Degenerate,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Map a plane point. No check on the homogeneous divisor; use
    /// [`crate::project_point`] when the result may be at infinity.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Scale so that `h[(2, 2)] == 1`.
    pub fn normalized(&self) -> Option<Self> {
        normalize_homography(self.h).map(Self::new)
    }
}

/// Options for [`estimate_homography_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DltOptions {
    /// Hartley-condition both point sets before building the constraint
    /// matrix. Exact correspondences give the same answer either way; noisy
    /// pixel-scale data is much better conditioned with it.
    pub normalize: bool,
}

impl Default for DltOptions {
    fn default() -> Self {
        Self { normalize: true }
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points(pts: &[Point2<f64>]) -> (Vec<Point2<f64>>, Matrix3<f64>) {
    // Hartley normalization: translate to centroid, scale so mean distance = sqrt(2)
    let n = pts.len() as f64;
    let (mut cx, mut cy) = (0.0, 0.0);
    for p in pts {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts
        .iter()
        .map(|p| {
            let v = t * Vector3::new(p.x, p.y, 1.0);
            Point2::new(v[0], v[1])
        })
        .collect();
    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 || !s.is_finite() {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Two DLT constraint rows for `(x, y) -> (x', y')`, homogeneous scale 1.
///
/// Rows come from `p' x (H p) = 0`:
/// `[0, 0, 0, -z'x, -z'y, -z'z, y'x, y'y, y'z]` and
/// `[z'x, z'y, z'z, 0, 0, 0, -x'x, -x'y, -x'z]`.
fn constraint_rows(src: Point2<f64>, dst: Point2<f64>) -> [[f64; 9]; 2] {
    let (x, y, z) = (src.x, src.y, 1.0);
    let (xt, yt, zt) = (dst.x, dst.y, 1.0);
    [
        [
            0.0,
            0.0,
            0.0,
            -zt * x,
            -zt * y,
            -zt * z,
            yt * x,
            yt * y,
            yt * z,
        ],
        [
            zt * x,
            zt * y,
            zt * z,
            0.0,
            0.0,
            0.0,
            -xt * x,
            -xt * y,
            -xt * z,
        ],
    ]
}

/// Estimate `H` such that `target ~ H * source` with the default options.
pub fn estimate_homography(
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Result<Homography, HomographyError> {
    estimate_homography_with(source, target, DltOptions::default())
}

/// Direct linear transform over all correspondences.
///
/// The solution is the right singular vector of the smallest singular value
/// of the stacked `2N x 9` constraint matrix, reshaped to 3x3 and scaled to
/// `h33 = 1`. Collinear or coincident inputs are not detected and give an
/// arbitrary member of the null space.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(source, target), fields(n = source.len()))
)]
pub fn estimate_homography_with(
    source: &[Point2<f64>],
    target: &[Point2<f64>],
    opts: DltOptions,
) -> Result<Homography, HomographyError> {
    if source.len() != target.len() {
        return Err(HomographyError::ShapeMismatch {
            source_len: source.len(),
            target_len: target.len(),
        });
    }
    let n = source.len();
    if n < 4 {
        return Err(HomographyError::NotEnoughPoints(n));
    }

    let (src, t_src, dst, t_dst) = if opts.normalize {
        let (s, ts) = normalize_points(source);
        let (d, td) = normalize_points(target);
        (s, ts, d, td)
    } else {
        (
            source.to_vec(),
            Matrix3::identity(),
            target.to_vec(),
            Matrix3::identity(),
        )
    };

    // A thin SVD of an 8x9 matrix drops the null vector, so pad to 9 rows.
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (k, (&s, &d)) in src.iter().zip(dst.iter()).enumerate() {
        let [r0, r1] = constraint_rows(s, d);
        for c in 0..9 {
            a[(2 * k, c)] = r0[c];
            a[(2 * k + 1, c)] = r1[c];
        }
    }

    let svd = a.svd(false, true);
    let vt = svd.v_t.ok_or(HomographyError::SvdFailed)?;
    let smallest = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .ok_or(HomographyError::SvdFailed)?;
    let h = vt.row(smallest);

    let hn =
        Matrix3::<f64>::from_row_slice(&[h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]]);

    let h_den = denormalize_homography(hn, t_src, t_dst).ok_or(HomographyError::Degenerate)?;
    let h_den = normalize_homography(h_den).ok_or(HomographyError::Degenerate)?;

    log::trace!("dlt: {} correspondences, smallest singular index {}", n, smallest);
    Ok(Homography::new(h_den))
}

/// Root-mean-square transfer error of `h` over the correspondences.
///
/// Points whose image is at infinity are skipped; `None` when nothing is
/// left or the slices differ in length.
pub fn reprojection_rms(
    h: &Homography,
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Option<f64> {
    if source.len() != target.len() {
        return None;
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    for (s, t) in source.iter().zip(target) {
        let q = h.apply(*s);
        if q.x.is_finite() && q.y.is_finite() {
            sum += (q - *t).norm_squared();
            count += 1;
        }
    }
    (count > 0).then(|| (sum / count as f64).sqrt())
}

/// Warp `src` into a new `out_w x out_h` image.
///
/// Output pixel `(x, y)` samples the source at `h_src_from_dst * (x, y)`
/// (bilinear, zero outside the source). Integer output coordinates are used
/// directly so one output pixel equals one unit of the destination plane.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, h_src_from_dst))
)]
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = vec![0u8; out_w * out_h];

    for y in 0..out_h {
        for x in 0..out_w {
            let ps = h_src_from_dst.apply(Point2::new(x as f64, y as f64));
            if !(ps.x.is_finite() && ps.y.is_finite()) {
                continue;
            }
            out[y * out_w + x] = sample_bilinear_u8(src, ps.x as f32, ps.y as f32);
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageSize;
    use approx::assert_relative_eq;

    fn assert_close(a: Point2<f64>, b: Point2<f64>, tol: f64) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    fn ground_truth() -> Homography {
        Homography::new(Matrix3::new(
            1.0, 0.2, 12.0, //
            -0.1, 0.9, 6.0, //
            0.0006, 0.0004, 1.0,
        ))
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, 3.0, //
            0.001, 0.0005, 1.0,
        ));
        let inv = h.inverse().expect("invertible");

        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(50.0, -20.0),
            Point2::new(320.0, 200.0),
        ] {
            let back = inv.apply(h.apply(p));
            assert_close(back, p, 1e-9);
        }
    }

    #[test]
    fn constraint_rows_vanish_for_true_mapping() {
        let h = ground_truth();
        let flat: Vec<f64> = h.h.transpose().iter().copied().collect();
        let src = Point2::new(30.0, -7.0);
        let dst = h.apply(src);
        for row in constraint_rows(src, dst) {
            let dot: f64 = row.iter().zip(&flat).map(|(a, b)| a * b).sum();
            assert!(dot.abs() < 1e-9, "residual {dot}");
        }
    }

    #[test]
    fn four_points_recover_h_exactly() {
        let h = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(180.0, 0.0),
            Point2::new(180.0, 130.0),
            Point2::new(0.0, 130.0),
        ];
        let dst: Vec<_> = src.iter().map(|&p| h.apply(p)).collect();

        let est = estimate_homography(&src, &dst).expect("estimate");
        assert_relative_eq!(est.h, h.h, epsilon = 1e-6);
    }

    #[test]
    fn overdetermined_dlt_round_trips() {
        let h = ground_truth();
        let src: Vec<Point2<f64>> = (0..4)
            .flat_map(|y| (0..5).map(move |x| Point2::new(x as f64 * 40.0, y as f64 * 50.0)))
            .collect();
        let dst: Vec<Point2<f64>> = src.iter().map(|&p| h.apply(p)).collect();

        let est = estimate_homography(&src, &dst).expect("estimate");
        assert_relative_eq!(est.h[(2, 2)], 1.0);
        assert_relative_eq!(est.h, h.h, epsilon = 1e-6);
        assert!(reprojection_rms(&est, &src, &dst).unwrap() < 1e-6);
    }

    #[test]
    fn unnormalized_dlt_matches_on_exact_data() {
        let h = ground_truth();
        let src: Vec<Point2<f64>> = [(0.0, 0.0), (10.0, 0.0), (10.0, 8.0), (0.0, 8.0), (4.0, 3.0)]
            .into_iter()
            .map(|(x, y)| Point2::new(x, y))
            .collect();
        let dst: Vec<Point2<f64>> = src.iter().map(|&p| h.apply(p)).collect();
        let est = estimate_homography_with(&src, &dst, DltOptions { normalize: false })
            .expect("estimate");
        assert_relative_eq!(est.h, h.h, epsilon = 1e-6);
    }

    #[test]
    fn mismatched_input_lengths_fail() {
        let src = [Point2::new(0.0, 0.0); 4];
        let dst = [Point2::new(1.0, 1.0); 3];
        assert_eq!(
            estimate_homography(&src, &dst),
            Err(HomographyError::ShapeMismatch {
                source_len: 4,
                target_len: 3
            })
        );
    }

    #[test]
    fn too_few_points_fail() {
        let src = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        assert_eq!(
            estimate_homography(&src, &src),
            Err(HomographyError::NotEnoughPoints(3))
        );
    }

    #[test]
    fn warp_with_identity_copies_the_image() {
        let mut img = GrayImage::filled(ImageSize::new(8, 6), 0);
        img.data[2 * 8 + 3] = 255;
        let out = warp_perspective_gray(&img.view(), Homography::identity(), 8, 6);
        assert_eq!(out, img);
    }

    #[test]
    fn warp_samples_through_the_mapping() {
        let src = GrayImage::filled(ImageSize::new(10, 10), 255);
        // shift by 5 px: only the left half of the output sees the source
        let h = Homography::from_array([[1.0, 0.0, 5.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        let out = warp_perspective_gray(&src.view(), h, 10, 10);
        assert_eq!(out.get(0, 0), 255);
        assert_eq!(out.get(4, 9), 255);
        assert_eq!(out.get(5, 3), 0);
        assert_eq!(out.get(9, 9), 0);
    }
}
