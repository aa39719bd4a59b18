//! Point projection through 3x3 homographies and 3x4 projection matrices.

use crate::camera::ProjectionMatrix;
use crate::homography::Homography;
use nalgebra::{Matrix3, Point2, Point3, Vector3, Vector4};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    /// The homogeneous divisor vanished: the point maps to infinity or lies
    /// on the camera plane. `index` is set for batch projection.
    #[error("point {point:?} (index {index:?}) maps to infinity: homogeneous divisor is zero")]
    Degenerate {
        index: Option<usize>,
        point: [f64; 3],
    },
    /// The `[2, 2]` entry of the plane homography vanished, so it cannot
    /// be scaled to `h33 = 1`. The camera centre is level with the ground
    /// plane origin along the optical axis.
    #[error("plane homography has a vanishing [2,2] entry ({h33:e})")]
    VanishingScale { h33: f64 },
}

/// A world point that can be fed to a projector.
///
/// 2D points lie on the `z = 0` plane.
pub trait WorldPoint {
    fn xyz(&self) -> [f64; 3];
}

impl WorldPoint for Point2<f64> {
    fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, 0.0]
    }
}

impl WorldPoint for Point3<f64> {
    fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl WorldPoint for [f64; 2] {
    fn xyz(&self) -> [f64; 3] {
        [self[0], self[1], 0.0]
    }
}

impl WorldPoint for [f64; 3] {
    fn xyz(&self) -> [f64; 3] {
        *self
    }
}

/// Anything mapping homogeneous world coordinates to homogeneous image ones.
pub trait PointProjector {
    /// `M * (x, y, [z,] w)`; a homography ignores `z`.
    fn project_homogeneous(&self, x: f64, y: f64, z: f64, w: f64) -> Vector3<f64>;
}

impl PointProjector for Homography {
    #[inline]
    fn project_homogeneous(&self, x: f64, y: f64, _z: f64, w: f64) -> Vector3<f64> {
        self.h * Vector3::new(x, y, w)
    }
}

impl PointProjector for ProjectionMatrix {
    #[inline]
    fn project_homogeneous(&self, x: f64, y: f64, z: f64, w: f64) -> Vector3<f64> {
        self.p * Vector4::new(x, y, z, w)
    }
}

/// Homography of the `z = 0` plane: columns 0, 1 and 3 of `p`.
///
/// Only valid for points on the ground plane. The result is scaled so that
/// `h[(2, 2)] == 1`; a vanishing entry is an error.
pub fn extract_homography(p: &ProjectionMatrix) -> Result<Homography, ProjectionError> {
    let m = &p.p;
    let h = Matrix3::new(
        m[(0, 0)], m[(0, 1)], m[(0, 3)], //
        m[(1, 0)], m[(1, 1)], m[(1, 3)], //
        m[(2, 0)], m[(2, 1)], m[(2, 3)],
    );
    Homography::new(h)
        .normalized()
        .ok_or(ProjectionError::VanishingScale { h33: h[(2, 2)] })
}

/// Project one homogeneous point `(x, y, z, w)` to pixel coordinates.
pub fn project_point<M: PointProjector + ?Sized>(
    m: &M,
    x: f64,
    y: f64,
    z: f64,
    w: f64,
) -> Result<Point2<f64>, ProjectionError> {
    let q = m.project_homogeneous(x, y, z, w);
    let u = q[0] / q[2];
    let v = q[1] / q[2];
    if q[2] == 0.0 || !u.is_finite() || !v.is_finite() {
        return Err(ProjectionError::Degenerate {
            index: None,
            point: [x, y, z],
        });
    }
    Ok(Point2::new(u, v))
}

/// Project every point and quantize to integer pixels.
///
/// Rounding happens after projection, halves go to even. The first failing
/// point aborts the batch and is reported with its index.
pub fn batch_project<M, P>(m: &M, points: &[P]) -> Result<Vec<Point2<i64>>, ProjectionError>
where
    M: PointProjector + ?Sized,
    P: WorldPoint,
{
    points
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let [x, y, z] = p.xyz();
            let q = project_point(m, x, y, z, 1.0).map_err(|_| ProjectionError::Degenerate {
                index: Some(index),
                point: [x, y, z],
            })?;
            Ok(Point2::new(
                q.x.round_ties_even() as i64,
                q.y.round_ties_even() as i64,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{compute_projection_matrix, CameraParameters};
    use approx::assert_relative_eq;

    fn broadcast_camera() -> CameraParameters {
        CameraParameters::new(-30.0, -10.0, 3018.0, [52.0, -45.0, 16.0]).expect("camera")
    }

    #[test]
    fn extracted_homography_matches_projection_on_ground_plane() {
        let p = compute_projection_matrix(&broadcast_camera());
        let h = extract_homography(&p).expect("plane homography");
        assert_relative_eq!(h.h[(2, 2)], 1.0, epsilon = 1e-12);

        for (x, y) in [(0.0, 0.0), (52.5, 34.0), (105.0, 68.0), (16.5, 13.84)] {
            let via_p = project_point(&p, x, y, 0.0, 1.0).expect("projection");
            let via_h = project_point(&h, x, y, 0.0, 1.0).expect("homography");
            assert_relative_eq!(via_p, via_h, epsilon = 1e-6);
        }
    }

    #[test]
    fn camera_at_plane_origin_has_no_plane_homography() {
        // h33 = -r3 . C, which is exactly zero for C = 0
        let cam = CameraParameters::new(0.0, 0.0, 1000.0, [0.0, 0.0, 0.0]).expect("camera");
        let p = compute_projection_matrix(&cam);
        assert!(matches!(
            extract_homography(&p),
            Err(ProjectionError::VanishingScale { .. })
        ));
    }

    #[test]
    fn homography_ignores_z() {
        let h = Homography::new(Matrix3::new(
            2.0, 0.0, 1.0, //
            0.0, 2.0, 3.0, //
            0.0, 0.0, 1.0,
        ));
        let a = project_point(&h, 1.0, 1.0, 0.0, 1.0).unwrap();
        let b = project_point(&h, 1.0, 1.0, 25.0, 1.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Point2::new(3.0, 5.0));
    }

    #[test]
    fn point_on_camera_plane_is_an_error() {
        let cam = broadcast_camera();
        let p = compute_projection_matrix(&cam);
        let [cx, cy, cz] = cam.center;
        assert!(matches!(
            project_point(&p, cx, cy, cz, 1.0),
            Err(ProjectionError::Degenerate { index: None, .. })
        ));
    }

    #[test]
    fn batch_reports_failing_index() {
        // w' = x, so x = 0 sends the point to infinity
        let h = Homography::new(Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0,
        ));
        let pts = [[1.0, 2.0], [3.0, 4.0], [0.0, 5.0]];
        let err = batch_project(&h, &pts).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::Degenerate {
                index: Some(2),
                point: [0.0, 5.0, 0.0]
            }
        );
    }

    #[test]
    fn batch_rounds_half_to_even() {
        let h = Homography::new(Matrix3::identity());
        let pts = [[0.5, 1.5], [2.5, -0.5], [2.6, -1.4]];
        let out = batch_project(&h, &pts).unwrap();
        assert_eq!(
            out,
            vec![Point2::new(0, 2), Point2::new(2, 0), Point2::new(3, -1)]
        );
    }
}
