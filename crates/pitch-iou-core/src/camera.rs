//! Pan/tilt/zoom pinhole camera.
//!
//! World frame: the pitch lies in the `z = 0` plane with `z` pointing up.
//! Camera frame: `x` right, `y` down, `z` along the optical axis. The base
//! orientation maps world "forward" (`+y`) onto the optical axis; pan then
//! turns about the camera's vertical axis and tilt about its horizontal one.

use crate::image::ImageSize;
use nalgebra::{Matrix3, Matrix3x4, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CameraError {
    #[error("focal length must be finite and positive (got {0})")]
    InvalidFocalLength(f64),
}

/// Coordinate rotation about the X axis, angle in degrees.
///
/// This is the transpose of the textbook active rotation, i.e. it rotates
/// the frame rather than the point.
pub fn rotate_x_axis(angle_deg: f64) -> Matrix3<f64> {
    let (s, c) = angle_deg.to_radians().sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, s, //
        0.0, -s, c,
    )
}

/// Coordinate rotation about the Y axis, angle in degrees.
pub fn rotate_y_axis(angle_deg: f64) -> Matrix3<f64> {
    let (s, c) = angle_deg.to_radians().sin_cos();
    Matrix3::new(
        c, 0.0, -s, //
        0.0, 1.0, 0.0, //
        s, 0.0, c,
    )
}

/// Pan about Y first, then tilt about the (panned) X axis.
pub fn pan_tilt_rotation(pan_deg: f64, tilt_deg: f64) -> Matrix3<f64> {
    rotate_x_axis(tilt_deg) * rotate_y_axis(pan_deg)
}

/// Fixed world-to-camera axis change (zero roll): world `z` up becomes
/// camera `-y`, world `y` becomes the optical axis.
pub fn base_orientation() -> Matrix3<f64> {
    let roll_deg = 0.0;
    rotate_y_axis(0.0) * rotate_x_axis(roll_deg) * rotate_x_axis(-90.0)
}

/// Rotation stored as a Rodrigues (axis * angle) vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationSpec {
    pub rodrigues: [f64; 3],
}

impl RotationSpec {
    pub fn from_pan_tilt(pan_deg: f64, tilt_deg: f64) -> Self {
        Self::from_matrix(&(pan_tilt_rotation(pan_deg, tilt_deg) * base_orientation()))
    }

    /// Compress an orthonormal matrix into its Rodrigues vector.
    ///
    /// Goes through a unit quaternion so rotations close to pi keep their
    /// axis.
    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        let rot = Rotation3::from_matrix_unchecked(*m);
        let q = UnitQuaternion::from_rotation_matrix(&rot);
        let v = q.scaled_axis();
        Self {
            rodrigues: [v.x, v.y, v.z],
        }
    }

    pub fn to_matrix(&self) -> Matrix3<f64> {
        let v = Vector3::from(self.rodrigues);
        UnitQuaternion::from_scaled_axis(v)
            .to_rotation_matrix()
            .into_inner()
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f64 {
        Vector3::from(self.rodrigues).norm()
    }
}

/// Full set of parameters for one synthetic broadcast camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    /// Principal point `(u, v)` in pixels.
    pub principal_point: [f64; 2],
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Pan angle in degrees.
    pub pan_deg: f64,
    /// Tilt angle in degrees (negative looks down).
    pub tilt_deg: f64,
    /// Camera centre in world units.
    pub center: [f64; 3],
}

impl CameraParameters {
    /// Camera with its principal point at the centre of a 1280x720 frame.
    pub fn new(
        pan_deg: f64,
        tilt_deg: f64,
        focal_length: f64,
        center: [f64; 3],
    ) -> Result<Self, CameraError> {
        Self::for_image(pan_deg, tilt_deg, focal_length, center, ImageSize::default())
    }

    /// Camera with its principal point at the centre of `image`.
    pub fn for_image(
        pan_deg: f64,
        tilt_deg: f64,
        focal_length: f64,
        center: [f64; 3],
        image: ImageSize,
    ) -> Result<Self, CameraError> {
        if !(focal_length.is_finite() && focal_length > 0.0) {
            return Err(CameraError::InvalidFocalLength(focal_length));
        }
        Ok(Self {
            principal_point: image.center(),
            focal_length,
            pan_deg,
            tilt_deg,
            center,
        })
    }

    pub fn with_principal_point(mut self, u: f64, v: f64) -> Self {
        self.principal_point = [u, v];
        self
    }

    pub fn rotation(&self) -> RotationSpec {
        RotationSpec::from_pan_tilt(self.pan_deg, self.tilt_deg)
    }

    pub fn intrinsics(&self) -> Matrix3<f64> {
        let f = self.focal_length;
        let [u, v] = self.principal_point;
        Matrix3::new(
            f, 0.0, u, //
            0.0, f, v, //
            0.0, 0.0, 1.0,
        )
    }

    pub fn projection_matrix(&self) -> ProjectionMatrix {
        compute_projection_matrix(self)
    }
}

/// 3x4 pinhole projection `K * R * [I | -C]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMatrix {
    pub p: Matrix3x4<f64>,
}

impl ProjectionMatrix {
    pub fn new(p: Matrix3x4<f64>) -> Self {
        Self { p }
    }

    pub fn to_array(&self) -> [[f64; 4]; 3] {
        let mut out = [[0.0; 4]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.p[(r, c)];
            }
        }
        out
    }
}

/// Build the projection matrix of `params`.
///
/// The rotation is round-tripped through its Rodrigues vector so a camera
/// stored in compact form reproduces the same matrix.
pub fn compute_projection_matrix(params: &CameraParameters) -> ProjectionMatrix {
    let k = params.intrinsics();
    let r = params.rotation().to_matrix();

    let mut t = Matrix3x4::<f64>::zeros();
    for i in 0..3 {
        t[(i, i)] = 1.0;
        t[(i, 3)] = -params.center[i];
    }

    ProjectionMatrix::new(k * r * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    #[test]
    fn rejects_non_positive_focal_length() {
        assert_eq!(
            CameraParameters::new(0.0, 0.0, 0.0, [0.0; 3]),
            Err(CameraError::InvalidFocalLength(0.0))
        );
        assert!(CameraParameters::new(0.0, 0.0, -10.0, [0.0; 3]).is_err());
        assert!(CameraParameters::new(0.0, 0.0, f64::NAN, [0.0; 3]).is_err());
    }

    #[test]
    fn base_orientation_looks_along_world_y() {
        let r = base_orientation();
        // world +y is the optical axis, world +z points up (camera -y)
        assert_relative_eq!(r * Vector3::y(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(r * Vector3::z(), -Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(r * Vector3::x(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn rodrigues_round_trips_rotation() {
        for (pan, tilt) in [(0.0, 0.0), (-30.0, -10.0), (35.0, -5.0), (180.0, -10.0)] {
            let m = pan_tilt_rotation(pan, tilt) * base_orientation();
            let spec = RotationSpec::from_matrix(&m);
            assert_relative_eq!(spec.to_matrix(), m, epsilon = 1e-10);
        }
    }

    #[test]
    fn half_turn_keeps_its_axis() {
        let m = rotate_y_axis(180.0);
        let spec = RotationSpec::from_matrix(&m);
        assert_relative_eq!(spec.angle(), std::f64::consts::PI, epsilon = 1e-9);
        assert_relative_eq!(spec.to_matrix(), m, epsilon = 1e-10);
    }

    #[test]
    fn camera_centre_is_the_null_space_of_projection() {
        let cam = CameraParameters::new(-30.0, -10.0, 3018.0, [52.0, -45.0, 16.0]).unwrap();
        let p = compute_projection_matrix(&cam).p;
        let c = Vector4::new(52.0, -45.0, 16.0, 1.0);
        assert_relative_eq!(p * c, nalgebra::Vector3::zeros(), epsilon = 1e-8);
    }

    #[test]
    fn optical_axis_hits_principal_point() {
        let cam = CameraParameters::new(0.0, 0.0, 1000.0, [0.0, 0.0, 10.0]).unwrap();
        let p = compute_projection_matrix(&cam).p;
        // straight ahead along world +y at camera height
        let q = p * Vector4::new(0.0, 50.0, 10.0, 1.0);
        assert_relative_eq!(q.x / q.z, 640.0, epsilon = 1e-9);
        assert_relative_eq!(q.y / q.z, 360.0, epsilon = 1e-9);
    }

    #[test]
    fn tilting_down_moves_ground_points_up_in_the_image() {
        let level = CameraParameters::new(0.0, 0.0, 1000.0, [0.0, 0.0, 10.0]).unwrap();
        let down = CameraParameters::new(0.0, -10.0, 1000.0, [0.0, 0.0, 10.0]).unwrap();
        let ground = Vector4::new(0.0, 40.0, 0.0, 1.0);
        let q0 = level.projection_matrix().p * ground;
        let q1 = down.projection_matrix().p * ground;
        // below the horizon when level; closer to the centre after tilting down
        assert!(q0.y / q0.z > 360.0);
        assert!(q1.y / q1.z < q0.y / q0.z);
    }
}
