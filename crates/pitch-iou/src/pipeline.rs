//! One synthetic calibration round: project, re-estimate, score.

use nalgebra::Point2;
use pitch_iou_core::{
    batch_project, compute_projection_matrix, estimate_homography_with, extract_homography,
    reprojection_rms, CameraError, CameraParameters, DltOptions, Homography, HomographyError,
    ImageSize, ProjectionError,
};
use pitch_iou_field::{generate_field, FieldError, FieldOrigin, PitchDimensions};
use pitch_iou_metrics::{
    render_region_overview, segment_scores, whole_field_iou, Mask, MetricsError, RegionScore,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum EvaluateError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Homography(#[from] HomographyError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("noise amplitude must be finite and non-negative, got {0}")]
    InvalidNoise(f64),
}

/// Broadcast camera pose and zoom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPose {
    pub pan_deg: f64,
    pub tilt_deg: f64,
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Camera centre, corner-origin pitch coordinates in metres.
    pub center: [f64; 3],
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            pan_deg: -30.0,
            tilt_deg: -10.0,
            focal_length: 3018.0,
            center: [52.0, -45.0, 16.0],
        }
    }
}

/// Everything that defines one synthetic view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Actual pitch; the estimator always fits against the FIFA template.
    pub pitch: PitchDimensions,
    pub camera: CameraPose,
    pub image: ImageSize,
    /// Overrides the principal point, which otherwise sits at the image
    /// centre.
    pub principal_point: Option<[f64; 2]>,
}

impl ScenarioParams {
    pub fn camera_parameters(&self) -> Result<CameraParameters, CameraError> {
        let c = &self.camera;
        let params =
            CameraParameters::for_image(c.pan_deg, c.tilt_deg, c.focal_length, c.center, self.image)?;
        Ok(match self.principal_point {
            Some([u, v]) => params.with_principal_point(u, v),
            None => params,
        })
    }
}

/// Which correspondences feed the homography estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffImagePolicy {
    /// Use every field point, wherever it projects.
    #[default]
    Keep,
    /// Only points whose true projection lands inside the frame. Masks are
    /// still built from the full point arrays.
    DropOffImage,
}

/// Uniform pixel noise added to the observed image points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceNoise {
    /// Half-width of the noise interval, pixels.
    pub amplitude_px: f64,
    pub seed: u64,
}

impl CorrespondenceNoise {
    fn apply(&self, points: &mut [Point2<f64>]) -> Result<(), EvaluateError> {
        let a = self.amplitude_px;
        if !(a.is_finite() && a >= 0.0) {
            return Err(EvaluateError::InvalidNoise(a));
        }
        if a == 0.0 {
            return Ok(());
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        for p in points {
            p.x += rng.random_range(-a..=a);
            p.y += rng.random_range(-a..=a);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateOptions {
    pub policy: OffImagePolicy,
    pub noise: Option<CorrespondenceNoise>,
    pub dlt: DltOptions,
}

/// Scores and matrices of one evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub params: ScenarioParams,
    pub projection: [[f64; 4]; 3],
    /// Plane homography taken from the true camera.
    pub true_homography: [[f64; 3]; 3],
    /// Homography re-estimated from the correspondences.
    pub estimated_homography: [[f64; 3]; 3],
    /// Mean IoU of the regions visible at all; `0` when none is.
    pub aggregate_iou: f64,
    pub regions: Vec<RegionScore>,
    pub whole_field_iou: f64,
    /// True field points that project inside the frame.
    pub visible_points: usize,
    /// Correspondences handed to the estimator.
    pub correspondences: usize,
    /// Transfer error of the estimate over its own correspondences, pixels.
    pub reprojection_rms: Option<f64>,
}

/// A report plus the projected point arrays it was computed from.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub report: EvaluationReport,
    pub true_points: Vec<Point2<i64>>,
    pub predicted_points: Vec<Point2<i64>>,
}

impl Evaluation {
    /// Labeled overview of the predicted regions.
    pub fn region_overview(&self) -> Result<Mask, MetricsError> {
        render_region_overview(&self.predicted_points, self.report.params.image)
    }
}

/// Run one scenario and return its report.
pub fn evaluate(
    params: &ScenarioParams,
    options: &EvaluateOptions,
) -> Result<EvaluationReport, EvaluateError> {
    evaluate_with_points(params, options).map(|e| e.report)
}

/// Like [`evaluate`], keeping the projected point arrays.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "info",
        skip_all,
        fields(pan = params.camera.pan_deg, tilt = params.camera.tilt_deg, f = params.camera.focal_length)
    )
)]
pub fn evaluate_with_points(
    params: &ScenarioParams,
    options: &EvaluateOptions,
) -> Result<Evaluation, EvaluateError> {
    let pitch = generate_field(params.pitch, FieldOrigin::Corner)?;
    let template = generate_field(PitchDimensions::fifa(), FieldOrigin::Corner)?;

    let camera = params.camera_parameters()?;
    let p0 = compute_projection_matrix(&camera);
    let true_points = batch_project(&p0, &pitch.points_3d())?;
    let h0 = extract_homography(&p0)?;
    let in_frame: Vec<bool> = true_points
        .iter()
        .map(|p| params.image.contains(Point2::new(p.x as f64, p.y as f64)))
        .collect();
    let visible_points = in_frame.iter().filter(|&&v| v).count();
    log::debug!(
        "{} of {} field points inside the {}x{} frame",
        visible_points,
        true_points.len(),
        params.image.width,
        params.image.height
    );

    let mut observed: Vec<Point2<f64>> = true_points
        .iter()
        .map(|p| Point2::new(p.x as f64, p.y as f64))
        .collect();
    if let Some(noise) = &options.noise {
        noise.apply(&mut observed)?;
    }

    let (source, target): (Vec<_>, Vec<_>) = template
        .points()
        .iter()
        .zip(observed)
        .zip(&in_frame)
        .filter(|(_, visible)| **visible || options.policy == OffImagePolicy::Keep)
        .map(|(pair, _)| (*pair.0, pair.1))
        .unzip();

    let h = estimate_homography_with(&source, &target, options.dlt)?;
    let rms = reprojection_rms(&h, &source, &target);

    let predicted_points = batch_project(&h, template.points())?;
    let segments = segment_scores(&true_points, &predicted_points, params.image)?;
    let whole = whole_field_iou(&h0, &h, params.pitch, params.image)?;

    log::info!(
        "pan {:.1} tilt {:.1} f {:.0}: aggregate iou {:.4}, whole-field iou {:.4}",
        params.camera.pan_deg,
        params.camera.tilt_deg,
        params.camera.focal_length,
        segments.aggregate,
        whole
    );

    Ok(Evaluation {
        report: EvaluationReport {
            params: *params,
            projection: p0.to_array(),
            true_homography: h0.to_array(),
            estimated_homography: h.to_array(),
            aggregate_iou: segments.aggregate,
            regions: segments.regions,
            whole_field_iou: whole,
            visible_points,
            correspondences: source.len(),
            reprojection_rms: rms,
        },
        true_points,
        predicted_points,
    })
}

/// Homography recovered by an evaluation, as a matrix.
pub fn estimated_homography(report: &EvaluationReport) -> Homography {
    Homography::from_array(report.estimated_homography)
}
