//! Batch evaluation over many scenarios.

use crate::pipeline::{evaluate, EvaluateError, EvaluateOptions, EvaluationReport, ScenarioParams};
use pitch_iou_field::PitchDimensions;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Evaluate every scenario in parallel; results keep the input order.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip_all, fields(n = samples.len()))
)]
pub fn evaluate_sweep(
    samples: &[ScenarioParams],
    options: &EvaluateOptions,
) -> Vec<Result<EvaluationReport, EvaluateError>> {
    samples
        .par_iter()
        .map(|params| evaluate(params, options))
        .collect()
}

/// `count` copies of `base`, each on a random international-size pitch.
pub fn random_pitch_scenarios(base: &ScenarioParams, count: usize, seed: u64) -> Vec<ScenarioParams> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| ScenarioParams {
            pitch: PitchDimensions::random_international(&mut rng),
            ..*base
        })
        .collect()
}

/// One row of a sweep result file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<EvaluationReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SweepEntry {
    pub fn from_results(results: Vec<Result<EvaluationReport, EvaluateError>>) -> Vec<Self> {
        results
            .into_iter()
            .enumerate()
            .map(|(index, r)| match r {
                Ok(report) => Self {
                    index,
                    report: Some(report),
                    error: None,
                },
                Err(err) => Self {
                    index,
                    report: None,
                    error: Some(err.to_string()),
                },
            })
            .collect()
    }
}

/// Means over the successful evaluations of a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub evaluated: usize,
    pub failed: usize,
    pub mean_aggregate_iou: f64,
    pub mean_whole_field_iou: f64,
}

impl SweepSummary {
    pub fn from_entries(entries: &[SweepEntry]) -> Self {
        let reports: Vec<&EvaluationReport> =
            entries.iter().filter_map(|e| e.report.as_ref()).collect();
        let n = reports.len();
        let mean = |f: fn(&EvaluationReport) -> f64| {
            if n == 0 {
                0.0
            } else {
                reports.iter().map(|r| f(r)).sum::<f64>() / n as f64
            }
        };
        Self {
            evaluated: n,
            failed: entries.len() - n,
            mean_aggregate_iou: mean(|r| r.aggregate_iou),
            mean_whole_field_iou: mean(|r| r.whole_field_iou),
        }
    }
}
