//! JSON configuration and report helpers.

use crate::pipeline::{
    evaluate_with_points, EvaluateError, EvaluateOptions, Evaluation, EvaluationReport,
    ScenarioParams,
};
use crate::sweep::{evaluate_sweep, random_pitch_scenarios, SweepEntry, SweepSummary};
#[cfg(feature = "image")]
use pitch_iou_metrics::Mask;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("mask buffer does not match its {width}x{height} size")]
    MaskShape { width: usize, height: usize },
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Single-scenario run description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateConfig {
    #[serde(default)]
    pub scenario: ScenarioParams,
    #[serde(default)]
    pub options: EvaluateOptions,
    #[serde(default)]
    pub report_path: Option<String>,
    /// 8-bit PNG of the predicted region overview.
    #[serde(default)]
    pub mask_path: Option<String>,
}

impl EvaluateConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path.as_ref())
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path.as_ref())
    }

    /// Resolve the output report path.
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pitch_iou_report.json"))
    }

    pub fn run(&self) -> Result<Evaluation, EvaluateError> {
        evaluate_with_points(&self.scenario, &self.options)
    }
}

/// Random-pitch expansion of a sweep's base scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomPitches {
    pub count: usize,
    #[serde(default)]
    pub seed: u64,
}

/// Batch run description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub scenarios: Vec<ScenarioParams>,
    /// Extra scenarios: the base scenario on random pitch sizes.
    #[serde(default)]
    pub random_pitches: Option<RandomPitches>,
    #[serde(default)]
    pub base: ScenarioParams,
    #[serde(default)]
    pub options: EvaluateOptions,
    #[serde(default)]
    pub output_path: Option<String>,
}

/// Sweep result file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub summary: SweepSummary,
    pub entries: Vec<SweepEntry>,
}

impl SweepConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path.as_ref())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pitch_iou_sweep.json"))
    }

    /// Explicit scenarios first, then the random-pitch ones.
    pub fn scenarios(&self) -> Vec<ScenarioParams> {
        let mut out = self.scenarios.clone();
        if let Some(r) = self.random_pitches {
            out.extend(random_pitch_scenarios(&self.base, r.count, r.seed));
        }
        out
    }

    pub fn run(&self) -> SweepReport {
        let entries = SweepEntry::from_results(evaluate_sweep(&self.scenarios(), &self.options));
        SweepReport {
            summary: SweepSummary::from_entries(&entries),
            entries,
        }
    }
}

impl SweepReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path.as_ref())
    }
}

impl EvaluationReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path.as_ref())
    }

    pub fn to_json_string(&self) -> Result<String, IoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Save a label mask as an 8-bit grayscale PNG, labels stretched over the
/// full range.
#[cfg(feature = "image")]
pub fn write_mask_png(mask: &Mask, path: impl AsRef<Path>) -> Result<(), IoError> {
    let gray = mask.to_gray_image(pitch_iou_metrics::Region::ALL.len() as u8);
    let img = image::GrayImage::from_raw(gray.width as u32, gray.height as u32, gray.data).ok_or(
        IoError::MaskShape {
            width: mask.width,
            height: mask.height,
        },
    )?;
    img.save(path)?;
    Ok(())
}
