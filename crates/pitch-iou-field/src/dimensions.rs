use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed marking sizes, metres.
pub mod markings {
    pub const GOAL_WIDTH: f64 = 7.32;
    pub const CENTER_CIRCLE_RADIUS: f64 = 9.15;
    pub const PENALTY_ARC_RADIUS: f64 = 9.15;
    pub const PENALTY_BOX_DEPTH: f64 = 16.5;
    pub const PENALTY_BOX_HALF_WIDTH: f64 = 16.5 + GOAL_WIDTH / 2.0;
    pub const GOAL_BOX_DEPTH: f64 = 5.5;
    pub const GOAL_BOX_HALF_WIDTH: f64 = 5.5 + GOAL_WIDTH / 2.0;
    pub const PENALTY_SPOT_DISTANCE: f64 = 11.0;
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum FieldError {
    #[error("pitch dimensions must be finite and positive (length={length}, width={width})")]
    InvalidDimensions { length: f64, width: f64 },
    #[error(
        "pitch {length}x{width} is too small to hold the penalty boxes \
         (need length > {min_length} and width > {min_width})"
    )]
    TooSmall {
        length: f64,
        width: f64,
        min_length: f64,
        min_width: f64,
    },
}

/// Playing area size: `length` along the x axis (goal to goal), `width`
/// along y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitchDimensions {
    pub length: f64,
    pub width: f64,
}

impl Default for PitchDimensions {
    fn default() -> Self {
        Self::fifa()
    }
}

impl PitchDimensions {
    /// FIFA recommended 105 x 68 m.
    pub const fn fifa() -> Self {
        Self {
            length: 105.0,
            width: 68.0,
        }
    }

    pub fn new(length: f64, width: f64) -> Result<Self, FieldError> {
        let dims = Self { length, width };
        dims.validate()?;
        Ok(dims)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        let (length, width) = (self.length, self.width);
        if !(length.is_finite() && width.is_finite() && length > 0.0 && width > 0.0) {
            return Err(FieldError::InvalidDimensions { length, width });
        }
        let min_length = 2.0 * (markings::PENALTY_SPOT_DISTANCE + markings::PENALTY_ARC_RADIUS);
        let min_width = 2.0 * markings::PENALTY_BOX_HALF_WIDTH;
        if length <= min_length || width <= min_width {
            return Err(FieldError::TooSmall {
                length,
                width,
                min_length,
                min_width,
            });
        }
        Ok(())
    }

    /// Random international-match pitch: whole metres, length in
    /// `100..110`, width in `64..75`.
    pub fn random_international<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            length: rng.random_range(100..110) as f64,
            width: rng.random_range(64..75) as f64,
        }
    }

    pub fn is_fifa(&self) -> bool {
        *self == Self::fifa()
    }
}
