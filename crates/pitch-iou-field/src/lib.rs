//! Football pitch geometry.
//!
//! [`generate_field`] turns pitch dimensions into an immutable
//! [`FieldGeometry`]: a fixed-layout array of 245 ground-plane points and the
//! line segments joining them. The index layout is documented once in
//! [`layout`] and shared with the region catalog in `pitch-iou-metrics`.
//!
//! All lengths are metres; markings follow the IFAB Laws of the Game.

mod dimensions;
mod geometry;
pub mod layout;

pub use dimensions::{markings, FieldError, PitchDimensions};
pub use geometry::{generate_field, FieldGeometry, FieldOrigin, LineSegment};
