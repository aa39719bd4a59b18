//! Index layout of the 245-point field array.
//!
//! | index     | content                                   |
//! |-----------|-------------------------------------------|
//! | 0         | centre spot (origin)                      |
//! | 1..=4     | corners: (-,-), (-,+), (+,+), (+,-)       |
//! | 5, 6      | halfway line, top then bottom             |
//! | 7..=10    | left penalty box                          |
//! | 11..=14   | right penalty box                         |
//! | 15..=18   | left goal box                             |
//! | 19..=22   | right goal box                            |
//! | 23, 24    | left and right penalty spots              |
//! | 25..145   | centre circle, 120 samples from 0 deg     |
//! | 145..195  | left penalty arc, 50 samples              |
//! | 195..245  | right penalty arc, 50 samples             |
//!
//! Box corners run goal line (top), box line (top), box line (bottom),
//! goal line (bottom).

use std::ops::Range;

pub const POINT_COUNT: usize = 245;
/// Capacity of the reference line table; the generator uses 234 of them.
pub const LINE_SLOTS: usize = 235;

pub const CENTER_SPOT: usize = 0;
pub const CORNERS: [usize; 4] = [1, 2, 3, 4];
pub const HALFWAY_LINE: [usize; 2] = [5, 6];
pub const PENALTY_BOX_LEFT: [usize; 4] = [7, 8, 9, 10];
pub const PENALTY_BOX_RIGHT: [usize; 4] = [11, 12, 13, 14];
pub const GOAL_BOX_LEFT: [usize; 4] = [15, 16, 17, 18];
pub const GOAL_BOX_RIGHT: [usize; 4] = [19, 20, 21, 22];
pub const PENALTY_SPOT_LEFT: usize = 23;
pub const PENALTY_SPOT_RIGHT: usize = 24;

pub const CENTER_CIRCLE_START: usize = 25;
pub const CENTER_CIRCLE_SAMPLES: usize = 120;
pub const PENALTY_ARC_LEFT_START: usize = 145;
pub const PENALTY_ARC_RIGHT_START: usize = 195;
pub const PENALTY_ARC_SAMPLES: usize = 50;

pub const fn center_circle() -> Range<usize> {
    CENTER_CIRCLE_START..CENTER_CIRCLE_START + CENTER_CIRCLE_SAMPLES
}

pub const fn penalty_arc_left() -> Range<usize> {
    PENALTY_ARC_LEFT_START..PENALTY_ARC_LEFT_START + PENALTY_ARC_SAMPLES
}

pub const fn penalty_arc_right() -> Range<usize> {
    PENALTY_ARC_RIGHT_START..PENALTY_ARC_RIGHT_START + PENALTY_ARC_SAMPLES
}

const _: () = assert!(center_circle().end == PENALTY_ARC_LEFT_START);
const _: () = assert!(penalty_arc_left().end == PENALTY_ARC_RIGHT_START);
const _: () = assert!(penalty_arc_right().end == POINT_COUNT);
