use crate::dimensions::{markings, FieldError, PitchDimensions};
use crate::layout;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Where the coordinate origin sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrigin {
    /// Centre spot at `(0, 0)`; the pitch spans `[-L/2, L/2] x [-W/2, W/2]`.
    Center,
    /// Bottom-left corner at `(0, 0)`; the pitch spans `[0, L] x [0, W]`.
    #[default]
    Corner,
}

/// Segment between two point indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub dashed: bool,
}

impl LineSegment {
    const fn solid(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            dashed: false,
        }
    }
}

/// Immutable pitch model: 245 ground-plane points plus line topology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    dimensions: PitchDimensions,
    origin: FieldOrigin,
    points: Vec<Point2<f64>>,
    lines: Vec<LineSegment>,
}

impl FieldGeometry {
    pub fn dimensions(&self) -> PitchDimensions {
        self.dimensions
    }

    pub fn origin(&self) -> FieldOrigin {
        self.origin
    }

    /// Points in [`layout`] order.
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Points lifted onto the `z = 0` plane.
    pub fn points_3d(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect()
    }

    pub fn lines(&self) -> &[LineSegment] {
        &self.lines
    }

    pub fn point(&self, index: usize) -> Option<Point2<f64>> {
        self.points.get(index).copied()
    }

    /// Endpoints of every line segment.
    pub fn segments(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        self.lines
            .iter()
            .map(|l| (self.points[l.start], self.points[l.end]))
    }
}

fn arc_samples(
    center_x: f64,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    samples: usize,
) -> impl Iterator<Item = Point2<f64>> {
    let step = (end_deg - start_deg) / samples as f64;
    (0..samples).map(move |i| {
        let (s, c) = (start_deg + i as f64 * step).to_radians().sin_cos();
        Point2::new(radius * c + center_x, radius * s)
    })
}

/// Build the point array and line table for a pitch of size `dims`.
///
/// The penalty arcs are sampled over the part outside the penalty box, the
/// end point excluded; their sweep is fixed in degrees, so on boxes of
/// other sizes they do not meet the box line exactly.
pub fn generate_field(
    dims: PitchDimensions,
    origin: FieldOrigin,
) -> Result<FieldGeometry, FieldError> {
    dims.validate()?;
    let hl = dims.length / 2.0;
    let hw = dims.width / 2.0;
    let pb_w = markings::PENALTY_BOX_HALF_WIDTH;
    let pb_d = markings::PENALTY_BOX_DEPTH;
    let gb_w = markings::GOAL_BOX_HALF_WIDTH;
    let gb_d = markings::GOAL_BOX_DEPTH;
    let spot = markings::PENALTY_SPOT_DISTANCE;

    let mut points = vec![Point2::origin(); layout::POINT_COUNT];
    let mut lines = Vec::with_capacity(layout::LINE_SLOTS);

    let mut put = |idx: usize, x: f64, y: f64| points[idx] = Point2::new(x, y);

    put(layout::CENTER_SPOT, 0.0, 0.0);

    let [c1, c2, c3, c4] = layout::CORNERS;
    put(c1, -hl, -hw);
    put(c2, -hl, hw);
    put(c3, hl, hw);
    put(c4, hl, -hw);

    let [h1, h2] = layout::HALFWAY_LINE;
    put(h1, 0.0, hw);
    put(h2, 0.0, -hw);

    // Boxes: goal line top, box line top, box line bottom, goal line bottom.
    let boxes = [
        (layout::PENALTY_BOX_LEFT, -hl, pb_d, pb_w),
        (layout::PENALTY_BOX_RIGHT, hl, -pb_d, pb_w),
        (layout::GOAL_BOX_LEFT, -hl, gb_d, gb_w),
        (layout::GOAL_BOX_RIGHT, hl, -gb_d, gb_w),
    ];
    for ([a, b, c, d], goal_x, depth, half_w) in boxes {
        put(a, goal_x, half_w);
        put(b, goal_x + depth, half_w);
        put(c, goal_x + depth, -half_w);
        put(d, goal_x, -half_w);
    }

    put(layout::PENALTY_SPOT_LEFT, -hl + spot, 0.0);
    put(layout::PENALTY_SPOT_RIGHT, hl - spot, 0.0);

    let circles = [
        (
            layout::center_circle(),
            0.0,
            markings::CENTER_CIRCLE_RADIUS,
            0.0,
            360.0,
        ),
        (
            layout::penalty_arc_left(),
            -hl + spot,
            markings::PENALTY_ARC_RADIUS,
            360.0 - 53.05,
            360.0 + 54.8,
        ),
        (
            layout::penalty_arc_right(),
            hl - spot,
            markings::PENALTY_ARC_RADIUS,
            180.0 - 53.05,
            180.0 + 55.0,
        ),
    ];
    for (range, cx, r, start_deg, end_deg) in circles.iter().cloned() {
        for (idx, p) in range.clone().zip(arc_samples(cx, r, start_deg, end_deg, range.len())) {
            put(idx, p.x, p.y);
        }
    }

    lines.extend([
        LineSegment::solid(c1, c2),
        LineSegment::solid(c1, c4),
        LineSegment::solid(c2, c3),
        LineSegment::solid(c3, c4),
        LineSegment::solid(h1, h2),
    ]);
    for [a, b, c, d] in [
        layout::PENALTY_BOX_LEFT,
        layout::PENALTY_BOX_RIGHT,
        layout::GOAL_BOX_LEFT,
        layout::GOAL_BOX_RIGHT,
    ] {
        lines.extend([
            LineSegment::solid(a, b),
            LineSegment::solid(b, c),
            LineSegment::solid(c, d),
        ]);
    }
    for (range, ..) in &circles {
        lines.extend(
            range
                .clone()
                .skip(1)
                .map(|i| LineSegment::solid(i - 1, i)),
        );
    }

    if origin == FieldOrigin::Corner {
        for p in &mut points {
            p.x += hl;
            p.y += hw;
        }
    }

    Ok(FieldGeometry {
        dimensions: dims,
        origin,
        points,
        lines,
    })
}
