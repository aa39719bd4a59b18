//! Named field regions and the point indices that outline them.

use crate::error::MetricsError;
use pitch_iou_field::layout;
use serde::{Deserialize, Serialize};

/// The eight scored areas of a pitch, in scoring order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Pitch,
    PenaltyBoxRight,
    GoalBoxRight,
    PenaltyArcRight,
    CenterCircle,
    PenaltyBoxLeft,
    GoalBoxLeft,
    PenaltyArcLeft,
}

/// Polygon outline as indices into the field point array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionIndices {
    Quad([usize; 4]),
    /// `count` consecutive samples from `start`; the fill closes the chord.
    Run { start: usize, count: usize },
}

impl RegionIndices {
    pub fn len(&self) -> usize {
        match self {
            RegionIndices::Quad(q) => q.len(),
            RegionIndices::Run { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn max_index(&self) -> usize {
        match self {
            RegionIndices::Quad([a, b, c, d]) => max(max(*a, *b), max(*c, *d)),
            RegionIndices::Run { start, count } => *start + *count - 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let (quad, run) = match *self {
            RegionIndices::Quad(ref q) => (Some(q.iter().copied()), None),
            RegionIndices::Run { start, count } => (None, Some(start..start + count)),
        };
        quad.into_iter().flatten().chain(run.into_iter().flatten())
    }
}

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

/// Catalog entry for one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionSpec {
    pub region: Region,
    pub name: &'static str,
    pub polygon: RegionIndices,
    /// Nested region carved out when scoring this one.
    pub subtract: Option<Region>,
    /// Mask value used when this region is painted.
    pub label: u8,
}

// Box outlines start at the box-line top corner and end on the goal line.
const fn box_outline(b: [usize; 4]) -> RegionIndices {
    RegionIndices::Quad([b[1], b[2], b[3], b[0]])
}

const CATALOG: [RegionSpec; 8] = [
    RegionSpec {
        region: Region::Pitch,
        name: "pitch",
        polygon: RegionIndices::Quad([
            layout::CORNERS[1],
            layout::CORNERS[2],
            layout::CORNERS[3],
            layout::CORNERS[0],
        ]),
        subtract: Some(Region::PenaltyBoxRight),
        label: 1,
    },
    RegionSpec {
        region: Region::PenaltyBoxRight,
        name: "penalty box right",
        polygon: box_outline(layout::PENALTY_BOX_RIGHT),
        subtract: Some(Region::GoalBoxRight),
        label: 2,
    },
    RegionSpec {
        region: Region::GoalBoxRight,
        name: "goal box right",
        polygon: box_outline(layout::GOAL_BOX_RIGHT),
        subtract: None,
        label: 3,
    },
    RegionSpec {
        region: Region::PenaltyArcRight,
        name: "penalty arc right",
        polygon: RegionIndices::Run {
            start: layout::PENALTY_ARC_RIGHT_START,
            count: layout::PENALTY_ARC_SAMPLES,
        },
        subtract: None,
        label: 4,
    },
    RegionSpec {
        region: Region::CenterCircle,
        name: "center circle",
        polygon: RegionIndices::Run {
            start: layout::CENTER_CIRCLE_START,
            count: layout::CENTER_CIRCLE_SAMPLES,
        },
        subtract: None,
        label: 5,
    },
    RegionSpec {
        region: Region::PenaltyBoxLeft,
        name: "penalty box left",
        polygon: box_outline(layout::PENALTY_BOX_LEFT),
        subtract: Some(Region::GoalBoxLeft),
        label: 6,
    },
    RegionSpec {
        region: Region::GoalBoxLeft,
        name: "goal box left",
        polygon: box_outline(layout::GOAL_BOX_LEFT),
        subtract: None,
        label: 7,
    },
    RegionSpec {
        region: Region::PenaltyArcLeft,
        name: "penalty arc left",
        polygon: RegionIndices::Run {
            start: layout::PENALTY_ARC_LEFT_START,
            count: layout::PENALTY_ARC_SAMPLES,
        },
        subtract: None,
        label: 8,
    },
];

const fn catalog_is_consistent() -> bool {
    let mut i = 0;
    while i < CATALOG.len() {
        let spec = &CATALOG[i];
        if spec.region as usize != i
            || spec.label as usize != i + 1
            || spec.polygon.max_index() >= layout::POINT_COUNT
        {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(catalog_is_consistent());

impl Region {
    /// Scoring order: pitch, right side, centre circle, left side.
    pub const ALL: [Region; 8] = [
        Region::Pitch,
        Region::PenaltyBoxRight,
        Region::GoalBoxRight,
        Region::PenaltyArcRight,
        Region::CenterCircle,
        Region::PenaltyBoxLeft,
        Region::GoalBoxLeft,
        Region::PenaltyArcLeft,
    ];

    pub fn spec(self) -> &'static RegionSpec {
        &CATALOG[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn label(self) -> u8 {
        self.spec().label
    }

    pub fn subtract(self) -> Option<Region> {
        self.spec().subtract
    }

    pub fn polygon(self) -> RegionIndices {
        self.spec().polygon
    }

    /// Look a region up by its catalog name.
    pub fn from_name(name: &str) -> Option<Region> {
        CATALOG.iter().find(|s| s.name == name).map(|s| s.region)
    }
}

/// Ordered outline indices of `region`.
pub fn region_polygon(region: Region) -> Vec<usize> {
    region.polygon().iter().collect()
}

/// Gather the outline of `region` from a point array in field layout.
pub fn region_polygon_points<P: Copy>(region: Region, points: &[P]) -> Result<Vec<P>, MetricsError> {
    let poly = region.polygon();
    let needed = poly.max_index();
    if needed >= points.len() {
        return Err(MetricsError::MissingPoints {
            region,
            needed,
            got: points.len(),
        });
    }
    Ok(poly.iter().map(|i| points[i]).collect())
}
