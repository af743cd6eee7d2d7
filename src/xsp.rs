//! Cross-sectional position (XSP) classification.
//!
//! Maps a signed centreline offset to the lane or shoulder it falls in.
//! Assumes a hard shoulder everywhere on the nearside (positive offsets) and
//! running lanes numbered outwards from it on the negative side.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::LaneCount;

/// Hard shoulder width, in coordinate units
pub const HARD_SHOULDER_WIDTH: f64 = 3.3;

/// Running lane width, in coordinate units
pub const LANE_WIDTH: f64 = 3.6;

// Outer edge of lanes 1..=4
const LANE_EDGES: [f64; 4] = [-3.6, -7.2, -10.8, -14.4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanePosition {
    #[serde(rename = "Hard Shoulder")]
    HardShoulder,
    #[serde(rename = "Lane 1")]
    Lane1,
    #[serde(rename = "Lane 2")]
    Lane2,
    #[serde(rename = "Lane 3")]
    Lane3,
    #[serde(rename = "Lane 4")]
    Lane4,
    #[serde(rename = "Off Carriageway")]
    OffCarriageway,
}

impl LanePosition {
    pub fn label(&self) -> &'static str {
        match self {
            LanePosition::HardShoulder => "Hard Shoulder",
            LanePosition::Lane1 => "Lane 1",
            LanePosition::Lane2 => "Lane 2",
            LanePosition::Lane3 => "Lane 3",
            LanePosition::Lane4 => "Lane 4",
            LanePosition::OffCarriageway => "Off Carriageway",
        }
    }

    fn lane(number: u8) -> Self {
        match number {
            1 => LanePosition::Lane1,
            2 => LanePosition::Lane2,
            3 => LanePosition::Lane3,
            4 => LanePosition::Lane4,
            _ => LanePosition::OffCarriageway,
        }
    }
}

impl fmt::Display for LanePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the lane-count condition on lanes 2-4 is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneGuard {
    /// Lane N is only reported when the section has at least N lanes
    #[default]
    Enforced,
    /// Reproduce the historical field calculation, whose range tests for
    /// lanes 2-4 were always true: anything beyond lane 1 becomes "Lane 2"
    /// on multi-lane sections and "Lane 3" on single-lane ones.
    Legacy,
}

/// Classify an offset with the lane-count guard enforced
pub fn classify(offset: f64, lane_count: LaneCount) -> LanePosition {
    classify_with(offset, lane_count, LaneGuard::Enforced)
}

/// Classify an offset. First matching band wins.
pub fn classify_with(offset: f64, lane_count: LaneCount, guard: LaneGuard) -> LanePosition {
    if offset > 0.0 && offset <= HARD_SHOULDER_WIDTH {
        return LanePosition::HardShoulder;
    }
    if offset <= 0.0 && offset >= LANE_EDGES[0] {
        return LanePosition::Lane1;
    }

    match guard {
        LaneGuard::Enforced => {
            for lane in 2..=4u8 {
                let inner = LANE_EDGES[lane as usize - 2];
                let outer = LANE_EDGES[lane as usize - 1];
                if offset < inner && offset >= outer && lane_count.lanes() >= lane {
                    return LanePosition::lane(lane);
                }
            }
            LanePosition::OffCarriageway
        }
        LaneGuard::Legacy => {
            if lane_count != LaneCount::One {
                LanePosition::Lane2
            } else {
                LanePosition::Lane3
            }
        }
    }
}
