//! Reference road network types.

use geo::{BoundingRect, MultiLineString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of running lanes on a section, as recorded on the network ("1L".."4L")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LaneCount {
    One,
    Two,
    Three,
    Four,
}

impl LaneCount {
    /// Number of lanes as an integer
    pub fn lanes(&self) -> u8 {
        match self {
            LaneCount::One => 1,
            LaneCount::Two => 2,
            LaneCount::Three => 3,
            LaneCount::Four => 4,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LaneCount::One => "1L",
            LaneCount::Two => "2L",
            LaneCount::Three => "3L",
            LaneCount::Four => "4L",
        }
    }

    /// Parse the network's lane code. Accepts "2L", "2l" and a bare "2".
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        let digits = code
            .strip_suffix('L')
            .or_else(|| code.strip_suffix('l'))
            .unwrap_or(code);
        match digits {
            "1" => Some(LaneCount::One),
            "2" => Some(LaneCount::Two),
            "3" => Some(LaneCount::Three),
            "4" => Some(LaneCount::Four),
            _ => None,
        }
    }
}

impl fmt::Display for LaneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for LaneCount {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LaneCount::parse(&value).ok_or_else(|| format!("unknown lane count '{}'", value))
    }
}

impl From<LaneCount> for String {
    fn from(value: LaneCount) -> Self {
        value.code().to_string()
    }
}

/// A section of the reference network.
///
/// Vertex order is the direction of travel: chainage grows from the first
/// coordinate of the first part towards the last coordinate of the last part.
#[derive(Debug, Clone)]
pub struct NetworkSegment {
    pub section_id: String,
    pub geometry: MultiLineString<f64>,
    pub lane_count: LaneCount,
}

impl NetworkSegment {
    pub fn new(
        section_id: impl Into<String>,
        geometry: MultiLineString<f64>,
        lane_count: LaneCount,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            geometry,
            lane_count,
        }
    }

    /// Total travelled length of all parts
    pub fn length(&self) -> f64 {
        self.geometry
            .0
            .iter()
            .flat_map(|part| part.lines())
            .map(|line| line.dx().hypot(line.dy()))
            .sum()
    }

    /// Get the bounding box of this section
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}
