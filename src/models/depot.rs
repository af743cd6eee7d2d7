//! Maintenance depots and their catchment areas.

use geo::{Coord, Polygon};
use serde::{Deserialize, Serialize};

/// A depot site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    #[serde(rename = "DEPOT")]
    pub depot_id: String,
    #[serde(rename = "Easting")]
    pub easting: f64,
    #[serde(rename = "Northing")]
    pub northing: f64,
}

impl Depot {
    pub fn new(depot_id: impl Into<String>, easting: f64, northing: f64) -> Self {
        Self {
            depot_id: depot_id.into(),
            easting,
            northing,
        }
    }

    pub fn site(&self) -> Coord<f64> {
        Coord {
            x: self.easting,
            y: self.northing,
        }
    }
}

/// The region a depot is responsible for
#[derive(Debug, Clone)]
pub struct DepotCatchment {
    pub depot: Depot,
    pub boundary: Polygon<f64>,
}

impl DepotCatchment {
    pub fn depot_id(&self) -> &str {
        &self.depot.depot_id
    }

    /// Get the bounding box of this catchment
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        use geo::BoundingRect;
        self.boundary
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}
