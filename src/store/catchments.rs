use geojson::{Feature, FeatureCollection, JsonObject, Value};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::DepotCatchment;

/// Catchment polygons as a GeoJSON FeatureCollection
pub fn catchments_to_geojson(catchments: &[DepotCatchment]) -> FeatureCollection {
    let features = catchments
        .iter()
        .map(|c| {
            let mut properties = JsonObject::new();
            properties.insert("DEPOT".to_string(), c.depot_id().into());
            properties.insert("Easting".to_string(), c.depot.easting.into());
            properties.insert("Northing".to_string(), c.depot.northing.into());

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(Value::from(&c.boundary))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_catchments(path: &Path, catchments: &[DepotCatchment]) -> Result<()> {
    let collection = catchments_to_geojson(catchments);
    fs::write(path, serde_json::to_string_pretty(&collection)?)?;
    Ok(())
}
