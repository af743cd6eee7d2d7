//! Reference network import from GeoJSON.

use geo::{Geometry, MultiLineString};
use geojson::{Feature, GeoJson};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::FieldsConfig;
use crate::error::{LocateError, Result};
use crate::models::{LaneCount, NetworkSegment};

const KIND: &str = "network";

/// Read network sections from a GeoJSON FeatureCollection of
/// LineString / MultiLineString features.
pub fn read_network(path: &Path, fields: &FieldsConfig) -> Result<Vec<NetworkSegment>> {
    info!("Loading network from {}", path.display());

    if !path.exists() {
        return Err(LocateError::MissingInput {
            kind: KIND,
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let segments = parse_network(&content, fields)?;

    info!("Loaded {} network sections", segments.len());
    Ok(segments)
}

pub fn parse_network(content: &str, fields: &FieldsConfig) -> Result<Vec<NetworkSegment>> {
    let features = match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(LocateError::InvalidGeometry {
                feature: 0,
                reason: "expected features, found a bare geometry".to_string(),
            })
        }
    };

    let segments = features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| parse_feature(i, feature, fields))
        .collect::<Result<Vec<_>>>()?;

    if segments.is_empty() {
        return Err(LocateError::EmptyInput(KIND));
    }
    Ok(segments)
}

fn parse_feature(index: usize, feature: Feature, fields: &FieldsConfig) -> Result<NetworkSegment> {
    let invalid = |reason: String| LocateError::InvalidGeometry {
        feature: index,
        reason,
    };

    let section_id = feature
        .property(&fields.section)
        .and_then(property_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(format!("missing '{}' property", fields.section)))?;

    let lane_text = feature
        .property(&fields.lane_count)
        .and_then(property_text)
        .unwrap_or_default();
    let lane_count = LaneCount::parse(&lane_text).ok_or_else(|| LocateError::InvalidLaneCount {
        section: section_id.clone(),
        value: lane_text.clone(),
    })?;

    let geometry = feature
        .geometry
        .ok_or_else(|| invalid("no geometry".to_string()))?;
    let geometry: Geometry<f64> = geometry.try_into()?;
    let geometry = match geometry {
        Geometry::LineString(ls) => MultiLineString::new(vec![ls]),
        Geometry::MultiLineString(mls) => mls,
        other => {
            return Err(invalid(format!(
                "expected a line geometry, found {}",
                geometry_name(&other)
            )))
        }
    };

    if geometry.0.iter().all(|part| part.0.is_empty()) {
        return Err(invalid("empty line geometry".to_string()));
    }

    Ok(NetworkSegment::new(section_id, geometry, lane_count))
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
