//! Survey input parsing
//!
//! The planner consumes fully resolved values, so everything here turns
//! the raw served artifacts (no-fly-zone GeoJSON, sensor lists, word
//! tables) into those values. No network I/O happens in this crate:
//! callers fetch the documents and hand over strings, and tests substitute
//! static fixtures.

use std::collections::HashMap;

use glam::DVec2;
use serde::Deserialize;

use crate::error::{SurveyError, SurveyResult};
use crate::plan::geometry::NoFlyZone;
use crate::plan::state::Sensor;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

/// Parse no-fly zones from a GeoJSON FeatureCollection document.
///
/// Each feature must carry a Polygon geometry; only the outer ring is
/// used. GeoJSON rings repeat the first vertex at the end, so the
/// duplicate is dropped to keep the closing edge non-degenerate.
pub fn parse_no_fly_zones(geojson: &str) -> SurveyResult<Vec<NoFlyZone>> {
    let collection: FeatureCollection =
        serde_json::from_str(geojson).map_err(|source| SurveyError::Json {
            context: "no-fly zone GeoJSON",
            source,
        })?;

    let mut zones = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        if feature.geometry.kind != "Polygon" {
            return Err(SurveyError::NotAPolygon(index));
        }
        let rings: Vec<Vec<[f64; 2]>> =
            serde_json::from_value(feature.geometry.coordinates).map_err(|source| {
                SurveyError::Json {
                    context: "polygon coordinates",
                    source,
                }
            })?;
        let ring = rings.into_iter().next().unwrap_or_default();
        let mut vertices: Vec<DVec2> = ring
            .into_iter()
            .map(|[lng, lat]| DVec2::new(lng, lat))
            .collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        zones.push(NoFlyZone::new(vertices)?);
    }
    Ok(zones)
}

/// A sensor entry as served, before its location code is resolved
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRecord {
    /// Symbolic three-word location code
    pub location: String,
    /// Battery level, 0-100
    pub battery: f64,
    /// Raw reading; absent, "null" or "NaN" when the sensor did not report
    pub reading: Option<String>,
}

/// Parse the served sensor list JSON
pub fn parse_sensor_records(json: &str) -> SurveyResult<Vec<SensorRecord>> {
    serde_json::from_str(json).map_err(|source| SurveyError::Json {
        context: "sensor list",
        source,
    })
}

/// Resolves a symbolic location code to a coordinate
pub trait Geocoder {
    fn resolve(&self, location: &str) -> Option<DVec2>;
}

/// Geocoder backed by a word table document:
/// `{"dent.shins.cycle": {"lng": -3.1882, "lat": 55.9436}, ...}`
#[derive(Debug, Clone)]
pub struct WordTable(HashMap<String, DVec2>);

#[derive(Debug, Deserialize)]
struct WordEntry {
    lng: f64,
    lat: f64,
}

impl WordTable {
    pub fn from_json(json: &str) -> SurveyResult<Self> {
        let raw: HashMap<String, WordEntry> =
            serde_json::from_str(json).map_err(|source| SurveyError::Json {
                context: "word table",
                source,
            })?;
        Ok(Self(
            raw.into_iter()
                .map(|(code, entry)| (code, DVec2::new(entry.lng, entry.lat)))
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Geocoder for WordTable {
    fn resolve(&self, location: &str) -> Option<DVec2> {
        self.0.get(location).copied()
    }
}

/// Attach coordinates to raw sensor records.
///
/// Every location code must resolve; planning cannot start with an
/// unplaced sensor. Unreported readings ("null", "NaN" or empty) become
/// None on the resulting sensor.
pub fn resolve_sensors(
    records: Vec<SensorRecord>,
    geocoder: &impl Geocoder,
) -> SurveyResult<Vec<Sensor>> {
    records
        .into_iter()
        .map(|record| {
            let coord = geocoder
                .resolve(&record.location)
                .ok_or_else(|| SurveyError::UnknownLocation(record.location.clone()))?;
            let reading = record
                .reading
                .filter(|r| !r.is_empty() && r != "null" && r != "NaN");
            Ok(Sensor::new(Some(record.location), record.battery, reading, coord))
        })
        .collect()
}
