//! Survey map rendering and flightpath formatting
//!
//! Turns a finished run into the two output artifacts: a GeoJSON map of
//! the flight path with color-coded sensor markers, and the plain-text
//! flightpath log for replay.

use std::fmt::Write as _;

use glam::DVec2;
use serde_json::{Value, json};

use crate::plan::state::{MoveRecord, Sensor};

/// Reading thresholds and their marker colors, low to high pollution
const COLOR_SCALE: [(i32, &str); 8] = [
    (0, "#00ff00"),
    (32, "#40ff00"),
    (64, "#80ff00"),
    (96, "#c0ff00"),
    (128, "#ffc000"),
    (160, "#ff8000"),
    (192, "#ff4000"),
    (224, "#ff0000"),
];

/// Marker color for a rounded reading value.
///
/// Out-of-range values mean the sensor did not report and render black.
pub fn reading_color(value: i32) -> &'static str {
    if !(0..=255).contains(&value) {
        return "#000000";
    }
    COLOR_SCALE
        .iter()
        .rev()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, color)| *color)
        .unwrap_or("#000000")
}

/// Marker symbol for a rounded reading value
pub fn marker_symbol(value: i32) -> &'static str {
    if !(0..=255).contains(&value) {
        "cross"
    } else if value < 128 {
        "lighthouse"
    } else {
        "danger"
    }
}

/// Rounded numeric reading, or -1 when the sensor did not report one
fn rounded_reading(sensor: &Sensor) -> i32 {
    sensor
        .reading
        .as_deref()
        .and_then(|raw| raw.parse::<f64>().ok())
        .map(|value| value.round() as i32)
        .unwrap_or(-1)
}

/// Marker color and symbol for one sensor.
///
/// A battery at or below 10% makes the reading untrustworthy, so the
/// sensor renders as unreported. Sensors never visited render gray with
/// no symbol regardless of their reading.
pub fn sensor_marker(sensor: &Sensor) -> (&'static str, &'static str) {
    if !sensor.visited {
        return ("#aaaaaa", "");
    }
    let mut value = rounded_reading(sensor);
    if sensor.battery <= 10.0 {
        value = -1;
    }
    (reading_color(value), marker_symbol(value))
}

/// Render the survey result map: one Point feature per sensor plus a
/// LineString feature of the full committed path.
pub fn render_map(sensors: &[Sensor], path: &[DVec2]) -> Value {
    let mut features: Vec<Value> = sensors
        .iter()
        .map(|sensor| {
            let (rgb, symbol) = sensor_marker(sensor);
            json!({
                "type": "Feature",
                "properties": {
                    "location": sensor.location.as_deref().unwrap_or("null"),
                    "rgb-string": rgb,
                    "marker-color": rgb,
                    "marker-symbol": symbol,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [sensor.coord.x, sensor.coord.y],
                },
            })
        })
        .collect();

    let coordinates: Vec<Value> = path.iter().map(|p| json!([p.x, p.y])).collect();
    features.push(json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
    }));

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Format the move log as flightpath text, one committed move per line:
/// `index,from_lng,from_lat,heading,to_lng,to_lat,location`
pub fn format_flightpath(log: &[MoveRecord]) -> String {
    let mut out = String::new();
    for record in log {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            record.index,
            record.from.x,
            record.from.y,
            record.heading.degrees(),
            record.to.x,
            record.to.y,
            record.read.as_deref().unwrap_or("null"),
        );
    }
    out
}
