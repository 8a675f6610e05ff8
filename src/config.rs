//! Planner configuration
//!
//! All tunable constants for a survey run. Defaults reproduce the legacy
//! behavior exactly, so a default-config run with a fixed seed replays the
//! historical flight paths.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Rectangular operating area (exclusive on all four sides)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north_lat: f64,
    pub south_lat: f64,
    pub east_lng: f64,
    pub west_lng: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            north_lat: NORTH_LAT,
            south_lat: SOUTH_LAT,
            east_lng: EAST_LNG,
            west_lng: WEST_LNG,
        }
    }
}

impl Bounds {
    /// Strict containment: points exactly on a boundary are out of bounds
    pub fn contains(&self, point: DVec2) -> bool {
        point.y > self.south_lat
            && point.y < self.north_lat
            && point.x < self.east_lng
            && point.x > self.west_lng
    }
}

/// Constants governing a single planning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Move budget for the whole run
    pub budget: u32,
    /// Per-move displacement in coordinate degrees
    pub step_distance: f64,
    /// Visit radius for real sensors
    pub sensor_visit_radius: f64,
    /// Visit radius for the final return-to-start waypoint
    pub return_visit_radius: f64,
    /// Consecutive deflections tolerated before a random escape heading
    pub max_deflections: u32,
    /// Operating rectangle
    pub bounds: Bounds,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_MOVE_BUDGET,
            step_distance: STEP_DISTANCE,
            sensor_visit_radius: SENSOR_VISIT_RADIUS,
            return_visit_radius: RETURN_VISIT_RADIUS,
            max_deflections: MAX_CONSECUTIVE_DEFLECTIONS,
            bounds: Bounds::default(),
        }
    }
}

impl PlanConfig {
    /// Load a config from JSON, falling back to defaults on any field absent
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
