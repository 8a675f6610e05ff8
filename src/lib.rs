//! Skysweep - greedy flight planning for drone sensor surveys
//!
//! Core modules:
//! - `plan`: Deterministic movement planner (geometry, state machine, run log)
//! - `loader`: No-fly zone / sensor parsing and symbolic location resolution
//! - `map`: GeoJSON map rendering and flightpath log formatting
//! - `config`: Data-driven planner constants

pub mod config;
pub mod error;
pub mod loader;
pub mod map;
pub mod plan;

pub use config::{Bounds, PlanConfig};
pub use error::{SurveyError, SurveyResult};

/// Legacy planner constants
pub mod consts {
    /// Maximum number of moves in one survey run
    pub const DEFAULT_MOVE_BUDGET: u32 = 150;
    /// Distance covered by a single move, in coordinate degrees
    pub const STEP_DISTANCE: f64 = 0.0003;
    /// A sensor is read when the drone gets within this distance of it
    pub const SENSOR_VISIT_RADIUS: f64 = 0.0002;
    /// The return leg ends when the drone gets within this distance of start
    pub const RETURN_VISIT_RADIUS: f64 = 0.0003;
    /// Consecutive zone deflections allowed before a random escape is forced
    pub const MAX_CONSECUTIVE_DEFLECTIONS: u32 = 4;

    /// Operating rectangle (exclusive bounds)
    pub const NORTH_LAT: f64 = 55.946233;
    pub const SOUTH_LAT: f64 = 55.942617;
    pub const EAST_LNG: f64 = -3.184319;
    pub const WEST_LNG: f64 = -3.192473;
}
