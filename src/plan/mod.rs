//! Deterministic movement planning
//!
//! The whole planning run lives here. This module must be pure and
//! deterministic:
//! - Seeded RNG only (same seed, zones, sensors and start replay the exact
//!   same path and log)
//! - Stable iteration order (zones in load order, sensors in list order)
//! - No I/O or platform dependencies

pub mod geometry;
pub mod planner;
pub mod state;

pub use geometry::{NoFlyZone, blocking_deflection, quantized_bearing, segments_intersect};
pub use planner::{HeadingSource, PlanResult, Planner, SeededHeadings};
pub use state::{Heading, MoveRecord, Phase, Sensor, nearest_sensor};
