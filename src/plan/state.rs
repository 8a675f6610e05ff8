//! Run state and core planning types
//!
//! Everything the planner mutates during a run is owned by the planner;
//! sensors move between the unvisited and visited pools by value, never
//! aliased across both.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Travel direction quantized to the 10-degree grid, in [0, 350]
///
/// Both travel and deflection headings come off the same grid, so
/// oscillation checks are exact integer comparisons with no float
/// near-equality involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading(u16);

impl Heading {
    /// Number of distinct headings on the grid
    pub const COUNT: u16 = 36;

    /// Heading from a grid index in 0..36
    pub fn from_index(index: u16) -> Self {
        debug_assert!(index < Self::COUNT);
        Self(index * 10)
    }

    /// Degrees, always a multiple of 10 in [0, 350]
    #[inline]
    pub fn degrees(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        f64::from(self.0).to_radians()
    }

    /// The reverse direction on the grid
    pub fn opposite(self) -> Self {
        Self((self.0 + 180) % 360)
    }

    /// Unit displacement vector for this heading
    pub fn unit(self) -> DVec2 {
        let radians = self.radians();
        DVec2::new(radians.cos(), radians.sin())
    }
}

/// Current phase of a planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Unvisited sensors remain
    Seeking,
    /// All sensors read; heading back to the start point
    Returning,
    /// Run ended
    Done,
}

/// A point of interest the drone must approach closely enough to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Symbolic three-word location code, if the sensor carries one
    pub location: Option<String>,
    /// Battery level, 0-100
    pub battery: f64,
    /// Raw reading; None when the sensor did not report
    pub reading: Option<String>,
    /// Resolved coordinate the drone aims for
    pub coord: DVec2,
    /// Set exactly once, when the planner confirms the visit
    pub visited: bool,
}

impl Sensor {
    pub fn new(location: Option<String>, battery: f64, reading: Option<String>, coord: DVec2) -> Self {
        Self {
            location,
            battery,
            reading,
            coord,
            visited: false,
        }
    }
}

/// One committed move, for audit and replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based move index
    pub index: u32,
    /// Position before the move
    pub from: DVec2,
    /// Heading the move was made on
    pub heading: Heading,
    /// Position after the move
    pub to: DVec2,
    /// Location code of the sensor read on this move, if any
    pub read: Option<String>,
}

/// Index of the sensor nearest to `from` by straight-line distance.
///
/// Ties resolve to whichever candidate comes first in iteration order;
/// callers must not rely on a specific tie winner. Panics on an empty
/// slice - the planner never selects from an empty pool while running.
pub fn nearest_sensor(sensors: &[Sensor], from: DVec2) -> usize {
    sensors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.coord
                .distance(from)
                .partial_cmp(&b.coord.distance(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .expect("sensor selection on an empty pool")
}
