//! Error types for survey input, output, and planning setup.
//!
//! The planner loop itself has no fatal errors: blocked or out-of-bounds
//! moves are recovered locally and budget exhaustion is a normal outcome.
//! Everything here belongs to the boundary (parsing, geocoding, file I/O).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while preparing or persisting a survey run.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// A no-fly zone polygon with fewer than three vertices.
    #[error("No-fly zone has {0} vertices (need at least 3)")]
    DegenerateZone(usize),

    /// A GeoJSON feature whose geometry is not a polygon.
    #[error("No-fly zone feature {0} is not a Polygon")]
    NotAPolygon(usize),

    /// Malformed JSON input.
    #[error("Failed to parse {context}: {source}")]
    Json {
        /// What was being parsed.
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A sensor location code missing from the word table.
    #[error("No coordinates known for location '{0}'")]
    UnknownLocation(String),

    /// IO error reading an input or writing an output artifact.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for survey operations.
pub type SurveyResult<T> = std::result::Result<T, SurveyError>;
