//! Error types for hazard computation.
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for hazard computation.
///
/// `Configuration`, `UnknownHazard`, `DataGap`, `ShapeMismatch` and
/// `EmptySeries` are caller contract violations. `Remote` is raised by
/// data-source adapters and is never retried here.
#[derive(Error, Debug)]
pub enum HazardError {
    /// Bad or missing configuration (model percentile, run length, ...)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Hazard name not present in the registry
    #[error("unknown hazard: {0}")]
    UnknownHazard(String),

    /// A daily raster required by the computation is absent
    #[error("no daily raster for {date} (scenario: {scenario})")]
    DataGap { date: NaiveDate, scenario: String },

    /// Two rasters combined cellwise have different grid shapes
    #[error("raster shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A fold or scan was asked to run over zero rasters
    #[error("empty raster series: {0}")]
    EmptySeries(&'static str),

    /// The external raster service failed to evaluate a request
    #[error("remote evaluation failed: {0}")]
    Remote(String),

    /// Hazard declared but without a definition
    #[error("hazard `{0}` is not implemented")]
    Unimplemented(&'static str),

    /// Failed to decode a JSON document
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results using HazardError
pub type Result<T> = std::result::Result<T, HazardError>;
