//! Annual climate-hazard indicators from daily gridded climate data.
//!
//! Pipeline:
//!   daily series (via [`source::DailySource`]) → year / scenario filter →
//!   hazard definition → streak scan | antecedent index | direct reduction →
//!   one annual raster per (hazard, year, model).

pub mod antecedent;
pub mod calendar;
pub mod error;
pub mod hazards;
pub mod layers;
pub mod raster;
pub mod registry;
pub mod source;
pub mod streak;
pub mod synthetic;
pub mod units;

pub use error::{HazardError, Result};
pub use hazards::{HazardFn, HazardRequest};
pub use layers::HazardLayers;
pub use raster::{Counts, Grid, Mask, Raster};
pub use registry::{HazardDef, Variable};
pub use source::{DailySource, MemorySeries};
