//! Unit conversions that depend on where a series came from.

use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// Seconds per day; converts a kg m⁻² s⁻¹ flux to mm/day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Observational precipitation scale applied before the seconds-per-day factor.
pub const OBSERVED_PR_SCALE: f64 = 0.011_574_074_074_074_073;
pub const KELVIN_OFFSET: f64 = 273.15;

/// Origin of a daily series. Modeled series carry a scenario label and
/// precipitation in kg m⁻² s⁻¹; observed series are unlabeled and use their
/// own precipitation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Modeled,
    Observed,
}

impl DataSource {
    pub fn from_observed_flag(observed: bool) -> Self {
        if observed {
            DataSource::Observed
        } else {
            DataSource::Modeled
        }
    }

    /// Multiplier taking native precipitation to mm/day.
    pub fn precip_mm_factor(self) -> f64 {
        match self {
            DataSource::Modeled => SECONDS_PER_DAY,
            DataSource::Observed => OBSERVED_PR_SCALE * SECONDS_PER_DAY,
        }
    }

    /// Multiplier taking native precipitation to 0.1 mm/day, the unit of
    /// the antecedent rainfall thresholds.
    pub fn precip_ari_factor(self) -> f64 {
        match self {
            DataSource::Modeled => 864_000.0,
            DataSource::Observed => 10_000.0,
        }
    }

    pub fn precip_to_mm(self, raster: &Raster) -> Raster {
        raster.scale(self.precip_mm_factor())
    }

    pub fn precip_to_ari_units(self, raster: &Raster) -> Raster {
        raster.scale(self.precip_ari_factor())
    }
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}
