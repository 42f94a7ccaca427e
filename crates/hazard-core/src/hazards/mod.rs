//! Annual hazard definitions.
//!
//! Every definition has the same shape ([`HazardFn`]): it reads one daily
//! variable through a [`DailySource`], consults the static [`HazardLayers`],
//! and returns one raster summarising `request.year`.
//!
//! Definitions:
//!   drought:   `ds` (dry-spell count), `maxdryspell` (longest dry run)
//!   heat:      `mtt35`, `ehe`, `ece` (not implemented)
//!   precip:    `epe`, `totalprecip`, `maxprecip`
//!   landslide: `modlandslide`, `highlandslide`

pub mod drought;
pub mod heat;
pub mod landslide;
pub mod precip;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{ModelCalendar, Scenario};
use crate::error::{HazardError, Result};
use crate::layers::HazardLayers;
use crate::raster::{Counts, Mask, Raster};
use crate::source::DailySource;
use crate::units::DataSource;

pub use drought::{dry_spells, max_dry_spell};
pub use heat::{extreme_cold_events, extreme_heat_days, hot_days};
pub use landslide::{high_landslide_days, landslide_days, moderate_landslide_days};
pub use precip::{extreme_precip_days, max_precip, total_precip};

/// Signature shared by all hazard definitions.
pub type HazardFn = fn(&dyn DailySource, &HazardLayers, &HazardRequest) -> Result<Raster>;

/// One (year, model, data source) invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardRequest {
    pub year: i32,
    /// Climate model name; `None` selects cross-model mean percentiles and a
    /// Gregorian calendar.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub data_source: DataSource,
}

impl HazardRequest {
    pub fn modeled(year: i32, model: &str) -> Self {
        Self {
            year,
            model: Some(model.to_string()),
            data_source: DataSource::Modeled,
        }
    }

    pub fn observed(year: i32) -> Self {
        Self {
            year,
            model: None,
            data_source: DataSource::Observed,
        }
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn calendar(&self) -> ModelCalendar {
        ModelCalendar::for_model(self.model())
    }

    /// Scenario filter for data dated in `year`: modeled series are split at
    /// the historical/RCP8.5 boundary, observed series are unlabeled.
    pub fn scenario_for(&self, year: i32) -> Option<Scenario> {
        match self.data_source {
            DataSource::Modeled => Some(Scenario::for_year(year)),
            DataSource::Observed => None,
        }
    }

    /// Same model and source, different year.
    pub fn with_year(&self, year: i32) -> Self {
        Self { year, ..self.clone() }
    }
}

/// Daily rasters for every day of the request year in the model's
/// calendar, January 1 to December 31. A missing day is a
/// [`HazardError::DataGap`]; the year is never evaluated partially.
pub(crate) fn year_series(source: &dyn DailySource, request: &HazardRequest) -> Result<Vec<Raster>> {
    let year = request.year;
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(HazardError::Configuration(format!("year {year} out of range")));
    }

    let scenario = request.scenario_for(year);
    let days = request
        .calendar()
        .year_days(year)
        .map(|date| source.day(date, scenario))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(year, days = days.len(), model = ?request.model, "loaded year series");
    Ok(days)
}

/// Number of days on which `exceeds` flags each cell.
pub(crate) fn count_days(days: &[Raster], exceeds: impl Fn(&Raster) -> Result<Mask>) -> Result<Raster> {
    let first = days.first().ok_or(HazardError::EmptySeries("day count"))?;
    let mut counts = Counts::filled(first.width, first.height, 0);
    for day in days {
        counts.add_mask(&exceeds(day)?)?;
    }
    Ok(counts.to_raster())
}
