//! Precipitation amount hazards, evaluated in mm/day.

use crate::error::Result;
use crate::layers::HazardLayers;
use crate::raster::Raster;
use crate::source::DailySource;

use super::{count_days, year_series, HazardRequest};

fn year_series_mm(source: &dyn DailySource, request: &HazardRequest) -> Result<Vec<Raster>> {
    let to_mm = request.data_source.precip_mm_factor();
    Ok(year_series(source, request)?
        .iter()
        .map(|day| day.scale(to_mm))
        .collect())
}

/// `epe`: days above the 99th percentile of daily precipitation.
pub fn extreme_precip_days(source: &dyn DailySource, layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    let days = year_series_mm(source, request)?;
    let p99 = layers.pr_99.select(request.model())?;
    count_days(&days, |day| day.gt(&p99))
}

/// `totalprecip`: annual total, mm.
pub fn total_precip(source: &dyn DailySource, _layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    Raster::sum_all(&year_series_mm(source, request)?)
}

/// `maxprecip`: wettest day of the year, mm.
pub fn max_precip(source: &dyn DailySource, _layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    Raster::max_all(&year_series_mm(source, request)?)
}
