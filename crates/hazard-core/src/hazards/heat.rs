//! Temperature threshold hazards. Daily maximum temperature is in K.

use crate::error::{HazardError, Result};
use crate::layers::HazardLayers;
use crate::raster::Raster;
use crate::source::DailySource;
use crate::units::celsius_to_kelvin;

use super::{count_days, year_series, HazardRequest};

pub const HOT_DAY_CELSIUS: f64 = 35.0;

/// `mtt35`: days with maximum temperature above 35 °C.
pub fn hot_days(source: &dyn DailySource, _layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    let threshold = celsius_to_kelvin(HOT_DAY_CELSIUS);
    let days = year_series(source, request)?;
    count_days(&days, |day| Ok(day.gt_value(threshold)))
}

/// `ehe`: days above the 99th percentile of daily maximum temperature.
pub fn extreme_heat_days(source: &dyn DailySource, layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    let days = year_series(source, request)?;
    let p99 = layers.tasmax_99.select(request.model())?;
    count_days(&days, |day| day.gt(&p99))
}

/// `ece`: extreme cold events. Declared alongside the other hazards but no
/// definition exists yet.
pub fn extreme_cold_events(_source: &dyn DailySource, _layers: &HazardLayers, _request: &HazardRequest) -> Result<Raster> {
    Err(HazardError::Unimplemented("ece"))
}
