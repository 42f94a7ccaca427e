//! Landslide risk-day hazards built on the antecedent rainfall index.

use chrono::{Datelike, NaiveDate};

use crate::antecedent::{count_risk_days, LandslideRisk};
use crate::error::Result;
use crate::layers::HazardLayers;
use crate::raster::Raster;
use crate::source::DailySource;

use super::HazardRequest;

/// Days in the year whose antecedent index exceeds the ARI95 threshold in
/// cells above the tier's susceptibility cutoff.
///
/// Each day is read under the scenario of its own year, so the lookback for
/// the first forward-scenario year comes from the historical run.
pub fn landslide_days(
    source: &dyn DailySource,
    layers: &HazardLayers,
    request: &HazardRequest,
    risk: LandslideRisk,
) -> Result<Raster> {
    let units = request.data_source;
    let fetch = |date: NaiveDate| {
        source
            .day(date, request.scenario_for(date.year()))
            .map(|day| units.precip_to_ari_units(&day))
    };
    count_risk_days(
        fetch,
        request.year,
        request.calendar(),
        &layers.ari_95,
        &layers.susceptibility,
        risk.susceptibility_cutoff(),
    )
}

/// `modlandslide`
pub fn moderate_landslide_days(source: &dyn DailySource, layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    landslide_days(source, layers, request, LandslideRisk::Moderate)
}

/// `highlandslide`
pub fn high_landslide_days(source: &dyn DailySource, layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    landslide_days(source, layers, request, LandslideRisk::High)
}
