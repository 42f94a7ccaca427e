//! Dry-day streak hazards.
//!
//! A dry day is one with exactly zero precipitation. Both hazards feed the
//! year's dry-day masks to the streak scan using the compatible tail rule.

use crate::error::Result;
use crate::layers::HazardLayers;
use crate::raster::{Mask, Raster};
use crate::source::DailySource;
use crate::streak::{accumulate, StreakMode, TailRule};
use crate::units::SECONDS_PER_DAY;

use super::{year_series, HazardRequest};

/// Shortest dry run counted by `ds`.
pub const DRY_SPELL_RUN_LENGTH: u32 = 5;

/// `ds`: number of dry spells in the year.
pub fn dry_spells(source: &dyn DailySource, _layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    let dry: Vec<Mask> = year_series(source, request)?
        .iter()
        .map(|day| day.eq_value(0.0))
        .collect();
    accumulate(&dry, DRY_SPELL_RUN_LENGTH, StreakMode::Count, TailRule::Compatible)
}

/// `maxdryspell`: longest run of dry days (climdex CDD).
pub fn max_dry_spell(source: &dyn DailySource, _layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
    let dry: Vec<Mask> = year_series(source, request)?
        .iter()
        .map(|day| day.scale(SECONDS_PER_DAY).eq_value(0.0))
        .collect();
    accumulate(&dry, 1, StreakMode::Max, TailRule::Compatible)
}
