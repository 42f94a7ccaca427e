//! Access to daily raster time series.
//!
//! Hazard definitions only see [`DailySource`]. An adapter for a remote
//! raster service implements it by turning each call into a date-range and
//! metadata-filtered query; [`MemorySeries`] is the in-process adapter used
//! by the CLI and the tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::Scenario;
use crate::error::{HazardError, Result};
use crate::raster::Raster;

/// One variable's daily rasters for one model (or one observational product).
///
/// `scenario = None` applies no scenario filter. Adapters report service
/// failures as [`HazardError::Remote`].
pub trait DailySource {
    /// The raster for exactly `date`; [`HazardError::DataGap`] when absent.
    fn day(&self, date: NaiveDate, scenario: Option<Scenario>) -> Result<Raster>;

    /// All rasters dated within `[start, end]`, in date order. Dates with no
    /// matching raster are skipped.
    fn range(&self, start: NaiveDate, end: NaiveDate, scenario: Option<Scenario>) -> Result<Vec<Raster>>;
}

/// A dated raster as stored in series JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRaster {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    pub raster: Raster,
}

/// In-memory daily series keyed by date.
#[derive(Debug, Clone, Default)]
pub struct MemorySeries {
    days: BTreeMap<NaiveDate, Vec<(Option<Scenario>, Raster)>>,
}

impl MemorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raster; a second raster for the same date and scenario replaces
    /// the first.
    pub fn insert(&mut self, date: NaiveDate, scenario: Option<Scenario>, raster: Raster) {
        let entries = self.days.entry(date).or_default();
        match entries.iter_mut().find(|(s, _)| *s == scenario) {
            Some(slot) => slot.1 = raster,
            None => entries.push((scenario, raster)),
        }
    }

    pub fn from_records(records: Vec<DailyRaster>) -> Result<Self> {
        let mut series = Self::new();
        for rec in records {
            rec.raster.validate()?;
            series.insert(rec.date, rec.scenario, rec.raster);
        }
        Ok(series)
    }

    /// Parse a JSON array of [`DailyRaster`] records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<DailyRaster> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn to_records(&self) -> Vec<DailyRaster> {
        self.days
            .iter()
            .flat_map(|(&date, entries)| {
                entries.iter().map(move |(scenario, raster)| DailyRaster {
                    date,
                    scenario: *scenario,
                    raster: raster.clone(),
                })
            })
            .collect()
    }

    /// Number of distinct dates held.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn pick(entries: &[(Option<Scenario>, Raster)], scenario: Option<Scenario>) -> Option<&Raster> {
        match scenario {
            None => entries.first().map(|(_, r)| r),
            Some(_) => entries.iter().find(|(s, _)| *s == scenario).map(|(_, r)| r),
        }
    }
}

impl DailySource for MemorySeries {
    fn day(&self, date: NaiveDate, scenario: Option<Scenario>) -> Result<Raster> {
        self.days
            .get(&date)
            .and_then(|entries| Self::pick(entries, scenario))
            .cloned()
            .ok_or_else(|| HazardError::DataGap {
                date,
                scenario: scenario.map_or("any", Scenario::label).to_string(),
            })
    }

    fn range(&self, start: NaiveDate, end: NaiveDate, scenario: Option<Scenario>) -> Result<Vec<Raster>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .days
            .range(start..=end)
            .filter_map(|(_, entries)| Self::pick(entries, scenario).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> MemorySeries {
        let mut s = MemorySeries::new();
        s.insert(ymd(2005, 12, 31), Some(Scenario::Historical), Raster::filled(1, 1, 1.0));
        s.insert(ymd(2006, 1, 1), Some(Scenario::Historical), Raster::filled(1, 1, 2.0));
        s.insert(ymd(2006, 1, 1), Some(Scenario::Rcp85), Raster::filled(1, 1, 3.0));
        s.insert(ymd(2006, 1, 2), Some(Scenario::Rcp85), Raster::filled(1, 1, 4.0));
        s
    }

    #[test]
    fn day_filters_by_scenario() {
        let s = sample();
        let d = ymd(2006, 1, 1);
        assert_eq!(s.day(d, Some(Scenario::Rcp85)).unwrap().data, vec![3.0]);
        assert_eq!(s.day(d, Some(Scenario::Historical)).unwrap().data, vec![2.0]);
        assert_eq!(s.day(d, None).unwrap().data, vec![2.0]);
    }

    #[test]
    fn missing_day_is_a_data_gap() {
        let s = sample();
        match s.day(ymd(2005, 12, 31), Some(Scenario::Rcp85)) {
            Err(HazardError::DataGap { date, scenario }) => {
                assert_eq!(date, ymd(2005, 12, 31));
                assert_eq!(scenario, "rcp85");
            }
            other => panic!("expected DataGap, got {other:?}"),
        }
    }

    #[test]
    fn range_is_inclusive_ordered_and_filtered() {
        let s = sample();
        let all = s.range(ymd(2005, 12, 31), ymd(2006, 1, 2), Some(Scenario::Rcp85)).unwrap();
        let values: Vec<f32> = all.iter().map(|r| r.data[0]).collect();
        assert_eq!(values, vec![3.0, 4.0]);
        assert!(s.range(ymd(2006, 1, 2), ymd(2006, 1, 1), None).unwrap().is_empty());
    }

    #[test]
    fn insert_replaces_same_date_and_scenario() {
        let mut s = sample();
        s.insert(ymd(2006, 1, 2), Some(Scenario::Rcp85), Raster::filled(1, 1, 9.0));
        assert_eq!(s.day(ymd(2006, 1, 2), Some(Scenario::Rcp85)).unwrap().data, vec![9.0]);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"date": "2010-01-01", "scenario": "rcp85",
             "raster": {"data": [0.0, 1.0], "width": 2, "height": 1}},
            {"date": "2010-01-02",
             "raster": {"data": [2.0, 3.0], "width": 2, "height": 1}}
        ]"#;
        let s = MemorySeries::from_json(json).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.day(ymd(2010, 1, 2), None).unwrap().data, vec![2.0, 3.0]);
        assert_eq!(s.to_records().len(), 2);
    }

    #[test]
    fn json_with_bad_raster_length_rejected() {
        let json = r#"[{"date": "2010-01-01",
            "raster": {"data": [0.0], "width": 2, "height": 1}}]"#;
        assert!(matches!(MemorySeries::from_json(json), Err(HazardError::Configuration(_))));
    }
}
