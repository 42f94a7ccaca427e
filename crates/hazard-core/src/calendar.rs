//! Model calendars and scenario selection.
//!
//! Several CMIP5 models simulate a 365-day year with no February 29. Any
//! date lookup against their output has to avoid asking for a day that the
//! model never produced.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Models whose simulated calendar omits February 29 in every year.
pub const NOLEAP_MODELS: &[&str] = &[
    "bcc-csm1-1",
    "BNU-ESM",
    "CanESM2",
    "CCSM4",
    "CESM1-BGC",
    "CSIRO-Mk3-6-0",
    "GFDL-CM3",
    "GFDL-ESM2G",
    "GFDL-ESM2M",
    "inmcm4",
    "IPSL-CM5A-LR",
    "IPSL-CM5A-MR",
    "MIROC5",
    "NorESM1-M",
];

/// Last year served by the historical experiment; later years are RCP8.5.
pub const LAST_HISTORICAL_YEAR: i32 = 2005;

pub fn is_noleap_model(model: &str) -> bool {
    NOLEAP_MODELS.contains(&model)
}

/// Map Feb 29 to Mar 1 for no-leap models; every other date passes through.
pub fn skip_leap(date: NaiveDate, model: &str) -> NaiveDate {
    ModelCalendar::for_model(Some(model)).normalize(date)
}

/// Calendar a model's daily output follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelCalendar {
    Gregorian,
    NoLeap,
}

impl ModelCalendar {
    /// Observational data (no model) is always Gregorian.
    pub fn for_model(model: Option<&str>) -> Self {
        match model {
            Some(m) if is_noleap_model(m) => ModelCalendar::NoLeap,
            _ => ModelCalendar::Gregorian,
        }
    }

    /// The date this calendar's output is stored under: Feb 29 becomes
    /// Mar 1 in a no-leap calendar.
    pub fn normalize(self, date: NaiveDate) -> NaiveDate {
        match self {
            ModelCalendar::NoLeap if date.month() == 2 && date.day() == 29 => {
                NaiveDate::from_ymd_opt(date.year(), 3, 1).unwrap_or(date)
            }
            _ => date,
        }
    }

    /// Whether the model produced output dated `date`.
    pub fn contains(self, date: NaiveDate) -> bool {
        self.normalize(date) == date
    }

    /// Every day of `year` that exists in this calendar, in order.
    pub fn year_days(self, year: i32) -> impl Iterator<Item = NaiveDate> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        start
            .into_iter()
            .flat_map(|d| d.iter_days())
            .take_while(move |d| d.year() == year)
            .filter(move |d| self.contains(*d))
    }

    pub fn days_in_year(self, year: i32) -> usize {
        self.year_days(year).count()
    }
}

/// Forcing pathway of a modeled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Historical,
    Rcp85,
}

impl Scenario {
    pub fn for_year(year: i32) -> Self {
        if year > LAST_HISTORICAL_YEAR {
            Scenario::Rcp85
        } else {
            Scenario::Historical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Historical => "historical",
            Scenario::Rcp85 => "rcp85",
        }
    }
}
