//! Antecedent rainfall index (ARI) for landslide risk.
//!
//! The index for day `d` is the inverse-square-decay weighted average of the
//! seven most recent daily precipitation rasters (day `d` and the six before
//! it):
//!
//! `ARI = Σ P_t / (t+1)² ÷ Σ 1 / (t+1)²`, `t = 0..6`, `t = 0` being day `d`.
//!
//! A day is a risk day in a cell when the index exceeds the cell's ARI
//! threshold and the cell's susceptibility class exceeds the cutoff.
//! Reference: Kirschbaum & Stanley (2018), doi:10.1002/2017EF000715.

use std::collections::VecDeque;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::ModelCalendar;
use crate::error::{HazardError, Result};
use crate::raster::{Counts, Raster};

/// Days that enter one index value.
pub const WINDOW_DAYS: usize = 7;
/// History needed before January 1.
pub const LOOKBACK_DAYS: usize = WINDOW_DAYS - 1;

/// Decay weights, lag 0 first.
pub fn ari_weights() -> [f64; WINDOW_DAYS] {
    let mut w = [0.0; WINDOW_DAYS];
    for (t, wt) in w.iter_mut().enumerate() {
        *wt = 1.0 / ((t + 1) * (t + 1)) as f64;
    }
    w
}

/// Landslide risk tier; the tiers differ only in susceptibility cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandslideRisk {
    Moderate,
    High,
}

impl LandslideRisk {
    /// Susceptibility class a cell must exceed.
    pub fn susceptibility_cutoff(self) -> f64 {
        match self {
            LandslideRisk::Moderate => 2.0,
            LandslideRisk::High => 4.0,
        }
    }
}

/// Seven most recent daily rasters, oldest at the front.
#[derive(Debug, Clone)]
pub struct AntecedentWindow {
    days: VecDeque<Raster>,
}

impl AntecedentWindow {
    /// Build the window from the six lookback days (oldest first) plus a
    /// zero placeholder in front that the first slide discards.
    pub fn seed(lookback: Vec<Raster>) -> Result<Self> {
        if lookback.len() != LOOKBACK_DAYS {
            return Err(HazardError::Configuration(format!(
                "antecedent window needs {LOOKBACK_DAYS} lookback days, got {}",
                lookback.len()
            )));
        }
        let first = &lookback[0];
        for day in &lookback[1..] {
            first.check_shape(day)?;
        }

        let mut days = VecDeque::with_capacity(WINDOW_DAYS);
        days.push_back(Raster::filled(first.width, first.height, 0.0));
        days.extend(lookback);
        Ok(Self { days })
    }

    /// Drop the oldest day and append `today`.
    pub fn slide(&mut self, today: Raster) -> Result<()> {
        if let Some(latest) = self.days.back() {
            latest.check_shape(&today)?;
        }
        self.days.pop_front();
        self.days.push_back(today);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Weighted antecedent index over the current window.
    pub fn index(&self) -> Result<Raster> {
        let latest = self
            .days
            .back()
            .ok_or(HazardError::EmptySeries("antecedent window"))?;
        let weights = ari_weights();
        let denominator: f64 = weights.iter().sum();

        let mut numerator = vec![0.0_f64; latest.data.len()];
        // Walk backward from the most recent day: lag 0, 1, ...
        for (day, w) in self.days.iter().rev().zip(weights.iter()) {
            for (acc, &p) in numerator.iter_mut().zip(day.data.iter()) {
                *acc += p as f64 * w;
            }
        }

        Raster::from_vec(
            latest.width,
            latest.height,
            numerator.into_iter().map(|n| (n / denominator) as f32).collect(),
        )
    }
}

/// Count the days of `year` on which the antecedent index exceeds
/// `ari_threshold` in cells whose susceptibility exceeds `cutoff`.
///
/// `fetch` returns the precipitation raster for a date, already in the
/// threshold's unit. It is called for the six days before January 1 and then
/// once per calendar day of the year, strictly in date order. Any fetch
/// error aborts the evaluation.
pub fn count_risk_days<F>(
    mut fetch: F,
    year: i32,
    calendar: ModelCalendar,
    ari_threshold: &Raster,
    susceptibility: &Raster,
    cutoff: f64,
) -> Result<Raster>
where
    F: FnMut(NaiveDate) -> Result<Raster>,
{
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| HazardError::Configuration(format!("year {year} out of range")))?;
    ari_threshold.check_shape(susceptibility)?;

    let lookback = (1..=LOOKBACK_DAYS as i64)
        .rev()
        .map(|k| fetch(start - Duration::days(k)))
        .collect::<Result<Vec<_>>>()?;
    let mut window = AntecedentWindow::seed(lookback)?;

    let susceptible = susceptibility.gt_value(cutoff);
    let mut risk_days = Counts::filled(ari_threshold.width, ari_threshold.height, 0);
    let mut processed = 0usize;

    for date in calendar.year_days(year) {
        window.slide(fetch(date)?)?;
        let index = window.index()?;
        let flagged = index.gt(ari_threshold)?.and(&susceptible)?;
        risk_days.add_mask(&flagged)?;
        processed += 1;
    }

    tracing::debug!(year, ?calendar, processed, cutoff, "antecedent scan complete");
    Ok(risk_days.to_raster())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Datelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weights_decay_with_inverse_square() {
        let w = ari_weights();
        assert_relative_eq!(w[0], 1.0);
        assert_relative_eq!(w[1], 0.25);
        assert_relative_eq!(w[2], 1.0 / 9.0);
        assert_relative_eq!(w[6], 1.0 / 49.0);
    }

    #[test]
    fn constant_precipitation_gives_same_index() {
        let v = 37.5_f32;
        let mut window = AntecedentWindow::seed(vec![Raster::filled(3, 2, v); LOOKBACK_DAYS]).unwrap();
        window.slide(Raster::filled(3, 2, v)).unwrap();
        let idx = window.index().unwrap();
        for &x in &idx.data {
            assert_relative_eq!(x, v, max_relative = 1e-6);
        }
    }

    #[test]
    fn most_recent_day_carries_largest_weight() {
        let mut window = AntecedentWindow::seed(vec![Raster::filled(1, 1, 0.0); LOOKBACK_DAYS]).unwrap();
        window.slide(Raster::filled(1, 1, 10.0)).unwrap();
        let sum_w: f64 = ari_weights().iter().sum();
        assert_relative_eq!(window.index().unwrap().data[0] as f64, 10.0 / sum_w, max_relative = 1e-6);

        // Same rain six days earlier contributes 1/49 of that.
        let mut old = vec![Raster::filled(1, 1, 0.0); LOOKBACK_DAYS];
        old[0] = Raster::filled(1, 1, 10.0);
        let mut window = AntecedentWindow::seed(old).unwrap();
        window.slide(Raster::filled(1, 1, 0.0)).unwrap();
        assert_relative_eq!(
            window.index().unwrap().data[0] as f64,
            10.0 / 49.0 / sum_w,
            max_relative = 1e-6
        );
    }

    #[test]
    fn window_keeps_seven_days_while_sliding() {
        let mut window = AntecedentWindow::seed(vec![Raster::filled(1, 1, 1.0); LOOKBACK_DAYS]).unwrap();
        assert_eq!(window.len(), WINDOW_DAYS);
        for i in 0..20 {
            window.slide(Raster::filled(1, 1, i as f32)).unwrap();
            assert_eq!(window.len(), WINDOW_DAYS);
        }
    }

    #[test]
    fn placeholder_is_discarded_on_first_slide() {
        // With the placeholder gone, lag 6 is the oldest lookback day.
        let lookback: Vec<Raster> = (1..=6).map(|v| Raster::filled(1, 1, v as f32)).collect();
        let mut window = AntecedentWindow::seed(lookback).unwrap();
        window.slide(Raster::filled(1, 1, 7.0)).unwrap();
        let w = ari_weights();
        let expected: f64 = (0..7).map(|t| (7 - t) as f64 * w[t]).sum::<f64>() / w.iter().sum::<f64>();
        assert_relative_eq!(window.index().unwrap().data[0] as f64, expected, max_relative = 1e-6);
    }

    #[test]
    fn seed_rejects_wrong_lookback_length() {
        assert!(AntecedentWindow::seed(vec![Raster::filled(1, 1, 0.0); 5]).is_err());
    }

    #[test]
    fn slide_rejects_shape_change() {
        let mut window = AntecedentWindow::seed(vec![Raster::filled(2, 2, 0.0); LOOKBACK_DAYS]).unwrap();
        assert!(matches!(
            window.slide(Raster::filled(1, 1, 0.0)),
            Err(HazardError::ShapeMismatch { .. })
        ));
    }

    fn requested_dates(year: i32, calendar: ModelCalendar) -> Vec<NaiveDate> {
        let mut seen = Vec::new();
        let threshold = Raster::filled(1, 1, 1.0);
        let susc = Raster::filled(1, 1, 5.0);
        count_risk_days(
            |d| {
                seen.push(d);
                Ok(Raster::filled(1, 1, 0.0))
            },
            year,
            calendar,
            &threshold,
            &susc,
            2.0,
        )
        .unwrap();
        seen
    }

    #[test]
    fn noleap_model_processes_365_days_in_leap_year() {
        let dates = requested_dates(2016, ModelCalendar::NoLeap);
        let in_year: Vec<_> = dates.iter().filter(|d| d.year() == 2016).collect();
        assert_eq!(in_year.len(), 365);
        assert!(!dates.contains(&ymd(2016, 2, 29)));
    }

    #[test]
    fn gregorian_model_processes_full_leap_year() {
        let dates = requested_dates(2016, ModelCalendar::Gregorian);
        assert_eq!(dates.iter().filter(|d| d.year() == 2016).count(), 366);
    }

    #[test]
    fn lookback_days_precede_january_first_in_order() {
        let dates = requested_dates(2010, ModelCalendar::Gregorian);
        assert_eq!(&dates[..7], &[
            ymd(2009, 12, 26),
            ymd(2009, 12, 27),
            ymd(2009, 12, 28),
            ymd(2009, 12, 29),
            ymd(2009, 12, 30),
            ymd(2009, 12, 31),
            ymd(2010, 1, 1),
        ]);
        assert_eq!(dates.last(), Some(&ymd(2010, 12, 31)));
    }

    #[test]
    fn risk_days_require_index_and_susceptibility() {
        // Cells: susceptibility 1, 3, 5; constant rain above threshold everywhere.
        let threshold = Raster::filled(3, 1, 100.0);
        let susc = Raster::from_vec(3, 1, vec![1.0, 3.0, 5.0]).unwrap();
        let wet = |_d: NaiveDate| -> Result<Raster> { Ok(Raster::filled(3, 1, 150.0)) };

        let moderate = count_risk_days(
            wet,
            2015,
            ModelCalendar::Gregorian,
            &threshold,
            &susc,
            LandslideRisk::Moderate.susceptibility_cutoff(),
        )
        .unwrap();
        assert_eq!(moderate.data, vec![0.0, 365.0, 365.0]);

        let high = count_risk_days(
            wet,
            2015,
            ModelCalendar::Gregorian,
            &threshold,
            &susc,
            LandslideRisk::High.susceptibility_cutoff(),
        )
        .unwrap();
        assert_eq!(high.data, vec![0.0, 0.0, 365.0]);
    }

    #[test]
    fn single_storm_flags_days_while_index_stays_high() {
        // 70 on Jan 10 only; threshold 20. Lag 0 index = 70/1.5118 ≈ 46.3,
        // lag 1 ≈ 11.6, so only Jan 10 is a risk day.
        let threshold = Raster::filled(1, 1, 20.0);
        let susc = Raster::filled(1, 1, 5.0);
        let storm = |d: NaiveDate| -> Result<Raster> {
            let v = if d == ymd(2015, 1, 10) { 70.0 } else { 0.0 };
            Ok(Raster::filled(1, 1, v))
        };
        let days = count_risk_days(storm, 2015, ModelCalendar::Gregorian, &threshold, &susc, 2.0).unwrap();
        assert_eq!(days.data, vec![1.0]);
    }

    #[test]
    fn missing_day_aborts_evaluation() {
        let gap = ymd(2015, 6, 1);
        let threshold = Raster::filled(1, 1, 1.0);
        let susc = Raster::filled(1, 1, 5.0);
        let fetch = |d: NaiveDate| -> Result<Raster> {
            if d == gap {
                Err(HazardError::DataGap { date: d, scenario: "historical".into() })
            } else {
                Ok(Raster::filled(1, 1, 0.0))
            }
        };
        let r = count_risk_days(fetch, 2015, ModelCalendar::Gregorian, &threshold, &susc, 2.0);
        assert!(matches!(r, Err(HazardError::DataGap { date, .. }) if date == gap));
    }
}
