//! Run-length ("streak") accumulation over an ordered series of daily
//! threshold masks.
//!
//! The scan is a strict left fold: [`StreakState::seed`] builds the initial
//! record, [`StreakState::step`] consumes one state and one day and returns
//! the next state, and [`StreakState::finish`] selects the requested field.
//! Days must be fed in date order; the state of day `i` depends on every
//! earlier day.

use serde::{Deserialize, Serialize};

use crate::error::{HazardError, Result};
use crate::raster::{Counts, Mask, Raster};

/// Which accumulator the scan returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakMode {
    /// Number of completed streaks at least `run_length` long.
    Count,
    /// Longest streak length (climdex CDD style).
    Max,
    /// Qualifying days that continued a streak.
    Accum,
}

/// How the end of the series interacts with a streak in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailRule {
    /// Published portal behaviour. Continuation is suppressed once fewer
    /// than two days remain after the current one, and an ended streak
    /// qualifies when `length × length²` reaches the run length.
    #[default]
    Compatible,
    /// Plain run-length semantics. No suppression; a streak still open on
    /// the final day is closed there, and an ended streak qualifies when its
    /// length reaches the run length.
    CloseRun,
}

/// Scan state carried from one day to the next.
///
/// Invariant after every step: `longest >= current` cellwise.
#[derive(Debug, Clone, PartialEq)]
pub struct StreakState {
    /// Threshold mask of the previous day (all ones before day 1).
    pub previous: Mask,
    /// Length of the streak in progress, ending at the previous day.
    pub current: Counts,
    /// Completed streaks that met the run length.
    pub count: Counts,
    /// Longest streak seen so far.
    pub longest: Counts,
    /// Sum of qualifying values on continuing days.
    pub accum: Counts,
    /// Days left to process after the current one.
    pub remaining: usize,
}

impl StreakState {
    pub fn seed(width: usize, height: usize, series_len: usize) -> Self {
        Self {
            previous: Mask::filled(width, height, 1),
            current: Counts::filled(width, height, 0),
            count: Counts::filled(width, height, 0),
            longest: Counts::filled(width, height, 0),
            accum: Counts::filled(width, height, 0),
            remaining: series_len.saturating_sub(1),
        }
    }

    /// Advance the scan by one day.
    pub fn step(mut self, today: &Mask, run_length: u32, rule: TailRule) -> Result<Self> {
        self.previous.check_shape(today)?;

        let guard_open = match rule {
            TailRule::Compatible => self.remaining > 1,
            TailRule::CloseRun => true,
        };
        let last_day = self.remaining == 0;
        let run_length = run_length as u64;

        for i in 0..today.data.len() {
            let t = u32::from(today.data[i] != 0);
            let cur = self.current.data[i];
            let continuing = u32::from(self.previous.data[i] != 0 && t == 1 && guard_open);

            let qualifies = match rule {
                TailRule::Compatible => {
                    let ended = cur as u64 * cur as u64 * (1 - continuing) as u64;
                    cur as u64 * ended >= run_length
                }
                TailRule::CloseRun => continuing == 0 && cur > 0 && cur as u64 >= run_length,
            };

            let next = cur * continuing + t;
            let closes_at_end =
                rule == TailRule::CloseRun && last_day && next > 0 && next as u64 >= run_length;

            self.count.data[i] += u32::from(qualifies) + u32::from(closes_at_end);
            self.longest.data[i] = self.longest.data[i].max(next);
            self.accum.data[i] += t * continuing;
            self.current.data[i] = next;
            self.previous.data[i] = t as u8;
        }

        self.remaining = self.remaining.saturating_sub(1);
        Ok(self)
    }

    pub fn finish(self, mode: StreakMode) -> Counts {
        match mode {
            StreakMode::Count => self.count,
            StreakMode::Max => self.longest,
            StreakMode::Accum => self.accum,
        }
    }
}

/// Scan `series` in order and return the accumulator named by `mode`.
pub fn accumulate(series: &[Mask], run_length: u32, mode: StreakMode, rule: TailRule) -> Result<Raster> {
    let first = series
        .first()
        .ok_or(HazardError::EmptySeries("streak accumulation"))?;
    if run_length == 0 {
        return Err(HazardError::Configuration(
            "streak run length must be at least 1".into(),
        ));
    }

    let seed = StreakState::seed(first.width, first.height, series.len());
    let state = series
        .iter()
        .try_fold(seed, |state, day| state.step(day, run_length, rule))?;

    tracing::debug!(days = series.len(), run_length, ?mode, ?rule, "streak scan complete");
    Ok(state.finish(mode).to_raster())
}
