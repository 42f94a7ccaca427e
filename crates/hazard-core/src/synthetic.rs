//! Deterministic synthetic inputs for demos and tests.
//!
//! Spatial structure comes from a low-frequency Perlin fBm field (~2 cycles
//! across the grid); day-to-day weather is drawn from a seeded RNG. Values
//! are in the same native units as real model output: precipitation in
//! kg m⁻² s⁻¹, temperature in K, percentiles as stored on disk.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::antecedent::LOOKBACK_DAYS;
use crate::calendar::{ModelCalendar, Scenario};
use crate::error::{HazardError, Result};
use crate::layers::{HazardLayers, LayerFile, PercentileSet};
use crate::raster::Raster;
use crate::source::MemorySeries;
use crate::units::{DataSource, KELVIN_OFFSET, SECONDS_PER_DAY};

/// Mixed into caller seeds before seeding the Perlin permutation table.
const FIELD_SEED_SALT: u64 = 0x5EED_4A2A_2D00;

fn perlin_seed(seed: u64) -> u32 {
    ((seed ^ FIELD_SEED_SALT).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 32) as u32
}

/// Octaves used by the dataset's wetness, warmth and terrain fields.
pub const FIELD_OCTAVES: u32 = 3;

/// Perlin fBm at `(x, y)` normalised to roughly `[-1, 1]`.
fn fbm(perlin: &Perlin, x: f64, y: f64, octaves: u32) -> f64 {
    let (sum, norm, _) = (0..octaves).fold((0.0, 0.0, 1.0), |(sum, norm, freq), i| {
        let weight = 0.5_f64.powi(i as i32);
        (sum + weight * perlin.get([x * freq, y * freq]), norm + weight, freq * 2.0)
    });
    if norm > 0.0 {
        sum / norm
    } else {
        0.0
    }
}

/// Multiplicative field centred on 1.0, in `[1 − amplitude, 1 + amplitude]`,
/// with roughly two cycles across the grid in each direction.
pub fn spatial_field(width: usize, height: usize, amplitude: f64, octaves: u32, seed: u64) -> Raster {
    let amplitude = amplitude.clamp(0.0, 0.9);
    if width == 0 || height == 0 || amplitude == 0.0 {
        return Raster::filled(width, height, 1.0);
    }

    let perlin = Perlin::new(perlin_seed(seed));
    let (sx, sy) = (2.0 / width as f64, 2.0 / height as f64);
    let data = (0..width * height)
        .map(|i| {
            let (row, col) = (i / width, i % width);
            let n = fbm(&perlin, col as f64 * sx, row as f64 * sy, octaves);
            (1.0 + amplitude * n) as f32
        })
        .collect();

    Raster { data, width, height }
}

/// Shape and provenance of a synthetic dataset.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub calendar: ModelCalendar,
    pub data_source: DataSource,
}

impl SyntheticDataset {
    /// Every date needed to evaluate all hazards over the year span,
    /// including the antecedent lookback before the first year.
    fn dates(&self) -> Result<Vec<NaiveDate>> {
        let start = NaiveDate::from_ymd_opt(self.first_year, 1, 1)
            .and_then(|d| d.checked_sub_days(chrono::Days::new(LOOKBACK_DAYS as u64 + 1)))
            .ok_or_else(|| HazardError::Configuration(format!("year {} out of range", self.first_year)))?;
        Ok(start
            .iter_days()
            .take_while(|d| d.year() <= self.last_year)
            .filter(|d| self.calendar.contains(*d))
            .collect())
    }

    fn scenario(&self, date: NaiveDate) -> Option<Scenario> {
        match self.data_source {
            DataSource::Modeled => Some(Scenario::for_year(date.year())),
            DataSource::Observed => None,
        }
    }

    /// Daily precipitation in the source's native unit.
    pub fn precip_series(&self) -> Result<MemorySeries> {
        let wetness = spatial_field(self.width, self.height, 0.4, FIELD_OCTAVES, self.seed);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let to_native = 1.0 / self.data_source.precip_mm_factor();
        let mut series = MemorySeries::new();

        for date in self.dates()? {
            let data = wetness
                .data
                .iter()
                .map(|&w| {
                    let wet_prob = 0.35 * w as f64;
                    if rng.gen::<f64>() < wet_prob {
                        // Exponential amounts, mean 8 mm scaled by wetness.
                        let u: f64 = rng.gen();
                        let mm = -(1.0 - u).ln() * 8.0 * w as f64;
                        (mm * to_native) as f32
                    } else {
                        0.0
                    }
                })
                .collect();
            series.insert(date, self.scenario(date), Raster::from_vec(self.width, self.height, data)?);
        }
        Ok(series)
    }

    /// Daily maximum temperature, K.
    pub fn tasmax_series(&self) -> Result<MemorySeries> {
        let warmth = spatial_field(self.width, self.height, 0.5, FIELD_OCTAVES, self.seed.wrapping_add(1));
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let mut series = MemorySeries::new();

        for date in self.dates()? {
            let season = (TAU * (date.ordinal() as f64 - 105.0) / 365.0).sin();
            let data = warmth
                .data
                .iter()
                .map(|&w| {
                    let celsius = 15.0 + 12.0 * season + 20.0 * (w as f64 - 1.0) + rng.gen_range(-4.0..4.0);
                    (celsius + KELVIN_OFFSET) as f32
                })
                .collect();
            series.insert(date, self.scenario(date), Raster::from_vec(self.width, self.height, data)?);
        }
        Ok(series)
    }

    /// Static layers in on-disk units, one percentile raster per model.
    pub fn layer_file(&self, models: &[&str]) -> LayerFile {
        let wetness = spatial_field(self.width, self.height, 0.4, FIELD_OCTAVES, self.seed);
        let warmth = spatial_field(self.width, self.height, 0.5, FIELD_OCTAVES, self.seed.wrapping_add(1));
        let terrain = spatial_field(self.width, self.height, 0.8, FIELD_OCTAVES, self.seed.wrapping_add(2));

        let per_model = |base: &Raster, f: &dyn Fn(f64, usize) -> f64| {
            PercentileSet::new(
                models
                    .iter()
                    .enumerate()
                    .map(|(i, m)| (m.to_string(), base.map(|v| f(v as f64, i) as f32)))
                    .collect::<BTreeMap<_, _>>(),
            )
        };

        LayerFile {
            pr_99: per_model(&wetness, &|w: f64, i: usize| (45.0 + 2.0 * i as f64) * w / SECONDS_PER_DAY),
            tasmax_99: per_model(&warmth, &|w: f64, i: usize| 31.0 + 20.0 * (w - 1.0) + 0.5 * i as f64),
            tasmin_01: per_model(&warmth, &|w: f64, i: usize| -12.0 + 20.0 * (w - 1.0) + 0.5 * i as f64),
            // Classes 1..=5.
            susceptibility: terrain.map(|t| (1.0 + (t - 0.2) / 1.6 * 5.0).floor().clamp(1.0, 5.0)),
            ari_95: wetness.map(|w| 250.0 * w),
        }
    }

    pub fn layers(&self, models: &[&str]) -> Result<HazardLayers> {
        HazardLayers::from_file(self.layer_file(models))
    }
}
