use serde::{Deserialize, Serialize};

use crate::error::{HazardError, Result};

/// A 2D grid of per-cell values, row-major.
///
/// Every operation here is cellwise; no cell ever reads a neighbour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    /// Row-major cell values, length = `width × height`.
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// Continuous values (precipitation, temperature, indices).
pub type Raster = Grid<f32>;
/// Binary 0/1 threshold results.
pub type Mask = Grid<u8>;
/// Integer accumulators (streak lengths, day counts).
pub type Counts = Grid<u32>;

impl<T: Copy> Grid<T> {
    /// Create a new grid filled with the given value.
    pub fn filled(width: usize, height: usize, fill: T) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
        }
    }

    /// Wrap row-major data, rejecting a length that does not match the shape.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        let grid = Self { data, width, height };
        grid.validate()?;
        Ok(grid)
    }

    /// Check that `data` holds exactly `width × height` cells.
    pub fn validate(&self) -> Result<()> {
        if self.data.len() != self.width * self.height {
            return Err(HazardError::Configuration(format!(
                "grid {}x{} holds {} cells",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn check_shape<U>(&self, other: &Grid<U>) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(HazardError::ShapeMismatch {
                left: self.shape(),
                right: (other.width, other.height),
            });
        }
        Ok(())
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Combine two same-shape grids cell by cell.
    pub fn zip_with<U: Copy, V: Copy>(
        &self,
        other: &Grid<U>,
        f: impl Fn(T, U) -> V,
    ) -> Result<Grid<V>> {
        self.check_shape(other)?;
        Ok(Grid {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            width: self.width,
            height: self.height,
        })
    }
}

impl Raster {
    pub fn scale(&self, factor: f64) -> Raster {
        self.map(|v| (v as f64 * factor) as f32)
    }

    pub fn offset(&self, delta: f64) -> Raster {
        self.map(|v| (v as f64 + delta) as f32)
    }

    pub fn add(&self, other: &Raster) -> Result<Raster> {
        self.zip_with(other, |a, b| a + b)
    }

    /// 1 where `self > other`, else 0.
    pub fn gt(&self, other: &Raster) -> Result<Mask> {
        self.zip_with(other, |a, b| u8::from(a > b))
    }

    /// 1 where `self > value`, else 0.
    pub fn gt_value(&self, value: f64) -> Mask {
        self.map(|v| u8::from(v as f64 > value))
    }

    /// 1 where `self == value` exactly, else 0.
    pub fn eq_value(&self, value: f64) -> Mask {
        self.map(|v| u8::from(v as f64 == value))
    }

    /// Cellwise sum of a non-empty series.
    pub fn sum_all(series: &[Raster]) -> Result<Raster> {
        Self::fold_all(series, "sum", |a, b| a + b)
    }

    /// Cellwise maximum of a non-empty series.
    pub fn max_all(series: &[Raster]) -> Result<Raster> {
        Self::fold_all(series, "max", f32::max)
    }

    /// Cellwise mean of a non-empty set of rasters.
    pub fn mean_of(rasters: &[Raster]) -> Result<Raster> {
        let total = Self::sum_all(rasters)?;
        let n = rasters.len() as f64;
        Ok(total.map(|v| (v as f64 / n) as f32))
    }

    fn fold_all(series: &[Raster], what: &'static str, f: impl Fn(f32, f32) -> f32) -> Result<Raster> {
        let (first, rest) = series.split_first().ok_or(HazardError::EmptySeries(what))?;
        rest.iter().try_fold(first.clone(), |acc, r| acc.zip_with(r, &f))
    }

    pub fn min_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::INFINITY, f32::min)
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn mean_value(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        (self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64) as f32
    }
}

impl Mask {
    pub fn and(&self, other: &Mask) -> Result<Mask> {
        self.zip_with(other, |a, b| a & b)
    }
}

impl Counts {
    /// Add a 0/1 mask into the running counts in place.
    pub fn add_mask(&mut self, mask: &Mask) -> Result<()> {
        self.check_shape(mask)?;
        for (c, &m) in self.data.iter_mut().zip(mask.data.iter()) {
            *c += m as u32;
        }
        Ok(())
    }

    pub fn to_raster(&self) -> Raster {
        self.map(|v| v as f32)
    }
}
