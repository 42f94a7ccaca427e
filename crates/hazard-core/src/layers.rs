//! Static inputs shared by every hazard invocation: percentile thresholds
//! and the landslide rasters. Loaded once and passed by reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HazardError, Result};
use crate::raster::Raster;
use crate::units::{KELVIN_OFFSET, SECONDS_PER_DAY};

/// Per-model percentile rasters for one variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub by_model: BTreeMap<String, Raster>,
}

impl PercentileSet {
    pub fn new(by_model: BTreeMap<String, Raster>) -> Self {
        Self { by_model }
    }

    /// The model's own raster, or the cross-model cellwise mean when no
    /// model is given.
    pub fn select(&self, model: Option<&str>) -> Result<Raster> {
        match model {
            Some(m) => self.by_model.get(m).cloned().ok_or_else(|| {
                HazardError::Configuration(format!("no percentile raster for model {m}"))
            }),
            None => {
                let all: Vec<Raster> = self.by_model.values().cloned().collect();
                if all.is_empty() {
                    return Err(HazardError::Configuration(
                        "percentile set is empty; cannot form a model mean".into(),
                    ));
                }
                Raster::mean_of(&all)
            }
        }
    }

    fn convert(self, f: impl Fn(&Raster) -> Raster) -> Self {
        Self {
            by_model: self.by_model.iter().map(|(k, r)| (k.clone(), f(r))).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        self.by_model.values().try_for_each(Raster::validate)
    }
}

/// Layers as stored on disk: precipitation percentiles in kg m⁻² s⁻¹,
/// temperature percentiles in °C.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerFile {
    pub pr_99: PercentileSet,
    pub tasmax_99: PercentileSet,
    #[serde(default)]
    pub tasmin_01: PercentileSet,
    pub susceptibility: Raster,
    pub ari_95: Raster,
}

/// Layers in the units the hazard definitions compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardLayers {
    /// 99th percentile daily precipitation, mm/day.
    pub pr_99: PercentileSet,
    /// 99th percentile daily maximum temperature, K.
    pub tasmax_99: PercentileSet,
    /// 1st percentile daily minimum temperature, K.
    pub tasmin_01: PercentileSet,
    /// Landslide susceptibility class per cell.
    pub susceptibility: Raster,
    /// 95th percentile antecedent rainfall index, 0.1 mm/day.
    pub ari_95: Raster,
}

impl HazardLayers {
    pub fn from_file(file: LayerFile) -> Result<Self> {
        file.pr_99.validate()?;
        file.tasmax_99.validate()?;
        file.tasmin_01.validate()?;
        file.susceptibility.validate()?;
        file.ari_95.validate()?;
        file.susceptibility.check_shape(&file.ari_95)?;

        Ok(Self {
            pr_99: file.pr_99.convert(|r| r.scale(SECONDS_PER_DAY)),
            tasmax_99: file.tasmax_99.convert(|r| r.offset(KELVIN_OFFSET)),
            tasmin_01: file.tasmin_01.convert(|r| r.offset(KELVIN_OFFSET)),
            susceptibility: file.susceptibility,
            ari_95: file.ari_95,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: LayerFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }
}
