//! Hazard registry: names, input variables and histogram binning used by
//! downstream percentile and map reporting.

use serde::{Deserialize, Serialize};

use crate::error::{HazardError, Result};
use crate::hazards::{self, HazardFn, HazardRequest};
use crate::layers::HazardLayers;
use crate::raster::Raster;
use crate::source::DailySource;

/// Daily input variable a hazard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Precipitation flux.
    Pr,
    /// Daily maximum near-surface temperature.
    Tasmax,
    /// Daily minimum near-surface temperature.
    Tasmin,
}

impl Variable {
    pub fn name(self) -> &'static str {
        match self {
            Variable::Pr => "pr",
            Variable::Tasmax => "tasmax",
            Variable::Tasmin => "tasmin",
        }
    }
}

/// One registry row.
#[derive(Clone, Copy, Serialize)]
pub struct HazardDef {
    pub name: &'static str,
    #[serde(skip)]
    pub definition: HazardFn,
    pub variable: Variable,
    pub num_bins: u32,
    pub bin_width: f32,
    /// Binning compares values with "greater than".
    #[serde(rename = "direction")]
    pub use_greater_than: bool,
}

impl std::fmt::Debug for HazardDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazardDef")
            .field("name", &self.name)
            .field("variable", &self.variable)
            .field("num_bins", &self.num_bins)
            .field("bin_width", &self.bin_width)
            .field("use_greater_than", &self.use_greater_than)
            .finish()
    }
}

impl HazardDef {
    /// Run the definition for one request.
    pub fn compute(&self, source: &dyn DailySource, layers: &HazardLayers, request: &HazardRequest) -> Result<Raster> {
        tracing::info!(hazard = self.name, year = request.year, model = ?request.model, "computing hazard");
        (self.definition)(source, layers, request)
    }
}

const fn def(
    name: &'static str,
    definition: HazardFn,
    variable: Variable,
    num_bins: u32,
    bin_width: f32,
) -> HazardDef {
    HazardDef {
        name,
        definition,
        variable,
        num_bins,
        bin_width,
        use_greater_than: true,
    }
}

/// Registered hazards, in publication order.
pub static HAZARDS: [HazardDef; 8] = [
    def("ds", hazards::dry_spells, Variable::Pr, 100, 1.0),
    def("maxdryspell", hazards::max_dry_spell, Variable::Pr, 73, 5.0),
    def("mtt35", hazards::hot_days, Variable::Tasmax, 74, 5.0),
    def("modlandslide", hazards::moderate_landslide_days, Variable::Pr, 60, 5.0),
    def("highlandslide", hazards::high_landslide_days, Variable::Pr, 60, 5.0),
    def("epe", hazards::extreme_precip_days, Variable::Pr, 100, 1.0),
    def("totalprecip", hazards::total_precip, Variable::Pr, 85, 100.0),
    def("maxprecip", hazards::max_precip, Variable::Pr, 80, 20.0),
];

/// Definitions that exist but are not published in the registry.
pub static UNREGISTERED: [(&str, Variable, HazardFn); 2] = [
    ("ehe", Variable::Tasmax, hazards::extreme_heat_days),
    ("ece", Variable::Tasmin, hazards::extreme_cold_events),
];

pub fn all() -> &'static [HazardDef] {
    &HAZARDS
}

/// Registry row for `name`.
pub fn lookup(name: &str) -> Result<&'static HazardDef> {
    HAZARDS
        .iter()
        .find(|h| h.name == name)
        .ok_or_else(|| HazardError::UnknownHazard(name.to_string()))
}

/// Definition function and input variable for `name`, registered or not.
pub fn definition(name: &str) -> Result<(Variable, HazardFn)> {
    if let Ok(h) = lookup(name) {
        return Ok((h.variable, h.definition));
    }
    UNREGISTERED
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, variable, f)| (variable, f))
        .ok_or_else(|| HazardError::UnknownHazard(name.to_string()))
}

/// Registry rows as the JSON consumed by reporting tools.
pub fn registry_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(&HAZARDS[..])?)
}

/// Run `definition` once per year. Years are independent; with the
/// `threading` feature they run on the rayon pool.
pub fn compute_years(
    definition: HazardFn,
    source: &(dyn DailySource + Sync),
    layers: &HazardLayers,
    template: &HazardRequest,
    years: &[i32],
) -> Vec<(i32, Result<Raster>)> {
    let run = |&year: &i32| {
        let request = template.with_year(year);
        (year, definition(source, layers, &request))
    };

    #[cfg(feature = "threading")]
    let results = {
        use rayon::prelude::*;
        years.par_iter().map(run).collect()
    };
    #[cfg(not(feature = "threading"))]
    let results = years.iter().map(run).collect();

    results
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;
    use crate::calendar::{ModelCalendar, Scenario};
    use crate::hazards::fixtures;

    #[test]
    fn registry_has_eight_unique_names() {
        let names: Vec<&str> = all().iter().map(|h| h.name).collect();
        assert_eq!(
            names,
            vec!["ds", "maxdryspell", "mtt35", "modlandslide", "highlandslide", "epe", "totalprecip", "maxprecip"]
        );
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }

    #[test]
    fn binning_parameters() {
        let h = lookup("totalprecip").unwrap();
        assert_eq!((h.num_bins, h.bin_width), (85, 100.0));
        let h = lookup("maxdryspell").unwrap();
        assert_eq!((h.num_bins, h.bin_width), (73, 5.0));
        assert_eq!(lookup("mtt35").unwrap().variable, Variable::Tasmax);
        assert!(all().iter().all(|h| h.use_greater_than && h.num_bins > 0 && h.bin_width > 0.0));
    }

    #[test]
    fn unknown_name_rejected() {
        assert!(matches!(lookup("floods"), Err(HazardError::UnknownHazard(n)) if n == "floods"));
        assert!(lookup("ehe").is_err());
    }

    #[test]
    fn unregistered_definitions_resolve() {
        let (var, _) = definition("ehe").unwrap();
        assert_eq!(var, Variable::Tasmax);
        let (_, ece) = definition("ece").unwrap();
        let s = fixtures::series(2000, ModelCalendar::Gregorian, None, |_| [0.0, 0.0]);
        let r = ece(&s, &fixtures::layers(), &HazardRequest::observed(2000));
        assert!(matches!(r, Err(HazardError::Unimplemented(_))));
        assert!(definition("nope").is_err());
    }

    #[test]
    fn json_schema_fields() {
        let json: serde_json::Value = serde_json::from_str(&registry_json().unwrap()).unwrap();
        let first = &json[0];
        assert_eq!(first["name"], "ds");
        assert_eq!(first["variable"], "pr");
        assert_eq!(first["num_bins"], 100);
        assert_eq!(first["bin_width"], 1.0);
        assert_eq!(first["direction"], true);
        assert!(first.get("definition").is_none());
    }

    #[test]
    fn compute_dispatches_to_definition() {
        let s = fixtures::series(2010, ModelCalendar::Gregorian, Some(Scenario::Rcp85), |_| [1.0e-4, 0.0]);
        let r = lookup("maxprecip")
            .unwrap()
            .compute(&s, &fixtures::layers(), &HazardRequest::modeled(2010, "ACCESS1-0"))
            .unwrap();
        approx::assert_relative_eq!(r.data[0], 8.64, max_relative = 1e-5);
        assert_eq!(r.data[1], 0.0);
    }

    #[test]
    fn batch_years_are_independent_and_repeatable() {
        let mut s = fixtures::series(2010, ModelCalendar::Gregorian, Some(Scenario::Rcp85), |_| [1.0e-4, 0.0]);
        for rec in fixtures::series(2011, ModelCalendar::Gregorian, Some(Scenario::Rcp85), |_| [2.0e-4, 0.0]).to_records() {
            if rec.date.year() == 2011 {
                s.insert(rec.date, rec.scenario, rec.raster);
            }
        }
        let template = HazardRequest::modeled(0, "ACCESS1-0");
        let layers = fixtures::layers();
        let first = compute_years(hazards::max_precip, &s, &layers, &template, &[2010, 2011, 2012]);
        let second = compute_years(hazards::max_precip, &s, &layers, &template, &[2010, 2011, 2012]);

        assert_eq!(first.len(), 3);
        assert_eq!(first[0].0, 2010);
        approx::assert_relative_eq!(first[0].1.as_ref().unwrap().data[0], 8.64, max_relative = 1e-5);
        approx::assert_relative_eq!(first[1].1.as_ref().unwrap().data[0], 17.28, max_relative = 1e-5);
        assert!(matches!(first[2].1, Err(HazardError::DataGap { .. })));
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.1.as_ref().ok(), b.1.as_ref().ok());
        }
    }
}
