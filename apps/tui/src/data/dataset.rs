use crate::data::models::{EoObservation, ForecastRecord, MapFeature, Region, YieldObservation};
use crate::filter;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// The immutable in-memory tables and geometries.
#[derive(Debug)]
pub struct Dataset {
    regions: Vec<Region>,
    yields: Vec<YieldObservation>,
    eo: Vec<EoObservation>,
    forecasts: Vec<ForecastRecord>,
    boundaries: Vec<MapFeature>,
    region_index: HashMap<String, usize>,
    orphan_records: usize,
}

impl Dataset {
    pub fn new(
        regions: Vec<Region>,
        yields: Vec<YieldObservation>,
        eo: Vec<EoObservation>,
        forecasts: Vec<ForecastRecord>,
        boundaries: Vec<MapFeature>,
    ) -> Self {
        let region_index = first_index_by_fnid(regions.iter().map(|r| r.fnid.as_str()));

        // Records pointing at unknown regions are kept; they never resolve.
        let orphan_records = yields
            .iter()
            .map(|row| row.fnid.as_str())
            .chain(eo.iter().map(|row| row.fnid.as_str()))
            .chain(forecasts.iter().map(|row| row.fnid.as_str()))
            .filter(|fnid| !region_index.contains_key(*fnid))
            .count();
        if orphan_records > 0 {
            warn!(orphan_records, "records reference regions missing from the region collection");
        }

        Self {
            regions,
            yields,
            eo,
            forecasts,
            boundaries,
            region_index,
            orphan_records,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn yields(&self) -> &[YieldObservation] {
        &self.yields
    }

    pub fn eo_observations(&self) -> &[EoObservation] {
        &self.eo
    }

    pub fn forecasts(&self) -> &[ForecastRecord] {
        &self.forecasts
    }

    pub fn boundaries(&self) -> &[MapFeature] {
        &self.boundaries
    }

    pub fn region(&self, fnid: &str) -> Option<&Region> {
        self.region_index.get(fnid).map(|&i| &self.regions[i])
    }

    pub fn regions_in_country<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a Region> {
        self.regions.iter().filter(move |region| region.admin0 == country)
    }

    pub const fn orphan_records(&self) -> usize {
        self.orphan_records
    }

    pub fn summary(&self) -> DatasetSummary {
        let years = self.forecasts.iter().filter_map(|record| record.year);
        let forecast_years = years
            .clone()
            .min()
            .zip(years.max());

        DatasetSummary {
            regions: self.regions.len(),
            boundaries: self.boundaries.len(),
            yield_rows: self.yields.len(),
            eo_rows: self.eo.len(),
            forecast_rows: self.forecasts.len(),
            countries: filter::countries(&self.forecasts),
            models: filter::models(&self.forecasts),
            leads: filter::leads(&self.forecasts),
            forecast_years,
            orphan_records: self.orphan_records,
        }
    }
}

fn first_index_by_fnid<'a>(fnids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    let mut duplicates = HashSet::new();
    for (i, fnid) in fnids.enumerate() {
        if index.contains_key(fnid) {
            duplicates.insert(fnid.to_string());
        } else {
            index.insert(fnid.to_string(), i);
        }
    }
    if !duplicates.is_empty() {
        warn!(duplicates = duplicates.len(), "duplicate region fnids; first occurrence wins");
    }
    index
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub regions: usize,
    pub boundaries: usize,
    pub yield_rows: usize,
    pub eo_rows: usize,
    pub forecast_rows: usize,
    pub countries: Vec<String>,
    pub models: Vec<String>,
    pub leads: Vec<i32>,
    pub forecast_years: Option<(i32, i32)>,
    pub orphan_records: usize,
}
