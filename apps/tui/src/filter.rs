// Filter engine: region lookups and forecast selector cascades.
// Everything here is a pure function over the loaded tables.

use crate::data::{Dataset, EoObservation, ForecastRecord, YieldObservation};
use crate::domain::ForecastMetric;
use std::collections::{BTreeSet, HashSet};
use std::ops::RangeInclusive;

/// Yield and EO rows for one region, in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionData {
    pub fnid: String,
    pub yields: Vec<YieldObservation>,
    pub eo: Vec<EoObservation>,
}

impl RegionData {
    pub fn has_yields(&self) -> bool {
        !self.yields.is_empty()
    }

    pub fn has_eo(&self) -> bool {
        !self.eo.is_empty()
    }
}

pub fn filter_by_region(dataset: &Dataset, fnid: &str) -> RegionData {
    RegionData {
        fnid: fnid.to_string(),
        yields: yields_for_region(dataset.yields(), fnid),
        eo: eo_for_region(dataset.eo_observations(), fnid),
    }
}

/// Rows for `fnid`, sorted by year (stable)
pub fn yields_for_region(rows: &[YieldObservation], fnid: &str) -> Vec<YieldObservation> {
    let mut matched: Vec<_> = rows.iter().filter(|row| row.fnid == fnid).cloned().collect();
    matched.sort_by_key(|row| row.year);
    matched
}

/// Rows for `fnid`, sorted by date (stable)
pub fn eo_for_region(rows: &[EoObservation], fnid: &str) -> Vec<EoObservation> {
    let mut matched: Vec<_> = rows.iter().filter(|row| row.fnid == fnid).cloned().collect();
    matched.sort_by_key(|row| row.date);
    matched
}

/// The five selectors that pick one forecast map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastSelection {
    pub country: String,
    pub season: String,
    pub year: i32,
    pub model: String,
    pub lead: i32,
}

impl ForecastSelection {
    pub fn matches(&self, record: &ForecastRecord) -> bool {
        record.season == self.season
            && record.year == Some(self.year)
            && record.model == self.model
            && record.lead == self.lead
    }
}

/// Records in the country's regions matching every selector exactly.
pub fn filter_forecasts(
    records: &[ForecastRecord],
    country_fnids: &[String],
    selection: &ForecastSelection,
) -> Vec<ForecastRecord> {
    let fnids: HashSet<&str> = country_fnids.iter().map(String::as_str).collect();
    records
        .iter()
        .filter(|record| fnids.contains(record.fnid.as_str()) && selection.matches(record))
        .cloned()
        .collect()
}

pub fn countries(records: &[ForecastRecord]) -> Vec<String> {
    sorted_unique(records.iter().map(|record| record.country.clone()))
}

/// Distinct fnids of the country, in table order
pub fn country_fnids(records: &[ForecastRecord], country: &str) -> Vec<String> {
    unique_in_order(
        records
            .iter()
            .filter(|record| record.country == country)
            .map(|record| record.fnid.clone()),
    )
}

/// Union of seasons over the given regions, in table order
pub fn seasons(records: &[ForecastRecord], fnids: &[String]) -> Vec<String> {
    let fnids: HashSet<&str> = fnids.iter().map(String::as_str).collect();
    unique_in_order(
        records
            .iter()
            .filter(|record| fnids.contains(record.fnid.as_str()))
            .map(|record| record.season.clone()),
    )
}

/// Every year between the first and last forecast for (regions, season).
///
/// `None` means the selection flow must stop: there is no valid year.
pub fn year_range(
    records: &[ForecastRecord],
    fnids: &[String],
    season: &str,
) -> Option<RangeInclusive<i32>> {
    let fnids: HashSet<&str> = fnids.iter().map(String::as_str).collect();
    let years = records
        .iter()
        .filter(|record| fnids.contains(record.fnid.as_str()) && record.season == season)
        .filter_map(|record| record.year);

    let (min, max) = years.fold(None, |acc: Option<(i32, i32)>, year| match acc {
        None => Some((year, year)),
        Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
    })?;
    Some(min..=max)
}

pub fn models(records: &[ForecastRecord]) -> Vec<String> {
    sorted_unique(records.iter().map(|record| record.model.clone()))
}

pub fn leads(records: &[ForecastRecord]) -> Vec<i32> {
    sorted_unique(records.iter().map(|record| record.lead))
}

/// Option lists for every forecast selector, derived for one (country, season).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorOptions {
    pub metrics: Vec<ForecastMetric>,
    pub countries: Vec<String>,
    pub country: Option<String>,
    pub country_fnids: Vec<String>,
    pub seasons: Vec<String>,
    pub season: Option<String>,
    pub years: Vec<i32>,
    pub models: Vec<String>,
    pub leads: Vec<i32>,
}

impl SelectorOptions {
    /// Run the country → season → year cascade.
    ///
    /// A requested country or season that is not available falls back to the
    /// first option.
    pub fn derive(records: &[ForecastRecord], country: Option<&str>, season: Option<&str>) -> Self {
        let countries = countries(records);
        let country = pick(&countries, country);

        let country_fnids = country
            .as_deref()
            .map(|country| country_fnids(records, country))
            .unwrap_or_default();

        let seasons = seasons(records, &country_fnids);
        let season = pick(&seasons, season);

        let years: Vec<i32> = season
            .as_deref()
            .and_then(|season| year_range(records, &country_fnids, season))
            .map(Iterator::collect)
            .unwrap_or_default();

        Self {
            metrics: ForecastMetric::ALL.to_vec(),
            countries,
            country,
            country_fnids,
            seasons,
            season,
            years,
            models: models(records),
            leads: leads(records),
        }
    }

    pub fn has_years(&self) -> bool {
        !self.years.is_empty()
    }
}

fn pick(options: &[String], wanted: Option<&str>) -> Option<String> {
    wanted
        .and_then(|wanted| options.iter().find(|option| option.as_str() == wanted))
        .or_else(|| options.first())
        .cloned()
}

fn sorted_unique<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

fn unique_in_order(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(value.clone())).collect()
}
