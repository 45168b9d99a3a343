// Region selector: turns a map click (or a search pick) into a Region.

use crate::data::{Dataset, MapFeature, Region};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use geo::{Contains, Point};
use ratatui::layout::Rect;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("region {0} is not in the region collection")]
    NotFound(String),
}

/// A click on a map feature, carrying that feature's properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapClick {
    pub properties: Map<String, Value>,
}

impl MapClick {
    pub fn from_feature(feature: &MapFeature) -> Self {
        let mut properties = Map::new();
        properties.insert("fnid".to_string(), Value::String(feature.fnid.clone()));
        properties.insert("admin0".to_string(), Value::String(feature.admin0.clone()));
        properties.insert("admin1".to_string(), Value::String(feature.admin1.clone()));
        properties.insert("admin2".to_string(), Value::String(feature.admin2.clone()));
        Self { properties }
    }

    pub fn for_fnid(fnid: &str) -> Self {
        let mut properties = Map::new();
        properties.insert("fnid".to_string(), Value::String(fnid.to_string()));
        Self { properties }
    }

    /// The region id, accepting string or numeric properties
    pub fn fnid(&self) -> Option<String> {
        match self.properties.get("fnid")? {
            Value::String(fnid) if !fnid.is_empty() => Some(fnid.clone()),
            Value::Number(fnid) => Some(fnid.to_string()),
            _ => None,
        }
    }
}

/// Exact key lookup in the region collection.
pub fn resolve_region<'a>(dataset: &'a Dataset, fnid: &str) -> Result<&'a Region, SelectError> {
    dataset
        .region(fnid)
        .ok_or_else(|| SelectError::NotFound(fnid.to_string()))
}

/// `Ok(None)` when nothing has been clicked (or the click carries no id).
pub fn resolve_click<'a>(
    dataset: &'a Dataset,
    click: Option<&MapClick>,
) -> Result<Option<&'a Region>, SelectError> {
    match click.and_then(MapClick::fnid) {
        None => Ok(None),
        Some(fnid) => resolve_region(dataset, &fnid).map(Some),
    }
}

/// The boundary feature containing (lon, lat), if any.
pub fn hit_test(features: &[MapFeature], lon: f64, lat: f64) -> Option<&MapFeature> {
    let point = Point::new(lon, lat);
    features
        .iter()
        .find(|feature| feature.geometry.contains(&point))
}

/// Geographic window drawn into a terminal rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lon: [f64; 2],
    pub lat: [f64; 2],
}

impl Viewport {
    /// Default view of the base map
    pub const BASE_CENTER: (f64, f64) = (0.0, 20.0);
    const BASE_HALF_SPAN: (f64, f64) = (38.0, 40.0);
    const COUNTRY_HALF_SPAN: (f64, f64) = (9.0, 11.0);

    pub fn base() -> Self {
        Self::centered(Self::BASE_CENTER, Self::BASE_HALF_SPAN)
    }

    /// Zoomed view around a country center
    pub fn country(center: (f64, f64)) -> Self {
        Self::centered(center, Self::COUNTRY_HALF_SPAN)
    }

    /// `center` and `half_span` are (lat, lon)
    pub fn centered(center: (f64, f64), half_span: (f64, f64)) -> Self {
        let (lat, lon) = center;
        let (half_lat, half_lon) = half_span;
        Self {
            lon: [lon - half_lon, lon + half_lon],
            lat: [lat - half_lat, lat + half_lat],
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.lat[0] + self.lat[1]) / 2.0,
            (self.lon[0] + self.lon[1]) / 2.0,
        )
    }

    /// Map a terminal cell inside `area` to (lon, lat) at the cell center.
    pub fn cell_to_lonlat(&self, area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
        if area.width == 0 || area.height == 0 || !area.contains((column, row).into()) {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        let lon = fx.mul_add(self.lon[1] - self.lon[0], self.lon[0]);
        let lat = fy.mul_add(self.lat[0] - self.lat[1], self.lat[1]);
        Some((lon, lat))
    }

    /// Resolve a mouse position to a click on the feature underneath.
    pub fn click_at(
        &self,
        features: &[MapFeature],
        area: Rect,
        column: u16,
        row: u16,
    ) -> Option<MapClick> {
        let (lon, lat) = self.cell_to_lonlat(area, column, row)?;
        hit_test(features, lon, lat).map(MapClick::from_feature)
    }
}

/// Fuzzy search over region labels, best match first.
///
/// An empty query returns every region in collection order.
pub fn search_regions(regions: &[Region], query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return (0..regions.len()).collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, usize)> = regions
        .iter()
        .enumerate()
        .filter_map(|(index, region)| {
            matcher
                .fuzzy_match(&region.search_label(), query)
                .map(|score| (score, index))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, index)| index).collect()
}
