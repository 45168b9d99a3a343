use crate::data::{ForecastRecord, Region};
use crate::domain::ForecastMetric;
use crate::filter::ForecastSelection;
use std::collections::HashSet;

/// Fallback map center (lat, lon)
pub const DEFAULT_CENTER: (f64, f64) = (0.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

// Diverging red-yellow-blue, low to high
const RD_YL_BU: [Rgb; 11] = [
    Rgb(0xa5, 0x00, 0x26),
    Rgb(0xd7, 0x30, 0x27),
    Rgb(0xf4, 0x6d, 0x43),
    Rgb(0xfd, 0xae, 0x61),
    Rgb(0xfe, 0xe0, 0x90),
    Rgb(0xff, 0xff, 0xbf),
    Rgb(0xe0, 0xf3, 0xf8),
    Rgb(0xab, 0xd9, 0xe9),
    Rgb(0x74, 0xad, 0xd1),
    Rgb(0x45, 0x75, 0xb4),
    Rgb(0x31, 0x36, 0x95),
];

/// Linear color scale over [min, max].
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub title: String,
    pub unit: String,
}

impl ColorScale {
    /// Position of `value` in [0, 1]; a zero-width scale puts everything at 0.5.
    pub fn position(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width <= f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / width).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        interpolate(self.position(value))
    }

    /// `steps` evenly spaced (value, color) pairs from min to max.
    pub fn legend(&self, steps: usize) -> Vec<(f64, Rgb)> {
        match steps {
            0 => Vec::new(),
            1 => vec![(self.min, self.color(self.min))],
            _ => {
                let step = (self.max - self.min) / (steps - 1) as f64;
                (0..steps)
                    .map(|i| {
                        let value = step.mul_add(i as f64, self.min);
                        (value, self.color(value))
                    })
                    .collect()
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
fn interpolate(t: f64) -> Rgb {
    let scaled = t.clamp(0.0, 1.0) * (RD_YL_BU.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(RD_YL_BU.len() - 1);
    let frac = scaled - lower as f64;
    let (a, b) = (RD_YL_BU[lower], RD_YL_BU[upper]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// One colored region of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethCell {
    pub fnid: String,
    pub admin1: String,
    pub value: f64,
    pub color: Rgb,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choropleth {
    pub selection: ForecastSelection,
    pub metric: ForecastMetric,
    /// (lat, lon)
    pub center: (f64, f64),
    pub cells: Vec<ChoroplethCell>,
    /// `None` when no cell has a value
    pub scale: Option<ColorScale>,
}

impl Choropleth {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, fnid: &str) -> Option<&ChoroplethCell> {
        self.cells.iter().find(|cell| cell.fnid == fnid)
    }
}

/// Mean centroid (lat, lon) of the country's regions.
pub fn country_center<'a>(regions: impl Iterator<Item = &'a Region>) -> (f64, f64) {
    let (count, lat, lon) = regions.fold((0_u32, 0.0, 0.0), |(n, lat, lon), region| {
        (n + 1, lat + region.centroid_lat, lon + region.centroid_lon)
    });
    if count == 0 {
        return DEFAULT_CENTER;
    }
    let count = f64::from(count);
    (lat / count, lon / count)
}

/// Color one region per record of `subset`. An empty subset yields an empty map.
pub fn build_choropleth(
    subset: &[ForecastRecord],
    metric: ForecastMetric,
    selection: &ForecastSelection,
    center: (f64, f64),
) -> Choropleth {
    let mut seen = HashSet::new();
    let valued: Vec<(&ForecastRecord, f64)> = subset
        .iter()
        .filter_map(|record| {
            let value = record.metric(metric).filter(|v| v.is_finite())?;
            Some((record, value))
        })
        .filter(|(record, _)| seen.insert(record.fnid.as_str()))
        .collect();

    let scale = valued
        .iter()
        .map(|(_, value)| *value)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .map(|(min, max)| ColorScale {
            min,
            max,
            title: metric.label().to_string(),
            unit: metric.unit().to_string(),
        });

    let cells = match &scale {
        None => Vec::new(),
        Some(scale) => valued
            .into_iter()
            .map(|(record, value)| ChoroplethCell {
                fnid: record.fnid.clone(),
                admin1: record.admin1.clone(),
                value,
                color: scale.color(value),
                tooltip: format!(
                    "{}\n{}: {value:.2} {}",
                    record.admin1,
                    metric.label(),
                    metric.unit()
                ),
            })
            .collect(),
    };

    Choropleth {
        selection: selection.clone(),
        metric,
        center,
        cells,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_data::{long_rains, sample_dataset};
    use crate::filter::{country_fnids, filter_forecasts};

    fn kenya(season: &str, year: i32, model: &str, lead: i32) -> ForecastSelection {
        ForecastSelection {
            country: "Kenya".to_string(),
            season: season.to_string(),
            year,
            model: model.to_string(),
            lead,
        }
    }

    #[test]
    fn scale_ends_are_red_and_blue() {
        let scale = ColorScale {
            min: -10.0,
            max: 10.0,
            title: String::new(),
            unit: String::new(),
        };
        assert_eq!(scale.color(-10.0), Rgb(0xa5, 0x00, 0x26));
        assert_eq!(scale.color(10.0), Rgb(0x31, 0x36, 0x95));
        assert_eq!(scale.color(0.0), Rgb(0xff, 0xff, 0xbf));
        assert_eq!(scale.color(99.0), scale.color(10.0));
    }

    #[test]
    fn single_value_scale_maps_to_midpoint() {
        let scale = ColorScale {
            min: 1.5,
            max: 1.5,
            title: String::new(),
            unit: String::new(),
        };
        assert!((scale.position(1.5) - 0.5).abs() < f64::EPSILON);
        assert_eq!(scale.color(1.5), Rgb(0xff, 0xff, 0xbf));
    }

    #[test]
    fn legend_spans_min_to_max() {
        let scale = ColorScale {
            min: 0.0,
            max: 4.0,
            title: String::new(),
            unit: String::new(),
        };
        let legend = scale.legend(5);
        assert_eq!(legend.len(), 5);
        assert!((legend[0].0).abs() < f64::EPSILON);
        assert!((legend[4].0 - 4.0).abs() < f64::EPSILON);
        assert!(scale.legend(0).is_empty());
    }

    #[test]
    fn center_is_mean_centroid_with_fallback() {
        let dataset = sample_dataset();
        let (lat, lon) = country_center(dataset.regions_in_country("Kenya"));
        assert!(lat.abs() < 1e-9);
        assert!((lon - 35.0).abs() < 1e-9);
        assert_eq!(country_center(dataset.regions_in_country("Narnia")), DEFAULT_CENTER);
    }

    #[test]
    fn matching_records_become_colored_cells_with_tooltips() {
        let dataset = sample_dataset();
        let records = dataset.forecasts();
        let selection = kenya("long", 2018, "XGB", 1);
        let subset = filter_forecasts(records, &country_fnids(records, "Kenya"), &selection);

        let map = build_choropleth(&subset, ForecastMetric::PercentError, &selection, (0.0, 35.0));
        assert_eq!(map.cells.len(), 1);
        let cell = map.cell("KE2001").unwrap();
        assert_eq!(cell.tooltip, "Nakuru\nPercent Error: -8.30 %");
        assert!(map.cell("KE2002").is_none());
        assert_eq!(map.scale.as_ref().map(|s| s.unit.as_str()), Some("%"));
    }

    #[test]
    fn empty_subset_renders_an_empty_map() {
        let selection = kenya("long", 2020, "XGB", 1);
        let map = build_choropleth(&[], ForecastMetric::Error, &selection, DEFAULT_CENTER);
        assert!(map.is_empty());
        assert!(map.scale.is_none());
        assert_eq!(map.selection, selection);
    }

    #[test]
    fn missing_metric_values_stay_uncolored() {
        let mut blank = long_rains("KE2002", "Kisumu", Some(2018), (1.0, 0.0, 0.0));
        blank.yield_fcst = None;
        let subset = vec![
            long_rains("KE2001", "Nakuru", Some(2018), (1.1, -0.1, -8.3)),
            blank,
        ];
        let selection = kenya("long", 2018, "XGB", 1);
        let map = build_choropleth(&subset, ForecastMetric::Forecast, &selection, DEFAULT_CENTER);
        assert_eq!(map.cells.len(), 1);
        assert_eq!(map.cells[0].fnid, "KE2001");
    }
}
