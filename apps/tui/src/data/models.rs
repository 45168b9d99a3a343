use crate::domain::{EoVariable, ForecastMetric};
use chrono::NaiveDate;
use geo::MultiPolygon;
use serde::{Deserialize, Deserializer};

/// An administrative region, joined to every table by its `fnid`
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub fnid: String,
    pub admin0: String,
    pub admin1: String,
    pub admin2: String,
    pub centroid_lat: f64,
    pub centroid_lon: f64,
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    /// Banner text shown once a region is selected
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.admin0, self.admin1)
    }

    /// Text the region search matches against
    pub fn search_label(&self) -> String {
        if self.admin2.is_empty() {
            format!("{} - {} ({})", self.admin0, self.admin1, self.fnid)
        } else {
            format!(
                "{} - {} - {} ({})",
                self.admin0, self.admin1, self.admin2, self.fnid
            )
        }
    }
}

/// A boundary polygon from the map document, used for drawing and tooltips
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub fnid: String,
    pub admin0: String,
    pub admin1: String,
    pub admin2: String,
    pub geometry: MultiPolygon<f64>,
}

impl MapFeature {
    pub fn tooltip(&self) -> String {
        format!(
            "Country: {}\nadmin1: {}\nadmin2: {}",
            self.admin0, self.admin1, self.admin2
        )
    }
}

/// One observed maize yield per region per year
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YieldObservation {
    pub fnid: String,
    #[serde(deserialize_with = "int")]
    pub year: i32,
    #[serde(deserialize_with = "opt_float")]
    pub yield_obs: Option<f64>,
}

/// Sub-annual EO predictors for one region
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EoObservation {
    pub fnid: String,
    pub date: NaiveDate,
    #[serde(deserialize_with = "opt_float")]
    pub ndvi: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub prcp: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub pdry: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub etos: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub tavg: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub gdd: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub kdd: Option<f64>,
}

impl EoObservation {
    pub const fn value(&self, variable: EoVariable) -> Option<f64> {
        match variable {
            EoVariable::Ndvi => self.ndvi,
            EoVariable::Prcp => self.prcp,
            EoVariable::Pdry => self.pdry,
            EoVariable::Etos => self.etos,
            EoVariable::Tavg => self.tavg,
            EoVariable::Gdd => self.gdd,
            EoVariable::Kdd => self.kdd,
        }
    }
}

/// A historical forecast and its error for one region
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastRecord {
    pub fnid: String,
    pub country: String,
    pub admin1: String,
    #[serde(default)]
    pub admin2: String,
    pub season: String,
    #[serde(deserialize_with = "opt_int")]
    pub year: Option<i32>,
    pub model: String,
    #[serde(deserialize_with = "int")]
    pub lead: i32,
    #[serde(deserialize_with = "opt_float")]
    pub yield_fcst: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub yield_fcst_error: Option<f64>,
    #[serde(deserialize_with = "opt_float")]
    pub yield_fcst_perror: Option<f64>,
}

impl ForecastRecord {
    pub const fn metric(&self, metric: ForecastMetric) -> Option<f64> {
        match metric {
            ForecastMetric::Forecast => self.yield_fcst,
            ForecastMetric::Error => self.yield_fcst_error,
            ForecastMetric::PercentError => self.yield_fcst_perror,
        }
    }
}

/// Integers exported from dataframes often arrive as `2018.0`
pub fn parse_int(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i32>() {
        return Some(value);
    }
    whole_number(raw.parse::<f64>().ok()?)
}

#[allow(clippy::cast_possible_truncation)]
pub fn whole_number(value: f64) -> Option<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i32)
}

/// NaN and infinities count as missing
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

fn opt_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<f64>::deserialize(deserializer).map(finite)
}

fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_int(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid integer `{raw}`")))
}

fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("" | "nan" | "NaN") => Ok(None),
        Some(value) => parse_int(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid integer `{value}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_accepts_float_formatted_integers() {
        assert_eq!(parse_int("2018"), Some(2018));
        assert_eq!(parse_int(" 2018.0 "), Some(2018));
        assert_eq!(parse_int("2018.5"), None);
        assert_eq!(parse_int("nan"), None);
        assert_eq!(parse_int("soon"), None);
    }

    #[test]
    fn nan_cells_read_as_missing() {
        let csv = "fnid,year,yield_obs\nKE2001,2018,NaN\nKE2001,2019,inf\nKE2001,2020,1.1\n";
        let rows: Vec<YieldObservation> = csv::Reader::from_reader(csv.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        let values: Vec<_> = rows.iter().map(|r| r.yield_obs).collect();
        assert_eq!(values, [None, None, Some(1.1)]);
    }

    #[test]
    fn region_labels() {
        let region = Region {
            fnid: "KE2001".to_string(),
            admin0: "Kenya".to_string(),
            admin1: "Nakuru".to_string(),
            admin2: String::new(),
            centroid_lat: -0.3,
            centroid_lon: 36.1,
            geometry: MultiPolygon::new(vec![]),
        };
        assert_eq!(region.display_name(), "Kenya - Nakuru");
        assert_eq!(region.search_label(), "Kenya - Nakuru (KE2001)");
    }

    #[test]
    fn forecast_metric_reads_matching_column() {
        let record = ForecastRecord {
            fnid: "KE2001".to_string(),
            country: "Kenya".to_string(),
            admin1: "Nakuru".to_string(),
            admin2: String::new(),
            season: "long".to_string(),
            year: Some(2020),
            model: "XGB".to_string(),
            lead: 1,
            yield_fcst: Some(1.4),
            yield_fcst_error: Some(-0.2),
            yield_fcst_perror: None,
        };
        assert_eq!(record.metric(ForecastMetric::Forecast), Some(1.4));
        assert_eq!(record.metric(ForecastMetric::Error), Some(-0.2));
        assert_eq!(record.metric(ForecastMetric::PercentError), None);
    }
}
