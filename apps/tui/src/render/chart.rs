use crate::data::{EoObservation, YieldObservation};
use crate::domain::EoVariable;
use chrono::{Datelike, NaiveDate};

/// A single line series with markers, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_ticks: Vec<String>,
    pub y_ticks: Vec<String>,
}

impl LineChart {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

const TICKS: usize = 3;

/// Observed yield by year for one region's rows.
pub fn yield_chart(rows: &[YieldObservation]) -> LineChart {
    let mut points: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| {
            let value = row.yield_obs.filter(|v| v.is_finite())?;
            Some((f64::from(row.year), value))
        })
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let x_bounds = span(points.iter().map(|p| p.0), 0.0, 1.0);
    let y_bounds = span(points.iter().map(|p| p.1), 0.05, 0.5);

    LineChart {
        title: "Maize Yield Over Time".to_string(),
        x_label: "Year".to_string(),
        y_label: "Yield (t/ha)".to_string(),
        x_ticks: ticks(x_bounds, |x| format!("{x:.0}")),
        y_ticks: ticks(y_bounds, |y| format!("{y:.2}")),
        points,
        x_bounds,
        y_bounds,
    }
}

/// One EO variable by date for one region's rows. Missing values are skipped.
pub fn eo_chart(rows: &[EoObservation], variable: EoVariable) -> LineChart {
    let mut points: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| {
            let value = row.value(variable).filter(|v| v.is_finite())?;
            Some((fractional_year(row.date), value))
        })
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let x_bounds = span(points.iter().map(|p| p.0), 0.0, 0.5);
    let y_bounds = span(points.iter().map(|p| p.1), 0.05, 0.5);

    LineChart {
        title: format!("{variable} Over Time (Pre-Harvest)"),
        x_label: "Year".to_string(),
        y_label: variable.as_str().to_string(),
        x_ticks: ticks(x_bounds, year_month_label),
        y_ticks: ticks(y_bounds, |y| format!("{y:.2}")),
        points,
        x_bounds,
        y_bounds,
    }
}

/// 2019-07-02 -> 2019.5
pub fn fractional_year(date: NaiveDate) -> f64 {
    let days = if date.leap_year() { 366.0 } else { 365.0 };
    f64::from(date.year()) + f64::from(date.ordinal0()) / days
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn year_month_label(x: f64) -> String {
    let year = x.floor();
    let month = ((x - year) * 12.0).floor().clamp(0.0, 11.0) as u32 + 1;
    format!("{year:.0}-{month:02}")
}

/// [min, max] padded by `pad` of the range; a flat series gets `flat` either side.
fn span(values: impl Iterator<Item = f64>, pad: f64, flat: f64) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = max - min;
    if range <= f64::EPSILON {
        return [min - flat, max + flat];
    }
    [range.mul_add(-pad, min), range.mul_add(pad, max)]
}

fn ticks(bounds: [f64; 2], label: impl Fn(f64) -> String) -> Vec<String> {
    let step = (bounds[1] - bounds[0]) / (TICKS - 1) as f64;
    (0..TICKS)
        .map(|i| label(step.mul_add(i as f64, bounds[0])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_data::{eo_row, yield_row};

    #[test]
    fn yield_chart_keeps_two_points_in_year_order() {
        let rows = vec![yield_row("KE2001", 2018, 1.2), yield_row("KE2001", 2019, 1.5)];
        let chart = yield_chart(&rows);
        assert_eq!(chart.points, [(2018.0, 1.2), (2019.0, 1.5)]);
        assert_eq!(chart.title, "Maize Yield Over Time");
        assert_eq!(chart.y_label, "Yield (t/ha)");
        assert_eq!(chart.x_ticks.first().map(String::as_str), Some("2018"));
        assert_eq!(chart.x_ticks.last().map(String::as_str), Some("2019"));
    }

    #[test]
    fn yield_chart_sorts_and_skips_missing() {
        let mut missing = yield_row("KE2001", 2017, 0.0);
        missing.yield_obs = None;
        let rows = vec![yield_row("KE2001", 2019, 1.5), missing, yield_row("KE2001", 2018, 1.2)];
        let chart = yield_chart(&rows);
        let years: Vec<_> = chart.points.iter().map(|p| p.0).collect();
        assert_eq!(years, [2018.0, 2019.0]);
    }

    #[test]
    fn single_point_gets_a_visible_span() {
        let chart = yield_chart(&[yield_row("KE2001", 2018, 1.2)]);
        assert_eq!(chart.x_bounds, [2017.0, 2019.0]);
        assert!(chart.y_bounds[0] < 1.2 && chart.y_bounds[1] > 1.2);
    }

    #[test]
    fn eo_chart_uses_the_chosen_variable() {
        let rows = vec![
            eo_row("KE2001", "2019-03-01", Some(0.45), Some(80.0)),
            eo_row("KE2001", "2018-03-01", Some(0.40), None),
        ];
        let ndvi = eo_chart(&rows, EoVariable::Ndvi);
        assert_eq!(ndvi.points.len(), 2);
        assert!(ndvi.points[0].0 < ndvi.points[1].0);
        assert_eq!(ndvi.title, "ndvi Over Time (Pre-Harvest)");

        let prcp = eo_chart(&rows, EoVariable::Prcp);
        assert_eq!(prcp.points.len(), 1);
        assert_eq!(prcp.y_label, "prcp");

        assert!(eo_chart(&rows, EoVariable::Kdd).is_empty());
    }

    #[test]
    fn fractional_year_and_labels() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        assert!((fractional_year(date) - 2019.0).abs() < 1e-9);
        let july = NaiveDate::from_ymd_opt(2020, 7, 2).unwrap();
        assert_eq!(year_month_label(fractional_year(july)), "2020-07");
    }
}
