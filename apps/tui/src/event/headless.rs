use color_eyre::Result;
use crop_forecast_viewer::data::{Dataset, DatasetSummary};
use crop_forecast_viewer::render::Renderer;
use crop_forecast_viewer::selector::MapClick;
use crop_forecast_viewer::session::{RegionExplorer, ViewContext};
use serde::Serialize;

use crate::app::App;

/// Run the application in headless mode (no UI)
pub fn run_headless(app: &mut App, json: bool, region: Option<&str>) -> Result<()> {
    let report = build_headless_report(&app.dataset, &mut app.renderer, region);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_headless_text(&report));
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct HeadlessReport {
    summary: DatasetSummary,
    region: Option<RegionReport>,
}

/// What the yield & climate page would show for one region
#[derive(Debug, Serialize)]
struct RegionReport {
    fnid: String,
    banner: Option<String>,
    yields: Vec<(i32, f64)>,
    eo_rows: usize,
    notices: Vec<String>,
}

fn build_headless_report(
    dataset: &Dataset,
    renderer: &mut Renderer,
    region: Option<&str>,
) -> HeadlessReport {
    let region = region.map(|fnid| {
        let click = MapClick::for_fnid(fnid);
        let ctx = ViewContext { dataset, renderer };
        let explorer = RegionExplorer::default().on_click(ctx, Some(&click));
        let selected = explorer.selected();

        RegionReport {
            fnid: fnid.to_string(),
            banner: selected.map(|s| s.banner()),
            yields: selected
                .and_then(|s| s.yield_chart.as_ref())
                .map(|chart| {
                    chart
                        .points
                        .iter()
                        .map(|&(year, value)| (year_of(year), value))
                        .collect()
                })
                .unwrap_or_default(),
            eo_rows: selected.map_or(0, |s| s.data.eo.len()),
            notices: explorer.notices().iter().map(ToString::to_string).collect(),
        }
    });

    HeadlessReport {
        summary: dataset.summary(),
        region,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn year_of(x: f64) -> i32 {
    x.round() as i32
}

fn render_headless_text(report: &HeadlessReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str("\nCrop Forecast Viewer Data\n");
    out.push_str("=========================\n");
    out.push_str(&format!("Regions: {}\n", summary.regions));
    out.push_str(&format!("Boundaries: {}\n", summary.boundaries));
    out.push_str(&format!("Yield rows: {}\n", summary.yield_rows));
    out.push_str(&format!("EO rows: {}\n", summary.eo_rows));
    out.push_str(&format!("Forecast rows: {}\n", summary.forecast_rows));
    if summary.orphan_records > 0 {
        out.push_str(&format!(
            "Rows with unknown regions: {}\n",
            summary.orphan_records
        ));
    }

    out.push_str(&format!("\nCountries: {}\n", summary.countries.join(", ")));
    out.push_str(&format!("Models: {}\n", summary.models.join(", ")));
    let leads: Vec<String> = summary.leads.iter().map(ToString::to_string).collect();
    out.push_str(&format!("Leads: {}\n", leads.join(", ")));
    if let Some((first, last)) = summary.forecast_years {
        out.push_str(&format!("Forecast years: {first}-{last}\n"));
    }

    if let Some(region) = &report.region {
        out.push_str(&format!("\nRegion {}\n", region.fnid));
        if let Some(banner) = &region.banner {
            out.push_str(&format!("{banner}\n"));
        }
        for (year, value) in &region.yields {
            out.push_str(&format!("- {year}: {value:.2} t/ha\n"));
        }
        if region.banner.is_some() {
            out.push_str(&format!("EO rows: {}\n", region.eo_rows));
        }
        for notice in &region.notices {
            out.push_str(&format!("! {notice}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crop_forecast_viewer::data::{Region, YieldObservation};
    use geo::MultiPolygon;

    fn dataset() -> Dataset {
        let region = Region {
            fnid: "KE2001".to_string(),
            admin0: "Kenya".to_string(),
            admin1: "Nakuru".to_string(),
            admin2: String::new(),
            centroid_lat: 0.0,
            centroid_lon: 36.0,
            geometry: MultiPolygon::new(Vec::new()),
        };
        let yields = [(2019, 1.5), (2018, 1.2)]
            .into_iter()
            .map(|(year, value)| YieldObservation {
                fnid: "KE2001".to_string(),
                year,
                yield_obs: Some(value),
            })
            .collect();
        Dataset::new(vec![region], yields, Vec::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn region_report_lists_yields_in_year_order() {
        let dataset = dataset();
        let mut renderer = Renderer::new();
        let report = build_headless_report(&dataset, &mut renderer, Some("KE2001"));
        let region = report.region.unwrap();

        assert_eq!(region.banner.as_deref(), Some("Selected Region: Kenya - Nakuru"));
        assert_eq!(region.yields, [(2018, 1.2), (2019, 1.5)]);
        assert_eq!(region.notices, ["No EO data available for this region."]);
    }

    #[test]
    fn unknown_region_reports_a_notice() {
        let dataset = dataset();
        let mut renderer = Renderer::new();
        let report = build_headless_report(&dataset, &mut renderer, Some("XX0000"));
        let text = render_headless_text(&report);

        assert!(text.contains("Regions: 1"));
        assert!(text.contains("! Region XX0000 is not in the region collection."));
    }

    #[test]
    fn summary_only_without_region() {
        let dataset = dataset();
        let mut renderer = Renderer::new();
        let report = build_headless_report(&dataset, &mut renderer, None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["yield_rows"], 2);
        assert!(json["region"].is_null());
    }
}
