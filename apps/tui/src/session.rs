// View controller: the two page flows as explicit state values.
// Every transition takes the current state by value and returns the next one.

use crate::data::{Dataset, ForecastRecord, Region};
use crate::domain::{EoVariable, ForecastMetric};
use crate::filter::{
    filter_by_region, filter_forecasts, ForecastSelection, RegionData, SelectorOptions,
};
use crate::render::{country_center, Choropleth, LineChart, Renderer};
use crate::selector::{resolve_click, MapClick, SelectError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Empty-result conditions shown to the user in place of a chart or map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ClickToBegin,
    RegionNotFound(String),
    NoYieldData,
    NoEoData,
    NoForecastYears,
    NoMatchingForecast,
}

impl Notice {
    /// Informational notices are hints, the rest are warnings
    pub const fn is_warning(&self) -> bool {
        !matches!(self, Self::ClickToBegin)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClickToBegin => write!(f, "Click a region on the map to begin."),
            Self::RegionNotFound(fnid) => {
                write!(f, "Region {fnid} is not in the region collection.")
            }
            Self::NoYieldData => write!(f, "No yield data available for this region."),
            Self::NoEoData => write!(f, "No EO data available for this region."),
            Self::NoForecastYears => {
                write!(f, "No forecast years available for the selected conditions.")
            }
            Self::NoMatchingForecast => {
                write!(f, "No forecast matches the selected conditions.")
            }
        }
    }
}

/// What a transition reads from: the loaded tables and the render cache.
pub struct ViewContext<'a> {
    pub dataset: &'a Dataset,
    pub renderer: &'a mut Renderer,
}

/// A region that resolved, with its filtered rows and charts.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRegion {
    pub region: Region,
    pub data: RegionData,
    pub variable: EoVariable,
    pub yield_chart: Option<Arc<LineChart>>,
    pub eo_chart: Option<Arc<LineChart>>,
}

impl SelectedRegion {
    pub fn banner(&self) -> String {
        format!("Selected Region: {}", self.region.display_name())
    }

    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if !self.data.has_yields() {
            notices.push(Notice::NoYieldData);
        }
        if !self.data.has_eo() {
            notices.push(Notice::NoEoData);
        }
        notices
    }
}

/// Yield & climate page state.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionExplorer {
    NoSelection { notice: Notice },
    Selected(Box<SelectedRegion>),
}

impl Default for RegionExplorer {
    fn default() -> Self {
        Self::NoSelection {
            notice: Notice::ClickToBegin,
        }
    }
}

impl RegionExplorer {
    /// Resolve a map click and rebuild the page for it.
    ///
    /// The EO variable carries over from the previous selection; everything
    /// else about the previous region is dropped.
    #[must_use]
    pub fn on_click(self, ctx: ViewContext<'_>, click: Option<&MapClick>) -> Self {
        let variable = self.variable();
        match resolve_click(ctx.dataset, click) {
            Ok(None) => Self::default(),
            Err(SelectError::NotFound(fnid)) => {
                info!(%fnid, "clicked region is not in the region collection");
                Self::NoSelection {
                    notice: Notice::RegionNotFound(fnid),
                }
            }
            Ok(Some(region)) => Self::select(ctx, region.clone(), variable),
        }
    }

    fn select(ctx: ViewContext<'_>, region: Region, variable: EoVariable) -> Self {
        let data = filter_by_region(ctx.dataset, &region.fnid);
        debug!(
            fnid = %region.fnid,
            yields = data.yields.len(),
            eo = data.eo.len(),
            "region selected"
        );

        let yield_chart = data
            .has_yields()
            .then(|| ctx.renderer.yield_chart(&data.yields));
        let eo_chart = data
            .has_eo()
            .then(|| ctx.renderer.eo_chart(&data.eo, variable));

        Self::Selected(Box::new(SelectedRegion {
            region,
            data,
            variable,
            yield_chart,
            eo_chart,
        }))
    }

    /// Pick another EO variable; only the EO chart is redrawn.
    #[must_use]
    pub fn on_variable(self, ctx: ViewContext<'_>, variable: EoVariable) -> Self {
        match self {
            Self::Selected(mut selected) if selected.data.has_eo() => {
                selected.variable = variable;
                selected.eo_chart = Some(ctx.renderer.eo_chart(&selected.data.eo, variable));
                Self::Selected(selected)
            }
            other => other,
        }
    }

    pub fn selected(&self) -> Option<&SelectedRegion> {
        match self {
            Self::Selected(selected) => Some(selected),
            Self::NoSelection { .. } => None,
        }
    }

    pub fn variable(&self) -> EoVariable {
        self.selected()
            .map_or_else(EoVariable::default, |selected| selected.variable)
    }

    pub fn notices(&self) -> Vec<Notice> {
        match self {
            Self::NoSelection { notice } => vec![notice.clone()],
            Self::Selected(selected) => selected.notices(),
        }
    }
}

/// The six forecast selectors, in screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorField {
    #[default]
    Metric,
    Country,
    Season,
    Year,
    Model,
    Lead,
}

impl SelectorField {
    pub const ALL: [Self; 6] = [
        Self::Metric,
        Self::Country,
        Self::Season,
        Self::Year,
        Self::Model,
        Self::Lead,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Metric => "Variable",
            Self::Country => "Country",
            Self::Season => "Season",
            Self::Year => "Year",
            Self::Model => "Model",
            Self::Lead => "Lead",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Metric => 0,
            Self::Country => 1,
            Self::Season => 2,
            Self::Year => 3,
            Self::Model => 4,
            Self::Lead => 5,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Metric),
            1 => Some(Self::Country),
            2 => Some(Self::Season),
            3 => Some(Self::Year),
            4 => Some(Self::Model),
            5 => Some(Self::Lead),
            _ => None,
        }
    }
}

/// Historical forecasts page state.
///
/// Selector changes never touch `artifact`; only `update` replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastExplorer {
    pub options: SelectorOptions,
    pub metric: ForecastMetric,
    pub year: Option<i32>,
    pub model: Option<String>,
    pub lead: Option<i32>,
    pub artifact: Option<Arc<Choropleth>>,
}

impl ForecastExplorer {
    pub fn new(records: &[ForecastRecord]) -> Self {
        let options = SelectorOptions::derive(records, None, None);
        Self {
            year: options.years.first().copied(),
            model: options.models.first().cloned(),
            lead: options.leads.first().copied(),
            options,
            metric: ForecastMetric::default(),
            artifact: None,
        }
    }

    #[must_use]
    pub fn with_metric(mut self, metric: ForecastMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Changing country re-derives seasons and years and resets both.
    #[must_use]
    pub fn with_country(mut self, records: &[ForecastRecord], country: &str) -> Self {
        self.options = SelectorOptions::derive(records, Some(country), None);
        self.year = self.options.years.first().copied();
        self
    }

    /// Changing season re-derives the year range and resets the year.
    #[must_use]
    pub fn with_season(mut self, records: &[ForecastRecord], season: &str) -> Self {
        let country = self.options.country.clone();
        self.options = SelectorOptions::derive(records, country.as_deref(), Some(season));
        self.year = self.options.years.first().copied();
        self
    }

    /// Years outside the derived range are ignored.
    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        if self.options.years.contains(&year) {
            self.year = Some(year);
        }
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        if self.options.models.iter().any(|m| m == model) {
            self.model = Some(model.to_string());
        }
        self
    }

    #[must_use]
    pub fn with_lead(mut self, lead: i32) -> Self {
        if self.options.leads.contains(&lead) {
            self.lead = Some(lead);
        }
        self
    }

    /// The current selector tuple, or `None` while the flow is halted.
    pub fn selection(&self) -> Option<ForecastSelection> {
        if !self.options.has_years() {
            return None;
        }
        Some(ForecastSelection {
            country: self.options.country.clone()?,
            season: self.options.season.clone()?,
            year: self.year?,
            model: self.model.clone()?,
            lead: self.lead?,
        })
    }

    pub fn is_halted(&self) -> bool {
        self.selection().is_none()
    }

    /// Render the choropleth for the current selectors.
    ///
    /// Refused while halted; the previous artifact stays on screen.
    #[must_use]
    pub fn update(mut self, ctx: ViewContext<'_>) -> Self {
        let Some(selection) = self.selection() else {
            info!("forecast update refused: no valid year for the selection");
            return self;
        };

        let records = ctx.dataset.forecasts();
        let subset = filter_forecasts(records, &self.options.country_fnids, &selection);
        let center = country_center(ctx.dataset.regions_in_country(&selection.country));
        let artifact = ctx
            .renderer
            .choropleth(&subset, self.metric, &selection, center);

        info!(
            country = %selection.country,
            season = %selection.season,
            year = selection.year,
            model = %selection.model,
            lead = selection.lead,
            metric = %self.metric,
            cells = artifact.cells.len(),
            "forecast map updated"
        );
        self.artifact = Some(artifact);
        self
    }

    pub fn notice(&self) -> Option<Notice> {
        if !self.options.has_years() {
            return Some(Notice::NoForecastYears);
        }
        match &self.artifact {
            Some(artifact) if artifact.is_empty() => Some(Notice::NoMatchingForecast),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_data::{long_rains, sample_dataset};

    fn ctx<'a>(dataset: &'a Dataset, renderer: &'a mut Renderer) -> ViewContext<'a> {
        ViewContext { dataset, renderer }
    }

    #[test]
    fn starts_with_click_to_begin() {
        let explorer = RegionExplorer::default();
        assert_eq!(explorer.notices(), [Notice::ClickToBegin]);
        assert!(explorer.selected().is_none());
    }

    #[test]
    fn click_selects_region_and_builds_charts() {
        let dataset = sample_dataset();
        let mut renderer = Renderer::new();
        let click = MapClick::for_fnid("KE2001");

        let explorer =
            RegionExplorer::default().on_click(ctx(&dataset, &mut renderer), Some(&click));
        let selected = explorer.selected().unwrap();

        assert_eq!(selected.banner(), "Selected Region: Kenya - Nakuru");
        let chart = selected.yield_chart.as_ref().unwrap();
        assert_eq!(chart.points, [(2018.0, 1.2), (2019.0, 1.5)]);
        assert!(selected.eo_chart.is_some());
        assert!(explorer.notices().is_empty());
    }

    #[test]
    fn region_without_yields_reports_it() {
        let dataset = sample_dataset();
        let mut renderer = Renderer::new();
        let click = MapClick::for_fnid("ET1001");

        let explorer =
            RegionExplorer::default().on_click(ctx(&dataset, &mut renderer), Some(&click));
        let selected = explorer.selected().unwrap();

        assert!(selected.yield_chart.is_none());
        assert!(selected.eo_chart.is_some());
        assert_eq!(explorer.notices(), [Notice::NoYieldData]);
    }

    #[test]
    fn unknown_region_is_a_notice_not_a_crash() {
        let dataset = sample_dataset();
        let mut renderer = Renderer::new();
        let click = MapClick::for_fnid("ZZ9999");

        let explorer =
            RegionExplorer::default().on_click(ctx(&dataset, &mut renderer), Some(&click));
        assert_eq!(
            explorer.notices(),
            [Notice::RegionNotFound("ZZ9999".to_string())]
        );
    }

    #[test]
    fn reclick_replaces_previous_region() {
        let dataset = sample_dataset();
        let mut renderer = Renderer::new();

        let explorer = RegionExplorer::default().on_click(
            ctx(&dataset, &mut renderer),
            Some(&MapClick::for_fnid("KE2001")),
        );
        let explorer = explorer.on_click(
            ctx(&dataset, &mut renderer),
            Some(&MapClick::for_fnid("KE2002")),
        );

        let selected = explorer.selected().unwrap();
        assert_eq!(selected.region.fnid, "KE2002");
        assert!(selected.data.yields.iter().all(|row| row.fnid == "KE2002"));
        assert_eq!(explorer.notices(), [Notice::NoEoData]);
    }

    #[test]
    fn variable_change_only_redraws_eo_chart() {
        let dataset = sample_dataset();
        let mut renderer = Renderer::new();

        let explorer = RegionExplorer::default().on_click(
            ctx(&dataset, &mut renderer),
            Some(&MapClick::for_fnid("KE2001")),
        );
        let before = explorer.selected().unwrap().yield_chart.clone().unwrap();
        let explorer = explorer.on_variable(ctx(&dataset, &mut renderer), EoVariable::Prcp);

        let selected = explorer.selected().unwrap();
        assert_eq!(selected.variable, EoVariable::Prcp);
        assert!(Arc::ptr_eq(&before, selected.yield_chart.as_ref().unwrap()));
        assert_eq!(selected.eo_chart.as_ref().unwrap().y_label, "prcp");
        assert_eq!(renderer.stats().yield_charts.misses, 1);
        assert_eq!(renderer.stats().eo_charts.misses, 2);
    }

    #[test]
    fn variable_change_without_selection_is_ignored() {
        let dataset = sample_dataset();
        let mut renderer = Renderer::new();
        let explorer =
            RegionExplorer::default().on_variable(ctx(&dataset, &mut renderer), EoVariable::Gdd);
        assert_eq!(explorer, RegionExplorer::default());
    }

    #[test]
    fn new_forecast_explorer_picks_first_options() {
        let dataset = sample_dataset();
        let explorer = ForecastExplorer::new(dataset.forecasts());
        let selection = explorer.selection().unwrap();
        assert_eq!(selection.country, "Ethiopia");
        assert_eq!(selection.season, "meher");
        assert_eq!(selection.year, 2019);
        assert_eq!(selection.model, "LR");
        assert_eq!(selection.lead, 1);
        assert!(explorer.artifact.is_none());
        assert_eq!(explorer.notice(), None);
    }

    #[test]
    fn country_change_resets_season_and_year() {
        let dataset = sample_dataset();
        let records = dataset.forecasts();
        let explorer = ForecastExplorer::new(records).with_country(records, "Kenya");
        assert_eq!(explorer.options.seasons, ["long", "short"]);
        assert_eq!(explorer.options.season.as_deref(), Some("long"));
        assert_eq!(explorer.year, Some(2018));

        let explorer = explorer.with_season(records, "short");
        assert_eq!(explorer.options.years, [2019]);
        assert_eq!(explorer.year, Some(2019));
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let dataset = sample_dataset();
        let records = dataset.forecasts();
        let explorer = ForecastExplorer::new(records)
            .with_year(1990)
            .with_model("RF")
            .with_lead(9);
        let selection = explorer.selection().unwrap();
        assert_eq!((selection.year, selection.model.as_str(), selection.lead), (2019, "LR", 1));
    }

    #[test]
    fn selector_changes_do_not_rerender() {
        let dataset = sample_dataset();
        let records = dataset.forecasts();
        let mut renderer = Renderer::new();

        let explorer = ForecastExplorer::new(records)
            .with_model("XGB")
            .update(ctx(&dataset, &mut renderer));
        let shown = explorer.artifact.clone().unwrap();
        assert_eq!(shown.cells.len(), 1);

        let explorer = explorer
            .with_country(records, "Kenya")
            .with_metric(ForecastMetric::Error);
        assert!(Arc::ptr_eq(&shown, explorer.artifact.as_ref().unwrap()));
        assert_eq!(renderer.stats().choropleths.misses, 1);
    }

    #[test]
    fn retrigger_with_same_selectors_hits_the_cache() {
        let dataset = sample_dataset();
        let records = dataset.forecasts();
        let mut renderer = Renderer::new();

        let explorer = ForecastExplorer::new(records)
            .with_country(records, "Kenya")
            .with_model("XGB")
            .update(ctx(&dataset, &mut renderer));
        let first = explorer.artifact.clone().unwrap();
        let explorer = explorer.update(ctx(&dataset, &mut renderer));

        assert_eq!(Some(first), explorer.artifact);
        assert_eq!(renderer.stats().choropleths.hits, 1);
        assert_eq!(renderer.stats().choropleths.misses, 1);
    }

    #[test]
    fn no_matching_forecast_renders_empty_map_with_notice() {
        let dataset = sample_dataset();
        let records = dataset.forecasts();
        let mut renderer = Renderer::new();

        let explorer = ForecastExplorer::new(records)
            .with_country(records, "Kenya")
            .with_season(records, "long")
            .with_year(2020)
            .with_model("XGB")
            .with_lead(1)
            .update(ctx(&dataset, &mut renderer));

        let artifact = explorer.artifact.as_ref().unwrap();
        assert!(artifact.is_empty());
        assert_eq!(artifact.center, (0.0, 35.0));
        assert_eq!(explorer.notice(), Some(Notice::NoMatchingForecast));
    }

    #[test]
    fn halted_flow_refuses_update() {
        let records = vec![long_rains("A", "X", None, (1.0, 0.0, 0.0))];
        let dataset = Dataset::new(Vec::new(), Vec::new(), Vec::new(), records, Vec::new());
        let mut renderer = Renderer::new();

        let explorer = ForecastExplorer::new(dataset.forecasts());
        assert!(explorer.is_halted());
        assert_eq!(explorer.notice(), Some(Notice::NoForecastYears));

        let explorer = explorer.update(ctx(&dataset, &mut renderer));
        assert!(explorer.artifact.is_none());
        assert_eq!(renderer.stats().choropleths.misses, 0);
    }

    #[test]
    fn selector_field_indices_round_trip() {
        for (i, field) in SelectorField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(SelectorField::from_index(i), Some(*field));
        }
    }
}
