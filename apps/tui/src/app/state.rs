use crate::app::input::helpers::cycle_index;
use crop_forecast_viewer::config::DataPaths;
use crop_forecast_viewer::data::{Dataset, DatasetStore};
use crop_forecast_viewer::render::Renderer;
use crop_forecast_viewer::selector::{hit_test, search_regions, MapClick, Viewport};
use crop_forecast_viewer::session::{ForecastExplorer, RegionExplorer, SelectorField, ViewContext};
use crop_forecast_viewer::{EoVariable, ForecastMetric, Page};
use ratatui::layout::Rect;
use std::sync::Arc;
use tracing::{debug, info};

/// Keyboard region search on the yield & climate page
#[derive(Debug, Default)]
pub struct RegionSearch {
    pub active: bool,
    pub query: String,
    pub results: Vec<usize>,
    pub selected: usize,
}

impl RegionSearch {
    pub fn refresh(&mut self, dataset: &Dataset) {
        self.results = search_regions(dataset.regions(), &self.query);
        if self.selected >= self.results.len() {
            self.selected = self.results.len().saturating_sub(1);
        }
    }

    pub fn close(&mut self) {
        self.active = false;
        self.query.clear();
        self.results.clear();
        self.selected = 0;
    }
}

/// Tooltip anchored at the mouse cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    pub column: u16,
    pub row: u16,
    pub text: String,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub page: Page,
    pub show_help: bool,
    pub status_message: String,
    pub paths: DataPaths,
    pub store: DatasetStore,
    pub dataset: Arc<Dataset>,
    pub renderer: Renderer,
    pub regions: RegionExplorer,
    pub forecasts: ForecastExplorer,
    pub selector_field: SelectorField,
    pub search: RegionSearch,
    pub hover: Option<Hover>,
    pub reload_requested: bool,
}

impl App {
    pub fn new(paths: DataPaths, store: DatasetStore, dataset: Arc<Dataset>) -> Self {
        let forecasts = ForecastExplorer::new(dataset.forecasts());
        Self {
            running: true,
            page: Page::default(),
            show_help: false,
            status_message: String::new(),
            paths,
            store,
            dataset,
            renderer: Renderer::new(),
            regions: RegionExplorer::default(),
            forecasts,
            selector_field: SelectorField::default(),
            search: RegionSearch::default(),
            hover: None,
            reload_requested: false,
        }
    }

    /// Swap in a freshly loaded dataset and start both pages over
    pub fn install_dataset(&mut self, dataset: Arc<Dataset>) {
        self.renderer.clear();
        self.forecasts = ForecastExplorer::new(dataset.forecasts());
        self.regions = RegionExplorer::default();
        self.dataset = dataset;
        self.search.close();
        self.hover = None;
    }

    pub fn switch_page(&mut self) {
        self.page = self.page.toggle();
        self.hover = None;
        self.search.close();
    }

    pub fn click_region(&mut self, click: Option<&MapClick>) {
        let ctx = ViewContext {
            dataset: &self.dataset,
            renderer: &mut self.renderer,
        };
        self.regions = std::mem::take(&mut self.regions).on_click(ctx, click);
        self.status_message = match self.regions.selected() {
            Some(selected) => selected.banner(),
            None => self
                .regions
                .notices()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        };
    }

    pub fn select_variable(&mut self, forward: bool) {
        let next = cycle_index(self.regions.variable().index(), EoVariable::ALL.len(), forward);
        let Some(variable) = EoVariable::from_index(next) else {
            return;
        };
        let ctx = ViewContext {
            dataset: &self.dataset,
            renderer: &mut self.renderer,
        };
        self.regions = std::mem::take(&mut self.regions).on_variable(ctx, variable);
    }

    pub fn start_search(&mut self) {
        self.search.active = true;
        self.search.query.clear();
        self.search.selected = 0;
        self.search.refresh(&self.dataset);
    }

    pub fn refresh_search(&mut self) {
        self.search.refresh(&self.dataset);
    }

    /// Enter on a search result behaves like a map click
    pub fn pick_search_result(&mut self) {
        let fnid = self
            .search
            .results
            .get(self.search.selected)
            .and_then(|&index| self.dataset.regions().get(index))
            .map(|region| region.fnid.clone());
        self.search.close();
        if let Some(fnid) = fnid {
            self.click_region(Some(&MapClick::for_fnid(&fnid)));
        }
    }

    pub fn focus_selector(&mut self, forward: bool) {
        let next = cycle_index(self.selector_field.index(), SelectorField::ALL.len(), forward);
        self.selector_field = SelectorField::from_index(next).unwrap_or_default();
    }

    /// Move the focused selector to its next or previous option.
    pub fn step_selector(&mut self, forward: bool) {
        let step =
            |current: Option<usize>, len: usize| cycle_index(current.unwrap_or(0), len, forward);

        let explorer = std::mem::take(&mut self.forecasts);
        let records = self.dataset.forecasts();
        let options = &explorer.options;

        self.forecasts = match self.selector_field {
            SelectorField::Metric => {
                let current = ForecastMetric::ALL.iter().position(|m| *m == explorer.metric);
                let next = step(current, ForecastMetric::ALL.len());
                let metric = ForecastMetric::from_index(next).unwrap_or_default();
                explorer.with_metric(metric)
            }
            SelectorField::Country => {
                let current = options
                    .countries
                    .iter()
                    .position(|c| Some(c) == options.country.as_ref());
                let next = options.countries.get(step(current, options.countries.len())).cloned();
                match next {
                    Some(country) => explorer.with_country(records, &country),
                    None => explorer,
                }
            }
            SelectorField::Season => {
                let current = options
                    .seasons
                    .iter()
                    .position(|s| Some(s) == options.season.as_ref());
                let next = options.seasons.get(step(current, options.seasons.len())).cloned();
                match next {
                    Some(season) => explorer.with_season(records, &season),
                    None => explorer,
                }
            }
            SelectorField::Year => {
                let current = options.years.iter().position(|y| Some(*y) == explorer.year);
                let next = options.years.get(step(current, options.years.len())).copied();
                match next {
                    Some(year) => explorer.with_year(year),
                    None => explorer,
                }
            }
            SelectorField::Model => {
                let current = options
                    .models
                    .iter()
                    .position(|m| Some(m) == explorer.model.as_ref());
                let next = options.models.get(step(current, options.models.len())).cloned();
                match next {
                    Some(model) => explorer.with_model(&model),
                    None => explorer,
                }
            }
            SelectorField::Lead => {
                let current = options.leads.iter().position(|l| Some(*l) == explorer.lead);
                let next = options.leads.get(step(current, options.leads.len())).copied();
                match next {
                    Some(lead) => explorer.with_lead(lead),
                    None => explorer,
                }
            }
        };
        debug!(field = self.selector_field.label(), "selector changed");
    }

    pub fn update_forecast_map(&mut self) {
        let ctx = ViewContext {
            dataset: &self.dataset,
            renderer: &mut self.renderer,
        };
        self.forecasts = std::mem::take(&mut self.forecasts).update(ctx);
        self.status_message = match self.forecasts.notice() {
            Some(notice) => notice.to_string(),
            None => "Map updated".to_string(),
        };
    }

    /// Geographic window shown by the current page's map
    pub fn viewport(&self) -> Viewport {
        match (self.page, &self.forecasts.artifact) {
            (Page::HistoricalForecasts, Some(artifact)) => Viewport::country(artifact.center),
            _ => Viewport::base(),
        }
    }

    /// A left click inside the map canvas
    pub fn map_click(&mut self, canvas: Rect, column: u16, row: u16) {
        if self.page != Page::YieldClimate {
            return;
        }
        let viewport = self.viewport();
        if viewport.cell_to_lonlat(canvas, column, row).is_none() {
            return;
        }
        // Blank map keeps the current selection; Esc clears it
        let Some(click) = viewport.click_at(self.dataset.boundaries(), canvas, column, row) else {
            debug!(column, row, "map click outside every region");
            return;
        };
        info!(fnid = ?click.fnid(), "map click");
        self.click_region(Some(&click));
    }

    /// Mouse movement over the map canvas
    pub fn map_hover(&mut self, canvas: Rect, column: u16, row: u16) {
        let viewport = self.viewport();
        let text = viewport
            .cell_to_lonlat(canvas, column, row)
            .and_then(|(lon, lat)| hit_test(self.dataset.boundaries(), lon, lat))
            .and_then(|feature| match (self.page, &self.forecasts.artifact) {
                (Page::YieldClimate, _) => Some(feature.tooltip()),
                (Page::HistoricalForecasts, Some(artifact)) => {
                    artifact.cell(&feature.fnid).map(|cell| cell.tooltip.clone())
                }
                (Page::HistoricalForecasts, None) => None,
            });
        self.hover = text.map(|text| Hover { column, row, text });
    }

    pub const fn request_reload(&mut self) {
        self.reload_requested = true;
    }
}
