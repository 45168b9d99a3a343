pub mod cache;
pub mod chart;
pub mod choropleth;

pub use cache::{CacheStats, ContentHash, RenderCache};
pub use chart::{eo_chart, yield_chart, LineChart};
pub use choropleth::{build_choropleth, country_center, Choropleth, ChoroplethCell, ColorScale, Rgb};

use crate::data::{EoObservation, ForecastRecord, YieldObservation};
use crate::domain::{EoVariable, ForecastMetric};
use crate::filter::ForecastSelection;
use cache::{hash_f64, key_hasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Memoized front for the three artifact builders.
///
/// Each artifact is keyed by the content it is drawn from, so asking twice
/// with equal rows returns the same `Arc` without rebuilding it.
#[derive(Debug, Default)]
pub struct Renderer {
    yields: RenderCache<Vec<YieldObservation>, LineChart>,
    eo: RenderCache<(EoVariable, Vec<EoObservation>), LineChart>,
    choropleths: RenderCache<ChoroplethInput, Choropleth>,
}

type ChoroplethInput = (ForecastMetric, ForecastSelection, (f64, f64), Vec<ForecastRecord>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererStats {
    pub yield_charts: CacheStats,
    pub eo_charts: CacheStats,
    pub choropleths: CacheStats,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yield_chart(&mut self, rows: &[YieldObservation]) -> Arc<LineChart> {
        let mut hasher = key_hasher("yield");
        rows.content_hash(&mut hasher);
        self.yields
            .get_or_render(hasher.finish(), rows.to_vec(), |rows| yield_chart(rows))
    }

    pub fn eo_chart(&mut self, rows: &[EoObservation], variable: EoVariable) -> Arc<LineChart> {
        let mut hasher = key_hasher("eo");
        variable.hash(&mut hasher);
        rows.content_hash(&mut hasher);
        self.eo
            .get_or_render(hasher.finish(), (variable, rows.to_vec()), |(variable, rows)| {
                eo_chart(rows, *variable)
            })
    }

    pub fn choropleth(
        &mut self,
        subset: &[ForecastRecord],
        metric: ForecastMetric,
        selection: &ForecastSelection,
        center: (f64, f64),
    ) -> Arc<Choropleth> {
        let mut hasher = key_hasher("choropleth");
        metric.hash(&mut hasher);
        selection.hash(&mut hasher);
        hash_f64(center.0, &mut hasher);
        hash_f64(center.1, &mut hasher);
        subset.content_hash(&mut hasher);
        let input = (metric, selection.clone(), center, subset.to_vec());
        self.choropleths
            .get_or_render(hasher.finish(), input, |(metric, selection, center, subset)| {
                build_choropleth(subset, *metric, selection, *center)
            })
    }

    pub fn stats(&self) -> RendererStats {
        RendererStats {
            yield_charts: self.yields.stats(),
            eo_charts: self.eo.stats(),
            choropleths: self.choropleths.stats(),
        }
    }

    /// Drop every cached artifact, e.g. after the dataset is reloaded
    pub fn clear(&mut self) {
        self.yields.clear();
        self.eo.clear();
        self.choropleths.clear();
    }
}
