use crate::data::{EoObservation, ForecastRecord, YieldObservation};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, trace};

/// Hash of the data a render reads, used as its cache key.
pub trait ContentHash {
    fn content_hash<H: Hasher>(&self, state: &mut H);
}

pub fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    // -0.0 + 0.0 is +0.0; both render the same
    (value + 0.0).to_bits().hash(state);
}

fn hash_opt_f64<H: Hasher>(value: Option<f64>, state: &mut H) {
    value.is_some().hash(state);
    if let Some(value) = value {
        hash_f64(value, state);
    }
}

impl<T: ContentHash> ContentHash for [T] {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self {
            item.content_hash(state);
        }
    }
}

impl ContentHash for YieldObservation {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.fnid.hash(state);
        self.year.hash(state);
        hash_opt_f64(self.yield_obs, state);
    }
}

impl ContentHash for EoObservation {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.fnid.hash(state);
        self.date.hash(state);
        for value in [
            self.ndvi, self.prcp, self.pdry, self.etos, self.tavg, self.gdd, self.kdd,
        ] {
            hash_opt_f64(value, state);
        }
    }
}

impl ContentHash for ForecastRecord {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        self.fnid.hash(state);
        self.country.hash(state);
        self.admin1.hash(state);
        self.admin2.hash(state);
        self.season.hash(state);
        self.year.hash(state);
        self.model.hash(state);
        self.lead.hash(state);
        hash_opt_f64(self.yield_fcst, state);
        hash_opt_f64(self.yield_fcst_error, state);
        hash_opt_f64(self.yield_fcst_perror, state);
    }
}

/// Start a key for one kind of artifact
pub fn key_hasher(kind: &str) -> DefaultHasher {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    hasher
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Rendered artifacts by content key. Entries live until `clear`.
///
/// Each artifact is stored next to the input it was rendered from; a key
/// match only counts as a hit when the inputs are equal too.
#[derive(Debug)]
pub struct RenderCache<I, V> {
    entries: HashMap<u64, Vec<(I, Arc<V>)>>,
    hits: u64,
    misses: u64,
}

impl<I, V> Default for RenderCache<I, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<I: PartialEq, V> RenderCache<I, V> {
    pub fn get_or_render(&mut self, key: u64, input: I, render: impl FnOnce(&I) -> V) -> Arc<V> {
        let bucket = self.entries.entry(key).or_default();
        if let Some((_, artifact)) = bucket.iter().find(|(stored, _)| *stored == input) {
            self.hits += 1;
            trace!(key, "render cache hit");
            return Arc::clone(artifact);
        }

        self.misses += 1;
        if !bucket.is_empty() {
            debug!(key, "render cache key collision");
        }
        trace!(key, "render cache miss");
        let artifact = Arc::new(render(&input));
        bucket.push((input, Arc::clone(&artifact)));
        artifact
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.values().map(Vec::len).sum(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_data::yield_row;

    fn key_of(rows: &[YieldObservation]) -> u64 {
        let mut hasher = key_hasher("yield");
        rows.content_hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_content_gives_equal_keys() {
        let a = vec![yield_row("KE2001", 2018, 1.2), yield_row("KE2001", 2019, 1.5)];
        let b = a.clone();
        assert_eq!(key_of(&a), key_of(&b));
    }

    #[test]
    fn different_content_gives_different_keys() {
        let a = vec![yield_row("KE2001", 2018, 1.2)];
        let b = vec![yield_row("KE2001", 2018, 1.3)];
        assert_ne!(key_of(&a), key_of(&b));
        assert_ne!(key_of(&a), key_of(&[]));
    }

    #[test]
    fn render_runs_once_per_key() {
        let mut cache = RenderCache::default();
        let mut renders = 0;

        let first = cache.get_or_render(7, "rows", |_| {
            renders += 1;
            "artifact".to_string()
        });
        let second = cache.get_or_render(7, "rows", |_| {
            renders += 1;
            "other".to_string()
        });

        assert_eq!(renders, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn clear_drops_entries_but_keeps_counters() {
        let mut cache = RenderCache::default();
        cache.get_or_render(1, 'a', |_| 1);
        cache.clear();
        cache.get_or_render(1, 'a', |_| 2);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn colliding_key_with_other_input_renders_again() {
        let mut cache = RenderCache::default();
        let kenya = vec![yield_row("KE2001", 2018, 1.2)];
        let ethiopia = vec![yield_row("ET1001", 2019, 2.0); 3];
        let first = cache.get_or_render(42, kenya.clone(), Vec::len);
        let second = cache.get_or_render(42, ethiopia, Vec::len);

        assert_eq!((*first, *second), (1, 3));
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().entries, 2);

        let again = cache.get_or_render(42, kenya, |_| 99);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.stats().hits, 1);
    }
}
