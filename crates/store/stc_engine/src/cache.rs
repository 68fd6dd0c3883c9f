use std::sync::Arc;

use ahash::HashMap;
use parking_lot::{Mutex, RwLock};

use stc_density::{
    AdaptiveMaps, EngineConfig, TimeDomain, WarpTuning, compute_adaptive_maps_presorted,
};

// ---

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("failed to load the dataset timestamps: {0:#}")]
    Load(anyhow::Error),
}

// ---

/// All the timestamps of a dataset, without any filter applied.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetSnapshot {
    timestamps: Arc<[f64]>,
    domain: TimeDomain,
    row_count: usize,
}

impl DatasetSnapshot {
    /// The domain defaults to the extent of the timestamps and the row count to their number.
    ///
    /// NaNs are dropped, the rest is sorted.
    pub fn new(timestamps: impl IntoIterator<Item = f64>) -> Self {
        let mut timestamps: Vec<f64> = timestamps.into_iter().filter(|t| !t.is_nan()).collect();
        timestamps.sort_unstable_by(f64::total_cmp);

        let domain = TimeDomain::from_timestamps(&timestamps).unwrap_or_default();
        let row_count = timestamps.len();

        Self {
            timestamps: timestamps.into(),
            domain,
            row_count,
        }
    }

    /// Use an explicit domain, e.g. the one stored with the dataset.
    #[inline]
    pub fn with_domain(mut self, domain: TimeDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Use an explicit row count, e.g. when some rows have no timestamp.
    #[inline]
    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = row_count;
        self
    }

    /// Ascending.
    #[inline]
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    #[inline]
    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

/// Where the [`GlobalMapsCache`] gets its timestamps from.
pub trait TimestampSource: Send + Sync {
    fn load(&self) -> anyhow::Result<DatasetSnapshot>;
}

/// A source over data that is already in memory.
#[derive(Clone, Debug)]
pub struct InMemorySource(pub DatasetSnapshot);

impl TimestampSource for InMemorySource {
    fn load(&self) -> anyhow::Result<DatasetSnapshot> {
        Ok(self.0.clone())
    }
}

// ---

/// The adaptive maps of a whole dataset at one resolution.
///
/// Immutable once created.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAdaptiveMaps {
    pub bin_count: usize,
    pub kernel_width: usize,
    pub domain: TimeDomain,
    pub row_count: usize,

    /// Wall-clock time of the computation, in milliseconds since the Unix epoch.
    pub generated_at: u64,

    #[serde(flatten)]
    pub maps: AdaptiveMaps,
}

type Slot = Arc<Mutex<Option<Arc<GlobalAdaptiveMaps>>>>;

/// Memoizes the dataset-wide [`GlobalAdaptiveMaps`] per [`EngineConfig`].
///
/// Each key is computed at most once: concurrent first requests for the same key wait for
/// the one computing it, while requests for other keys proceed independently.
/// A failed computation is not cached.
pub struct GlobalMapsCache {
    source: Arc<dyn TimestampSource>,
    tuning: WarpTuning,

    /// Loaded lazily, shared by all keys.
    snapshot: Mutex<Option<Arc<DatasetSnapshot>>>,

    entries: RwLock<HashMap<EngineConfig, Slot>>,
}

impl GlobalMapsCache {
    pub fn new(source: Arc<dyn TimestampSource>) -> Self {
        Self {
            source,
            tuning: WarpTuning::default(),
            snapshot: Mutex::new(None),
            entries: RwLock::new(HashMap::default()),
        }
    }

    #[inline]
    pub fn with_tuning(mut self, tuning: WarpTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Return the cached maps for `config`, computing them first if needed.
    pub fn get_or_create(
        &self,
        config: EngineConfig,
    ) -> Result<Arc<GlobalAdaptiveMaps>, CacheError> {
        stc_tracing::profile_function!();

        let slot = self.slot(config);
        let mut entry = slot.lock();

        if let Some(maps) = entry.as_ref() {
            stc_log::trace!("Global adaptive maps cache hit for {config}");
            return Ok(Arc::clone(maps));
        }

        stc_log::debug!("Global adaptive maps cache miss for {config}, computing…");

        let snapshot = self.snapshot()?;
        let maps = compute_adaptive_maps_presorted(
            snapshot.timestamps(),
            snapshot.domain(),
            config,
            self.tuning,
        );

        let maps = Arc::new(GlobalAdaptiveMaps {
            bin_count: config.bin_count,
            kernel_width: config.kernel_width,
            domain: snapshot.domain(),
            row_count: snapshot.row_count(),
            generated_at: now_millis(),
            maps,
        });
        *entry = Some(Arc::clone(&maps));

        Ok(maps)
    }

    /// The cached maps for `config`, without computing anything.
    pub fn get(&self, config: EngineConfig) -> Option<Arc<GlobalAdaptiveMaps>> {
        let slot = self.entries.read().get(&config).cloned()?;
        slot.lock().clone()
    }

    /// Forget everything, including the loaded timestamps. Call when the dataset changes.
    pub fn invalidate(&self) {
        stc_log::debug!("Invalidating global adaptive maps cache");
        self.entries.write().clear();
        *self.snapshot.lock() = None;
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, config: EngineConfig) -> Slot {
        if let Some(slot) = self.entries.read().get(&config) {
            return Arc::clone(slot);
        }
        Arc::clone(self.entries.write().entry(config).or_default())
    }

    fn snapshot(&self) -> Result<Arc<DatasetSnapshot>, CacheError> {
        let mut snapshot = self.snapshot.lock();
        if let Some(snapshot) = snapshot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let loaded = {
            stc_tracing::profile_scope!("load_timestamps");
            Arc::new(self.source.load().map_err(CacheError::Load)?)
        };
        stc_log::debug!(
            "Loaded {} timestamps ({} rows) over {}",
            loaded.timestamps().len(),
            loaded.row_count(),
            loaded.domain()
        );

        *snapshot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }
}

fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_sorted_and_nan_free() {
        let snapshot = DatasetSnapshot::new([3.0, f64::NAN, 1.0, 2.0]);
        assert_eq!(snapshot.timestamps(), &[1.0, 2.0, 3.0]);
        assert_eq!(snapshot.domain(), TimeDomain::new(1.0, 3.0));
        assert_eq!(snapshot.row_count(), 3);

        let empty = DatasetSnapshot::new(Vec::<f64>::new());
        assert_eq!(empty.domain(), TimeDomain::default());
        assert_eq!(empty.row_count(), 0);
    }

    #[test]
    fn wire_format() {
        let maps = GlobalAdaptiveMaps {
            bin_count: 2,
            kernel_width: 0,
            domain: TimeDomain::new(0.0, 1.0),
            row_count: 5,
            generated_at: 1_700_000_000_000,
            maps: AdaptiveMaps::empty(TimeDomain::new(0.0, 1.0), 2),
        };
        let json = serde_json::to_value(&maps).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "binCount": 2,
                "kernelWidth": 0,
                "domain": [0.0, 1.0],
                "rowCount": 5,
                "generatedAt": 1_700_000_000_000_u64,
                "densityMap": [0.0, 0.0],
                "burstinessMap": [0.0, 0.0],
                "warpMap": [0.0, 1.0],
            })
        );
    }
}
