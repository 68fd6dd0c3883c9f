use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;
use parking_lot::Mutex;

use stc_density::{EngineConfig, TimeDomain};

use crate::{ComputeEvent, Debouncer, Orchestrator, RequestHandle};

/// Spatial part of a filter, in both scene and geographic coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// A stable textual fingerprint of the active filters.
///
/// Only used to decide whether the adaptive maps need recomputing;
/// the actual filtering happens before the timestamps reach the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterSignature(String);

impl FilterSignature {
    /// `types|districts|start:end|minX:maxX:minZ:maxZ:minLat:maxLat:minLon:maxLon`,
    /// with `none` for an absent time range or spatial bounds.
    pub fn new<S: std::fmt::Display>(
        selected_types: &[S],
        selected_districts: &[S],
        time_range: Option<(f64, f64)>,
        spatial_bounds: Option<&SpatialBounds>,
    ) -> Self {
        fn join<S: std::fmt::Display>(items: &[S]) -> String {
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }

        let time_range = time_range
            .map_or_else(|| "none".to_owned(), |(start, end)| format!("{start}:{end}"));

        let spatial = spatial_bounds.map_or_else(
            || "none".to_owned(),
            |b| {
                format!(
                    "{}:{}:{}:{}:{}:{}:{}:{}",
                    b.min_x, b.max_x, b.min_z, b.max_z, b.min_lat, b.max_lat, b.min_lon, b.max_lon
                )
            },
        );

        Self(format!(
            "{}|{}|{time_range}|{spatial}",
            join(selected_types),
            join(selected_districts)
        ))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FilterSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ---

/// Everything that decides whether a recomputation is needed.
#[derive(Clone, Debug)]
struct TriggerKey {
    signature: FilterSignature,
    series: Arc<[f64]>,
    domain: TimeDomain,
    config: EngineConfig,
}

impl PartialEq for TriggerKey {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
            && self.domain == other.domain
            && self.config == other.config
            && same_series(&self.series, &other.series)
    }
}

/// Same timestamps, bit for bit. Data that changed but kept its length is a change.
fn same_series(a: &Arc<[f64]>, b: &Arc<[f64]>) -> bool {
    Arc::ptr_eq(a, b)
        || (a.len() == b.len()
            && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()))
}

/// Debounces filter/resolution changes into [`Orchestrator`] submissions.
///
/// A trigger whose inputs match the last submitted ones is skipped (and cancels anything
/// still pending), so returning to the current state does not recompute.
pub struct AdaptiveController {
    orchestrator: Arc<Orchestrator>,
    last_submitted: Arc<Mutex<Option<(TriggerKey, RequestHandle)>>>,
    debouncer: Debouncer<TriggerKey>,
}

impl AdaptiveController {
    pub fn new(orchestrator: Arc<Orchestrator>, delay: Duration) -> std::io::Result<Self> {
        let last_submitted = Arc::new(Mutex::new(None));

        let debouncer = Debouncer::new("stc_engine::debounce", delay, {
            let orchestrator = Arc::clone(&orchestrator);
            let last_submitted = Arc::clone(&last_submitted);
            move |key: TriggerKey| {
                let handle = orchestrator.submit(Arc::clone(&key.series), key.domain, key.config);
                *last_submitted.lock() = Some((key, handle));
            }
        })?;

        Ok(Self {
            orchestrator,
            last_submitted,
            debouncer,
        })
    }

    #[inline]
    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    #[inline]
    pub fn subscribe(&self) -> Receiver<ComputeEvent> {
        self.orchestrator.subscribe()
    }

    /// Request a recomputation once the inputs have been stable for the debounce delay.
    ///
    /// Returns `false` if the inputs are the ones already submitted.
    pub fn trigger(
        &self,
        signature: FilterSignature,
        series: impl Into<Arc<[f64]>>,
        domain: TimeDomain,
        config: EngineConfig,
    ) -> bool {
        let key = TriggerKey {
            signature,
            series: series.into(),
            domain,
            config,
        };

        let unchanged = self
            .last_submitted
            .lock()
            .as_ref()
            .is_some_and(|(last, _)| *last == key);
        if unchanged {
            stc_log::trace!("Adaptive inputs unchanged ({}), not recomputing", key.signature);
            self.debouncer.cancel();
            return false;
        }

        self.debouncer.trigger(key);
        true
    }

    /// Submit whatever is pending right now, and return the handle of the last submission.
    pub fn flush(&self) -> Option<RequestHandle> {
        self.debouncer.flush();
        self.last_submitted
            .lock()
            .as_ref()
            .map(|(_, handle)| handle.clone())
    }

    /// Drop the pending trigger, if any.
    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}
