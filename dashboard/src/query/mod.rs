//! Fetch-on-mount data loaders.
//!
//! A [`Fetcher`] owns one [`Resource`] and the parameters it was last asked
//! to load. Every fetch takes a generation ticket; a result is only applied
//! while its ticket is still the newest, so a slow response for an old
//! parameter set (or one that lands after [`Fetcher::unmount`]) is dropped.

pub mod brands;
pub mod catalog;
pub mod content;
pub mod evaluations;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, warn};

use crate::api::GeoApi;
use crate::error::Result;

pub use brands::{BrandQuery, BrandsQuery, ScoreHistoryQuery};
pub use catalog::{IndustryCategoriesQuery, ModelCatalog, ModelsQuery, PromptCategoriesQuery, PromptList, PromptsQuery};
pub use content::{ArticlesQuery, DiagnosisHistoryQuery, ReportQuery};
pub use evaluations::{start_evaluation, EvaluationDetailQuery, EvaluationResultsQuery, EvaluationRunsQuery};

#[derive(Clone, Debug, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

/// Generation ticket handed out by [`Resource::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Slot<T> {
    state: FetchState<T>,
    generation: u64,
}

/// Shared loading/error/data cell.
#[derive(Debug)]
pub struct Resource<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone + Default> Resource<T> {
    /// A resource that will be fetched on mount: `loading` starts true.
    pub fn new() -> Self {
        Self::with_loading(true)
    }

    /// A resource waiting on a dependency: `loading` starts false.
    pub fn idle() -> Self {
        Self::with_loading(false)
    }

    fn with_loading(loading: bool) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                state: FetchState {
                    data: T::default(),
                    loading,
                    error: None,
                },
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.lock().state.clone()
    }

    pub fn begin(&self) -> Ticket {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.state.loading = true;
        slot.state.error = None;
        Ticket(slot.generation)
    }

    /// Apply a finished fetch. Returns false when the ticket is stale and
    /// the result was discarded. On failure the previous data is kept.
    pub fn settle(&self, ticket: Ticket, result: std::result::Result<T, String>) -> bool {
        let mut slot = self.lock();
        if ticket.0 != slot.generation {
            debug!(ticket = ticket.0, current = slot.generation, "discarding stale fetch result");
            return false;
        }
        match result {
            Ok(data) => {
                slot.state.data = data;
                slot.state.error = None;
            }
            Err(message) => {
                slot.state.error = Some(message);
            }
        }
        slot.state.loading = false;
        true
    }

    /// Drop back to the empty state and invalidate anything in flight.
    pub fn reset(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.state = FetchState {
            data: T::default(),
            loading: false,
            error: None,
        };
    }

    /// Invalidate anything in flight, keeping current data.
    pub fn cancel(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.state.loading = false;
    }
}

impl<T: Clone + Default> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters for one kind of fetch.
pub trait Query: Clone + PartialEq + Send + Sync + 'static {
    type Output: Clone + Default + Send + 'static;

    /// Prefix for the error message shown when the fetch fails.
    const FAILURE: &'static str;

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output>;

    /// False when a required dependency (e.g. a selected id) is missing.
    fn enabled(&self) -> bool {
        true
    }
}

pub struct Fetcher<Q: Query> {
    api: Arc<dyn GeoApi>,
    params: Mutex<Q>,
    resource: Resource<Q::Output>,
}

impl<Q: Query> Fetcher<Q> {
    /// Create the fetcher without loading anything yet.
    pub fn new(api: Arc<dyn GeoApi>, params: Q) -> Arc<Self> {
        let resource = if params.enabled() {
            Resource::new()
        } else {
            Resource::idle()
        };
        Arc::new(Self {
            api,
            params: Mutex::new(params),
            resource,
        })
    }

    /// Create the fetcher and start the initial load in the background.
    pub fn mount(api: Arc<dyn GeoApi>, params: Q) -> Arc<Self> {
        let fetcher = Self::new(api, params);
        fetcher.refetch();
        fetcher
    }

    pub fn state(&self) -> FetchState<Q::Output> {
        self.resource.snapshot()
    }

    pub fn params(&self) -> Q {
        self.params.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn resource(&self) -> &Resource<Q::Output> {
        &self.resource
    }

    /// Load with the current parameters on the calling thread.
    pub fn refetch_blocking(&self) {
        let params = self.params();
        if !params.enabled() {
            self.resource.reset();
            return;
        }
        let ticket = self.resource.begin();
        let result = params.run(self.api.as_ref()).map_err(|e| {
            warn!(query = Q::FAILURE, error = %e, "fetch failed");
            format!("{}: {}", Q::FAILURE, e)
        });
        self.resource.settle(ticket, result);
    }

    /// Load with the current parameters on a background thread.
    pub fn refetch(self: &Arc<Self>) -> thread::JoinHandle<()> {
        let params = self.params();
        if !params.enabled() {
            self.resource.reset();
            return thread::spawn(|| {});
        }
        // Take the ticket before spawning so ordering follows call order.
        let ticket = self.resource.begin();
        let fetcher = Arc::clone(self);
        thread::spawn(move || {
            let result = params.run(fetcher.api.as_ref()).map_err(|e| {
                warn!(query = Q::FAILURE, error = %e, "fetch failed");
                format!("{}: {}", Q::FAILURE, e)
            });
            fetcher.resource.settle(ticket, result);
        })
    }

    /// Swap parameters; refetches only when they actually changed.
    pub fn set_params(self: &Arc<Self>, params: Q) -> Option<thread::JoinHandle<()>> {
        {
            let mut current = self.params.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == params {
                return None;
            }
            *current = params;
        }
        Some(self.refetch())
    }

    /// Stop caring about in-flight loads.
    pub fn unmount(&self) {
        self.resource.cancel();
    }
}

/// Type-erased handle so a page can mount and unmount a mixed set of
/// fetchers.
pub trait Loader: Send + Sync {
    fn load(self: Arc<Self>) -> thread::JoinHandle<()>;
    fn load_blocking(&self);
    fn cancel(&self);
}

impl<Q: Query> Loader for Fetcher<Q> {
    fn load(self: Arc<Self>) -> thread::JoinHandle<()> {
        self.refetch()
    }

    fn load_blocking(&self) {
        self.refetch_blocking();
    }

    fn cancel(&self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_resource_starts_loading() {
        let r: Resource<Vec<u32>> = Resource::new();
        let s = r.snapshot();
        assert!(s.loading);
        assert!(s.data.is_empty());
        assert!(s.error.is_none());
        assert!(!Resource::<Vec<u32>>::idle().snapshot().loading);
    }

    #[test]
    fn failure_keeps_previous_data() {
        let r: Resource<Vec<u32>> = Resource::new();
        let t = r.begin();
        assert!(r.settle(t, Ok(vec![1, 2, 3])));

        let t = r.begin();
        assert!(r.settle(t, Err("Failed to fetch brands: boom".into())));
        let s = r.snapshot();
        assert_eq!(s.data, vec![1, 2, 3]);
        assert_eq!(s.error.as_deref(), Some("Failed to fetch brands: boom"));
        assert!(!s.loading);
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let r: Resource<u32> = Resource::new();
        let old = r.begin();
        let new = r.begin();
        assert!(r.settle(new, Ok(2)));
        assert!(!r.settle(old, Ok(1)));
        assert_eq!(r.snapshot().data, 2);
    }

    #[test]
    fn cancel_discards_in_flight_result() {
        let r: Resource<u32> = Resource::new();
        let t = r.begin();
        r.cancel();
        assert!(!r.settle(t, Ok(9)));
        let s = r.snapshot();
        assert_eq!(s.data, 0);
        assert!(!s.loading);
    }

    #[test]
    fn success_clears_previous_error() {
        let r: Resource<u32> = Resource::new();
        let t = r.begin();
        r.settle(t, Err("x".into()));
        let t = r.begin();
        r.settle(t, Ok(5));
        assert_eq!(r.snapshot().error, None);
    }
}
