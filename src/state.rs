use crate::observability::metrics::Metrics;
use crate::store::RequestStore;

pub struct AppState {
    pub requests: RequestStore,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            requests: RequestStore::new(),
            metrics: Metrics::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
