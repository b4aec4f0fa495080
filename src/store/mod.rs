use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::request::{DeliveryRequest, RequestStatus};

/// Why a conditional update did not land. `Conflict` is a legitimate
/// business race, not a fault; the calling component translates it into
/// its own domain error instead of retrying.
#[derive(Debug)]
pub enum CasFailure {
    NotFound,
    Conflict { actual: RequestStatus },
    Vetoed(AppError),
}

/// In-process system of record for delivery requests. Requests are never
/// deleted; terminal states stay around for history and stats.
#[derive(Default)]
pub struct RequestStore {
    requests: DashMap<Uuid, DeliveryRequest>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    pub fn create(&self, request: DeliveryRequest) -> Uuid {
        let id = request.id;
        self.requests.insert(id, request);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<DeliveryRequest> {
        self.requests.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Snapshot of the whole table for read projections. May lag concurrent
    /// writers slightly; the write path never relies on it.
    pub fn snapshot(&self) -> Vec<DeliveryRequest> {
        self.requests
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// The sole write primitive for state transitions. Holds the entry's
    /// exclusive lock across the status comparison, the guard checks inside
    /// `mutate`, and the write-back, so concurrent callers on the same id
    /// serialize and exactly one compare-and-set wins.
    ///
    /// `mutate` runs against a draft; if it vetoes, the stored value is
    /// untouched.
    pub fn update_if_status<F>(
        &self,
        id: Uuid,
        expected: RequestStatus,
        mutate: F,
    ) -> Result<DeliveryRequest, CasFailure>
    where
        F: FnOnce(&mut DeliveryRequest) -> Result<(), AppError>,
    {
        let mut entry = self.requests.get_mut(&id).ok_or(CasFailure::NotFound)?;

        if entry.status != expected {
            return Err(CasFailure::Conflict {
                actual: entry.status,
            });
        }

        let mut draft = entry.value().clone();
        mutate(&mut draft).map_err(CasFailure::Vetoed)?;

        *entry.value_mut() = draft.clone();
        Ok(draft)
    }
}
