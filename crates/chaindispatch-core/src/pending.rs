//! Pending-request table for asynchronous dispatch.
//!
//! Maps a [`RequestId`] to the handle of the task running that call. Entries
//! are inserted by `request_async` and taken exactly once by
//! `receive_blocking`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::DispatchError;
use crate::id::RequestId;

/// Handle of a dispatched call.
pub type PendingHandle = JoinHandle<Result<Value, DispatchError>>;

/// Thread-safe map of in-flight asynchronous requests.
#[derive(Default)]
pub struct PendingRequests {
    entries: Mutex<HashMap<RequestId, PendingHandle>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, PendingHandle>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a dispatched call.
    pub fn insert(&self, id: RequestId, handle: PendingHandle) {
        if self.lock().insert(id.clone(), handle).is_some() {
            // The displaced task keeps running; its result is unreachable.
            tracing::warn!(request_id = %id, "replacing pending request with duplicate id");
        }
    }

    /// Remove and return the handle for `id`.
    pub fn take(&self, id: &RequestId) -> Option<PendingHandle> {
        self.lock().remove(id)
    }

    /// Number of calls dispatched but not yet received.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
