//! In-flight request table with per-name supersession.
//!
//! DESIGN
//! ======
//! Each logical request (`validate`, `login`) has at most one live handle.
//! Beginning a new one cancels the previous handle, so only the latest
//! operation per name may apply its result. Cancellation is cooperative: the
//! owner checks its handle after every await point and drops stale results.

#[cfg(test)]
#[path = "requests_test.rs"]
mod requests_test;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Logical request names tracked by the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Validate,
    Login,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Login => "login",
        }
    }
}

/// Cancellation handle for one in-flight request.
#[derive(Clone, Debug)]
pub struct RequestHandle {
    kind: RequestKind,
    seq: u64,
    token: CancellationToken,
}

impl RequestHandle {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct TrackerInner {
    next_seq: u64,
    entries: HashMap<RequestKind, RequestHandle>,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    inner: Mutex<TrackerInner>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a fresh handle for `kind`, cancelling any previous one.
    pub fn begin(&self, kind: RequestKind) -> RequestHandle {
        let mut inner = self.inner();
        inner.next_seq += 1;
        let handle = RequestHandle {
            kind,
            seq: inner.next_seq,
            token: CancellationToken::new(),
        };
        if let Some(previous) = inner.entries.insert(kind, handle.clone()) {
            log::debug!("superseding request: kind={} seq={}", kind.as_str(), previous.seq);
            previous.token.cancel();
        }
        handle
    }

    /// Drop the table entry if it still belongs to `handle`.
    ///
    /// Returns `false` for a completion that was already superseded.
    pub fn finish(&self, handle: &RequestHandle) -> bool {
        let mut inner = self.inner();
        match inner.entries.get(&handle.kind) {
            Some(current) if current.seq == handle.seq => {
                inner.entries.remove(&handle.kind);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&self, kind: RequestKind) {
        if let Some(handle) = self.inner().entries.remove(&kind) {
            handle.token.cancel();
        }
    }

    pub fn cancel_all(&self) {
        let drained: Vec<RequestHandle> = self.inner().entries.drain().map(|(_, h)| h).collect();
        for handle in drained {
            handle.token.cancel();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner().entries.len()
    }

    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        self.inner().entries.contains_key(&kind)
    }
}
