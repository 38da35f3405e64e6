//! Advisory initialization lease in shared storage.
//!
//! DESIGN
//! ======
//! Web storage has no compare-and-swap, so the lease is best effort: two
//! instances that both read "no lock" will both write one and both validate.
//! That costs one redundant network call, never corrupt state. A record older
//! than `lock_timeout` counts as abandoned, so a crashed holder cannot starve
//! other instances, and waiters give up after `lock_wait_timeout`.

#[cfg(test)]
#[path = "lock_test.rs"]
mod lock_test;

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{AuthConfig, keys};
use crate::util::clock::SharedClock;
use crate::util::storage::{SharedStorage, load_json, save_json};

/// Persisted lease record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Epoch-ms when the lease was taken.
    pub timestamp: i64,
    /// Random token identifying the holder.
    pub id: String,
}

pub(crate) fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

pub struct LockCoordinator {
    storage: SharedStorage,
    clock: SharedClock,
    config: AuthConfig,
    held: Mutex<Option<String>>,
}

impl LockCoordinator {
    pub fn new(storage: SharedStorage, clock: SharedClock, config: AuthConfig) -> Self {
        Self {
            storage,
            clock,
            config,
            held: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<LockRecord> {
        load_json(self.storage.as_ref(), keys::AUTH_LOCK)
    }

    /// Whether an unexpired lease exists at `now`.
    pub fn is_locked_at(&self, now: i64) -> bool {
        self.current()
            .is_some_and(|record| now - record.timestamp < duration_ms(self.config.lock_timeout))
    }

    pub fn acquire(&self) -> bool {
        self.acquire_at(self.clock.now_ms())
    }

    /// Take the lease unless an unexpired one exists at `now`.
    pub fn acquire_at(&self, now: i64) -> bool {
        if self.is_locked_at(now) {
            return false;
        }
        let record = LockRecord {
            timestamp: now,
            id: uuid::Uuid::new_v4().simple().to_string(),
        };
        save_json(self.storage.as_ref(), keys::AUTH_LOCK, &record);
        *self.held.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.id);
        true
    }

    /// Delete the lease regardless of who wrote it.
    pub fn release(&self) {
        self.storage.remove(keys::AUTH_LOCK);
        self.held.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Delete the lease only if this instance wrote it.
    pub fn release_if_held(&self) -> bool {
        let Some(id) = self.held.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return false;
        };
        match self.current() {
            Some(record) if record.id == id => {
                self.storage.remove(keys::AUTH_LOCK);
                true
            }
            _ => false,
        }
    }

    /// Poll until the lease disappears or the wait timeout elapses.
    ///
    /// Never fails: returns `false` when giving up, and the caller proceeds
    /// anyway.
    pub async fn wait_for_release(&self) -> bool {
        let started = self.clock.now_ms();
        let timeout = duration_ms(self.config.lock_wait_timeout);
        loop {
            if self.storage.get(keys::AUTH_LOCK).is_none() {
                return true;
            }
            if self.clock.now_ms() - started >= timeout {
                log::warn!("auth lock still held after {timeout}ms; proceeding");
                return false;
            }
            self.clock.sleep(self.config.lock_poll_interval).await;
        }
    }
}
