//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthStore` owns the only copy of [`AuthState`]. The coordinator writes
//! partial updates into it; route guards and user-aware components observe
//! it through subscriptions (see [`super::context`] for the Leptos bridge).
//!
//! DESIGN
//! ======
//! Observers run synchronously after every merge, outside the state lock, so
//! an observer may read the store again without deadlocking.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::config::keys;
use crate::net::types::UserProfile;
use crate::util::clock::SharedClock;
use crate::util::storage::SharedStorage;

/// Authentication state shared with the UI.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub is_initialized: bool,
    pub error: Option<String>,
}

/// Coordinator lifecycle as derived from [`AuthState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    Uninitialized,
    Initializing,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        match (self.is_initialized, self.is_loading, self.is_authenticated) {
            (false, false, _) => AuthPhase::Uninitialized,
            (false, true, _) => AuthPhase::Initializing,
            (true, _, true) => AuthPhase::Authenticated,
            (true, _, false) => AuthPhase::Unauthenticated,
        }
    }

    /// Merge every field present in `patch`.
    pub fn apply(&mut self, patch: &AuthPatch) {
        if let Some(user) = &patch.user {
            self.user.clone_from(user);
        }
        if let Some(flag) = patch.is_authenticated {
            self.is_authenticated = flag;
        }
        if let Some(flag) = patch.is_loading {
            self.is_loading = flag;
        }
        if let Some(flag) = patch.is_initialized {
            self.is_initialized = flag;
        }
        if let Some(error) = &patch.error {
            self.error.clone_from(error);
        }
    }
}

/// Partial update to [`AuthState`]; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthPatch {
    pub user: Option<Option<UserProfile>>,
    pub is_authenticated: Option<bool>,
    pub is_loading: Option<bool>,
    pub is_initialized: Option<bool>,
    pub error: Option<Option<String>>,
}

impl AuthPatch {
    /// Signed in as `user`, clearing any previous error.
    pub fn authenticated(user: Option<UserProfile>) -> Self {
        Self {
            user: Some(user),
            is_authenticated: Some(true),
            error: Some(None),
            ..Self::default()
        }
    }

    /// Signed out, clearing user and error.
    pub fn unauthenticated() -> Self {
        Self {
            user: Some(None),
            is_authenticated: Some(false),
            error: Some(None),
            ..Self::default()
        }
    }

    pub fn loading(flag: bool) -> Self {
        Self {
            is_loading: Some(flag),
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(Some(message.into())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_loading(mut self, flag: bool) -> Self {
        self.is_loading = Some(flag);
        self
    }

    #[must_use]
    pub fn with_initialized(mut self) -> Self {
        self.is_initialized = Some(true);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = Some(error);
        self
    }
}

// =============================================================================
// STORE
// =============================================================================

type Observer = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: Vec<(u64, Observer)>,
}

/// Handle returned by [`AuthStore::subscribe`].
///
/// Dropping it keeps the observer registered; call [`Subscription::unsubscribe`]
/// to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    observers: Weak<Mutex<Observers>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(observers) = self.observers.upgrade() {
            lock(&observers).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("count", &self.entries.len()).finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the current [`AuthState`] snapshot.
pub struct AuthStore {
    state: Mutex<AuthState>,
    observers: Arc<Mutex<Observers>>,
    session: SharedStorage,
    clock: SharedClock,
}

impl AuthStore {
    /// `session` receives the last-check stamp written on auth flag changes.
    pub fn new(session: SharedStorage, clock: SharedClock) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            observers: Arc::new(Mutex::new(Observers::default())),
            session,
            clock,
        }
    }

    pub fn snapshot(&self) -> AuthState {
        lock(&self.state).clone()
    }

    /// Merge `patch`, stamp `last_auth_check` if it touches the auth flag,
    /// and notify observers.
    pub fn update(&self, patch: AuthPatch) -> AuthState {
        let snapshot = self.merge(&patch);
        if patch.is_authenticated.is_some() {
            self.session.set(keys::LAST_CHECK, &self.clock.now_ms().to_string());
        }
        self.notify(&snapshot);
        snapshot
    }

    /// Merge state restored from cache.
    ///
    /// Unlike [`AuthStore::update`], this never writes `last_auth_check`, even
    /// though the patch sets the auth flag: a restored snapshot is not a server
    /// confirmation, and stamping it would suppress the revalidation that
    /// follows a cold start.
    pub fn seed(&self, patch: AuthPatch) -> AuthState {
        let snapshot = self.merge(&patch);
        self.notify(&snapshot);
        snapshot
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let mut observers = lock(&self.observers);
        observers.next_id += 1;
        let id = observers.next_id;
        observers.entries.push((id, Arc::new(observer)));
        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.observers).entries.len()
    }

    pub fn clear_observers(&self) {
        lock(&self.observers).entries.clear();
    }

    fn merge(&self, patch: &AuthPatch) -> AuthState {
        let mut state = lock(&self.state);
        state.apply(patch);
        state.clone()
    }

    fn notify(&self, snapshot: &AuthState) {
        let observers: Vec<Observer> = lock(&self.observers)
            .entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(snapshot);
        }
    }
}
