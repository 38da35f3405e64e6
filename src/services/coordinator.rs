//! Auth coordinator: the public auth API for UI code.
//!
//! ARCHITECTURE
//! ============
//! Composes the store, the storage lease, the TTL cache and the request table
//! around an injected [`AuthService`]. One coordinator is built at the root
//! of the app and shared by cloning the handle (see `state::context`).
//!
//! Lifecycle: `Uninitialized -> Initializing -> {Authenticated, Unauthenticated}`,
//! then `Authenticated <-> Unauthenticated` through login, logout and
//! re-validation. `is_initialized` flips once and stays set.
//!
//! ERROR HANDLING
//! ==============
//! No public operation returns `Err`. Failures become [`AuthOutcome`]
//! messages and `AuthState::error`; superseded results are dropped without
//! touching state; only session expiry signs the user out.

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;

use std::sync::Arc;

use super::cache::AuthCache;
use super::lock::LockCoordinator;
use super::requests::{RequestKind, RequestTracker};
use crate::config::AuthConfig;
use crate::net::service::{AuthOutcome, AuthService, AuthServiceError, SESSION_EXPIRED_MESSAGE};
use crate::net::types::{Credentials, Registration, UserProfile};
use crate::state::auth::{AuthPatch, AuthState, AuthStore, Subscription};
use crate::util::clock::SharedClock;
use crate::util::storage::StorageScopes;

/// How a validation round ended when it did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Validation {
    Authenticated,
    Expired,
    Superseded,
}

struct Inner {
    store: AuthStore,
    lock: LockCoordinator,
    cache: AuthCache,
    requests: RequestTracker,
    service: Arc<dyn AuthService>,
    clock: SharedClock,
    config: AuthConfig,
}

/// Cheaply cloneable handle to the process-wide auth coordinator.
#[derive(Clone)]
pub struct AuthCoordinator {
    inner: Arc<Inner>,
}

/// Releases the lease and marks initialization finished, even if the
/// `initialize` future is dropped mid-validation.
struct InitializeGuard<'a> {
    inner: &'a Inner,
}

impl Drop for InitializeGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock.release();
        self.inner
            .store
            .update(AuthPatch::loading(false).with_initialized());
    }
}

impl AuthCoordinator {
    pub fn new(
        service: Arc<dyn AuthService>,
        scopes: StorageScopes,
        clock: SharedClock,
        config: AuthConfig,
    ) -> Self {
        let inner = Inner {
            store: AuthStore::new(scopes.session.clone(), clock.clone()),
            lock: LockCoordinator::new(scopes.session.clone(), clock.clone(), config),
            cache: AuthCache::new(scopes, clock.clone(), config),
            requests: RequestTracker::new(),
            service,
            clock,
            config,
        };
        Self { inner: Arc::new(inner) }
    }

    /// Coordinator wired to the REST API, web storage and browser timers.
    #[cfg(feature = "hydrate")]
    pub fn browser(api: crate::config::AuthApiConfig) -> Self {
        Self::new(
            Arc::new(crate::net::api::HttpAuthService::new(api)),
            StorageScopes::browser(),
            Arc::new(crate::util::clock::BrowserClock),
            AuthConfig::default(),
        )
    }

    pub fn state(&self) -> AuthState {
        self.inner.store.snapshot()
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.inner.store.subscribe(observer)
    }

    /// Whether the durable scope remembers a previous sign-in on this origin.
    pub fn was_ever_authenticated(&self) -> bool {
        self.inner.cache.was_ever_authenticated()
    }

    /// Restore cached state and re-validate it if due.
    ///
    /// Safe to call repeatedly: once initialized this returns immediately.
    /// If another instance holds the lease, waits for it (bounded) and then
    /// adopts whatever that instance cached.
    pub async fn initialize(&self) {
        let inner = &*self.inner;
        if inner.store.snapshot().is_initialized {
            return;
        }
        inner.store.update(AuthPatch::loading(true));

        if !inner.lock.acquire() {
            log::debug!("auth initialization running elsewhere; waiting for lease");
            inner.lock.wait_for_release().await;
            self.seed_from_cache();
            inner
                .store
                .update(AuthPatch::loading(false).with_initialized());
            return;
        }

        let _guard = InitializeGuard { inner };
        self.seed_from_cache();
        if inner.cache.should_revalidate(&inner.store.snapshot()) {
            // Failures are already reflected in state.
            let _ = self.revalidate().await;
        }
    }

    /// Confirm the session with the server.
    pub async fn validate_authentication(&self) -> AuthOutcome {
        match self.revalidate().await {
            Ok(Validation::Authenticated) => AuthOutcome::ok(),
            Ok(Validation::Expired) => AuthOutcome::failure(SESSION_EXPIRED_MESSAGE),
            Ok(Validation::Superseded) => AuthOutcome::cancelled(),
            Err(err) => err.into(),
        }
    }

    /// Sign in with email and password.
    ///
    /// A pending validation is cancelled first so its late result cannot
    /// overwrite the login.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let inner = &*self.inner;
        let credentials = Credentials::new(email, password);

        inner.requests.cancel(RequestKind::Validate);
        let handle = inner.requests.begin(RequestKind::Login);
        inner
            .store
            .update(AuthPatch::loading(true).with_error(None));

        let result = inner.service.login(&credentials).await;
        if handle.is_cancelled() {
            log::debug!("dropping superseded login result");
            return AuthOutcome::cancelled();
        }
        inner.requests.finish(&handle);

        match result {
            Ok(response) => {
                self.set_authenticated(response.user);
                AuthOutcome::ok_with_message(response.message)
            }
            Err(err) => {
                log::warn!("login failed: {err}");
                inner
                    .store
                    .update(AuthPatch::failed(err.to_string()).with_loading(false));
                err.into()
            }
        }
    }

    /// Create an account.
    ///
    /// Auth state is left alone: a new account signs in through [`Self::login`]
    /// (or after verifying its email). Field errors pass through verbatim.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> AuthOutcome {
        let registration = Registration::new(name, email, password, password_confirmation);
        match self.inner.service.register(&registration).await {
            Ok(response) => AuthOutcome::ok_with_message(response.message),
            Err(err) => {
                log::warn!("registration failed: {err}");
                err.into()
            }
        }
    }

    /// Start Google sign-in.
    ///
    /// The outcome carries the provider URL; in the browser the page is sent
    /// there as well. The callback lands back on the app and is confirmed by
    /// [`Self::handle_google_auth_session`].
    pub async fn google_auth(&self) -> AuthOutcome {
        match self.inner.service.google_redirect_url().await {
            Ok(url) => {
                #[cfg(feature = "hydrate")]
                crate::util::auth::redirect_to(&url);
                AuthOutcome::redirect(url)
            }
            Err(err) => {
                log::warn!("google sign-in could not start: {err}");
                err.into()
            }
        }
    }

    /// Sign out locally, telling the server on a best-effort basis.
    pub async fn logout(&self) -> AuthOutcome {
        let inner = &*self.inner;
        inner.requests.cancel_all();
        inner.store.update(AuthPatch::loading(true));

        if let Err(err) = inner.service.logout().await {
            log::warn!("logout request failed, clearing local state anyway: {err}");
        }

        self.set_unauthenticated();
        AuthOutcome::ok()
    }

    /// Confirm a session the server created during an OAuth redirect.
    ///
    /// The session cookie may not be visible yet when the callback page loads,
    /// so transient failures are retried with a linear backoff.
    pub async fn handle_google_auth_session(&self) -> AuthOutcome {
        let config = self.inner.config;
        let max_attempts = config.max_retries.max(1);

        let mut attempt = 1;
        loop {
            let delay = config.backoff_for(attempt);
            if !delay.is_zero() {
                self.inner.clock.sleep(delay).await;
            }

            match self.revalidate().await {
                Ok(_) => return AuthOutcome::ok(),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    log::debug!("oauth session not confirmed (attempt {attempt}/{max_attempts}): {err}");
                    attempt += 1;
                }
                Err(err) => {
                    log::warn!("oauth session could not be confirmed: {err}");
                    self.set_unauthenticated();
                    return AuthOutcome::failure(err.to_string());
                }
            }
        }
    }

    /// Page teardown: cancel requests, drop observers, release our lease.
    pub fn destroy(&self) {
        let inner = &*self.inner;
        inner.requests.cancel_all();
        inner.store.clear_observers();
        inner.lock.release_if_held();
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn seed_from_cache(&self) {
        if let Some(cached) = self.inner.cache.load() {
            log::debug!("restored cached auth state (user cached: {})", cached.user.is_some());
            self.inner.store.seed(cached.into_patch());
        }
    }

    /// One `current_user` round trip.
    ///
    /// `Err` is returned only for failures that leave the auth flag alone;
    /// those are also written to `AuthState::error`.
    async fn revalidate(&self) -> Result<Validation, AuthServiceError> {
        let inner = &*self.inner;
        let handle = inner.requests.begin(RequestKind::Validate);
        inner
            .store
            .update(AuthPatch::loading(true).with_error(None));

        let result = inner.service.current_user().await;
        if handle.is_cancelled() {
            log::debug!("dropping superseded validation result");
            return Ok(Validation::Superseded);
        }
        inner.requests.finish(&handle);

        match result {
            Ok(user) => {
                self.set_authenticated(user);
                Ok(Validation::Authenticated)
            }
            Err(err) if err.is_session_expired() => {
                log::debug!("session expired during validation");
                self.set_unauthenticated();
                Ok(Validation::Expired)
            }
            Err(err) => {
                log::warn!("auth validation failed: {err}");
                let mut patch = AuthPatch::failed(err.to_string()).with_loading(false);
                // Authenticated requires a known user; the cache stays for the next load.
                if inner.store.snapshot().user.is_none() {
                    patch.is_authenticated = Some(false);
                }
                inner.store.update(patch);
                Err(err)
            }
        }
    }

    fn set_authenticated(&self, user: UserProfile) {
        self.inner.cache.persist_authenticated(Some(&user));
        self.inner
            .store
            .update(AuthPatch::authenticated(Some(user)).with_loading(false));
    }

    fn set_unauthenticated(&self) {
        self.inner.cache.clear();
        self.inner
            .store
            .update(AuthPatch::unauthenticated().with_loading(false));
    }
}
