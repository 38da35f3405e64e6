//! Leptos bridge for the auth coordinator.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root component builds one [`AuthCoordinator`] and calls
//! [`provide_auth`]; descendants read the mirrored `RwSignal<AuthState>` with
//! [`use_auth`] and call operations through [`use_auth_coordinator`].

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use leptos::prelude::*;

use super::auth::AuthState;
use crate::services::coordinator::AuthCoordinator;

/// Provide the coordinator and a signal mirroring its state.
///
/// In the browser this also starts initialization and tears the coordinator
/// down on `beforeunload`.
pub fn provide_auth(coordinator: AuthCoordinator) -> RwSignal<AuthState> {
    let auth = RwSignal::new(coordinator.state());
    let subscription = coordinator.subscribe(move |state| auth.set(state.clone()));
    on_cleanup(move || subscription.unsubscribe());

    provide_context(coordinator.clone());
    provide_context(auth);

    #[cfg(feature = "hydrate")]
    {
        let init = coordinator.clone();
        leptos::task::spawn_local(async move {
            init.initialize().await;
        });
        let _ = window_event_listener(leptos::ev::beforeunload, move |_| coordinator.destroy());
    }

    auth
}

/// Mirrored auth state.
///
/// # Panics
///
/// Panics when called outside a tree set up by [`provide_auth`].
pub fn use_auth() -> RwSignal<AuthState> {
    expect_context::<RwSignal<AuthState>>()
}

/// The shared coordinator.
///
/// # Panics
///
/// Panics when called outside a tree set up by [`provide_auth`].
pub fn use_auth_coordinator() -> AuthCoordinator {
    expect_context::<AuthCoordinator>()
}
