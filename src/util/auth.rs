//! Shared auth route-guard helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected pages apply identical unauthenticated redirect behavior, except
//! on the OAuth callback landing, which must be allowed to render so it can
//! confirm the new session.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

pub const SIGNIN_PATH: &str = "/signin";

/// Whether the query string marks an OAuth callback (`google_auth=success`).
pub fn is_google_callback(search: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == "google_auth" && value == "success")
}

/// Redirect once initialization has finished without a signed-in user.
pub fn should_redirect_unauth(state: &AuthState, search: &str) -> bool {
    state.is_initialized && !state.is_authenticated && !is_google_callback(search)
}

/// Redirect to the sign-in page whenever [`should_redirect_unauth`] holds.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    let location = leptos_router::hooks::use_location();
    Effect::new(move || {
        let state = auth.get();
        let search = location.search.get();
        if should_redirect_unauth(&state, &search) {
            navigate(
                SIGNIN_PATH,
                NavigateOptions {
                    replace: true,
                    ..NavigateOptions::default()
                },
            );
        }
    });
}

/// Send the whole page to an external URL (OAuth provider).
#[cfg(feature = "hydrate")]
pub fn redirect_to(url: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.location().set_href(url) {
        log::warn!("redirect to {url} failed: {err:?}");
    }
}
