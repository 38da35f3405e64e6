//! # board-auth
//!
//! Authentication core for the project-board browser client.
//!
//! The crate owns the client-side auth state coordinator: it reconciles
//! page-load validation, explicit login/logout and OAuth callbacks while
//! several tabs share the same persisted storage. Pages and components read
//! state through the Leptos context installed by [`state::context`].
//!
//! Browser-only pieces (web storage, HTTP via `gloo-net`, timers) are gated
//! behind the `hydrate` feature; native builds and tests use in-memory
//! storage and tokio timers.

pub mod config;
pub mod net;
pub mod services;
pub mod state;
pub mod util;

pub use config::{AuthApiConfig, AuthConfig};
pub use net::service::{AuthOutcome, AuthService, AuthServiceError};
pub use services::coordinator::AuthCoordinator;
pub use state::auth::AuthState;

/// Install browser console logging and the panic hook.
///
/// Safe to call more than once; later calls are ignored by `console_log`.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
