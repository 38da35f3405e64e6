//! Auth Service boundary consumed by the coordinator.
//!
//! ERROR HANDLING
//! ==============
//! `AuthServiceError` separates the failures the coordinator reacts to
//! differently: session expiry logs the user out, validation and rejection
//! are passed through to forms, network failures are treated as transient.
//! Public coordinator operations fold all of them into [`AuthOutcome`].

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use async_trait::async_trait;
use serde::Serialize;

use super::types::{Credentials, FieldErrors, LoginResponse, RegisterResponse, Registration, UserProfile};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";
pub const CANCELLED_MESSAGE: &str = "cancelled";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AuthServiceError {
    /// The server no longer recognizes the session (HTTP 401).
    #[error("Session expired. Please sign in again.")]
    SessionExpired,
    /// Structured field errors (HTTP 422).
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },
    /// Definitive refusal with a server-provided message.
    #[error("{0}")]
    Rejected(String),
    /// Transport failure or anything else worth retrying.
    #[error("{0}")]
    Network(String),
}

impl AuthServiceError {
    /// Whether this failure should end the authenticated session locally.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Network boundary for login, logout and session validation.
///
/// Implementations run on the browser's single-threaded event loop, so the
/// returned futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthServiceError>;

    /// End the server-side session.
    async fn logout(&self) -> Result<(), AuthServiceError>;

    /// Fetch the user bound to the current session.
    async fn current_user(&self) -> Result<UserProfile, AuthServiceError>;

    /// Create an account. The caller signs in separately.
    async fn register(&self, registration: &Registration) -> Result<RegisterResponse, AuthServiceError>;

    /// Provider URL that starts the Google OAuth flow.
    async fn google_redirect_url(&self) -> Result<String, AuthServiceError>;
}

/// Result object returned by every public coordinator operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Where the browser is sent next (OAuth start).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl AuthOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn ok_with_message(message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            ..Self::default()
        }
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            success: true,
            redirect_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn cancelled() -> Self {
        Self::failure(CANCELLED_MESSAGE)
    }
}

impl From<AuthServiceError> for AuthOutcome {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Validation { message, errors } => Self {
                success: false,
                message: Some(message),
                errors: Some(errors),
                redirect_url: None,
            },
            other => Self::failure(other.to_string()),
        }
    }
}
