//! REST implementation of [`AuthService`].
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, sending the session
//! cookie with every request.
//! Server-side (SSR) and native builds: every call fails with a network
//! error since these endpoints are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! HTTP statuses are mapped onto `AuthServiceError` here so the coordinator
//! never inspects status codes or message text.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;

use super::service::{AuthService, AuthServiceError};
#[cfg(any(test, feature = "hydrate"))]
use super::types::{ErrorBody, OAuthRedirect};
use super::types::{Credentials, LoginResponse, RegisterResponse, Registration, UserProfile};
use crate::config::AuthApiConfig;

#[cfg(any(test, feature = "hydrate"))]
const STATUS_UNAUTHORIZED: u16 = 401;
#[cfg(any(test, feature = "hydrate"))]
const STATUS_UNPROCESSABLE: u16 = 422;

#[cfg(any(test, feature = "hydrate"))]
fn http_error_message(status: u16) -> String {
    format!("HTTP error! status: {status}")
}

/// Map a non-2xx response onto the error taxonomy.
#[cfg(any(test, feature = "hydrate"))]
fn status_error(status: u16, body: ErrorBody) -> AuthServiceError {
    match status {
        STATUS_UNAUTHORIZED => AuthServiceError::SessionExpired,
        STATUS_UNPROCESSABLE => AuthServiceError::Validation {
            message: body.message.unwrap_or_else(|| "Validation failed".to_owned()),
            errors: body.errors,
        },
        _ => AuthServiceError::Rejected(body.message.unwrap_or_else(|| http_error_message(status))),
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn network_error(detail: &str) -> AuthServiceError {
    if detail.trim().is_empty() {
        AuthServiceError::Network("Network error occurred".to_owned())
    } else {
        AuthServiceError::Network(detail.to_owned())
    }
}

/// Pull the provider URL out of a `GET /auth/google` body.
#[cfg(any(test, feature = "hydrate"))]
fn redirect_url_from(body: OAuthRedirect) -> Result<String, AuthServiceError> {
    body.redirect_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AuthServiceError::Rejected("No redirect URL received".to_owned()))
}

/// Session-cookie REST client for the auth endpoints.
#[derive(Clone, Debug, Default)]
pub struct HttpAuthService {
    config: AuthApiConfig,
}

impl HttpAuthService {
    pub fn new(config: AuthApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthApiConfig {
        &self.config
    }
}

#[cfg(feature = "hydrate")]
fn with_defaults(builder: gloo_net::http::RequestBuilder) -> gloo_net::http::RequestBuilder {
    builder
        .header("Accept", "application/json")
        .header("X-Requested-With", "XMLHttpRequest")
        .credentials(web_sys::RequestCredentials::Include)
}

#[cfg(feature = "hydrate")]
async fn error_from_response(resp: gloo_net::http::Response) -> AuthServiceError {
    let status = resp.status();
    let body = resp.json::<ErrorBody>().await.unwrap_or_default();
    status_error(status, body)
}

#[async_trait(?Send)]
impl AuthService for HttpAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthServiceError> {
        #[cfg(feature = "hydrate")]
        {
            let url = self.config.endpoint("/login");
            let resp = with_defaults(gloo_net::http::Request::post(&url))
                .json(credentials)
                .map_err(|e| network_error(&e.to_string()))?
                .send()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            if !resp.ok() {
                return Err(error_from_response(resp).await);
            }
            resp.json::<LoginResponse>()
                .await
                .map_err(|e| network_error(&e.to_string()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = credentials;
            Err(AuthServiceError::Network("not available on server".to_owned()))
        }
    }

    async fn logout(&self) -> Result<(), AuthServiceError> {
        #[cfg(feature = "hydrate")]
        {
            let url = self.config.endpoint("/logout");
            let resp = with_defaults(gloo_net::http::Request::post(&url))
                .send()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            if !resp.ok() {
                return Err(error_from_response(resp).await);
            }
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(AuthServiceError::Network("not available on server".to_owned()))
        }
    }

    async fn current_user(&self) -> Result<UserProfile, AuthServiceError> {
        #[cfg(feature = "hydrate")]
        {
            let url = self.config.endpoint("/user");
            let resp = with_defaults(gloo_net::http::Request::get(&url))
                .send()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            if !resp.ok() {
                return Err(error_from_response(resp).await);
            }
            let body = resp
                .json::<serde_json::Value>()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            super::types::parse_user_payload(body)
                .ok_or_else(|| AuthServiceError::Rejected("Failed to get user data".to_owned()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(AuthServiceError::Network("not available on server".to_owned()))
        }
    }

    async fn register(&self, registration: &Registration) -> Result<RegisterResponse, AuthServiceError> {
        #[cfg(feature = "hydrate")]
        {
            let url = self.config.endpoint("/register");
            let resp = with_defaults(gloo_net::http::Request::post(&url))
                .json(registration)
                .map_err(|e| network_error(&e.to_string()))?
                .send()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            if !resp.ok() {
                return Err(error_from_response(resp).await);
            }
            Ok(resp.json::<RegisterResponse>().await.unwrap_or_default())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = registration;
            Err(AuthServiceError::Network("not available on server".to_owned()))
        }
    }

    async fn google_redirect_url(&self) -> Result<String, AuthServiceError> {
        #[cfg(feature = "hydrate")]
        {
            let url = self.config.endpoint("/auth/google");
            let resp = with_defaults(gloo_net::http::Request::get(&url))
                .send()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            if !resp.ok() {
                return Err(error_from_response(resp).await);
            }
            let body = resp
                .json::<OAuthRedirect>()
                .await
                .map_err(|e| network_error(&e.to_string()))?;
            redirect_url_from(body)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(AuthServiceError::Network("not available on server".to_owned()))
        }
    }
}
