//! Wire DTOs for the auth REST boundary.
//!
//! DESIGN
//! ======
//! `UserProfile` keeps unknown server fields in `extra` so a cached profile
//! written by one client version stays lossless when read by another.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name → validation messages, as returned by the server on 422.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The signed-in user as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-side user identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email address.
    pub email: String,
    /// When the email address was verified, if it has been.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<String>,
    /// Avatar image URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Any other fields the server sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Email + password pair submitted by the login form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful login payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

/// Sign-up form submitted to `POST /register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            password_confirmation: password_confirmation.into(),
        }
    }
}

/// Successful registration payload. Some deployments omit the user until
/// the email address is verified.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /auth/google` body naming the provider consent page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OAuthRedirect {
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: FieldErrors,
}

/// Numeric ids are accepted and normalized to strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

/// Extract a user from a `GET /user` body.
///
/// The endpoint answers either `{ "user": {...} }` or the bare user object.
pub fn parse_user_payload(value: serde_json::Value) -> Option<UserProfile> {
    if let Some(user) = value.get("user") {
        return serde_json::from_value(user.clone()).ok();
    }
    serde_json::from_value(value).ok()
}
