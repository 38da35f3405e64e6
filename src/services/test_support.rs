//! Shared fixtures and test doubles for coordinator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::net::service::{AuthService, AuthServiceError};
use crate::net::types::{Credentials, LoginResponse, RegisterResponse, Registration, UserProfile};
use crate::util::clock::{SharedClock, TokioClock};

pub fn user(id: &str) -> UserProfile {
    UserProfile {
        id: id.to_owned(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        email_verified_at: None,
        avatar: None,
        extra: serde_json::Map::new(),
    }
}

/// Tokio-driven clock reading `ms` now; follows paused test time.
pub fn clock_at(ms: i64) -> SharedClock {
    Arc::new(TokioClock::starting_at(ms))
}

struct Step<T> {
    delay: Duration,
    result: Result<T, AuthServiceError>,
}

/// Auth Service double replaying scripted responses after scripted delays.
#[derive(Default)]
pub struct ScriptedAuthService {
    current_user: Mutex<VecDeque<Step<UserProfile>>>,
    login: Mutex<VecDeque<Step<LoginResponse>>>,
    logout_error: Mutex<Option<AuthServiceError>>,
    register: Mutex<Option<Result<RegisterResponse, AuthServiceError>>>,
    registrations: Mutex<Vec<Registration>>,
    google_redirect: Mutex<Option<Result<String, AuthServiceError>>>,
    current_user_calls: AtomicUsize,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    call_times: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_user(self, delay_ms: u64, result: Result<UserProfile, AuthServiceError>) -> Self {
        self.current_user.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            result,
        });
        self
    }

    pub fn then_login(self, delay_ms: u64, result: Result<UserProfile, AuthServiceError>) -> Self {
        self.login.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            result: result.map(|user| LoginResponse {
                user,
                message: Some("Login successful".to_owned()),
            }),
        });
        self
    }

    pub fn failing_logout(self, err: AuthServiceError) -> Self {
        *self.logout_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_register(self, result: Result<RegisterResponse, AuthServiceError>) -> Self {
        *self.register.lock().unwrap() = Some(result);
        self
    }

    pub fn with_google_redirect(self, result: Result<String, AuthServiceError>) -> Self {
        *self.google_redirect.lock().unwrap() = Some(result);
        self
    }

    /// Registration bodies received so far.
    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    /// Instants at which `current_user` was invoked.
    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.call_times.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl AuthService for ScriptedAuthService {
    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, AuthServiceError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.login.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Err(AuthServiceError::Rejected("no scripted login".to_owned()));
        };
        tokio::time::sleep(step.delay).await;
        step.result
    }

    async fn logout(&self) -> Result<(), AuthServiceError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        let err = self.logout_error.lock().unwrap().clone();
        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn current_user(&self) -> Result<UserProfile, AuthServiceError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(tokio::time::Instant::now());
        let step = self.current_user.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Err(AuthServiceError::Network("no scripted response".to_owned()));
        };
        tokio::time::sleep(step.delay).await;
        step.result
    }

    async fn register(&self, registration: &Registration) -> Result<RegisterResponse, AuthServiceError> {
        self.registrations.lock().unwrap().push(registration.clone());
        self.register
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(AuthServiceError::Rejected("no scripted registration".to_owned())))
    }

    async fn google_redirect_url(&self) -> Result<String, AuthServiceError> {
        self.google_redirect
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(AuthServiceError::Rejected("No redirect URL received".to_owned())))
    }
}
