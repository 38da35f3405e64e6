//! Persisted auth snapshot with a time-to-live.
//!
//! DESIGN
//! ======
//! The short-lived scope holds the authoritative marker and the cached user;
//! the durable scope only holds a copy of the marker. On cold start the
//! snapshot seeds the store before any network round trip, and
//! `should_revalidate` decides whether a background check is due.
//!
//! TRADE-OFFS
//! ==========
//! A marker may outlive its user cache (they are written together but read
//! with separate TTL checks). The store is then seeded as authenticated with
//! no user until validation fills it in; such a state is always re-validated,
//! whatever the last-check stamp says.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use serde::{Deserialize, Serialize};

use super::lock::duration_ms;
use crate::config::{AuthConfig, keys};
use crate::net::types::UserProfile;
use crate::state::auth::{AuthPatch, AuthState};
use crate::util::clock::SharedClock;
use crate::util::storage::{StorageScopes, load_json, save_json};

/// Session strategy recorded in the marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Session,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuthMarker {
    pub is_authenticated: bool,
    pub auth_type: AuthType,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedUserCache {
    pub user: UserProfile,
    pub timestamp: i64,
}

/// Snapshot restored from storage.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedAuth {
    pub user: Option<UserProfile>,
}

impl CachedAuth {
    pub fn into_patch(self) -> AuthPatch {
        AuthPatch::authenticated(self.user)
    }
}

pub struct AuthCache {
    scopes: StorageScopes,
    clock: SharedClock,
    config: AuthConfig,
}

impl AuthCache {
    pub fn new(scopes: StorageScopes, clock: SharedClock, config: AuthConfig) -> Self {
        Self { scopes, clock, config }
    }

    fn ttl_ms(&self) -> i64 {
        duration_ms(self.config.cache_expiry)
    }

    pub fn load(&self) -> Option<CachedAuth> {
        self.load_at(self.clock.now_ms())
    }

    /// Restore the cached snapshot if its marker is unexpired at `now`.
    pub fn load_at(&self, now: i64) -> Option<CachedAuth> {
        let marker: PersistedAuthMarker = load_json(self.scopes.session.as_ref(), keys::AUTH_STATE)
            .or_else(|| load_json(self.scopes.local.as_ref(), keys::AUTH_STATE))?;
        if !marker.is_authenticated || now - marker.timestamp >= self.ttl_ms() {
            return None;
        }
        let user = load_json::<PersistedUserCache>(self.scopes.session.as_ref(), keys::USER_CACHE)
            .filter(|cache| now - cache.timestamp < self.ttl_ms())
            .map(|cache| cache.user);
        Some(CachedAuth { user })
    }

    /// Whether the durable scope says this origin was ever signed in.
    pub fn was_ever_authenticated(&self) -> bool {
        load_json::<PersistedAuthMarker>(self.scopes.local.as_ref(), keys::AUTH_STATE)
            .is_some_and(|marker| marker.is_authenticated)
    }

    pub fn should_revalidate(&self, state: &AuthState) -> bool {
        self.should_revalidate_at(state, self.clock.now_ms())
    }

    /// Authenticated state needs a server check when it has no user yet or
    /// when the last check is missing, unreadable, or older than the cache TTL.
    pub fn should_revalidate_at(&self, state: &AuthState, now: i64) -> bool {
        if !state.is_authenticated {
            return false;
        }
        if state.user.is_none() {
            return true;
        }
        let Some(raw) = self.scopes.session.get(keys::LAST_CHECK) else {
            return true;
        };
        match raw.trim().parse::<i64>() {
            Ok(last_check) => now - last_check > self.ttl_ms(),
            Err(_) => true,
        }
    }

    pub fn persist_authenticated(&self, user: Option<&UserProfile>) {
        self.persist_authenticated_at(user, self.clock.now_ms());
    }

    /// Write the marker to both scopes and the user to the short-lived one.
    pub fn persist_authenticated_at(&self, user: Option<&UserProfile>, now: i64) {
        let marker = PersistedAuthMarker {
            is_authenticated: true,
            auth_type: AuthType::Session,
            timestamp: now,
        };
        save_json(self.scopes.session.as_ref(), keys::AUTH_STATE, &marker);
        save_json(self.scopes.local.as_ref(), keys::AUTH_STATE, &marker);
        match user {
            Some(user) => save_json(
                self.scopes.session.as_ref(),
                keys::USER_CACHE,
                &PersistedUserCache {
                    user: user.clone(),
                    timestamp: now,
                },
            ),
            None => self.scopes.session.remove(keys::USER_CACHE),
        }
    }

    pub fn clear(&self) {
        self.scopes.session.remove(keys::AUTH_STATE);
        self.scopes.session.remove(keys::USER_CACHE);
        self.scopes.local.remove(keys::AUTH_STATE);
    }
}
