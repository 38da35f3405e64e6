use std::time::Duration;

use super::*;
use crate::services::test_support::{clock_at, user};
use crate::util::storage::Storage;

const T0: i64 = 1_700_000_000_000;
const FIVE_MIN: i64 = 300_000;

fn cache() -> (AuthCache, StorageScopes) {
    let scopes = StorageScopes::in_memory();
    let cache = AuthCache::new(scopes.clone(), clock_at(T0), AuthConfig::default());
    (cache, scopes)
}

fn authenticated() -> AuthState {
    AuthState {
        user: Some(user("u-1")),
        is_authenticated: true,
        ..AuthState::default()
    }
}

// =============================================================
// load
// =============================================================

#[tokio::test(start_paused = true)]
async fn load_returns_none_without_marker() {
    let (cache, _) = cache();
    assert!(cache.load_at(T0).is_none());
}

#[tokio::test(start_paused = true)]
async fn fresh_entries_are_served() {
    let (cache, _) = cache();
    cache.persist_authenticated_at(Some(&user("u-1")), T0);
    let cached = cache.load_at(T0 + FIVE_MIN - 1).unwrap();
    assert_eq!(cached.user, Some(user("u-1")));
}

#[tokio::test(start_paused = true)]
async fn entries_older_than_ttl_are_never_served() {
    let (cache, _) = cache();
    cache.persist_authenticated_at(Some(&user("u-1")), T0);
    for age in [FIVE_MIN, FIVE_MIN + 1, 10 * FIVE_MIN] {
        assert!(cache.load_at(T0 + age).is_none(), "age {age} should be expired");
    }
}

#[tokio::test(start_paused = true)]
async fn stale_user_cache_is_dropped_but_marker_survives() {
    let (cache, scopes) = cache();
    cache.persist_authenticated_at(Some(&user("u-1")), T0 - FIVE_MIN);
    // Marker refreshed later, user cache left behind.
    save_json(
        scopes.session.as_ref(),
        keys::AUTH_STATE,
        &PersistedAuthMarker {
            is_authenticated: true,
            auth_type: AuthType::Session,
            timestamp: T0,
        },
    );
    let cached = cache.load_at(T0 + 1).unwrap();
    assert!(cached.user.is_none());
}

#[tokio::test(start_paused = true)]
async fn durable_marker_is_fallback_when_session_scope_empty() {
    let (cache, scopes) = cache();
    cache.persist_authenticated_at(Some(&user("u-1")), T0);
    scopes.session.remove(keys::AUTH_STATE);
    scopes.session.remove(keys::USER_CACHE);

    let cached = cache.load_at(T0 + 1).unwrap();
    assert!(cached.user.is_none());
}

#[tokio::test(start_paused = true)]
async fn unauthenticated_marker_is_ignored() {
    let (cache, scopes) = cache();
    save_json(
        scopes.session.as_ref(),
        keys::AUTH_STATE,
        &PersistedAuthMarker {
            is_authenticated: false,
            auth_type: AuthType::Session,
            timestamp: T0,
        },
    );
    assert!(cache.load_at(T0).is_none());
}

#[tokio::test(start_paused = true)]
async fn marker_uses_camel_case_layout() {
    let (cache, scopes) = cache();
    cache.persist_authenticated_at(None, T0);
    let raw: serde_json::Value = serde_json::from_str(&scopes.local.get(keys::AUTH_STATE).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({"isAuthenticated": true, "authType": "session", "timestamp": T0})
    );
    assert!(scopes.session.get(keys::USER_CACHE).is_none());
}

#[tokio::test(start_paused = true)]
async fn clear_removes_marker_and_user_from_all_scopes() {
    let (cache, scopes) = cache();
    cache.persist_authenticated_at(Some(&user("u-1")), T0);
    assert!(cache.was_ever_authenticated());

    cache.clear();

    assert!(scopes.session.get(keys::AUTH_STATE).is_none());
    assert!(scopes.session.get(keys::USER_CACHE).is_none());
    assert!(scopes.local.get(keys::AUTH_STATE).is_none());
    assert!(!cache.was_ever_authenticated());
}

// =============================================================
// should_revalidate
// =============================================================

#[tokio::test(start_paused = true)]
async fn unauthenticated_state_never_revalidates() {
    let (cache, _) = cache();
    assert!(!cache.should_revalidate_at(&AuthState::default(), T0));
}

#[tokio::test(start_paused = true)]
async fn missing_last_check_triggers_revalidation() {
    let (cache, _) = cache();
    assert!(cache.should_revalidate_at(&authenticated(), T0));
}

#[tokio::test(start_paused = true)]
async fn recent_last_check_skips_revalidation() {
    let (cache, scopes) = cache();
    scopes.session.set(keys::LAST_CHECK, &T0.to_string());
    assert!(!cache.should_revalidate_at(&authenticated(), T0 + FIVE_MIN));
    assert!(cache.should_revalidate_at(&authenticated(), T0 + FIVE_MIN + 1));
}

#[tokio::test(start_paused = true)]
async fn unreadable_last_check_triggers_revalidation() {
    let (cache, scopes) = cache();
    scopes.session.set(keys::LAST_CHECK, "yesterday");
    assert!(cache.should_revalidate_at(&authenticated(), T0));
}

#[tokio::test(start_paused = true)]
async fn authenticated_state_without_user_always_revalidates() {
    let (cache, scopes) = cache();
    scopes.session.set(keys::LAST_CHECK, &T0.to_string());
    let marker_only = AuthState {
        is_authenticated: true,
        ..AuthState::default()
    };
    assert!(cache.should_revalidate_at(&marker_only, T0 + 1));
}

#[tokio::test(start_paused = true)]
async fn shorter_cache_expiry_narrows_the_window() {
    let scopes = StorageScopes::in_memory();
    let config = AuthConfig::default().with_cache_expiry(Duration::from_secs(60));
    let cache = AuthCache::new(scopes.clone(), clock_at(T0), config);
    cache.persist_authenticated_at(Some(&user("u-1")), T0);

    assert!(cache.load_at(T0 + 59_999).is_some());
    assert!(cache.load_at(T0 + 60_000).is_none());

    scopes.session.set(keys::LAST_CHECK, &T0.to_string());
    assert!(!cache.should_revalidate_at(&authenticated(), T0 + 60_000));
    assert!(cache.should_revalidate_at(&authenticated(), T0 + 60_001));
}
