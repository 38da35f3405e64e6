use super::*;
use crate::net::types::FieldErrors;

#[test]
fn unauthorized_maps_to_session_expired() {
    let err = status_error(401, ErrorBody::default());
    assert!(err.is_session_expired());
}

#[test]
fn unprocessable_maps_to_validation_with_fields() {
    let mut errors = FieldErrors::new();
    errors.insert("password".to_owned(), vec!["The password field is required.".to_owned()]);
    let body = ErrorBody {
        message: Some("The given data was invalid.".to_owned()),
        errors: errors.clone(),
    };
    assert_eq!(
        status_error(422, body),
        AuthServiceError::Validation {
            message: "The given data was invalid.".to_owned(),
            errors,
        }
    );
}

#[test]
fn unprocessable_without_message_uses_fallback() {
    let err = status_error(422, ErrorBody::default());
    assert_eq!(err.to_string(), "Validation failed");
}

#[test]
fn other_status_prefers_server_message() {
    let body = ErrorBody {
        message: Some("Invalid credentials".to_owned()),
        ..ErrorBody::default()
    };
    assert_eq!(status_error(403, body), AuthServiceError::Rejected("Invalid credentials".to_owned()));
}

#[test]
fn other_status_without_message_formats_status() {
    let err = status_error(500, ErrorBody::default());
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[test]
fn blank_network_detail_gets_generic_message() {
    assert_eq!(network_error("  ").to_string(), "Network error occurred");
    assert_eq!(network_error("connection refused").to_string(), "connection refused");
}

#[cfg(not(feature = "hydrate"))]
#[tokio::test]
async fn native_build_reports_network_failure() {
    let service = HttpAuthService::default();
    let err = service.current_user().await.unwrap_err();
    assert!(err.is_transient());
    assert!(service.logout().await.is_err());
    assert!(service.login(&Credentials::new("a@b.com", "secret")).await.is_err());
    let registration = Registration::new("Ada", "a@b.com", "secret", "secret");
    assert!(service.register(&registration).await.unwrap_err().is_transient());
    assert!(service.google_redirect_url().await.unwrap_err().is_transient());
}

#[test]
fn endpoints_resolve_against_configured_base() {
    let service = HttpAuthService::new(AuthApiConfig::new("https://board.example.com/api/"));
    assert_eq!(service.config().endpoint("/register"), "https://board.example.com/api/register");
    assert_eq!(service.config().endpoint("/auth/google"), "https://board.example.com/api/auth/google");
}

// =============================================================
// register
// =============================================================

#[test]
fn register_confirmation_mismatch_passes_field_errors_through() {
    let mut errors = FieldErrors::new();
    errors.insert("password".to_owned(), vec!["The password confirmation does not match.".to_owned()]);
    errors.insert("email".to_owned(), vec!["The email has already been taken.".to_owned()]);
    let body = ErrorBody {
        message: Some("The password confirmation does not match. (and 1 more error)".to_owned()),
        errors: errors.clone(),
    };
    match status_error(422, body) {
        AuthServiceError::Validation { errors: got, .. } => assert_eq!(got, errors),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn register_conflict_without_body_is_rejected() {
    assert_eq!(
        status_error(409, ErrorBody::default()),
        AuthServiceError::Rejected("HTTP error! status: 409".to_owned())
    );
}

// =============================================================
// google redirect
// =============================================================

#[test]
fn redirect_url_is_read_from_body() {
    let body: OAuthRedirect = serde_json::from_value(serde_json::json!({
        "redirect_url": "https://accounts.google.com/o/oauth2/auth?client_id=abc"
    }))
    .unwrap();
    assert_eq!(
        redirect_url_from(body).unwrap(),
        "https://accounts.google.com/o/oauth2/auth?client_id=abc"
    );
}

#[test]
fn missing_or_blank_redirect_url_is_rejected() {
    let missing: OAuthRedirect = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(
        redirect_url_from(missing),
        Err(AuthServiceError::Rejected("No redirect URL received".to_owned()))
    );
    let blank = OAuthRedirect {
        redirect_url: Some("  ".to_owned()),
    };
    assert!(redirect_url_from(blank).is_err());
}
