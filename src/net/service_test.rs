use super::*;

#[test]
fn session_expired_displays_sign_in_message() {
    assert_eq!(AuthServiceError::SessionExpired.to_string(), SESSION_EXPIRED_MESSAGE);
}

#[test]
fn only_network_errors_are_transient() {
    assert!(AuthServiceError::Network("offline".to_owned()).is_transient());
    assert!(!AuthServiceError::SessionExpired.is_transient());
    assert!(!AuthServiceError::Rejected("Invalid credentials".to_owned()).is_transient());
}

#[test]
fn validation_error_converts_with_field_errors() {
    let mut errors = FieldErrors::new();
    errors.insert("email".to_owned(), vec!["The email must be a valid email address.".to_owned()]);
    let outcome = AuthOutcome::from(AuthServiceError::Validation {
        message: "The given data was invalid.".to_owned(),
        errors: errors.clone(),
    });
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("The given data was invalid."));
    assert_eq!(outcome.errors, Some(errors));
}

#[test]
fn rejected_error_converts_to_plain_failure() {
    let outcome = AuthOutcome::from(AuthServiceError::Rejected("Invalid credentials".to_owned()));
    assert_eq!(outcome, AuthOutcome::failure("Invalid credentials"));
}

#[test]
fn outcome_serializes_without_empty_fields() {
    let json = serde_json::to_value(AuthOutcome::ok()).unwrap();
    assert_eq!(json, serde_json::json!({"success": true}));
}

#[test]
fn redirect_outcome_carries_url() {
    let json = serde_json::to_value(AuthOutcome::redirect("https://accounts.google.com/o/oauth2")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"success": true, "redirect_url": "https://accounts.google.com/o/oauth2"})
    );
}
