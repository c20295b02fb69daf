use super::*;

fn token_json(expires_in: Option<u64>) -> String {
    serde_json::json!({
        "access_token": "at-1",
        "refresh_token": "rt-1",
        "expires_in": expires_in,
        "token_type": "bearer",
        "user": {
            "id": "8b9c",
            "email": "admin@school.example",
            "user_metadata": { "first_name": "Ada" }
        }
    })
    .to_string()
}

// =============================================================
// endpoint
// =============================================================

#[test]
fn endpoint_joins_without_double_slash() {
    assert_eq!(endpoint("https://auth.example/", USER_PATH), "https://auth.example/auth/v1/user");
    assert_eq!(
        endpoint("https://auth.example", PASSWORD_GRANT_PATH),
        "https://auth.example/auth/v1/token?grant_type=password"
    );
    assert_eq!(endpoint("https://auth.example", REFRESH_GRANT_PATH), "https://auth.example/auth/v1/token?grant_type=refresh_token");
    assert_eq!(endpoint("https://auth.example", LOGOUT_PATH), "https://auth.example/auth/v1/logout");
    assert_eq!(endpoint("https://auth.example", SIGNUP_PATH), "https://auth.example/auth/v1/signup");
}

// =============================================================
// User conversion
// =============================================================

#[test]
fn gotrue_user_maps_metadata_to_attributes() {
    let raw: GoTrueUser = serde_json::from_str(
        r#"{"id":"u1","email":"a@b.com","user_metadata":{"first_name":"Ada"},"aud":"authenticated"}"#,
    )
    .unwrap();
    let user: User = raw.into();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email.as_deref(), Some("a@b.com"));
    assert_eq!(user.attribute("first_name"), Some("Ada"));
}

#[test]
fn gotrue_user_tolerates_missing_email_and_metadata() {
    let raw: GoTrueUser = serde_json::from_str(r#"{"id":"u2","phone":"+1"}"#).unwrap();
    let user: User = raw.into();
    assert!(user.email.is_none());
    assert!(user.attributes.is_empty());
}

// =============================================================
// StoredSession
// =============================================================

#[test]
fn stored_session_computes_absolute_expiry() {
    let token: TokenResponse = serde_json::from_str(&token_json(Some(3600))).unwrap();
    let session = StoredSession::from_token(token, 1_000);
    assert_eq!(session.expires_at, Some(4_600));
    assert_eq!(session.refresh_token.as_deref(), Some("rt-1"));
    assert_eq!(session.user.id, "8b9c");
}

#[test]
fn needs_refresh_within_margin() {
    let token: TokenResponse = serde_json::from_str(&token_json(Some(3600))).unwrap();
    let session = StoredSession::from_token(token, 0);
    assert!(!session.needs_refresh(3_000));
    assert!(session.needs_refresh(3_540));
    assert!(session.needs_refresh(10_000));
}

#[test]
fn needs_refresh_false_without_refresh_token_or_expiry() {
    let token: TokenResponse = serde_json::from_str(&token_json(None)).unwrap();
    let session = StoredSession::from_token(token, 0);
    assert!(!session.needs_refresh(u64::MAX));

    let token: TokenResponse = serde_json::from_str(&token_json(Some(10))).unwrap();
    let session = StoredSession { refresh_token: None, ..StoredSession::from_token(token, 0) };
    assert!(!session.needs_refresh(1_000));
}

#[test]
fn decode_stored_session_round_trip_and_garbage() {
    let token: TokenResponse = serde_json::from_str(&token_json(Some(60))).unwrap();
    let session = StoredSession::from_token(token, 5);
    let raw = serde_json::to_string(&session).unwrap();
    assert_eq!(decode_stored_session(&raw), Some(session));
    assert_eq!(decode_stored_session("not json"), None);
    assert_eq!(decode_stored_session("{}"), None);
}

// =============================================================
// Errors
// =============================================================

#[test]
fn error_message_prefers_description_fields_in_order() {
    assert_eq!(
        error_message(400, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
        "Invalid login credentials"
    );
    assert_eq!(error_message(422, r#"{"msg":"Password should be at least 6 characters"}"#), "Password should be at least 6 characters");
    assert_eq!(error_message(400, r#"{"message":"User already registered"}"#), "User already registered");
    assert_eq!(error_message(400, r#"{"error":"invalid_request"}"#), "invalid_request");
}

#[test]
fn error_message_falls_back_to_status() {
    assert_eq!(error_message(502, "<html>bad gateway</html>"), "request failed: 502");
    assert_eq!(error_message(400, r#"{"msg":"  "}"#), "request failed: 400");
}

#[test]
fn classify_failure_splits_client_and_server_errors() {
    assert_eq!(
        classify_failure(400, r#"{"error_description":"Invalid login credentials"}"#),
        IdentityError::AuthFailure("Invalid login credentials".to_owned())
    );
    assert!(matches!(classify_failure(429, "{}"), IdentityError::AuthFailure(_)));
    assert!(matches!(classify_failure(500, "{}"), IdentityError::ProviderUnavailable(_)));
    assert!(matches!(classify_failure(503, ""), IdentityError::ProviderUnavailable(_)));
}

// =============================================================
// Signup response
// =============================================================

#[test]
fn signup_response_with_session() {
    let token = parse_signup_response(&token_json(Some(3600))).unwrap();
    assert_eq!(token.map(|t| t.access_token), Some("at-1".to_owned()));
}

#[test]
fn signup_response_pending_confirmation() {
    let body = r#"{"id":"u9","email":"new@school.example","confirmation_sent_at":"2024-01-01T00:00:00Z"}"#;
    assert!(parse_signup_response(body).unwrap().is_none());
}

#[test]
fn signup_response_garbage_is_provider_error() {
    assert!(matches!(parse_signup_response("oops"), Err(IdentityError::ProviderUnavailable(_))));
}
