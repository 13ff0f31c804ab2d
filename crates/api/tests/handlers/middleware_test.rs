use argon2::PasswordVerifier;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};
use pretty_assertions::assert_eq;
use rstest::rstest;
use scoutplan_api::middleware::{auth, error_handling::map_error};
use scoutplan_core::{
    errors::PlanError,
    models::{program::Program, user::User},
    time::ClockTime,
};

use crate::test_utils::{sample_activity, sample_program, sample_user};

#[rstest]
#[case(PlanError::NotFound("Program".into()), StatusCode::NOT_FOUND)]
#[case(PlanError::Validation("Invalid input".into()), StatusCode::BAD_REQUEST)]
#[case(PlanError::Authentication("No token".into()), StatusCode::UNAUTHORIZED)]
#[case(PlanError::Authorization("Not yours".into()), StatusCode::FORBIDDEN)]
#[case(PlanError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn test_error_status_mapping(#[case] error: PlanError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = PlanError::Internal(Box::new(std::io::Error::other("Internal error")));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let response = map_error(PlanError::Validation("name is required".into()));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        body,
        serde_json::json!({ "error": "Validation error: name is required" })
    );
}

#[test]
fn test_hash_password_verifies() {
    let password = "correct horse battery";
    let hashed = auth::hash_password(password).unwrap();

    assert!(hashed.starts_with("$argon2"));
    assert_ne!(hashed, password);

    let argon2 = argon2::Argon2::default();
    let parsed_hash = argon2::PasswordHash::new(&hashed).unwrap();
    assert!(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok());
    assert!(argon2.verify_password(b"wrong_password", &parsed_hash).is_err());
}

#[test]
fn test_hash_password_salts_each_hash() {
    let first = auth::hash_password("same password").unwrap();
    let second = auth::hash_password("same password").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_session_tokens_are_random_alphanumeric() {
    let token = auth::generate_session_token();
    assert_eq!(token.len(), auth::SESSION_TOKEN_LEN);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(token, auth::generate_session_token());
}

#[rstest]
#[case("Bearer abc123", Some("abc123"))]
#[case("bearer   abc123  ", Some("abc123"))]
#[case("Basic abc123", None)]
#[case("Bearer", None)]
#[case("Bearer    ", None)]
fn test_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(header).unwrap());

    assert_eq!(auth::bearer_token(&headers), expected);
}

#[test]
fn test_bearer_token_missing_header() {
    assert_eq!(auth::bearer_token(&HeaderMap::new()), None);
}

fn owned_by(owner: &User, is_public: bool) -> Program {
    let mut program = sample_program(owner.id, ClockTime::from_hm(9, 0));
    program.is_public = is_public;
    program
}

#[test]
fn test_owner_checks() {
    let owner = sample_user(false);
    let stranger = sample_user(false);
    let private = owned_by(&owner, false);

    assert!(auth::ensure_owner(&private, &owner).is_ok());
    assert!(matches!(
        auth::ensure_owner(&private, &stranger),
        Err(PlanError::Authorization(_))
    ));
}

#[test]
fn test_visibility_checks() {
    let owner = sample_user(false);
    let stranger = sample_user(false);
    let private = owned_by(&owner, false);
    let public = owned_by(&owner, true);

    assert!(auth::ensure_visible(&private, Some(&owner)).is_ok());
    assert!(auth::ensure_visible(&private, Some(&stranger)).is_err());
    assert!(auth::ensure_visible(&private, None).is_err());
    assert!(auth::ensure_visible(&public, None).is_ok());
    assert!(auth::ensure_visible(&public, Some(&stranger)).is_ok());
}

#[test]
fn test_public_program_is_still_owner_only_for_writes() {
    let owner = sample_user(false);
    let stranger = sample_user(false);
    let public = owned_by(&owner, true);

    assert!(auth::ensure_owner(&public, &stranger).is_err());
}

#[test]
fn test_admin_check() {
    assert!(auth::ensure_admin(&sample_user(true)).is_ok());
    assert!(matches!(
        auth::ensure_admin(&sample_user(false)),
        Err(PlanError::Authorization(_))
    ));
}

#[test]
fn test_activity_edit_rights() {
    let creator = sample_user(false);
    let admin = sample_user(true);
    let stranger = sample_user(false);
    let activity = sample_activity(Some(creator.id), 30, false);

    assert!(auth::ensure_can_edit_activity(&activity, &creator).is_ok());
    assert!(auth::ensure_can_edit_activity(&activity, &admin).is_ok());
    assert!(auth::ensure_can_edit_activity(&activity, &stranger).is_err());
}

#[test]
fn test_unapproved_activity_hidden_from_others() {
    let creator = sample_user(false);
    let admin = sample_user(true);
    let stranger = sample_user(false);
    let pending = sample_activity(Some(creator.id), 30, false);
    let approved = sample_activity(Some(creator.id), 30, true);

    assert!(auth::ensure_activity_visible(&pending, Some(&creator)).is_ok());
    assert!(auth::ensure_activity_visible(&pending, Some(&admin)).is_ok());
    assert!(matches!(
        auth::ensure_activity_visible(&pending, Some(&stranger)),
        Err(PlanError::NotFound(_))
    ));
    assert!(auth::ensure_activity_visible(&pending, None).is_err());
    assert!(auth::ensure_activity_visible(&approved, None).is_ok());
}
