//! Session lifecycle tests: login, restore, logout and profile updates

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serde_json::json;
use ticketflow::models::{PlanTier, UpdateProfileRequest, User, UserRole};
use ticketflow::state::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use ticketflow::TicketflowError;

#[tokio::test]
async fn test_login_persists_token_and_user() {
    let ctx = TestContext::new().await;
    let token = valid_token();
    ctx.mock.mock_login_success(&token, user_json("organizer")).await;
    ctx.mock
        .mock_success("GET", "/subscriptions/current", subscription_json("pro", "active"))
        .await;

    let user = ctx.session.login("anna@example.ch", TEST_PASSWORD).await.unwrap();

    assert_eq!(user.role, UserRole::Organizer);
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), Some(token.clone()));
    let stored: User = serde_json::from_str(&ctx.storage.get(USER_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored.id, "user-1");

    assert!(ctx.session.is_authenticated().await);
    assert!(ctx.session.has_required_subscription(PlanTier::Pro).await);
    assert!(!ctx.session.has_required_subscription(PlanTier::Enterprise).await);
    assert_eq!(ctx.services.api.token().await, Some(token));
}

#[tokio::test]
async fn test_login_failure_leaves_session_empty() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_login_failure().await;

    let result = ctx.session.login("anna@example.ch", "wrong-password").await;

    assert_matches!(result, Err(TicketflowError::Authentication(message)) if message == "Invalid email or password");
    assert_eq!(ctx.session.user().await, None);
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(ctx.storage.get(USER_KEY).await.unwrap(), None);
    assert!(!ctx.services.api.has_token().await);
}

#[tokio::test]
async fn test_login_envelope_failure_with_ok_status() {
    let ctx = TestContext::new().await;
    ctx.mock
        .mock_json(
            "POST",
            "/auth/login",
            200,
            json!({ "success": false, "message": "Account locked" }),
            MockResponseConfig::default(),
        )
        .await;

    let result = ctx.session.login("anna@example.ch", TEST_PASSWORD).await;

    assert_matches!(result, Err(TicketflowError::Authentication(message)) if message == "Account locked");
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_initialize_restores_stored_session() {
    let ctx = TestContext::new().await;
    let token = valid_token();
    ctx.storage.set(TOKEN_KEY, &token).await.unwrap();
    ctx.mock
        .mock_session_restore(&token, user_json("user"), Some(subscription_json("basic", "trialing")))
        .await;

    let user = ctx.session.initialize().await.unwrap();

    assert_eq!(user.map(|u| u.email), Some("anna@example.ch".to_string()));
    let state = ctx.session.snapshot().await;
    assert!(state.has_required_subscription(PlanTier::Basic));
    assert!(ctx.storage.get(USER_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_initialize_without_token_is_signed_out() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_never("GET", "/auth/verify").await;

    assert_eq!(ctx.session.initialize().await.unwrap(), None);
}

#[tokio::test]
async fn test_initialize_drops_expired_token_without_network() {
    let ctx = TestContext::new().await;
    ctx.storage.set(TOKEN_KEY, &expired_token()).await.unwrap();
    ctx.storage.set(USER_KEY, &user_json("user").to_string()).await.unwrap();
    ctx.mock.mock_never("GET", "/auth/verify").await;

    assert_eq!(ctx.session.initialize().await.unwrap(), None);
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(ctx.storage.get(USER_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_initialize_rejected_token_logs_out() {
    let ctx = TestContext::new().await;
    ctx.storage.set(TOKEN_KEY, &valid_token()).await.unwrap();
    ctx.mock.mock_failure("GET", "/auth/verify", 401, "Token revoked").await;

    assert_eq!(ctx.session.initialize().await.unwrap(), None);
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), None);
    assert!(!ctx.services.api.has_token().await);
    assert!(!ctx.session.is_authenticated().await);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_login_success(&valid_token(), user_json("user")).await;
    ctx.session.login("anna@example.ch", TEST_PASSWORD).await.unwrap();

    ctx.session.logout().await.unwrap();

    assert_eq!(ctx.session.user().await, None);
    assert_eq!(ctx.session.subscription().await, None);
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(ctx.storage.get(USER_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_update_profile_replaces_cached_user() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_login_success(&valid_token(), user_json("user")).await;
    let mut updated = user_json("user");
    updated["firstName"] = json!("Annina");
    ctx.mock.mock_success("PUT", "/auth/profile", updated).await;

    ctx.session.login("anna@example.ch", TEST_PASSWORD).await.unwrap();
    let request = UpdateProfileRequest {
        first_name: Some("Annina".to_string()),
        ..Default::default()
    };
    let user = ctx.session.update_profile(&request).await.unwrap();

    assert_eq!(user.first_name, "Annina");
    assert_eq!(ctx.session.user().await.unwrap().first_name, "Annina");
    let stored: User = serde_json::from_str(&ctx.storage.get(USER_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored.first_name, "Annina");
}

#[tokio::test]
async fn test_update_profile_requires_session() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_never("PUT", "/auth/profile").await;

    let result = ctx.session.update_profile(&UpdateProfileRequest::default()).await;
    assert_matches!(result, Err(TicketflowError::Unauthorized(_)));
}

#[tokio::test]
async fn test_organizer_refresh_syncs_with_stripe() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_login_success(&valid_token(), user_json("organizer")).await;
    ctx.mock
        .mock_success("POST", "/subscriptions/sync", subscription_json("enterprise", "active"))
        .await;

    ctx.session.login("anna@example.ch", TEST_PASSWORD).await.unwrap();
    let subscription = ctx.session.refresh_subscription().await.unwrap();

    assert_eq!(subscription.map(|s| s.plan.tier), Some(PlanTier::Enterprise));
    assert!(ctx.session.has_required_subscription(PlanTier::Enterprise).await);
    assert_eq!(ctx.mock.requests_to("/subscriptions/sync").await.len(), 1);
}

#[tokio::test]
async fn test_admin_passes_subscription_check_without_plan() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_login_success(&valid_token(), user_json("admin")).await;
    ctx.mock.mock_success("GET", "/subscriptions/current", serde_json::Value::Null).await;

    ctx.session.login("anna@example.ch", TEST_PASSWORD).await.unwrap();

    assert_eq!(ctx.session.subscription().await, None);
    assert!(ctx.session.has_required_subscription(PlanTier::Enterprise).await);
}

#[tokio::test]
async fn test_delete_account_logs_out() {
    let ctx = TestContext::new().await;
    ctx.mock.mock_login_success(&valid_token(), user_json("user")).await;
    ctx.mock.mock_success("DELETE", "/auth/account", json!({})).await;

    ctx.session.login("anna@example.ch", TEST_PASSWORD).await.unwrap();
    ctx.session.delete_account().await.unwrap();

    assert!(!ctx.session.is_authenticated().await);
    assert_eq!(ctx.storage.get(TOKEN_KEY).await.unwrap(), None);
}
