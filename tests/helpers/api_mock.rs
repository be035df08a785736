//! Mock platform API server for testing
//!
//! Serves the `{ success, data, message }` envelope under `/api` and a
//! minimal Stripe PaymentIntent confirmation endpoint under `/stripe`.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_string_contains, header, header_exists, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock platform API server
pub struct ApiMockServer {
    pub server: MockServer,
}

/// Configuration for mock responses
#[derive(Debug, Clone, Default)]
pub struct MockResponseConfig {
    pub delay_ms: Option<u64>,
    /// Only match requests carrying this bearer token
    pub bearer: Option<String>,
    /// Expected number of calls, checked when the server is dropped
    pub expect: Option<u64>,
}

impl ApiMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    pub fn stripe_url(&self) -> String {
        format!("{}/stripe", self.server.uri())
    }

    /// Mount a raw JSON response for `verb /api{api_path}`
    pub async fn mock_json(&self, verb: &str, api_path: &str, status: u16, body: Value, config: MockResponseConfig) {
        let mut response = ResponseTemplate::new(status).set_body_json(body);
        if let Some(delay) = config.delay_ms {
            response = response.set_delay(Duration::from_millis(delay));
        }

        let mut mock = Mock::given(method(verb)).and(path(format!("/api{}", api_path)));
        if let Some(token) = &config.bearer {
            mock = mock.and(header("authorization", format!("Bearer {}", token).as_str()));
        }
        let mut mock = mock.respond_with(response);
        if let Some(times) = config.expect {
            mock = mock.expect(times);
        }
        mock.mount(&self.server).await;
    }

    /// Successful envelope wrapping `data`
    pub async fn mock_success(&self, verb: &str, api_path: &str, data: Value) {
        self.mock_json(verb, api_path, 200, json!({ "success": true, "data": data }), MockResponseConfig::default())
            .await;
    }

    /// Failed envelope with an HTTP status
    pub async fn mock_failure(&self, verb: &str, api_path: &str, status: u16, message: &str) {
        self.mock_json(
            verb,
            api_path,
            status,
            json!({ "success": false, "message": message }),
            MockResponseConfig::default(),
        )
        .await;
    }

    /// Endpoint that must never be called
    pub async fn mock_never(&self, verb: &str, api_path: &str) {
        self.mock_json(
            verb,
            api_path,
            500,
            json!({ "success": false, "message": "unexpected call" }),
            MockResponseConfig { expect: Some(0), ..Default::default() },
        )
        .await;
    }

    pub async fn mock_login_success(&self, token: &str, user: Value) {
        self.mock_success("POST", "/auth/login", json!({ "token": token, "user": user })).await;
    }

    pub async fn mock_login_failure(&self) {
        self.mock_failure("POST", "/auth/login", 401, "Invalid email or password").await;
    }

    /// Verify, profile and subscription for a restored session
    pub async fn mock_session_restore(&self, token: &str, user: Value, subscription: Option<Value>) {
        let bearer = MockResponseConfig { bearer: Some(token.to_string()), ..Default::default() };
        let ok = |data: Value| json!({ "success": true, "data": data });

        self.mock_json("GET", "/auth/verify", 200, ok(user.clone()), bearer.clone()).await;
        self.mock_json("GET", "/auth/profile", 200, ok(user), bearer.clone()).await;
        self.mock_json(
            "GET",
            "/subscriptions/current",
            200,
            ok(subscription.unwrap_or(Value::Null)),
            bearer,
        )
        .await;
    }

    /// Stripe confirmation returning an intent in `status`
    pub async fn mock_stripe_confirm(&self, intent_id: &str, status: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/stripe/v1/payment_intents/{}/confirm", intent_id)))
            .and(header_exists("authorization"))
            .and(body_string_contains("client_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": intent_id,
                "object": "payment_intent",
                "status": status,
                "amount": 7000,
                "currency": "chf"
            })))
            .mount(&self.server)
            .await;
    }

    /// Stripe card decline
    pub async fn mock_stripe_decline(&self, intent_id: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/stripe/v1/payment_intents/{}/confirm", intent_id)))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": {
                    "type": "card_error",
                    "code": "card_declined",
                    "decline_code": "generic_decline",
                    "message": message
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far whose path starts with `/api{prefix}`
    pub async fn requests_to(&self, prefix: &str) -> Vec<wiremock::Request> {
        let full = format!("/api{}", prefix);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path().starts_with(&full))
            .collect()
    }
}
