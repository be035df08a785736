//! Platform API client
//!
//! Shared HTTP plumbing for all service wrappers: base URL resolution,
//! bearer authentication, response envelope unwrapping and per-navigation
//! cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::models::ApiResponse;
use crate::utils::errors::{Result, TicketflowError};
use crate::utils::logging::{log_api_call, log_api_error};

/// HTTP client for the platform REST API.
///
/// Clones share the bearer token, so a login performed through one service
/// is visible to every other service built from the same client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
    cancel: Option<CancellationToken>,
}

impl ApiClient {
    /// Create a new ApiClient instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url)?,
            token: Arc::new(RwLock::new(None)),
            cancel: None,
        })
    }

    /// Client whose requests are abandoned once `cancel` fires
    pub fn scoped(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Resolve an API path against the base URL
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.client.get(self.url(path)?);
        self.execute_data(Method::GET, path, builder).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let builder = self.client.get(self.url(path)?).query(query);
        self.execute_data(Method::GET, path, builder).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let builder = self.client.post(self.url(path)?).json(body);
        self.execute_data(Method::POST, path, builder).await
    }

    /// POST with extra headers, e.g. an idempotency key
    pub async fn post_with_headers<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, String)],
    ) -> Result<T> {
        let mut builder = self.client.post(self.url(path)?).json(body);
        for (name, value) in headers {
            builder = builder.header(*name, value);
        }
        self.execute_data(Method::POST, path, builder).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let builder = self.client.put(self.url(path)?).json(body);
        self.execute_data(Method::PUT, path, builder).await
    }

    /// GET whose envelope may legitimately carry no data
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let builder = self.client.get(self.url(path)?);
        Ok(self.execute_envelope(Method::GET, path, builder).await?.data)
    }

    /// POST whose envelope may legitimately carry no data
    pub async fn post_optional<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<Option<T>> {
        let builder = self.client.post(self.url(path)?).json(body);
        Ok(self.execute_envelope(Method::POST, path, builder).await?.data)
    }

    /// Call that only reports success or failure
    pub async fn send_unit<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()> {
        let mut builder = self.client.request(method.clone(), self.url(path)?);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute_envelope::<serde_json::Value>(method, path, builder).await?;
        Ok(())
    }

    /// Raw bytes, for file downloads that are not wrapped in the envelope
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let builder = self.authorize(self.client.get(self.url(path)?)).await;
        let started = Instant::now();

        let bytes = self
            .cancellable(async {
                let response = builder.send().await.map_err(map_transport_error)?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(error_for_status(status, &body));
                }
                Ok(response.bytes().await?.to_vec())
            })
            .await;

        log_api_call("GET", path, started.elapsed().as_millis() as u64, bytes.is_ok());
        bytes
    }

    async fn execute_data<T: DeserializeOwned>(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<T> {
        self.execute_envelope(method, path, builder)
            .await?
            .data
            .ok_or_else(|| TicketflowError::Api {
                status: StatusCode::OK.as_u16(),
                message: format!("Response from {} carried no data", path),
            })
    }

    async fn execute_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let builder = self.authorize(builder).await;
        let started = Instant::now();
        debug!(method = %method, path = path, "Calling API");

        let result = self
            .cancellable(async {
                let response = builder.send().await.map_err(map_transport_error)?;
                let status = response.status();
                let body = response.text().await?;
                parse_envelope::<T>(status, &body)
            })
            .await;

        let elapsed = started.elapsed().as_millis() as u64;
        log_api_call(method.as_str(), path, elapsed, result.is_ok());
        if let Err(e) = &result {
            if !matches!(e, TicketflowError::Cancelled) {
                log_api_error(path, &e.to_string(), Some(method.as_str()));
            }
        }

        result
    }

    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn cancellable<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TicketflowError::Cancelled),
                    result = fut => result,
                }
            }
            None => fut.await,
        }
    }
}

/// Make sure relative joins append to the base path instead of replacing its last segment
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn map_transport_error(e: reqwest::Error) -> TicketflowError {
    if e.is_connect() {
        TicketflowError::ServiceUnavailable(e.to_string())
    } else {
        TicketflowError::Http(e)
    }
}

fn error_for_status(status: StatusCode, body: &str) -> TicketflowError {
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    match status {
        StatusCode::UNAUTHORIZED => TicketflowError::Unauthorized(message),
        StatusCode::FORBIDDEN => TicketflowError::PermissionDenied(message),
        _ => TicketflowError::Api { status: status.as_u16(), message },
    }
}

fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<ApiResponse<T>> {
    if !status.is_success() {
        return Err(error_for_status(status, body));
    }

    // 204 and friends
    if body.trim().is_empty() {
        return Ok(ApiResponse { success: true, data: None, message: None });
    }

    let envelope: ApiResponse<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(TicketflowError::Api {
            status: status.as_u16(),
            message: envelope.message.unwrap_or_default(),
        });
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_url_join_keeps_base_path() {
        let mut config = Settings::default().api;
        config.base_url = "https://tickets.example.ch/api".to_string();
        let client = ApiClient::new(&config).unwrap();

        assert_eq!(client.url("/events/42").unwrap().as_str(), "https://tickets.example.ch/api/events/42");
        assert_eq!(client.url("auth/login").unwrap().as_str(), "https://tickets.example.ch/api/auth/login");
    }

    #[test]
    fn test_parse_envelope_failure() {
        let result = parse_envelope::<serde_json::Value>(
            StatusCode::OK,
            r#"{"success": false, "message": "Event sold out"}"#,
        );
        match result {
            Err(TicketflowError::Api { status, message }) => {
                assert_eq!(status, 200);
                assert_eq!(message, "Event sold out");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_status() {
        let result = parse_envelope::<serde_json::Value>(
            StatusCode::UNAUTHORIZED,
            r#"{"success": false, "message": "Token expired"}"#,
        );
        assert!(matches!(result, Err(TicketflowError::Unauthorized(m)) if m == "Token expired"));

        let plain = parse_envelope::<serde_json::Value>(StatusCode::BAD_GATEWAY, "<html>");
        assert!(matches!(plain, Err(TicketflowError::Api { status: 502, .. })));
    }

    #[tokio::test]
    async fn test_shared_token_between_clones() {
        let client = ApiClient::new(&Settings::default().api).unwrap();
        let scoped = client.scoped(CancellationToken::new());

        client.set_token(Some("abc".to_string())).await;
        assert_eq!(scoped.token().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_cancelled_scope_short_circuits() {
        let client = ApiClient::new(&Settings::default().api).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = client.scoped(token).get::<serde_json::Value>("/events").await;
        assert!(matches!(result, Err(TicketflowError::Cancelled)));
    }
}
