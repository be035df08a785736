//! Test context for integration testing
//!
//! Wires settings, services and a session against an [`ApiMockServer`].

use std::sync::{Arc, Once};

use tempfile::TempDir;
use ticketflow::{
    config::Settings,
    services::ServiceFactory,
    state::{MemorySessionStorage, Session, SessionStorage},
};

use super::api_mock::ApiMockServer;

static INIT: Once = Once::new();

/// Initialize test environment
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Settings pointing at the mock server
pub fn test_settings(mock: &ApiMockServer) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = mock.api_url();
    settings.api.timeout_seconds = 5;
    settings.stripe.publishable_key = "pk_test_ticketflow".to_string();
    settings.stripe.api_url = mock.stripe_url();
    settings
}

pub struct TestContext {
    pub mock: ApiMockServer,
    pub settings: Settings,
    pub services: ServiceFactory,
    pub storage: Arc<MemorySessionStorage>,
    pub session: Session,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        init_test_env();

        let mock = ApiMockServer::new().await;
        let settings = test_settings(&mock);
        let services = ServiceFactory::new(&settings).expect("build services");
        let storage = Arc::new(MemorySessionStorage::new());
        let session = Session::new(&services, storage.clone() as Arc<dyn SessionStorage>);
        let temp_dir = tempfile::tempdir().expect("create temp dir");

        Self {
            mock,
            settings,
            services,
            storage,
            session,
            temp_dir,
        }
    }

    /// Put a bearer token on the shared client without going through login
    pub async fn authenticate(&self, token: &str) {
        self.services.api.set_token(Some(token.to_string())).await;
    }
}
