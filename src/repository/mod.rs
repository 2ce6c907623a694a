pub mod account;
pub mod api_client;
pub mod envelope;
pub mod transport;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::app_config::AppConfig;
pub use api_client::ApiClient;
use transport::{HttpTransport, ReqwestTransport};

/// Entry point to the backend: typed resource calls plus the account endpoints.
#[derive(Clone)]
pub struct Repository {
    pub api: ApiClient,
    pub account: account::AccountApi,
}

impl Repository {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        let api = ApiClient::new(transport);
        Self {
            account: account::AccountApi::new(api.clone()),
            api,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(
            config.backend_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(Arc::new(transport)))
    }
}
