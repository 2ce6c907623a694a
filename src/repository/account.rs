use serde_json::Value;
use tracing::info;

use super::api_client::ApiClient;
use super::envelope::error_message;
use super::transport::{ApiRequest, HttpMethod};
use crate::services::error_handling::SyncError;

const RESOURCE: &str = "account";

/// Registers and logs in the signed-in identity with the backend.
#[derive(Clone)]
pub struct AccountApi {
    client: ApiClient,
}

impl AccountApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn signup(&self, id_token: &str) -> Result<Value, SyncError> {
        self.post("/signup", id_token, "Signup failed").await
    }

    /// Returns the backend-issued session token.
    pub async fn login(&self, id_token: &str) -> Result<String, SyncError> {
        let body = self.post("/login", id_token, "Login failed").await?;
        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SyncError::Decode {
                resource: RESOURCE,
                reason: "login response has no token".to_string(),
            })
    }

    /// Logs in, registering the identity first when the backend answers
    /// 404 for an unknown account.
    pub async fn login_or_signup(&self, id_token: &str) -> Result<String, SyncError> {
        match self.login(id_token).await {
            Err(SyncError::Http { status: 404, .. }) => {
                info!("Account not registered, signing up");
                self.signup(id_token).await?;
                self.login(id_token).await
            }
            other => other,
        }
    }

    async fn post(&self, path: &str, id_token: &str, fallback: &str) -> Result<Value, SyncError> {
        let response = self
            .client
            .send(RESOURCE, ApiRequest::new(HttpMethod::Post, path, id_token))
            .await?;
        if !response.is_success() {
            return Err(SyncError::Http {
                resource: RESOURCE,
                status: response.status,
                message: error_message(&response.body).unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(response.body)
    }
}
