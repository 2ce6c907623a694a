use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::envelope::{error_message, normalize_collection, unwrap_record};
use super::transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
use crate::domain::{RecordId, Resource};
use crate::services::error_handling::SyncError;

/// Typed REST calls for every [`Resource`], on top of an [`HttpTransport`].
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list<R: Resource>(&self, token: &str) -> Result<Vec<R>, SyncError> {
        let request = ApiRequest::new(HttpMethod::Get, R::PATH, token).with_query(R::list_query());
        let response = self.call(R::NAME, request).await?;

        normalize_collection(response.body)
            .into_iter()
            .map(|item| decode::<R>(R::NAME, item))
            .collect()
    }

    pub async fn create<R: Resource>(&self, token: &str, draft: &R::Draft) -> Result<R, SyncError> {
        let request = ApiRequest::new(HttpMethod::Post, R::PATH, token).with_body(encode(R::NAME, draft)?);
        let response = self.call(R::NAME, request).await?;
        decode(R::NAME, unwrap_record(response.body))
    }

    /// `Ok(None)` when the server acknowledged without echoing a usable record.
    pub async fn update<R: Resource>(
        &self,
        token: &str,
        id: &RecordId,
        draft: &R::Draft,
    ) -> Result<Option<R>, SyncError> {
        let request = ApiRequest::new(HttpMethod::Put, record_path::<R>(id), token)
            .with_body(encode(R::NAME, draft)?);
        let response = self.call(R::NAME, request).await?;

        match serde_json::from_value(unwrap_record(response.body)) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                debug!(resource = R::NAME, id = %id, error = %e, "Update response carried no record");
                Ok(None)
            }
        }
    }

    pub async fn delete<R: Resource>(&self, token: &str, id: &RecordId) -> Result<(), SyncError> {
        let request = ApiRequest::new(HttpMethod::Delete, record_path::<R>(id), token);
        self.call(R::NAME, request).await?;
        Ok(())
    }

    /// `PATCH {path}/{id}/toggle`
    pub async fn toggle<R: Resource>(&self, token: &str, id: &RecordId) -> Result<R, SyncError> {
        let path = format!("{}/toggle", record_path::<R>(id));
        let request = ApiRequest::new(HttpMethod::Patch, path, token);
        let response = self.call(R::NAME, request).await?;
        decode(R::NAME, unwrap_record(response.body))
    }

    /// DELETE on an arbitrary sub-path of a resource, e.g. `/completed/all`.
    pub async fn delete_under<R: Resource>(&self, token: &str, suffix: &str) -> Result<Value, SyncError> {
        let request = ApiRequest::new(HttpMethod::Delete, format!("{}{}", R::PATH, suffix), token);
        let response = self.call(R::NAME, request).await?;
        Ok(response.body)
    }

    /// GET a single document, unwrapping an envelope if present.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        token: &str,
        path: &str,
    ) -> Result<T, SyncError> {
        let request = ApiRequest::new(HttpMethod::Get, path, token);
        let response = self.call(resource, request).await?;
        decode(resource, unwrap_record(response.body))
    }

    /// Raw send: transport failures are mapped, HTTP status is left to the caller.
    pub async fn send(&self, resource: &'static str, request: ApiRequest) -> Result<ApiResponse, SyncError> {
        self.transport
            .send(request)
            .await
            .map_err(|e| SyncError::Transport {
                resource,
                message: e.to_string(),
            })
    }

    async fn call(&self, resource: &'static str, request: ApiRequest) -> Result<ApiResponse, SyncError> {
        let response = self.send(resource, request).await?;
        if !response.is_success() {
            let status = response.status;
            return Err(SyncError::Http {
                resource,
                status,
                message: error_message(&response.body).unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }
        Ok(response)
    }
}

fn record_path<R: Resource>(id: &RecordId) -> String {
    format!("{}/{}", R::PATH, id)
}

fn encode<T: serde::Serialize>(resource: &'static str, value: &T) -> Result<Value, SyncError> {
    serde_json::to_value(value).map_err(|e| SyncError::Decode {
        resource,
        reason: format!("could not encode request body: {}", e),
    })
}

fn decode<T: DeserializeOwned>(resource: &'static str, value: Value) -> Result<T, SyncError> {
    serde_json::from_value(value).map_err(|e| SyncError::Decode {
        resource,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::goal::{Goal, GoalDraft};
    use crate::domain::schedule::ScheduledTask;
    use crate::domain::todo::{Todo, TodoDraft};
    use crate::repository::transport::mock::MockTransport;
    use serde_json::json;

    fn client() -> (ApiClient, MockTransport) {
        let mock = MockTransport::new();
        (ApiClient::new(Arc::new(mock.clone())), mock)
    }

    #[tokio::test]
    async fn test_list_sends_bearer_and_query() {
        let (client, mock) = client();
        mock.respond(
            HttpMethod::Get,
            "/time-management",
            200,
            json!({"success": true, "data": [{"id": "t1", "text": "x", "data": null}]}),
        );

        let tasks = client.list::<ScheduledTask>("tok").await.unwrap();
        assert_eq!(tasks.len(), 1);

        let call = mock.last_call().unwrap();
        assert_eq!(call.bearer, "tok");
        assert_eq!(
            call.query,
            vec![("page".to_string(), "1".to_string()), ("limit".to_string(), "1000".to_string())]
        );
    }

    #[tokio::test]
    async fn test_list_decode_failure() {
        let (client, mock) = client();
        mock.respond(HttpMethod::Get, "/todos", 200, json!([{"id": 1}]));
        let err = client.list::<Todo>("tok").await.unwrap_err();
        assert!(matches!(err, SyncError::Decode { resource: "todos", .. }));
    }

    #[tokio::test]
    async fn test_http_error_carries_message() {
        let (client, mock) = client();
        mock.respond(HttpMethod::Post, "/todos", 400, json!({"message": "bad todo"}));
        let err = client.create::<Todo>("tok", &TodoDraft::new("a")).await.unwrap_err();
        match err {
            SyncError::Http { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad todo");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_without_record_body() {
        let (client, mock) = client();
        mock.respond(HttpMethod::Put, "/goals/3", 200, json!({"success": true}));
        let draft = GoalDraft::new("g", chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 10);
        let updated = client
            .update::<Goal>("tok", &RecordId::Number(3), &draft)
            .await
            .unwrap();
        assert!(updated.is_none());
        assert_eq!(mock.last_call().unwrap().path, "/goals/3");
    }

    #[tokio::test]
    async fn test_transport_error_mapped() {
        let (client, mock) = client();
        mock.fail(HttpMethod::Delete, "/todos/9", "timed out");
        let err = client.delete::<Todo>("tok", &RecordId::Number(9)).await.unwrap_err();
        assert!(matches!(err, SyncError::Transport { resource: "todos", .. }));
    }
}
