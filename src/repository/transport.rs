use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::services::error_handling::PerformanceMonitor;

const SLOW_REQUEST_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// One authenticated call against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>, bearer: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: bearer.into(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status plus parsed JSON body; bodies that are empty or not JSON become `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for sending backend requests - allows for mocking in tests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Real implementation over reqwest
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let _monitor = PerformanceMonitor::new(
            format!("{} {}", request.method.as_str(), request.path),
            SLOW_REQUEST_MS,
        );
        debug!(method = request.method.as_str(), url = %url, "Sending request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(&request.bearer);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }
}

pub mod mock {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    #[derive(Debug, Clone)]
    enum Scripted {
        Reply(ApiResponse),
        Fail(String),
    }

    #[derive(Debug, Clone)]
    struct MockRoute {
        method: HttpMethod,
        path: String,
        outcome: Scripted,
    }

    /// Scripted transport that records every request it receives
    #[derive(Clone, Default)]
    pub struct MockTransport {
        routes: Arc<Mutex<Vec<MockRoute>>>,
        calls: Arc<Mutex<Vec<ApiRequest>>>,
        holding: Arc<AtomicBool>,
        held: Arc<Mutex<Vec<oneshot::Sender<ApiResponse>>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Later registrations for the same route win.
        pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
            self.routes.lock().push(MockRoute {
                method,
                path: path.to_string(),
                outcome: Scripted::Reply(ApiResponse::new(status, body)),
            });
        }

        pub fn fail(&self, method: HttpMethod, path: &str, message: &str) {
            self.routes.lock().push(MockRoute {
                method,
                path: path.to_string(),
                outcome: Scripted::Fail(message.to_string()),
            });
        }

        pub fn calls(&self) -> Vec<ApiRequest> {
            self.calls.lock().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        pub fn last_call(&self) -> Option<ApiRequest> {
            self.calls.lock().last().cloned()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().clear();
        }

        /// From now on requests wait until `release` answers them instead of
        /// resolving against the scripted routes.
        pub fn hold(&self) {
            self.holding.store(true, Ordering::SeqCst);
        }

        pub fn held_count(&self) -> usize {
            self.held.lock().len()
        }

        /// Answers the `index`th still-waiting request in arrival order.
        /// Returns false when there is no such request.
        pub fn release(&self, index: usize, status: u16, body: Value) -> bool {
            let mut held = self.held.lock();
            if index >= held.len() {
                return false;
            }
            held.remove(index).send(ApiResponse::new(status, body)).is_ok()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.calls.lock().push(request.clone());

            if self.holding.load(Ordering::SeqCst) {
                let (tx, rx) = oneshot::channel();
                self.held.lock().push(tx);
                return rx.await.map_err(|_| anyhow!("held request was never released"));
            }

            let outcome = {
                let routes = self.routes.lock();
                routes
                    .iter()
                    .rev()
                    .find(|r| r.method == request.method && r.path == request.path)
                    .map(|r| r.outcome.clone())
            };

            match outcome {
                Some(Scripted::Reply(response)) => Ok(response),
                Some(Scripted::Fail(message)) => Err(anyhow!(message)),
                None => Ok(ApiResponse::new(404, Value::Null)),
            }
        }
    }
}
