use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::RecordId;
use crate::domain::validation::ValidationError;

/// Failures of a collection operation. None of them is fatal to a page.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{resource} record not found: {id}")]
    NotFound { resource: &'static str, id: RecordId },

    #[error("{resource} request failed with status {status}: {message}")]
    Http {
        resource: &'static str,
        status: u16,
        message: String,
    },

    #[error("{resource} request could not be sent: {message}")]
    Transport { resource: &'static str, message: String },

    #[error("Unexpected {resource} response: {reason}")]
    Decode { resource: &'static str, reason: String },
}

impl SyncError {
    /// Errors that mean nothing was attempted against the server.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            SyncError::Unauthenticated | SyncError::Validation(_) | SyncError::NotFound { .. }
        )
    }
}

/// Structured logging helpers
pub struct LogHelper;

impl LogHelper {
    pub fn log_sync_operation(resource: &str, operation: &str, id: Option<&RecordId>, success: bool) {
        let id = id.map(|id| id.to_string()).unwrap_or_default();
        if success {
            info!(
                resource = %resource,
                operation = %operation,
                id = %id,
                "Sync operation completed"
            );
        } else {
            warn!(
                resource = %resource,
                operation = %operation,
                id = %id,
                "Sync operation failed, local state unchanged"
            );
        }
    }

    pub fn log_load_failure(resource: &str, error: &SyncError) {
        error!(
            resource = %resource,
            error = %error,
            "Collection load failed, local list cleared"
        );
    }

    pub fn log_skipped(resource: &str, operation: &str, error: &SyncError) {
        debug!(
            resource = %resource,
            operation = %operation,
            reason = %error,
            "Operation skipped before any request was sent"
        );
    }

    pub fn log_performance_warning(operation: &str, duration_ms: u64, threshold_ms: u64) {
        if duration_ms > threshold_ms {
            warn!(
                operation = %operation,
                duration_ms = duration_ms,
                threshold_ms = threshold_ms,
                "Request exceeded performance threshold"
            );
        }
    }
}

/// User-friendly error messages
pub struct UserErrorFormatter;

impl UserErrorFormatter {
    pub fn format_for_ui(error: &SyncError) -> String {
        match error {
            SyncError::Unauthenticated => "Please sign in to see your data.".to_string(),
            SyncError::Validation(e) => format!("Please fill in {}.", e.field()),
            SyncError::NotFound { .. } => "That item no longer exists.".to_string(),
            SyncError::Http { status, .. } if *status == 401 || *status == 403 => {
                "Your session has expired. Please sign in again.".to_string()
            }
            SyncError::Http { resource, .. } => {
                format!("Failed to load {}. Please try again.", resource)
            }
            SyncError::Transport { .. } => {
                "Network connection error. Please check your internet connection and try again."
                    .to_string()
            }
            SyncError::Decode { resource, .. } => {
                format!("Received unexpected {} data from the server.", resource)
            }
        }
    }

    /// Message for a failed mutation, e.g. "Failed to add task. Please try again."
    pub fn format_mutation_failure(action: &str, noun: &str) -> String {
        format!("Failed to {} {}. Please try again.", action, noun)
    }

    /// Client-side refusals keep their specific message; server failures
    /// get the generic retry prompt.
    pub fn format_mutation_error(action: &str, noun: &str, error: &SyncError) -> String {
        if error.is_client_side() {
            Self::format_for_ui(error)
        } else {
            Self::format_mutation_failure(action, noun)
        }
    }
}

/// Logs slow requests when dropped.
pub struct PerformanceMonitor {
    operation: String,
    start: Instant,
    threshold_ms: u64,
}

impl PerformanceMonitor {
    pub fn new(operation: impl Into<String>, threshold_ms: u64) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
            threshold_ms,
        }
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis() as u64;
        LogHelper::log_performance_warning(&self.operation, duration_ms, self.threshold_ms);

        debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "Request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let error = SyncError::Http {
            resource: "todos",
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "todos request failed with status 500: boom");
        assert_eq!(
            UserErrorFormatter::format_for_ui(&error),
            "Failed to load todos. Please try again."
        );
    }

    #[test]
    fn test_expired_session_message() {
        let error = SyncError::Http {
            resource: "goals",
            status: 401,
            message: String::new(),
        };
        assert!(UserErrorFormatter::format_for_ui(&error).contains("sign in again"));
    }

    #[test]
    fn test_validation_converts() {
        let error: SyncError = ValidationError::MissingField { field: "title" }.into();
        assert!(error.is_client_side());
        assert_eq!(UserErrorFormatter::format_for_ui(&error), "Please fill in title.");
    }

    #[test]
    fn test_mutation_failure_message() {
        assert_eq!(
            UserErrorFormatter::format_mutation_failure("add", "task"),
            "Failed to add task. Please try again."
        );
    }

    #[test]
    fn test_mutation_error_keeps_client_side_message() {
        let server = SyncError::Transport {
            resource: "notes",
            message: "refused".to_string(),
        };
        assert_eq!(
            UserErrorFormatter::format_mutation_error("update", "note", &server),
            "Failed to update note. Please try again."
        );
        assert_eq!(
            UserErrorFormatter::format_mutation_error("add", "note", &SyncError::Unauthenticated),
            "Please sign in to see your data."
        );
    }
}
