pub mod dashboard;
pub mod goal;
pub mod note;
pub mod planner;
pub mod pomodoro;
pub mod project;
pub mod schedule;
pub mod todo;
pub mod validation;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use validation::ValidationError;

/// Server-assigned record identity. The backend hands out numeric ids for some
/// collections and string ids for others, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

/// A user-scoped collection living behind one REST path.
pub trait Resource: Clone + Send + Sync + DeserializeOwned + 'static {
    /// Request body used for create and full update.
    type Draft: Draft;

    /// Path under the backend base URL, e.g. `/todos`.
    const PATH: &'static str;
    /// Human-readable collection name used in logs and error messages.
    const NAME: &'static str;
    /// Singular noun for one record in user-facing messages.
    const NOUN: &'static str;

    fn id(&self) -> &RecordId;

    /// Rebuilds the request body that would recreate this record.
    fn to_draft(&self) -> Self::Draft;

    /// This record with the draft's fields applied; id and server-owned
    /// fields are kept.
    fn apply_draft(&self, draft: &Self::Draft) -> Self;

    /// Extra query parameters sent with the list request.
    fn list_query() -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Client-side form input for a resource.
pub trait Draft: Serialize + Clone + Send + Sync + 'static {
    /// Trims text and clamps numeric fields in place.
    fn normalize(&mut self) {}

    /// Rejects drafts whose required fields are blank.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// How a resource flips its completion flag on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStrategy {
    /// Flip locally and PUT the whole record back.
    ResubmitFull,
    /// Call the dedicated `PATCH {path}/{id}/toggle` endpoint.
    Endpoint,
}

/// Resources carrying a completion flag.
pub trait Completable: Resource {
    const TOGGLE: ToggleStrategy;

    fn is_completed(&self) -> bool;

    fn set_completed(&mut self, completed: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl Tally {
    pub fn of<R: Completable>(records: &[R]) -> Self {
        let completed = records.iter().filter(|r| r.is_completed()).count();
        Self {
            total: records.len(),
            completed,
            remaining: records.len() - completed,
        }
    }

    /// Footer line shown under a list; `None` when the list is empty.
    pub fn summary_line(&self) -> Option<String> {
        if self.total == 0 {
            return None;
        }
        if self.remaining == 0 {
            return Some("All tasks completed! Great job!".to_string());
        }
        let plural = if self.remaining != 1 { "s" } else { "" };
        Some(format!("{} task{} remaining", self.remaining, plural))
    }
}
