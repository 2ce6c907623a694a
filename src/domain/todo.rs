use serde::{Deserialize, Serialize};

use super::validation::{DraftValidator, ValidationError};
use super::{Completable, Draft, RecordId, Resource, ToggleStrategy};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: RecordId,
    pub todo: String,
    #[serde(default)]
    pub status: bool, // true once done
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TodoDraft {
    pub todo: String,
    pub status: bool,
}

impl TodoDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            todo: text.into(),
            status: false,
        }
    }
}

impl Draft for TodoDraft {
    fn normalize(&mut self) {
        self.todo = self.todo.trim().to_string();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        DraftValidator::require_text("todo", &self.todo)
    }
}

impl Resource for Todo {
    type Draft = TodoDraft;

    const PATH: &'static str = "/todos";
    const NAME: &'static str = "todos";
    const NOUN: &'static str = "task";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_draft(&self) -> TodoDraft {
        TodoDraft {
            todo: self.todo.clone(),
            status: self.status,
        }
    }

    fn apply_draft(&self, draft: &TodoDraft) -> Self {
        Self {
            id: self.id.clone(),
            todo: draft.todo.clone(),
            status: draft.status,
        }
    }
}

impl Completable for Todo {
    const TOGGLE: ToggleStrategy = ToggleStrategy::ResubmitFull;

    fn is_completed(&self) -> bool {
        self.status
    }

    fn set_completed(&mut self, completed: bool) {
        self.status = completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_from_wire() {
        let todo: Todo = serde_json::from_str(r#"{"id":1,"todo":"a","status":false}"#).unwrap();
        assert_eq!(todo.id, RecordId::Number(1));
        assert_eq!(todo.todo, "a");
        assert!(!todo.is_completed());
    }

    #[test]
    fn test_missing_status_defaults_to_open() {
        let todo: Todo = serde_json::from_str(r#"{"id":"x","todo":"b"}"#).unwrap();
        assert!(!todo.status);
    }

    #[test]
    fn test_draft_normalizes_and_validates() {
        let mut draft = TodoDraft::new("  buy milk  ");
        draft.normalize();
        assert_eq!(draft.todo, "buy milk");
        assert!(draft.validate().is_ok());

        assert!(TodoDraft::new("   ").validate().is_err());
    }

    #[test]
    fn test_draft_payload_shape() {
        let payload = serde_json::to_value(TodoDraft::new("a")).unwrap();
        assert_eq!(payload, serde_json::json!({"todo": "a", "status": false}));
    }
}
