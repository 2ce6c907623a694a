use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::validation::{DraftValidator, ValidationError};
use super::{Completable, Draft, RecordId, Resource, ToggleStrategy};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Work,
    Personal,
    Health,
    Learning,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Learning,
        Category::Shopping,
        Category::Other,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannerTask {
    pub id: RecordId,
    pub text: String,
    /// Time of day, `HH:MM`.
    pub deadline: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlannerDraft {
    pub text: String,
    pub deadline: String,
    pub priority: Priority,
    pub category: Category,
    pub completed: bool,
}

impl PlannerDraft {
    pub fn new(text: impl Into<String>, deadline: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            deadline: deadline.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}

impl Draft for PlannerDraft {
    fn normalize(&mut self) {
        self.text = self.text.trim().to_string();
        self.deadline = self.deadline.trim().to_string();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        DraftValidator::require_text("task", &self.text)?;
        DraftValidator::require_text("deadline", &self.deadline)?;
        if NaiveTime::parse_from_str(self.deadline.trim(), "%H:%M").is_err() {
            return Err(ValidationError::InvalidFormat {
                field: "deadline",
                reason: format!("'{}' is not a HH:MM time", self.deadline.trim()),
            });
        }
        Ok(())
    }
}

impl Resource for PlannerTask {
    type Draft = PlannerDraft;

    const PATH: &'static str = "/planner";
    const NAME: &'static str = "planner";
    const NOUN: &'static str = "task";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_draft(&self) -> PlannerDraft {
        PlannerDraft {
            text: self.text.clone(),
            deadline: self.deadline.clone(),
            priority: self.priority,
            category: self.category,
            completed: self.completed,
        }
    }

    fn apply_draft(&self, draft: &PlannerDraft) -> Self {
        Self {
            id: self.id.clone(),
            text: draft.text.clone(),
            deadline: draft.deadline.clone(),
            priority: draft.priority,
            category: draft.category,
            completed: draft.completed,
        }
    }
}

impl Completable for PlannerTask {
    const TOGGLE: ToggleStrategy = ToggleStrategy::ResubmitFull;

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}
