use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;
use super::{Draft, RecordId, Resource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Display label captured when the note was written.
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub date: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date: String::new(),
        }
    }

    pub fn stamped(mut self, at: DateTime<Local>) -> Self {
        self.date = date_label(at);
        self
    }
}

pub fn date_label(at: DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

impl Draft for NoteDraft {
    fn normalize(&mut self) {
        if self.date.is_empty() {
            self.date = date_label(Local::now());
        }
    }

    // A note needs a title or a body; either one alone is enough.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title or content" });
        }
        Ok(())
    }
}

impl Resource for Note {
    type Draft = NoteDraft;

    const PATH: &'static str = "/notes";
    const NAME: &'static str = "notes";
    const NOUN: &'static str = "note";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            date: self.date.clone(),
        }
    }

    fn apply_draft(&self, draft: &NoteDraft) -> Self {
        Self {
            id: self.id.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            date: draft.date.clone(),
        }
    }
}

impl Note {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}
