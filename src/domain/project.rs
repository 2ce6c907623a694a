use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validation::{DraftValidator, ValidationError, clamp_percent, deserialize_percent};
use super::{Draft, RecordId, Resource};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    OnTrack,
    AtRisk,
    Delayed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    pub deadline: NaiveDate,
    #[serde(default, alias = "progress", deserialize_with = "deserialize_percent")]
    pub percentage: u8,
    /// Supplied by some backends; derived locally otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub deadline: Option<NaiveDate>,
    pub percentage: i64,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            name: name.into(),
            deadline: Some(deadline),
            percentage: 0,
        }
    }
}

impl Draft for ProjectDraft {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.percentage = clamp_percent(self.percentage) as i64;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        DraftValidator::require_text("name", &self.name)?;
        DraftValidator::require("deadline", &self.deadline)?;
        Ok(())
    }
}

impl Resource for Project {
    type Draft = ProjectDraft;

    const PATH: &'static str = "/projects";
    const NAME: &'static str = "projects";
    const NOUN: &'static str = "project";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_draft(&self) -> ProjectDraft {
        ProjectDraft {
            name: self.name.clone(),
            deadline: Some(self.deadline),
            percentage: self.percentage as i64,
        }
    }

    fn apply_draft(&self, draft: &ProjectDraft) -> Self {
        Self {
            id: self.id.clone(),
            name: draft.name.clone(),
            deadline: draft.deadline.unwrap_or(self.deadline),
            percentage: clamp_percent(draft.percentage),
            status: self.status,
        }
    }
}

impl Project {
    /// Server-supplied status wins; otherwise derived from deadline and percentage.
    pub fn effective_status(&self, today: NaiveDate) -> ProjectStatus {
        if let Some(status) = self.status {
            return status;
        }
        if self.percentage >= 100 {
            return ProjectStatus::OnTrack;
        }
        let days_remaining = (self.deadline - today).num_days();
        if days_remaining < 0 {
            ProjectStatus::Delayed
        } else if days_remaining < 7 && self.percentage < 50 {
            ProjectStatus::AtRisk
        } else {
            ProjectStatus::OnTrack
        }
    }

    pub fn with_percentage(&self, percentage: i64) -> ProjectDraft {
        ProjectDraft {
            percentage,
            ..self.to_draft()
        }
    }
}
