use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validation::{DraftValidator, ValidationError, clamp_percent, deserialize_percent};
use super::{Draft, RecordId, Resource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: RecordId,
    pub title: String,
    pub deadline: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GoalDraft {
    pub title: String,
    pub deadline: Option<NaiveDate>,
    /// Raw user input; clamped on normalize.
    pub progress: i64,
}

impl GoalDraft {
    pub fn new(title: impl Into<String>, deadline: NaiveDate, progress: i64) -> Self {
        Self {
            title: title.into(),
            deadline: Some(deadline),
            progress,
        }
    }
}

impl Draft for GoalDraft {
    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.progress = clamp_percent(self.progress) as i64;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        DraftValidator::require_text("title", &self.title)?;
        DraftValidator::require("deadline", &self.deadline)?;
        Ok(())
    }
}

impl Resource for Goal {
    type Draft = GoalDraft;

    const PATH: &'static str = "/goals";
    const NAME: &'static str = "goals";
    const NOUN: &'static str = "goal";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_draft(&self) -> GoalDraft {
        GoalDraft {
            title: self.title.clone(),
            deadline: Some(self.deadline),
            progress: self.progress as i64,
        }
    }

    fn apply_draft(&self, draft: &GoalDraft) -> Self {
        Self {
            id: self.id.clone(),
            title: draft.title.clone(),
            deadline: draft.deadline.unwrap_or(self.deadline),
            progress: clamp_percent(draft.progress),
        }
    }
}

impl Goal {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Less than a week left and not finished yet.
    pub fn is_at_risk(&self, today: NaiveDate) -> bool {
        self.days_remaining(today) < 7 && !self.is_complete()
    }

    /// Draft for the progress editor, everything else untouched.
    pub fn with_progress(&self, progress: i64) -> GoalDraft {
        GoalDraft {
            progress,
            ..self.to_draft()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_goal_from_wire() {
        let goal: Goal = serde_json::from_str(
            r#"{"id":"g1","title":"Learn X","deadline":"2025-12-31","progress":65}"#,
        )
        .unwrap();
        assert_eq!(goal.deadline, date(2025, 12, 31));
        assert_eq!(goal.progress, 65);
    }

    #[test]
    fn test_draft_clamps_progress() {
        let mut draft = GoalDraft::new("  Learn X ", date(2025, 12, 31), 150);
        draft.normalize();
        assert_eq!(draft.title, "Learn X");
        assert_eq!(draft.progress, 100);

        let payload = serde_json::to_value(&draft).unwrap();
        assert_eq!(payload["progress"], 100);
        assert_eq!(payload["deadline"], "2025-12-31");
    }

    #[test]
    fn test_draft_requires_title_and_deadline() {
        let missing_title = GoalDraft::new(" ", date(2025, 1, 1), 0);
        assert_eq!(missing_title.validate().unwrap_err().field(), "title");

        let missing_deadline = GoalDraft {
            title: "Run".to_string(),
            deadline: None,
            progress: 0,
        };
        assert_eq!(missing_deadline.validate().unwrap_err().field(), "deadline");
    }

    #[test]
    fn test_is_at_risk() {
        let goal = Goal {
            id: RecordId::Number(1),
            title: "Goal".to_string(),
            deadline: date(2025, 6, 10),
            progress: 40,
        };
        assert!(goal.is_at_risk(date(2025, 6, 5)));
        assert!(!goal.is_at_risk(date(2025, 5, 1)));

        let done = Goal { progress: 100, ..goal };
        assert!(!done.is_at_risk(date(2025, 6, 5)));
    }

    #[test]
    fn test_with_progress_keeps_other_fields() {
        let goal = Goal {
            id: RecordId::Number(1),
            title: "Goal".to_string(),
            deadline: date(2025, 6, 10),
            progress: 40,
        };
        let draft = goal.with_progress(-5);
        assert_eq!(draft.title, "Goal");
        assert_eq!(draft.deadline, Some(date(2025, 6, 10)));
        assert_eq!(draft.progress, -5);
    }
}
