use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::validation::{DraftValidator, ValidationError};
use super::{Completable, Draft, RecordId, Resource, ToggleStrategy};

const DATE_PREFIX: &str = "Date: ";
const DETAILS_PREFIX: &str = "Details: ";

/// Calendar fragment embedded in the detail blob, e.g. `Tue Dec 30 2025`.
pub fn date_fragment(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Structured view of the `Date:`/`Details:` text blob the backend stores in `data`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleDetail {
    pub date: Option<String>,
    pub details: Option<String>,
    /// Lines that carry neither prefix, kept so re-encoding loses nothing.
    pub other: Vec<String>,
}

impl ScheduleDetail {
    pub fn on(date: NaiveDate, details: &str) -> Self {
        let details = details.trim();
        Self {
            date: Some(date_fragment(date)),
            details: (!details.is_empty()).then(|| details.to_string()),
            other: Vec::new(),
        }
    }

    pub fn parse(blob: &str) -> Self {
        let mut detail = ScheduleDetail::default();
        let mut lines = blob.lines();
        while let Some(line) = lines.next() {
            if let Some(rest) = line.strip_prefix(DETAILS_PREFIX) {
                // Details run to the end of the blob
                let mut details = rest.to_string();
                for tail in lines.by_ref() {
                    details.push('\n');
                    details.push_str(tail);
                }
                detail.details = Some(details);
                break;
            }
            match line.strip_prefix(DATE_PREFIX) {
                Some(rest) if detail.date.is_none() => detail.date = Some(rest.trim().to_string()),
                _ if line.is_empty() => {}
                _ => detail.other.push(line.to_string()),
            }
        }
        detail
    }

    pub fn encode(&self) -> String {
        let mut lines = Vec::new();
        if let Some(date) = &self.date {
            lines.push(format!("{}{}", DATE_PREFIX, date));
        }
        lines.extend(self.other.iter().cloned());
        if let Some(details) = &self.details {
            lines.push(format!("{}{}", DETAILS_PREFIX, details));
        }
        lines.join("\n")
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%a %b %d %Y").ok())
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.details.is_none() && self.other.is_empty()
    }
}

mod detail_blob {
    use super::*;

    pub fn serialize<S: Serializer>(detail: &ScheduleDetail, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&detail.encode())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ScheduleDetail, D::Error> {
        let blob = Option::<String>::deserialize(deserializer)?;
        Ok(blob.as_deref().map(ScheduleDetail::parse).unwrap_or_default())
    }
}

/// `completedAt` arrives as `false`, `null`, `true` or a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Completion {
    #[default]
    Open,
    Done(Option<DateTime<Utc>>),
}

impl Completion {
    pub fn is_done(&self) -> bool {
        matches!(self, Completion::Done(_))
    }
}

impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Completion::Open => serializer.serialize_bool(false),
            Completion::Done(None) => serializer.serialize_bool(true),
            Completion::Done(Some(at)) => serializer.serialize_str(&at.to_rfc3339()),
        }
    }
}

impl<'de> Deserialize<'de> for Completion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Bool(true) => Completion::Done(None),
            serde_json::Value::String(s) if !s.is_empty() => Completion::Done(
                DateTime::parse_from_rfc3339(&s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            ),
            _ => Completion::Open,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledTask {
    pub id: RecordId,
    pub text: String,
    #[serde(rename = "data", default, with = "detail_blob")]
    pub detail: ScheduleDetail,
    #[serde(rename = "completedAt", default)]
    pub completed_at: Completion,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ScheduleDraft {
    pub text: String,
    #[serde(rename = "data", with = "detail_blob")]
    pub detail: ScheduleDetail,
    #[serde(rename = "completedAt")]
    pub completed_at: Completion,
}

impl ScheduleDraft {
    pub fn new(text: impl Into<String>, date: NaiveDate, details: &str) -> Self {
        Self {
            text: text.into(),
            detail: ScheduleDetail::on(date, details),
            completed_at: Completion::Open,
        }
    }
}

impl Draft for ScheduleDraft {
    fn normalize(&mut self) {
        self.text = self.text.trim().to_string();
        if let Some(details) = &self.detail.details {
            let trimmed = details.trim();
            self.detail.details = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        DraftValidator::require_text("task", &self.text)?;
        DraftValidator::require("date", &self.detail.date)?;
        Ok(())
    }
}

impl Resource for ScheduledTask {
    type Draft = ScheduleDraft;

    const PATH: &'static str = "/time-management";
    const NAME: &'static str = "time-management";
    const NOUN: &'static str = "task";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_draft(&self) -> ScheduleDraft {
        ScheduleDraft {
            text: self.text.clone(),
            detail: self.detail.clone(),
            completed_at: self.completed_at,
        }
    }

    fn apply_draft(&self, draft: &ScheduleDraft) -> Self {
        Self {
            id: self.id.clone(),
            text: draft.text.clone(),
            detail: draft.detail.clone(),
            completed_at: draft.completed_at,
            created_at: self.created_at,
        }
    }

    fn list_query() -> Vec<(&'static str, String)> {
        vec![("page", "1".to_string()), ("limit", "1000".to_string())]
    }
}

impl Completable for ScheduledTask {
    const TOGGLE: ToggleStrategy = ToggleStrategy::Endpoint;

    fn is_completed(&self) -> bool {
        self.completed_at.is_done()
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed_at = if completed {
            Completion::Done(Some(Utc::now()))
        } else {
            Completion::Open
        };
    }
}

impl ScheduledTask {
    /// Matches on the date text inside the encoded blob rather than a parsed date.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        !self.detail.is_empty() && self.detail.encode().contains(&date_fragment(date))
    }
}

/// Tasks whose detail blob mentions `date`, in list order.
pub fn tasks_on(tasks: &[ScheduledTask], date: NaiveDate) -> Vec<ScheduledTask> {
    tasks.iter().filter(|t| t.falls_on(date)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_fragment_pads_day() {
        assert_eq!(date_fragment(date(2025, 1, 1)), "Wed Jan 01 2025");
    }

    #[test]
    fn test_parse_blob() {
        let detail = ScheduleDetail::parse("Date: Wed Jan 01 2025\nDetails: bring slides\nand notes");
        assert_eq!(detail.date.as_deref(), Some("Wed Jan 01 2025"));
        assert_eq!(detail.details.as_deref(), Some("bring slides\nand notes"));
        assert_eq!(detail.date(), Some(date(2025, 1, 1)));
        assert!(detail.other.is_empty());
    }

    #[test]
    fn test_encode_without_details() {
        let detail = ScheduleDetail::on(date(2025, 1, 1), "   ");
        assert_eq!(detail.encode(), "Date: Wed Jan 01 2025");
    }

    #[test]
    fn test_unknown_lines_survive() {
        let blob = "Date: Wed Jan 01 2025\nRoom 4\nDetails: x";
        assert_eq!(ScheduleDetail::parse(blob).encode(), blob);
    }

    #[test]
    fn test_completion_shapes() {
        let open: Completion = serde_json::from_str("false").unwrap();
        let null: Completion = serde_json::from_str("null").unwrap();
        let flag: Completion = serde_json::from_str("true").unwrap();
        let stamped: Completion = serde_json::from_str("\"2025-01-01T10:00:00Z\"").unwrap();
        assert_eq!(open, Completion::Open);
        assert_eq!(null, Completion::Open);
        assert_eq!(flag, Completion::Done(None));
        assert!(matches!(stamped, Completion::Done(Some(_))));
    }

    #[test]
    fn test_task_from_wire_and_filter() {
        let tasks: Vec<ScheduledTask> = serde_json::from_str(
            r#"[
                {"id":"a","text":"Dentist","data":"Date: Wed Jan 01 2025","completedAt":false},
                {"id":"b","text":"Gym","data":"Date: Thu Jan 02 2025\nDetails: legs","completedAt":"2025-01-02T08:00:00Z"},
                {"id":"c","text":"Loose","data":null}
            ]"#,
        )
        .unwrap();
        assert!(tasks[1].is_completed());

        let on_first = tasks_on(&tasks, date(2025, 1, 1));
        assert_eq!(on_first.len(), 1);
        assert_eq!(on_first[0].text, "Dentist");
        assert!(tasks_on(&tasks, date(2025, 1, 3)).is_empty());
    }

    #[test]
    fn test_draft_payload() {
        let draft = ScheduleDraft::new("Dentist", date(2025, 1, 1), "bring card");
        let payload = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "text": "Dentist",
                "data": "Date: Wed Jan 01 2025\nDetails: bring card",
                "completedAt": false
            })
        );
    }

    #[test]
    fn test_draft_requires_date() {
        let draft = ScheduleDraft {
            text: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.validate().unwrap_err().field(), "date");
    }
}
