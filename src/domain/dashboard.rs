use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::goal::Goal;
use super::note::Note;
use super::planner::PlannerTask;
use super::project::Project;
use super::schedule::ScheduledTask;
use super::todo::Todo;

/// Summary numbers for one category of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub percentage: f64,
}

impl StatSummary {
    pub fn from_counts(total: u64, completed: u64) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (completed as f64 / total as f64) * 100.0
        };
        Self {
            total,
            completed,
            percentage,
        }
    }
}

/// Widget lists mirrored from each resource. Missing sections are empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardWidgets {
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub planner: Vec<PlannerTask>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default, alias = "timeManagement")]
    pub time_management: Vec<ScheduledTask>,
}

/// Read-only projection returned by `/dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub stats: BTreeMap<String, StatSummary>,
    #[serde(default)]
    pub widgets: DashboardWidgets,
}

impl DashboardSnapshot {
    pub fn stat(&self, category: &str) -> Option<&StatSummary> {
        self.stats.get(category)
    }

    /// Fills in categories the server left out, counted from the widget lists.
    pub fn with_derived_stats(mut self) -> Self {
        let w = &self.widgets;
        let derived = [
            (
                "todos",
                StatSummary::from_counts(w.todos.len() as u64, w.todos.iter().filter(|t| t.status).count() as u64),
            ),
            (
                "goals",
                StatSummary::from_counts(
                    w.goals.len() as u64,
                    w.goals.iter().filter(|g| g.is_complete()).count() as u64,
                ),
            ),
            ("notes", StatSummary::from_counts(w.notes.len() as u64, 0)),
            (
                "planner",
                StatSummary::from_counts(
                    w.planner.len() as u64,
                    w.planner.iter().filter(|t| t.completed).count() as u64,
                ),
            ),
            (
                "projects",
                StatSummary::from_counts(
                    w.projects.len() as u64,
                    w.projects.iter().filter(|p| p.percentage >= 100).count() as u64,
                ),
            ),
            (
                "time_management",
                StatSummary::from_counts(
                    w.time_management.len() as u64,
                    w.time_management.iter().filter(|t| t.completed_at.is_done()).count() as u64,
                ),
            ),
        ];
        for (name, summary) in derived {
            self.stats.entry(name.to_string()).or_insert(summary);
        }
        self
    }
}
