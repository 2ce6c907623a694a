use std::sync::Arc;

use super::collection_sync::CollectionSync;
use super::dashboard_service::DashboardView;
use super::identity::{IdentityGate, SyncBinding};
use crate::domain::goal::Goal;
use crate::domain::note::Note;
use crate::domain::planner::PlannerTask;
use crate::domain::project::Project;
use crate::domain::schedule::ScheduledTask;
use crate::domain::todo::Todo;
use crate::repository::Repository;

/// One synchronizer per page, all following the same identity gate.
pub struct AppState {
    pub repository: Repository,
    pub gate: Arc<IdentityGate>,
    pub todos: Arc<CollectionSync<Todo>>,
    pub goals: Arc<CollectionSync<Goal>>,
    pub notes: Arc<CollectionSync<Note>>,
    pub planner: Arc<CollectionSync<PlannerTask>>,
    pub projects: Arc<CollectionSync<Project>>,
    pub schedule: Arc<CollectionSync<ScheduledTask>>,
    pub dashboard: Arc<DashboardView>,
}

impl AppState {
    pub fn new(repository: Repository, gate: Arc<IdentityGate>) -> Self {
        let api = repository.api.clone();
        Self {
            todos: Arc::new(CollectionSync::new(api.clone(), gate.clone())),
            goals: Arc::new(CollectionSync::new(api.clone(), gate.clone())),
            notes: Arc::new(CollectionSync::new(api.clone(), gate.clone())),
            planner: Arc::new(CollectionSync::new(api.clone(), gate.clone())),
            projects: Arc::new(CollectionSync::new(api.clone(), gate.clone())),
            schedule: Arc::new(CollectionSync::new(api.clone(), gate.clone())),
            dashboard: Arc::new(DashboardView::new(api, gate.clone())),
            repository,
            gate,
        }
    }

    /// Keep the returned bindings alive for as long as the pages should follow
    /// sign-in changes.
    pub fn bind_all(&self) -> Vec<SyncBinding> {
        vec![
            self.todos.bind(),
            self.goals.bind(),
            self.notes.bind(),
            self.planner.bind(),
            self.projects.bind(),
            self.schedule.bind(),
            self.dashboard.bind(),
        ]
    }

    /// Refetches every page, returning the first failure.
    pub async fn reload_all(&self) -> Result<(), super::error_handling::SyncError> {
        let results = [
            self.todos.load().await,
            self.goals.load().await,
            self.notes.load().await,
            self.planner.load().await,
            self.projects.load().await,
            self.schedule.load().await,
            self.dashboard.load().await,
        ];
        results.into_iter().collect()
    }
}
