use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::collection_sync::SyncPhase;
use super::error_handling::{LogHelper, SyncError, UserErrorFormatter};
use super::identity::{self, Identity, IdentityBound, IdentityGate, SyncBinding};
use crate::domain::dashboard::{DashboardSnapshot, StatSummary};
use crate::repository::ApiClient;

const RESOURCE: &str = "dashboard";
const PATH: &str = "/dashboard";

struct DashboardState {
    phase: SyncPhase,
    snapshot: Option<DashboardSnapshot>,
    generation: u64,
}

/// Read-only aggregate of every collection, fetched from `/dashboard`.
pub struct DashboardView {
    api: ApiClient,
    gate: Arc<IdentityGate>,
    state: RwLock<DashboardState>,
}

impl DashboardView {
    pub fn new(api: ApiClient, gate: Arc<IdentityGate>) -> Self {
        Self {
            api,
            gate,
            state: RwLock::new(DashboardState {
                phase: SyncPhase::Unauthenticated,
                snapshot: None,
                generation: 0,
            }),
        }
    }

    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.state.read().snapshot.clone()
    }

    pub fn stat(&self, category: &str) -> Option<StatSummary> {
        self.state.read().snapshot.as_ref()?.stat(category).cloned()
    }

    pub fn phase(&self) -> SyncPhase {
        self.state.read().phase.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.state.read().phase {
            SyncPhase::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.snapshot = None;
        state.phase = SyncPhase::Unauthenticated;
        state.generation += 1;
    }

    pub async fn load(&self) -> Result<(), SyncError> {
        let Some(token) = self.gate.current_token().await else {
            let e = SyncError::Unauthenticated;
            LogHelper::log_skipped(RESOURCE, "load", &e);
            return Err(e);
        };
        self.load_with_token(&token).await
    }

    pub async fn load_with_token(&self, token: &str) -> Result<(), SyncError> {
        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.phase = SyncPhase::Loading;
            state.generation
        };
        debug!(generation, "Loading dashboard");

        let result = self.api.fetch::<DashboardSnapshot>(RESOURCE, token, PATH).await;
        let mut state = self.state.write();
        if state.generation != generation {
            debug!("Discarding stale dashboard response");
            return Ok(());
        }

        match result {
            Ok(snapshot) => {
                info!(categories = snapshot.stats.len(), "Dashboard loaded");
                state.snapshot = Some(snapshot.with_derived_stats());
                state.phase = SyncPhase::Synced;
                Ok(())
            }
            Err(e) => {
                LogHelper::log_load_failure(RESOURCE, &e);
                state.snapshot = None;
                state.phase = SyncPhase::Error(UserErrorFormatter::format_for_ui(&e));
                Err(e)
            }
        }
    }

    pub fn bind(self: &Arc<Self>) -> SyncBinding {
        identity::bind(self.clone(), &self.gate)
    }
}

#[async_trait]
impl IdentityBound for DashboardView {
    async fn on_identity_change(&self, identity: Option<Identity>) {
        let Some(identity) = identity else {
            self.clear();
            return;
        };
        match identity.token().await {
            Ok(token) if !token.is_empty() => {
                let _ = self.load_with_token(&token).await;
            }
            Ok(_) => debug!("Empty token, dashboard load skipped"),
            Err(e) => warn!(error = %e, "Token retrieval failed, dashboard load skipped"),
        }
    }
}
