use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error_handling::{LogHelper, SyncError, UserErrorFormatter};
use super::identity::{self, Identity, IdentityBound, IdentityGate, SyncBinding};
use crate::domain::schedule::{self, ScheduledTask};
use crate::domain::{Completable, Draft, RecordId, Resource, Tally, ToggleStrategy};
use crate::repository::ApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    Unauthenticated,
    Loading,
    Synced,
    /// Last load failed; carries the message shown next to the retry action.
    Error(String),
}

struct SyncState<R> {
    phase: SyncPhase,
    records: Vec<R>,
    /// Bumped by every load and every clear; a load may only apply its
    /// response while its generation is still current.
    generation: u64,
}

/// Local mirror of one user-scoped collection, kept in step with the server.
///
/// Mutations touch local state only after the server confirms them. Lock
/// guards are never held across a request.
pub struct CollectionSync<R: Resource> {
    api: ApiClient,
    gate: Arc<IdentityGate>,
    state: RwLock<SyncState<R>>,
}

impl<R: Resource> CollectionSync<R> {
    pub fn new(api: ApiClient, gate: Arc<IdentityGate>) -> Self {
        Self {
            api,
            gate,
            state: RwLock::new(SyncState {
                phase: SyncPhase::Unauthenticated,
                records: Vec::new(),
                generation: 0,
            }),
        }
    }

    pub fn records(&self) -> Vec<R> {
        self.state.read().records.clone()
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

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    pub fn find(&self, id: &RecordId) -> Option<R> {
        self.state.read().records.iter().find(|r| r.id() == id).cloned()
    }

    /// Drops every record and returns to `Unauthenticated`.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.records.clear();
        state.phase = SyncPhase::Unauthenticated;
        state.generation += 1;
    }

    /// Refetches with the signed-in identity's token. Without one nothing is
    /// sent and local state is left alone.
    pub async fn load(&self) -> Result<(), SyncError> {
        let token = match self.token().await {
            Ok(token) => token,
            Err(e) => {
                LogHelper::log_skipped(R::NAME, "load", &e);
                return Err(e);
            }
        };
        self.load_with_token(&token).await
    }

    /// Only the most recently issued load applies its outcome. Responses to
    /// loads superseded by a later load or a sign-out are dropped.
    pub async fn load_with_token(&self, token: &str) -> Result<(), SyncError> {
        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.phase = SyncPhase::Loading;
            state.generation
        };
        debug!(resource = R::NAME, generation, "Loading collection");

        let result = self.api.list::<R>(token).await;
        let mut state = self.state.write();
        if state.generation != generation {
            debug!(resource = R::NAME, generation, "Discarding stale load response");
            return Ok(());
        }

        match result {
            Ok(records) => {
                info!(resource = R::NAME, count = records.len(), "Collection loaded");
                state.records = records;
                state.phase = SyncPhase::Synced;
                Ok(())
            }
            Err(e) => {
                LogHelper::log_load_failure(R::NAME, &e);
                state.records.clear();
                state.phase = SyncPhase::Error(UserErrorFormatter::format_for_ui(&e));
                Err(e)
            }
        }
    }

    /// Prepends the server's copy of the new record.
    pub async fn create(&self, mut draft: R::Draft) -> Result<R, SyncError> {
        draft.normalize();
        if let Err(e) = draft.validate() {
            let e = SyncError::from(e);
            LogHelper::log_skipped(R::NAME, "create", &e);
            return Err(e);
        }
        let token = self.token().await?;

        match self.api.create::<R>(&token, &draft).await {
            Ok(record) => {
                LogHelper::log_sync_operation(R::NAME, "create", Some(record.id()), true);
                self.state.write().records.insert(0, record.clone());
                Ok(record)
            }
            Err(e) => {
                LogHelper::log_sync_operation(R::NAME, "create", None, false);
                Err(e)
            }
        }
    }

    /// Full replacement of the record with `id`.
    pub async fn update(&self, id: &RecordId, mut draft: R::Draft) -> Result<R, SyncError> {
        draft.normalize();
        draft.validate()?;
        let current = self.require(id)?;
        let token = self.token().await?;

        self.submit(&token, &current, &draft, "update").await
    }

    pub async fn remove(&self, id: &RecordId) -> Result<(), SyncError> {
        let token = self.token().await?;

        match self.api.delete::<R>(&token, id).await {
            Ok(()) => {
                LogHelper::log_sync_operation(R::NAME, "delete", Some(id), true);
                self.state.write().records.retain(|r| r.id() != id);
                Ok(())
            }
            Err(e) => {
                LogHelper::log_sync_operation(R::NAME, "delete", Some(id), false);
                Err(e)
            }
        }
    }

    /// Signed out → clear; signed in → refetch with the new identity's token.
    pub async fn on_identity_change(&self, identity: Option<Identity>) {
        let Some(identity) = identity else {
            self.clear();
            return;
        };

        match identity.token().await {
            Ok(token) if !token.is_empty() => {
                // Failure is already recorded in the phase
                let _ = self.load_with_token(&token).await;
            }
            Ok(_) => debug!(resource = R::NAME, "Empty token, load skipped"),
            Err(e) => warn!(resource = R::NAME, error = %e, "Token retrieval failed, load skipped"),
        }
    }

    /// Follows the gate until the returned binding is dropped.
    pub fn bind(self: &Arc<Self>) -> SyncBinding {
        identity::bind(self.clone(), &self.gate)
    }

    async fn token(&self) -> Result<String, SyncError> {
        self.gate.current_token().await.ok_or(SyncError::Unauthenticated)
    }

    fn require(&self, id: &RecordId) -> Result<R, SyncError> {
        self.find(id).ok_or_else(|| SyncError::NotFound {
            resource: R::NAME,
            id: id.clone(),
        })
    }

    /// PUT the draft; without a record in the response the draft is applied locally.
    async fn submit(&self, token: &str, current: &R, draft: &R::Draft, operation: &str) -> Result<R, SyncError> {
        let id = current.id();
        match self.api.update::<R>(token, id, draft).await {
            Ok(echoed) => {
                LogHelper::log_sync_operation(R::NAME, operation, Some(id), true);
                let record = echoed.unwrap_or_else(|| current.apply_draft(draft));
                self.replace(record.clone());
                Ok(record)
            }
            Err(e) => {
                LogHelper::log_sync_operation(R::NAME, operation, Some(id), false);
                Err(e)
            }
        }
    }

    fn replace(&self, record: R) {
        let mut state = self.state.write();
        if let Some(slot) = state.records.iter_mut().find(|r| r.id() == record.id()) {
            *slot = record;
        }
    }
}

impl<R: Completable> CollectionSync<R> {
    pub async fn toggle(&self, id: &RecordId) -> Result<R, SyncError> {
        let current = self.require(id)?;
        let token = self.token().await?;

        match R::TOGGLE {
            ToggleStrategy::ResubmitFull => {
                let mut flipped = current.clone();
                flipped.set_completed(!current.is_completed());
                self.submit(&token, &current, &flipped.to_draft(), "toggle").await
            }
            ToggleStrategy::Endpoint => match self.api.toggle::<R>(&token, id).await {
                Ok(record) => {
                    LogHelper::log_sync_operation(R::NAME, "toggle", Some(id), true);
                    self.replace(record.clone());
                    Ok(record)
                }
                Err(e) => {
                    LogHelper::log_sync_operation(R::NAME, "toggle", Some(id), false);
                    Err(e)
                }
            },
        }
    }

    pub fn tally(&self) -> Tally {
        Tally::of(&self.state.read().records)
    }
}

impl CollectionSync<ScheduledTask> {
    /// Deletes every completed task on the server, then locally.
    pub async fn clear_completed(&self) -> Result<usize, SyncError> {
        let token = self.token().await?;

        match self.api.delete_under::<ScheduledTask>(&token, "/completed/all").await {
            Ok(_) => {
                let mut state = self.state.write();
                let before = state.records.len();
                state.records.retain(|t| !t.is_completed());
                let removed = before - state.records.len();
                info!(resource = ScheduledTask::NAME, removed, "Cleared completed tasks");
                Ok(removed)
            }
            Err(e) => {
                LogHelper::log_sync_operation(ScheduledTask::NAME, "clear completed", None, false);
                Err(e)
            }
        }
    }

    pub fn tasks_on(&self, date: NaiveDate) -> Vec<ScheduledTask> {
        schedule::tasks_on(&self.state.read().records, date)
    }
}

#[async_trait]
impl<R: Resource> IdentityBound for CollectionSync<R> {
    async fn on_identity_change(&self, identity: Option<Identity>) {
        CollectionSync::on_identity_change(self, identity).await
    }
}
