use crate::domain::{Draft, RecordId, Resource};

use super::collection_sync::CollectionSync;
use super::error_handling::{SyncError, UserErrorFormatter};

/// "Add new" form bound to a collection. Input survives a failed submit.
#[derive(Debug, Clone, Default)]
pub struct FormState<D: Draft + Default> {
    pub draft: D,
    submitting: bool,
    error: Option<String>,
}

impl<D: Draft + Default> FormState<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message from the last failed submit, cleared by the next attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Enables the submit button.
    pub fn can_submit(&self) -> bool {
        if self.submitting {
            return false;
        }
        let mut draft = self.draft.clone();
        draft.normalize();
        draft.validate().is_ok()
    }

    pub async fn submit<R>(&mut self, sync: &CollectionSync<R>) -> Result<R, SyncError>
    where
        R: Resource<Draft = D>,
    {
        self.submitting = true;
        self.error = None;
        let result = sync.create(self.draft.clone()).await;
        self.submitting = false;

        match &result {
            Ok(_) => self.draft = D::default(),
            Err(e) => self.error = Some(UserErrorFormatter::format_mutation_error("add", R::NOUN, e)),
        }
        result
    }
}

/// Inline edit of one existing record, addressed by id.
pub struct Editor<R: Resource> {
    target: Option<RecordId>,
    pub draft: Option<R::Draft>,
    error: Option<String>,
}

impl<R: Resource> Default for Editor<R> {
    fn default() -> Self {
        Self {
            target: None,
            draft: None,
            error: None,
        }
    }
}

impl<R: Resource> Editor<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, record: &R) {
        self.target = Some(record.id().clone());
        self.draft = Some(record.to_draft());
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&RecordId> {
        self.target.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        self.draft.as_mut()
    }

    pub fn cancel(&mut self) {
        self.target = None;
        self.draft = None;
        self.error = None;
    }

    /// `Ok(None)` when nothing is being edited. Stays in editing mode if the
    /// save fails.
    pub async fn save(&mut self, sync: &CollectionSync<R>) -> Result<Option<R>, SyncError> {
        let (Some(id), Some(draft)) = (&self.target, &self.draft) else {
            return Ok(None);
        };

        match sync.update(id, draft.clone()).await {
            Ok(saved) => {
                self.cancel();
                Ok(Some(saved))
            }
            Err(e) => {
                self.error = Some(UserErrorFormatter::format_mutation_error("update", R::NOUN, &e));
                Err(e)
            }
        }
    }
}
