use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Mints short-lived bearer tokens for a signed-in identity.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String>;
}

/// Always hands out the same token.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Clone)]
pub struct Identity {
    pub uid: String,
    tokens: Arc<dyn TokenSource>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            uid: uid.into(),
            tokens,
        }
    }

    pub async fn token(&self) -> Result<String> {
        self.tokens.fetch_token().await
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

type Listener = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;
type ListenerMap = Mutex<HashMap<u64, Listener>>;

/// Process-wide source of sign-in / sign-out transitions.
pub struct IdentityGate {
    state: watch::Sender<Option<Identity>>,
    listeners: Arc<ListenerMap>,
    next_id: AtomicU64,
}

impl Default for IdentityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state,
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn sign_in(&self, identity: Identity) {
        info!(uid = %identity.uid, "Signed in");
        self.state.send_replace(Some(identity));
        self.notify();
    }

    pub fn sign_out(&self) {
        info!("Signed out");
        self.state.send_replace(None);
        self.notify();
    }

    /// Calls `callback` now with the current identity and again on every
    /// transition until the returned handle is unsubscribed or dropped.
    pub fn observe<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(Option<&Identity>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(callback);
        self.listeners.lock().insert(id, listener.clone());

        let current = self.current();
        listener(current.as_ref());

        ListenerHandle {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Async view of the same transitions.
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }

    /// Token for the signed-in identity; `None` when signed out or when
    /// minting fails.
    pub async fn current_token(&self) -> Option<String> {
        let identity = self.current()?;
        match identity.token().await {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!(uid = %identity.uid, error = %e, "Token retrieval failed");
                None
            }
        }
    }

    fn notify(&self) {
        // Listeners may observe or unsubscribe from inside the callback
        let listeners: Vec<Listener> = self.listeners.lock().values().cloned().collect();
        let current = self.current();
        for listener in listeners {
            listener(current.as_ref());
        }
    }
}

/// Deregisters its listener on `unsubscribe` or drop.
pub struct ListenerHandle {
    id: u64,
    listeners: Weak<ListenerMap>,
}

impl ListenerHandle {
    pub fn unsubscribe(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().remove(&self.id);
        }
    }
}

/// Something that refetches or clears itself on identity transitions.
#[async_trait]
pub trait IdentityBound: Send + Sync + 'static {
    async fn on_identity_change(&self, identity: Option<Identity>);
}

/// Background task following the gate; aborted when dropped.
pub struct SyncBinding {
    handle: JoinHandle<()>,
}

impl SyncBinding {
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SyncBinding {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Feeds the current identity to `target` right away, then every transition.
/// An update still in flight when the identity changes again is dropped.
/// Must be called inside a tokio runtime.
pub fn bind<T: IdentityBound>(target: Arc<T>, gate: &IdentityGate) -> SyncBinding {
    let mut rx = gate.watch();
    let handle = tokio::spawn(async move {
        loop {
            let identity = rx.borrow_and_update().clone();
            // A newer transition abandons the update still running for the old identity
            let interrupted = tokio::select! {
                _ = target.on_identity_change(identity) => None,
                changed = rx.changed() => Some(changed),
            };
            let changed = match interrupted {
                Some(changed) => {
                    debug!("Identity changed mid-update, superseding");
                    changed
                }
                None => rx.changed().await,
            };
            if changed.is_err() {
                debug!("Identity gate dropped, binding finished");
                break;
            }
        }
    });
    SyncBinding { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingTokens;

    #[async_trait]
    impl TokenSource for FailingTokens {
        async fn fetch_token(&self) -> Result<String> {
            Err(anyhow!("refresh token revoked"))
        }
    }

    /// Never finishes a sign-in; records every transition it is handed.
    #[derive(Default)]
    struct StallingTarget {
        seen: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl IdentityBound for StallingTarget {
        async fn on_identity_change(&self, identity: Option<Identity>) {
            let signed_in = identity.is_some();
            self.seen.lock().push(identity.map(|i| i.uid));
            if signed_in {
                std::future::pending::<()>().await;
            }
        }
    }

    fn identity(uid: &str, token: &str) -> Identity {
        Identity::new(uid, Arc::new(StaticTokenSource::new(token)))
    }

    #[test]
    fn test_observe_fires_immediately_and_on_transitions() {
        let gate = IdentityGate::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handle = gate.observe(move |id| sink.lock().push(id.map(|i| i.uid.clone())));

        gate.sign_in(identity("u1", "t"));
        gate.sign_out();
        assert_eq!(*seen.lock(), vec![None, Some("u1".to_string()), None]);

        handle.unsubscribe();
        gate.sign_in(identity("u2", "t"));
        assert_eq!(seen.lock().len(), 3);
        assert_eq!(gate.listener_count(), 0);
    }

    #[test]
    fn test_dropping_handle_deregisters() {
        let gate = IdentityGate::new();
        {
            let _handle = gate.observe(|_| {});
            assert_eq!(gate.listener_count(), 1);
        }
        assert_eq!(gate.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_current_token() {
        let gate = IdentityGate::new();
        assert_eq!(gate.current_token().await, None);

        gate.sign_in(identity("u1", "abc"));
        assert_eq!(gate.current_token().await.as_deref(), Some("abc"));

        gate.sign_in(identity("u1", ""));
        assert_eq!(gate.current_token().await, None);
    }

    #[tokio::test]
    async fn test_token_failure_is_silent() {
        let gate = IdentityGate::new();
        gate.sign_in(Identity::new("u1", Arc::new(FailingTokens)));
        assert_eq!(gate.current_token().await, None);
    }

    #[tokio::test]
    async fn test_watch_sees_transitions() {
        let gate = IdentityGate::new();
        let mut rx = gate.watch();
        gate.sign_in(identity("u1", "t"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|i| i.uid.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_binding_supersedes_stalled_update() {
        let gate = IdentityGate::new();
        gate.sign_in(identity("u1", "t"));
        let target = Arc::new(StallingTarget::default());
        let binding = bind(target.clone(), &gate);

        while target.seen.lock().is_empty() {
            tokio::task::yield_now().await;
        }
        gate.sign_out();
        while target.seen.lock().len() < 2 {
            tokio::task::yield_now().await;
        }

        assert_eq!(*target.seen.lock(), vec![Some("u1".to_string()), None]);
        assert!(binding.is_active());
    }
}
