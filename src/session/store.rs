use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::policy::{Reauthentication, evaluate};
use super::{AuthenticatedIdentity, SessionError, SessionId, SessionRecord, StagedRequest};
use crate::authorization::AuthorizationRequestInfo;
use crate::clock::Clock;

/// Session storage keyed by an opaque session identifier.
///
/// Every operation on a given session is serialized by the store, so
/// [`SessionStore::take_staged`] is observed by exactly one caller: a second
/// call returns `None` until a new request is staged.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return `id` when it names a live session, otherwise create a new one.
    async fn create_if_absent(&self, id: Option<&SessionId>) -> SessionId;

    /// Snapshot of the session record.
    async fn get(&self, id: &SessionId) -> Result<SessionRecord, SessionError>;

    /// Stage an authorization request, replacing any previous one.
    async fn stage(&self, id: &SessionId, staged: StagedRequest) -> Result<(), SessionError>;

    /// Read and clear the staged request in one step.
    async fn take_staged(&self, id: &SessionId) -> Result<Option<StagedRequest>, SessionError>;

    async fn remember_identity(
        &self,
        id: &SessionId,
        identity: AuthenticatedIdentity,
    ) -> Result<(), SessionError>;

    async fn forget_identity(&self, id: &SessionId) -> Result<(), SessionError>;

    /// Evaluate the re-authentication policy and clear an invalidated identity
    /// without releasing the session in between. Returns the outcome together
    /// with the identity that is still valid, if any.
    async fn reauthenticate(
        &self,
        id: &SessionId,
        info: &AuthorizationRequestInfo,
        now_unix: i64,
    ) -> Result<(Reauthentication, Option<AuthenticatedIdentity>), SessionError>;
}

struct SessionEntry {
    record: SessionRecord,
    last_seen_unix: i64,
}

/// In-process store; sessions idle for longer than the TTL are treated as
/// absent and pruned whenever a session is created.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl_seconds,
            clock,
        }
    }

    fn is_live(&self, entry: &SessionEntry, now: i64) -> bool {
        now - entry.last_seen_unix <= self.ttl_seconds
    }

    async fn with_session<R, F>(&self, id: &SessionId, update: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut SessionRecord) -> R + Send,
        R: Send,
    {
        let now = self.clock.now_unix();
        let mut sessions = self.sessions.lock().await;
        let live = sessions
            .get(id)
            .is_some_and(|entry| self.is_live(entry, now));
        if !live {
            sessions.remove(id);
            return Err(SessionError::NoSession);
        }
        let entry = sessions.get_mut(id).ok_or(SessionError::NoSession)?;
        entry.last_seen_unix = now;
        Ok(update(&mut entry.record))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_if_absent(&self, id: Option<&SessionId>) -> SessionId {
        let now = self.clock.now_unix();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| self.is_live(entry, now));

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen_unix = now;
                return id.clone();
            }
        }

        let id = SessionId::generate();
        sessions.insert(
            id.clone(),
            SessionEntry {
                record: SessionRecord::default(),
                last_seen_unix: now,
            },
        );
        id
    }

    async fn get(&self, id: &SessionId) -> Result<SessionRecord, SessionError> {
        self.with_session(id, |record| record.clone()).await
    }

    async fn stage(&self, id: &SessionId, staged: StagedRequest) -> Result<(), SessionError> {
        self.with_session(id, |record| record.staged = Some(staged))
            .await
    }

    async fn take_staged(&self, id: &SessionId) -> Result<Option<StagedRequest>, SessionError> {
        self.with_session(id, |record| record.staged.take()).await
    }

    async fn remember_identity(
        &self,
        id: &SessionId,
        identity: AuthenticatedIdentity,
    ) -> Result<(), SessionError> {
        self.with_session(id, |record| record.identity = Some(identity))
            .await
    }

    async fn forget_identity(&self, id: &SessionId) -> Result<(), SessionError> {
        self.with_session(id, |record| record.identity = None).await
    }

    async fn reauthenticate(
        &self,
        id: &SessionId,
        info: &AuthorizationRequestInfo,
        now_unix: i64,
    ) -> Result<(Reauthentication, Option<AuthenticatedIdentity>), SessionError> {
        self.with_session(id, |record| {
            let outcome = evaluate(record, info, now_unix);
            if let Reauthentication::Invalidate(_) = outcome {
                record.identity = None;
            }
            (outcome, record.identity.clone())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::authorization::Prompt;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct ManualClock(AtomicI64);

    impl Clock for ManualClock {
        fn now_unix(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn store(ttl: i64) -> (Arc<ManualClock>, MemorySessionStore) {
        let clock = Arc::new(ManualClock(AtomicI64::new(1_000)));
        let store = MemorySessionStore::new(ttl, clock.clone());
        (clock, store)
    }

    fn staged(ticket: &str) -> StagedRequest {
        StagedRequest {
            ticket: ticket.to_string(),
            claim_names: vec!["email".to_string()],
            claim_locales: vec!["en".to_string()],
        }
    }

    #[tokio::test]
    async fn create_if_absent_reuses_live_session() {
        let (_clock, store) = store(60);
        let id = store.create_if_absent(None).await;
        assert_eq!(store.create_if_absent(Some(&id)).await, id);
    }

    #[tokio::test]
    async fn create_if_absent_replaces_unknown_session() {
        let (_clock, store) = store(60);
        let unknown = SessionId::parse("forged").unwrap();
        let id = store.create_if_absent(Some(&unknown)).await;
        assert_ne!(id, unknown);
        assert_eq!(store.get(&unknown).await, Err(SessionError::NoSession));
    }

    #[tokio::test]
    async fn take_staged_clears_the_ticket() {
        let (_clock, store) = store(60);
        let id = store.create_if_absent(None).await;
        store.stage(&id, staged("t-1")).await.unwrap();

        assert_eq!(store.take_staged(&id).await.unwrap(), Some(staged("t-1")));
        assert_eq!(store.take_staged(&id).await.unwrap(), None);

        store.stage(&id, staged("t-2")).await.unwrap();
        assert_eq!(store.take_staged(&id).await.unwrap(), Some(staged("t-2")));
    }

    #[tokio::test]
    async fn concurrent_takes_observe_the_ticket_once() {
        let (_clock, store) = store(60);
        let store = Arc::new(store);
        let id = store.create_if_absent(None).await;
        store.stage(&id, staged("t-1")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.take_staged(&id).await.unwrap()
            }));
        }

        let mut taken = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                taken += 1;
            }
        }
        assert_eq!(taken, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let (_clock, store) = store(60);
        let first = store.create_if_absent(None).await;
        let second = store.create_if_absent(None).await;
        store.stage(&first, staged("t-1")).await.unwrap();

        assert_eq!(store.take_staged(&second).await.unwrap(), None);
        assert!(store.get(&first).await.unwrap().staged.is_some());
    }

    #[tokio::test]
    async fn identity_round_trip() {
        let (_clock, store) = store(60);
        let id = store.create_if_absent(None).await;
        let identity = AuthenticatedIdentity {
            subject: "1001".to_string(),
            authenticated_at: 1_000,
        };
        store.remember_identity(&id, identity.clone()).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().identity, Some(identity));

        store.forget_identity(&id).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().identity, None);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let (clock, store) = store(60);
        let id = store.create_if_absent(None).await;
        store.stage(&id, staged("t-1")).await.unwrap();

        clock.0.store(1_061, Ordering::SeqCst);
        assert_eq!(store.take_staged(&id).await, Err(SessionError::NoSession));
    }

    #[tokio::test]
    async fn access_extends_idle_lifetime() {
        let (clock, store) = store(60);
        let id = store.create_if_absent(None).await;

        clock.0.store(1_050, Ordering::SeqCst);
        store.get(&id).await.unwrap();
        clock.0.store(1_100, Ordering::SeqCst);
        assert!(store.get(&id).await.is_ok());
    }

    fn request(prompts: &[Prompt], max_age: Option<u64>) -> AuthorizationRequestInfo {
        AuthorizationRequestInfo {
            ticket: "t-1".to_string(),
            prompts: prompts.iter().copied().collect(),
            max_age,
            ..AuthorizationRequestInfo::default()
        }
    }

    #[tokio::test]
    async fn reauthenticate_keeps_fresh_identity() {
        let (_clock, store) = store(600);
        let id = store.create_if_absent(None).await;
        let identity = AuthenticatedIdentity {
            subject: "1001".to_string(),
            authenticated_at: 1_000,
        };
        store.remember_identity(&id, identity.clone()).await.unwrap();

        let (outcome, kept) = store
            .reauthenticate(&id, &request(&[], Some(300)), 1_200)
            .await
            .unwrap();
        assert_eq!(outcome, Reauthentication::Reuse);
        assert_eq!(kept, Some(identity.clone()));
        assert_eq!(store.get(&id).await.unwrap().identity, Some(identity));
    }

    #[tokio::test]
    async fn reauthenticate_clears_invalidated_identity() {
        let (_clock, store) = store(600);
        let id = store.create_if_absent(None).await;
        store.stage(&id, staged("t-0")).await.unwrap();
        store
            .remember_identity(
                &id,
                AuthenticatedIdentity {
                    subject: "1001".to_string(),
                    authenticated_at: 1_000,
                },
            )
            .await
            .unwrap();

        let (outcome, kept) = store
            .reauthenticate(&id, &request(&[Prompt::Login], None), 1_000)
            .await
            .unwrap();
        assert!(matches!(outcome, Reauthentication::Invalidate(_)));
        assert_eq!(kept, None);

        let record = store.get(&id).await.unwrap();
        assert_eq!(record.identity, None);
        assert_eq!(record.staged, Some(staged("t-0")));
    }

    #[tokio::test]
    async fn reauthenticate_and_remember_do_not_interleave() {
        let (_clock, store) = store(600);
        let store = Arc::new(store);
        let id = store.create_if_absent(None).await;
        let stale = AuthenticatedIdentity {
            subject: "1001".to_string(),
            authenticated_at: 0,
        };
        let fresh = AuthenticatedIdentity {
            subject: "1001".to_string(),
            authenticated_at: 1_000,
        };
        store.remember_identity(&id, stale).await.unwrap();

        let evaluating = {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                store
                    .reauthenticate(&id, &request(&[], Some(60)), 1_000)
                    .await
                    .unwrap()
            })
        };
        let remembering = {
            let store = store.clone();
            let id = id.clone();
            let fresh = fresh.clone();
            tokio::spawn(async move { store.remember_identity(&id, fresh).await.unwrap() })
        };
        let (outcome, _) = evaluating.await.unwrap();
        remembering.await.unwrap();

        // Either order leaves the fresh identity in place.
        let record = store.get(&id).await.unwrap();
        assert_eq!(record.identity, Some(fresh));
        assert!(matches!(
            outcome,
            Reauthentication::Reuse | Reauthentication::Invalidate(_)
        ));
    }

    #[tokio::test]
    async fn missing_session_is_an_error() {
        let (_clock, store) = store(60);
        let id = SessionId::generate();
        assert_eq!(store.stage(&id, staged("t")).await, Err(SessionError::NoSession));
        assert_eq!(store.forget_identity(&id).await, Err(SessionError::NoSession));
        assert!(
            store
                .reauthenticate(&id, &request(&[], None), 1_000)
                .await
                .is_err()
        );
    }
}
