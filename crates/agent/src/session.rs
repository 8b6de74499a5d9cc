use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agenda_core::domain::session::{Session, SessionId};
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug)]
pub struct SessionEntry {
    session: Session,
    last_activity: Instant,
    closed: bool,
}

impl SessionEntry {
    pub fn new(session: Session, now: Instant) -> Self {
        Self { session, last_activity: now, closed: false }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// A closed entry has been ended or reaped. Turns that were waiting on
    /// its lock must not act on it.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }
}

/// Per-session lock. Turns for one session run one at a time while other
/// sessions proceed independently.
pub type SessionHandle = Arc<Mutex<SessionEntry>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> SessionHandle;
    async fn get(&self, id: &SessionId) -> Option<SessionHandle>;
    /// Removes the session and marks it closed once any in-flight turn
    /// releases it. Returns false when the id was unknown.
    async fn remove(&self, id: &SessionId) -> bool;
    /// Closes and removes sessions idle longer than `ttl` as of `now`.
    /// Sessions with a turn in flight are skipped.
    async fn sweep(&self, now: Instant, ttl: Duration) -> Vec<SessionId>;
    async fn len(&self) -> usize;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Session) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(SessionEntry::new(session, Instant::now())));
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, handle.clone());
        handle
    }

    async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    async fn remove(&self, id: &SessionId) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(id)
        };
        match removed {
            Some(handle) => {
                handle.lock().await.close();
                true
            }
            None => false,
        }
    }

    async fn sweep(&self, now: Instant, ttl: Duration) -> Vec<SessionId> {
        let mut expired = Vec::new();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(mut entry) if entry.idle_for(now) > ttl => {
                entry.close();
                expired.push(id.clone());
                false
            }
            _ => true,
        });
        expired
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use agenda_core::domain::session::{Session, SessionId};

    use super::{InMemorySessionStore, SessionStore};

    fn session(id: &str) -> Session {
        Session::new(SessionId(id.to_string()))
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let store = InMemorySessionStore::new();
        let handle = store.insert(session("a")).await;

        assert!(store.get(&SessionId("a".to_string())).await.is_some());
        assert!(store.remove(&SessionId("a".to_string())).await);
        assert!(!store.remove(&SessionId("a".to_string())).await);
        assert!(store.get(&SessionId("a".to_string())).await.is_none());
        assert!(handle.lock().await.is_closed());
    }

    #[tokio::test]
    async fn sweep_removes_only_idle_sessions() {
        let store = InMemorySessionStore::new();
        let idle = store.insert(session("idle")).await;
        let active = store.insert(session("active")).await;

        let later = Instant::now() + Duration::from_secs(120);
        active.lock().await.touch(later);

        let expired = store.sweep(later, Duration::from_secs(60)).await;

        assert_eq!(expired, vec![SessionId("idle".to_string())]);
        assert!(idle.lock().await.is_closed());
        assert!(!active.lock().await.is_closed());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sweep_skips_sessions_with_turn_in_flight() {
        let store = InMemorySessionStore::new();
        let handle = store.insert(session("busy")).await;
        let later = Instant::now() + Duration::from_secs(600);

        let guard = handle.lock().await;
        assert!(store.sweep(later, Duration::from_secs(60)).await.is_empty());
        drop(guard);

        assert_eq!(store.sweep(later, Duration::from_secs(60)).await.len(), 1);
        assert_eq!(store.len().await, 0);
    }
}
