//! In-process storage for [`RequestSession`]s between requests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::config::UserProfileConfig;
use crate::domain::session::RequestSession;

/// Shortest sweep period; `interval` rejects a zero period.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct StoredSession {
    session: RequestSession,
    touched: Instant,
}

/// Sessions keyed by the id carried in the session cookie.
///
/// Requests sharing a cookie never overwrite each other: writers merge into
/// the stored entry and readers drain it in place. Empty sessions are not
/// kept, and entries untouched for longer than the TTL are dropped.
#[derive(Debug)]
pub struct SessionStore {
    cookie_name: String,
    ttl: Duration,
    sessions: DashMap<Uuid, StoredSession>,
}

impl SessionStore {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ttl,
            sessions: DashMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &UserProfileConfig) -> Self {
        Self::new(config.session_cookie.clone(), config.session_ttl())
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Drains everything stored under `id`; an empty session if there is
    /// nothing or it has expired.
    #[must_use]
    pub fn take(&self, id: Uuid) -> RequestSession {
        let taken = self.sessions.get_mut(&id).and_then(|mut stored| {
            let live = stored.touched.elapsed() < self.ttl;
            let session = std::mem::take(&mut stored.session);
            live.then_some(session)
        });
        self.sessions.remove_if(&id, |_, stored| stored.session.is_empty());
        taken.unwrap_or_default()
    }

    /// Merges `session` into whatever is already stored under `id`.
    pub fn save(&self, id: Uuid, session: RequestSession) {
        if session.is_empty() {
            return;
        }
        let mut stored = self.sessions.entry(id).or_insert_with(|| StoredSession {
            session: RequestSession::default(),
            touched: Instant::now(),
        });
        if stored.touched.elapsed() >= self.ttl {
            stored.session = RequestSession::default();
        }
        stored.session.merge(session);
        stored.touched = Instant::now();
    }

    /// Drops expired entries and returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, stored| stored.touched.elapsed() < self.ttl);
        before.saturating_sub(self.sessions.len())
    }

    /// Sweeps expired entries every `period` until the handle is aborted.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(MIN_SWEEP_PERIOD));
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired();
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "Swept expired sessions");
                }
            }
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
