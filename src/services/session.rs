//! Short-lived per-interaction state.
//!
//! A `/blog` or `/outlines` interaction leaves its topics and outlines here, keyed by
//! the interaction token, so a follow-up selection can pick up where it left off.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::services::outline::Outline;
use crate::trends::TopicReport;

#[derive(Debug, Clone)]
pub struct Session {
    /// Topics offered by `/blog`, in menu order.
    pub topics: Vec<TopicReport>,

    /// Topic the stored outlines were written for.
    pub focus: Option<TopicReport>,

    pub outlines: Vec<Outline>,

    updated_at: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            topics: Vec::new(),
            focus: None,
            outlines: Vec::new(),
            updated_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.updated_at.elapsed() >= ttl
    }

    #[must_use]
    pub fn outline(&self, number: u8) -> Option<&Outline> {
        self.outlines.iter().find(|o| o.number == number)
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns a live session. An expired entry is removed and reported as missing.
    pub async fn get(&self, token: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(session) if !session.is_expired(self.ttl) => return Some(session.clone()),
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(token).is_some_and(|s| s.is_expired(self.ttl)) {
            sessions.remove(token);
            debug!(token_prefix = %token_prefix(token), "Evicted expired session");
        }
        None
    }

    /// Starts a fresh session holding the daily topic menu.
    pub async fn put_topics(&self, token: &str, topics: Vec<TopicReport>) {
        let mut session = Session::new();
        session.topics = topics;
        self.sessions.write().await.insert(token.to_string(), session);
    }

    /// Records outlines for `focus`. Topics from an earlier menu are kept; every write
    /// restarts the expiry clock.
    pub async fn put_outlines(&self, token: &str, focus: TopicReport, outlines: Vec<Outline>) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(token.to_string())
            .and_modify(|s| {
                if s.is_expired(self.ttl) {
                    *s = Session::new();
                }
            })
            .or_insert_with(Session::new);

        session.focus = Some(focus);
        session.outlines = outlines;
        session.updated_at = Instant::now();
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn token_prefix(token: &str) -> &str {
    crate::trends::truncate_chars(token, 8)
}
