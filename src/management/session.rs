use std::{collections::HashMap, time::Duration};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::types::PkceSession;

/// Pending PKCE authorizations keyed by their `state` value.
///
/// Sessions older than the TTL are swept whenever a new one is inserted and
/// are never handed out by [`PkceSessions::take`].
pub struct PkceSessions {
    sessions: Mutex<HashMap<String, PkceSession>>,
    ttl: Duration,
}

impl PkceSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn insert(&self, state: String, code_verifier: String) {
        let now = Utc::now().timestamp();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !self.is_expired(s, now));
        sessions.insert(
            state,
            PkceSession {
                code_verifier,
                created_at: now,
            },
        );
    }

    /// Removes the session for `state` and returns it unless it has expired.
    pub async fn take(&self, state: &str) -> Option<PkceSession> {
        let session = self.sessions.lock().await.remove(state)?;
        if self.is_expired(&session, Utc::now().timestamp()) {
            return None;
        }
        Some(session)
    }

    /// Puts a session back, used when the code exchange failed.
    pub async fn restore(&self, state: String, session: PkceSession) {
        self.sessions.lock().await.insert(state, session);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_expired(&self, session: &PkceSession, now: i64) -> bool {
        let age = now.saturating_sub(session.created_at);
        age < 0 || age as u64 > self.ttl.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn take_consumes_session() {
        let sessions = PkceSessions::new(Duration::from_secs(600));
        sessions.insert("state".into(), "verifier".into()).await;

        let session = sessions.take("state").await.unwrap();
        assert_eq!(session.code_verifier, "verifier");
        assert!(sessions.take("state").await.is_none());
    }

    #[tokio::test]
    async fn unknown_state_yields_nothing() {
        let sessions = PkceSessions::new(Duration::from_secs(600));
        sessions.insert("state".into(), "verifier".into()).await;
        assert!(sessions.take("other").await.is_none());
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn take_refuses_expired_session() {
        let sessions = PkceSessions::new(Duration::from_secs(600));
        sessions
            .restore(
                "old".into(),
                PkceSession {
                    code_verifier: "v".into(),
                    created_at: Utc::now().timestamp() - 601,
                },
            )
            .await;
        assert_eq!(sessions.len().await, 1);

        assert!(sessions.take("old").await.is_none());
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn expired_sessions_are_swept_on_insert() {
        let sessions = PkceSessions::new(Duration::from_secs(600));
        sessions
            .restore(
                "old".into(),
                PkceSession {
                    code_verifier: "v".into(),
                    created_at: Utc::now().timestamp() - 3600,
                },
            )
            .await;
        sessions.insert("new".into(), "verifier".into()).await;

        assert_eq!(sessions.len().await, 1);
        assert!(sessions.take("old").await.is_none());
    }
}
