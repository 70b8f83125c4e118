//! In-memory admin sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

/// An issued session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Admin user the session belongs to.
    pub user_id: String,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Token to session map with a fixed lifetime.
///
/// Sessions live only in process memory and do not survive a restart.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create an empty store issuing sessions that last `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Session lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // The map holds no invariants a panic could break.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a new session for `user_id`.
    pub fn issue(&self, user_id: &str) -> Session {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a new session as of `now`.
    ///
    /// Sessions already expired at `now` are dropped first, so abandoned
    /// tokens do not pile up.
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Session {
        let token = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        let session = Session {
            token: token.clone(),
            user_id: user_id.to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.lock();
        let purged = purge_expired(&mut sessions, now);
        sessions.insert(token, session.clone());
        debug!(user_id, purged, "Issued admin session");
        session
    }

    /// Look up a live session. Expired sessions are dropped on sight.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.resolve_at(token, Utc::now())
    }

    /// Look up a session that is live at `now`.
    #[must_use]
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let mut sessions = self.lock();
        let session = sessions.get(token).cloned()?;
        if session.is_expired_at(now) {
            sessions.remove(token);
            return None;
        }
        Some(session)
    }

    /// End one session. Returns `false` if the token was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    /// End every session of one user. Returns how many were ended.
    pub fn revoke_user(&self, user_id: &str) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        let revoked = before - sessions.len();
        if revoked > 0 {
            debug!(user_id, revoked, "Revoked admin sessions");
        }
        revoked
    }

    /// Number of stored sessions, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop every session expired at `now`. Returns how many were dropped.
fn purge_expired(sessions: &mut HashMap<String, Session>, now: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired_at(now));
    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::minutes(30))
    }

    #[test]
    fn test_issue_and_resolve() {
        let store = store();
        let session = store.issue("user-1");

        assert_eq!(session.token.len(), 64);
        assert_eq!(session.expires_at - session.issued_at, Duration::minutes(30));
        let resolved = store.resolve(&session.token).unwrap();
        assert_eq!(resolved.user_id, "user-1");
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = store();
        assert_ne!(store.issue("u").token, store.issue("u").token);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_token() {
        assert!(store().resolve("nope").is_none());
    }

    #[test]
    fn test_expired_session_dropped_on_resolve() {
        let store = store();
        let now = Utc::now();
        let session = store.issue_at("user-1", now);

        assert!(store
            .resolve_at(&session.token, now + Duration::minutes(29))
            .is_some());
        assert!(store
            .resolve_at(&session.token, now + Duration::minutes(30))
            .is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_revoke() {
        let store = store();
        let session = store.issue("user-1");
        assert!(store.revoke(&session.token));
        assert!(!store.revoke(&session.token));
        assert!(store.resolve(&session.token).is_none());
    }

    #[test]
    fn test_revoke_user() {
        let store = store();
        store.issue("user-1");
        store.issue("user-1");
        let other = store.issue("user-2");

        assert_eq!(store.revoke_user("user-1"), 2);
        assert_eq!(store.len(), 1);
        assert!(store.resolve(&other.token).is_some());
    }

    #[test]
    fn test_issue_drops_expired_sessions() {
        let store = store();
        let now = Utc::now();
        let old = store.issue_at("old", now - Duration::minutes(35));
        let recent = store.issue_at("recent", now - Duration::minutes(10));
        assert_eq!(store.len(), 2);

        store.issue_at("fresh", now);
        assert_eq!(store.len(), 2);
        assert!(store.resolve_at(&old.token, now).is_none());
        assert!(store.resolve_at(&recent.token, now).is_some());
    }
}
