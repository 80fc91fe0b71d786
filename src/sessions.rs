use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

/// Identity attached to a session token. A session may carry a user, the
/// admin flag, or both (an admin logging in from a user's browser).
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: Option<String>,
    pub is_admin: bool,
    expires_at: Instant,
}

/// In-memory token -> session map. Expired entries are dropped on access.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        match self.sessions.get(token) {
            Some(session) if session.expires_at > Instant::now() => {
                return Some(session.value().clone());
            }
            Some(_) => {}
            None => return None,
        }
        self.sessions.remove(token);
        None
    }

    /// Attaches a user identity to the session, reusing a still-valid token
    /// from the request so an admin flag on it survives, and refreshing the
    /// expiry either way.
    pub fn login_user(&self, token: Option<&str>, user_id: String) -> String {
        self.upsert(token, |session| session.user_id = Some(user_id))
    }

    pub fn login_admin(&self, token: Option<&str>) -> String {
        self.upsert(token, |session| session.is_admin = true)
    }

    /// Destroys the session outright.
    pub fn logout_user(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Clears only the admin flag; a user identity on the same token stays.
    pub fn logout_admin(&self, token: &str) {
        if let Some(mut session) = self.sessions.get_mut(token) {
            session.is_admin = false;
        }
    }

    fn upsert(&self, token: Option<&str>, apply: impl FnOnce(&mut Session)) -> String {
        let token = match token {
            Some(t) if self.get(t).is_some() => t.to_string(),
            _ => {
                let fresh = Uuid::new_v4().hyphenated().to_string();
                self.sessions.insert(
                    fresh.clone(),
                    Session {
                        user_id: None,
                        is_admin: false,
                        expires_at: Instant::now() + self.ttl,
                    },
                );
                fresh
            }
        };

        if let Some(mut session) = self.sessions.get_mut(&token) {
            apply(&mut *session);
            session.expires_at = Instant::now() + self.ttl;
        }

        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_and_get() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.login_user(None, "user-1".to_string());

        let session = store.get(&token).unwrap();
        assert_eq!(session.user_id.as_deref(), Some("user-1"));
        assert!(!session.is_admin);
    }

    #[test]
    fn test_unknown_token() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new(Duration::from_secs(0));
        let token = store.login_user(None, "user-1".to_string());
        assert!(store.get(&token).is_none());
    }

    #[test]
    fn test_admin_flag_on_user_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.login_user(None, "user-1".to_string());
        let same = store.login_admin(Some(&token));
        assert_eq!(same, token);

        let session = store.get(&token).unwrap();
        assert!(session.is_admin);
        assert_eq!(session.user_id.as_deref(), Some("user-1"));

        store.logout_admin(&token);
        let session = store.get(&token).unwrap();
        assert!(!session.is_admin);
        assert_eq!(session.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_logout_destroys_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.login_user(None, "user-1".to_string());
        store.logout_user(&token);
        assert!(store.get(&token).is_none());
    }
}
