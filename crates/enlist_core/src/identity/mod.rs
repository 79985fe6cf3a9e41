//! Request identity: who is acting, resolved from an opaque session token.
//!
//! # Responsibility
//! - Resolve a session token to an `Actor` (`Anonymous` or a user).
//! - Open and close sessions for authenticated users.
//! - Hash and verify passwords (see `password`).
//!
//! # Invariants
//! - Unknown or closed tokens resolve to `Actor::Anonymous`, never an error.
//! - Tokens are random and never derived from user data.

pub mod password;

use crate::model::user::UserId;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Identity attached to one incoming operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Actor {
    Anonymous,
    User(UserId),
}

impl Actor {
    /// Returns the authenticated user id, if any.
    pub fn user_id(self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(id),
        }
    }
}

/// Opaque bearer token bound to one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a token from its string form; `None` when malformed.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticates requests and manages the sessions behind them.
pub trait IdentityProvider {
    /// Resolves a token to the acting identity.
    fn resolve(&self, token: &SessionToken) -> Actor;
    /// Starts a session for `user_id`.
    fn open_session(&self, user_id: UserId) -> SessionToken;
    /// Ends one session. Unknown tokens are ignored.
    fn close_session(&self, token: &SessionToken);
    /// Ends every session of `user_id`.
    fn close_user_sessions(&self, user_id: UserId);
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for &T {
    fn resolve(&self, token: &SessionToken) -> Actor {
        (**self).resolve(token)
    }

    fn open_session(&self, user_id: UserId) -> SessionToken {
        (**self).open_session(user_id)
    }

    fn close_session(&self, token: &SessionToken) {
        (**self).close_session(token)
    }

    fn close_user_sessions(&self, user_id: UserId) {
        (**self).close_user_sessions(user_id)
    }
}

/// Process-local session table.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionToken, UserId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionToken, UserId>> {
        // The map holds plain data; a panic mid-update cannot leave it torn.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityProvider for SessionRegistry {
    fn resolve(&self, token: &SessionToken) -> Actor {
        match self.lock().get(token) {
            Some(user_id) => Actor::User(*user_id),
            None => Actor::Anonymous,
        }
    }

    fn open_session(&self, user_id: UserId) -> SessionToken {
        let token = SessionToken::generate();
        self.lock().insert(token, user_id);
        debug!("event=session_open module=identity status=ok");
        token
    }

    fn close_session(&self, token: &SessionToken) {
        if self.lock().remove(token).is_some() {
            debug!("event=session_close module=identity status=ok");
        }
    }

    fn close_user_sessions(&self, user_id: UserId) {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, owner| *owner != user_id);
        debug!(
            "event=session_close module=identity status=ok closed={}",
            before - sessions.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Actor, IdentityProvider, SessionRegistry, SessionToken};
    use uuid::Uuid;

    #[test]
    fn open_resolve_close_roundtrip() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        let token = registry.open_session(user_id);
        assert_eq!(registry.resolve(&token), Actor::User(user_id));

        registry.close_session(&token);
        registry.close_session(&token);
        assert_eq!(registry.resolve(&token), Actor::Anonymous);
        assert!(registry.is_empty());
    }

    #[test]
    fn closing_user_sessions_leaves_others_open() {
        let registry = SessionRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let alice_phone = registry.open_session(alice);
        let alice_laptop = registry.open_session(alice);
        let bob_token = registry.open_session(bob);

        registry.close_user_sessions(alice);

        assert_eq!(registry.resolve(&alice_phone), Actor::Anonymous);
        assert_eq!(registry.resolve(&alice_laptop), Actor::Anonymous);
        assert_eq!(registry.resolve(&bob_token), Actor::User(bob));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn token_parse_rejects_garbage() {
        assert!(SessionToken::parse("not-a-token").is_none());
        let token = SessionRegistry::new().open_session(Uuid::new_v4());
        assert_eq!(SessionToken::parse(&token.to_string()), Some(token));
    }
}
