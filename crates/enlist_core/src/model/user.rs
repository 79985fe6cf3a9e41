//! User identity records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
pub type UserId = Uuid;

/// Registered user as seen by the rest of the core.
///
/// The password hash never leaves the repository/credential boundary; see
/// [`StoredCredential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Normalized (trimmed, lowercase) address. Unique across users.
    pub email: String,
}

/// Insert model for a new user. Fields are expected to be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

/// Credential row used only by authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub user_id: UserId,
    pub password_hash: String,
}
