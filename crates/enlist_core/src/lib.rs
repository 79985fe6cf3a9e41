//! Core of enlist, a collaborative to-do list manager.
//!
//! Users own lists, grant other users helper access, and owners or helpers
//! add and delete items. This crate holds the access-control rules, the
//! sharing registry, and the list/item lifecycle with its cascades, over
//! SQLite storage.

pub mod access;
pub mod config;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{authorize, permission, AccessDenied, ListAction, Permission};
pub use config::{default_log_level, ConfigError, CoreConfig};
pub use identity::{Actor, IdentityProvider, SessionRegistry, SessionToken};
pub use logging::{init_logging, init_logging_from_config, logging_status, LoggingError};
pub use model::list::{Item, ItemId, ListDeletion, ListId, ListOverview, ListView, TodoList};
pub use model::user::{User, UserId};
pub use model::validation::ValidationError;
pub use repo::list_repo::{ListRepository, SqliteListRepository};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use repo::{table_counts, TableCounts};
pub use service::account_service::{AccountError, AccountService, Session};
pub use service::app::EnlistApp;
pub use service::list_service::{ListError, ListService};
pub use service::sharing_service::{SharingError, SharingService};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
