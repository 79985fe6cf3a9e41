//! Request-level facade over the core services.
//!
//! # Responsibility
//! - Bind one connection and one identity provider into the full operation
//!   set, keyed by session token.
//! - Resolve the acting identity once per operation, then delegate.
//!
//! Constructed explicitly per caller; there is no process-wide instance.

use crate::identity::{Actor, IdentityProvider, SessionToken};
use crate::model::list::{Item, ItemId, ListDeletion, ListId, ListOverview, ListView, TodoList};
use crate::model::user::{User, UserId};
use crate::repo::list_repo::SqliteListRepository;
use crate::repo::user_repo::{RepoResult, SqliteUserRepository};
use crate::service::account_service::{AccountError, AccountService, Session};
use crate::service::list_service::{ListError, ListService};
use crate::service::sharing_service::{SharingError, SharingService};
use rusqlite::Connection;

/// All enlist operations over one SQLite connection.
pub struct EnlistApp<'a, I: IdentityProvider> {
    identity: &'a I,
    accounts: AccountService<SqliteUserRepository<'a>, &'a I>,
    lists: ListService<SqliteListRepository<'a>>,
    sharing: SharingService<SqliteListRepository<'a>, SqliteUserRepository<'a>>,
}

impl<'a, I: IdentityProvider> EnlistApp<'a, I> {
    /// Wires services over a migrated connection.
    pub fn try_new(conn: &'a Connection, identity: &'a I) -> RepoResult<Self> {
        Ok(Self {
            identity,
            accounts: AccountService::new(SqliteUserRepository::try_new(conn)?, identity),
            lists: ListService::new(SqliteListRepository::try_new(conn)?),
            sharing: SharingService::new(
                SqliteListRepository::try_new(conn)?,
                SqliteUserRepository::try_new(conn)?,
            ),
        })
    }

    /// Resolves the identity behind `token`.
    pub fn actor(&self, token: &SessionToken) -> Actor {
        self.identity.resolve(token)
    }

    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AccountError> {
        self.accounts.register(name, email, password)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        self.accounts.authenticate(email, password)
    }

    pub fn logout(&self, token: &SessionToken) {
        self.accounts.logout(token)
    }

    pub fn current_user(&self, token: &SessionToken) -> Result<Option<User>, AccountError> {
        self.accounts.current_user(token)
    }

    pub fn delete_account(&self, token: &SessionToken) -> Result<(), AccountError> {
        self.accounts.delete_account(self.actor(token))
    }

    pub fn create_list(&self, token: &SessionToken, name: &str) -> Result<TodoList, ListError> {
        self.lists.create_list(self.actor(token), name)
    }

    pub fn my_lists(&self, token: &SessionToken) -> Result<ListOverview, ListError> {
        self.lists.my_lists(self.actor(token))
    }

    pub fn view_list(&self, token: &SessionToken, list_id: ListId) -> Result<ListView, ListError> {
        self.lists.view_list(self.actor(token), list_id)
    }

    pub fn add_item(
        &self,
        token: &SessionToken,
        list_id: ListId,
        content: &str,
    ) -> Result<Item, ListError> {
        self.lists.add_item(self.actor(token), list_id, content)
    }

    pub fn delete_item(
        &self,
        token: &SessionToken,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<(), ListError> {
        self.lists.delete_item(self.actor(token), list_id, item_id)
    }

    pub fn delete_list(
        &self,
        token: &SessionToken,
        list_id: ListId,
    ) -> Result<ListDeletion, ListError> {
        self.lists.delete_list(self.actor(token), list_id)
    }

    pub fn add_helper(
        &self,
        token: &SessionToken,
        list_id: ListId,
        email: &str,
    ) -> Result<User, SharingError> {
        self.sharing.add_helper(self.actor(token), list_id, email)
    }

    pub fn remove_helper(
        &self,
        token: &SessionToken,
        list_id: ListId,
        user_id: UserId,
    ) -> Result<(), SharingError> {
        self.sharing.remove_helper(self.actor(token), list_id, user_id)
    }

    pub fn list_helpers(
        &self,
        token: &SessionToken,
        list_id: ListId,
    ) -> Result<Vec<User>, SharingError> {
        self.sharing.list_helpers(self.actor(token), list_id)
    }
}
