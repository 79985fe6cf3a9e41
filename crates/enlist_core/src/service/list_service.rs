//! List and item lifecycle use-cases.
//!
//! # Responsibility
//! - Create, view and delete lists; add and delete items.
//! - Enforce access control before any repository mutation.
//!
//! # Invariants
//! - Every list-scoped operation loads the list first and fails
//!   `ListNotFound` before authorizing.
//! - Items are never edited in place; only added or deleted.
//! - List deletion cascades to items and helper links atomically.

use crate::access::{authorize, AccessDenied, ListAction, Permission};
use crate::identity::Actor;
use crate::model::list::{Item, ItemId, ListDeletion, ListId, ListOverview, ListView, TodoList};
use crate::model::user::UserId;
use crate::model::validation::{normalize_content, normalize_name, ValidationError};
use crate::repo::list_repo::ListRepository;
use crate::repo::user_repo::RepoError;
use crate::service::require_user;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from list lifecycle operations.
#[derive(Debug)]
pub enum ListError {
    /// No authenticated user behind the request.
    Unauthenticated,
    /// Malformed list name or item content.
    Validation(ValidationError),
    ListNotFound(ListId),
    /// Item is missing or belongs to another list.
    ItemNotFound(ItemId),
    AccessDenied(AccessDenied),
    /// Storage-level failure.
    Repo(RepoError),
}

impl ListError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Validation(_) => "validation_error",
            Self::ListNotFound(_) | Self::ItemNotFound(_) => "not_found",
            Self::AccessDenied(_) => "access_denied",
            Self::Repo(_) => "storage_error",
        }
    }

    /// HTTP-equivalent status for transport adapters.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Validation(_) => 400,
            Self::ListNotFound(_) | Self::ItemNotFound(_) => 404,
            Self::AccessDenied(_) => 403,
            Self::Repo(_) => 500,
        }
    }
}

impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "login required"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::AccessDenied(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::AccessDenied(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ListError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ListNotFound(id) => Self::ListNotFound(id),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ListError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AccessDenied> for ListError {
    fn from(value: AccessDenied) -> Self {
        Self::AccessDenied(value)
    }
}

/// List lifecycle service over a list repository.
pub struct ListService<R: ListRepository> {
    repo: R,
}

impl<R: ListRepository> ListService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an empty list owned by the acting user.
    pub fn create_list(&self, actor: Actor, name: &str) -> Result<TodoList, ListError> {
        let user_id = require_user(actor).ok_or(ListError::Unauthenticated)?;
        let name = normalize_name(name)?;
        let list = self.repo.create_list(user_id, &name).inspect_err(|err| {
            error!("event=list_create module=service status=error error={err}");
        })?;
        info!(
            "event=list_create module=service status=ok list_id={}",
            list.id
        );
        Ok(list)
    }

    /// Lists the actor owns and the lists the actor helps on.
    pub fn my_lists(&self, actor: Actor) -> Result<ListOverview, ListError> {
        let user_id = require_user(actor).ok_or(ListError::Unauthenticated)?;
        Ok(ListOverview {
            owned: self.repo.list_owned(user_id)?,
            shared: self.repo.list_shared_with(user_id)?,
        })
    }

    /// Opens one list with its items and helpers.
    pub fn view_list(&self, actor: Actor, list_id: ListId) -> Result<ListView, ListError> {
        let (user_id, list) = self.load_list(actor, list_id)?;
        let permission = self.authorize(user_id, &list, ListAction::View)?;
        Ok(ListView {
            items: self.repo.list_items(list.id)?,
            helpers: self.repo.list_helpers(list.id)?,
            list,
            permission,
        })
    }

    /// Appends an item. Owner and helpers only.
    pub fn add_item(
        &self,
        actor: Actor,
        list_id: ListId,
        content: &str,
    ) -> Result<Item, ListError> {
        let (user_id, list) = self.load_list(actor, list_id)?;
        self.authorize(user_id, &list, ListAction::EditItems)?;
        let content = normalize_content(content)?;

        let item = self.repo.add_item(list.id, &content)?;
        info!(
            "event=item_add module=service status=ok list_id={} item_id={}",
            list.id, item.id
        );
        Ok(item)
    }

    /// Deletes one item of the list. Owner and helpers only.
    pub fn delete_item(
        &self,
        actor: Actor,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<(), ListError> {
        let (user_id, list) = self.load_list(actor, list_id)?;
        self.authorize(user_id, &list, ListAction::EditItems)?;

        self.repo.delete_item(list.id, item_id)?;
        info!(
            "event=item_delete module=service status=ok list_id={} item_id={}",
            list.id, item_id
        );
        Ok(())
    }

    /// Deletes a list with all its items and helper links. Owner only.
    pub fn delete_list(&self, actor: Actor, list_id: ListId) -> Result<ListDeletion, ListError> {
        let (user_id, list) = self.load_list(actor, list_id)?;
        self.authorize(user_id, &list, ListAction::DeleteList)?;

        let deletion = self.repo.delete_list(list.id).inspect_err(|err| {
            error!(
                "event=list_delete module=service status=error list_id={} error={err}",
                list.id
            );
        })?;
        info!(
            "event=list_delete module=service status=ok list_id={} items_removed={} helper_links_removed={}",
            list.id, deletion.items_removed, deletion.helper_links_removed
        );
        Ok(deletion)
    }

    fn load_list(&self, actor: Actor, list_id: ListId) -> Result<(UserId, TodoList), ListError> {
        let user_id = require_user(actor).ok_or(ListError::Unauthenticated)?;
        let list = self
            .repo
            .get_list(list_id)?
            .ok_or(ListError::ListNotFound(list_id))?;
        Ok((user_id, list))
    }

    fn authorize(
        &self,
        user_id: UserId,
        list: &TodoList,
        action: ListAction,
    ) -> Result<Permission, ListError> {
        authorize(user_id, list, action).map_err(|denied| {
            warn!(
                "event=access_denied module=service status=denied action={} list_id={}",
                action.as_str(),
                list.id
            );
            ListError::AccessDenied(denied)
        })
    }
}
