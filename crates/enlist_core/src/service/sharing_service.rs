//! Helper-set management for lists.
//!
//! # Responsibility
//! - Grant and revoke helper access on behalf of a list's owner.
//! - Report sharing outcomes (`UnknownUser`, `AlreadyPermitted`, `NotAHelper`)
//!   as values the caller can show as a notice.
//!
//! # Invariants
//! - Only the owner manages helpers.
//! - The helper set stays duplicate-free and never contains the owner.
//! - Rejected sharing requests leave storage untouched.

use crate::access::{authorize, AccessDenied, ListAction};
use crate::identity::Actor;
use crate::model::list::{ListId, TodoList};
use crate::model::user::{User, UserId};
use crate::model::validation::{normalize_email, ValidationError};
use crate::repo::list_repo::ListRepository;
use crate::repo::user_repo::{RepoError, UserRepository};
use crate::service::require_user;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from helper management.
#[derive(Debug)]
pub enum SharingError {
    Unauthenticated,
    /// Candidate email is malformed.
    Validation(ValidationError),
    ListNotFound(ListId),
    AccessDenied(AccessDenied),
    /// No registered user has this email.
    UnknownUser(String),
    /// Candidate is already a helper, or is the owner.
    AlreadyPermitted,
    /// Target user is not currently a helper of the list.
    NotAHelper(UserId),
    Repo(RepoError),
}

impl SharingError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Validation(_) => "validation_error",
            Self::ListNotFound(_) => "not_found",
            Self::AccessDenied(_) => "access_denied",
            Self::UnknownUser(_) => "unknown_user",
            Self::AlreadyPermitted => "already_permitted",
            Self::NotAHelper(_) => "not_a_helper",
            Self::Repo(_) => "storage_error",
        }
    }

    /// HTTP-equivalent status for transport adapters.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Validation(_) => 400,
            Self::ListNotFound(_) | Self::UnknownUser(_) => 404,
            Self::AccessDenied(_) => 403,
            Self::AlreadyPermitted | Self::NotAHelper(_) => 409,
            Self::Repo(_) => 500,
        }
    }
}

impl Display for SharingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "login required"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::AccessDenied(err) => write!(f, "{err}"),
            Self::UnknownUser(email) => write!(f, "no user registered with email `{email}`"),
            Self::AlreadyPermitted => write!(f, "that user can already edit this list"),
            Self::NotAHelper(id) => write!(f, "user {id} is not a helper of this list"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SharingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::AccessDenied(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SharingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ListNotFound(id) => Self::ListNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Sharing registry over list and user repositories.
pub struct SharingService<L: ListRepository, U: UserRepository> {
    lists: L,
    users: U,
}

impl<L: ListRepository, U: UserRepository> SharingService<L, U> {
    pub fn new(lists: L, users: U) -> Self {
        Self { lists, users }
    }

    /// Grants the user registered under `candidate_email` helper access.
    ///
    /// Returns the newly added helper.
    pub fn add_helper(
        &self,
        actor: Actor,
        list_id: ListId,
        candidate_email: &str,
    ) -> Result<User, SharingError> {
        let user_id = require_user(actor).ok_or(SharingError::Unauthenticated)?;
        let list = self.load_owned_list(user_id, list_id)?;
        let email = normalize_email(candidate_email).map_err(SharingError::Validation)?;

        let candidate = self
            .users
            .find_user_by_email(&email)?
            .ok_or_else(|| SharingError::UnknownUser(email.clone()))?;
        if candidate.id == list.author_id || list.has_helper(candidate.id) {
            return Err(SharingError::AlreadyPermitted);
        }

        let inserted = match self.lists.insert_helper_link(list.id, candidate.id) {
            Ok(inserted) => inserted,
            Err(RepoError::UserNotFound(_)) => return Err(SharingError::UnknownUser(email)),
            Err(err) => return Err(err.into()),
        };
        if !inserted {
            return Err(SharingError::AlreadyPermitted);
        }

        info!(
            "event=helper_add module=service status=ok list_id={} user_id={}",
            list.id, candidate.id
        );
        Ok(candidate)
    }

    /// Revokes helper access from `helper_id`.
    pub fn remove_helper(
        &self,
        actor: Actor,
        list_id: ListId,
        helper_id: UserId,
    ) -> Result<(), SharingError> {
        let user_id = require_user(actor).ok_or(SharingError::Unauthenticated)?;
        let list = self.load_owned_list(user_id, list_id)?;
        if !list.has_helper(helper_id) {
            return Err(SharingError::NotAHelper(helper_id));
        }
        if !self.lists.delete_helper_link(list.id, helper_id)? {
            return Err(SharingError::NotAHelper(helper_id));
        }

        info!(
            "event=helper_remove module=service status=ok list_id={} user_id={}",
            list.id, helper_id
        );
        Ok(())
    }

    /// Current helpers of a list, for the owner's sharing page.
    pub fn list_helpers(&self, actor: Actor, list_id: ListId) -> Result<Vec<User>, SharingError> {
        let user_id = require_user(actor).ok_or(SharingError::Unauthenticated)?;
        let list = self.load_owned_list(user_id, list_id)?;
        Ok(self.lists.list_helpers(list.id)?)
    }

    fn load_owned_list(&self, user_id: UserId, list_id: ListId) -> Result<TodoList, SharingError> {
        let list = self
            .lists
            .get_list(list_id)?
            .ok_or(SharingError::ListNotFound(list_id))?;
        authorize(user_id, &list, ListAction::ManageSharing).map_err(|denied| {
            warn!(
                "event=access_denied module=service status=denied action={} list_id={}",
                ListAction::ManageSharing.as_str(),
                list.id
            );
            SharingError::AccessDenied(denied)
        })?;
        Ok(list)
    }
}
