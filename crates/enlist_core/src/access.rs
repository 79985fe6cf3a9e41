//! Identity-based access control for lists.
//!
//! # Responsibility
//! - Classify an actor's relation to a list as `Owner`, `Helper` or `None`.
//! - Map each protected list action to the permission levels allowed to
//!   perform it.
//!
//! # Invariants
//! - Decisions depend only on `author_id` and `helper_ids`, never on list
//!   content.
//! - Decision functions are pure; callers surface `AccessDenied`.

use crate::model::list::TodoList;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tri-state relation between a user and a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Owner,
    Helper,
    None,
}

/// Protected operation on a list, used for authorization and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListAction {
    View,
    EditItems,
    ManageSharing,
    DeleteList,
}

impl ListAction {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::EditItems => "edit_items",
            Self::ManageSharing => "manage_sharing",
            Self::DeleteList => "delete_list",
        }
    }

    /// Returns whether `permission` is sufficient for this action.
    pub fn allowed_for(self, permission: Permission) -> bool {
        match self {
            Self::View | Self::EditItems => permission != Permission::None,
            Self::ManageSharing | Self::DeleteList => permission == Permission::Owner,
        }
    }
}

/// Actor lacks the permission an action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub action: ListAction,
    pub permission: Permission,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "access denied: cannot {} this list", self.action.as_str())
    }
}

impl Error for AccessDenied {}

/// Classifies `actor`'s permission level on `list`.
pub fn permission(actor: UserId, list: &TodoList) -> Permission {
    if actor == list.author_id {
        Permission::Owner
    } else if list.has_helper(actor) {
        Permission::Helper
    } else {
        Permission::None
    }
}

pub fn can_view(actor: UserId, list: &TodoList) -> bool {
    ListAction::View.allowed_for(permission(actor, list))
}

/// Owners and helpers may both add and delete items.
pub fn can_edit_items(actor: UserId, list: &TodoList) -> bool {
    ListAction::EditItems.allowed_for(permission(actor, list))
}

pub fn can_manage_sharing(actor: UserId, list: &TodoList) -> bool {
    ListAction::ManageSharing.allowed_for(permission(actor, list))
}

pub fn can_delete_list(actor: UserId, list: &TodoList) -> bool {
    ListAction::DeleteList.allowed_for(permission(actor, list))
}

/// Checks `action` for `actor`, returning the permission level on success.
pub fn authorize(
    actor: UserId,
    list: &TodoList,
    action: ListAction,
) -> Result<Permission, AccessDenied> {
    let permission = permission(actor, list);
    if action.allowed_for(permission) {
        Ok(permission)
    } else {
        Err(AccessDenied { action, permission })
    }
}
