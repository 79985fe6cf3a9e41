//! To-do list and item records.
//!
//! # Invariants
//! - `helper_ids` is duplicate-free and never contains `author_id`.
//! - `Item::list_id` always names an existing list.

use crate::access::Permission;
use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable list identifier.
pub type ListId = Uuid;

/// Stable item identifier.
pub type ItemId = Uuid;

/// A to-do list together with its helper set.
///
/// Helpers are loaded with the list so access decisions can be made from the
/// record alone, without another storage round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: ListId,
    pub name: String,
    pub author_id: UserId,
    /// Local date the list was created, `DD-MM-YYYY`.
    pub date_created: String,
    /// Users granted edit access to items, in the order they were added.
    pub helper_ids: Vec<UserId>,
}

impl TodoList {
    /// Returns whether `user_id` is a current helper of this list.
    pub fn has_helper(&self, user_id: UserId) -> bool {
        self.helper_ids.contains(&user_id)
    }
}

/// One entry of a list. Items are added and deleted, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub content: String,
    /// Local date the item was added, `DD-MM-YYYY`.
    pub date_added: String,
    /// Insertion order within the list, starting at 0.
    pub position: i64,
}

/// Everything a permitted actor sees when opening a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub list: TodoList,
    pub items: Vec<Item>,
    pub helpers: Vec<User>,
    /// The viewing actor's permission level on `list`.
    pub permission: Permission,
}

/// Lists visible to one user, split by relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListOverview {
    /// Lists the user authored.
    pub owned: Vec<TodoList>,
    /// Lists the user helps on.
    pub shared: Vec<TodoList>,
}

/// Rows removed by a cascading list delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListDeletion {
    pub items_removed: usize,
    pub helper_links_removed: usize,
}
