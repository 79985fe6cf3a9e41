//! List, item and helper-link repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist lists, their ordered items and the helper join table.
//! - Run the list delete cascade as one explicit transaction.
//!
//! # Invariants
//! - Items are returned in insertion order (`position ASC`).
//! - `(list_id, user_id)` is unique in `helper_links`; the author can never be
//!   linked as a helper (enforced by a schema trigger).
//! - Item inserts re-check the parent list inside the write transaction, so a
//!   concurrently deleted list yields `ListNotFound`, never an orphan row.

use crate::model::list::{Item, ItemId, ListDeletion, ListId, TodoList};
use crate::model::user::{User, UserId};
use crate::repo::user_repo::{read_user_columns, RepoError, RepoResult};
use crate::repo::{ensure_connection_ready, parse_uuid};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const LIST_SELECT_SQL: &str = "SELECT
    l.id AS id,
    l.name AS name,
    l.author_id AS author_id,
    l.date_created AS date_created
FROM lists l";

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    list_id,
    content,
    date_added,
    position
FROM items";

/// Repository interface for lists and their dependents.
pub trait ListRepository {
    /// Creates an empty list authored by `author_id`.
    fn create_list(&self, author_id: UserId, name: &str) -> RepoResult<TodoList>;
    /// Loads one list with its helper set.
    fn get_list(&self, id: ListId) -> RepoResult<Option<TodoList>>;
    /// Lists authored by `user_id`, oldest first.
    fn list_owned(&self, user_id: UserId) -> RepoResult<Vec<TodoList>>;
    /// Lists on which `user_id` is a helper, oldest first.
    fn list_shared_with(&self, user_id: UserId) -> RepoResult<Vec<TodoList>>;
    /// Items of one list in insertion order.
    fn list_items(&self, list_id: ListId) -> RepoResult<Vec<Item>>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Appends an item; fails `ListNotFound` if the list is gone.
    fn add_item(&self, list_id: ListId, content: &str) -> RepoResult<Item>;
    /// Deletes an item that belongs to `list_id`.
    fn delete_item(&self, list_id: ListId, item_id: ItemId) -> RepoResult<()>;
    /// Helper users of one list in the order they were added.
    fn list_helpers(&self, list_id: ListId) -> RepoResult<Vec<User>>;
    /// Links a helper. Returns `false` when the link already existed.
    fn insert_helper_link(&self, list_id: ListId, user_id: UserId) -> RepoResult<bool>;
    /// Unlinks a helper. Returns `false` when no such link existed.
    fn delete_helper_link(&self, list_id: ListId, user_id: UserId) -> RepoResult<bool>;
    /// Deletes items, helper links and the list itself in one transaction.
    fn delete_list(&self, list_id: ListId) -> RepoResult<ListDeletion>;
}

/// SQLite-backed list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "lists", "items", "helper_links"])?;
        Ok(Self { conn })
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, author_id: UserId, name: &str) -> RepoResult<TodoList> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO lists (id, name, author_id) VALUES (?1, ?2, ?3);",
            params![id.to_string(), name, author_id.to_string()],
        )?;
        load_list(self.conn, id)?.ok_or(RepoError::ListNotFound(id))
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<TodoList>> {
        load_list(self.conn, id)
    }

    fn list_owned(&self, user_id: UserId) -> RepoResult<Vec<TodoList>> {
        query_lists(
            self.conn,
            &format!(
                "{LIST_SELECT_SQL}
                 WHERE l.author_id = ?1
                 ORDER BY l.created_at ASC, l.rowid ASC;"
            ),
            user_id,
        )
    }

    fn list_shared_with(&self, user_id: UserId) -> RepoResult<Vec<TodoList>> {
        query_lists(
            self.conn,
            &format!(
                "{LIST_SELECT_SQL}
                 INNER JOIN helper_links h ON h.list_id = l.id
                 WHERE h.user_id = ?1
                 ORDER BY l.created_at ASC, l.rowid ASC;"
            ),
            user_id,
        )
    }

    fn list_items(&self, list_id: ListId) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE list_id = ?1
             ORDER BY position ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        load_item(self.conn, id)
    }

    fn add_item(&self, list_id: ListId, content: &str) -> RepoResult<Item> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !list_exists(&tx, list_id)? {
            return Err(RepoError::ListNotFound(list_id));
        }

        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1
             FROM items
             WHERE list_id = ?1;",
            [list_id.to_string()],
            |row| row.get(0),
        )?;
        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO items (id, list_id, content, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), list_id.to_string(), content, position],
        )?;
        let item = load_item(&tx, id)?.ok_or(RepoError::ItemNotFound(id))?;

        tx.commit()?;
        Ok(item)
    }

    fn delete_item(&self, list_id: ListId, item_id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM items WHERE id = ?1 AND list_id = ?2;",
            params![item_id.to_string(), list_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::ItemNotFound(item_id));
        }
        Ok(())
    }

    fn list_helpers(&self, list_id: ListId) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id AS id, u.name AS name, u.email AS email
             FROM helper_links h
             INNER JOIN users u ON u.id = h.user_id
             WHERE h.list_id = ?1
             ORDER BY h.linked_at ASC, h.rowid ASC;",
        )?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut helpers = Vec::new();
        while let Some(row) = rows.next()? {
            helpers.push(read_user_columns(row)?);
        }
        Ok(helpers)
    }

    fn insert_helper_link(&self, list_id: ListId, user_id: UserId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !list_exists(&tx, list_id)? {
            return Err(RepoError::ListNotFound(list_id));
        }
        let user_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        if user_exists != 1 {
            return Err(RepoError::UserNotFound(user_id));
        }

        let changed = tx.execute(
            "INSERT OR IGNORE INTO helper_links (list_id, user_id) VALUES (?1, ?2);",
            params![list_id.to_string(), user_id.to_string()],
        )?;

        tx.commit()?;
        Ok(changed == 1)
    }

    fn delete_helper_link(&self, list_id: ListId, user_id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM helper_links WHERE list_id = ?1 AND user_id = ?2;",
            params![list_id.to_string(), user_id.to_string()],
        )?;
        Ok(changed == 1)
    }

    fn delete_list(&self, list_id: ListId) -> RepoResult<ListDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !list_exists(&tx, list_id)? {
            return Err(RepoError::ListNotFound(list_id));
        }

        let id = list_id.to_string();
        let items_removed = tx.execute("DELETE FROM items WHERE list_id = ?1;", [&id])?;
        let helper_links_removed =
            tx.execute("DELETE FROM helper_links WHERE list_id = ?1;", [&id])?;
        tx.execute("DELETE FROM lists WHERE id = ?1;", [&id])?;

        tx.commit()?;
        Ok(ListDeletion {
            items_removed,
            helper_links_removed,
        })
    }
}

fn list_exists(conn: &Connection, list_id: ListId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?1);",
        [list_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_list(conn: &Connection, id: ListId) -> RepoResult<Option<TodoList>> {
    let mut stmt = conn.prepare(&format!("{LIST_SELECT_SQL} WHERE l.id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        let mut list = parse_list_row(row)?;
        list.helper_ids = load_helper_ids(conn, list.id)?;
        return Ok(Some(list));
    }
    Ok(None)
}

fn query_lists(conn: &Connection, sql: &str, user_id: UserId) -> RepoResult<Vec<TodoList>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([user_id.to_string()])?;
    let mut lists = Vec::new();
    while let Some(row) = rows.next()? {
        lists.push(parse_list_row(row)?);
    }
    for list in &mut lists {
        list.helper_ids = load_helper_ids(conn, list.id)?;
    }
    Ok(lists)
}

fn load_helper_ids(conn: &Connection, list_id: ListId) -> RepoResult<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id
         FROM helper_links
         WHERE list_id = ?1
         ORDER BY linked_at ASC, rowid ASC;",
    )?;
    let mut rows = stmt.query([list_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "helper_links.user_id")?);
    }
    Ok(ids)
}

fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_item_row(row)?));
    }
    Ok(None)
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<TodoList> {
    let id_text: String = row.get("id")?;
    let author_text: String = row.get("author_id")?;
    Ok(TodoList {
        id: parse_uuid(&id_text, "lists.id")?,
        name: row.get("name")?,
        author_id: parse_uuid(&author_text, "lists.author_id")?,
        date_created: row.get("date_created")?,
        helper_ids: Vec::new(),
    })
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let list_text: String = row.get("list_id")?;
    Ok(Item {
        id: parse_uuid(&id_text, "items.id")?,
        list_id: parse_uuid(&list_text, "items.list_id")?,
        content: row.get("content")?,
        date_added: row.get("date_added")?,
        position: row.get("position")?,
    })
}
