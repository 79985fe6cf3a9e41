//! Repository layer: SQL persistence for users, lists, items and helper links.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Keep SQLite query details out of service orchestration.
//! - Run every cascade explicitly inside one `IMMEDIATE` transaction.
//!
//! # Invariants
//! - Lookups return `Option`; mutations of missing rows return `NotFound`
//!   variants instead of panicking.
//! - Repositories make no authorization decisions.

pub mod list_repo;
pub mod user_repo;

use crate::db::migrations::latest_version;
use rusqlite::Connection;
use user_repo::{RepoError, RepoResult};
use uuid::Uuid;

/// Verifies that `conn` is migrated and carries every table in `tables`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

/// Row counts per table, for operator diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: u64,
    pub lists: u64,
    pub items: u64,
    pub helper_links: u64,
}

/// Counts rows in every application table.
pub fn table_counts(conn: &Connection) -> RepoResult<TableCounts> {
    ensure_connection_ready(conn, &["users", "lists", "items", "helper_links"])?;
    let count = |table: &str| -> RepoResult<u64> {
        let value: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })?;
        u64::try_from(value)
            .map_err(|_| RepoError::InvalidData(format!("negative row count in {table}")))
    };

    Ok(TableCounts {
        users: count("users")?,
        lists: count("lists")?,
        items: count("items")?,
        helper_links: count("helper_links")?,
    })
}
