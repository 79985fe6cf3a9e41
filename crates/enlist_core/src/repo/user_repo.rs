//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist users and their credential hashes.
//! - Delete a user together with everything that cannot outlive them.
//!
//! # Invariants
//! - Emails are stored normalized and unique (case-insensitive).
//! - Deleting a user removes owned lists (with items and helper links) and
//!   every helper link naming the user, atomically.

use crate::db::DbError;
use crate::model::list::{ItemId, ListId};
use crate::model::user::{NewUser, StoredCredential, User, UserId};
use crate::repo::{ensure_connection_ready, parse_uuid};
use rusqlite::{
    ffi, params, Connection, ErrorCode, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by user and list persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap failure.
    Db(DbError),
    UserNotFound(UserId),
    ListNotFound(ListId),
    ItemNotFound(ItemId),
    /// Another user already registered this email.
    DuplicateEmail(String),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::DuplicateEmail(email) => write!(f, "email already registered: {email}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts a user. Fails with `DuplicateEmail` when the email is taken.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Looks up a user by normalized email.
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Loads the credential hash for a normalized email.
    fn get_credential(&self, email: &str) -> RepoResult<Option<StoredCredential>>;
    /// Deletes a user with the ownership and helper cascades.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "lists", "items", "helper_links"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let id = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                user.name.as_str(),
                user.email.as_str(),
                user.password_hash.as_str(),
            ],
        );

        match inserted {
            Ok(_) => Ok(User {
                id,
                name: user.name.clone(),
                email: user.email.clone(),
            }),
            // `users.email` is the only UNIQUE column; other constraint
            // failures stay storage errors.
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(RepoError::DuplicateEmail(user.email.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name, email FROM users WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(read_user_columns(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name, email FROM users WHERE email = ?1;",
                [email],
                |row| Ok(read_user_columns(row)),
            )
            .optional()?
            .transpose()
    }

    fn get_credential(&self, email: &str) -> RepoResult<Option<StoredCredential>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1;",
                [email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(id, password_hash)| {
            Ok(StoredCredential {
                user_id: parse_uuid(&id, "users.id")?,
                password_hash,
            })
        })
        .transpose()
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let user_id = id.to_string();

        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [&user_id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::UserNotFound(id));
        }

        tx.execute(
            "DELETE FROM items
             WHERE list_id IN (SELECT id FROM lists WHERE author_id = ?1);",
            [&user_id],
        )?;
        tx.execute(
            "DELETE FROM helper_links
             WHERE list_id IN (SELECT id FROM lists WHERE author_id = ?1)
                OR user_id = ?1;",
            [&user_id],
        )?;
        tx.execute("DELETE FROM lists WHERE author_id = ?1;", [&user_id])?;
        tx.execute("DELETE FROM users WHERE id = ?1;", [&user_id])?;

        tx.commit()?;
        Ok(())
    }
}

/// Reads `id, name, email` columns into a `User`.
///
/// Returns a nested result so `query_row` closures can defer uuid parsing
/// errors to the repository error type.
pub(crate) fn read_user_columns(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    })
}
