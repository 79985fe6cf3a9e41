//! Account registration, login and removal.
//!
//! # Responsibility
//! - Register users with hashed passwords and open their first session.
//! - Authenticate by email and password.
//! - Delete an account with the ownership and helper cascades.
//!
//! # Invariants
//! - Plaintext passwords never reach storage or logs.
//! - Unknown email and wrong password are indistinguishable to callers.

use crate::identity::password::{
    hash_password, verify_against_placeholder, verify_password, CredentialError,
};
use crate::identity::{Actor, IdentityProvider, SessionToken};
use crate::model::user::{NewUser, User};
use crate::model::validation::{
    normalize_email, normalize_name, validate_password, ValidationError,
};
use crate::repo::user_repo::{RepoError, UserRepository};
use crate::service::require_user;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from account operations.
#[derive(Debug)]
pub enum AccountError {
    Validation(ValidationError),
    /// Email already registered; the caller should offer login instead.
    DuplicateEmail(String),
    InvalidCredentials,
    Unauthenticated,
    Credential(CredentialError),
    Repo(RepoError),
}

impl AccountError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateEmail(_) => "duplicate_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthenticated => "unauthenticated",
            Self::Credential(_) | Self::Repo(_) => "storage_error",
        }
    }

    /// HTTP-equivalent status for transport adapters.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::DuplicateEmail(_) => 409,
            Self::InvalidCredentials | Self::Unauthenticated => 401,
            Self::Credential(_) | Self::Repo(_) => 500,
        }
    }
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateEmail(email) => write!(f, "email already registered: {email}"),
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::Unauthenticated => write!(f, "login required"),
            Self::Credential(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Credential(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            RepoError::UserNotFound(_) => Self::Unauthenticated,
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for AccountError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CredentialError> for AccountError {
    fn from(value: CredentialError) -> Self {
        Self::Credential(value)
    }
}

/// An authenticated session and the user behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user: User,
}

/// Account service over a user repository and an identity provider.
pub struct AccountService<R: UserRepository, I: IdentityProvider> {
    repo: R,
    identity: I,
}

impl<R: UserRepository, I: IdentityProvider> AccountService<R, I> {
    pub fn new(repo: R, identity: I) -> Self {
        Self { repo, identity }
    }

    /// Registers a user and logs them in.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AccountError> {
        let name = normalize_name(name)?;
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.repo.find_user_by_email(&email)?.is_some() {
            return Err(AccountError::DuplicateEmail(email));
        }

        let password_hash = hash_password(password).inspect_err(|err| {
            error!("event=account_register module=service status=error error={err}");
        })?;
        let user = self.repo.create_user(&NewUser {
            name,
            email,
            password_hash,
        })?;

        info!(
            "event=account_register module=service status=ok user_id={}",
            user.id
        );
        Ok(self.open_session(user))
    }

    /// Logs a user in by email and password.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let email = normalize_email(email)?;
        let Some(credential) = self.repo.get_credential(&email)? else {
            verify_against_placeholder(password);
            warn!("event=account_login module=service status=denied reason=unknown_email");
            return Err(AccountError::InvalidCredentials);
        };
        if !verify_password(password, &credential.password_hash)? {
            warn!(
                "event=account_login module=service status=denied reason=wrong_password user_id={}",
                credential.user_id
            );
            return Err(AccountError::InvalidCredentials);
        }

        let user = self
            .repo
            .get_user(credential.user_id)?
            .ok_or(AccountError::InvalidCredentials)?;
        info!(
            "event=account_login module=service status=ok user_id={}",
            user.id
        );
        Ok(self.open_session(user))
    }

    /// Ends the session behind `token`. Idempotent.
    pub fn logout(&self, token: &SessionToken) {
        self.identity.close_session(token);
    }

    /// Resolves a session to its user; `None` for anonymous sessions.
    pub fn current_user(&self, token: &SessionToken) -> Result<Option<User>, AccountError> {
        match self.identity.resolve(token) {
            Actor::Anonymous => Ok(None),
            Actor::User(user_id) => Ok(self.repo.get_user(user_id)?),
        }
    }

    /// Deletes the acting user, their lists, and every helper link naming them.
    pub fn delete_account(&self, actor: Actor) -> Result<(), AccountError> {
        let user_id = require_user(actor).ok_or(AccountError::Unauthenticated)?;
        self.repo.delete_user(user_id)?;
        self.identity.close_user_sessions(user_id);
        info!("event=account_delete module=service status=ok user_id={user_id}");
        Ok(())
    }

    fn open_session(&self, user: User) -> Session {
        Session {
            token: self.identity.open_session(user.id),
            user,
        }
    }
}
