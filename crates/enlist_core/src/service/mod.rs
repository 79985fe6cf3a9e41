//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate access control and repository calls into the operations
//!   exposed to transport layers.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services check authentication, then input, then the target's existence,
//!   then permission, and only then mutate.

pub mod account_service;
pub mod app;
pub mod list_service;
pub mod sharing_service;

use crate::identity::Actor;
use crate::model::user::UserId;
use log::debug;

/// Returns the authenticated user behind `actor`, if any.
pub(crate) fn require_user(actor: Actor) -> Option<UserId> {
    let user_id = actor.user_id();
    if user_id.is_none() {
        debug!("event=auth_required module=service status=denied actor=anonymous");
    }
    user_id
}
