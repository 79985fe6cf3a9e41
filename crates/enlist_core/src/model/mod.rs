//! Domain model for users, to-do lists, items and helper links.
//!
//! # Responsibility
//! - Define the records exchanged between repositories and services.
//! - Normalize and validate user-supplied text before it reaches storage.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - A list has exactly one author; helpers never include the author.
//! - An item never outlives its parent list.

pub mod list;
pub mod user;
pub mod validation;
