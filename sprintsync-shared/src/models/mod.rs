/// Database models for SprintSync
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with a global admin flag
/// - `task`: Units of work owned by a single user, with a fixed status workflow

pub mod task;
pub mod user;
