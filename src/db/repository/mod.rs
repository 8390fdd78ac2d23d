//! Repository layer — entity-scoped database operations.
//!
//! All public functions are re-exported here so callers can use
//! `crate::db::repository::*` without caring about the split.

mod conversation;
mod event;

pub use conversation::*;
pub use event::*;
