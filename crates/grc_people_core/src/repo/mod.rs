//! Record store contract and its SQLite adapter.
//!
//! # Responsibility
//! - Define the collaborator contract the people group reads and writes
//!   through (people lookup, relationship refresh/save/destroy, mappings).
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Saving never persists an empty `AssigneeType`.
//! - Lookups return `Ok(None)` for missing rows; `NotFound` is reserved for
//!   writes and refreshes against rows that vanished.

pub mod mapping;
pub mod record_store;
