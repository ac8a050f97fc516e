//! Role reconciliation core for GRC people groups.
//!
//! Derives who is assigned to an entity under a role from committed
//! relationships plus staged (deferred) changes, and writes role changes
//! back through a record store.

pub mod db;
pub mod logging;
pub mod model;
pub mod options;
pub mod projector;
pub mod repo;
pub mod role;
pub mod service;
pub mod validator;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{EntityRef, OwningEntity};
pub use model::pending::{JoinAction, JoinExtra, JoinTarget, PendingJoin, PendingOpQueue};
pub use model::person::{MappedEntry, Person, PersonId};
pub use model::relationship::{Relationship, RelationshipId, ASSIGNEE_TYPE_ATTR};
pub use options::{AssignmentMode, GroupOptions, OptionsError};
pub use projector::project;
pub use repo::record_store::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use role::{has_role, RoleLabel, RoleRemoval, RoleSet};
pub use service::people_group::{GroupChange, PeopleGroup, PeopleGroupError};
pub use validator::{can_unmap, validation_key, Validator};

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
