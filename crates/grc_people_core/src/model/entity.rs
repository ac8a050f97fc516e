//! Owning entity handle.
//!
//! # Responsibility
//! - Identify the object people are assigned to.
//! - Hold the entity-scoped state the component publishes into: validation
//!   flags and the deferred pending-join queue.
//!
//! # Invariants
//! - `mark_for_*` keeps at most one pending join per target person.

use crate::model::pending::{JoinAction, JoinExtra, JoinTarget, PendingJoin, PendingOpQueue};
use crate::model::person::Person;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Typed reference to any record endpoint (`{type, id}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// The entity a people group edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwningEntity {
    pub entity: EntityRef,
    pub context_id: Option<i64>,
    attrs: BTreeMap<String, bool>,
    pending_joins: PendingOpQueue,
}

impl OwningEntity {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            context_id: None,
            attrs: BTreeMap::new(),
            pending_joins: PendingOpQueue::new(),
        }
    }

    pub fn with_context(mut self, context_id: i64) -> Self {
        self.context_id = Some(context_id);
        self
    }

    pub fn attr(&self, name: &str) -> Option<bool> {
        self.attrs.get(name).copied()
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: bool) {
        self.attrs.insert(name.into(), value);
    }

    /// Drops the attribute entirely; returns whether it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        self.attrs.remove(name).is_some()
    }

    pub fn pending_joins(&self) -> &PendingOpQueue {
        &self.pending_joins
    }

    pub fn pending_joins_mut(&mut self) -> &mut PendingOpQueue {
        &mut self.pending_joins
    }

    /// Stages a new relationship to `person` through `relation`.
    pub fn mark_for_addition(&mut self, relation: &str, person: Person, extra: JoinExtra) {
        self.stage(relation, person, JoinAction::Add, extra);
    }

    /// Stages an attribute change on the relationship to `person`.
    pub fn mark_for_change(&mut self, relation: &str, person: Person, extra: JoinExtra) {
        self.stage(relation, person, JoinAction::Update, extra);
    }

    /// Stages removal of the relationship to `person`.
    pub fn mark_for_deletion(&mut self, relation: &str, person: Person) {
        self.stage(relation, person, JoinAction::Remove, JoinExtra::default());
    }

    fn stage(&mut self, relation: &str, person: Person, how: JoinAction, extra: JoinExtra) {
        self.pending_joins.remove_for_person(person.id);
        self.pending_joins.push(PendingJoin {
            what: JoinTarget::Person(person),
            how,
            through: relation.to_string(),
            extra,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityRef, OwningEntity};
    use crate::model::pending::{JoinAction, JoinExtra};
    use crate::model::person::Person;

    fn entity() -> OwningEntity {
        OwningEntity::new(EntityRef::new("Request", 7))
    }

    #[test]
    fn staging_replaces_earlier_join_for_same_person() {
        let mut instance = entity();
        let alice = Person::new(1, "Alice", "alice@example.com");

        instance.mark_for_deletion("related_objects_as_destination", alice.clone());
        instance.mark_for_addition(
            "related_objects_as_destination",
            alice,
            JoinExtra::default(),
        );

        let joins = instance.pending_joins();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins.as_slice()[0].how, JoinAction::Add);
    }

    #[test]
    fn remove_attr_reports_presence() {
        let mut instance = entity();
        instance.set_attr("validate_assignee", false);

        assert_eq!(instance.attr("validate_assignee"), Some(false));
        assert!(instance.remove_attr("validate_assignee"));
        assert!(!instance.remove_attr("validate_assignee"));
        assert_eq!(instance.attr("validate_assignee"), None);
    }
}
