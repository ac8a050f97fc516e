//! Deferred-mode pending joins.
//!
//! # Responsibility
//! - Represent staged relationship changes that are not yet persisted.
//! - Provide the queue edits the people group needs (merge, splice, dedupe).
//!
//! # Invariants
//! - Queue order is insertion order; the projector relies on it for the
//!   order of pending additions.

use crate::model::person::{Person, PersonId};
use crate::model::relationship::ASSIGNEE_TYPE_ATTR;
use crate::role::RoleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinAction {
    Add,
    Remove,
    Update,
}

/// Object a pending join points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JoinTarget {
    Person(Person),
    /// Any non-person object staged on the same entity.
    Object { object_type: String, id: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinExtra {
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<i64>,
}

impl JoinExtra {
    pub fn with_roles(roles: &RoleSet) -> Self {
        let mut extra = Self::default();
        extra
            .attrs
            .insert(ASSIGNEE_TYPE_ATTR.to_string(), roles.to_attr_value());
        extra
    }

    pub fn in_context(mut self, context_id: Option<i64>) -> Self {
        self.context_id = context_id;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingJoin {
    pub what: JoinTarget,
    pub how: JoinAction,
    pub through: String,
    #[serde(default)]
    pub extra: JoinExtra,
}

impl PendingJoin {
    pub fn person(&self) -> Option<&Person> {
        match &self.what {
            JoinTarget::Person(person) => Some(person),
            JoinTarget::Object { .. } => None,
        }
    }

    pub fn roles(&self) -> RoleSet {
        self.extra
            .attrs
            .get(ASSIGNEE_TYPE_ATTR)
            .map(|value| RoleSet::parse(value))
            .unwrap_or_default()
    }

    pub fn set_roles(&mut self, roles: &RoleSet) {
        self.extra
            .attrs
            .insert(ASSIGNEE_TYPE_ATTR.to_string(), roles.to_attr_value());
    }

    fn targets_person(&self, person_id: PersonId) -> bool {
        self.person().is_some_and(|person| person.id == person_id)
    }

    fn is_pending_add_for(&self, person_id: PersonId) -> bool {
        self.how == JoinAction::Add && self.targets_person(person_id)
    }
}

/// Ordered staging queue owned by the entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingOpQueue {
    joins: Vec<PendingJoin>,
}

impl PendingOpQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn as_slice(&self) -> &[PendingJoin] {
        &self.joins
    }

    pub fn push(&mut self, join: PendingJoin) {
        self.joins.push(join);
    }

    /// Pending add for `person_id`, if one is staged.
    pub fn pending_add_mut(&mut self, person_id: PersonId) -> Option<&mut PendingJoin> {
        self.joins
            .iter_mut()
            .find(|join| join.is_pending_add_for(person_id))
    }

    /// Takes the pending add for `person_id` out of the queue in place.
    ///
    /// Returns `None` and leaves the queue untouched when no such entry exists.
    pub fn splice_pending_add(&mut self, person_id: PersonId) -> Option<PendingJoin> {
        let index = self
            .joins
            .iter()
            .position(|join| join.is_pending_add_for(person_id))?;
        Some(self.joins.remove(index))
    }

    /// Drops every join targeting `person_id`; returns how many were dropped.
    pub fn remove_for_person(&mut self, person_id: PersonId) -> usize {
        let before = self.joins.len();
        self.joins.retain(|join| !join.targets_person(person_id));
        before - self.joins.len()
    }
}
