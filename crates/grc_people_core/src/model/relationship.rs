//! Person-to-entity relationship records.

use crate::model::entity::{EntityRef, OwningEntity};
use crate::model::person::{Person, PersonId, PERSON_TYPE};
use crate::role::RoleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RelationshipId = i64;

/// Attribute holding the comma-joined role labels.
pub const ASSIGNEE_TYPE_ATTR: &str = "AssigneeType";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// `None` until the record store has saved it.
    pub id: Option<RelationshipId>,
    pub source: EntityRef,
    pub destination: EntityRef,
    pub context_id: Option<i64>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl Relationship {
    /// Unsaved relationship with `person` as source and `owner` as destination.
    pub fn between(person: &Person, owner: &OwningEntity) -> Self {
        Self {
            id: None,
            source: EntityRef::new(PERSON_TYPE, person.id),
            destination: owner.entity.clone(),
            context_id: owner.context_id,
            attrs: BTreeMap::new(),
        }
    }

    pub fn assignee_type(&self) -> Option<&str> {
        self.attrs.get(ASSIGNEE_TYPE_ATTR).map(String::as_str)
    }

    pub fn roles(&self) -> RoleSet {
        RoleSet::parse(self.assignee_type().unwrap_or_default())
    }

    pub fn set_roles(&mut self, roles: &RoleSet) {
        self.attrs
            .insert(ASSIGNEE_TYPE_ATTR.to_string(), roles.to_attr_value());
    }

    /// Person endpoint of this relationship, in either direction.
    pub fn person_id(&self) -> Option<PersonId> {
        if self.source.kind == PERSON_TYPE {
            Some(self.source.id)
        } else if self.destination.kind == PERSON_TYPE {
            Some(self.destination.id)
        } else {
            None
        }
    }
}
