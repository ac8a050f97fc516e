//! Materialized "assigned people" projection.
//!
//! # Invariants
//! - Output is a pure function of (mapped, pending, role).
//! - No person id appears twice.
//! - A pending removal only hides people present in `mapped`.

use crate::model::pending::{JoinAction, PendingJoin};
use crate::model::person::{MappedEntry, Person, PersonId};
use crate::role::RoleLabel;
use std::collections::HashSet;

/// Applies pending joins for `role` on top of the committed mapping.
///
/// Mapped people come first in mapping order, followed by pending additions
/// in queue order.
pub fn project(mapped: &[MappedEntry], pending: &[PendingJoin], role: &RoleLabel) -> Vec<Person> {
    let mapped_ids: HashSet<PersonId> = mapped.iter().map(|entry| entry.instance.id).collect();

    let mut added = Vec::new();
    let mut removed = HashSet::new();
    for join in pending {
        let Some(person) = join.person() else {
            continue;
        };
        match join.how {
            JoinAction::Add if join.roles().contains(role.as_str()) => added.push(person),
            JoinAction::Remove if mapped_ids.contains(&person.id) => {
                removed.insert(person.id);
            }
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    mapped
        .iter()
        .map(|entry| &entry.instance)
        .filter(|person| !removed.contains(&person.id))
        .chain(added)
        .filter(|person| seen.insert(person.id))
        .cloned()
        .collect()
}
