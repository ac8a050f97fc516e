//! Assignment strategies: immediate persistence vs deferred staging.
//!
//! # Responsibility
//! - Turn "select person" / "remove person" into record-store writes
//!   (immediate) or pending joins on the entity (deferred).
//! - Expose the pending joins each mode contributes to the projection.
//!
//! # Invariants
//! - Immediate mode never touches the pending queue.
//! - Neither mode persists or stages an empty `AssigneeType`; an emptied
//!   role set becomes a destroy or a deletion mark.
//! - Deferred removal first undoes a staged add carrying the role, and
//!   otherwise stages at most one join per person across all of their
//!   relationships to the entity.

use crate::model::entity::OwningEntity;
use crate::model::pending::{JoinExtra, PendingJoin};
use crate::model::person::Person;
use crate::model::relationship::Relationship;
use crate::options::AssignmentMode;
use crate::repo::record_store::{RecordStore, RepoResult};
use crate::role::{RoleLabel, RoleRemoval, RoleSet};
use log::{debug, info, warn};

/// Relation name people are staged through on the owning entity.
pub const PEOPLE_RELATION: &str = "related_objects_as_destination";

/// Collaborators a strategy operates on for one user action.
pub struct AssignmentContext<'a> {
    pub store: &'a dyn RecordStore,
    pub instance: &'a mut OwningEntity,
    pub role: &'a RoleLabel,
}

pub trait AssignmentStrategy {
    fn mode(&self) -> AssignmentMode;

    /// Pending joins visible to the projector in this mode.
    fn pending<'a>(&self, instance: &'a OwningEntity) -> &'a [PendingJoin];

    /// Gives `person` the context role.
    fn assign(&self, ctx: AssignmentContext<'_>, person: &Person) -> RepoResult<()>;

    /// Takes the context role away from `person`.
    fn unassign(&self, ctx: AssignmentContext<'_>, person: &Person) -> RepoResult<()>;
}

/// Builds the strategy for `mode`.
pub fn strategy_for(mode: AssignmentMode) -> Box<dyn AssignmentStrategy> {
    match mode {
        AssignmentMode::Immediate => Box::new(ImmediateAssignment),
        AssignmentMode::Deferred => Box::new(DeferredAssignment),
    }
}

/// Read-modify-write against the record store on every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateAssignment;

impl AssignmentStrategy for ImmediateAssignment {
    fn mode(&self) -> AssignmentMode {
        AssignmentMode::Immediate
    }

    fn pending<'a>(&self, _instance: &'a OwningEntity) -> &'a [PendingJoin] {
        &[]
    }

    fn assign(&self, ctx: AssignmentContext<'_>, person: &Person) -> RepoResult<()> {
        let mut relationship = match ctx.store.get_relationship(person.id, &ctx.instance.entity)? {
            Some(existing) => ctx.store.refresh(&existing)?,
            None => Relationship::between(person, ctx.instance),
        };
        let roles = relationship.roles().with_role(ctx.role);
        relationship.set_roles(&roles);
        let saved = ctx.store.save(&relationship)?;

        info!(
            "event=role_assign module=service status=ok mode=immediate person_id={} relationship_id={} role={}",
            person.id,
            saved.id.unwrap_or_default(),
            ctx.role
        );
        Ok(())
    }

    fn unassign(&self, ctx: AssignmentContext<'_>, person: &Person) -> RepoResult<()> {
        for mut relationship in committed_relationships(&ctx, person)? {
            match relationship.roles().remove(ctx.role.as_str()) {
                RoleRemoval::Unchanged => continue,
                RoleRemoval::Shrunk(remaining) => {
                    relationship.set_roles(&remaining);
                    ctx.store.save(&relationship)?;
                }
                RoleRemoval::Emptied => ctx.store.destroy(&relationship)?,
            }
            info!(
                "event=role_unassign module=service status=ok mode=immediate person_id={} relationship_id={} role={}",
                person.id,
                relationship.id.unwrap_or_default(),
                ctx.role
            );
        }
        Ok(())
    }
}

/// Stages changes on the owning entity for a later bulk commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredAssignment;

impl AssignmentStrategy for DeferredAssignment {
    fn mode(&self) -> AssignmentMode {
        AssignmentMode::Deferred
    }

    fn pending<'a>(&self, instance: &'a OwningEntity) -> &'a [PendingJoin] {
        instance.pending_joins().as_slice()
    }

    fn assign(&self, ctx: AssignmentContext<'_>, person: &Person) -> RepoResult<()> {
        if let Some(join) = ctx.instance.pending_joins_mut().pending_add_mut(person.id) {
            let roles = join.roles().with_role(ctx.role);
            join.set_roles(&roles);
            debug!(
                "event=role_assign module=service status=ok mode=deferred person_id={} merged=true",
                person.id
            );
            return Ok(());
        }

        let extra =
            JoinExtra::with_roles(&RoleSet::single(ctx.role)).in_context(ctx.instance.context_id);
        ctx.instance
            .mark_for_addition(PEOPLE_RELATION, person.clone(), extra);
        debug!(
            "event=role_assign module=service status=ok mode=deferred person_id={} merged=false",
            person.id
        );
        Ok(())
    }

    fn unassign(&self, ctx: AssignmentContext<'_>, person: &Person) -> RepoResult<()> {
        if unstage_pending_add(ctx.instance, person, ctx.role) {
            return Ok(());
        }

        let mut remaining = RoleSet::default();
        let mut changed = false;
        let mut context_id = None;
        for relationship in committed_relationships(&ctx, person)? {
            let roles = relationship.roles();
            match roles.clone().remove(ctx.role.as_str()) {
                RoleRemoval::Unchanged => remaining = remaining.union(&roles),
                RoleRemoval::Shrunk(rest) => {
                    changed = true;
                    context_id = context_id.or(relationship.context_id);
                    remaining = remaining.union(&rest);
                }
                RoleRemoval::Emptied => changed = true,
            }
        }

        if !changed {
            debug!(
                "event=role_unassign module=service status=skip mode=deferred person_id={} reason=role_absent",
                person.id
            );
            return Ok(());
        }

        // One mark per person: staging replaces earlier joins for the same target.
        if remaining.is_empty() {
            ctx.instance
                .mark_for_deletion(PEOPLE_RELATION, person.clone());
        } else {
            ctx.instance.mark_for_change(
                PEOPLE_RELATION,
                person.clone(),
                JoinExtra::with_roles(&remaining).in_context(context_id),
            );
        }
        debug!(
            "event=role_unassign module=service status=ok mode=deferred person_id={} remaining={}",
            person.id,
            remaining.len()
        );
        Ok(())
    }
}

/// Takes `role` out of the staged add for `person`, dropping the add once no
/// roles remain. Returns whether a staged add carried the role.
fn unstage_pending_add(instance: &mut OwningEntity, person: &Person, role: &RoleLabel) -> bool {
    let queue = instance.pending_joins_mut();
    let outcome = match queue.pending_add_mut(person.id) {
        Some(join) => join.roles().remove(role.as_str()),
        None => return false,
    };

    match outcome {
        RoleRemoval::Unchanged => return false,
        RoleRemoval::Shrunk(rest) => {
            if let Some(join) = queue.pending_add_mut(person.id) {
                join.set_roles(&rest);
            }
        }
        RoleRemoval::Emptied => {
            queue.splice_pending_add(person.id);
        }
    }
    debug!(
        "event=role_unassign module=service status=ok mode=deferred person_id={} unstaged=true",
        person.id
    );
    true
}

/// Fresh copies of the committed relationships between `person` and the
/// entity that carry an `AssigneeType`. Ids missing from the store are
/// skipped.
fn committed_relationships(
    ctx: &AssignmentContext<'_>,
    person: &Person,
) -> RepoResult<Vec<Relationship>> {
    let mut relationships = Vec::new();
    for id in ctx
        .store
        .relationship_ids_between(person.id, &ctx.instance.entity)?
    {
        let Some(relationship) = ctx.store.find_relationship(id)? else {
            warn!(
                "event=relationship_lookup module=service status=skip relationship_id={} reason=not_found",
                id
            );
            continue;
        };
        if relationship.assignee_type().is_none() {
            debug!(
                "event=relationship_lookup module=service status=skip relationship_id={} reason=no_roles",
                id
            );
            continue;
        }
        relationships.push(ctx.store.refresh(&relationship)?);
    }
    Ok(relationships)
}
