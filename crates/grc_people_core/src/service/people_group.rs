//! People-group component.
//!
//! # Responsibility
//! - Own one role-scoped view over an entity's people: committed mapping,
//!   pending joins (deferred mode) and the projected result.
//! - Route user actions to the assignment strategy, then recompute the
//!   result, publish validation and notify subscribers.
//!
//! # Invariants
//! - `results` is recomputed from scratch on every change; it is never
//!   patched incrementally.
//! - Subscribers only hear about results when they actually changed.
//! - Record-store failures propagate; lookup misses are logged and skipped.

use crate::model::entity::OwningEntity;
use crate::model::pending::PendingJoin;
use crate::model::person::{MappedEntry, Person, PersonId};
use crate::options::{AssignmentMode, GroupOptions, OptionsError};
use crate::projector::project;
use crate::repo::record_store::{RecordStore, RepoError};
use crate::role::RoleLabel;
use crate::service::assignment::{strategy_for, AssignmentContext, AssignmentStrategy};
use crate::validator::{can_unmap, Validator};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum PeopleGroupError {
    Options(OptionsError),
    Repo(RepoError),
}

impl Display for PeopleGroupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Options(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PeopleGroupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Options(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<OptionsError> for PeopleGroupError {
    fn from(value: OptionsError) -> Self {
        Self::Options(value)
    }
}

impl From<RepoError> for PeopleGroupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Notification delivered to the view binding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChange {
    Results(Vec<PersonId>),
    ValidationPublished { key: String, satisfied: bool },
    ValidationDismissed { key: String },
}

type Subscriber = Box<dyn FnMut(&GroupChange)>;

pub struct PeopleGroup<R: RecordStore> {
    store: R,
    instance: OwningEntity,
    options: GroupOptions,
    role: RoleLabel,
    strategy: Box<dyn AssignmentStrategy>,
    validator: Validator,
    list_mapped: Vec<MappedEntry>,
    results: Vec<Person>,
    subscribers: Vec<Subscriber>,
}

impl<R: RecordStore> PeopleGroup<R> {
    /// Wires a group; call [`PeopleGroup::inserted`] to load state.
    pub fn new(
        store: R,
        instance: OwningEntity,
        options: GroupOptions,
    ) -> Result<Self, PeopleGroupError> {
        let role = options.role()?;
        Ok(Self {
            strategy: strategy_for(options.mode()),
            validator: Validator::new(options.required, &options.role_type),
            store,
            instance,
            options,
            role,
            list_mapped: Vec::new(),
            results: Vec::new(),
            subscribers: Vec::new(),
        })
    }

    /// Parses the string attribute bag, then wires the group.
    pub fn from_attrs(
        store: R,
        instance: OwningEntity,
        attrs: &BTreeMap<String, String>,
    ) -> Result<Self, PeopleGroupError> {
        Self::new(store, instance, GroupOptions::from_attrs(attrs)?)
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GroupChange) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Lifecycle signal: the group became visible. Loads the committed mapping
    /// and publishes the first result.
    pub fn inserted(&mut self) -> Result<(), PeopleGroupError> {
        self.reload_mapped()?;
        self.recompute();
        Ok(())
    }

    /// Autocomplete selection of `person`.
    pub fn select_person(&mut self, person: &Person) -> Result<(), PeopleGroupError> {
        self.strategy.assign(
            AssignmentContext {
                store: &self.store,
                instance: &mut self.instance,
                role: &self.role,
            },
            person,
        )?;
        self.after_action()
    }

    /// Removal of the role from the person with `person_id`.
    ///
    /// Unknown people are skipped. The unmap guard is not enforced here.
    pub fn remove_person(&mut self, person_id: PersonId) -> Result<(), PeopleGroupError> {
        let Some(person) = self.store.find_person(person_id)? else {
            warn!(
                "event=person_lookup module=service status=skip person_id={} reason=not_found",
                person_id
            );
            return Ok(());
        };

        self.strategy.unassign(
            AssignmentContext {
                store: &self.store,
                instance: &mut self.instance,
                role: &self.role,
            },
            &person,
        )?;
        self.after_action()
    }

    /// Owning entity dismissed its form: withdraw the validation flag.
    pub fn dismiss(&mut self) {
        if self.validator.dismiss(&mut self.instance) {
            let change = GroupChange::ValidationDismissed {
                key: self.validator.key().to_string(),
            };
            self.notify(&change);
        }
    }

    pub fn results(&self) -> &[Person] {
        &self.results
    }

    /// Results capped at the configured `limit`.
    pub fn visible_results(&self) -> &[Person] {
        match self.options.limit {
            Some(limit) if limit < self.results.len() => &self.results[..limit],
            _ => &self.results,
        }
    }

    pub fn list_mapped(&self) -> &[MappedEntry] {
        &self.list_mapped
    }

    pub fn list_pending(&self) -> &[PendingJoin] {
        self.strategy.pending(&self.instance)
    }

    pub fn can_unmap(&self) -> bool {
        can_unmap(self.options.required, self.results.len())
    }

    pub fn show_add(&self) -> bool {
        self.options.show_add()
    }

    pub fn mode(&self) -> AssignmentMode {
        self.strategy.mode()
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    pub fn instance(&self) -> &OwningEntity {
        &self.instance
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Hands back the owning entity, pending joins included.
    pub fn into_instance(self) -> OwningEntity {
        self.instance
    }

    fn after_action(&mut self) -> Result<(), PeopleGroupError> {
        if self.strategy.mode() == AssignmentMode::Immediate {
            self.reload_mapped()?;
        }
        self.recompute();
        Ok(())
    }

    fn reload_mapped(&mut self) -> Result<(), PeopleGroupError> {
        self.list_mapped = self
            .store
            .get_mapping(&self.instance.entity, &self.options.mapping)?;
        Ok(())
    }

    fn recompute(&mut self) {
        let results = project(&self.list_mapped, self.list_pending(), &self.role);
        debug!(
            "event=results_recompute module=service status=ok entity={} role={} mapped={} pending={} results={}",
            self.instance.entity,
            self.role,
            self.list_mapped.len(),
            self.list_pending().len(),
            results.len()
        );

        if results != self.results {
            self.results = results;
            let change = GroupChange::Results(self.results.iter().map(|p| p.id).collect());
            self.notify(&change);
        }

        if let Some(satisfied) = self.validator.publish(&mut self.instance, &self.results) {
            let change = GroupChange::ValidationPublished {
                key: self.validator.key().to_string(),
                satisfied,
            };
            self.notify(&change);
        }
    }

    fn notify(&mut self, change: &GroupChange) {
        for subscriber in &mut self.subscribers {
            subscriber(change);
        }
    }
}
