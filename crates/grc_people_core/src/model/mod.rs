//! Typed records shared by the store, the projector and the component.
//!
//! # Invariants
//! - People and relationships are owned by the record store; the core only
//!   holds snapshots of them.
//! - A relationship never carries an empty `AssigneeType` once saved.

pub mod entity;
pub mod pending;
pub mod person;
pub mod relationship;
