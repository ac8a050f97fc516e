//! Component services.
//!
//! # Responsibility
//! - Drive the people group through its lifecycle and user actions.
//! - Keep the two assignment modes behind one strategy trait.

pub mod assignment;
pub mod people_group;
