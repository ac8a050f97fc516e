//! Person identity and committed mapping rows.

use serde::{Deserialize, Serialize};

pub type PersonId = i64;

/// Object type tag used for person endpoints and pending join targets.
pub const PERSON_TYPE: &str = "Person";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: String,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One committed member of a mapping, as resolved by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedEntry {
    pub instance: Person,
}

impl From<Person> for MappedEntry {
    fn from(instance: Person) -> Self {
        Self { instance }
    }
}
