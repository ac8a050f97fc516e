//! Required-role validation publishing and the unmap guard.

use crate::model::entity::OwningEntity;
use crate::model::person::Person;

/// Entity attribute name the validation flag is published under.
pub fn validation_key(role_type: &str) -> String {
    format!("validate_{role_type}")
}

/// Whether the UI may offer removal of a member.
///
/// Presentation guard only: the core still accepts a removal when this is
/// `false`.
pub fn can_unmap(required: bool, result_len: usize) -> bool {
    !required || result_len > 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    required: bool,
    key: String,
}

impl Validator {
    pub fn new(required: bool, role_type: &str) -> Self {
        Self {
            required,
            key: validation_key(role_type),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Satisfaction flag for `results`, or `None` when not required.
    pub fn evaluate(&self, results: &[Person]) -> Option<bool> {
        self.required.then(|| !results.is_empty())
    }

    /// Writes the flag onto `instance`; returns the published value.
    pub fn publish(&self, instance: &mut OwningEntity, results: &[Person]) -> Option<bool> {
        let satisfied = self.evaluate(results)?;
        instance.set_attr(self.key.clone(), satisfied);
        Some(satisfied)
    }

    /// Withdraws the flag entirely; returns whether one was present.
    pub fn dismiss(&self, instance: &mut OwningEntity) -> bool {
        instance.remove_attr(&self.key)
    }
}
