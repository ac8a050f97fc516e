//! Role label algebra over comma-joined `AssigneeType` strings.
//!
//! # Responsibility
//! - Parse, union and shrink role sets stored as `"Assignee,Verifier"`.
//! - Keep membership checks case-insensitive.
//!
//! # Invariants
//! - A `RoleSet` never holds empty labels or two labels equal ignoring case.
//! - Existing labels keep their stored casing; added labels use the
//!   capitalized `RoleLabel` form.

use std::fmt::{Display, Formatter};

/// Capitalized role label derived from a component `type` option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleLabel(String);

impl RoleLabel {
    /// Builds the label from a raw type such as `"assignee"`.
    ///
    /// Returns `None` for blank input.
    pub fn from_type(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        let mut label: String = first.to_uppercase().collect();
        label.push_str(chars.as_str());
        Some(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a stored label.
    pub fn matches(&self, label: &str) -> bool {
        same_label(&self.0, label)
    }
}

impl Display for RoleLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of taking one role out of a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRemoval {
    /// The role was not present; nothing to write.
    Unchanged,
    /// Other roles remain and should be written back.
    Shrunk(RoleSet),
    /// No roles remain; the owning relationship must go away.
    Emptied,
}

/// Ordered, duplicate-free set of role labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    labels: Vec<String>,
}

impl RoleSet {
    /// Parses a comma-joined attribute value, dropping empty entries.
    pub fn parse(value: &str) -> Self {
        let mut set = Self::default();
        for label in value.split(',').map(str::trim).filter(|l| !l.is_empty()) {
            if !set.contains(label) {
                set.labels.push(label.to_string());
            }
        }
        set
    }

    pub fn single(role: &RoleLabel) -> Self {
        Self {
            labels: vec![role.as_str().to_string()],
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| same_label(existing, label))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Union with `{role}`.
    pub fn with_role(mut self, role: &RoleLabel) -> Self {
        if !self.contains(role.as_str()) {
            self.labels.push(role.as_str().to_string());
        }
        self
    }

    /// Union with every label of `other`, keeping this set's order first.
    pub fn union(mut self, other: &RoleSet) -> Self {
        for label in other.iter() {
            if !self.contains(label) {
                self.labels.push(label.to_string());
            }
        }
        self
    }

    /// Difference with `{role}`, classified for the caller.
    pub fn remove(self, role: &str) -> RoleRemoval {
        if !self.contains(role) {
            return RoleRemoval::Unchanged;
        }
        let remaining: Vec<String> = self
            .labels
            .into_iter()
            .filter(|label| !same_label(label, role))
            .collect();
        if remaining.is_empty() {
            RoleRemoval::Emptied
        } else {
            RoleRemoval::Shrunk(Self { labels: remaining })
        }
    }

    /// Comma-joined form stored in `AssigneeType`.
    pub fn to_attr_value(&self) -> String {
        self.labels.join(",")
    }
}

impl Display for RoleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_attr_value())
    }
}

/// Whether the comma-joined `roles` contains `role`, ignoring case.
pub fn has_role(roles: &str, role: &str) -> bool {
    let role = role.trim();
    !role.is_empty() && RoleSet::parse(roles).contains(role)
}

fn same_label(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{has_role, RoleLabel, RoleRemoval, RoleSet};

    fn label(raw: &str) -> RoleLabel {
        RoleLabel::from_type(raw).unwrap()
    }

    #[test]
    fn label_capitalizes_first_char_only() {
        assert_eq!(label("assignee").as_str(), "Assignee");
        assert_eq!(label(" primary_contact ").as_str(), "Primary_contact");
        assert!(RoleLabel::from_type("   ").is_none());
    }

    #[test]
    fn parse_drops_empty_and_duplicate_entries() {
        let set = RoleSet::parse(",Assignee,,assignee, Verifier,");
        assert_eq!(set.to_attr_value(), "Assignee,Verifier");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn with_role_is_a_union() {
        let set = RoleSet::parse("verifier").with_role(&label("assignee"));
        assert_eq!(set.to_attr_value(), "verifier,Assignee");

        let again = set.with_role(&label("ASSIGNEE"));
        assert_eq!(again.to_attr_value(), "verifier,Assignee");
    }

    #[test]
    fn with_role_on_empty_value_yields_single_label() {
        let set = RoleSet::parse("").with_role(&label("verifier"));
        assert_eq!(set.to_attr_value(), "Verifier");
    }

    #[test]
    fn union_merges_without_case_duplicates() {
        let set = RoleSet::parse("Verifier").union(&RoleSet::parse("verifier,Requester"));
        assert_eq!(set.to_attr_value(), "Verifier,Requester");
        assert_eq!(RoleSet::default().union(&set), set);
    }

    #[test]
    fn remove_keeps_other_roles() {
        let outcome = RoleSet::parse("Assignee,Verifier").remove("assignee");
        assert_eq!(outcome, RoleRemoval::Shrunk(RoleSet::parse("Verifier")));
    }

    #[test]
    fn remove_last_role_empties_the_set() {
        assert_eq!(RoleSet::parse("Verifier").remove("verifier"), RoleRemoval::Emptied);
    }

    #[test]
    fn remove_absent_role_is_unchanged() {
        assert_eq!(
            RoleSet::parse("Verifier").remove("assignee"),
            RoleRemoval::Unchanged
        );
    }

    #[test]
    fn has_role_ignores_case_and_blank_input() {
        assert!(has_role("Assignee,Verifier", "verifier"));
        assert!(!has_role("Assignee,Verifier", "requester"));
        assert!(!has_role("", "assignee"));
        assert!(!has_role("Assignee", ""));
    }
}
