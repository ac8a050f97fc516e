//! Mapping name resolution (`related_people`, `related_<role>s`).

use once_cell::sync::Lazy;
use regex::Regex;

static ROLE_MAPPING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^related_([a-z][a-z_]*?)s$").expect("valid mapping regex"));

/// Every person related to the entity, regardless of role.
pub const ALL_PEOPLE_MAPPING: &str = "related_people";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingName {
    AllPeople,
    /// People whose `AssigneeType` contains this role (lowercase).
    Role(String),
    Unknown(String),
}

impl MappingName {
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        if normalized == ALL_PEOPLE_MAPPING {
            return Self::AllPeople;
        }
        match ROLE_MAPPING_RE.captures(&normalized) {
            Some(caps) => Self::Role(caps[1].to_string()),
            None => Self::Unknown(name.to_string()),
        }
    }
}
