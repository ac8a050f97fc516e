//! People-group options parsed from the string attribute bag.
//!
//! # Invariants
//! - Options are parsed once; the rest of the crate sees typed values only.
//! - `type` is mandatory; `mapping` defaults to `related_<type>s`.

use crate::role::RoleLabel;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How assignments reach the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMode {
    /// Every change is saved or destroyed right away.
    Immediate,
    /// Changes are staged on the entity for a later bulk commit.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    Missing(&'static str),
    InvalidBool { option: &'static str, value: String },
    InvalidLimit(String),
}

impl Display for OptionsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(option) => write!(f, "required option `{option}` is missing"),
            Self::InvalidBool { option, value } => write!(
                f,
                "option `{option}` must be `true` or `false`, got `{value}`"
            ),
            Self::InvalidLimit(value) => {
                write!(f, "option `limit` must be a positive integer, got `{value}`")
            }
        }
    }
}

impl Error for OptionsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOptions {
    pub editable: bool,
    pub deferred: bool,
    pub required: bool,
    /// Raw role type as configured, e.g. `assignee`.
    pub role_type: String,
    pub mapping: String,
    pub limit: Option<usize>,
}

impl GroupOptions {
    /// Immediate-mode, optional, read-only options for `role_type`.
    pub fn for_role(role_type: impl Into<String>) -> Self {
        let role_type = role_type.into();
        Self {
            editable: false,
            deferred: false,
            required: false,
            mapping: default_mapping(&role_type),
            role_type,
            limit: None,
        }
    }

    pub fn from_attrs(attrs: &BTreeMap<String, String>) -> Result<Self, OptionsError> {
        let role_type = attrs
            .get("type")
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or(OptionsError::Missing("type"))?
            .to_string();
        let mapping = attrs
            .get("mapping")
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_mapping(&role_type));
        let limit = match attrs.get("limit").map(|value| value.trim()) {
            None | Some("") => None,
            Some(value) => match value.parse::<usize>() {
                Ok(limit) if limit > 0 => Some(limit),
                _ => return Err(OptionsError::InvalidLimit(value.to_string())),
            },
        };

        Ok(Self {
            editable: parse_flag(attrs, "editable")?,
            deferred: parse_flag(attrs, "deferred")?,
            required: parse_flag(attrs, "required")?,
            role_type,
            mapping,
            limit,
        })
    }

    pub fn mode(&self) -> AssignmentMode {
        if self.deferred {
            AssignmentMode::Deferred
        } else {
            AssignmentMode::Immediate
        }
    }

    pub fn role(&self) -> Result<RoleLabel, OptionsError> {
        RoleLabel::from_type(&self.role_type).ok_or(OptionsError::Missing("type"))
    }

    /// Whether the "add person" control is offered.
    pub fn show_add(&self) -> bool {
        self.editable
    }
}

fn default_mapping(role_type: &str) -> String {
    format!("related_{}s", role_type.to_lowercase())
}

fn parse_flag(
    attrs: &BTreeMap<String, String>,
    option: &'static str,
) -> Result<bool, OptionsError> {
    match attrs.get(option).map(|value| value.trim()) {
        None | Some("") | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(OptionsError::InvalidBool {
            option,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{AssignmentMode, GroupOptions, OptionsError};
    use std::collections::BTreeMap;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_full_attribute_bag() {
        let options = GroupOptions::from_attrs(&attrs(&[
            ("type", "verifier"),
            ("mapping", "related_verifiers"),
            ("editable", "true"),
            ("deferred", "true"),
            ("required", "false"),
            ("limit", "5"),
        ]))
        .unwrap();

        assert!(options.show_add());
        assert_eq!(options.mode(), AssignmentMode::Deferred);
        assert!(!options.required);
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.role().unwrap().as_str(), "Verifier");
    }

    #[test]
    fn defaults_mapping_and_flags() {
        let options = GroupOptions::from_attrs(&attrs(&[("type", "Assignee"), ("required", "")]))
            .unwrap();
        assert_eq!(options.mapping, "related_assignees");
        assert_eq!(options.mode(), AssignmentMode::Immediate);
        assert!(!options.required);
        assert!(!options.show_add());
        assert_eq!(options, GroupOptions::for_role("Assignee"));
    }

    #[test]
    fn rejects_missing_type() {
        let err = GroupOptions::from_attrs(&attrs(&[("type", "  ")])).unwrap_err();
        assert_eq!(err, OptionsError::Missing("type"));
    }

    #[test]
    fn rejects_non_boolean_flags() {
        let err = GroupOptions::from_attrs(&attrs(&[("type", "assignee"), ("deferred", "yes")]))
            .unwrap_err();
        assert_eq!(
            err,
            OptionsError::InvalidBool {
                option: "deferred",
                value: "yes".to_string(),
            }
        );
    }

    #[test]
    fn rejects_zero_limit() {
        let err = GroupOptions::from_attrs(&attrs(&[("type", "assignee"), ("limit", "0")]))
            .unwrap_err();
        assert_eq!(err, OptionsError::InvalidLimit("0".to_string()));
    }
}
