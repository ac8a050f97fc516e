//! Snapshot loader list item.

use serde::{Deserialize, Serialize};

/// Fields a snapshot row may carry; any of them can be absent or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotItemData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description_inline: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotItem {
    pub item_data: SnapshotItemData,
    pub object_type: String,
    show_details: bool,
}

impl SnapshotItem {
    pub fn new(item_data: SnapshotItemData, object_type: impl Into<String>) -> Self {
        Self {
            item_data,
            object_type: object_type.into(),
            show_details: false,
        }
    }

    /// First non-blank of title, inline description, name, email.
    pub fn title(&self) -> Option<&str> {
        [
            &self.item_data.title,
            &self.item_data.description_inline,
            &self.item_data.name,
            &self.item_data.email,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find(|value| !value.trim().is_empty())
    }

    pub fn object_type_icon(&self) -> String {
        format!("fa-{}", self.object_type.to_lowercase())
    }

    pub fn show_details(&self) -> bool {
        self.show_details
    }

    pub fn toggle_icon_class(&self) -> &'static str {
        if self.show_details {
            "fa-caret-down"
        } else {
            "fa-caret-right"
        }
    }

    pub fn toggle_details(&mut self) {
        self.show_details = !self.show_details;
    }
}
