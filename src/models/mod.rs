//! Data models for privacy manifest selections
//!
//! Catalog entries (categories, reasons, purposes) are fixed in count and
//! identity; only their `selected` flag changes. Data types are user-owned.

use serde::{Deserialize, Serialize};

/// A family of sensitive system APIs that needs a declared reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiCategory {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// A platform-defined justification code for accessing a sensitive API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiUsageReason {
    pub id: String,
    pub code: String,
    pub description: String,
    pub selected: bool,
    /// Only third-party SDKs may declare this reason. Informational.
    #[serde(default)]
    pub third_party_only: bool,
}

/// A reason data may be used for tracking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingPurpose {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// One kind of data the app collects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivacyDataType {
    pub id: String,
    pub name: String,
    pub category: String,
    pub selected: bool,
    pub linked_to_identity: bool,
    pub collected_for_tracking: bool,
    #[serde(default)]
    pub purposes: Vec<String>,
}

impl PrivacyDataType {
    /// Create an unselected data type with a fresh id and no purposes
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            category: category.into(),
            selected: false,
            linked_to_identity: false,
            collected_for_tracking: false,
            purposes: Vec::new(),
        }
    }

    /// Apply every field that is set on `update`, leaving the rest untouched
    ///
    /// Returns whether the entry changed.
    pub fn apply(&mut self, update: DataTypeUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        let before = self.clone();
        if let Some(id) = update.id {
            self.id = id;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(selected) = update.selected {
            self.selected = selected;
        }
        if let Some(linked) = update.linked_to_identity {
            self.linked_to_identity = linked;
        }
        if let Some(tracking) = update.collected_for_tracking {
            self.collected_for_tracking = tracking;
        }
        if let Some(purposes) = update.purposes {
            self.purposes = purposes;
        }
        *self != before
    }
}

/// Partial set of data type fields merged by `PrivacyStore::update_data_type`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTypeUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub selected: Option<bool>,
    pub linked_to_identity: Option<bool>,
    pub collected_for_tracking: Option<bool>,
    pub purposes: Option<Vec<String>>,
}

impl DataTypeUpdate {
    pub fn selected(selected: bool) -> Self {
        Self {
            selected: Some(selected),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Well-known data type names grouped under one category
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DataTypeGroup {
    pub category: &'static str,
    pub items: &'static [&'static str],
}
