//! Form state container
//!
//! `PrivacyStore` is the single owner of every selection the user makes.
//! Mutations are synchronous; derived views are recomputed on each read so
//! they can never go stale. Observers registered with [`PrivacyStore::subscribe`]
//! are called after every mutation that actually changed something.

use std::fmt;

use tracing::debug;

use crate::catalog;
use crate::models::{ApiCategory, ApiUsageReason, DataTypeUpdate, PrivacyDataType, TrackingPurpose};

/// Errors raised by index-addressed store operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collection} index {index} out of range (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

/// A mutation that was applied to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ApiCategoryToggled { id: String, selected: bool },
    ApiUsageReasonToggled { id: String, selected: bool },
    TrackingPurposeToggled { id: String, selected: bool },
    PrivacyTrackingChanged(bool),
    TrackingDomainAdded(String),
    TrackingDomainRemoved { index: usize, domain: String },
    DataTypeAdded { index: usize },
    DataTypeRemoved { index: usize },
    DataTypeUpdated { index: usize },
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// All mutable form state
pub struct PrivacyStore {
    api_categories: Vec<ApiCategory>,
    api_usage_reasons: Vec<ApiUsageReason>,
    include_privacy_tracking: bool,
    tracking_domains: Vec<String>,
    collected_data_types: Vec<PrivacyDataType>,
    tracking_purposes: Vec<TrackingPurpose>,
    listeners: Vec<Listener>,
}

impl Default for PrivacyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PrivacyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivacyStore")
            .field("api_categories", &self.api_categories)
            .field("api_usage_reasons", &self.api_usage_reasons)
            .field("include_privacy_tracking", &self.include_privacy_tracking)
            .field("tracking_domains", &self.tracking_domains)
            .field("collected_data_types", &self.collected_data_types)
            .field("tracking_purposes", &self.tracking_purposes)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PrivacyStore {
    /// Create a store seeded with the fixed catalogs, nothing selected
    pub fn new() -> Self {
        Self {
            api_categories: catalog::api_categories(),
            api_usage_reasons: catalog::api_usage_reasons(),
            include_privacy_tracking: false,
            tracking_domains: Vec::new(),
            collected_data_types: Vec::new(),
            tracking_purposes: catalog::tracking_purposes(),
            listeners: Vec::new(),
        }
    }

    /// Register an observer called after each effective mutation
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: StoreEvent) {
        debug!(?event, "store mutated");
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // State

    pub fn api_categories(&self) -> &[ApiCategory] {
        &self.api_categories
    }

    pub fn api_usage_reasons(&self) -> &[ApiUsageReason] {
        &self.api_usage_reasons
    }

    pub fn tracking_purposes(&self) -> &[TrackingPurpose] {
        &self.tracking_purposes
    }

    pub fn include_privacy_tracking(&self) -> bool {
        self.include_privacy_tracking
    }

    pub fn tracking_domains(&self) -> &[String] {
        &self.tracking_domains
    }

    pub fn collected_data_types(&self) -> &[PrivacyDataType] {
        &self.collected_data_types
    }

    // Derived views

    pub fn selected_api_categories(&self) -> Vec<&ApiCategory> {
        self.api_categories.iter().filter(|c| c.selected).collect()
    }

    pub fn selected_api_usage_reasons(&self) -> Vec<&ApiUsageReason> {
        self.api_usage_reasons.iter().filter(|r| r.selected).collect()
    }

    pub fn selected_data_types(&self) -> Vec<&PrivacyDataType> {
        self.collected_data_types.iter().filter(|d| d.selected).collect()
    }

    pub fn selected_tracking_purposes(&self) -> Vec<&TrackingPurpose> {
        self.tracking_purposes.iter().filter(|p| p.selected).collect()
    }

    // Actions

    /// Flip an API category. Returns `false` if the id is unknown.
    pub fn toggle_api_category(&mut self, id: &str) -> bool {
        let Some(category) = self.api_categories.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        category.selected = !category.selected;
        let selected = category.selected;
        self.emit(StoreEvent::ApiCategoryToggled {
            id: id.to_string(),
            selected,
        });
        true
    }

    /// Flip a usage reason. Returns `false` if the id is unknown.
    pub fn toggle_api_usage_reason(&mut self, id: &str) -> bool {
        let Some(reason) = self.api_usage_reasons.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        reason.selected = !reason.selected;
        let selected = reason.selected;
        self.emit(StoreEvent::ApiUsageReasonToggled {
            id: id.to_string(),
            selected,
        });
        true
    }

    /// Flip a tracking purpose. Returns `false` if the id is unknown.
    pub fn toggle_tracking_purpose(&mut self, id: &str) -> bool {
        let Some(purpose) = self.tracking_purposes.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        purpose.selected = !purpose.selected;
        let selected = purpose.selected;
        self.emit(StoreEvent::TrackingPurposeToggled {
            id: id.to_string(),
            selected,
        });
        true
    }

    pub fn set_include_privacy_tracking(&mut self, include: bool) {
        if self.include_privacy_tracking == include {
            return;
        }
        self.include_privacy_tracking = include;
        self.emit(StoreEvent::PrivacyTrackingChanged(include));
    }

    /// Append a tracking domain
    ///
    /// Empty strings and exact duplicates are ignored; returns whether the
    /// domain was inserted.
    pub fn add_tracking_domain(&mut self, domain: &str) -> bool {
        if domain.is_empty() || self.tracking_domains.iter().any(|d| d == domain) {
            return false;
        }
        self.tracking_domains.push(domain.to_string());
        self.emit(StoreEvent::TrackingDomainAdded(domain.to_string()));
        true
    }

    pub fn remove_tracking_domain(&mut self, index: usize) -> Result<String, StoreError> {
        check_index("tracking_domains", index, self.tracking_domains.len())?;
        let domain = self.tracking_domains.remove(index);
        self.emit(StoreEvent::TrackingDomainRemoved {
            index,
            domain: domain.clone(),
        });
        Ok(domain)
    }

    /// Append a data type; duplicates are allowed
    pub fn add_data_type(&mut self, data_type: PrivacyDataType) -> usize {
        self.collected_data_types.push(data_type);
        let index = self.collected_data_types.len() - 1;
        self.emit(StoreEvent::DataTypeAdded { index });
        index
    }

    pub fn remove_data_type(&mut self, index: usize) -> Result<PrivacyDataType, StoreError> {
        check_index("collected_data_types", index, self.collected_data_types.len())?;
        let removed = self.collected_data_types.remove(index);
        self.emit(StoreEvent::DataTypeRemoved { index });
        Ok(removed)
    }

    /// Merge the set fields of `update` into the data type at `index`
    ///
    /// Updates that leave the entry unchanged emit no event.
    pub fn update_data_type(
        &mut self,
        index: usize,
        update: DataTypeUpdate,
    ) -> Result<(), StoreError> {
        let len = self.collected_data_types.len();
        let data_type = self
            .collected_data_types
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange {
                collection: "collected_data_types",
                index,
                len,
            })?;
        if data_type.apply(update) {
            self.emit(StoreEvent::DataTypeUpdated { index });
        }
        Ok(())
    }

    /// Flip `selected` on the data type at `index`
    pub fn toggle_data_type(&mut self, index: usize) -> Result<bool, StoreError> {
        let selected = !self.data_type(index)?.selected;
        self.update_data_type(index, DataTypeUpdate::selected(selected))?;
        Ok(selected)
    }

    pub fn data_type(&self, index: usize) -> Result<&PrivacyDataType, StoreError> {
        self.collected_data_types
            .get(index)
            .ok_or(StoreError::IndexOutOfRange {
                collection: "collected_data_types",
                index,
                len: self.collected_data_types.len(),
            })
    }
}

fn check_index(collection: &'static str, index: usize, len: usize) -> Result<(), StoreError> {
    if index >= len {
        return Err(StoreError::IndexOutOfRange {
            collection,
            index,
            len,
        });
    }
    Ok(())
}
