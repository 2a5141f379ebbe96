//! Manifest projection
//!
//! Turns the current store state into a [`Manifest`] and then into plist XML.
//! Projection is pure: it reads the store and never mutates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plist::{self, PlistValue};
use crate::store::PrivacyStore;

pub const KEY_TRACKING: &str = "NSPrivacyTracking";
pub const KEY_TRACKING_DOMAINS: &str = "NSPrivacyTrackingDomains";
pub const KEY_COLLECTED_DATA_TYPES: &str = "NSPrivacyCollectedDataTypes";
pub const KEY_ACCESSED_API_TYPES: &str = "NSPrivacyAccessedAPITypes";

// Keys inside collected data type entries
pub const KEY_DATA_TYPE: &str = "NSPrivacyCollectedDataType";
pub const KEY_DATA_TYPE_LINKED: &str = "NSPrivacyCollectedDataTypeLinked";
pub const KEY_DATA_TYPE_TRACKING: &str = "NSPrivacyCollectedDataTypeTracking";
pub const KEY_DATA_TYPE_PURPOSES: &str = "NSPrivacyCollectedDataTypePurposes";

// Keys inside accessed API type entries
pub const KEY_API_TYPE: &str = "NSPrivacyAccessedAPIType";
pub const KEY_API_TYPE_REASONS: &str = "NSPrivacyAccessedAPITypeReasons";

/// How usage reasons are attached to accessed API entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonScoping {
    /// Every selected reason is listed under every selected category
    #[default]
    Global,
    /// Each category lists only the selected reasons mapped to it
    PerCategory,
}

impl std::fmt::Display for ReasonScoping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonScoping::Global => write!(f, "global"),
            ReasonScoping::PerCategory => write!(f, "per-category"),
        }
    }
}

impl std::str::FromStr for ReasonScoping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(ReasonScoping::Global),
            "per-category" | "per_category" => Ok(ReasonScoping::PerCategory),
            _ => Err(format!("Invalid reason scoping: {}. Use: global, per-category", s)),
        }
    }
}

/// Projection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestOptions {
    #[serde(default)]
    pub reason_scoping: ReasonScoping,
    /// Category id -> reason codes allowed under per-category scoping
    #[serde(default = "crate::catalog::default_category_reasons")]
    pub category_reasons: BTreeMap<String, Vec<String>>,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            reason_scoping: ReasonScoping::default(),
            category_reasons: crate::catalog::default_category_reasons(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectedDataTypeEntry {
    #[serde(rename = "NSPrivacyCollectedDataType")]
    pub data_type: String,
    #[serde(rename = "NSPrivacyCollectedDataTypeLinked")]
    pub linked: bool,
    #[serde(rename = "NSPrivacyCollectedDataTypeTracking")]
    pub tracking: bool,
    #[serde(rename = "NSPrivacyCollectedDataTypePurposes")]
    pub purposes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccessedApiTypeEntry {
    #[serde(rename = "NSPrivacyAccessedAPIType")]
    pub api_type: String,
    #[serde(rename = "NSPrivacyAccessedAPITypeReasons")]
    pub reasons: Vec<String>,
}

/// The derived manifest document; only populated fields are emitted
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(rename = "NSPrivacyTracking", skip_serializing_if = "Option::is_none")]
    pub tracking: Option<bool>,
    #[serde(rename = "NSPrivacyTrackingDomains", skip_serializing_if = "Option::is_none")]
    pub tracking_domains: Option<Vec<String>>,
    #[serde(rename = "NSPrivacyCollectedDataTypes", skip_serializing_if = "Option::is_none")]
    pub collected_data_types: Option<Vec<CollectedDataTypeEntry>>,
    #[serde(rename = "NSPrivacyAccessedAPITypes", skip_serializing_if = "Option::is_none")]
    pub accessed_api_types: Option<Vec<AccessedApiTypeEntry>>,
}

impl Manifest {
    /// Build the manifest for the store's current selections
    pub fn project(store: &PrivacyStore, options: &ManifestOptions) -> Self {
        let mut manifest = Manifest::default();

        if store.include_privacy_tracking() {
            manifest.tracking = Some(true);
        }

        if !store.tracking_domains().is_empty() {
            manifest.tracking_domains = Some(store.tracking_domains().to_vec());
        }

        let data_types = store.selected_data_types();
        if !data_types.is_empty() {
            manifest.collected_data_types = Some(
                data_types
                    .into_iter()
                    .map(|d| CollectedDataTypeEntry {
                        data_type: d.name.clone(),
                        linked: d.linked_to_identity,
                        tracking: d.collected_for_tracking,
                        purposes: d.purposes.clone(),
                    })
                    .collect(),
            );
        }

        let categories = store.selected_api_categories();
        if !categories.is_empty() {
            let codes: Vec<&str> = store
                .selected_api_usage_reasons()
                .into_iter()
                .map(|r| r.code.as_str())
                .collect();

            manifest.accessed_api_types = Some(
                categories
                    .into_iter()
                    .map(|category| AccessedApiTypeEntry {
                        api_type: category.id.clone(),
                        reasons: reasons_for(&category.id, &codes, options),
                    })
                    .collect(),
            );
        }

        manifest
    }

    pub fn is_empty(&self) -> bool {
        self.tracking.is_none()
            && self.tracking_domains.is_none()
            && self.collected_data_types.is_none()
            && self.accessed_api_types.is_none()
    }

    /// Plist value for the document body, fields in manifest order
    ///
    /// An empty manifest still gets an empty `NSPrivacyCollectedDataTypes`
    /// array so the body is never a bare `<dict/>`.
    pub fn to_plist(&self) -> PlistValue {
        let mut entries: Vec<(String, PlistValue)> = Vec::new();

        if let Some(tracking) = self.tracking {
            entries.push((KEY_TRACKING.to_string(), tracking.into()));
        }
        if let Some(domains) = &self.tracking_domains {
            entries.push((KEY_TRACKING_DOMAINS.to_string(), domains.clone().into()));
        }
        if let Some(data_types) = &self.collected_data_types {
            let items = data_types
                .iter()
                .map(|d| {
                    PlistValue::Dict(vec![
                        (KEY_DATA_TYPE.to_string(), d.data_type.clone().into()),
                        (KEY_DATA_TYPE_LINKED.to_string(), d.linked.into()),
                        (KEY_DATA_TYPE_TRACKING.to_string(), d.tracking.into()),
                        (KEY_DATA_TYPE_PURPOSES.to_string(), d.purposes.clone().into()),
                    ])
                })
                .collect();
            entries.push((KEY_COLLECTED_DATA_TYPES.to_string(), PlistValue::Array(items)));
        }
        if let Some(api_types) = &self.accessed_api_types {
            let items = api_types
                .iter()
                .map(|a| {
                    PlistValue::Dict(vec![
                        (KEY_API_TYPE.to_string(), a.api_type.clone().into()),
                        (KEY_API_TYPE_REASONS.to_string(), a.reasons.clone().into()),
                    ])
                })
                .collect();
            entries.push((KEY_ACCESSED_API_TYPES.to_string(), PlistValue::Array(items)));
        }

        if entries.is_empty() {
            entries.push((
                KEY_COLLECTED_DATA_TYPES.to_string(),
                PlistValue::Array(Vec::new()),
            ));
        }

        PlistValue::Dict(entries)
    }

    pub fn to_xml(&self) -> String {
        plist::to_document(&self.to_plist())
    }
}

/// Project the store straight to plist XML
pub fn generate_xml(store: &PrivacyStore, options: &ManifestOptions) -> String {
    Manifest::project(store, options).to_xml()
}

fn reasons_for(
    category_id: &str,
    selected_codes: &[&str],
    options: &ManifestOptions,
) -> Vec<String> {
    match options.reason_scoping {
        ReasonScoping::Global => selected_codes.iter().map(|c| c.to_string()).collect(),
        ReasonScoping::PerCategory => {
            let allowed = options
                .category_reasons
                .get(category_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            selected_codes
                .iter()
                .filter(|code| allowed.iter().any(|a| a == *code))
                .map(|c| c.to_string())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrivacyDataType;

    #[test]
    fn test_empty_state_emits_placeholder() {
        let store = PrivacyStore::new();
        let manifest = Manifest::project(&store, &ManifestOptions::default());
        assert!(manifest.is_empty());

        let xml = manifest.to_xml();
        assert!(xml.contains(
            "<dict>\n\t<key>NSPrivacyCollectedDataTypes</key>\n\t<array/>\n</dict>\n"
        ));
        assert_eq!(xml.matches("<key>").count(), 1);
    }

    #[test]
    fn test_tracking_and_domains() {
        let mut store = PrivacyStore::new();
        store.set_include_privacy_tracking(true);
        store.add_tracking_domain("example.com");

        let manifest = Manifest::project(&store, &ManifestOptions::default());
        assert_eq!(manifest.tracking, Some(true));
        assert_eq!(manifest.tracking_domains, Some(vec!["example.com".to_string()]));
        assert!(manifest.collected_data_types.is_none());

        let xml = manifest.to_xml();
        assert!(xml.contains("\t<key>NSPrivacyTracking</key>\n\t<true/>\n"));
        assert!(xml.contains(
            "\t<key>NSPrivacyTrackingDomains</key>\n\t<array>\n\
             \t\t<string>example.com</string>\n\t</array>\n"
        ));
        assert!(!xml.contains("NSPrivacyCollectedDataTypes"));
    }

    #[test]
    fn test_tracking_off_omits_key() {
        let mut store = PrivacyStore::new();
        store.add_tracking_domain("example.com");
        let manifest = Manifest::project(&store, &ManifestOptions::default());
        assert_eq!(manifest.tracking, None);
        assert!(!manifest.to_xml().contains("NSPrivacyTracking</key>"));
    }

    #[test]
    fn test_disk_space_with_c617() {
        let mut store = PrivacyStore::new();
        store.toggle_api_category("disk-space");
        store.toggle_api_usage_reason("c617-1");

        let manifest = Manifest::project(&store, &ManifestOptions::default());
        assert_eq!(
            manifest.accessed_api_types,
            Some(vec![AccessedApiTypeEntry {
                api_type: "disk-space".to_string(),
                reasons: vec!["C617.1".to_string()],
            }])
        );
    }

    #[test]
    fn test_global_scoping_repeats_all_reasons() {
        let mut store = PrivacyStore::new();
        store.toggle_api_category("file-timestamp");
        store.toggle_api_category("user-defaults");
        store.toggle_api_usage_reason("dda9-1");
        store.toggle_api_usage_reason("c617-1");

        let manifest = Manifest::project(&store, &ManifestOptions::default());
        let api_types = manifest.accessed_api_types.unwrap();
        assert_eq!(api_types.len(), 2);
        for entry in api_types {
            assert_eq!(entry.reasons, vec!["DDA9.1", "C617.1"]);
        }
    }

    #[test]
    fn test_per_category_scoping_filters_reasons() {
        let mut store = PrivacyStore::new();
        store.toggle_api_category("file-timestamp");
        store.toggle_api_category("disk-space");
        store.toggle_api_usage_reason("c617-1");

        let options = ManifestOptions {
            reason_scoping: ReasonScoping::PerCategory,
            ..ManifestOptions::default()
        };
        let api_types = Manifest::project(&store, &options).accessed_api_types.unwrap();

        assert_eq!(api_types[0].api_type, "file-timestamp");
        assert_eq!(api_types[0].reasons, vec!["C617.1"]);
        assert_eq!(api_types[1].api_type, "disk-space");
        assert!(api_types[1].reasons.is_empty());

        let xml = Manifest::project(&store, &options).to_xml();
        assert!(xml.contains("<key>NSPrivacyAccessedAPITypeReasons</key>\n\t\t\t<array/>"));
    }

    #[test]
    fn test_collected_data_type_entry() {
        let mut store = PrivacyStore::new();
        let mut email = PrivacyDataType::new("Email address", "Contact Info");
        email.linked_to_identity = true;
        email.purposes = vec!["analytics".to_string()];
        let index = store.add_data_type(email);
        store.add_data_type(PrivacyDataType::new("Crash data", "Diagnostics"));
        store.toggle_data_type(index).unwrap();

        let manifest = Manifest::project(&store, &ManifestOptions::default());
        assert_eq!(
            manifest.collected_data_types,
            Some(vec![CollectedDataTypeEntry {
                data_type: "Email address".to_string(),
                linked: true,
                tracking: false,
                purposes: vec!["analytics".to_string()],
            }])
        );

        let xml = manifest.to_xml();
        assert!(xml.contains("<string>Email address</string>"));
        assert!(xml.contains("<key>NSPrivacyCollectedDataTypeLinked</key>\n\t\t\t<true/>"));
        assert!(xml.contains("<key>NSPrivacyCollectedDataTypeTracking</key>\n\t\t\t<false/>"));
        assert!(!xml.contains("Crash data"));
    }

    #[test]
    fn test_field_order() {
        let mut store = PrivacyStore::new();
        store.toggle_api_category("disk-space");
        let mut data_type = PrivacyDataType::new("User ID", "Identifiers");
        data_type.selected = true;
        store.add_data_type(data_type);
        store.add_tracking_domain("example.com");
        store.set_include_privacy_tracking(true);

        let xml = generate_xml(&store, &ManifestOptions::default());
        let positions: Vec<usize> = [
            "<key>NSPrivacyTracking</key>",
            "<key>NSPrivacyTrackingDomains</key>",
            "<key>NSPrivacyCollectedDataTypes</key>",
            "<key>NSPrivacyAccessedAPITypes</key>",
        ]
        .iter()
        .map(|key| xml.find(key).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_json_uses_manifest_keys() {
        let mut store = PrivacyStore::new();
        store.set_include_privacy_tracking(true);
        let manifest = Manifest::project(&store, &ManifestOptions::default());
        let json = serde_json::to_value(manifest).unwrap();
        assert_eq!(json, serde_json::json!({ "NSPrivacyTracking": true }));
    }

    fn json_keys(value: &serde_json::Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    fn plist_keys(value: &PlistValue) -> Vec<&str> {
        let PlistValue::Dict(entries) = value else {
            panic!("expected a dict, got {:?}", value);
        };
        let mut keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_json_and_plist_keys_agree() {
        let mut store = PrivacyStore::new();
        store.set_include_privacy_tracking(true);
        store.add_tracking_domain("example.com");
        store.toggle_api_category("file-timestamp");
        store.toggle_api_usage_reason("c617-1");
        let mut data_type = PrivacyDataType::new("User ID", "Identifiers");
        data_type.selected = true;
        store.add_data_type(data_type);

        let manifest = Manifest::project(&store, &ManifestOptions::default());
        let json = serde_json::to_value(&manifest).unwrap();
        let plist = manifest.to_plist();
        assert_eq!(json_keys(&json), plist_keys(&plist));

        let PlistValue::Dict(entries) = &plist else {
            unreachable!()
        };
        for (key, value) in entries {
            let PlistValue::Array(items) = value else {
                continue;
            };
            for (index, item) in items.iter().enumerate() {
                if let PlistValue::Dict(_) = item {
                    assert_eq!(json_keys(&json[key.as_str()][index]), plist_keys(item));
                }
            }
        }

        assert_eq!(
            json_keys(&json[KEY_ACCESSED_API_TYPES][0]),
            vec![KEY_API_TYPE, KEY_API_TYPE_REASONS]
        );
        assert_eq!(
            json_keys(&json[KEY_COLLECTED_DATA_TYPES][0]),
            vec![
                KEY_DATA_TYPE,
                KEY_DATA_TYPE_LINKED,
                KEY_DATA_TYPE_PURPOSES,
                KEY_DATA_TYPE_TRACKING,
            ]
        );
    }

    #[test]
    fn test_scoping_parse() {
        assert_eq!("per-category".parse::<ReasonScoping>().unwrap(), ReasonScoping::PerCategory);
        assert_eq!("GLOBAL".parse::<ReasonScoping>().unwrap(), ReasonScoping::Global);
        assert!("nope".parse::<ReasonScoping>().is_err());
    }
}
