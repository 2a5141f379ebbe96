//! Seed catalogs for the privacy form
//!
//! These lists are fixed: the store is seeded from them once and never adds
//! or removes entries, it only flips `selected`.

use crate::models::{ApiCategory, ApiUsageReason, DataTypeGroup, TrackingPurpose};

/// Category used when a data type name is not in any known group
pub const OTHER_CATEGORY: &str = "Other";

const API_CATEGORIES: &[(&str, &str)] = &[
    ("file-timestamp", "File timestamp APIs"),
    ("system-boot-time", "System boot time APIs"),
    ("disk-space", "Disk space APIs"),
    ("active-keyboard", "Active keyboard APIs"),
    ("user-defaults", "User Defaults APIs"),
];

// (id, code, description, third_party_only)
const API_USAGE_REASONS: &[(&str, &str, &str, bool)] = &[
    (
        "dda9-1",
        "DDA9.1",
        "Declare this reason to display file timestamps to the person using the device. \
         Information accessed for this reason, or any derived information, may not be sent \
         off-device.",
        false,
    ),
    (
        "c617-1",
        "C617.1",
        "Declare this reason to access the timestamps, size, or other metadata of files inside \
         the app container, app group container, or the app's CloudKit container.",
        false,
    ),
    (
        "3b52-1",
        "3B52.1",
        "Declare this reason to access the timestamps, size, or other metadata of files or \
         directories that the user specifically granted access to, such as using a document \
         picker view controller.",
        false,
    ),
    (
        "0a2a-1",
        "0A2A.1",
        "Declare this reason if your third-party SDK is providing a wrapper function around file \
         timestamp API(s) for the app to use, and you only access the file timestamp APIs when \
         the app calls your wrapper function. This reason may only be declared by third-party \
         SDKs.",
        true,
    ),
];

const TRACKING_PURPOSES: &[(&str, &str)] = &[
    ("3rd-party-ads", "3rd party ads"),
    ("developer-ads", "Developer ads"),
    ("analytics", "Analytics"),
    ("personalization", "Personalization"),
    ("app-functionality", "App functionality"),
    ("other", "Other"),
];

/// Well-known data types, grouped by category
pub const DATA_TYPE_GROUPS: &[DataTypeGroup] = &[
    DataTypeGroup {
        category: "Contact Info",
        items: &[
            "Name",
            "Email address",
            "Phone number",
            "Physical address",
            "Other user contact info",
        ],
    },
    DataTypeGroup { category: "Health & Fitness", items: &["Health", "Fitness"] },
    DataTypeGroup {
        category: "Financial Info",
        items: &["Payment info", "Credit info", "Other financial info"],
    },
    DataTypeGroup { category: "Location", items: &["Precise location", "Coarse location"] },
    DataTypeGroup { category: "Sensitive Info", items: &["Sensitive info"] },
    DataTypeGroup { category: "Contacts", items: &["Contacts"] },
    DataTypeGroup {
        category: "User Content",
        items: &[
            "Emails or text messages",
            "Photos or videos",
            "Audio data",
            "Gameplay content",
            "Customer support",
            "Other user content",
        ],
    },
    DataTypeGroup { category: "Browsing History", items: &["Browsing history"] },
    DataTypeGroup { category: "Search History", items: &["Search history"] },
    DataTypeGroup { category: "Identifiers", items: &["User ID", "Device ID"] },
    DataTypeGroup { category: "Purchases", items: &["Purchase history"] },
    DataTypeGroup {
        category: "Usage Data",
        items: &["Product interaction", "Advertising data", "Other usage data"],
    },
    DataTypeGroup {
        category: "Diagnostics",
        items: &["Crash data", "Performance data", "Other diagnostic data"],
    },
    DataTypeGroup { category: "Surroundings", items: &["Environment scanning"] },
    DataTypeGroup { category: "Body", items: &["Hands", "Head"] },
    DataTypeGroup { category: OTHER_CATEGORY, items: &["Other data types"] },
];

pub fn api_categories() -> Vec<ApiCategory> {
    API_CATEGORIES
        .iter()
        .map(|(id, name)| ApiCategory {
            id: id.to_string(),
            name: name.to_string(),
            selected: false,
        })
        .collect()
}

pub fn api_usage_reasons() -> Vec<ApiUsageReason> {
    API_USAGE_REASONS
        .iter()
        .map(|(id, code, description, third_party_only)| ApiUsageReason {
            id: id.to_string(),
            code: code.to_string(),
            description: description.to_string(),
            selected: false,
            third_party_only: *third_party_only,
        })
        .collect()
}

pub fn tracking_purposes() -> Vec<TrackingPurpose> {
    TRACKING_PURPOSES
        .iter()
        .map(|(id, name)| TrackingPurpose {
            id: id.to_string(),
            name: name.to_string(),
            selected: false,
        })
        .collect()
}

/// Find the category a data type name belongs to (case-insensitive)
///
/// Unknown names land in [`OTHER_CATEGORY`].
pub fn category_for(name: &str) -> &'static str {
    DATA_TYPE_GROUPS
        .iter()
        .find(|group| group.items.iter().any(|item| item.eq_ignore_ascii_case(name)))
        .map(|group| group.category)
        .unwrap_or(OTHER_CATEGORY)
}

/// Default reason codes per API category, used by per-category scoping
///
/// Only the file timestamp family has reasons in the seed catalog.
pub fn default_category_reasons() -> std::collections::BTreeMap<String, Vec<String>> {
    let mut map = std::collections::BTreeMap::new();
    map.insert(
        "file-timestamp".to_string(),
        API_USAGE_REASONS
            .iter()
            .map(|(_, code, _, _)| code.to_string())
            .collect(),
    );
    map
}
