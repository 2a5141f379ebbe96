//! Lint checks for privacy selections
//!
//! These are advisory only. Nothing here checks the output against Apple's
//! plist schema.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::manifest::{ManifestOptions, ReasonScoping};
use crate::store::PrivacyStore;

static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?i)[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?",
        r"(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$",
    ))
    .expect("hostname pattern is valid")
});

/// Check for common selection issues (lint-like checks)
pub fn lint_selection(store: &PrivacyStore, options: &ManifestOptions) -> Vec<String> {
    let mut warnings = Vec::new();

    let categories = store.selected_api_categories();
    let reasons = store.selected_api_usage_reasons();

    for reason in &reasons {
        if reason.third_party_only {
            warnings.push(format!(
                "{}: Reason may only be declared by third-party SDKs",
                reason.code
            ));
        }
    }

    if !categories.is_empty() && reasons.is_empty() {
        warnings.push("API categories selected but no usage reasons selected".to_string());
    }
    if categories.is_empty() && !reasons.is_empty() {
        warnings.push("Usage reasons selected but no API category selected".to_string());
    }

    if options.reason_scoping == ReasonScoping::PerCategory && !reasons.is_empty() {
        for category in &categories {
            let allowed = options.category_reasons.get(&category.id);
            let covered = reasons
                .iter()
                .any(|r| allowed.is_some_and(|codes| codes.contains(&r.code)));
            if !covered {
                warnings.push(format!(
                    "{}: No selected reason applies to this category",
                    category.id
                ));
            }
        }
    }

    if store.include_privacy_tracking() && store.tracking_domains().is_empty() {
        warnings.push("Tracking enabled but no tracking domains declared".to_string());
    }
    if !store.include_privacy_tracking() && !store.tracking_domains().is_empty() {
        warnings.push("Tracking domains declared but tracking is disabled".to_string());
    }

    for domain in store.tracking_domains() {
        if !HOSTNAME.is_match(domain) {
            warnings.push(format!("{}: Does not look like a domain name", domain));
        }
    }

    for data_type in store.selected_data_types() {
        if data_type.purposes.is_empty() {
            warnings.push(format!("{}: No purposes declared", data_type.name));
        }
        if data_type.collected_for_tracking && !store.include_privacy_tracking() {
            warnings.push(format!(
                "{}: Used for tracking but tracking is disabled",
                data_type.name
            ));
        }
    }

    warnings
}
