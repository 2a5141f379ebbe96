// Integration tests for the selection -> manifest flow
// Drives the store through the public API and checks the generated plist

use anyhow::Result;
use privacy_manifest::commands::{build_store, write_manifest, GenerateRequest};
use privacy_manifest::config::{load_config_from, Config};
use privacy_manifest::manifest::{generate_xml, Manifest, ManifestOptions, ReasonScoping};
use privacy_manifest::models::{DataTypeUpdate, PrivacyDataType};
use privacy_manifest::plist::{DOCTYPE, XML_DECLARATION};
use privacy_manifest::store::{PrivacyStore, StoreError};
use tempfile::TempDir;

const EMPTY_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>NSPrivacyCollectedDataTypes</key>
	<array/>
</dict>
</plist>
"#;

fn email_address() -> PrivacyDataType {
    let mut data_type = PrivacyDataType::new("Email address", "Contact Info");
    data_type.linked_to_identity = true;
    data_type.collected_for_tracking = false;
    data_type.purposes = vec!["analytics".to_string()];
    data_type
}

#[test]
fn test_empty_store_generates_placeholder() {
    let store = PrivacyStore::new();
    assert_eq!(generate_xml(&store, &ManifestOptions::default()), EMPTY_MANIFEST);
}

#[test]
fn test_document_header_is_fixed() {
    let mut store = PrivacyStore::new();
    store.set_include_privacy_tracking(true);
    let xml = generate_xml(&store, &ManifestOptions::default());

    let mut lines = xml.lines();
    assert_eq!(lines.next(), Some(XML_DECLARATION));
    assert_eq!(lines.next(), Some(DOCTYPE));
    assert_eq!(lines.next(), Some("<plist version=\"1.0\">"));
    assert_eq!(lines.next(), Some("<dict>"));
    assert!(xml.ends_with("</dict>\n</plist>\n"));
}

#[test]
fn test_full_manifest() {
    let mut store = PrivacyStore::new();
    store.set_include_privacy_tracking(true);
    store.add_tracking_domain("example.com");
    let index = store.add_data_type(email_address());
    store.update_data_type(index, DataTypeUpdate::selected(true)).unwrap();
    store.toggle_api_category("disk-space");
    store.toggle_api_usage_reason("c617-1");

    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>NSPrivacyTracking</key>
	<true/>
	<key>NSPrivacyTrackingDomains</key>
	<array>
		<string>example.com</string>
	</array>
	<key>NSPrivacyCollectedDataTypes</key>
	<array>
		<dict>
			<key>NSPrivacyCollectedDataType</key>
			<string>Email address</string>
			<key>NSPrivacyCollectedDataTypeLinked</key>
			<true/>
			<key>NSPrivacyCollectedDataTypeTracking</key>
			<false/>
			<key>NSPrivacyCollectedDataTypePurposes</key>
			<array>
				<string>analytics</string>
			</array>
		</dict>
	</array>
	<key>NSPrivacyAccessedAPITypes</key>
	<array>
		<dict>
			<key>NSPrivacyAccessedAPIType</key>
			<string>disk-space</string>
			<key>NSPrivacyAccessedAPITypeReasons</key>
			<array>
				<string>C617.1</string>
			</array>
		</dict>
	</array>
</dict>
</plist>
"#;
    assert_eq!(generate_xml(&store, &ManifestOptions::default()), expected);
}

#[test]
fn test_projection_follows_later_mutations() {
    let mut store = PrivacyStore::new();
    store.add_data_type(email_address());
    store.toggle_data_type(0).unwrap();
    assert!(Manifest::project(&store, &ManifestOptions::default())
        .collected_data_types
        .is_some());

    store.remove_data_type(0).unwrap();
    let manifest = Manifest::project(&store, &ManifestOptions::default());
    assert!(manifest.is_empty());
    assert_eq!(manifest.to_xml(), EMPTY_MANIFEST);
}

#[test]
fn test_out_of_range_is_typed_error() {
    let mut store = PrivacyStore::new();
    let err = store.remove_data_type(0).unwrap_err();
    assert_eq!(
        err,
        StoreError::IndexOutOfRange {
            collection: "collected_data_types",
            index: 0,
            len: 0,
        }
    );
    assert_eq!(err.to_string(), "collected_data_types index 0 out of range (len 0)");
}

#[test]
fn test_request_with_per_category_config() -> Result<()> {
    let temp = TempDir::new()?;
    let config_path = temp.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[manifest]
reason_scoping = "per-category"

[manifest.category_reasons]
file-timestamp = ["C617.1"]
disk-space = ["C617.1", "DDA9.1"]
"#,
    )?;
    let config: Config = load_config_from(&config_path)?;
    assert_eq!(config.manifest.reason_scoping, ReasonScoping::PerCategory);

    let request = GenerateRequest {
        categories: vec!["file-timestamp".to_string(), "disk-space".to_string()],
        reasons: vec!["dda9-1".to_string(), "c617-1".to_string()],
        ..GenerateRequest::default()
    };
    let store = build_store(&request)?;
    let api_types = Manifest::project(&store, &config.manifest)
        .accessed_api_types
        .unwrap();

    assert_eq!(api_types[0].reasons, vec!["C617.1"]);
    assert_eq!(api_types[1].reasons, vec!["DDA9.1", "C617.1"]);

    let output = temp.path().join("PrivacyInfo.xcprivacy");
    write_manifest(&output, &Manifest::project(&store, &config.manifest).to_xml())?;
    assert!(std::fs::read_to_string(&output)?.contains("<string>disk-space</string>"));
    Ok(())
}
