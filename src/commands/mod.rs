//! CLI commands for privacy-manifest

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::catalog;
use crate::config::{load_config, save_config, Config, ConfigPaths};
use crate::manifest::{Manifest, ManifestOptions, ReasonScoping};
use crate::models::PrivacyDataType;
use crate::store::PrivacyStore;
use crate::validation::lint_selection;

/// Error parsing a `--collect` value
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataTypeSpecError {
    #[error("Data type name is empty")]
    EmptyName,

    #[error("Unknown data type flag '{0}'. Use: linked, tracking, purposes=a,b")]
    UnknownFlag(String),

    #[error("Unknown purpose '{0}'")]
    UnknownPurpose(String),
}

/// A data type given on the command line as `NAME[:linked][:tracking][:purposes=a,b]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeSpec {
    pub name: String,
    pub linked: bool,
    pub tracking: bool,
    pub purposes: Vec<String>,
}

impl std::str::FromStr for DataTypeSpec {
    type Err = DataTypeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(DataTypeSpecError::EmptyName);
        }

        let known_purposes = catalog::tracking_purposes();
        let mut spec = DataTypeSpec {
            name: name.to_string(),
            linked: false,
            tracking: false,
            purposes: Vec::new(),
        };

        for flag in parts.map(str::trim) {
            match flag {
                "linked" => spec.linked = true,
                "tracking" => spec.tracking = true,
                _ => {
                    let Some(list) = flag.strip_prefix("purposes=") else {
                        return Err(DataTypeSpecError::UnknownFlag(flag.to_string()));
                    };
                    for purpose in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        if !known_purposes.iter().any(|p| p.id == purpose) {
                            return Err(DataTypeSpecError::UnknownPurpose(purpose.to_string()));
                        }
                        if !spec.purposes.iter().any(|p| p == purpose) {
                            spec.purposes.push(purpose.to_string());
                        }
                    }
                }
            }
        }

        Ok(spec)
    }
}

impl DataTypeSpec {
    /// Build a selected data type, inferring the category from its name
    pub fn into_data_type(self) -> PrivacyDataType {
        let category = catalog::category_for(&self.name);
        let mut data_type = PrivacyDataType::new(self.name.clone(), category);
        data_type.selected = true;
        data_type.linked_to_identity = self.linked;
        data_type.collected_for_tracking = self.tracking;
        data_type.purposes = self.purposes;
        data_type
    }
}

/// Everything `generate` needs, already parsed
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub categories: Vec<String>,
    pub reasons: Vec<String>,
    pub tracking: bool,
    pub domains: Vec<String>,
    pub data_types: Vec<DataTypeSpec>,
    pub scoping: Option<ReasonScoping>,
    pub output: Option<PathBuf>,
    pub strict: bool,
    /// Emit the manifest as JSON keyed by the plist keys instead of XML
    pub json: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Summary,
}

/// Write the default config file
pub fn init() -> Result<()> {
    let paths = ConfigPaths::new()?;

    if paths.is_initialized() {
        println!("Config already exists at {}", paths.config.display());
        return Ok(());
    }

    paths.ensure_dirs()?;
    save_config(&paths, &Config::default())?;
    println!("Created {}", paths.config.display());
    Ok(())
}

/// Print the fixed catalogs
pub fn catalog(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "api_categories": catalog::api_categories(),
                "api_usage_reasons": catalog::api_usage_reasons(),
                "tracking_purposes": catalog::tracking_purposes(),
                "data_types": catalog::DATA_TYPE_GROUPS,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Summary => print_catalog_summary(),
    }
    Ok(())
}

fn print_catalog_summary() {
    println!("API categories:");
    for category in catalog::api_categories() {
        println!("  {:<20} {}", category.id, category.name);
    }

    println!();
    println!("Usage reasons:");
    for reason in catalog::api_usage_reasons() {
        let marker = if reason.third_party_only { " (third-party only)" } else { "" };
        println!("  {:<10} {:<8}{}", reason.id, reason.code, marker);
    }

    println!();
    println!("Tracking purposes:");
    for purpose in catalog::tracking_purposes() {
        println!("  {:<20} {}", purpose.id, purpose.name);
    }

    println!();
    println!("Data types:");
    for group in catalog::DATA_TYPE_GROUPS {
        println!("  {}: {}", group.category, group.items.join(", "));
    }
}

/// Build a store from a request; unknown ids are rejected here
pub fn build_store(request: &GenerateRequest) -> Result<PrivacyStore> {
    let mut store = PrivacyStore::new();

    for id in &request.categories {
        if !store.toggle_api_category(id) {
            bail!("Unknown API category: {}. Run `privacy-manifest catalog` to list them", id);
        }
    }
    for id in &request.reasons {
        if !store.toggle_api_usage_reason(id) {
            bail!("Unknown usage reason: {}. Run `privacy-manifest catalog` to list them", id);
        }
    }

    store.set_include_privacy_tracking(request.tracking);
    for domain in &request.domains {
        if !store.add_tracking_domain(domain.trim()) {
            warn!(domain = %domain, "skipping empty or duplicate tracking domain");
        }
    }

    for spec in &request.data_types {
        store.add_data_type(spec.clone().into_data_type());
    }

    Ok(store)
}

/// Generate a manifest from command-line selections
pub fn generate(request: GenerateRequest) -> Result<()> {
    let config = load_config(&ConfigPaths::new()?)?;
    let options = resolve_options(&config, request.scoping);

    let store = build_store(&request)?;

    let warnings = lint_selection(&store, &options);
    for warning in &warnings {
        warn!("{}", warning);
    }
    if request.strict && !warnings.is_empty() {
        bail!("Generation failed in strict mode due to {} warning(s)", warnings.len());
    }

    let manifest = Manifest::project(&store, &options);
    let rendered = render_manifest(&manifest, request.json)?;
    match request.output {
        Some(path) => write_manifest(&path, &rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Render a manifest as plist XML, or as pretty JSON when `json` is set
///
/// JSON output has no empty-state placeholder: an empty manifest is `{}`.
pub fn render_manifest(manifest: &Manifest, json: bool) -> Result<String> {
    if !json {
        return Ok(manifest.to_xml());
    }
    let mut out = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    out.push('\n');
    Ok(out)
}

/// Launch the interactive form
pub fn form(output: Option<PathBuf>, scoping: Option<ReasonScoping>) -> Result<()> {
    let config = load_config(&ConfigPaths::new()?)?;
    let options = resolve_options(&config, scoping);
    let output = output.unwrap_or_else(|| config.output.path.clone());

    let mut app = crate::tui::FormApp::new(PrivacyStore::new(), options, output);
    app.run()
}

/// Write the manifest, creating parent directories as needed
pub fn write_manifest(path: &Path, xml: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote privacy manifest");
    Ok(())
}

fn resolve_options(config: &Config, scoping: Option<ReasonScoping>) -> ManifestOptions {
    let mut options = config.manifest.clone();
    if let Some(scoping) = scoping {
        options.reason_scoping = scoping;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_name_only() {
        let spec: DataTypeSpec = "Crash data".parse().unwrap();
        assert_eq!(spec.name, "Crash data");
        assert!(!spec.linked);
        assert!(!spec.tracking);
        assert!(spec.purposes.is_empty());
    }

    #[test]
    fn test_parse_all_flags() {
        let spec: DataTypeSpec =
            "Email address:linked:tracking:purposes=analytics, app-functionality,analytics"
                .parse()
                .unwrap();
        assert!(spec.linked);
        assert!(spec.tracking);
        assert_eq!(spec.purposes, vec!["analytics", "app-functionality"]);

        let data_type = spec.into_data_type();
        assert_eq!(data_type.category, "Contact Info");
        assert!(data_type.selected);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<DataTypeSpec>(), Err(DataTypeSpecError::EmptyName));
        assert_eq!(
            "Name:sometimes".parse::<DataTypeSpec>(),
            Err(DataTypeSpecError::UnknownFlag("sometimes".to_string()))
        );
        assert_eq!(
            "Name:purposes=selling".parse::<DataTypeSpec>(),
            Err(DataTypeSpecError::UnknownPurpose("selling".to_string()))
        );
    }

    #[test]
    fn test_build_store_rejects_unknown_ids() {
        let request = GenerateRequest {
            categories: vec!["disk-space".to_string(), "camera".to_string()],
            ..GenerateRequest::default()
        };
        let err = build_store(&request).unwrap_err();
        assert!(err.to_string().contains("camera"));

        let request = GenerateRequest {
            reasons: vec!["zzzz-1".to_string()],
            ..GenerateRequest::default()
        };
        assert!(build_store(&request).is_err());
    }

    #[test]
    fn test_build_store_applies_selections() -> Result<()> {
        let request = GenerateRequest {
            categories: vec!["disk-space".to_string()],
            reasons: vec!["c617-1".to_string()],
            tracking: true,
            domains: vec!["example.com".to_string(), "example.com".to_string(), " ".to_string()],
            data_types: vec!["User ID:linked".parse()?],
            ..GenerateRequest::default()
        };
        let store = build_store(&request)?;

        assert_eq!(store.selected_api_categories().len(), 1);
        assert_eq!(store.selected_api_usage_reasons().len(), 1);
        assert!(store.include_privacy_tracking());
        assert_eq!(store.tracking_domains(), ["example.com"]);
        assert_eq!(store.selected_data_types()[0].category, "Identifiers");
        Ok(())
    }

    #[test]
    fn test_write_manifest_creates_parents() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("App/Resources/PrivacyInfo.xcprivacy");
        let xml = Manifest::default().to_xml();

        write_manifest(&path, &xml)?;
        assert_eq!(std::fs::read_to_string(&path)?, xml);
        Ok(())
    }

    #[test]
    fn test_render_json_uses_plist_keys() -> Result<()> {
        let request = GenerateRequest {
            categories: vec!["disk-space".to_string()],
            reasons: vec!["c617-1".to_string()],
            tracking: true,
            domains: vec!["example.com".to_string()],
            json: true,
            ..GenerateRequest::default()
        };
        let store = build_store(&request)?;
        let manifest = Manifest::project(&store, &ManifestOptions::default());

        let rendered = render_manifest(&manifest, request.json)?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;
        assert_eq!(
            value,
            serde_json::json!({
                "NSPrivacyTracking": true,
                "NSPrivacyTrackingDomains": ["example.com"],
                "NSPrivacyAccessedAPITypes": [{
                    "NSPrivacyAccessedAPIType": "disk-space",
                    "NSPrivacyAccessedAPITypeReasons": ["C617.1"],
                }],
            })
        );

        assert_eq!(render_manifest(&manifest, false)?, manifest.to_xml());
        assert_eq!(render_manifest(&Manifest::default(), true)?, "{}\n");
        Ok(())
    }

    #[test]
    fn test_flag_overrides_config_scoping() {
        let config = Config::default();
        assert_eq!(resolve_options(&config, None).reason_scoping, ReasonScoping::Global);
        assert_eq!(
            resolve_options(&config, Some(ReasonScoping::PerCategory)).reason_scoping,
            ReasonScoping::PerCategory
        );
    }
}
