use std::path::Path;

use tracing::{debug, warn};

use crate::errors::PocForgeError;
use super::env::resolve_env_references;
use super::schema::CONFIG_SCHEMA;
use super::types::{ClientConfig, PocForgeConfig, API_BASE_ENV};

const MAX_CONFIG_BYTES: u64 = 1_048_576;
const MAX_PAGE_SIZE: usize = 1000;

pub async fn parse_config(path: &Path) -> Result<PocForgeConfig, PocForgeError> {
    if !path.exists() {
        return Err(PocForgeError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(PocForgeError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let mut yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;
    if yaml.is_null() {
        yaml = serde_yaml::Value::Mapping(Default::default());
    }

    resolve_env_references(&mut yaml);

    // JSON Schema validation
    validate_schema(&yaml)?;

    let config: PocForgeConfig = serde_yaml::from_value(yaml)?;

    validate_semantics(&config)?;

    Ok(config)
}

/// Build the effective settings: file (if any), then `POCFORGE_API_BASE`,
/// then an explicit `--api-base`.
pub async fn load_config(
    path: Option<&Path>,
    api_base_override: Option<&str>,
) -> Result<ClientConfig, PocForgeError> {
    let file = match path {
        Some(p) => parse_config(p).await?,
        None => PocForgeConfig::default(),
    };
    let mut config = ClientConfig::from_file_config(&file);

    if let Ok(base) = std::env::var(API_BASE_ENV) {
        if !base.trim().is_empty() {
            debug!(base = %base, "API base from environment");
            config.base_url = base;
        }
    }
    if let Some(base) = api_base_override.filter(|b| !b.trim().is_empty()) {
        config.base_url = base.to_string();
    }

    check_base_url(&config.base_url)?;
    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), PocForgeError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| PocForgeError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| PocForgeError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        // Advisory only
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

fn validate_semantics(config: &PocForgeConfig) -> Result<(), PocForgeError> {
    if let Some(size) = config.library.as_ref().and_then(|l| l.page_size) {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PocForgeError::Config(format!(
                "library.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }
    }
    if let Some(base) = config.api.as_ref().and_then(|a| a.base_url.as_deref()) {
        check_base_url(base)?;
    }
    Ok(())
}

fn check_base_url(base: &str) -> Result<(), PocForgeError> {
    let base = base.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(PocForgeError::Config(format!(
            "API base URL must start with http:// or https://: '{}'",
            base
        )));
    }
    Ok(())
}
