//! Serialization of the extraction result to YAML or JSON.

use crate::model::Extraction;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an extraction result to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(extraction: &Extraction) -> Result<String> {
    debug!("Serializing extraction result to YAML");
    serde_yaml::to_string(extraction).context("Failed to serialize extraction result to YAML")
}

/// Serializes an extraction result to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(extraction: &Extraction) -> Result<String> {
    debug!("Serializing extraction result to JSON");
    serde_json::to_string_pretty(extraction)
        .context("Failed to serialize extraction result to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiModel, App, Diagnostic};
    use tempfile::TempDir;

    fn sample() -> Extraction {
        Extraction {
            model: ApiModel {
                project: "Test API".to_string(),
                version: "1.0.0".to_string(),
                apps: vec![App {
                    name: "products".to_string(),
                    path: "products".to_string(),
                    serializers: vec![],
                    endpoints: vec![],
                }],
            },
            diagnostics: vec![Diagnostic::warning("scanner", "something odd")],
        }
    }

    #[test]
    fn test_yaml_output_shape() {
        let yaml = serialize_yaml(&sample()).unwrap();
        assert!(yaml.contains("project: Test API"));
        assert!(yaml.contains("name: products"));
        assert!(yaml.contains("severity: warning"));
    }

    #[test]
    fn test_json_output_shape() {
        let json = serialize_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["model"]["project"], "Test API");
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/out/model.yaml");
        write_to_file("content", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let a = serialize_yaml(&sample()).unwrap();
        let b = serialize_yaml(&sample()).unwrap();
        assert_eq!(a, b);
    }
}
