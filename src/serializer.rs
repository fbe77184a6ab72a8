//! Serialization of generated documents to JSON or YAML.

use crate::error::Result;
use clap::ValueEnum;
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Output format of the merged artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    #[default]
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => serialize_json(value),
            OutputFormat::Yaml => serialize_yaml(value),
        }
    }
}

/// Serializes a document to YAML.
pub fn serialize_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    Ok(serde_yaml::to_string(value)?)
}

/// Serializes a document to pretty printed JSON.
///
/// Key order follows the declaration order of the serialized types.
pub fn serialize_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `content` to `path`, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::{DocumentRoot, OpenApiDocument, PathDocument};
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        DocumentRoot::new("Test API", "https://localhost/api").build(1, PathDocument::new())
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();
        assert!(yaml.contains("openapi: 3.0.0"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("1.0"));
        assert!(yaml.contains("paths: {}"));
    }

    #[test]
    fn test_serialize_json_keeps_root_key_order() {
        let json = serialize_json(&create_test_document()).unwrap();
        let positions: Vec<usize> = ["\"openapi\"", "\"info\"", "\"servers\"", "\"tags\"", "\"paths\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(json.lines().count() > 5);
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(OutputFormat::Yaml.extension(), "yaml");

        let doc = create_test_document();
        let yaml = OutputFormat::Yaml.serialize(&doc).unwrap();
        let parsed: OpenApiDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("v1").join("nested").join("public.json");

        write_to_file("{}", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");

        write_to_file("[]", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "[]");
    }
}
