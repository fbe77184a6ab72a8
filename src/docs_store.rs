//! Storage of generated documents on disk.
//!
//! Layout below the documents root:
//!
//! * `{group}.json` - path document of one route group, e.g. `v1/items.json`
//! * `v{N}/{bucket}.{json|yaml}` - merged document of one version and bucket
//! * `build/v{N}-{bucket}.html` - published HTML page

use crate::error::{Error, Result};
use crate::merger::{SaveStrategy, VersionHeap};
use crate::openapi_builder::{OpenApiDocument, PathDocument};
use crate::scanner::{DocumentScanner, BUILD_DIR};
use crate::serializer::{serialize_json, write_to_file, OutputFormat};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Marker replaced by the document JSON when publishing
pub const SPECS_MARKER: &str = "%%SPECS%%";

/// Documents directory
#[derive(Debug, Clone)]
pub struct DocsStore {
    root: PathBuf,
    build_dir: PathBuf,
    format: OutputFormat,
}

impl DocsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            build_dir: root.join(BUILD_DIR),
            root,
            format: OutputFormat::Json,
        }
    }

    /// Directory published pages are written to, `build/` below the root by default.
    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    /// Format of the merged documents written through [`SaveStrategy`].
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// File backing the document stored under `uri`.
    pub fn document_path(&self, uri: &str) -> PathBuf {
        self.root.join(format!("{}.json", uri.trim_matches('/')))
    }

    /// File of the merged document of one version and bucket.
    pub fn merged_path(&self, version: u32, bucket: &str) -> PathBuf {
        self.root
            .join(format!("v{}", version))
            .join(format!("{}.{}", bucket, self.format.extension()))
    }

    /// File the HTML page of one version and bucket is published to.
    pub fn page_path(&self, version: u32, bucket: &str) -> PathBuf {
        self.build_dir.join(format!("v{}-{}.html", version, bucket))
    }

    /// Stores the path document of a route group.
    pub fn save_paths(&self, group: &str, document: &PathDocument) -> Result<PathBuf> {
        self.save_document(group, document)
    }

    /// Stores any document as JSON under `uri`.
    pub fn save_document<T: Serialize + ?Sized>(&self, uri: &str, document: &T) -> Result<PathBuf> {
        let path = self.document_path(uri);
        write_to_file(&serialize_json(document)?, &path)?;
        debug!("Saved document {}", path.display());
        Ok(path)
    }

    /// Loads the JSON document stored under `uri`, `None` when there is none.
    pub fn load_document(&self, uri: &str) -> Result<Option<Value>> {
        let path = self.document_path(uri);
        let content = match read_optional(&path)? {
            Some(content) => content,
            None => return Ok(None),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::CorruptArtifact {
                file: path,
                message: e.to_string(),
            })
    }

    /// Loads the merged document of a version and bucket, read in the store's format.
    pub fn load_merged(&self, version: u32, bucket: &str) -> Result<Option<Value>> {
        let path = self.merged_path(version, bucket);
        let content = match read_optional(&path)? {
            Some(content) => content,
            None => return Ok(None),
        };

        let parsed = match self.format {
            OutputFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            OutputFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map(Some).map_err(|message| Error::CorruptArtifact { file: path, message })
    }

    /// Removes every generated document, keeping the published pages.
    pub fn delete_docs(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if entry.file_name() == BUILD_DIR {
                continue;
            }
            let path = entry.path();
            debug!("Deleting {}", path.display());
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Builds the version heap out of every stored path document.
    ///
    /// `reserved` file names (the merged bucket documents) are not read. A `.json` file
    /// that does not parse is a corrupt artifact; valid JSON that is not an object is
    /// skipped.
    pub fn load_heap(&self, reserved: &[String]) -> Result<VersionHeap> {
        let scan = DocumentScanner::new(self.root.clone())
            .with_reserved(reserved.to_vec())
            .scan()?;

        let mut heap = VersionHeap::new();
        for file in &scan.documents {
            let content = fs::read_to_string(file)?;
            let corrupt = |e: serde_json::Error| Error::CorruptArtifact {
                file: file.clone(),
                message: e.to_string(),
            };

            let document: Value = serde_json::from_str(&content).map_err(corrupt)?;
            if !document.is_object() {
                warn!("Skipping non-object document {}", file.display());
                continue;
            }
            let inserted = heap.insert_json(document).map_err(corrupt)?;
            debug!("Loaded {} paths from {}", inserted, file.display());
        }

        info!(
            "Loaded {} documents, latest version {:?}",
            scan.documents.len(),
            heap.latest_version()
        );
        Ok(heap)
    }

    /// Renders the stored merged document of a version and bucket into `template`
    /// and writes the page below `build/`.
    pub fn publish(&self, version: u32, bucket: &str, template: &str) -> Result<PathBuf> {
        let document = self.load_merged(version, bucket)?.ok_or_else(|| {
            Error::InvalidArgument(format!(
                "no merged document {}",
                self.merged_path(version, bucket).display()
            ))
        })?;

        let page = self.page_path(version, bucket);
        write_to_file(&render_html(template, &document)?, &page)?;
        info!("Published {}", page.display());
        Ok(page)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl SaveStrategy for DocsStore {
    fn save(&self, version: u32, bucket: &str, document: &OpenApiDocument) -> Result<()> {
        let path = self.merged_path(version, bucket);
        write_to_file(&self.format.serialize(document)?, &path)?;
        info!("Saved {}", path.display());
        Ok(())
    }
}

/// Replaces the [`SPECS_MARKER`] of `template` with the compact JSON of `document`.
pub fn render_html<T: Serialize + ?Sized>(template: &str, document: &T) -> Result<String> {
    if !template.contains(SPECS_MARKER) {
        warn!("Template has no {} marker", SPECS_MARKER);
    }
    Ok(template.replace(SPECS_MARKER, &serde_json::to_string(document)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::{DocumentRoot, Operation, PathItem};
    use crate::route::HttpMethod;
    use serde_json::json;
    use tempfile::TempDir;

    fn path_document(path: &str, tag: &str) -> PathDocument {
        let mut item = PathItem::default();
        item.set(
            HttpMethod::Get,
            Operation {
                summary: path.to_string(),
                tags: vec![tag.to_string()],
                ..Operation::default()
            },
        );
        let mut document = PathDocument::new();
        document.insert(path.to_string(), item);
        document
    }

    #[test]
    fn test_save_and_load_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path());

        let path = store
            .save_paths("v1/items", &path_document("/api/v1/items", "modifier.public"))
            .unwrap();
        assert_eq!(path, temp_dir.path().join("v1").join("items.json"));

        let loaded = store.load_document("v1/items").unwrap().unwrap();
        assert_eq!(loaded["/api/v1/items"]["get"]["summary"], json!("/api/v1/items"));
        assert!(store.load_document("v1/missing").unwrap().is_none());
    }

    #[test]
    fn test_load_document_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path());
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let err = store.load_document("broken").unwrap_err();
        assert!(matches!(err, Error::CorruptArtifact { .. }));
    }

    #[test]
    fn test_load_heap() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path());
        store
            .save_paths("v1/items", &path_document("/api/v1/items", "modifier.public"))
            .unwrap();
        store
            .save_paths("v2/items", &path_document("/api/v2/items", "modifier.private"))
            .unwrap();
        store.save_document("v1/list", &json!([1, 2, 3])).unwrap();
        store.save_document("v2/public", &json!({"openapi": "3.0.0"})).unwrap();

        let heap = store.load_heap(&["public.json".to_string()]).unwrap();
        assert_eq!(heap.versions().collect::<Vec<_>>(), vec![1, 2]);
        assert!(heap.paths(1).unwrap().contains_key("items"));
    }

    #[test]
    fn test_load_heap_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("v1")).unwrap();
        fs::write(temp_dir.path().join("v1").join("items.json"), "[1,").unwrap();

        let err = DocsStore::new(temp_dir.path()).load_heap(&[]).unwrap_err();
        match err {
            Error::CorruptArtifact { file, .. } => assert!(file.ends_with("items.json")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_delete_docs_keeps_build() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path());
        store
            .save_paths("v1/items", &path_document("/api/v1/items", "modifier.public"))
            .unwrap();
        store.save_document("index", &json!({})).unwrap();
        write_to_file("<html></html>", &store.page_path(1, "public")).unwrap();

        store.delete_docs().unwrap();
        assert!(!temp_dir.path().join("v1").exists());
        assert!(!temp_dir.path().join("index.json").exists());
        assert!(store.page_path(1, "public").exists());
    }

    #[test]
    fn test_save_strategy_and_publish() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path());
        let document = DocumentRoot::new("API", "https://localhost/api").build(2, PathDocument::new());

        store.save(2, "public", &document).unwrap();
        assert!(temp_dir.path().join("v2").join("public.json").exists());

        let page = store
            .publish(2, "public", "<script>const specs = %%SPECS%%;</script>")
            .unwrap();
        assert_eq!(page, temp_dir.path().join("build").join("v2-public.html"));
        let html = fs::read_to_string(page).unwrap();
        assert!(html.starts_with("<script>const specs = {\"openapi\":\"3.0.0\","));

        let err = store.publish(3, "public", "%%SPECS%%").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_yaml_save_strategy() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path()).with_format(OutputFormat::Yaml);
        let document = DocumentRoot::new("API", "https://localhost/api").build(1, PathDocument::new());

        store.save(1, "private", &document).unwrap();
        let content = fs::read_to_string(temp_dir.path().join("v1").join("private.yaml")).unwrap();
        assert!(content.starts_with("openapi: 3.0.0"));
    }

    #[test]
    fn test_publish_yaml_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path()).with_format(OutputFormat::Yaml);
        let document = DocumentRoot::new("API", "https://localhost/api").build(1, PathDocument::new());
        store.save(1, "public", &document).unwrap();
        assert!(!temp_dir.path().join("v1").join("public.json").exists());

        let loaded = store.load_merged(1, "public").unwrap().unwrap();
        assert_eq!(loaded["info"]["version"], json!("1.0"));

        let page = store.publish(1, "public", "%%SPECS%%").unwrap();
        let published: Value = serde_json::from_str(&fs::read_to_string(page).unwrap()).unwrap();
        assert_eq!(published, serde_json::to_value(&document).unwrap());

        // a JSON store does not pick up the YAML artifact
        let err = DocsStore::new(temp_dir.path()).publish(1, "public", "%%SPECS%%").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_load_merged_corrupt_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path()).with_format(OutputFormat::Yaml);
        write_to_file("openapi: [3.0", &store.merged_path(2, "public")).unwrap();

        let err = store.load_merged(2, "public").unwrap_err();
        assert!(matches!(err, Error::CorruptArtifact { .. }));
    }

    #[test]
    fn test_custom_build_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocsStore::new(temp_dir.path().join("docs"))
            .with_build_dir(temp_dir.path().join("site"));
        assert_eq!(
            store.page_path(1, "private"),
            temp_dir.path().join("site").join("v1-private.html")
        );
    }

    #[test]
    fn test_render_html() {
        let html = render_html("<div>%%SPECS%%</div>", &json!({"a": 1})).unwrap();
        assert_eq!(html, "<div>{\"a\":1}</div>");
    }
}
