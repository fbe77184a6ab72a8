use crate::error::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory holding published HTML pages, never scanned for documents
pub const BUILD_DIR: &str = "build";

/// Scanner for persisted path documents.
///
/// Recursively walks the documents directory and collects every `.json` file except the
/// reserved aggregate files (the merged bucket documents). Hidden directories and the
/// [`BUILD_DIR`] are skipped.
///
/// # Example
///
/// ```no_run
/// use openapi_dto::scanner::DocumentScanner;
/// use std::path::PathBuf;
///
/// let scanner = DocumentScanner::new(PathBuf::from("./docs"))
///     .with_reserved(vec!["public.json".to_string(), "private.json".to_string()]);
/// let result = scanner.scan().unwrap();
/// println!("Found {} documents", result.documents.len());
/// ```
pub struct DocumentScanner {
    root_path: PathBuf,
    reserved: Vec<String>,
}

/// Result of a directory scan
pub struct ScanResult {
    /// Discovered `.json` documents, in a stable order
    pub documents: Vec<PathBuf>,
    /// Issues encountered while walking (e.g. inaccessible directories)
    pub warnings: Vec<String>,
}

impl DocumentScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            reserved: Vec::new(),
        }
    }

    /// File names that are never reported.
    pub fn with_reserved(mut self, reserved: Vec<String>) -> Self {
        self.reserved = reserved;
        self
    }

    fn is_reserved(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.reserved.iter().any(|r| name == r.as_str()))
            .unwrap_or(false)
    }

    /// Walks the tree and collects the documents.
    ///
    /// Unreadable entries are recorded as warnings and the walk continues. A missing
    /// root directory yields an empty result.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut documents = Vec::new();
        let mut warnings = Vec::new();

        if !self.root_path.exists() {
            debug!("Documents directory does not exist: {}", self.root_path.display());
            return Ok(ScanResult { documents, warnings });
        }

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_build = e.depth() == 1 && e.file_type().is_dir() && file_name == BUILD_DIR;
                !is_hidden && !is_build
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if path.extension().and_then(|s| s.to_str()) != Some("json") {
                        debug!("Skipping non-JSON file: {}", path.display());
                        continue;
                    }
                    if self.is_reserved(path) {
                        debug!("Skipping reserved document: {}", path.display());
                        continue;
                    }
                    documents.push(path.to_path_buf());
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { documents, warnings })
    }
}
