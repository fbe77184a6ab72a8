//! Merging of per-version path documents into consolidated artifacts.
//!
//! Path documents are produced independently for every API version. The merger
//! overlays them in ascending version order: a later version replaces the shape of an
//! operation it redefines, every other operation seen so far is carried along. The
//! result is split into buckets according to the modifier tag of each operation.

use crate::contract::Modifier;
use crate::error::{Error, Result};
use crate::openapi_builder::{DocumentRoot, OpenApiDocument, Operation, PathDocument, PathItem};
use crate::route::{split_versioned_path, HttpMethod};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Marker identifying the modifier tag among an operation's tags
pub const MODIFIER_MARKER: &str = "modifier";

/// Merged documents keyed by bucket name
pub type MergedDocuments = IndexMap<String, OpenApiDocument>;

/// Version -> unversioned path -> path item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionHeap {
    versions: BTreeMap<u32, IndexMap<String, PathItem>>,
}

impl VersionHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the operations of `item` under `version` and the unversioned `path`.
    ///
    /// Operations already present for the same method are replaced, others are kept.
    pub fn insert(&mut self, version: u32, path: impl Into<String>, item: PathItem) {
        let entry = self
            .versions
            .entry(version)
            .or_default()
            .entry(path.into())
            .or_default();
        for (method, operation) in item.into_operations() {
            entry.set(method, operation);
        }
    }

    /// Adds every versioned path of a path document.
    ///
    /// Paths without a `/v{N}/` prefix are skipped.
    pub fn insert_document(&mut self, document: PathDocument) -> usize {
        let mut inserted = 0;
        for (path, item) in document {
            match split_versioned_path(&path) {
                Some((version, unversioned)) => {
                    self.insert(version, unversioned, item);
                    inserted += 1;
                }
                None => warn!("Skipping path without version prefix: {}", path),
            }
        }
        inserted
    }

    /// Adds a persisted path document given as raw JSON.
    ///
    /// Non-object documents and non-object path entries are skipped. An object entry
    /// that is not a valid path item is an error.
    pub fn insert_json(&mut self, document: Value) -> std::result::Result<usize, serde_json::Error> {
        let entries = match document {
            Value::Object(entries) => entries,
            _ => {
                debug!("Skipping non-object document");
                return Ok(0);
            }
        };

        let mut paths = PathDocument::new();
        for (path, entry) in entries {
            if !entry.is_object() {
                debug!("Skipping non-object entry for path {}", path);
                continue;
            }
            paths.insert(path, serde_json::from_value(entry)?);
        }
        Ok(self.insert_document(paths))
    }

    pub fn latest_version(&self) -> Option<u32> {
        self.versions.keys().next_back().copied()
    }

    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.versions.keys().copied()
    }

    pub fn paths(&self, version: u32) -> Option<&IndexMap<String, PathItem>> {
        self.versions.get(&version)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Decides which bucket an operation is published into
pub trait MergeStrategy {
    /// Every bucket the strategy emits, in output order.
    fn buckets(&self) -> Vec<String>;

    /// The bucket for a modifier tag, or `None` to drop the operation.
    fn bucket_for(&self, modifier_tag: &str) -> Option<String>;
}

/// Receives every merged bucket document
pub trait SaveStrategy {
    fn save(&self, version: u32, bucket: &str, document: &OpenApiDocument) -> Result<()>;
}

impl<F> SaveStrategy for F
where
    F: Fn(u32, &str, &OpenApiDocument) -> Result<()>,
{
    fn save(&self, version: u32, bucket: &str, document: &OpenApiDocument) -> Result<()> {
        self(version, bucket, document)
    }
}

/// `modifier.public` -> `public`, `modifier.private` -> `private`, `modifier.skip` is dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierStrategy;

impl ModifierStrategy {
    pub const PUBLIC: &'static str = "public";
    pub const PRIVATE: &'static str = "private";
}

impl MergeStrategy for ModifierStrategy {
    fn buckets(&self) -> Vec<String> {
        vec![Self::PUBLIC.to_string(), Self::PRIVATE.to_string()]
    }

    fn bucket_for(&self, modifier_tag: &str) -> Option<String> {
        match Modifier::from_tag(modifier_tag)? {
            Modifier::Public => Some(Self::PUBLIC.to_string()),
            Modifier::Private => Some(Self::PRIVATE.to_string()),
            Modifier::Skip => None,
        }
    }
}

/// Operation kept for a path and method, with the version that last wrote it
type Accumulator = IndexMap<String, BTreeMap<HttpMethod, (u32, Operation)>>;

/// Merges a [`VersionHeap`] into bucket documents
pub struct VersionMerger<'a> {
    heap: VersionHeap,
    root: DocumentRoot,
    strategy: Option<Box<dyn MergeStrategy + 'a>>,
    saver: Option<Box<dyn SaveStrategy + 'a>>,
}

impl<'a> VersionMerger<'a> {
    pub fn new(heap: VersionHeap, root: DocumentRoot) -> Self {
        Self {
            heap,
            root,
            strategy: None,
            saver: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl MergeStrategy + 'a) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    pub fn with_saver(mut self, saver: impl SaveStrategy + 'a) -> Self {
        self.saver = Some(Box::new(saver));
        self
    }

    pub fn heap(&self) -> &VersionHeap {
        &self.heap
    }

    pub fn root(&self) -> &DocumentRoot {
        &self.root
    }

    pub fn latest_version(&self) -> Option<u32> {
        self.heap.latest_version()
    }

    fn strategy(&self) -> Result<&(dyn MergeStrategy + 'a)> {
        self.strategy
            .as_deref()
            .ok_or_else(|| Error::MergeConfiguration("no merge strategy configured".to_string()))
    }

    fn saver(&self) -> Result<&(dyn SaveStrategy + 'a)> {
        self.saver
            .as_deref()
            .ok_or_else(|| Error::MergeConfiguration("no save strategy configured".to_string()))
    }

    /// Merges every version up to and including `target`.
    pub fn merge(&self, target: u32) -> Result<MergedDocuments> {
        let strategy = self.strategy()?;
        if target == 0 {
            return Err(Error::InvalidArgument(
                "version must be a positive integer".to_string(),
            ));
        }

        let mut accumulators: IndexMap<String, Accumulator> = strategy
            .buckets()
            .into_iter()
            .map(|bucket| (bucket, Accumulator::new()))
            .collect();
        let mut dropped = 0;

        for (&version, paths) in &self.heap.versions {
            if version > target {
                break;
            }
            debug!("Merging version {} into target {}", version, target);

            for (path, item) in paths {
                for (method, operation) in item.operations() {
                    let Some(index) = Self::modifier_tag_index(operation) else {
                        dropped += 1;
                        continue;
                    };
                    let Some(bucket) = strategy.bucket_for(&operation.tags[index]) else {
                        dropped += 1;
                        continue;
                    };
                    let Some(accumulator) = accumulators.get_mut(&bucket) else {
                        warn!("Strategy returned unknown bucket {}", bucket);
                        continue;
                    };

                    let mut operation = operation.clone();
                    operation.tags.remove(index);
                    accumulator
                        .entry(path.clone())
                        .or_default()
                        .insert(method, (version, operation));
                }
            }
        }

        if dropped > 0 {
            debug!("Dropped {} operations without a published modifier", dropped);
        }

        let documents: MergedDocuments = accumulators
            .into_iter()
            .map(|(bucket, accumulator)| {
                let document = self.root.build(target, Self::emit_paths(accumulator));
                (bucket, document)
            })
            .collect();

        info!("Merged version {} into {} documents", target, documents.len());
        Ok(documents)
    }

    /// Merges up to `target` and hands every bucket to the save strategy.
    pub fn merge_and_save(&self, target: u32) -> Result<MergedDocuments> {
        let saver = self.saver()?;
        let documents = self.merge(target)?;
        for (bucket, document) in &documents {
            saver.save(target, bucket, document)?;
        }
        Ok(documents)
    }

    /// Merges and saves every version from 1 to `latest`.
    pub fn merge_all(&self, latest: u32) -> Result<()> {
        self.strategy()?;
        self.saver()?;
        for version in 1..=latest {
            self.merge_and_save(version)?;
        }
        Ok(())
    }

    /// Position of the modifier tag.
    ///
    /// The builder appends the modifier after the declared tags, so the last tag carrying
    /// the marker wins over a declared tag that merely contains it.
    fn modifier_tag_index(operation: &Operation) -> Option<usize> {
        operation
            .tags
            .iter()
            .rposition(|tag| tag.contains(MODIFIER_MARKER))
    }

    fn emit_paths(accumulator: Accumulator) -> PathDocument {
        let mut paths = PathDocument::new();
        for (path, methods) in accumulator {
            for (method, (version, operation)) in methods {
                paths
                    .entry(format!("/v{}/{}", version, path.trim_start_matches('/')))
                    .or_default()
                    .set(method, operation);
            }
        }
        paths
    }
}

/// Number of operations per bucket, used in log output.
pub fn operation_counts(documents: &MergedDocuments) -> HashMap<&str, usize> {
    documents
        .iter()
        .map(|(bucket, document)| {
            let count = document.paths.values().map(|item| item.operations().count()).sum();
            (bucket.as_str(), count)
        })
        .collect()
}
