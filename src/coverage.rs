//! Documentation coverage of the routes of one API version.
//!
//! Every route of the version lands in exactly one class:
//!
//! * documented - both contracts are attached and the stored path document of the
//!   route group holds the route's path and method
//! * annotated - both contracts are attached but nothing was generated for it yet
//! * missing - the request or the response contract is absent

use crate::docs_store::DocsStore;
use crate::error::{Error, Result};
use crate::route::{group_key, routes_for_version, HttpMethod, RouteSpec};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// A route identified by its documented path and method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRef {
    pub path: String,
    pub method: HttpMethod,
}

impl RouteRef {
    fn of(route: &RouteSpec) -> Self {
        Self {
            path: route.docs_path(),
            method: route.method,
        }
    }
}

impl fmt::Display for RouteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.method, self.path)
    }
}

/// Coverage report of one version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub version: u32,
    pub documented: Vec<RouteRef>,
    pub annotated: Vec<RouteRef>,
    pub missing: Vec<RouteRef>,
}

impl Coverage {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.documented.len() + self.annotated.len() + self.missing.len()
    }

    /// True when no route of the version lacks its contracts.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Fails with the missing routes listed when the coverage is not complete.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        let routes: Vec<String> = self.missing.iter().map(ToString::to_string).collect();
        Err(Error::InvalidArgument(format!(
            "v{} has {} routes without contracts: {}",
            self.version,
            self.missing.len(),
            routes.join(", ")
        )))
    }

    fn percent(&self, count: usize) -> usize {
        match self.total() {
            0 => 0,
            total => (count * 100 + total / 2) / total,
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{}: documented {} ({}%), annotated {} ({}%), missing {} ({}%)",
            self.version,
            self.documented.len(),
            self.percent(self.documented.len()),
            self.annotated.len(),
            self.percent(self.annotated.len()),
            self.missing.len(),
            self.percent(self.missing.len()),
        )
    }
}

/// Classifies every route of `version` against the path documents held by `store`.
pub fn check_coverage(routes: &[RouteSpec], store: &DocsStore, version: u32) -> Result<Coverage> {
    let mut coverage = Coverage::new(version);
    let mut documents: HashMap<String, Option<Value>> = HashMap::new();

    for route in routes_for_version(routes, version) {
        let entry = RouteRef::of(route);
        if route.request.is_none() || route.response.is_none() {
            warn!("{} route is not annotated", entry);
            coverage.missing.push(entry);
            continue;
        }

        let document = match documents.entry(group_key(&route.uri)) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let loaded = store.load_document(slot.key())?;
                debug!("Loaded group {} (found: {})", slot.key(), loaded.is_some());
                slot.insert(loaded)
            }
        };

        let generated = document
            .as_ref()
            .and_then(|document| document.get(&entry.path))
            .and_then(|item| item.get(entry.method.as_str()))
            .is_some();
        if generated {
            coverage.documented.push(entry);
        } else {
            coverage.annotated.push(entry);
        }
    }

    info!("{}", coverage);
    Ok(coverage)
}
