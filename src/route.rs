//! Routes as handed over by the host application.
//!
//! Discovering routes and resolving the contracts attached to them belongs to the host
//! (web framework, reflection, annotations...). This module only describes the result
//! of that lookup and provides the pure helpers used to group routes and to split
//! versioned paths.
//!
//! # Example
//!
//! ```
//! use openapi_dto::route::{group_key, split_versioned_path};
//!
//! assert_eq!(group_key("api/v1/items/{id}"), "v1/items");
//! assert_eq!(
//!     split_versioned_path("/api/v2/items/{id}"),
//!     Some((2, "items/{id}".to_string()))
//! );
//! ```

use crate::contract::{RequestDefinition, ResponseDefinition};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static PATH_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\{\w*\??\}").expect("Invalid regex"));
static VERSIONED_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/?(?:api/)?v(\d+)/(.+)$").expect("Invalid regex"));

/// HTTP methods an operation can be documented for.
///
/// Serialized in lowercase, which is also the key used inside a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }

    pub fn parse(method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(method))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// One route with the contracts the host resolved for it.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    /// Route uri without leading slash, e.g. `api/v1/items/{id}`
    pub uri: String,
    pub method: HttpMethod,
    pub request: Option<RequestDefinition>,
    pub response: Option<ResponseDefinition>,
}

impl RouteSpec {
    pub fn new(uri: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            uri: uri.into(),
            method,
            request: None,
            response: None,
        }
    }

    pub fn with_contracts(mut self, request: RequestDefinition, response: ResponseDefinition) -> Self {
        self.request = Some(request);
        self.response = Some(response);
        self
    }

    /// The path the route is documented under.
    pub fn docs_path(&self) -> String {
        format!("/{}", self.uri.trim_start_matches('/'))
    }
}

/// Key under which the path document of a route is stored.
///
/// Drops a leading `api` segment and every `{parameter}` segment.
pub fn group_key(uri: &str) -> String {
    let uri = uri.trim_start_matches('/');
    let uri = uri.strip_prefix("api/").unwrap_or(uri);
    let uri = PATH_PARAMETER.replace_all(uri, "");
    uri.trim_matches('/').to_string()
}

/// Groups routes by [`group_key`], keeping the order groups are first seen in.
pub fn group_routes(routes: &[RouteSpec]) -> IndexMap<String, Vec<&RouteSpec>> {
    let mut groups: IndexMap<String, Vec<&RouteSpec>> = IndexMap::new();
    for route in routes {
        groups.entry(group_key(&route.uri)).or_default().push(route);
    }
    groups
}

/// Routes that belong to the given API version.
pub fn routes_for_version(routes: &[RouteSpec], version: u32) -> Vec<&RouteSpec> {
    let marker = format!("api/v{}/", version);
    routes
        .iter()
        .filter(|route| format!("{}/", route.uri.trim_start_matches('/')).starts_with(&marker))
        .collect()
}

/// Splits `/api/v{N}/{rest}` (the `api` segment is optional) into `N` and `{rest}`.
///
/// Versions are positive, `v0` is not a version prefix.
pub fn split_versioned_path(path: &str) -> Option<(u32, String)> {
    let captures = VERSIONED_PATH.captures(path)?;
    let version = captures.get(1)?.as_str().parse().ok().filter(|v: &u32| *v > 0)?;
    Some((version, captures.get(2)?.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_strings() {
        assert_eq!(HttpMethod::Delete.as_str(), "delete");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("trace"), None);
        assert_eq!(serde_json::to_string(&HttpMethod::Options).unwrap(), "\"options\"");
    }

    #[test]
    fn test_group_key() {
        assert_eq!(group_key("api/v1/items"), "v1/items");
        assert_eq!(group_key("api/v1/items/{id}"), "v1/items");
        assert_eq!(group_key("/api/v2/items/{id}/lines/{line?}"), "v2/items/lines");
        assert_eq!(group_key("health"), "health");
    }

    #[test]
    fn test_group_routes() {
        let routes = vec![
            RouteSpec::new("api/v1/items", HttpMethod::Get),
            RouteSpec::new("api/v1/users", HttpMethod::Get),
            RouteSpec::new("api/v1/items/{id}", HttpMethod::Delete),
        ];
        let groups = group_routes(&routes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["v1/items"].len(), 2);
        assert_eq!(groups.keys().next().unwrap(), "v1/items");
    }

    #[test]
    fn test_routes_for_version() {
        let routes = vec![
            RouteSpec::new("api/v1/items", HttpMethod::Get),
            RouteSpec::new("api/v12/items", HttpMethod::Get),
            RouteSpec::new("api/v2/items", HttpMethod::Get),
        ];
        let v1 = routes_for_version(&routes, 1);
        assert_eq!(v1.len(), 1);
        assert_eq!(v1[0].uri, "api/v1/items");
    }

    #[test]
    fn test_docs_path() {
        assert_eq!(RouteSpec::new("api/v1/items", HttpMethod::Get).docs_path(), "/api/v1/items");
    }

    #[test]
    fn test_split_versioned_path() {
        assert_eq!(split_versioned_path("/api/v3/x"), Some((3, "x".to_string())));
        assert_eq!(split_versioned_path("/v10/a/{b}"), Some((10, "a/{b}".to_string())));
        assert_eq!(split_versioned_path("/api/items"), None);
        assert_eq!(split_versioned_path("/api/v1/"), None);
        assert_eq!(split_versioned_path("/api/v0/x"), None);
        assert_eq!(split_versioned_path("/v00/x"), None);
    }
}
