//! OpenAPI DTO - compiles typed request/response definitions into OpenAPI 3.0 documents.
//!
//! Routes come with a request and a response contract made of typed field definitions.
//! The library turns them into OpenAPI path documents, one per route group and API
//! version, and later merges the documents of every version into consolidated
//! artifacts split by visibility.
//!
//! # Architecture
//!
//! 1. [`type_model`] - Type descriptors of a field (scalar, enum, datetime, object, reference, collection)
//! 2. [`definition`] - Field definitions with description, examples and deprecation
//! 3. [`registry`] - Referenceable schemas keyed by identifier
//! 4. [`contract`] - Request and response contracts of a route
//! 5. [`schema_compiler`] - Compiles type descriptors into OpenAPI schemas
//! 6. [`route`] - Routes handed over by the host, grouping helpers
//! 7. [`openapi_builder`] - Builds path documents and the OpenAPI object model
//! 8. [`merger`] - Merges path documents across versions into bucket documents
//! 9. [`scanner`] / [`docs_store`] - Persisted documents on disk
//! 10. [`serializer`] - JSON and YAML output
//! 11. [`coverage`] - Which routes of a version are documented
//!
//! # Example Usage
//!
//! ```
//! use openapi_dto::contract::{RequestDefinition, ResponseDefinition};
//! use openapi_dto::definition::FieldDefinition;
//! use openapi_dto::merger::{ModifierStrategy, VersionHeap, VersionMerger};
//! use openapi_dto::openapi_builder::{build_path_documents, DocumentRoot};
//! use openapi_dto::registry::SchemaRegistry;
//! use openapi_dto::route::{HttpMethod, RouteSpec};
//! use openapi_dto::type_model::TypeModel;
//!
//! let registry = SchemaRegistry::new();
//!
//! let request = RequestDefinition::builder("GetItem")
//!     .summary("Get one item")
//!     .path("id", FieldDefinition::of(TypeModel::int()))
//!     .build()
//!     .unwrap();
//! let response = ResponseDefinition::builder("Item")
//!     .body("name", FieldDefinition::of(TypeModel::string()))
//!     .build()
//!     .unwrap();
//!
//! let routes = vec![
//!     RouteSpec::new("api/v1/items/{id}", HttpMethod::Get).with_contracts(request, response),
//! ];
//! let documents = build_path_documents(&routes, &registry).unwrap();
//!
//! let mut heap = VersionHeap::new();
//! for (_, document) in documents {
//!     heap.insert_document(document);
//! }
//!
//! let merged = VersionMerger::new(heap, DocumentRoot::new("API", "https://localhost/api"))
//!     .with_strategy(ModifierStrategy)
//!     .merge(1)
//!     .unwrap();
//! assert!(merged["public"].paths.contains_key("/v1/items/{id}"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod contract;
pub mod coverage;
pub mod definition;
pub mod docs_store;
pub mod error;
pub mod merger;
pub mod openapi_builder;
pub mod registry;
pub mod route;
pub mod scanner;
pub mod schema_compiler;
pub mod serializer;
pub mod type_model;
