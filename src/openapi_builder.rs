use crate::contract::{RequestDefinition, ResponseDefinition};
use crate::definition::{FieldDefinition, Properties};
use crate::error::{Error, Result};
use crate::registry::SchemaRegistry;
use crate::route::{group_routes, HttpMethod, RouteSpec};
use crate::schema_compiler::{Schema, SchemaCompiler};
use indexmap::IndexMap;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const JSON_CONTENT_TYPE: &str = "application/json";

static PATH_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\w?\-]+\}").expect("Invalid regex"));

/// Path -> path item mapping, in insertion order
pub type PathDocument = IndexMap<String, PathItem>;

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI Tag object, as listed in the document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - all operations of a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&self, method: HttpMethod) -> &Option<Operation> {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Put => &self.put,
            HttpMethod::Delete => &self.delete,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Options => &self.options,
            HttpMethod::Head => &self.head,
        }
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.slot(method).as_ref()
    }

    /// Stores `operation` for `method`, replacing whatever was there.
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        *self.slot_mut(method) = Some(operation);
    }

    /// The operations present on this path, in method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }

    pub fn into_operations(self) -> Vec<(HttpMethod, Operation)> {
        let mut operations = Vec::new();
        for (method, operation) in [
            (HttpMethod::Get, self.get),
            (HttpMethod::Post, self.post),
            (HttpMethod::Put, self.put),
            (HttpMethod::Delete, self.delete),
            (HttpMethod::Patch, self.patch),
            (HttpMethod::Options, self.options),
            (HttpMethod::Head, self.head),
        ] {
            if let Some(operation) = operation {
                operations.push((method, operation));
            }
        }
        operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations().next().is_none()
    }
}

/// OpenAPI Operation object
///
/// Fields are declared in lexicographic key order so the serialized object is sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub schema: Schema,
    #[serde(default, deserialize_with = "crate::schema_compiler::present", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Only ever `Some(true)`; a parameter that is not required has no `required` key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, Header>>,
}

/// OpenAPI Header object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub description: String,
    pub schema: Schema,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub tags: Vec<Tag>,
    pub paths: PathDocument,
}

/// The parts of a document that do not come from routes
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRoot {
    pub title: String,
    pub server_url: String,
    pub tags: Vec<Tag>,
}

impl DocumentRoot {
    pub fn new(title: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            server_url: server_url.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Wraps `paths` into a full document for the given API version.
    pub fn build(&self, version: u32, paths: PathDocument) -> OpenApiDocument {
        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: self.title.clone(),
                version: format!("{}.0", version),
            },
            servers: vec![Server {
                url: self.server_url.clone(),
            }],
            tags: self.tags.clone(),
            paths,
        }
    }
}

/// Checks that every `{placeholder}` of `path` has a path parameter definition.
pub fn validate_path_parameters(path: &str, request: &RequestDefinition) -> Result<()> {
    for placeholder in PATH_PLACEHOLDER.find_iter(path) {
        let placeholder = placeholder.as_str();
        let name = placeholder.trim_start_matches('{').trim_end_matches('}');
        if !request.path_parameters().contains_key(name) {
            return Err(Error::PathContract {
                placeholder: placeholder.to_string(),
                path: path.to_string(),
                definition: request.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Builds path documents out of routes and their contracts
pub struct PathDocumentBuilder<'r> {
    compiler: SchemaCompiler<'r>,
    paths: PathDocument,
}

impl<'r> PathDocumentBuilder<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        debug!("Initializing PathDocumentBuilder");
        Self {
            compiler: SchemaCompiler::new(registry),
            paths: PathDocument::new(),
        }
    }

    /// Adds a route to the document.
    ///
    /// Routes missing either contract are skipped and `false` is returned.
    pub fn add_route(&mut self, route: &RouteSpec) -> Result<bool> {
        let (request, response) = match (&route.request, &route.response) {
            (Some(request), Some(response)) => (request, response),
            _ => {
                debug!("Skipping undocumented route: {} {}", route.method, route.uri);
                return Ok(false);
            }
        };

        let path = route.docs_path();
        debug!("Adding route: {} {}", route.method, path);

        validate_path_parameters(&path, request)?;
        let operation = self.build_operation(request, response, route.method)?;

        self.paths.entry(path).or_default().set(route.method, operation);
        Ok(true)
    }

    /// Builds the operation of one route.
    pub fn build_operation(
        &self,
        request: &RequestDefinition,
        response: &ResponseDefinition,
        method: HttpMethod,
    ) -> Result<Operation> {
        let request_body = if method != HttpMethod::Get {
            Some(self.build_request_body(request)?)
        } else {
            None
        };

        let mut responses = IndexMap::new();
        responses.insert(
            response.response_code().to_string(),
            self.build_response(response)?,
        );

        Ok(Operation {
            deprecated: request.is_deprecated().then_some(true),
            description: request.description().to_string(),
            parameters: self.build_parameters(request)?,
            request_body,
            responses,
            summary: request.summary().to_string(),
            tags: Self::build_tags(request),
        })
    }

    /// Path, query, header and cookie parameters, in that order.
    pub fn build_parameters(&self, request: &RequestDefinition) -> Result<Vec<Parameter>> {
        let groups: [(&Properties, &str); 4] = [
            (request.path_parameters(), "path"),
            (request.query_parameters(), "query"),
            (request.headers(), "header"),
            (request.cookies(), "cookie"),
        ];

        let mut parameters = Vec::new();
        for (definitions, location) in groups {
            for (name, definition) in definitions {
                parameters.push(self.build_parameter(name, definition, location)?);
            }
        }
        Ok(parameters)
    }

    pub fn build_parameter(
        &self,
        name: &str,
        definition: &FieldDefinition,
        location: &str,
    ) -> Result<Parameter> {
        Ok(Parameter {
            location: location.to_string(),
            name: name.to_string(),
            description: definition.description().to_string(),
            schema: self.compiler.compile_parameter_schema(definition)?,
            example: definition.first_example().cloned(),
            required: definition.type_model().is_required().then_some(true),
            deprecated: definition.is_deprecated().then_some(true),
        })
    }

    fn build_request_body(&self, request: &RequestDefinition) -> Result<RequestBody> {
        let properties = self.compiler.compile_schema_properties(request.body_parameters())?;

        let mut content = IndexMap::new();
        content.insert(
            JSON_CONTENT_TYPE.to_string(),
            MediaType {
                schema: Schema::object(properties),
            },
        );

        Ok(RequestBody {
            required: !request.optional_body(),
            content,
        })
    }

    fn build_response(&self, response: &ResponseDefinition) -> Result<Response> {
        let properties = self.compiler.compile_schema_properties(response.body_parameters())?;
        let schema = if response.is_collection() {
            Schema::array(Schema::object(properties))
        } else {
            Schema::object(properties)
        };

        let mut content = IndexMap::new();
        content.insert(JSON_CONTENT_TYPE.to_string(), MediaType { schema });

        let headers = if response.headers().is_empty() {
            None
        } else {
            let mut headers = IndexMap::new();
            for (name, definition) in response.headers() {
                headers.insert(
                    name.clone(),
                    Header {
                        description: definition.description().to_string(),
                        schema: self.compiler.compile_parameter_schema(definition)?,
                    },
                );
            }
            Some(headers)
        };

        Ok(Response {
            description: response.description().to_string(),
            content,
            headers,
        })
    }

    /// Declared tags followed by the modifier tag the merge step buckets on.
    fn build_tags(request: &RequestDefinition) -> Vec<String> {
        let mut tags = request.tags().to_vec();
        tags.push(request.modifier().as_tag().to_string());
        tags
    }

    pub fn build(self) -> PathDocument {
        self.paths
    }
}

/// Builds one path document per route group.
///
/// Groups without a single documented route are left out.
pub fn build_path_documents(
    routes: &[RouteSpec],
    registry: &SchemaRegistry,
) -> Result<IndexMap<String, PathDocument>> {
    let mut documents = IndexMap::new();

    for (group, routes) in group_routes(routes) {
        let mut builder = PathDocumentBuilder::new(registry);
        for route in routes {
            builder.add_route(route)?;
        }

        let document = builder.build();
        if document.is_empty() {
            debug!("No documented routes in group {}", group);
            continue;
        }
        documents.insert(group, document);
    }

    info!("Built {} path documents", documents.len());
    Ok(documents)
}
