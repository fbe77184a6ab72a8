//! Request and response contracts of a route.
//!
//! Both contracts are assembled through builders; `build()` validates every parameter
//! mapping, so a contract that exists is well formed. After that the contract is
//! read-only.

use crate::definition::{validate_definitions, FieldDefinition, Properties};
use crate::error::Result;
use std::fmt;

/// Visibility of an operation in the merged artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    #[default]
    Public,
    Private,
    Skip,
}

impl Modifier {
    pub const PUBLIC_TAG: &'static str = "modifier.public";
    pub const PRIVATE_TAG: &'static str = "modifier.private";
    pub const SKIP_TAG: &'static str = "modifier.skip";

    /// The tag the modifier travels as inside an operation's `tags`.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Modifier::Public => Self::PUBLIC_TAG,
            Modifier::Private => Self::PRIVATE_TAG,
            Modifier::Skip => Self::SKIP_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            Self::PUBLIC_TAG => Some(Modifier::Public),
            Self::PRIVATE_TAG => Some(Modifier::Private),
            Self::SKIP_TAG => Some(Modifier::Skip),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// What a route accepts
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefinition {
    name: String,
    body_parameters: Properties,
    path_parameters: Properties,
    query_parameters: Properties,
    headers: Properties,
    cookies: Properties,
    summary: String,
    description: String,
    optional_body: bool,
    deprecated: bool,
    modifier: Modifier,
    tags: Vec<String>,
}

impl RequestDefinition {
    /// Starts a request contract; `name` identifies it in error messages.
    pub fn builder(name: impl Into<String>) -> RequestDefinitionBuilder {
        RequestDefinitionBuilder {
            inner: RequestDefinition {
                name: name.into(),
                body_parameters: Properties::new(),
                path_parameters: Properties::new(),
                query_parameters: Properties::new(),
                headers: Properties::new(),
                cookies: Properties::new(),
                summary: String::new(),
                description: String::new(),
                optional_body: false,
                deprecated: false,
                modifier: Modifier::default(),
                tags: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body_parameters(&self) -> &Properties {
        &self.body_parameters
    }

    pub fn path_parameters(&self) -> &Properties {
        &self.path_parameters
    }

    pub fn query_parameters(&self) -> &Properties {
        &self.query_parameters
    }

    pub fn headers(&self) -> &Properties {
        &self.headers
    }

    pub fn cookies(&self) -> &Properties {
        &self.cookies
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn optional_body(&self) -> bool {
        self.optional_body
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Builder for [`RequestDefinition`]
#[derive(Debug, Clone)]
pub struct RequestDefinitionBuilder {
    inner: RequestDefinition,
}

impl RequestDefinitionBuilder {
    pub fn body(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.body_parameters.insert(name.into(), definition);
        self
    }

    pub fn body_parameters(mut self, properties: Properties) -> Self {
        self.inner.body_parameters.extend(properties);
        self
    }

    pub fn path(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.path_parameters.insert(name.into(), definition);
        self
    }

    pub fn query(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.query_parameters.insert(name.into(), definition);
        self
    }

    pub fn header(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.headers.insert(name.into(), definition);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.cookies.insert(name.into(), definition);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.inner.summary = summary.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = description.into();
        self
    }

    pub fn optional_body(mut self) -> Self {
        self.inner.optional_body = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.inner.deprecated = true;
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.inner.modifier = modifier;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<RequestDefinition> {
        let request = self.inner;
        validate_definitions(&request.body_parameters, "body", &request.name)?;
        validate_definitions(&request.path_parameters, "path", &request.name)?;
        validate_definitions(&request.query_parameters, "query", &request.name)?;
        validate_definitions(&request.headers, "header", &request.name)?;
        validate_definitions(&request.cookies, "cookie", &request.name)?;
        Ok(request)
    }
}

/// What a route returns
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDefinition {
    name: String,
    body_parameters: Properties,
    headers: Properties,
    cookies: Properties,
    response_code: u16,
    description: String,
    collection: bool,
}

impl ResponseDefinition {
    pub fn builder(name: impl Into<String>) -> ResponseDefinitionBuilder {
        ResponseDefinitionBuilder {
            inner: ResponseDefinition {
                name: name.into(),
                body_parameters: Properties::new(),
                headers: Properties::new(),
                cookies: Properties::new(),
                response_code: 200,
                description: String::new(),
                collection: false,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body_parameters(&self) -> &Properties {
        &self.body_parameters
    }

    pub fn headers(&self) -> &Properties {
        &self.headers
    }

    pub fn cookies(&self) -> &Properties {
        &self.cookies
    }

    pub fn response_code(&self) -> u16 {
        self.response_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the body describes one item of a returned array
    pub fn is_collection(&self) -> bool {
        self.collection
    }
}

/// Builder for [`ResponseDefinition`]
#[derive(Debug, Clone)]
pub struct ResponseDefinitionBuilder {
    inner: ResponseDefinition,
}

impl ResponseDefinitionBuilder {
    pub fn body(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.body_parameters.insert(name.into(), definition);
        self
    }

    pub fn body_parameters(mut self, properties: Properties) -> Self {
        self.inner.body_parameters.extend(properties);
        self
    }

    pub fn header(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.headers.insert(name.into(), definition);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.inner.cookies.insert(name.into(), definition);
        self
    }

    pub fn response_code(mut self, code: u16) -> Self {
        self.inner.response_code = code;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = description.into();
        self
    }

    pub fn collection(mut self) -> Self {
        self.inner.collection = true;
        self
    }

    pub fn build(self) -> Result<ResponseDefinition> {
        let response = self.inner;
        validate_definitions(&response.body_parameters, "body", &response.name)?;
        validate_definitions(&response.headers, "header", &response.name)?;
        validate_definitions(&response.cookies, "cookie", &response.name)?;
        Ok(response)
    }
}
