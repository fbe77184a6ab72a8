use crate::definition::{FieldDefinition, Properties};
use crate::error::{Error, Result};
use crate::registry::SchemaRegistry;
use crate::type_model::{TypeKind, TypeModel};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// OpenAPI Schema object
///
/// Field order is the emitted key order: `type` first, then the documentation keys,
/// then the variant specific ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

// A present `null` is a value here, not an absent key.
pub(crate) fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Schema {
    /// A schema carrying only a `type` keyword.
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            description: None,
            example: None,
            default: None,
            deprecated: None,
            properties: None,
            items: None,
            enum_values: None,
            format: None,
        }
    }

    /// An object schema with the given properties.
    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::of_type("object")
        }
    }

    /// An array schema whose items are `items`.
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type("array")
        }
    }
}

/// Compiles type descriptors into OpenAPI schemas
///
/// References are expanded inline by looking their properties up in the registry.
/// The chain of references currently being expanded is tracked so that a schema
/// reaching itself again is reported instead of recursing forever; the same schema
/// referenced from two sibling fields is expanded twice.
pub struct SchemaCompiler<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> SchemaCompiler<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        debug!("Initializing SchemaCompiler with {} schemas", registry.len());
        Self { registry }
    }

    /// The OpenAPI `type` keyword of a descriptor.
    pub fn resolve_schema_type(type_model: &TypeModel) -> &'static str {
        match type_model.kind() {
            TypeKind::Scalar(kind) => kind.as_str(),
            TypeKind::Reference(_) | TypeKind::Object(_) => "object",
            TypeKind::Datetime(_) | TypeKind::Enum(_) => "string",
            TypeKind::Collection(_) => "array",
        }
    }

    /// Compiles the schema of a parameter or header.
    ///
    /// The result starts with `type` (and `default` when the type has one) and
    /// layers the variant specific keywords on top.
    pub fn compile_parameter_schema(&self, definition: &FieldDefinition) -> Result<Schema> {
        let mut trail = Vec::new();
        self.parameter_schema(definition.type_model(), &mut trail)
    }

    /// Compiles a property mapping, keeping its order.
    pub fn compile_schema_properties(&self, properties: &Properties) -> Result<IndexMap<String, Schema>> {
        let mut trail = Vec::new();
        self.properties_schema(properties, &mut trail)
    }

    fn parameter_schema(&self, type_model: &TypeModel, trail: &mut Vec<String>) -> Result<Schema> {
        debug!("Compiling parameter schema for type: {}", type_model);

        let mut schema = Schema::of_type(Self::resolve_schema_type(type_model));
        schema.default = type_model.default_value().cloned();

        match type_model.kind() {
            TypeKind::Reference(_) | TypeKind::Object(_) => {
                schema.properties = Some(self.nested_properties(type_model, trail)?);
            }
            TypeKind::Enum(values) => {
                schema.enum_values = Some(values.clone());
            }
            TypeKind::Collection(item) => {
                schema.items = Some(Box::new(self.items_schema(item, trail)?));
            }
            TypeKind::Datetime(granularity) => {
                schema.format = Some(granularity.openapi_format().to_string());
            }
            TypeKind::Scalar(_) => {}
        }

        Ok(schema)
    }

    fn properties_schema(
        &self,
        properties: &Properties,
        trail: &mut Vec<String>,
    ) -> Result<IndexMap<String, Schema>> {
        let mut compiled = IndexMap::with_capacity(properties.len());
        for (name, definition) in properties {
            compiled.insert(name.clone(), self.property_schema(definition, trail)?);
        }
        Ok(compiled)
    }

    fn property_schema(&self, definition: &FieldDefinition, trail: &mut Vec<String>) -> Result<Schema> {
        let type_model = definition.type_model();

        let mut schema = Schema::of_type(Self::resolve_schema_type(type_model));
        schema.description = Some(definition.description().to_string());
        schema.example = definition.first_example().cloned();
        schema.default = type_model.default_value().cloned();
        if definition.is_deprecated() {
            schema.deprecated = Some(true);
        }

        if type_model.has_nested_properties() {
            schema.properties = Some(self.nested_properties(type_model, trail)?);
        }

        match type_model.kind() {
            TypeKind::Collection(item) => {
                schema.items = Some(Box::new(self.items_schema(item, trail)?));
            }
            TypeKind::Enum(values) => {
                schema.enum_values = Some(values.clone());
            }
            _ => {}
        }

        Ok(schema)
    }

    fn items_schema(&self, item: &TypeModel, trail: &mut Vec<String>) -> Result<Schema> {
        let mut schema = Schema::of_type(Self::resolve_schema_type(item));

        if item.has_nested_properties() {
            schema.properties = Some(self.nested_properties(item, trail)?);
        }

        match item.kind() {
            TypeKind::Collection(inner) => {
                schema.items = Some(Box::new(self.items_schema(inner, trail)?));
            }
            TypeKind::Enum(values) => {
                schema.enum_values = Some(values.clone());
            }
            _ => {}
        }

        Ok(schema)
    }

    fn nested_properties(
        &self,
        type_model: &TypeModel,
        trail: &mut Vec<String>,
    ) -> Result<IndexMap<String, Schema>> {
        match type_model.kind() {
            TypeKind::Reference(schema) => self.reference_properties(schema, trail),
            TypeKind::Object(properties) => self.properties_schema(properties, trail),
            _ => Ok(IndexMap::new()),
        }
    }

    fn reference_properties(&self, schema: &str, trail: &mut Vec<String>) -> Result<IndexMap<String, Schema>> {
        if trail.iter().any(|s| s == schema) {
            let mut chain = trail.clone();
            chain.push(schema.to_string());
            return Err(Error::CyclicReference { chain });
        }

        debug!("Expanding reference to schema: {}", schema);
        let properties = self.registry.properties(schema)?;

        trail.push(schema.to_string());
        let compiled = self.properties_schema(properties, trail);
        trail.pop();

        compiled
    }
}
