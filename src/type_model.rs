//! Type descriptors for request/response fields.
//!
//! A [`TypeModel`] is a closed sum of the shapes a field can take ([`TypeKind`]) plus
//! the modifiers every shape carries: nullability, whether the value is required, and
//! an optional default. Descriptors are built with the named constructors and the
//! chained modifier methods, then handed to a [`FieldDefinition`](crate::definition::FieldDefinition):
//!
//! ```
//! use openapi_dto::type_model::TypeModel;
//!
//! let page = TypeModel::int().optional().with_default(1);
//! assert!(!page.is_required());
//! assert_eq!(page.to_string(), "integer");
//! ```

use crate::definition::Properties;
use crate::registry::ReferencedSchema;
use serde_json::Value;
use std::fmt;

/// Scalar kinds, named after their OpenAPI `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    String,
    Number,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Integer => "integer",
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
        }
    }
}

/// Granularity of a date/time value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatetimeGranularity {
    Date,
    Datetime,
}

impl DatetimeGranularity {
    /// The `format` keyword emitted for this granularity.
    pub fn openapi_format(&self) -> &'static str {
        match self {
            DatetimeGranularity::Date => "date",
            DatetimeGranularity::Datetime => "date-time",
        }
    }

    /// The fixed strftime-style format values of this granularity are serialized with.
    pub fn serialization_format(&self) -> &'static str {
        match self {
            DatetimeGranularity::Date => "%Y-%m-%d",
            DatetimeGranularity::Datetime => "%Y-%m-%d %H:%M:%S",
        }
    }
}

/// The shape of a value
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Scalar(ScalarKind),
    /// Allowed string values, in declaration order
    Enum(Vec<String>),
    Datetime(DatetimeGranularity),
    /// Inline object; property order is significant
    Object(Properties),
    /// Identifier of a schema registered in a [`SchemaRegistry`](crate::registry::SchemaRegistry)
    Reference(String),
    Collection(Box<TypeModel>),
}

/// A type descriptor with its modifiers
#[derive(Debug, Clone, PartialEq)]
pub struct TypeModel {
    kind: TypeKind,
    nullable: bool,
    required: bool,
    /// `Some(Value::Null)` is an explicit null default, `None` means no default
    default: Option<Value>,
}

impl TypeModel {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
            required: true,
            default: None,
        }
    }

    pub fn int() -> Self {
        Self::new(TypeKind::Scalar(ScalarKind::Integer))
    }

    pub fn string() -> Self {
        Self::new(TypeKind::Scalar(ScalarKind::String))
    }

    pub fn float() -> Self {
        Self::new(TypeKind::Scalar(ScalarKind::Number))
    }

    pub fn bool() -> Self {
        Self::new(TypeKind::Scalar(ScalarKind::Boolean))
    }

    pub fn date() -> Self {
        Self::new(TypeKind::Datetime(DatetimeGranularity::Date))
    }

    pub fn datetime() -> Self {
        Self::new(TypeKind::Datetime(DatetimeGranularity::Datetime))
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(TypeKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn object(properties: Properties) -> Self {
        Self::new(TypeKind::Object(properties))
    }

    pub fn reference(schema: impl Into<String>) -> Self {
        Self::new(TypeKind::Reference(schema.into()))
    }

    /// Reference to a schema type by its registered name.
    pub fn reference_to<S: ReferencedSchema>() -> Self {
        Self::reference(S::NAME)
    }

    pub fn collection(item_type: TypeModel) -> Self {
        Self::new(TypeKind::Collection(Box::new(item_type)))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// True for the variants that expand into nested `properties`.
    pub fn has_nested_properties(&self) -> bool {
        matches!(self.kind, TypeKind::Object(_) | TypeKind::Reference(_))
    }
}

impl fmt::Display for TypeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Scalar(kind) => f.write_str(kind.as_str()),
            TypeKind::Enum(values) => write!(f, "enum<{}>", values.join(", ")),
            TypeKind::Datetime(_) => f.write_str("datetime"),
            TypeKind::Object(_) => f.write_str("object"),
            TypeKind::Reference(schema) => write!(f, "object<{}>", schema),
            TypeKind::Collection(item) => write!(f, "array<{}>", item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let t = TypeModel::string();
        assert!(t.is_required());
        assert!(!t.is_nullable());
        assert!(!t.has_default());
        assert_eq!(t.default_value(), None);
    }

    #[test]
    fn test_modifiers() {
        let t = TypeModel::int().nullable().optional().with_default(0);
        assert!(t.is_nullable());
        assert!(!t.is_required());
        assert_eq!(t.default_value(), Some(&json!(0)));
    }

    #[test]
    fn test_explicit_null_default() {
        let t = TypeModel::string().with_default(Value::Null);
        assert!(t.has_default());
        assert_eq!(t.default_value(), Some(&Value::Null));
    }

    #[test]
    fn test_datetime_formats() {
        assert_eq!(DatetimeGranularity::Date.openapi_format(), "date");
        assert_eq!(DatetimeGranularity::Datetime.openapi_format(), "date-time");
        assert_eq!(DatetimeGranularity::Date.serialization_format(), "%Y-%m-%d");
        assert_eq!(
            DatetimeGranularity::Datetime.serialization_format(),
            "%Y-%m-%d %H:%M:%S"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeModel::float().to_string(), "number");
        assert_eq!(TypeModel::date().to_string(), "datetime");
        assert_eq!(
            TypeModel::enumeration(["open", "closed"]).to_string(),
            "enum<open, closed>"
        );
        assert_eq!(TypeModel::reference("Address").to_string(), "object<Address>");
        assert_eq!(
            TypeModel::collection(TypeModel::collection(TypeModel::int())).to_string(),
            "array<array<integer>>"
        );
        assert_eq!(TypeModel::object(Properties::new()).to_string(), "object");
    }

    #[test]
    fn test_has_nested_properties() {
        assert!(TypeModel::reference("A").has_nested_properties());
        assert!(TypeModel::object(Properties::new()).has_nested_properties());
        assert!(!TypeModel::collection(TypeModel::reference("A")).has_nested_properties());
        assert!(!TypeModel::bool().has_nested_properties());
    }
}
