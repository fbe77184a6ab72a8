use crate::error::{Error, Result};
use crate::type_model::{TypeKind, TypeModel};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

/// Name -> definition mapping; iteration order is declaration order
pub type Properties = IndexMap<String, FieldDefinition>;

/// Example name used by [`FieldDefinition::with_example`]
pub const DEFAULT_EXAMPLE: &str = "default";

/// A typed field together with its documentation metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    type_model: TypeModel,
    description: String,
    examples: IndexMap<String, Value>,
    deprecated: bool,
}

impl FieldDefinition {
    pub fn of(type_model: TypeModel) -> Self {
        Self {
            type_model,
            description: String::new(),
            examples: IndexMap::new(),
            deprecated: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attaches a single example under the `default` example name.
    pub fn with_example(mut self, value: impl Into<Value>) -> Self {
        self.examples.insert(DEFAULT_EXAMPLE.to_string(), value.into());
        self
    }

    /// Replaces all examples.
    pub fn with_examples(mut self, examples: IndexMap<String, Value>) -> Self {
        self.examples = examples;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn type_model(&self) -> &TypeModel {
        &self.type_model
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn examples(&self) -> &IndexMap<String, Value> {
        &self.examples
    }

    pub fn has_examples(&self) -> bool {
        !self.examples.is_empty()
    }

    pub fn first_example(&self) -> Option<&Value> {
        self.examples.values().next()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }
}

/// Checks every entry of a definition mapping, descending into inline objects and
/// collections.
///
/// `location` names the mapping being checked (`body`, `path`, `property`, ...) and
/// `source` the definition it belongs to; both end up in the error message.
pub fn validate_definitions(definitions: &Properties, location: &str, source: &str) -> Result<()> {
    debug!(
        "Validating {} {} definitions of {}",
        definitions.len(),
        location,
        source
    );

    for (name, definition) in definitions {
        if name.trim().is_empty() {
            return Err(invalid(source, location, name, "name must not be empty"));
        }
        validate_type(definition.type_model(), name, location, source)?;
    }

    Ok(())
}

fn validate_type(type_model: &TypeModel, name: &str, location: &str, source: &str) -> Result<()> {
    match type_model.kind() {
        TypeKind::Enum(values) => {
            if values.is_empty() {
                return Err(invalid(source, location, name, "enum has no values"));
            }
            if let Some(Value::String(default)) = type_model.default_value() {
                if !values.contains(default) {
                    return Err(invalid(
                        source,
                        location,
                        name,
                        &format!("default \"{}\" is not one of the enum values", default),
                    ));
                }
            }
        }
        TypeKind::Reference(schema) if schema.trim().is_empty() => {
            return Err(invalid(source, location, name, "reference has no target schema"));
        }
        TypeKind::Object(properties) => {
            validate_definitions(properties, "property", source)?;
        }
        TypeKind::Collection(item) => {
            validate_type(item, name, location, source)?;
        }
        _ => {}
    }

    Ok(())
}

fn invalid(source: &str, location: &str, name: &str, message: &str) -> Error {
    Error::Definition {
        source: source.to_string(),
        location: location.to_string(),
        name: name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(entries: Vec<(&str, FieldDefinition)>) -> Properties {
        entries
            .into_iter()
            .map(|(name, definition)| (name.to_string(), definition))
            .collect()
    }

    #[test]
    fn test_definition_defaults() {
        let definition = FieldDefinition::of(TypeModel::string());
        assert_eq!(definition.description(), "");
        assert!(!definition.has_examples());
        assert!(!definition.is_deprecated());
        assert_eq!(definition.first_example(), None);
    }

    #[test]
    fn test_with_example_uses_default_name() {
        let definition = FieldDefinition::of(TypeModel::int()).with_example(5);
        assert_eq!(definition.examples().get(DEFAULT_EXAMPLE), Some(&json!(5)));
        assert_eq!(definition.first_example(), Some(&json!(5)));
    }

    #[test]
    fn test_first_example_follows_insertion_order() {
        let mut examples = IndexMap::new();
        examples.insert("second".to_string(), json!("b"));
        examples.insert("first".to_string(), json!("a"));
        let definition = FieldDefinition::of(TypeModel::string()).with_examples(examples);
        assert_eq!(definition.first_example(), Some(&json!("b")));
    }

    #[test]
    fn test_validate_accepts_well_formed_definitions() {
        let definitions = props(vec![
            ("id", FieldDefinition::of(TypeModel::int())),
            (
                "status",
                FieldDefinition::of(TypeModel::enumeration(["a", "b"]).with_default("a")),
            ),
            (
                "lines",
                FieldDefinition::of(TypeModel::collection(TypeModel::object(props(vec![(
                    "sku",
                    FieldDefinition::of(TypeModel::string()),
                )])))),
            ),
        ]);
        assert!(validate_definitions(&definitions, "body", "CreateOrder").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let definitions = props(vec![("  ", FieldDefinition::of(TypeModel::int()))]);
        let err = validate_definitions(&definitions, "query", "ListItems").unwrap_err();
        assert!(matches!(err, Error::Definition { ref location, .. } if location == "query"));
    }

    #[test]
    fn test_validate_rejects_empty_enum() {
        let definitions = props(vec![(
            "status",
            FieldDefinition::of(TypeModel::enumeration(Vec::<String>::new())),
        )]);
        let err = validate_definitions(&definitions, "body", "UpdateOrder").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("\"status\" body parameter in UpdateOrder"));
    }

    #[test]
    fn test_validate_rejects_enum_default_outside_values() {
        let definitions = props(vec![(
            "status",
            FieldDefinition::of(TypeModel::enumeration(["a"]).with_default("z")),
        )]);
        assert!(validate_definitions(&definitions, "body", "UpdateOrder").is_err());
    }

    #[test]
    fn test_validate_descends_into_collection_of_objects() {
        let nested = props(vec![(
            "target",
            FieldDefinition::of(TypeModel::reference(" ")),
        )]);
        let definitions = props(vec![(
            "items",
            FieldDefinition::of(TypeModel::collection(TypeModel::object(nested))),
        )]);
        let err = validate_definitions(&definitions, "body", "Batch").unwrap_err();
        match err {
            Error::Definition { location, name, .. } => {
                assert_eq!(location, "property");
                assert_eq!(name, "target");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
