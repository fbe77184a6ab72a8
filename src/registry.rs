use crate::definition::{validate_definitions, Properties};
use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;

/// A schema type that can be the target of a [`TypeKind::Reference`](crate::type_model::TypeKind::Reference)
///
/// ```
/// use openapi_dto::definition::{FieldDefinition, Properties};
/// use openapi_dto::registry::{ReferencedSchema, SchemaRegistry};
/// use openapi_dto::type_model::TypeModel;
///
/// struct Address;
///
/// impl ReferencedSchema for Address {
///     const NAME: &'static str = "Address";
///
///     fn properties() -> Properties {
///         let mut properties = Properties::new();
///         properties.insert("city".to_string(), FieldDefinition::of(TypeModel::string()));
///         properties
///     }
/// }
///
/// let mut registry = SchemaRegistry::new();
/// registry.register_schema::<Address>().unwrap();
/// assert!(registry.contains("Address"));
/// ```
pub trait ReferencedSchema {
    /// Identifier references use to point at this schema
    const NAME: &'static str;

    fn properties() -> Properties;
}

/// Registry of referenceable schemas, keyed by identifier
///
/// Populated once before compiling; the compiler only reads from it.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Properties>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the properties of a schema under `id`.
    ///
    /// The properties are validated the same way request and response mappings are.
    /// Registering the same id twice is a definition error.
    pub fn register(&mut self, id: impl Into<String>, properties: Properties) -> Result<()> {
        let id = id.into();
        debug!("Registering schema {} with {} properties", id, properties.len());

        if self.schemas.contains_key(&id) {
            return Err(Error::Definition {
                source: id.clone(),
                location: "schema".to_string(),
                name: id,
                message: "schema is already registered".to_string(),
            });
        }

        validate_definitions(&properties, "property", &id)?;
        self.schemas.insert(id, properties);
        Ok(())
    }

    pub fn register_schema<S: ReferencedSchema>(&mut self) -> Result<()> {
        self.register(S::NAME, S::properties())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Looks up the ordered properties of a schema.
    pub fn properties(&self, id: &str) -> Result<&Properties> {
        self.schemas.get(id).ok_or_else(|| {
            warn!("Could not resolve schema: {}", id);
            Error::UnresolvedReference {
                schema: id.to_string(),
            }
        })
    }

    /// Combines the properties of several schemas.
    ///
    /// Schemas are folded in order, so a later schema replaces the definition of a
    /// property an earlier one declared while keeping its position. `overrides` are
    /// applied on top and `exclude` names are removed last.
    pub fn merge(&self, schemas: &[&str], overrides: Properties, exclude: &[&str]) -> Result<Properties> {
        let mut merged = Properties::new();

        for id in schemas {
            for (name, definition) in self.properties(id)? {
                merged.insert(name.clone(), definition.clone());
            }
        }

        for (name, definition) in overrides {
            merged.insert(name, definition);
        }

        for name in exclude {
            merged.shift_remove(*name);
        }

        Ok(merged)
    }

    /// The subset of a schema's properties named in `include`, in the schema's order.
    pub fn only(&self, schema: &str, include: &[&str]) -> Result<Properties> {
        Ok(self
            .properties(schema)?
            .iter()
            .filter(|(name, _)| include.contains(&name.as_str()))
            .map(|(name, definition)| (name.clone(), definition.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FieldDefinition;
    use crate::type_model::TypeModel;

    fn props(names: &[(&str, TypeModel)]) -> Properties {
        names
            .iter()
            .map(|(name, t)| (name.to_string(), FieldDefinition::of(t.clone())))
            .collect()
    }

    fn keys(properties: &Properties) -> Vec<&str> {
        properties.keys().map(String::as_str).collect()
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "User",
                props(&[
                    ("id", TypeModel::int()),
                    ("name", TypeModel::string()),
                    ("email", TypeModel::string()),
                ]),
            )
            .unwrap();
        registry
            .register(
                "Audit",
                props(&[("created_at", TypeModel::datetime()), ("id", TypeModel::string())]),
            )
            .unwrap();
        registry
    }

    struct Tag;

    impl ReferencedSchema for Tag {
        const NAME: &'static str = "Tag";

        fn properties() -> Properties {
            props(&[("label", TypeModel::string())])
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(keys(registry.properties("User").unwrap()), vec!["id", "name", "email"]);
    }

    #[test]
    fn test_register_schema_trait() {
        let mut registry = SchemaRegistry::new();
        registry.register_schema::<Tag>().unwrap();
        assert!(registry.contains("Tag"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry.register("User", Properties::new()).unwrap_err();
        assert!(matches!(err, Error::Definition { .. }));
    }

    #[test]
    fn test_invalid_properties_rejected() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register("Broken", props(&[("", TypeModel::int())]))
            .unwrap_err();
        assert!(matches!(err, Error::Definition { ref source, .. } if source == "Broken"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_schema() {
        let err = registry().properties("Missing").unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { ref schema } if schema == "Missing"));
    }

    #[test]
    fn test_merge_overrides_and_excludes() {
        let registry = registry();
        let merged = registry
            .merge(
                &["User", "Audit"],
                props(&[("name", TypeModel::string().optional())]),
                &["email"],
            )
            .unwrap();

        assert_eq!(keys(&merged), vec!["id", "name", "created_at"]);
        assert_eq!(merged["id"].type_model(), &TypeModel::string());
        assert!(!merged["name"].type_model().is_required());
    }

    #[test]
    fn test_only_keeps_schema_order() {
        let only = registry().only("User", &["email", "id"]).unwrap();
        assert_eq!(keys(&only), vec!["id", "email"]);
    }
}
