use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SchemaValidationError;

/// Closed set of field data types the conversation engine can interpret.
///
/// Question rendering and value coercion both dispatch on this variant and
/// nowhere else; adding a type means extending exactly those two match arms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Enum,
    Date,
    Text,
    Catalog,
}

impl FieldType {
    /// Coerces a raw conversational answer into a stored value.
    ///
    /// Only `number` fields parse; every other type keeps the submitted text
    /// verbatim (dates stay ISO strings, enum answers stay their token).
    pub fn coerce(self, raw: &str) -> FieldValue {
        match self {
            FieldType::Number => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Number)
                .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
            _ => FieldValue::Text(raw.to_string()),
        }
    }
}

/// A scalar collected from the user for one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => text.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// Advisory numeric bounds for a field. Enforced for `number` fields during
/// collection; other types ignore them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// How a `catalog` field maps search results to a stored value and a shown
/// label. Both fields must be set before the field can be rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub display_fields: Vec<String>,
    pub value_field: String,
    pub label_field: String,
}

/// One typed, possibly-required datum within a request schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_config: Option<CatalogConfig>,
}

impl FieldSchema {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
        required: bool,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required,
            values: Vec::new(),
            validation: None,
            description: None,
            placeholder: None,
            catalog_config: None,
        }
    }

    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values = values.iter().map(|value| (*value).to_string()).collect();
        self
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.validation.get_or_insert_with(FieldValidation::default).min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.validation.get_or_insert_with(FieldValidation::default).max = Some(max);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_catalog_config(mut self, config: CatalogConfig) -> Self {
        self.catalog_config = Some(config);
        self
    }

    /// Whether a parsed numeric answer satisfies the declared bounds.
    pub fn number_in_bounds(&self, value: i64) -> bool {
        let Some(validation) = &self.validation else {
            return true;
        };
        validation.min.map_or(true, |min| value >= min)
            && validation.max.map_or(true, |max| value <= max)
    }
}

/// A runtime-defined request category: an ordered list of typed fields.
///
/// Owned by the schema registry; the conversation engine only ever reads a
/// snapshot per turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSchema {
    pub id: String,
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub fields: Vec<FieldSchema>,
    pub active: bool,
}

impl RequestSchema {
    /// The fields the conversation actually asks, in schema order. Optional
    /// fields are never asked; they can only be set by the editing surface.
    pub fn required_fields(&self) -> Vec<&FieldSchema> {
        self.fields.iter().filter(|field| field.required).collect()
    }

    pub fn validate(&self) -> Result<(), SchemaValidationError> {
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.key.as_str()) {
                return Err(SchemaValidationError::DuplicateFieldKey {
                    schema_id: self.id.clone(),
                    key: field.key.clone(),
                });
            }
            match field.field_type {
                FieldType::Enum if field.values.is_empty() => {
                    return Err(SchemaValidationError::EmptyEnumValues {
                        schema_id: self.id.clone(),
                        key: field.key.clone(),
                    });
                }
                FieldType::Catalog => match &field.catalog_config {
                    None => {
                        return Err(SchemaValidationError::MissingCatalogConfig {
                            schema_id: self.id.clone(),
                            key: field.key.clone(),
                        });
                    }
                    Some(config)
                        if config.value_field.is_empty() || config.label_field.is_empty() =>
                    {
                        return Err(SchemaValidationError::IncompleteCatalogConfig {
                            schema_id: self.id.clone(),
                            key: field.key.clone(),
                        });
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, FieldSchema, FieldType, FieldValue, RequestSchema};
    use crate::errors::SchemaValidationError;

    fn schema(fields: Vec<FieldSchema>) -> RequestSchema {
        RequestSchema {
            id: "general".to_string(),
            label: "일반 구매".to_string(),
            description: "일반적인 구매요청".to_string(),
            icon: None,
            color: None,
            fields,
            active: true,
        }
    }

    #[test]
    fn number_coercion_parses_integers() {
        assert_eq!(FieldType::Number.coerce("  42 "), FieldValue::Number(42));
        assert_eq!(FieldType::Number.coerce("abc"), FieldValue::Text("abc".to_string()));
    }

    #[test]
    fn non_number_types_keep_text_verbatim() {
        assert_eq!(FieldType::Date.coerce("2025-03-15"), FieldValue::Text("2025-03-15".into()));
        assert_eq!(FieldType::String.coerce("100"), FieldValue::Text("100".into()));
    }

    #[test]
    fn bounds_check_is_inclusive() {
        let field = FieldSchema::new("quantity", "수량", FieldType::Number, true)
            .with_min(1)
            .with_max(10);
        assert!(field.number_in_bounds(1));
        assert!(field.number_in_bounds(10));
        assert!(!field.number_in_bounds(0));
        assert!(!field.number_in_bounds(11));
    }

    #[test]
    fn field_without_validation_accepts_any_number() {
        let field = FieldSchema::new("budget", "예산", FieldType::Number, true);
        assert!(field.number_in_bounds(i64::MIN));
    }

    #[test]
    fn required_fields_preserve_schema_order() {
        let schema = schema(vec![
            FieldSchema::new("a", "A", FieldType::String, true),
            FieldSchema::new("b", "B", FieldType::Text, false),
            FieldSchema::new("c", "C", FieldType::Number, true),
        ]);
        let keys: Vec<&str> =
            schema.required_fields().iter().map(|field| field.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn enum_without_values_is_rejected() {
        let schema = schema(vec![FieldSchema::new("dept", "부서", FieldType::Enum, true)]);
        assert!(matches!(
            schema.validate(),
            Err(SchemaValidationError::EmptyEnumValues { .. })
        ));
    }

    #[test]
    fn catalog_requires_value_and_label_fields() {
        let bare = schema(vec![FieldSchema::new("item", "품목", FieldType::Catalog, true)]);
        assert!(matches!(
            bare.validate(),
            Err(SchemaValidationError::MissingCatalogConfig { .. })
        ));

        let incomplete = schema(vec![FieldSchema::new("item", "품목", FieldType::Catalog, true)
            .with_catalog_config(CatalogConfig {
                display_fields: vec!["name".into()],
                value_field: "id".into(),
                label_field: String::new(),
            })]);
        assert!(matches!(
            incomplete.validate(),
            Err(SchemaValidationError::IncompleteCatalogConfig { .. })
        ));
    }

    #[test]
    fn duplicate_field_keys_are_rejected() {
        let schema = schema(vec![
            FieldSchema::new("quantity", "수량", FieldType::Number, true),
            FieldSchema::new("quantity", "수량(재)", FieldType::Number, false),
        ]);
        assert!(matches!(
            schema.validate(),
            Err(SchemaValidationError::DuplicateFieldKey { .. })
        ));
    }
}
