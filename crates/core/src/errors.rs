use thiserror::Error;

/// Structural problems in a runtime-defined request schema.
///
/// These surface when a schema is registered or edited, never during a
/// conversation: the engines treat an unresolvable or broken schema as a
/// silent no-op and stay usable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SchemaValidationError {
    #[error("schema `{schema_id}` declares field key `{key}` more than once")]
    DuplicateFieldKey { schema_id: String, key: String },
    #[error("enum field `{key}` in schema `{schema_id}` has no values")]
    EmptyEnumValues { schema_id: String, key: String },
    #[error("catalog field `{key}` in schema `{schema_id}` has no catalog config")]
    MissingCatalogConfig { schema_id: String, key: String },
    #[error(
        "catalog field `{key}` in schema `{schema_id}` must set value_field and label_field"
    )]
    IncompleteCatalogConfig { schema_id: String, key: String },
}
