//! Derived-field heuristics applied when a collected record is finalized.
//!
//! These are deliberate pattern matches on well-known field keys, kept as
//! named, isolated functions so the state machine never embeds them.
//! Replacing any of them is a design change, not a bug fix.

use chrono::Utc;

use crate::domain::request::{new_request_id, CollectedRecord, Request, RequestStatus};
use crate::domain::schema::{FieldType, RequestSchema};

pub const DEFAULT_REQUESTER: &str = "김관리자";
pub const DEFAULT_DEPARTMENT: &str = "경영지원팀";

const AMOUNT_FIELD_KEYS: [&str; 3] = ["budget", "totalAmount", "amount"];
const QUANTITY_FIELD_KEY: &str = "quantity";
const DEPARTMENT_FIELD_KEY: &str = "department";
const QUANTITY_UNIT_PRICE: i64 = 10_000;

/// Title rule: value of the first `string`/`catalog` field plus " 구매";
/// the schema label when no such field exists or it was never answered.
pub fn derive_title(schema: &RequestSchema, record: &CollectedRecord) -> String {
    let first_string_field = schema
        .fields
        .iter()
        .find(|field| matches!(field.field_type, FieldType::String | FieldType::Catalog));
    match first_string_field.and_then(|field| record.get(&field.key)) {
        Some(value) => format!("{value} 구매"),
        None => schema.label.clone(),
    }
}

/// Amount precedence: a field keyed `budget`/`totalAmount`/`amount`, else
/// `quantity` times a flat 10,000 KRW unit price, else zero.
pub fn derive_amount(schema: &RequestSchema, record: &CollectedRecord) -> i64 {
    let amount_field = schema
        .fields
        .iter()
        .find(|field| AMOUNT_FIELD_KEYS.contains(&field.key.as_str()));
    if let Some(value) = amount_field.and_then(|field| record.get(&field.key)) {
        return value.as_number().unwrap_or(0);
    }

    let quantity_field = schema.fields.iter().find(|field| field.key == QUANTITY_FIELD_KEY);
    if let Some(value) = quantity_field.and_then(|field| record.get(&field.key)) {
        return value.as_number().unwrap_or(0).saturating_mul(QUANTITY_UNIT_PRICE);
    }

    0
}

pub fn derive_department(record: &CollectedRecord) -> String {
    record
        .get(DEPARTMENT_FIELD_KEY)
        .map(|value| value.to_string())
        .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string())
}

/// Freezes a collected record into a pending [`Request`].
pub fn build_request(schema: &RequestSchema, record: &CollectedRecord) -> Request {
    Request {
        id: new_request_id(),
        category: schema.id.clone(),
        title: derive_title(schema, record),
        status: RequestStatus::Pending,
        requester: DEFAULT_REQUESTER.to_string(),
        department: derive_department(record),
        created_at: Utc::now(),
        amount: derive_amount(schema, record),
        fields: record.clone(),
    }
}
