//! Prompt and reply text for the intake conversation.
//!
//! Pure functions from schema/field state to user-facing Korean copy and the
//! quick-reply options valid in that state. No engine state leaks in here.

use serde::{Deserialize, Serialize};

use crate::domain::schema::{FieldSchema, FieldType, RequestSchema};

/// A labeled token representing one valid next input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

// Navigation tokens shared with the presentation layer.
pub const RESTART_VALUE: &str = "__restart__";
pub const DASHBOARD_VALUE: &str = "__dashboard__";
pub const BACK_TO_LIST_VALUE: &str = "__back_to_list__";
pub const APPROVE_PREFIX: &str = "__approve__:";

pub const SUBMIT_VALUE: &str = "submit";
pub const RESET_VALUE: &str = "reset";
pub const CANCEL_VALUE: &str = "cancel";

pub fn intake_greeting() -> String {
    "안녕하세요! 구매요청 도우미입니다.\n어떤 유형의 구매를 요청하시겠습니까?".to_string()
}

pub fn category_greeting(schema: &RequestSchema) -> String {
    format!("{} 구매요청이시군요! 몇 가지 정보를 여쭤볼게요.", schema.label)
}

/// The question for one field, prefixed with an echo acknowledgement of the
/// previous answer when there is one. The echo repeats the submitted text
/// verbatim, not the coerced value.
pub fn field_question(field: &FieldSchema, previous: Option<&str>) -> String {
    let ack = match previous {
        Some(answer) => format!("'{answer}' 확인했습니다.\n\n"),
        None => String::new(),
    };
    let description = field
        .description
        .as_deref()
        .map(|text| format!(" ({text})"))
        .unwrap_or_default();
    let placeholder = field
        .placeholder
        .as_deref()
        .map(|text| format!("\n예: {text}"))
        .unwrap_or_default();

    match field.field_type {
        FieldType::Enum => {
            format!("{ack}{}을(를) 선택해주세요.{description}", field.label)
        }
        FieldType::Number => {
            format!("{ack}{}을(를) 입력해주세요.{description}{placeholder}", field.label)
        }
        FieldType::Date => {
            let hint = if placeholder.is_empty() { "\n예: 2025-03-15" } else { &placeholder };
            format!("{ack}{}을(를) 알려주세요.{description}{hint}", field.label)
        }
        FieldType::Catalog => format!(
            "{ack}{}을(를) 입력해주세요.{description}{placeholder}\n(카탈로그 검색은 준비 중입니다. 텍스트로 입력해주세요.)",
            field.label
        ),
        FieldType::String | FieldType::Text => {
            format!("{ack}{}을(를) 알려주세요.{description}{placeholder}", field.label)
        }
    }
}

/// Re-ask text for a number answer that failed to parse or fell outside the
/// declared bounds. The cursor does not advance.
pub fn number_retry_question(field: &FieldSchema) -> String {
    let mut text = format!("{}은(는) 숫자로 입력해주세요.", field.label);
    if let Some(validation) = &field.validation {
        match (validation.min, validation.max) {
            (Some(min), Some(max)) => text.push_str(&format!(" ({min} 이상 {max} 이하)")),
            (Some(min), None) => text.push_str(&format!(" ({min} 이상)")),
            (None, Some(max)) => text.push_str(&format!(" ({max} 이하)")),
            (None, None) => {}
        }
    }
    text
}

pub fn confirm_message(schema: &RequestSchema) -> String {
    format!("모든 정보가 입력되었습니다. 아래 내용으로 {} 구매요청을 제출할까요?", schema.label)
}

pub fn submitted_message(request_id: &str) -> String {
    format!(
        "구매요청이 성공적으로 제출되었습니다!\n\n요청번호: {request_id}\n\n대시보드에서 진행 상황을 확인하실 수 있습니다."
    )
}

pub fn cancelled_message() -> String {
    "구매요청이 취소되었습니다. 새로운 요청을 하시려면 아래 버튼을 눌러주세요.".to_string()
}

/// Fixed fallback for unrecognized tokens or free text outside collection,
/// reiterating the currently valid options. Never changes state.
pub fn fallback_message(options: &[QuickReply]) -> String {
    if options.is_empty() {
        return "죄송합니다, 이해하지 못했습니다. 새 구매요청은 시작 버튼으로 열 수 있어요."
            .to_string();
    }
    let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
    format!(
        "죄송합니다, 이해하지 못했습니다.\n다음 중에서 선택해주세요: {}",
        labels.join(" / ")
    )
}

/// Quick replies for an `enum` field; other field types take free text.
pub fn field_options(field: &FieldSchema) -> Vec<QuickReply> {
    if field.field_type == FieldType::Enum {
        field.values.iter().map(|value| QuickReply::new(value, value)).collect()
    } else {
        Vec::new()
    }
}

pub fn confirm_options() -> Vec<QuickReply> {
    vec![
        QuickReply::new("제출하기", SUBMIT_VALUE),
        QuickReply::new("처음부터 다시", RESET_VALUE),
        QuickReply::new("취소하기", CANCEL_VALUE),
    ]
}

pub fn restart_option() -> QuickReply {
    QuickReply::new("새 구매요청", RESTART_VALUE)
}

pub fn dashboard_option() -> QuickReply {
    QuickReply::new("대시보드로 이동", DASHBOARD_VALUE)
}
