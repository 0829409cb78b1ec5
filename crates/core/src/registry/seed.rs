//! Seed configuration and sample records for the in-memory stores.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use crate::domain::briefing::{BriefingItem, BriefingRole, TaskTemplate, Urgency};
use crate::domain::prefs::{Density, ItemPref, UrgencyFilter, UserBriefingPrefs};
use crate::domain::request::{Request, RequestStatus};
use crate::domain::schema::{FieldSchema, FieldType, FieldValue, RequestSchema};

/// The three stock purchase categories with their required fields.
pub fn default_schemas() -> Vec<RequestSchema> {
    vec![
        RequestSchema {
            id: "general".to_string(),
            label: "일반 구매".to_string(),
            description: "사무용품, 가구, 비품 등 일반적인 구매요청".to_string(),
            icon: Some("Package".to_string()),
            color: Some("violet".to_string()),
            active: true,
            fields: vec![
                FieldSchema::new("itemName", "품목명", FieldType::String, true)
                    .with_description("구매할 품목의 이름")
                    .with_placeholder("예: A4용지, 사무용 의자"),
                FieldSchema::new("quantity", "수량", FieldType::Number, true)
                    .with_description("구매 수량")
                    .with_min(1),
                FieldSchema::new("desiredDeliveryDate", "희망 납품일", FieldType::Date, true)
                    .with_description("납품 받고 싶은 날짜")
                    .with_placeholder("예: 2025-03-15"),
                FieldSchema::new("budget", "예산", FieldType::Number, true)
                    .with_description("예상 예산 (원 단위)")
                    .with_min(0),
                FieldSchema::new("reason", "구매 사유", FieldType::Text, true)
                    .with_description("구매가 필요한 이유"),
            ],
        },
        RequestSchema {
            id: "it_asset".to_string(),
            label: "IT 자산".to_string(),
            description: "노트북, 모니터, 서버 등 IT 장비 구매요청".to_string(),
            icon: Some("Monitor".to_string()),
            color: Some("blue".to_string()),
            active: true,
            fields: vec![
                FieldSchema::new("equipmentType", "장비 종류", FieldType::Enum, true)
                    .with_values(&["노트북", "데스크톱", "모니터", "서버/네트워크"])
                    .with_description("구매할 IT 장비의 종류"),
                FieldSchema::new("specs", "사양", FieldType::Text, true)
                    .with_description("필요한 장비 사양")
                    .with_placeholder("예: Intel i7, RAM 32GB, SSD 1TB"),
                FieldSchema::new("quantity", "수량", FieldType::Number, true)
                    .with_description("구매 수량 (대)")
                    .with_min(1),
                FieldSchema::new("user", "사용자", FieldType::String, true)
                    .with_description("장비를 사용할 사람 (수령인)"),
                FieldSchema::new("department", "부서", FieldType::Enum, true)
                    .with_values(&["개발팀", "마케팅팀", "경영지원팀", "인사팀"])
                    .with_description("사용자 소속 부서"),
            ],
        },
        RequestSchema {
            id: "mro".to_string(),
            label: "MRO / 소모품".to_string(),
            description: "사무용지, 토너, 청소용품 등 소모성 자재 구매요청".to_string(),
            icon: Some("Wrench".to_string()),
            color: Some("amber".to_string()),
            active: true,
            fields: vec![
                FieldSchema::new("consumableName", "소모품명", FieldType::String, true)
                    .with_description("구매할 소모품의 이름")
                    .with_placeholder("예: A4용지, 복합기 토너"),
                FieldSchema::new("quantity", "수량", FieldType::Number, true)
                    .with_description("구매 수량")
                    .with_min(1),
                FieldSchema::new("urgency", "긴급도", FieldType::Enum, true)
                    .with_values(&["high", "medium", "low"])
                    .with_description("긴급도 (high=1-2일, medium=3-5일, low=1-2주)"),
                FieldSchema::new("deliveryAddress", "배송지", FieldType::String, true)
                    .with_description("배송받을 주소 또는 사무실 위치")
                    .with_placeholder("예: 본사 3층 경영지원팀"),
            ],
        },
    ]
}

pub fn default_roles() -> Vec<BriefingRole> {
    vec![
        BriefingRole {
            id: "requester".to_string(),
            label: "구매요청자".to_string(),
            description: "구매요청을 생성하고 진행상황을 확인".to_string(),
            icon: "User".to_string(),
            sort_order: 0,
        },
        BriefingRole {
            id: "manager".to_string(),
            label: "구매담당자".to_string(),
            description: "구매요청 승인, 입찰, 계약, 발주 등 실무 처리".to_string(),
            icon: "Briefcase".to_string(),
            sort_order: 1,
        },
        BriefingRole {
            id: "admin".to_string(),
            label: "구매관리자".to_string(),
            description: "구매 프로세스 전체 모니터링 및 관리".to_string(),
            icon: "Shield".to_string(),
            sort_order: 2,
        },
    ]
}

fn item(
    id: &str,
    role_id: &str,
    label: &str,
    icon: &str,
    color: &str,
    description: &str,
    agent_id: &str,
    detail_url_template: &str,
    sort_order: u32,
) -> BriefingItem {
    BriefingItem {
        id: id.to_string(),
        role_id: role_id.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        description: description.to_string(),
        agent_id: Some(agent_id.to_string()),
        detail_url_template: Some(detail_url_template.to_string()),
        enabled: true,
        sort_order,
    }
}

pub fn default_items() -> Vec<BriefingItem> {
    vec![
        item(
            "my_pr_status",
            "requester",
            "내 요청 현황",
            "FileText",
            "blue",
            "내가 생성한 구매요청 진행상황",
            "agent-pr",
            "/procurement/pr/{taskId}",
            0,
        ),
        item(
            "my_approvals",
            "requester",
            "승인 대기",
            "Clock",
            "amber",
            "내 요청 중 승인 대기 건",
            "agent-approval",
            "/procurement/approval/{taskId}",
            1,
        ),
        item(
            "pr_approval",
            "manager",
            "구매요청 승인",
            "FileText",
            "amber",
            "구매요청 승인/반려 처리",
            "agent-approval",
            "/procurement/pr/{taskId}",
            0,
        ),
        item(
            "bidding",
            "manager",
            "입찰/견적",
            "Clock",
            "blue",
            "입찰 및 견적 비교 업무",
            "agent-bidding",
            "/procurement/bid/{taskId}",
            1,
        ),
        item(
            "contract",
            "manager",
            "계약 관리",
            "FileText",
            "violet",
            "계약 체결 및 갱신 관리",
            "agent-contract",
            "/procurement/contract/{taskId}",
            2,
        ),
        item(
            "po_delivery",
            "manager",
            "발주/납품",
            "Package",
            "green",
            "발주 및 납품/검수 관리",
            "agent-delivery",
            "/procurement/po/{taskId}",
            3,
        ),
        item(
            "vendor",
            "manager",
            "협력사 관리",
            "Monitor",
            "red",
            "협력사 등록 및 평가",
            "agent-vendor",
            "/procurement/vendor/{taskId}",
            4,
        ),
        item(
            "overdue_monitor",
            "admin",
            "지연 모니터링",
            "Clock",
            "red",
            "처리 기한 초과 건 모니터링",
            "agent-analytics",
            "/procurement/overdue/{taskId}",
            0,
        ),
        item(
            "compliance_check",
            "admin",
            "규정 준수",
            "Shield",
            "violet",
            "구매 규정 준수 현황 점검",
            "agent-compliance",
            "/procurement/compliance/{taskId}",
            1,
        ),
        item(
            "purchase_stats",
            "admin",
            "구매 통계",
            "Monitor",
            "cyan",
            "구매 실적 및 통계 분석",
            "agent-analytics",
            "/procurement/stats/{taskId}",
            2,
        ),
    ]
}

pub fn default_templates() -> Vec<TaskTemplate> {
    vec![
        TaskTemplate::new(
            "REQ-001",
            "my_pr_status",
            "노트북 구매요청 진행 중",
            "개발팀 노트북 5대 — 견적 비교 단계",
            Urgency::Medium,
        )
        .with_amount(8_500_000),
        TaskTemplate::new(
            "REQ-002",
            "my_approvals",
            "사무용품 구매요청 승인 대기",
            "경영지원팀 — 승인 대기 D-1",
            Urgency::High,
        )
        .with_amount(350_000)
        .with_due_date("2025-02-08"),
        TaskTemplate::new(
            "BID-001",
            "bidding",
            "서버 장비 입찰 마감 임박",
            "3개 업체 견적 비교 필요 — 마감 D-2",
            Urgency::High,
        )
        .with_amount(15_000_000)
        .with_due_date("2025-02-09")
        .with_vendor("한국IT솔루션 외 2곳"),
        TaskTemplate::new(
            "BID-002",
            "bidding",
            "사무가구 견적 요청 발송",
            "스탠딩 데스크 6대 — 견적서 3곳 대기 중",
            Urgency::Medium,
        )
        .with_amount(3_600_000)
        .with_due_date("2025-02-14"),
        TaskTemplate::new(
            "CTR-001",
            "contract",
            "복합기 유지보수 계약 갱신",
            "(주)오피스프로 — 계약 만료 D-7",
            Urgency::High,
        )
        .with_amount(12_000_000)
        .with_due_date("2025-02-14")
        .with_vendor("(주)오피스프로"),
        TaskTemplate::new(
            "CTR-002",
            "contract",
            "IT 장비 연간 단가 계약 검토",
            "델/레노버 노트북 단가 계약서 검토 대기",
            Urgency::Medium,
        )
        .with_amount(50_000_000)
        .with_vendor("Dell Korea / Lenovo"),
        TaskTemplate::new(
            "PO-001",
            "po_delivery",
            "외장 모니터 발주 확인",
            "LG전자 — 8대 발주 완료, 납품 예정 2/12",
            Urgency::Low,
        )
        .with_amount(4_800_000)
        .with_due_date("2025-02-12")
        .with_vendor("LG전자"),
        TaskTemplate::new(
            "PO-002",
            "po_delivery",
            "복사용지 입고 검수 필요",
            "한솔제지 — 20박스 도착, 검수 대기",
            Urgency::Medium,
        )
        .with_amount(120_000)
        .with_vendor("한솔제지"),
        TaskTemplate::new(
            "VND-001",
            "vendor",
            "신규 협력사 등록 심사",
            "(주)테크서플라이 — 서류 심사 진행 중",
            Urgency::Medium,
        )
        .with_vendor("(주)테크서플라이"),
        TaskTemplate::new(
            "VND-002",
            "vendor",
            "협력사 평가 마감 임박",
            "2024년 하반기 협력사 실적 평가 — D-3",
            Urgency::High,
        )
        .with_due_date("2025-02-10"),
        TaskTemplate::new(
            "ADM-001",
            "overdue_monitor",
            "계약 갱신 기한 초과 2건",
            "오피스프로 외 1건 — 처리 지연 중",
            Urgency::High,
        )
        .with_due_date("2025-02-07"),
        TaskTemplate::new(
            "ADM-002",
            "compliance_check",
            "분할 발주 규정 위반 의심",
            "마케팅팀 소모품 발주 — 건당 한도 초과 가능",
            Urgency::High,
        ),
        TaskTemplate::new(
            "ADM-003",
            "purchase_stats",
            "1월 구매 실적 리포트",
            "월간 구매 금액 12.5억 — 전월 대비 8% 증가",
            Urgency::Low,
        )
        .with_amount(1_250_000_000),
    ]
}

pub fn default_prefs() -> UserBriefingPrefs {
    UserBriefingPrefs {
        active_role_id: "manager".to_string(),
        item_prefs: vec![
            ItemPref::new("my_pr_status", 0),
            ItemPref::new("my_approvals", 1),
            ItemPref::new("pr_approval", 0),
            ItemPref::new("bidding", 1),
            ItemPref::new("contract", 2),
            ItemPref::new("po_delivery", 3),
            ItemPref::new("vendor", 4),
            ItemPref::new("overdue_monitor", 0),
            ItemPref::new("compliance_check", 1),
            ItemPref::new("purchase_stats", 2),
        ],
        urgency_filter: UrgencyFilter::All,
        max_tasks_per_item: 0,
        density: Density::Comfortable,
        show_amounts: true,
        show_due_dates: true,
        greeting_name: "김관리자".to_string(),
    }
}

fn text_entry(key: &str, value: &str) -> (String, FieldValue) {
    (key.to_string(), FieldValue::Text(value.to_string()))
}

fn number_entry(key: &str, value: i64) -> (String, FieldValue) {
    (key.to_string(), FieldValue::Number(value))
}

/// A few live records for the briefing and dashboard to chew on. Two pending
/// requests surface as approval tasks; the approved one must not.
pub fn sample_requests() -> Vec<Request> {
    vec![
        Request {
            id: "PR-2025-101".to_string(),
            category: "general".to_string(),
            title: "A4용지 구매".to_string(),
            status: RequestStatus::Pending,
            requester: "박지은".to_string(),
            department: "경영지원팀".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 2, 5, 9, 30, 0).single().unwrap_or_default(),
            amount: 150_000,
            fields: BTreeMap::from([
                text_entry("itemName", "A4용지"),
                number_entry("quantity", 30),
                text_entry("desiredDeliveryDate", "2025-02-10"),
                number_entry("budget", 150_000),
                text_entry("reason", "재고 소진 임박"),
            ]),
        },
        Request {
            id: "PR-2025-102".to_string(),
            category: "mro".to_string(),
            title: "복합기 토너 구매".to_string(),
            status: RequestStatus::Pending,
            requester: "이수진".to_string(),
            department: "마케팅팀".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 2, 6, 14, 0, 0).single().unwrap_or_default(),
            amount: 80_000,
            fields: BTreeMap::from([
                text_entry("consumableName", "복합기 토너"),
                number_entry("quantity", 8),
                text_entry("urgency", "high"),
                text_entry("deliveryAddress", "본사 3층 경영지원팀"),
            ]),
        },
        Request {
            id: "PR-2025-099".to_string(),
            category: "it_asset".to_string(),
            title: "노트북 구매".to_string(),
            status: RequestStatus::Approved,
            requester: "최민호".to_string(),
            department: "개발팀".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 28, 11, 15, 0).single().unwrap_or_default(),
            amount: 4_400_000,
            fields: BTreeMap::from([
                text_entry("equipmentType", "노트북"),
                text_entry("specs", "Intel i7, RAM 32GB, SSD 1TB"),
                number_entry("quantity", 2),
                text_entry("user", "최민호"),
                text_entry("department", "개발팀"),
            ]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{default_items, default_prefs, default_templates, sample_requests};
    use crate::domain::request::RequestStatus;

    #[test]
    fn every_template_points_at_a_seeded_item() {
        let items = default_items();
        for template in default_templates() {
            assert!(
                items.iter().any(|item| item.id == template.item_id),
                "template {} references unknown item {}",
                template.id,
                template.item_id
            );
        }
    }

    #[test]
    fn every_seeded_item_has_a_preference_row() {
        let prefs = default_prefs();
        for item in default_items() {
            assert!(
                prefs.item_prefs.iter().any(|pref| pref.item_id == item.id),
                "item {} has no preference row",
                item.id
            );
        }
    }

    #[test]
    fn sample_records_include_pending_and_settled_requests() {
        let records = sample_requests();
        assert!(records.iter().any(|record| record.status == RequestStatus::Pending));
        assert!(records.iter().any(|record| record.status == RequestStatus::Approved));
    }
}
