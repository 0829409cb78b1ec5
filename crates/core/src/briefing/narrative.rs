//! Narrative text over an ordered task list.
//!
//! Every function here is a pure map from the current task list (and read
//! snapshots of records/config) to Korean briefing copy. The briefing engine
//! owns when these render; nothing here touches engine state.

use crate::domain::briefing::{BriefingItem, Task, Urgency};
use crate::domain::prefs::UserBriefingPrefs;
use crate::domain::request::Request;

/// Formats whole-won amounts the way the dashboard does: `₩1,234,567`.
pub fn format_krw(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if negative {
        format!("-₩{grouped}")
    } else {
        format!("₩{grouped}")
    }
}

/// Time-of-day salutation. `hour` is the local 24h clock hour.
pub fn time_greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "좋은 아침이에요"
    } else if hour < 18 {
        "좋은 오후예요"
    } else {
        "좋은 저녁이에요"
    }
}

fn item_label<'a>(items: &'a [BriefingItem], item_id: &'a str) -> &'a str {
    items
        .iter()
        .find(|item| item.id == item_id)
        .map_or(item_id, |item| item.label.as_str())
}

fn item_emoji(item_id: &str) -> &'static str {
    match item_id {
        "pr_approval" => "📝",
        "bidding" => "📊",
        "contract" => "📄",
        "po_delivery" => "📦",
        "vendor" => "🏢",
        _ => "📋",
    }
}

/// The opening briefing summary: salutation, totals, an urgent spotlight when
/// any high-urgency task exists, and one line per distinct item present.
pub fn briefing_greeting(
    prefs: &UserBriefingPrefs,
    tasks: &[Task],
    items: &[BriefingItem],
    hour: u32,
) -> String {
    let urgent: Vec<&Task> = tasks.iter().filter(|task| task.urgency == Urgency::High).collect();
    let total_amount: i64 = tasks.iter().filter_map(|task| task.amount).sum();

    let mut lines = Vec::new();
    lines.push(format!("{} 프로님, {}. ☀️", prefs.greeting_name, time_greeting(hour)));
    lines.push("오늘의 구매 업무 현황을 브리핑 드리겠습니다.".to_string());
    lines.push(String::new());
    lines.push("━━━━━━━━━━━━━━━━━━━━━━".to_string());
    lines.push("📋 오늘의 업무 요약".to_string());
    lines.push(format!(
        "총 {}건의 업무가 대기 중이며, 처리 예상 금액은 {}입니다.",
        tasks.len(),
        format_krw(total_amount)
    ));

    if !urgent.is_empty() {
        let summary: Vec<String> = urgent
            .iter()
            .map(|task| match &task.due_date {
                Some(due) => format!("{}({due})", task.title),
                None => task.title.clone(),
            })
            .collect();
        lines.push(String::new());
        lines.push(format!("🔥 긴급 처리 필요 — {}건", urgent.len()));
        lines.push(summary.join(", "));
        lines.push("즉시 확인이 필요합니다.".to_string());
    }

    lines.push(String::new());
    for (item_id, count, amount) in per_item_totals(tasks) {
        let amount_part = if amount > 0 && prefs.show_amounts {
            format!("  |  {}", format_krw(amount))
        } else {
            String::new()
        };
        lines.push(format!(
            "{} {} — {count}건{amount_part}",
            item_emoji(&item_id),
            item_label(items, &item_id)
        ));
    }
    lines.push("━━━━━━━━━━━━━━━━━━━━━━".to_string());
    lines.push("긴급 건부터 우선순위로 정리해 드렸어요.".to_string());

    lines.join("\n")
}

/// Count and amount per distinct item id, in first-appearance order.
fn per_item_totals(tasks: &[Task]) -> Vec<(String, usize, i64)> {
    let mut totals: Vec<(String, usize, i64)> = Vec::new();
    for task in tasks {
        match totals.iter_mut().find(|(item_id, _, _)| *item_id == task.item_id) {
            Some((_, count, amount)) => {
                *count += 1;
                *amount += task.amount.unwrap_or(0);
            }
            None => totals.push((task.item_id.clone(), 1, task.amount.unwrap_or(0))),
        }
    }
    totals
}

/// Intro over the rendered task list: urgent highlight (or an all-clear) plus
/// the single nearest deadline among non-urgent tasks. The lexicographic date
/// compare relies on due dates being ISO `YYYY-MM-DD`.
pub fn task_list_intro(tasks: &[Task]) -> String {
    let urgent_count = tasks.iter().filter(|task| task.urgency == Urgency::High).count();

    let mut lines = Vec::new();
    if urgent_count > 0 {
        lines.push(format!("🔥 긴급 업무 {urgent_count}건을 상단에 배치했습니다."));
        lines.push("각 항목을 클릭하시면 상세 내용과 처리 옵션을 확인하실 수 있어요.".to_string());
    } else {
        lines.push("현재 긴급 건은 없습니다.".to_string());
        lines.push("각 업무를 클릭하시면 상세 내용을 확인하실 수 있어요.".to_string());
    }

    let nearest_deadline = tasks
        .iter()
        .filter(|task| task.urgency != Urgency::High)
        .filter_map(|task| task.due_date.as_deref().map(|due| (due, task)))
        .min_by(|(a, _), (b, _)| a.cmp(b));
    if let Some((due, task)) = nearest_deadline {
        lines.push(String::new());
        lines.push(format!("📅 가장 가까운 마감: {} ({due})", task.title));
    }

    lines.join("\n")
}

/// Fixed advisory comment per item id; unknown items get a generic line.
fn item_advice(item_id: &str, urgency: Urgency) -> Vec<&'static str> {
    let urgent = urgency == Urgency::High;
    match item_id {
        "pr_approval" => {
            let mut lines = Vec::new();
            if urgent {
                lines.push("⚡ 긴급 구매요청입니다. 현업 부서에서 빠른 처리를 요청하고 있어요.");
            }
            lines.push("💡 승인 시 자동으로 다음 결재 단계로 이관됩니다.");
            lines
        }
        "bidding" => {
            let mut lines = Vec::new();
            if urgent {
                lines.push("⚡ 입찰 마감이 임박했습니다. 견적서 비교 후 빠른 의사결정이 필요해요.");
            }
            lines.push("💡 견적 비교표를 대시보드에서 상세 확인하실 수 있습니다.");
            lines
        }
        "contract" => {
            let mut lines = Vec::new();
            if urgent {
                lines.push("⚡ 계약 만료가 가까워지고 있어요. 갱신 여부를 빠르게 결정해주세요.");
            }
            lines.push("💡 계약 조건 변경 시 법무팀 검토가 필요할 수 있습니다.");
            lines
        }
        "po_delivery" => {
            if urgent {
                vec!["⚡ 긴급 납품 건입니다. 입고 확인 후 즉시 검수를 진행해주세요."]
            } else {
                vec!["💡 납품 완료 후 검수 결과를 시스템에 등록해주세요."]
            }
        }
        "vendor" => {
            let mut lines = Vec::new();
            if urgent {
                lines.push("⚡ 마감이 임박한 협력사 관리 업무입니다.");
            }
            lines.push("💡 협력사 평가 결과는 향후 입찰 참여 자격에 반영됩니다.");
            lines
        }
        _ => vec!["💡 상세 내용은 대시보드에서 확인하실 수 있습니다."],
    }
}

/// One task's full field set, the joined live record when `related_pr_id`
/// resolves, an advisory comment, and a closing call to action.
pub fn task_detail(
    task: &Task,
    records: &[Request],
    items: &[BriefingItem],
    show_amounts: bool,
    show_due_dates: bool,
) -> String {
    let mut lines = Vec::new();
    lines.push(format!("📌 {}", task.title));
    lines.push(String::new());
    lines.push(format!("분류: {}", item_label(items, &task.item_id)));
    lines.push(format!("긴급도: {}", task.urgency.label()));
    if let Some(requester) = &task.requester {
        match &task.department {
            Some(department) => lines.push(format!("요청자: {requester} ({department})")),
            None => lines.push(format!("요청자: {requester}")),
        }
    }
    if let Some(vendor) = &task.vendor {
        lines.push(format!("거래처: {vendor}"));
    }
    if show_amounts {
        if let Some(amount) = task.amount {
            lines.push(format!("금액: {}", format_krw(amount)));
        }
    }
    if show_due_dates {
        if let Some(due) = &task.due_date {
            lines.push(format!("처리 기한: {due}"));
        }
    }

    if let Some(record) = task
        .related_pr_id
        .as_deref()
        .and_then(|pr_id| records.iter().find(|record| record.id == pr_id))
    {
        lines.push(String::new());
        lines.push(format!("── 관련 구매요청 ({}) ──", record.id));
        lines.push(format!(
            "상태: {}  |  분류: {}",
            record.status.label(),
            record.category
        ));
        for (key, value) in &record.fields {
            lines.push(format!("• {key}: {value}"));
        }
    }

    let advice = item_advice(&task.item_id, task.urgency);
    if !advice.is_empty() {
        lines.push(String::new());
        lines.extend(advice.iter().map(|line| (*line).to_string()));
    }

    lines.push(String::new());
    lines.push("어떻게 처리하시겠어요?".to_string());
    lines.join("\n")
}

pub fn approval_confirmation(pr_id: &str, task: Option<&Task>, tasks: &[Task]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("✅ {pr_id} 구매요청이 승인 처리되었습니다."));
    if let Some(requester) = task.and_then(|task| task.requester.as_deref()) {
        lines.push(String::new());
        lines.push(format!(
            "{requester}님에게 승인 알림이 발송되었으며, 다음 결재 단계로 자동 이관됩니다."
        ));
    }
    let other = tasks
        .iter()
        .filter(|other| task.map_or(true, |task| other.id != task.id))
        .count();
    lines.push(String::new());
    if other > 0 {
        lines.push(format!("이 외에 확인하실 업무가 {other}건 남아 있습니다. 계속 진행하시겠어요?"));
    } else {
        lines.push("다른 업무를 계속 확인하시겠어요?".to_string());
    }
    lines.join("\n")
}

pub fn back_to_list(tasks: &[Task]) -> String {
    let urgent_remaining = tasks.iter().filter(|task| task.urgency == Urgency::High).count();
    let mut lines = Vec::new();
    lines.push(format!("📋 남은 업무 {}건입니다.", tasks.len()));
    if urgent_remaining > 0 {
        lines.push(format!(
            "그 중 긴급 건이 {urgent_remaining}건 남아 있어요. 우선 처리를 권장드립니다."
        ));
    } else {
        lines.push("긴급 건은 모두 처리되었습니다. 나머지 업무를 여유있게 진행하세요.".to_string());
    }
    lines.join("\n")
}

/// The explicit "nothing to do" narrative. Empty result sets are not errors.
pub fn empty_briefing() -> String {
    "현재 처리 대기 중인 업무가 없습니다.\n오늘은 여유로운 하루가 되시겠네요! 대시보드에서 전체 현황을 확인하실 수 있어요."
        .to_string()
}

pub fn briefing_fallback() -> String {
    "죄송합니다, 현재 브리핑 모드에서는 자유 대화를 지원하지 않습니다.\n업무 목록에서 항목을 선택하시면 상세 내용과 처리 옵션을 안내해 드릴게요."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        approval_confirmation, back_to_list, briefing_greeting, format_krw, task_detail,
        task_list_intro, time_greeting,
    };
    use crate::domain::briefing::{BriefingItem, Task, TaskSource, Urgency};
    use crate::domain::prefs::{Density, ItemPref, UrgencyFilter, UserBriefingPrefs};
    use crate::domain::request::{Request, RequestStatus};
    use crate::domain::schema::FieldValue;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn task(id: &str, item_id: &str, urgency: Urgency) -> Task {
        Task {
            id: id.to_string(),
            item_id: item_id.to_string(),
            title: format!("{id} 업무"),
            description: String::new(),
            urgency,
            amount: Some(1_000_000),
            due_date: None,
            vendor: None,
            requester: None,
            department: None,
            related_pr_id: None,
            detail_url: None,
            source: TaskSource::Template,
        }
    }

    fn items() -> Vec<BriefingItem> {
        vec![BriefingItem {
            id: "bidding".to_string(),
            role_id: "manager".to_string(),
            label: "입찰/견적".to_string(),
            icon: "Clock".to_string(),
            color: "blue".to_string(),
            description: String::new(),
            agent_id: None,
            detail_url_template: None,
            enabled: true,
            sort_order: 1,
        }]
    }

    fn prefs() -> UserBriefingPrefs {
        UserBriefingPrefs {
            active_role_id: "manager".to_string(),
            item_prefs: vec![ItemPref::new("bidding", 0)],
            urgency_filter: UrgencyFilter::All,
            max_tasks_per_item: 0,
            density: Density::Comfortable,
            show_amounts: true,
            show_due_dates: true,
            greeting_name: "김관리자".to_string(),
        }
    }

    #[test]
    fn krw_amounts_group_thousands() {
        assert_eq!(format_krw(0), "₩0");
        assert_eq!(format_krw(999), "₩999");
        assert_eq!(format_krw(50_000), "₩50,000");
        assert_eq!(format_krw(1_250_000_000), "₩1,250,000,000");
    }

    #[test]
    fn salutation_tracks_the_hour() {
        assert_eq!(time_greeting(8), "좋은 아침이에요");
        assert_eq!(time_greeting(13), "좋은 오후예요");
        assert_eq!(time_greeting(21), "좋은 저녁이에요");
    }

    #[test]
    fn greeting_spotlights_urgent_tasks() {
        let tasks = vec![task("T-1", "bidding", Urgency::High), task("T-2", "bidding", Urgency::Low)];
        let text = briefing_greeting(&prefs(), &tasks, &items(), 9);
        assert!(text.contains("총 2건"));
        assert!(text.contains("🔥 긴급 처리 필요 — 1건"));
        assert!(text.contains("📊 입찰/견적 — 2건"));
        assert!(text.contains(&format_krw(2_000_000)));
    }

    #[test]
    fn greeting_omits_spotlight_without_urgent_tasks() {
        let tasks = vec![task("T-1", "bidding", Urgency::Low)];
        let text = briefing_greeting(&prefs(), &tasks, &items(), 9);
        assert!(!text.contains("🔥"));
    }

    #[test]
    fn greeting_hides_amounts_when_preferred_off() {
        let mut prefs = prefs();
        prefs.show_amounts = false;
        let text = briefing_greeting(&prefs, &[task("T-1", "bidding", Urgency::Low)], &items(), 9);
        assert!(!text.contains("  |  ₩"));
    }

    #[test]
    fn list_intro_surfaces_nearest_non_urgent_deadline() {
        let mut early = task("T-1", "bidding", Urgency::Medium);
        early.due_date = Some("2025-02-09".to_string());
        let mut late = task("T-2", "bidding", Urgency::Medium);
        late.due_date = Some("2025-02-14".to_string());
        let mut urgent = task("T-3", "bidding", Urgency::High);
        urgent.due_date = Some("2025-02-01".to_string());

        let text = task_list_intro(&[urgent, late, early]);
        assert!(text.contains("긴급 업무 1건"));
        assert!(text.contains("가장 가까운 마감: T-1 업무 (2025-02-09)"));
    }

    #[test]
    fn list_intro_reports_all_clear() {
        let text = task_list_intro(&[task("T-1", "bidding", Urgency::Low)]);
        assert!(text.contains("현재 긴급 건은 없습니다."));
    }

    #[test]
    fn detail_joins_the_related_record() {
        let mut fields = BTreeMap::new();
        fields.insert("itemName".to_string(), FieldValue::Text("A4용지".to_string()));
        let record = Request {
            id: "PR-2025-101".to_string(),
            category: "general".to_string(),
            title: "A4용지 구매".to_string(),
            status: RequestStatus::Pending,
            requester: "김관리자".to_string(),
            department: "경영지원팀".to_string(),
            created_at: Utc::now(),
            amount: 50_000,
            fields,
        };
        let mut bound = task("PRA-PR-2025-101", "pr_approval", Urgency::Medium);
        bound.related_pr_id = Some("PR-2025-101".to_string());
        bound.requester = Some("김관리자".to_string());

        let text = task_detail(&bound, &[record], &items(), true, true);
        assert!(text.contains("── 관련 구매요청 (PR-2025-101) ──"));
        assert!(text.contains("상태: 대기중"));
        assert!(text.contains("• itemName: A4용지"));
        assert!(text.contains("💡 승인 시 자동으로 다음 결재 단계로 이관됩니다."));
        assert!(text.ends_with("어떻게 처리하시겠어요?"));
    }

    #[test]
    fn detail_uses_generic_advice_for_unknown_items() {
        let text = task_detail(&task("T-1", "mystery", Urgency::Low), &[], &items(), true, true);
        assert!(text.contains("💡 상세 내용은 대시보드에서 확인하실 수 있습니다."));
    }

    #[test]
    fn detail_respects_amount_and_due_date_prefs() {
        let mut hidden = task("T-1", "bidding", Urgency::Low);
        hidden.due_date = Some("2025-02-12".to_string());
        let text = task_detail(&hidden, &[], &items(), false, false);
        assert!(!text.contains("금액:"));
        assert!(!text.contains("처리 기한:"));
    }

    #[test]
    fn approval_confirmation_mentions_the_requester_and_other_tasks() {
        let mut approved = task("PRA-PR-2025-101", "pr_approval", Urgency::Medium);
        approved.requester = Some("김요청".to_string());
        let session = vec![approved.clone(), task("BID-001", "bidding", Urgency::High)];
        let text = approval_confirmation("PR-2025-101", Some(&approved), &session);
        assert!(text.starts_with("✅ PR-2025-101 구매요청이 승인 처리되었습니다."));
        assert!(text.contains("김요청님에게 승인 알림이 발송되었으며"));
        assert!(text.contains("이 외에 확인하실 업무가 1건 남아 있습니다."));
    }

    #[test]
    fn back_to_list_counts_remaining_urgent_tasks() {
        let with_urgent = back_to_list(&[task("T-1", "bidding", Urgency::High)]);
        assert!(with_urgent.contains("긴급 건이 1건 남아 있어요"));

        let all_clear = back_to_list(&[task("T-1", "bidding", Urgency::Low)]);
        assert!(all_clear.contains("긴급 건은 모두 처리되었습니다."));
    }
}
