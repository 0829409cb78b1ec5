//! The briefing aggregation pipeline.
//!
//! A pure, side-effect-free transform from live records, enabled config, and
//! user preferences to one canonically ordered task list:
//!
//! 1. source union — template tasks first, then approval tasks synthesized
//!    from pending live records,
//! 2. urgency filter,
//! 3. stable sort by (item sort order, urgency rank),
//! 4. per-item cap, applied after sorting so the kept tasks are always the
//!    highest-priority ones.

use std::collections::BTreeMap;

use crate::briefing::narrative::format_krw;
use crate::domain::briefing::{resolve_detail_url, BriefingItem, Task, TaskSource, TaskTemplate, Urgency};
use crate::domain::prefs::UserBriefingPrefs;
use crate::domain::request::Request;
use crate::domain::schema::FieldValue;

/// Live pending records always surface under this briefing item.
pub const PR_APPROVAL_ITEM_ID: &str = "pr_approval";

pub fn assemble_tasks(
    live_records: &[Request],
    enabled_items: &[BriefingItem],
    enabled_templates: &[TaskTemplate],
    prefs: &UserBriefingPrefs,
) -> Vec<Task> {
    let mut tasks = Vec::new();

    for template in enabled_templates.iter().filter(|template| template.enabled) {
        let Some(item) = enabled_items
            .iter()
            .find(|item| item.enabled && item.id == template.item_id)
        else {
            continue;
        };
        if !prefs.item_visible(&template.item_id) {
            continue;
        }
        tasks.push(template_task(template, item));
    }

    // Live records never bypass visibility rules: they only surface when the
    // approval item itself is enabled and visible.
    let approval_item = enabled_items
        .iter()
        .find(|item| item.enabled && item.id == PR_APPROVAL_ITEM_ID);
    if let Some(item) = approval_item {
        if prefs.item_visible(PR_APPROVAL_ITEM_ID) {
            for record in live_records.iter().filter(|record| record.is_approval_eligible()) {
                tasks.push(approval_task(record, item));
            }
        }
    }

    tasks.retain(|task| prefs.urgency_filter.admits(task.urgency));

    // sort_by_key is stable, so equal keys keep union order.
    tasks.sort_by_key(|task| (prefs.item_sort_order(&task.item_id), task.urgency.rank()));

    if prefs.max_tasks_per_item > 0 {
        let mut kept: BTreeMap<String, usize> = BTreeMap::new();
        tasks.retain(|task| {
            let count = kept.entry(task.item_id.clone()).or_insert(0);
            *count += 1;
            *count <= prefs.max_tasks_per_item
        });
    }

    tasks
}

fn template_task(template: &TaskTemplate, item: &BriefingItem) -> Task {
    let url_template = template
        .detail_url_override
        .as_deref()
        .or(item.detail_url_template.as_deref());
    Task {
        id: template.id.clone(),
        item_id: template.item_id.clone(),
        title: template.title.clone(),
        description: template.description.clone(),
        urgency: template.urgency,
        amount: template.amount,
        due_date: template.due_date.clone(),
        vendor: template.vendor.clone(),
        requester: template.requester.clone(),
        department: template.department.clone(),
        related_pr_id: None,
        detail_url: url_template.map(|url| resolve_detail_url(url, &template.id, None)),
        source: TaskSource::Template,
    }
}

fn approval_task(record: &Request, item: &BriefingItem) -> Task {
    let task_id = format!("PRA-{}", record.id);
    Task {
        id: task_id.clone(),
        item_id: item.id.clone(),
        title: record.title.clone(),
        description: format!(
            "{} ({}) — {}",
            record.requester,
            record.department,
            format_krw(record.amount)
        ),
        urgency: record_urgency(record),
        amount: Some(record.amount),
        due_date: None,
        vendor: None,
        requester: Some(record.requester.clone()),
        department: Some(record.department.clone()),
        related_pr_id: Some(record.id.clone()),
        detail_url: item
            .detail_url_template
            .as_deref()
            .map(|url| resolve_detail_url(url, &task_id, Some(&record.id))),
        source: TaskSource::LiveRecord,
    }
}

/// A record that collected `urgency = high` produces an urgent approval task;
/// everything else lands at medium.
fn record_urgency(record: &Request) -> Urgency {
    match record.fields.get("urgency") {
        Some(FieldValue::Text(value)) if value == "high" => Urgency::High,
        _ => Urgency::Medium,
    }
}
