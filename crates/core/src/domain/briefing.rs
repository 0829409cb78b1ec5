use serde::{Deserialize, Serialize};

/// Ordinal priority tag used for sorting and filtering briefing tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Sort rank: high before medium before low.
    pub fn rank(self) -> u8 {
        match self {
            Urgency::High => 0,
            Urgency::Medium => 1,
            Urgency::Low => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::High => "🔴 긴급",
            Urgency::Medium => "🟡 보통",
            Urgency::Low => "🟢 여유",
        }
    }
}

/// A briefing persona. Which items a user sees is scoped by role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingRole {
    pub id: String,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub sort_order: u32,
}

/// A configurable category of recurring work shown in a briefing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingItem {
    pub id: String,
    pub role_id: String,
    pub label: String,
    pub icon: String,
    pub color: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url_template: Option<String>,
    pub enabled: bool,
    pub sort_order: u32,
}

/// A canned, configuration-authored instance of work under an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url_override: Option<String>,
    pub enabled: bool,
}

impl TaskTemplate {
    pub fn new(
        id: impl Into<String>,
        item_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        Self {
            id: id.into(),
            item_id: item_id.into(),
            title: title.into(),
            description: description.into(),
            urgency,
            amount: None,
            due_date: None,
            vendor: None,
            requester: None,
            department: None,
            detail_url_override: None,
            enabled: true,
        }
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }
}

/// Where a derived task came from. Tasks from templates precede tasks from
/// live records in the source union, and the sort is stable over that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    Template,
    LiveRecord,
}

/// A rendered unit of work shown to the user. Derived, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_pr_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
    pub source: TaskSource,
}

/// Substitutes `{taskId}` and `{prId}` placeholders in a detail URL template.
pub fn resolve_detail_url(template: &str, task_id: &str, pr_id: Option<&str>) -> String {
    let resolved = template.replace("{taskId}", task_id);
    match pr_id {
        Some(pr_id) => resolved.replace("{prId}", pr_id),
        None => resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_detail_url, Urgency};

    #[test]
    fn urgency_ranks_order_high_first() {
        assert!(Urgency::High.rank() < Urgency::Medium.rank());
        assert!(Urgency::Medium.rank() < Urgency::Low.rank());
    }

    #[test]
    fn detail_url_substitutes_both_placeholders() {
        let url = resolve_detail_url("/procurement/pr/{taskId}?pr={prId}", "T-1", Some("PR-9"));
        assert_eq!(url, "/procurement/pr/T-1?pr=PR-9");
    }

    #[test]
    fn detail_url_leaves_pr_placeholder_without_a_record() {
        let url = resolve_detail_url("/procurement/bid/{taskId}", "BID-001", None);
        assert_eq!(url, "/procurement/bid/BID-001");
    }
}
