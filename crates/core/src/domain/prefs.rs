use serde::{Deserialize, Serialize};

use crate::domain::briefing::Urgency;

/// Sort key for items the preference set does not know about: they go last.
pub const UNKNOWN_ITEM_SORT_ORDER: u32 = 99;

/// Narrowing filter over task urgency. Each step keeps a subset of the
/// previous one: `HighOnly ⊆ MediumUp ⊆ All`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyFilter {
    All,
    MediumUp,
    HighOnly,
}

impl UrgencyFilter {
    pub fn admits(self, urgency: Urgency) -> bool {
        match self {
            UrgencyFilter::All => true,
            UrgencyFilter::MediumUp => urgency != Urgency::Low,
            UrgencyFilter::HighOnly => urgency == Urgency::High,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    Comfortable,
    Compact,
}

/// One user's visibility and ordering choice for a single briefing item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPref {
    pub item_id: String,
    pub visible: bool,
    pub sort_order: u32,
}

impl ItemPref {
    pub fn new(item_id: impl Into<String>, sort_order: u32) -> Self {
        Self { item_id: item_id.into(), visible: true, sort_order }
    }
}

/// Per-user briefing settings. Owned by the preferences store; the pipeline
/// reads a snapshot per invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBriefingPrefs {
    pub active_role_id: String,
    pub item_prefs: Vec<ItemPref>,
    pub urgency_filter: UrgencyFilter,
    /// 0 means unlimited.
    pub max_tasks_per_item: usize,
    pub density: Density,
    pub show_amounts: bool,
    pub show_due_dates: bool,
    pub greeting_name: String,
}

impl UserBriefingPrefs {
    /// Item sort order from the preference set; unknown items sort last.
    pub fn item_sort_order(&self, item_id: &str) -> u32 {
        self.item_prefs
            .iter()
            .find(|pref| pref.item_id == item_id)
            .map_or(UNKNOWN_ITEM_SORT_ORDER, |pref| pref.sort_order)
    }

    /// Items without a preference entry default to visible. The default
    /// preference set enumerates every seeded item, so a missing entry only
    /// arises for config items added after the prefs were saved.
    pub fn item_visible(&self, item_id: &str) -> bool {
        self.item_prefs.iter().find(|pref| pref.item_id == item_id).map_or(true, |pref| {
            pref.visible
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Density, ItemPref, UrgencyFilter, UserBriefingPrefs, UNKNOWN_ITEM_SORT_ORDER};
    use crate::domain::briefing::Urgency;

    fn prefs() -> UserBriefingPrefs {
        UserBriefingPrefs {
            active_role_id: "manager".to_string(),
            item_prefs: vec![
                ItemPref::new("pr_approval", 0),
                ItemPref { item_id: "bidding".to_string(), visible: false, sort_order: 1 },
            ],
            urgency_filter: UrgencyFilter::All,
            max_tasks_per_item: 0,
            density: Density::Comfortable,
            show_amounts: true,
            show_due_dates: true,
            greeting_name: "김관리자".to_string(),
        }
    }

    #[test]
    fn urgency_filters_are_pure_narrowings() {
        for urgency in [Urgency::High, Urgency::Medium, Urgency::Low] {
            if UrgencyFilter::HighOnly.admits(urgency) {
                assert!(UrgencyFilter::MediumUp.admits(urgency));
            }
            if UrgencyFilter::MediumUp.admits(urgency) {
                assert!(UrgencyFilter::All.admits(urgency));
            }
        }
    }

    #[test]
    fn unknown_items_sort_last_and_stay_visible() {
        let prefs = prefs();
        assert_eq!(prefs.item_sort_order("contract"), UNKNOWN_ITEM_SORT_ORDER);
        assert!(prefs.item_visible("contract"));
    }

    #[test]
    fn hidden_items_report_invisible() {
        let prefs = prefs();
        assert!(!prefs.item_visible("bidding"));
        assert_eq!(prefs.item_sort_order("pr_approval"), 0);
    }
}
