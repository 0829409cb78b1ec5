use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::schema::FieldValue;

/// Field key to collected value. Grows monotonically over one conversation
/// and never loses a previously collected key.
pub type CollectedRecord = BTreeMap<String, FieldValue>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InReview,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "대기중",
            RequestStatus::InReview => "승인중",
            RequestStatus::Approved => "승인완료",
            RequestStatus::Rejected => "반려",
        }
    }
}

/// The finalized record produced by a completed conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    /// Schema id of the category the request was collected under.
    pub category: String,
    pub title: String,
    pub status: RequestStatus,
    pub requester: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub amount: i64,
    pub fields: CollectedRecord,
}

impl Request {
    /// Whether the briefing pipeline may synthesize an approval task for this
    /// record.
    pub fn is_approval_eligible(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }
}

/// Request ids follow the `PR-<year>-<nnn>` convention of the upstream
/// procurement system.
pub fn new_request_id() -> String {
    let number = rand::thread_rng().gen_range(100..1000);
    format!("PR-{}-{number}", Utc::now().year())
}

#[cfg(test)]
mod tests {
    use super::{new_request_id, Request, RequestStatus};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn request(status: RequestStatus) -> Request {
        Request {
            id: "PR-2025-101".to_string(),
            category: "general".to_string(),
            title: "A4용지 구매".to_string(),
            status,
            requester: "김관리자".to_string(),
            department: "경영지원팀".to_string(),
            created_at: Utc::now(),
            amount: 50_000,
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn only_pending_requests_are_approval_eligible() {
        assert!(request(RequestStatus::Pending).is_approval_eligible());
        assert!(!request(RequestStatus::InReview).is_approval_eligible());
        assert!(!request(RequestStatus::Approved).is_approval_eligible());
        assert!(!request(RequestStatus::Rejected).is_approval_eligible());
    }

    #[test]
    fn request_ids_use_the_pr_convention() {
        let id = new_request_id();
        let mut parts = id.split('-');
        assert_eq!(parts.next(), Some("PR"));
        let year: i32 = parts.next().expect("year segment").parse().expect("numeric year");
        assert!(year >= 2025);
        let number: u32 = parts.next().expect("number segment").parse().expect("numeric id");
        assert!((100..1000).contains(&number));
    }
}
