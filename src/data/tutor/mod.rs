use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::data::ApprovalStatus;

pub mod db;

pub static TUTOR_COLLECTION_NAME: &str = "tutors";

/// A user's request to be granted the tutor role. Approval or rejection by an
/// admin cascades into the applicant's `User.role` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorApplication {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_applications_default_to_pending() {
        let app: TutorApplication =
            serde_json::from_str(r#"{ "email": "t@x.com", "name": "T" }"#)
                .expect("minimal body should deserialize");
        assert_eq!(app.status, ApprovalStatus::Pending);
        assert!(app.id.is_none());
    }
}
