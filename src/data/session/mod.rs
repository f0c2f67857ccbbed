use bson::oid::ObjectId;
use bson::Document;
use chrono::{DateTime, Utc};

use crate::data::ApprovalStatus;

pub mod db;

pub static SESSION_COLLECTION_NAME: &str = "sessions";
pub static BOOKING_COLLECTION_NAME: &str = "booked_sessions";

/// A tutoring offer. Created by a tutor in pending state, approved or rejected
/// by an admin, and resubmittable after rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "tutorEmail")]
    pub tutor_email: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "registrationFee")]
    pub registration_fee: f64,
    #[serde(default)]
    pub status: ApprovalStatus,

    // Scheduling fields are client-defined and passed through untouched.
    #[serde(flatten)]
    pub extra: Document,
}

/// A student's reservation against a study session. Uniqueness of the
/// (student, session) pair is enforced by an existence check at creation
/// time, not by a storage constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedSession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "studentEmail")]
    pub student_email: String,
    #[serde(rename = "sessionId")]
    pub session_id: ObjectId,
    #[serde(default)]
    pub paid_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_keep_client_defined_scheduling_fields() {
        let session: StudySession = serde_json::from_str(
            r#"{
                "tutorEmail": "t@x.com",
                "title": "Algebra",
                "registrationFee": 12.5,
                "classStart": "2026-09-01",
                "duration": "2h"
            }"#,
        )
        .expect("session body should deserialize");

        assert_eq!(session.status, ApprovalStatus::Pending);
        assert_eq!(session.registration_fee, 12.5);
        assert_eq!(
            session.extra.get_str("classStart").ok(),
            Some("2026-09-01")
        );
    }

    #[test]
    fn bookings_default_to_unpaid() {
        let booking: BookedSession = serde_json::from_str(&format!(
            r#"{{ "studentEmail": "s@x.com", "sessionId": {{ "$oid": "{}" }} }}"#,
            ObjectId::new()
        ))
        .expect("booking body should deserialize");
        assert!(!booking.paid_status);
    }
}
