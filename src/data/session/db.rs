use bson::doc;
use bson::oid::ObjectId;
use bson::Document;
use chrono::Utc;
use mongodb::Database;
use rocket::futures::StreamExt;
use rocket::http::Status;

use super::{BookedSession, StudySession, BOOKING_COLLECTION_NAME, SESSION_COLLECTION_NAME};
use crate::data::{filter, ApprovalStatus};
use crate::resp::problem::Problem;

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn session_not_found() -> Problem {
        Problem::new_untyped(Status::NotFound, "Study session doesn't exist.")
    }

    #[inline]
    pub fn already_booked() -> Problem {
        Problem::new_untyped(Status::BadRequest, "Session already booked by this student.")
    }
}

pub trait SessionDbExt {
    async fn create_session(&self, session: StudySession) -> Result<ObjectId, Problem>;

    async fn list_sessions(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<StudySession>, Problem>;

    async fn get_session(&self, id: ObjectId) -> Result<Option<StudySession>, Problem>;

    async fn delete_session(&self, id: ObjectId) -> Result<u64, Problem>;

    /// Admin approval or rejection, with an optional registration fee override.
    async fn set_session_status(
        &self,
        id: ObjectId,
        status: ApprovalStatus,
        registration_fee: Option<f64>,
    ) -> Result<u64, Problem>;

    /// Puts a rejected session back into the review queue.
    async fn resubmit_session(&self, id: ObjectId) -> Result<u64, Problem>;
}

impl SessionDbExt for Database {
    async fn create_session(&self, mut session: StudySession) -> Result<ObjectId, Problem> {
        session.id = None;
        session.status = ApprovalStatus::Pending;

        let inserted = self
            .collection::<StudySession>(SESSION_COLLECTION_NAME)
            .insert_one(&session, None)
            .await?;

        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }

    async fn list_sessions(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<StudySession>, Problem> {
        let mut cursor = self
            .collection::<StudySession>(SESSION_COLLECTION_NAME)
            .find(status.map(filter::by_status), None)
            .await?;

        let mut sessions = vec![];
        while let Some(session) = cursor.next().await {
            match session {
                Ok(it) => sessions.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize StudySession document.")
                }
            }
        }

        Ok(sessions)
    }

    async fn get_session(&self, id: ObjectId) -> Result<Option<StudySession>, Problem> {
        self.collection(SESSION_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn delete_session(&self, id: ObjectId) -> Result<u64, Problem> {
        let result = self
            .collection::<StudySession>(SESSION_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?;

        Ok(result.deleted_count)
    }

    async fn set_session_status(
        &self,
        id: ObjectId,
        status: ApprovalStatus,
        registration_fee: Option<f64>,
    ) -> Result<u64, Problem> {
        let mut update = doc! { "status": status.to_string() };
        if let Some(fee) = registration_fee {
            update.insert("registrationFee", fee);
        }

        let result = self
            .collection::<StudySession>(SESSION_COLLECTION_NAME)
            .update_one(filter::by_id(id), doc! { "$set": update }, None)
            .await?;

        Ok(result.modified_count)
    }

    async fn resubmit_session(&self, id: ObjectId) -> Result<u64, Problem> {
        self.set_session_status(id, ApprovalStatus::Pending, None)
            .await
    }
}

fn duplicate_booking_filter(student_email: &str, session_id: ObjectId) -> Document {
    doc! { "studentEmail": student_email, "sessionId": session_id }
}

pub trait BookingDbExt {
    /// Creates a booking unless the (student, session) pair already exists.
    async fn create_booking(&self, booking: BookedSession) -> Result<ObjectId, Problem>;

    async fn bookings_by_student(&self, email: &str) -> Result<Vec<BookedSession>, Problem>;
}

impl BookingDbExt for Database {
    async fn create_booking(&self, mut booking: BookedSession) -> Result<ObjectId, Problem> {
        let bookings = self.collection::<BookedSession>(BOOKING_COLLECTION_NAME);

        // Existence check only; no unique index backs this up.
        let duplicate = bookings
            .find_one(
                duplicate_booking_filter(&booking.student_email, booking.session_id),
                None,
            )
            .await?;
        if duplicate.is_some() {
            return Err(problem::already_booked());
        }

        booking.id = None;
        booking.paid_status = false;
        booking.booked_at = Some(Utc::now());

        let inserted = bookings.insert_one(&booking, None).await?;
        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }

    async fn bookings_by_student(&self, email: &str) -> Result<Vec<BookedSession>, Problem> {
        let mut cursor = self
            .collection::<BookedSession>(BOOKING_COLLECTION_NAME)
            .find(doc! { "studentEmail": email }, None)
            .await?;

        let mut bookings = vec![];
        while let Some(booking) = cursor.next().await {
            match booking {
                Ok(it) => bookings.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize BookedSession document.")
                }
            }
        }

        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_check_matches_the_exact_student_session_pair() {
        let session = ObjectId::new();
        assert_eq!(
            duplicate_booking_filter("s@x.com", session),
            doc! { "studentEmail": "s@x.com", "sessionId": session }
        );
    }

    #[test]
    fn second_booking_of_a_pair_is_rejected_as_bad_input() {
        assert_eq!(problem::already_booked().status, Status::BadRequest);
    }
}
