use bson::doc;
use bson::oid::ObjectId;
use bson::Document;
use chrono::Utc;
use mongodb::Database;
use rocket::futures::StreamExt;
use rocket::http::Status;

use super::{TutorApplication, TUTOR_COLLECTION_NAME};
use crate::data::user::db::UserDbExt;
use crate::data::{filter, ApprovalStatus};
use crate::resp::problem::Problem;
use crate::role::Role;

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn already_applied(email: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "A pending application already exists.")
            .insert_str("email", email)
            .to_owned()
    }

    #[inline]
    pub fn not_found() -> Problem {
        Problem::new_untyped(Status::NotFound, "Tutor application doesn't exist.")
    }
}

/// Role the applicant ends up with after a decision: tutor on approval,
/// back to plain user otherwise.
pub fn decision_role(status: ApprovalStatus) -> Role {
    match status {
        ApprovalStatus::Approved => Role::Tutor,
        _ => Role::User,
    }
}

fn status_update(status: ApprovalStatus) -> Document {
    doc! { "$set": { "status": status.to_string() } }
}

pub trait TutorDbExt {
    async fn submit_application(&self, application: TutorApplication)
        -> Result<ObjectId, Problem>;

    async fn list_applications(
        &self,
        status: ApprovalStatus,
    ) -> Result<Vec<TutorApplication>, Problem>;

    /// The role/application workflow: sets the application status, then mirrors
    /// the outcome into the applicant's user role (tutor on approval, back to
    /// plain user on rejection).
    ///
    /// The two updates run sequentially without a transaction; a store failure
    /// between them leaves the records inconsistent. A missing user record is a
    /// logged no-op, not an error.
    async fn transition_application(
        &self,
        id: ObjectId,
        status: ApprovalStatus,
        email: &str,
    ) -> Result<u64, Problem>;
}

impl TutorDbExt for Database {
    async fn submit_application(
        &self,
        mut application: TutorApplication,
    ) -> Result<ObjectId, Problem> {
        let applications = self.collection::<TutorApplication>(TUTOR_COLLECTION_NAME);

        // Point-in-time existence check only; concurrent submissions can race.
        let pending = applications
            .find_one(
                doc! { "email": &application.email, "status": ApprovalStatus::Pending.to_string() },
                None,
            )
            .await?;
        if pending.is_some() {
            return Err(problem::already_applied(&application.email));
        }

        application.id = None;
        application.status = ApprovalStatus::Pending;
        application.applied_at = Some(Utc::now());

        let inserted = applications.insert_one(&application, None).await?;
        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }

    async fn list_applications(
        &self,
        status: ApprovalStatus,
    ) -> Result<Vec<TutorApplication>, Problem> {
        let mut cursor = self
            .collection::<TutorApplication>(TUTOR_COLLECTION_NAME)
            .find(filter::by_status(status), None)
            .await?;

        let mut applications = vec![];
        while let Some(application) = cursor.next().await {
            match application {
                Ok(it) => applications.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize TutorApplication document.")
                }
            }
        }

        Ok(applications)
    }

    async fn transition_application(
        &self,
        id: ObjectId,
        status: ApprovalStatus,
        email: &str,
    ) -> Result<u64, Problem> {
        let result = self
            .collection::<TutorApplication>(TUTOR_COLLECTION_NAME)
            .update_one(filter::by_id(id), status_update(status), None)
            .await?;

        if result.matched_count == 0 {
            return Err(problem::not_found());
        }

        let role = decision_role(status);
        let role_modified = self.set_role_by_email(email, role).await?;
        if role_modified == 0 {
            tracing::warn!(
                "no user document for '{}'; role not updated alongside application {}",
                email,
                id
            );
        } else {
            tracing::info!("user '{}' role updated to {}", email, role);
        }

        Ok(result.modified_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::user::db::role_update;

    #[test]
    fn approval_cascades_into_tutor_role() {
        let role = decision_role(ApprovalStatus::Approved);
        assert_eq!(role, Role::Tutor);
        assert_eq!(role_update(role), doc! { "$set": { "role": "tutor" } });
    }

    #[test]
    fn rejection_reverts_to_plain_user_role() {
        let role = decision_role(ApprovalStatus::Rejected);
        assert_eq!(role, Role::User);
        assert_eq!(role_update(role), doc! { "$set": { "role": "user" } });
    }

    #[test]
    fn decision_writes_the_stored_status_string() {
        assert_eq!(
            status_update(ApprovalStatus::Approved),
            doc! { "$set": { "status": "approved" } }
        );
        assert_eq!(
            status_update(ApprovalStatus::Rejected),
            doc! { "$set": { "status": "rejected" } }
        );
    }
}
