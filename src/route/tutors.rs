use std::str::FromStr;

use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::tutor::db::TutorDbExt;
use crate::data::tutor::TutorApplication;
use crate::data::ApprovalStatus;
use crate::resp::jwt::{AdminUser, AuthClaims};
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct ApplicationDecision {
    pub status: String,
    pub email: String,
}

#[get("/tutors/approved")]
#[tracing::instrument(skip(db))]
pub async fn tutors_approved(db: &State<Database>) -> Result<Json<Vec<TutorApplication>>, Problem> {
    Ok(Json(db.list_applications(ApprovalStatus::Approved).await?))
}

#[get("/tutors/pending")]
#[tracing::instrument(skip(db))]
pub async fn tutors_pending(
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<Vec<TutorApplication>>, Problem> {
    Ok(Json(db.list_applications(ApprovalStatus::Pending).await?))
}

/// Approve or reject an application, cascading into the applicant's role.
#[patch("/tutors/status/<id>", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn tutor_status(
    id: &str,
    body: Json<ApplicationDecision>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let status = ApprovalStatus::from_str(&body.status)
        .ok()
        .filter(|s| *s != ApprovalStatus::Pending)
        .ok_or_else(|| problems::bad_input("Status must be 'approved' or 'rejected'."))?;
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let modified = db.transition_application(id, status, &body.email).await?;

    Ok(Json(json!({ "modifiedCount": modified })))
}

#[post("/tutors", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn tutor_apply(
    body: Json<TutorApplication>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let application = body.into_inner();
    if application.email.trim().is_empty() {
        return Err(problems::bad_input("Email is required."));
    }

    let id = db.submit_application(application).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_only_accepts_terminal_statuses() {
        let parse = |s: &str| {
            ApprovalStatus::from_str(s)
                .ok()
                .filter(|it| *it != ApprovalStatus::Pending)
        };

        assert_eq!(parse("approved"), Some(ApprovalStatus::Approved));
        assert_eq!(parse("rejected"), Some(ApprovalStatus::Rejected));
        assert_eq!(parse("pending"), None);
        assert_eq!(parse("banana"), None);
    }
}
