use std::str::FromStr;

use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::session::db::{problem as session_problem, SessionDbExt};
use crate::data::session::StudySession;
use crate::data::ApprovalStatus;
use crate::resp::jwt::{AdminUser, AuthClaims};
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct SessionDecision {
    pub status: String,
    #[serde(default, rename = "registrationFee")]
    pub registration_fee: Option<f64>,
}

#[post("/study_session", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn session_create(
    body: Json<StudySession>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let session = body.into_inner();
    if session.title.trim().is_empty() || session.tutor_email.trim().is_empty() {
        return Err(problems::bad_input("Title and tutorEmail are required."));
    }

    let id = db.create_session(session).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

#[get("/study_session?<status>")]
#[tracing::instrument(skip(db))]
pub async fn session_list(
    status: Option<&str>,
    db: &State<Database>,
) -> Result<Json<Vec<StudySession>>, Problem> {
    let status = match status {
        Some(s) => Some(
            ApprovalStatus::from_str(s)
                .map_err(|_| problems::bad_input("Unknown session status."))?,
        ),
        None => None,
    };

    Ok(Json(db.list_sessions(status).await?))
}

#[get("/study_session/<id>")]
#[tracing::instrument(skip(db))]
pub async fn session_get(id: &str, db: &State<Database>) -> Result<Json<StudySession>, Problem> {
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let session = db
        .get_session(id)
        .await?
        .ok_or_else(session_problem::session_not_found)?;

    Ok(Json(session))
}

#[delete("/study_session/<id>")]
#[tracing::instrument(skip(db))]
pub async fn session_delete(
    id: &str,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let deleted = db.delete_session(id).await?;
    if deleted == 0 {
        return Err(session_problem::session_not_found());
    }

    Ok(Json(json!({ "deletedCount": deleted })))
}

/// Admin approval or rejection, optionally adjusting the registration fee.
#[patch("/study_session/<id>/status", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn session_set_status(
    id: &str,
    body: Json<SessionDecision>,
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let status = ApprovalStatus::from_str(&body.status)
        .ok()
        .filter(|s| *s != ApprovalStatus::Pending)
        .ok_or_else(|| problems::bad_input("Status must be 'approved' or 'rejected'."))?;
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let modified = db
        .set_session_status(id, status, body.registration_fee)
        .await?;
    if modified == 0 {
        return Err(session_problem::session_not_found());
    }

    Ok(Json(json!({ "modifiedCount": modified })))
}

/// Puts a rejected session back into the review queue.
#[patch("/study_session/resubmit/<id>")]
#[tracing::instrument(skip(db))]
pub async fn session_resubmit(
    id: &str,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let modified = db.resubmit_session(id).await?;
    if modified == 0 {
        return Err(session_problem::session_not_found());
    }

    Ok(Json(json!({ "modifiedCount": modified })))
}
