use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::session::db::BookingDbExt;
use crate::data::session::BookedSession;
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    #[serde(rename = "studentEmail")]
    pub student_email: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Books a session for a student. A second booking of the same
/// (student, session) pair is rejected with 400.
#[post("/bookedSessions", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn booking_create(
    body: Json<BookingRequest>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let body = body.into_inner();
    if body.student_email.trim().is_empty() {
        return Err(problems::bad_input("studentEmail is required."));
    }
    let session_id = ObjectId::parse_str(&body.session_id)
        .map_err(|_| problems::bad_object_id(&body.session_id))?;

    let booking = BookedSession {
        id: None,
        student_email: body.student_email,
        session_id,
        paid_status: false,
        booked_at: None,
    };

    let id = db.create_booking(booking).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

#[get("/bookedSessions?<email>")]
#[tracing::instrument(skip(db))]
pub async fn booking_list(
    email: Option<&str>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Vec<BookedSession>>, Problem> {
    let email = email
        .filter(|it| !it.is_empty())
        .ok_or_else(|| problems::bad_input("Email query is required."))?;

    Ok(Json(db.bookings_by_student(email).await?))
}
