use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::review::{Review, ReviewDbExt};
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub rating: Option<i32>,
    pub content: String,
}

#[post("/reviews", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn review_create(
    body: Json<ReviewRequest>,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let body = body.into_inner();
    if body.content.trim().is_empty() {
        return Err(problems::bad_input("Review content is required."));
    }
    let session_id = ObjectId::parse_str(&body.session_id)
        .map_err(|_| problems::bad_object_id(&body.session_id))?;

    let review = Review {
        id: None,
        session_id,
        student_email: Some(auth.user),
        rating: body.rating,
        content: body.content,
        created_at: None,
    };

    let id = db.add_review(review).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

#[get("/reviews?<sessionId>")]
#[allow(non_snake_case)]
#[tracing::instrument(skip(db))]
pub async fn review_list(
    sessionId: Option<&str>,
    db: &State<Database>,
) -> Result<Json<Vec<Review>>, Problem> {
    let session_id = sessionId
        .filter(|it| !it.is_empty())
        .ok_or_else(|| problems::bad_input("sessionId query is required."))?;
    let session_id =
        ObjectId::parse_str(session_id).map_err(|_| problems::bad_object_id(session_id))?;

    Ok(Json(db.reviews_for_session(session_id).await?))
}
