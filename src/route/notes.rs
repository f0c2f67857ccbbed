use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::note::{Note, NoteDbExt};
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub title: String,
    pub content: String,
}

#[post("/notes", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn note_create(
    body: Json<NoteBody>,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let body = body.into_inner();
    if body.title.trim().is_empty() {
        return Err(problems::bad_input("Title is required."));
    }

    let note = Note {
        id: None,
        email: auth.user,
        title: body.title,
        content: body.content,
    };

    let id = db.create_note(note).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

/// Notes are owner-scoped: the email filter must match the principal.
#[get("/notes?<email>")]
#[tracing::instrument(skip(db))]
pub async fn note_list(
    email: Option<&str>,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Vec<Note>>, Problem> {
    let email = email
        .filter(|it| !it.is_empty())
        .ok_or_else(|| problems::bad_input("Email query is required."))?;
    if email != auth.user {
        return Err(problems::forbidden("Notes belong to another user."));
    }

    Ok(Json(db.notes_by_owner(email).await?))
}

#[put("/notes/<id>", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn note_update(
    id: &str,
    body: Json<NoteBody>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let modified = db.update_note(id, &body.title, &body.content).await?;
    if modified == 0 {
        return Err(problems::not_found("Note not found or unchanged."));
    }

    Ok(Json(json!({ "modifiedCount": modified })))
}

#[delete("/notes/<id>")]
#[tracing::instrument(skip(db))]
pub async fn note_delete(
    id: &str,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let deleted = db.delete_note(id).await?;
    if deleted == 0 {
        return Err(problems::not_found("Note doesn't exist."));
    }

    Ok(Json(json!({ "deletedCount": deleted })))
}
