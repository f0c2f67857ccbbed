use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::material::{Material, MaterialDbExt};
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct MaterialRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[post("/materials", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn material_create(
    body: Json<MaterialRequest>,
    auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let body = body.into_inner();
    if body.title.trim().is_empty() {
        return Err(problems::bad_input("Title is required."));
    }
    let session_id = ObjectId::parse_str(&body.session_id)
        .map_err(|_| problems::bad_object_id(&body.session_id))?;

    let material = Material {
        id: None,
        session_id,
        tutor_email: Some(auth.user),
        title: body.title,
        link: body.link,
        image: body.image,
    };

    let id = db.add_material(material).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

#[get("/materials?<sessionId>")]
#[allow(non_snake_case)]
#[tracing::instrument(skip(db))]
pub async fn material_list(
    sessionId: Option<&str>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Vec<Material>>, Problem> {
    let session_id = sessionId
        .filter(|it| !it.is_empty())
        .ok_or_else(|| problems::bad_input("sessionId query is required."))?;
    let session_id =
        ObjectId::parse_str(session_id).map_err(|_| problems::bad_object_id(session_id))?;

    Ok(Json(db.materials_for_session(session_id).await?))
}
