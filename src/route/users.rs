use std::str::FromStr;

use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::user::db::{UpsertOutcome, UserDbExt};
use crate::data::user::User;
use crate::resp::jwt::{AdminUser, AuthClaims};
use crate::resp::problem::{problems, Problem};
use crate::role::Role;

#[derive(Debug, Deserialize)]
pub struct UserUpsert {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

/// Upsert-by-email: a known email gets a last-login bump, an unknown one gets
/// a fresh account with the default role.
#[post("/users", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn user_upsert(
    body: Json<UserUpsert>,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let body = body.into_inner();
    if body.email.trim().is_empty() {
        return Err(problems::bad_input("Email is required."));
    }

    match db.upsert_user(&body.email, body.name).await? {
        UpsertOutcome::Refreshed { modified } => Ok((
            Status::Ok,
            Json(json!({
                "message": "User already exists, last login updated.",
                "inserted": false,
                "updatedCount": modified,
            })),
        )),
        UpsertOutcome::Inserted(id) => Ok((
            Status::Created,
            Json(json!({ "inserted": true, "insertedId": id.to_hex() })),
        )),
    }
}

/// Role of the given user, defaulting to "user". 404 for unknown emails.
#[get("/users/role/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_role(
    email: &str,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let user = db
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| problems::not_found("User doesn't exist."))?;

    Ok(Json(json!({ "role": user.role })))
}

#[get("/users")]
#[tracing::instrument(skip(db))]
pub async fn user_list(_admin: AdminUser, db: &State<Database>) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(db.list_users().await?))
}

#[get("/users/search?<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_search(
    email: Option<&str>,
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<Vec<User>>, Problem> {
    let fragment = email
        .filter(|it| !it.is_empty())
        .ok_or_else(|| problems::bad_input("Email query is required."))?;

    Ok(Json(db.search_users_by_email(fragment).await?))
}

/// Admin override of a user's role.
#[patch("/users/role/<id>", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn user_set_role(
    id: &str,
    body: Json<RoleUpdate>,
    _admin: AdminUser,
    db: &State<Database>,
) -> Result<Json<Value>, Problem> {
    let role = Role::from_str(&body.role)
        .map_err(|_| problems::bad_input("Invalid role."))?;
    let id = ObjectId::parse_str(id).map_err(|_| problems::bad_object_id(id))?;

    let modified = db.set_user_role(id, role).await?;

    if modified > 0 {
        Ok(Json(json!({
            "message": format!("User role updated to {}", role)
        })))
    } else {
        Err(problems::not_found("User not found or role unchanged."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_role_values_are_rejected_before_any_write() {
        for bad in ["moderator", "ADMIN", "", "superuser"] {
            assert!(Role::from_str(bad).is_err(), "{:?} should be invalid", bad);
        }
    }

    #[test]
    fn malformed_object_ids_are_rejected() {
        assert!(ObjectId::parse_str("not-an-id").is_err());
        assert!(ObjectId::parse_str("").is_err());
        assert!(ObjectId::parse_str(ObjectId::new().to_hex()).is_ok());
    }

    #[test]
    fn upsert_body_requires_only_an_email() {
        let body: UserUpsert = serde_json::from_str(r#"{ "email": "a@x.com" }"#)
            .expect("email-only body should deserialize");
        assert_eq!(body.email, "a@x.com");
        assert!(body.name.is_none());
    }
}
