use bson::oid::ObjectId;
use bson::doc;
use chrono::Utc;
use mongodb::options::FindOptions;
use mongodb::Database;
use rocket::futures::StreamExt;
use rocket::http::Status;

use super::{User, USER_COLLECTION_NAME};
use crate::data::filter;
use crate::resp::problem::Problem;
use crate::role::Role;

pub(crate) fn role_update(role: Role) -> bson::Document {
    doc! { "$set": { "role": role.as_str() } }
}

/// Result of the sign-in upsert: either a fresh account document was inserted,
/// or an existing one had its last login bumped.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted(ObjectId),
    Refreshed { modified: u64 },
}

pub trait UserDbExt {
    async fn upsert_user(&self, email: &str, name: Option<String>)
        -> Result<UpsertOutcome, Problem>;

    async fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>, Problem>;

    async fn list_users(&self) -> Result<Vec<User>, Problem>;

    /// Case-insensitive substring search on email, capped at 10 results.
    async fn search_users_by_email(&self, fragment: &str) -> Result<Vec<User>, Problem>;

    async fn set_user_role(&self, id: ObjectId, role: Role) -> Result<u64, Problem>;

    async fn set_role_by_email(&self, email: &str, role: Role) -> Result<u64, Problem>;
}

impl UserDbExt for Database {
    async fn upsert_user(
        &self,
        email: &str,
        name: Option<String>,
    ) -> Result<UpsertOutcome, Problem> {
        let users = self.collection::<User>(USER_COLLECTION_NAME);

        if users
            .find_one(filter::by_email(email), None)
            .await?
            .is_some()
        {
            let updated = users
                .update_one(
                    filter::by_email(email),
                    doc! { "$set": { "last_log_in": Utc::now().to_rfc3339() } },
                    None,
                )
                .await?;

            return Ok(UpsertOutcome::Refreshed {
                modified: updated.modified_count,
            });
        }

        let user = User::new(email, name);
        let inserted = users.insert_one(&user, None).await?;
        let id = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| {
                Problem::new_untyped(
                    Status::InternalServerError,
                    "Insert did not return an ObjectId.",
                )
            })?;

        tracing::info!("created user {} with id {}", user.email, id);
        Ok(UpsertOutcome::Inserted(id))
    }

    async fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>, Problem> {
        self.collection(USER_COLLECTION_NAME)
            .find_one(filter::by_email(email), None)
            .await
            .map_err(Problem::from)
    }

    async fn list_users(&self) -> Result<Vec<User>, Problem> {
        let mut cursor = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find(None, None)
            .await?;

        let mut users = vec![];
        while let Some(user) = cursor.next().await {
            match user {
                Ok(it) => users.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize User document.")
                }
            }
        }

        Ok(users)
    }

    async fn search_users_by_email(&self, fragment: &str) -> Result<Vec<User>, Problem> {
        let options = FindOptions::builder().limit(10).build();
        let mut cursor = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find(filter::email_contains(fragment), options)
            .await?;

        let mut users = vec![];
        while let Some(user) = cursor.next().await {
            match user {
                Ok(it) => users.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize User document.")
                }
            }
        }

        Ok(users)
    }

    async fn set_user_role(&self, id: ObjectId, role: Role) -> Result<u64, Problem> {
        let result = self
            .collection::<User>(USER_COLLECTION_NAME)
            .update_one(filter::by_id(id), role_update(role), None)
            .await?;

        Ok(result.modified_count)
    }

    async fn set_role_by_email(&self, email: &str, role: Role) -> Result<u64, Problem> {
        let result = self
            .collection::<User>(USER_COLLECTION_NAME)
            .update_one(filter::by_email(email), role_update(role), None)
            .await?;

        Ok(result.modified_count)
    }
}
