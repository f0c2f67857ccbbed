use bson::doc;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use mongodb::Database;
use rocket::futures::StreamExt;
use rocket::http::Status;

use crate::resp::problem::Problem;

pub static REVIEW_COLLECTION_NAME: &str = "reviews";

/// Append-only student feedback on a study session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "sessionId")]
    pub session_id: ObjectId,
    #[serde(default, rename = "studentEmail", skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub trait ReviewDbExt {
    async fn add_review(&self, review: Review) -> Result<ObjectId, Problem>;

    async fn reviews_for_session(&self, session_id: ObjectId) -> Result<Vec<Review>, Problem>;
}

impl ReviewDbExt for Database {
    async fn add_review(&self, mut review: Review) -> Result<ObjectId, Problem> {
        review.id = None;
        review.created_at = Some(Utc::now());

        let inserted = self
            .collection::<Review>(REVIEW_COLLECTION_NAME)
            .insert_one(&review, None)
            .await?;

        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }

    async fn reviews_for_session(&self, session_id: ObjectId) -> Result<Vec<Review>, Problem> {
        let mut cursor = self
            .collection::<Review>(REVIEW_COLLECTION_NAME)
            .find(doc! { "sessionId": session_id }, None)
            .await?;

        let mut reviews = vec![];
        while let Some(review) = cursor.next().await {
            match review {
                Ok(it) => reviews.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize Review document.")
                }
            }
        }

        Ok(reviews)
    }
}
