use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use rocket::futures::StreamExt;
use rocket::http::Status;

use crate::resp::problem::Problem;

pub static NOTE_COLLECTION_NAME: &str = "notes";

/// Personal note, scoped to its owner's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub title: String,
    pub content: String,
}

pub trait NoteDbExt {
    async fn create_note(&self, note: Note) -> Result<ObjectId, Problem>;

    async fn notes_by_owner(&self, email: &str) -> Result<Vec<Note>, Problem>;

    async fn update_note(&self, id: ObjectId, title: &str, content: &str)
        -> Result<u64, Problem>;

    async fn delete_note(&self, id: ObjectId) -> Result<u64, Problem>;
}

impl NoteDbExt for Database {
    async fn create_note(&self, mut note: Note) -> Result<ObjectId, Problem> {
        note.id = None;

        let inserted = self
            .collection::<Note>(NOTE_COLLECTION_NAME)
            .insert_one(&note, None)
            .await?;

        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }

    async fn notes_by_owner(&self, email: &str) -> Result<Vec<Note>, Problem> {
        let mut cursor = self
            .collection::<Note>(NOTE_COLLECTION_NAME)
            .find(doc! { "email": email }, None)
            .await?;

        let mut notes = vec![];
        while let Some(note) = cursor.next().await {
            match note {
                Ok(it) => notes.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize Note document.")
                }
            }
        }

        Ok(notes)
    }

    async fn update_note(
        &self,
        id: ObjectId,
        title: &str,
        content: &str,
    ) -> Result<u64, Problem> {
        let result = self
            .collection::<Note>(NOTE_COLLECTION_NAME)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "title": title, "content": content } },
                None,
            )
            .await?;

        Ok(result.modified_count)
    }

    async fn delete_note(&self, id: ObjectId) -> Result<u64, Problem> {
        let result = self
            .collection::<Note>(NOTE_COLLECTION_NAME)
            .delete_one(doc! { "_id": id }, None)
            .await?;

        Ok(result.deleted_count)
    }
}
