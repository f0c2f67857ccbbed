use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use rocket::futures::StreamExt;
use rocket::http::Status;

use crate::resp::problem::Problem;

pub static MATERIAL_COLLECTION_NAME: &str = "materials";

/// Study material a tutor shares with a session's students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "sessionId")]
    pub session_id: ObjectId,
    #[serde(default, rename = "tutorEmail", skip_serializing_if = "Option::is_none")]
    pub tutor_email: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

pub trait MaterialDbExt {
    async fn add_material(&self, material: Material) -> Result<ObjectId, Problem>;

    async fn materials_for_session(&self, session_id: ObjectId)
        -> Result<Vec<Material>, Problem>;
}

impl MaterialDbExt for Database {
    async fn add_material(&self, mut material: Material) -> Result<ObjectId, Problem> {
        material.id = None;

        let inserted = self
            .collection::<Material>(MATERIAL_COLLECTION_NAME)
            .insert_one(&material, None)
            .await?;

        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }

    async fn materials_for_session(
        &self,
        session_id: ObjectId,
    ) -> Result<Vec<Material>, Problem> {
        let mut cursor = self
            .collection::<Material>(MATERIAL_COLLECTION_NAME)
            .find(doc! { "sessionId": session_id }, None)
            .await?;

        let mut materials = vec![];
        while let Some(material) = cursor.next().await {
            match material {
                Ok(it) => materials.push(it),
                Err(_) => {
                    tracing::warn!("Unable to deserialize Material document.")
                }
            }
        }

        Ok(materials)
    }
}
