use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::role::Role;

pub mod db;

pub static USER_COLLECTION_NAME: &str = "users";

/// Account document. Created on first sign-in; the role field is mutated by
/// admins and by the tutor-application workflow, never by the user directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_log_in: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: impl ToString, name: Option<String>) -> User {
        let now = Utc::now();
        User {
            id: None,
            email: email.to_string(),
            name,
            role: Role::default(),
            created_at: Some(now),
            last_log_in: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_default_to_plain_user_role() {
        let user = User::new("a@x.com", None);
        assert_eq!(user.role, Role::User);
        assert!(user.id.is_none());
        assert!(user.last_log_in.is_some());
    }

    #[test]
    fn missing_role_field_deserializes_as_user() {
        let user: User = bson::from_document(bson::doc! { "email": "a@x.com" })
            .expect("minimal document should deserialize");
        assert_eq!(user.role, Role::User);
    }
}
