use std::str::FromStr;

pub mod material;
pub mod note;
pub mod payment;
pub mod review;
pub mod session;
pub mod tutor;
pub mod user;

/// Moderation status shared by tutor applications and study sessions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        ApprovalStatus::Pending
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(()),
        }
    }
}

pub mod filter {
    use bson::oid::ObjectId;
    use bson::{doc, Document};

    use super::ApprovalStatus;

    #[inline]
    pub fn by_id(id: ObjectId) -> Document {
        doc! { "_id": id }
    }

    #[inline]
    pub fn by_email(email: impl AsRef<str>) -> Document {
        doc! { "email": email.as_ref() }
    }

    #[inline]
    pub fn by_status(status: ApprovalStatus) -> Document {
        doc! { "status": status.to_string() }
    }

    /// Case-insensitive substring match on the email field.
    #[inline]
    pub fn email_contains(fragment: impl AsRef<str>) -> Document {
        doc! { "email": { "$regex": fragment.as_ref(), "$options": "i" } }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn status_round_trips_through_lowercase_names() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse(), Ok(status));
        }
        assert!(ApprovalStatus::from_str("Approved").is_err());
    }

    #[test]
    fn email_search_filter_is_case_insensitive() {
        let f = filter::email_contains("al");
        assert_eq!(
            f,
            doc! { "email": { "$regex": "al", "$options": "i" } }
        );
    }

    #[test]
    fn status_filter_uses_stored_string_form() {
        assert_eq!(
            filter::by_status(ApprovalStatus::Approved),
            doc! { "status": "approved" }
        );
    }
}
