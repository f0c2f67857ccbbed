use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role stored on a user document. Ordering reflects privilege level.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Tutor,
    Admin,
}

impl Role {
    /// Indicates whether a user with this role can publish study sessions.
    pub fn can_tutor(self) -> bool {
        self >= Role::Tutor
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }
}

impl std::default::Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Role::User),
            "tutor" => Ok(Role::Tutor),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_lowercase_names() {
        assert_eq!("user".parse(), Ok(Role::User));
        assert_eq!("tutor".parse(), Ok(Role::Tutor));
        assert_eq!("admin".parse(), Ok(Role::Admin));
        assert!(Role::from_str("moderator").is_err());
        assert!(Role::from_str("Admin").is_err());
    }

    #[test]
    fn roles_serialize_as_lowercase_strings() {
        assert_eq!(serde_json::to_string(&Role::Tutor).unwrap(), "\"tutor\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn privilege_ordering() {
        assert!(Role::Admin > Role::Tutor);
        assert!(Role::Tutor > Role::User);
        assert!(Role::Tutor.can_tutor());
        assert!(!Role::User.can_tutor());
    }
}
