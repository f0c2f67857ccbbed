use std::fmt::{Display, Formatter};
use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(skip, default = "internal_status")]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,

    pub body: Map<String, Value>,
}

fn internal_status() -> Status {
    Status::InternalServerError
}

impl Problem {
    // TODO: Add problem type URIs
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            detail: None,
            body: Map::new(),
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body.clone();

        // Members required by rfc7807.
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }

        let body_string = serde_json::to_string(&body)
            .expect("JSON map keys and values must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use super::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn bad_input(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid request input.")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn bad_object_id(id: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Malformed document id.")
            .insert_str("id", id)
            .to_owned()
    }

    #[inline]
    pub fn not_found(what: impl ToString) -> Problem {
        Problem::new_untyped(Status::NotFound, what)
    }

    #[inline]
    pub fn forbidden(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::Forbidden, "Insufficient privileges.")
            .detail(detail)
            .to_owned()
    }
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        let mut problem = Problem::new_untyped(
            Status::InternalServerError,
            "Database failed while processing request.",
        );

        match e.kind.as_ref() {
            ErrorKind::Io(_) | ErrorKind::Write(_) => {
                problem.detail("A write error occurred. Submitted data might not be stored.");
            }
            ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } => {
                problem.detail("Server was unable to reach the database.");
            }
            _ => {}
        }

        problem
    }
}

impl From<bson::de::Error> for Problem {
    fn from(_: bson::de::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing BSON data.",
        )
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(_: bson::ser::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing BSON data.",
        )
    }
}

impl From<serde_json::Error> for Problem {
    fn from(_: serde_json::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing JSON data.",
        )
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => {
                Problem::new_untyped(Status::Unauthorized, "Expired JWT signature.")
            }
            _ => Problem::new_untyped(Status::Unauthorized, "Error while handling JWT."),
        }
    }
}

impl From<reqwest::Error> for Problem {
    fn from(_: reqwest::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "Payment gateway request failed.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responder_body_carries_rfc7807_members() {
        let problem = Problem::new_untyped(Status::BadRequest, "Invalid role.")
            .insert_str("role", "moderator")
            .to_owned();

        assert_eq!(problem.status, Status::BadRequest);
        assert_eq!(problem.body.get("role"), Some(&Value::from("moderator")));
        assert_eq!(problem.type_uri, "about:blank");
    }

    #[test]
    fn expired_jwt_maps_to_unauthorized() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert_eq!(Problem::from(err).status, Status::Unauthorized);
    }
}
