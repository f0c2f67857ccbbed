use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::Database;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::time::OffsetDateTime;
use serde::{Deserialize, Serialize};

use super::util::date_time_as_unix_seconds;
use crate::config::Config;
use crate::data::user::db::UserDbExt;
use crate::resp::problem::{problems, Problem};
use crate::role::Role;

pub static AUTH_COOKIE_NAME: &str = "AccessToken";

/// Authenticated principal carried by the `AccessToken` cookie.
///
/// Tokens expire one hour after issue; there is no refresh or server-side
/// revocation, expiry forces re-authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub user: String,
}

impl AuthClaims {
    pub fn new(email: impl ToString) -> AuthClaims {
        let now = Utc::now();
        AuthClaims {
            iat: now,
            exp: now + Duration::hours(1),
            user: email.to_string(),
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }

    pub fn decode_jwt(
        token: impl AsRef<str>,
        secret: impl AsRef<[u8]>,
    ) -> Result<AuthClaims, jsonwebtoken::errors::Error> {
        decode::<AuthClaims>(
            token.as_ref(),
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }

    pub fn cookie(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        Ok(Cookie::build((AUTH_COOKIE_NAME, self.encode_jwt(secret)?))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .expires(OffsetDateTime::from_unix_timestamp(self.exp.timestamp()).ok())
            .build())
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Unauthorized access.")
        .detail(detail)
        .clone()
}

pub fn extract_claims(
    cookies: &CookieJar,
    secret: impl AsRef<[u8]>,
) -> Result<AuthClaims, Problem> {
    let token = match cookies.get(AUTH_COOKIE_NAME) {
        Some(jwt) => jwt.value().to_owned(),
        None => {
            return Err(auth_problem("No auth token cookie."));
        }
    };

    match AuthClaims::decode_jwt(token, secret) {
        Ok(it) => {
            tracing::debug!("decoded auth token for user: {}", it.user);
            Ok(it)
        }
        Err(_) => Err(auth_problem("Auth token cookie was malformed or expired.")),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthClaims {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config: &Config = req
            .rocket()
            .state()
            .expect("configuration state not managed");

        match extract_claims(req.cookies(), &config.jwt_secret) {
            Ok(it) => Outcome::Success(it),
            Err(e) => {
                tracing::debug!("unable to extract claims from cookies");
                Outcome::Error((Status::Unauthorized, e))
            }
        }
    }
}

/// Guard for admin-only routes. Verifies the auth cookie, then checks the
/// principal's stored role against the `users` collection.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthClaims);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let claims = match AuthClaims::from_request(req).await {
            Outcome::Success(it) => it,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let db: &Database = req.rocket().state().expect("database state not managed");

        match db.find_user_by_email(&claims.user).await {
            Ok(Some(user)) if user.role == Role::Admin => Outcome::Success(AdminUser(claims)),
            Ok(_) => Outcome::Error((
                Status::Forbidden,
                problems::forbidden("Administrator role required."),
            )),
            Err(e) => Outcome::Error((Status::InternalServerError, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    static SECRET: &[u8] = b"test-signing-secret";

    #[test]
    fn jwt_configured_properly() {
        let mut now = Utc::now();
        now = now.round_subsecs(0);

        let claims = AuthClaims {
            iat: now,
            exp: now + Duration::hours(1),
            user: "a@x.com".to_string(),
        };

        let token = claims
            .encode_jwt(SECRET)
            .expect("encoding should work for example");

        let decoded = AuthClaims::decode_jwt(&token, SECRET).expect("unable to decode token");

        assert_eq!(now, decoded.iat);
        assert_eq!(now + Duration::hours(1), decoded.exp);
        assert_eq!(decoded.user, "a@x.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().round_subsecs(0);

        let claims = AuthClaims {
            iat: now - Duration::hours(2),
            exp: now - Duration::hours(1),
            user: "a@x.com".to_string(),
        };

        let token = claims.encode_jwt(SECRET).expect("encoding should work");
        assert!(AuthClaims::decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = AuthClaims::new("a@x.com")
            .encode_jwt(SECRET)
            .expect("encoding should work");
        assert!(AuthClaims::decode_jwt(&token, b"other-secret").is_err());
    }

    #[test]
    fn cookie_is_http_only_and_scoped_to_root() {
        let cookie = AuthClaims::new("a@x.com")
            .cookie(SECRET)
            .expect("cookie should build");

        assert_eq!(cookie.name(), AUTH_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
