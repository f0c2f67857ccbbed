use rocket::http::{Cookie, CookieJar};
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::config::Config;
use crate::resp::jwt::{AuthClaims, AUTH_COOKIE_NAME};
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "userEmail")]
    pub user_email: String,
}

/// Issues the `AccessToken` cookie for the given email. Authentication itself
/// happens upstream (the client signs in with its identity provider first).
#[post("/jwt_token", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(cookies, c))]
pub async fn issue_token(
    body: Json<TokenRequest>,
    cookies: &CookieJar<'_>,
    c: &State<Config>,
) -> Result<Json<Value>, Problem> {
    if body.user_email.trim().is_empty() {
        return Err(problems::bad_input("userEmail is required."));
    }

    let claims = AuthClaims::new(&body.user_email);
    cookies.add(claims.cookie(&c.jwt_secret)?);

    Ok(Json(json!({ "message": "successful" })))
}

/// Clears the auth cookie. The token itself stays valid until expiry; there
/// is no server-side denylist.
#[post("/api/logout")]
#[tracing::instrument(skip(cookies))]
pub async fn logout(cookies: &CookieJar<'_>) -> Json<Value> {
    cookies.remove(Cookie::build(AUTH_COOKIE_NAME).path("/"));

    Json(json!({ "message": "Logout successful." }))
}

#[get("/")]
pub fn liveness() -> &'static str {
    "server is running ..!"
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    use crate::config::Config;
    use crate::resp::jwt::{AuthClaims, AUTH_COOKIE_NAME};

    fn test_rocket() -> rocket::Rocket<rocket::Build> {
        rocket::build()
            .manage(Config::default())
            .mount(
                "/",
                rocket::routes![super::issue_token, super::logout, super::liveness],
            )
            .register("/", rocket::catchers![crate::route::malformed_body])
    }

    #[rocket::async_test]
    async fn jwt_token_sets_a_decodable_auth_cookie() {
        let client = Client::tracked(test_rocket()).await.expect("valid rocket");

        let response = client
            .post("/jwt_token")
            .header(ContentType::JSON)
            .body(r#"{ "userEmail": "a@x.com" }"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let cookie = response
            .cookies()
            .get(AUTH_COOKIE_NAME)
            .expect("AccessToken cookie wasn't set");

        let secret = Config::default().jwt_secret;
        let claims = AuthClaims::decode_jwt(cookie.value(), secret)
            .expect("cookie should hold a valid token");
        assert_eq!(claims.user, "a@x.com");
    }

    #[rocket::async_test]
    async fn jwt_token_rejects_empty_email() {
        let client = Client::tracked(test_rocket()).await.expect("valid rocket");

        let response = client
            .post("/jwt_token")
            .header(ContentType::JSON)
            .body(r#"{ "userEmail": "  " }"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn missing_body_fields_map_to_bad_request() {
        let client = Client::tracked(test_rocket()).await.expect("valid rocket");

        let response = client
            .post("/jwt_token")
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn logout_responds_ok_without_a_cookie() {
        let client = Client::tracked(test_rocket()).await.expect("valid rocket");

        let response = client.post("/api/logout").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn liveness_answers() {
        let client = Client::tracked(test_rocket()).await.expect("valid rocket");

        let response = client.get("/").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.into_string().await.as_deref(),
            Some("server is running ..!")
        );
    }
}
