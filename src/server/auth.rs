use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::App;

/// Static shared-secret gate. The key arrives in the `x-api-key`
/// header or the `api_key` query parameter; an unconfigured key means
/// open access (development). Failures surface through the 401/403
/// catchers.
pub struct ApiKeyGuard;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKeyGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let app = match req.rocket().state::<App>() {
            Some(app) => app,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        let expected = match &app.settings.api_key {
            Some(key) => key,
            None => return Outcome::Success(ApiKeyGuard),
        };

        let provided = req
            .headers()
            .get_one("x-api-key")
            .or_else(|| req.query_value::<&str>("api_key").and_then(|v| v.ok()));

        match provided {
            None => Outcome::Error((Status::Unauthorized, ())),
            Some(key) if key == expected.as_str() => Outcome::Success(ApiKeyGuard),
            Some(_) => Outcome::Error((Status::Forbidden, ())),
        }
    }
}
