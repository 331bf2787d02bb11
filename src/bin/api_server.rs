use track_query_api::config::Settings;
use track_query_api::server::rate_limit::RateLimiter;
use track_query_api::server::routes;
use track_query_api::util::logging;
use track_query_api::App;

#[macro_use]
extern crate rocket;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Cross-Origin-Resource-Sharing Fairing",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, PATCH, PUT, DELETE, HEAD, OPTIONS, GET",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[options("/<_..>")]
fn all_options() {
    /* Intentionally left empty */
}

#[launch]
async fn rocket() -> _ {
    logging::set_global_logging(true);

    let settings = Settings::read();
    println!(
        "Track Query API starting (environment: {}, API key required: {})",
        settings.environment,
        if settings.api_key.is_some() { "yes" } else { "no" }
    );

    let rate_limiter = RateLimiter::new(&settings.rate_limit);
    let app = App::new(settings)
        .await
        .expect("Opening the store connection failed");

    rocket::build()
        .attach(Cors)
        .manage(app)
        .manage(rate_limiter)
        .mount("/api/v5", routes::api_routes())
        .mount("/", routes![all_options])
        .register("/", routes::api_catchers())
}
