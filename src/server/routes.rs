use chrono::Utc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_derive::Serialize;

use crate::data_types::common::EntityKind;
use crate::data_types::query::QuerySpec;
use crate::errors::ApiError;
use crate::server::auth::ApiKeyGuard;
use crate::server::rate_limit::RateLimitGuard;
use crate::server::responses::{ErrorBody, PointResponse, QueryEcho, TrackResponse};
use crate::server::validation;
use crate::App;

#[derive(rocket::FromForm)]
pub struct RangeParams<'r> {
    #[field(name = "startTime")]
    pub start_time: Option<&'r str>,
    #[field(name = "endTime")]
    pub end_time: Option<&'r str>,
    pub limit: Option<&'r str>,
    pub sampling: Option<&'r str>,
}

#[derive(rocket::FromForm)]
pub struct RouteParams<'r> {
    pub limit: Option<&'r str>,
    pub sampling: Option<&'r str>,
}

// The gps and mobile surfaces are identical up to the entity kind, so
// each pair of handlers funnels into one shared implementation.

#[rocket::get("/gps/<id>?<params..>")]
pub async fn gps_track(
    app: &State<App>,
    _rate: RateLimitGuard,
    _auth: ApiKeyGuard,
    id: &str,
    params: RangeParams<'_>,
) -> Result<Json<TrackResponse>, ApiError> {
    range_query(app, EntityKind::Gps, id, params).await
}

#[rocket::get("/gps/<id>/route/<date>?<params..>")]
pub async fn gps_route(
    app: &State<App>,
    _rate: RateLimitGuard,
    _auth: ApiKeyGuard,
    id: &str,
    date: &str,
    params: RouteParams<'_>,
) -> Result<Json<TrackResponse>, ApiError> {
    route_query(app, EntityKind::Gps, id, date, params).await
}

#[rocket::get("/gps/<id>/latest")]
pub async fn gps_latest(
    app: &State<App>,
    _rate: RateLimitGuard,
    _auth: ApiKeyGuard,
    id: &str,
) -> Result<Json<PointResponse>, ApiError> {
    latest_query(app, EntityKind::Gps, id).await
}

#[rocket::get("/mobile/<id>?<params..>")]
pub async fn mobile_track(
    app: &State<App>,
    _rate: RateLimitGuard,
    _auth: ApiKeyGuard,
    id: &str,
    params: RangeParams<'_>,
) -> Result<Json<TrackResponse>, ApiError> {
    range_query(app, EntityKind::Mobile, id, params).await
}

#[rocket::get("/mobile/<id>/route/<date>?<params..>")]
pub async fn mobile_route(
    app: &State<App>,
    _rate: RateLimitGuard,
    _auth: ApiKeyGuard,
    id: &str,
    date: &str,
    params: RouteParams<'_>,
) -> Result<Json<TrackResponse>, ApiError> {
    route_query(app, EntityKind::Mobile, id, date, params).await
}

#[rocket::get("/mobile/<id>/latest")]
pub async fn mobile_latest(
    app: &State<App>,
    _rate: RateLimitGuard,
    _auth: ApiKeyGuard,
    id: &str,
) -> Result<Json<PointResponse>, ApiError> {
    latest_query(app, EntityKind::Mobile, id).await
}

async fn range_query(
    app: &App,
    kind: EntityKind,
    id: &str,
    params: RangeParams<'_>,
) -> Result<Json<TrackResponse>, ApiError> {
    validation::validate_entity_id(id)?;
    let (start, end) = validation::parse_time_range(params.start_time, params.end_time)?;
    let limit = validation::parse_limit(params.limit)?;
    let sampling = validation::parse_sampling(params.sampling)?;

    let spec = QuerySpec::range(kind, id.to_string(), start, end, limit, sampling);
    let echo = QueryEcho {
        id: id.to_string(),
        start_time: params.start_time.map(str::to_string),
        end_time: params.end_time.map(str::to_string),
        limit: Some(spec.row_cap),
        sampling,
        ..Default::default()
    };

    let points = app.get_track(&spec).await?;
    Ok(Json(TrackResponse::points(points, echo)))
}

async fn route_query(
    app: &App,
    kind: EntityKind,
    id: &str,
    date: &str,
    params: RouteParams<'_>,
) -> Result<Json<TrackResponse>, ApiError> {
    validation::validate_entity_id(id)?;
    let day = validation::parse_route_date(date)?;
    let limit = validation::parse_limit(params.limit)?;
    let sampling = validation::parse_sampling(params.sampling)?;

    let spec = QuerySpec::day(kind, id.to_string(), day, limit, sampling);
    let echo = QueryEcho {
        id: id.to_string(),
        date: Some(date.to_string()),
        limit: Some(spec.row_cap),
        sampling,
        ..Default::default()
    };

    let (points, summary) = app.get_route(&spec).await?;
    Ok(Json(TrackResponse::route(points, summary, echo)))
}

async fn latest_query(
    app: &App,
    kind: EntityKind,
    id: &str,
) -> Result<Json<PointResponse>, ApiError> {
    validation::validate_entity_id(id)?;

    let point = app.get_latest(kind, id).await?;
    let echo = QueryEcho {
        id: id.to_string(),
        ..Default::default()
    };

    Ok(Json(PointResponse::new(point, echo)))
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub timestamp: String,
    pub services: HealthServices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthServices {
    pub store: &'static str,
}

/// Unauthenticated liveness probe; pings the store. Still rate
/// limited, since every hit reaches the store.
#[rocket::get("/health")]
pub async fn health(app: &State<App>, _rate: RateLimitGuard) -> (Status, Json<HealthBody>) {
    let timestamp = Utc::now().to_rfc3339();

    match app.ping_store().await {
        Ok(()) => (
            Status::Ok,
            Json(HealthBody {
                status: "healthy",
                timestamp,
                services: HealthServices { store: "connected" },
                error: None,
            }),
        ),
        Err(e) => (
            Status::ServiceUnavailable,
            Json(HealthBody {
                status: "unhealthy",
                timestamp,
                services: HealthServices {
                    store: "disconnected",
                },
                error: if app.settings.is_production() {
                    None
                } else {
                    Some(e.to_string())
                },
            }),
        ),
    }
}

#[rocket::get("/")]
pub fn index(_rate: RateLimitGuard, _auth: ApiKeyGuard) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Track Query API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Time-windowed and single-day track queries over gps and mobile entities",
        "endpoints": {
            "health": "/api/v5/health",
            "gps": {
                "byTimeRange": "/api/v5/gps/<id>?startTime=<iso>&endTime=<iso>&limit=<1..50000>&sampling=<1..100>",
                "routeByDate": "/api/v5/gps/<id>/route/<YYYY-MM-DD>?limit=<1..50000>&sampling=<1..100>",
                "latest": "/api/v5/gps/<id>/latest"
            },
            "mobile": {
                "byTimeRange": "/api/v5/mobile/<id>?startTime=<iso>&endTime=<iso>&limit=<1..50000>&sampling=<1..100>",
                "routeByDate": "/api/v5/mobile/<id>/route/<YYYY-MM-DD>?limit=<1..50000>&sampling=<1..100>",
                "latest": "/api/v5/mobile/<id>/latest"
            }
        }
    }))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<ErrorBody> {
    Json(ErrorBody::new(
        "API key required",
        "Please provide an API key in the x-api-key header or api_key query parameter",
    ))
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<ErrorBody> {
    Json(ErrorBody::new(
        "Invalid API key",
        "The provided API key is not valid",
    ))
}

#[rocket::catch(404)]
pub fn endpoint_not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new(
        "Not found",
        "The requested endpoint does not exist",
    ))
}

#[rocket::catch(429)]
pub fn too_many_requests() -> Json<ErrorBody> {
    Json(ErrorBody::new(
        "Too many requests",
        "Rate limit exceeded. Please try again later.",
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new(
        "Internal server error",
        "Something went wrong",
    ))
}

pub fn api_routes() -> Vec<rocket::Route> {
    rocket::routes![
        index,
        health,
        gps_track,
        gps_route,
        gps_latest,
        mobile_track,
        mobile_route,
        mobile_latest,
    ]
}

pub fn api_catchers() -> Vec<rocket::Catcher> {
    rocket::catchers![
        unauthorized,
        forbidden,
        endpoint_not_found,
        too_many_requests,
        internal_error,
    ]
}
