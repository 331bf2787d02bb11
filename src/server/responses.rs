use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use serde_derive::Serialize;

use crate::data_types::point::TrackPoint;
use crate::data_types::route::RouteSummary;
use crate::errors::ApiError;
use crate::logln;
use crate::App;

/// Echo of the request parameters, mirrored back in every success body.
#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryEcho {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub success: bool,
    pub data: Vec<TrackPoint>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RouteSummary>,
    pub query: QueryEcho,
}

impl TrackResponse {
    pub fn points(data: Vec<TrackPoint>, query: QueryEcho) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            metadata: None,
            query,
        }
    }

    pub fn route(data: Vec<TrackPoint>, summary: RouteSummary, query: QueryEcho) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            metadata: Some(summary),
            query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PointResponse {
    pub success: bool,
    pub data: TrackPoint,
    pub query: QueryEcho,
}

impl PointResponse {
    pub fn new(data: TrackPoint, query: QueryEcho) -> Self {
        Self {
            success: true,
            data,
            query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: &'static str, message: &str) -> Self {
        Self {
            success: false,
            error,
            message: message.to_string(),
        }
    }
}

/// Maps an error to its HTTP shape. Store and internal failures keep
/// their diagnostic detail out of production responses.
pub fn error_response(err: &ApiError, production: bool) -> (Status, ErrorBody) {
    let status = match err {
        ApiError::Validation(_) => Status::BadRequest,
        ApiError::NotFound(_) => Status::NotFound,
        ApiError::Store { .. } => Status::InternalServerError,
        ApiError::Internal(_) => Status::InternalServerError,
    };

    let message = match err {
        ApiError::Validation(msg) | ApiError::NotFound(msg) => msg.clone(),
        ApiError::Store { .. } | ApiError::Internal(_) => {
            if production {
                "Something went wrong".to_string()
            } else {
                err.to_string()
            }
        }
    };

    (status, ErrorBody::new(err.label(), &message))
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'static> {
        let production = req
            .rocket()
            .state::<App>()
            .map(|app| app.settings.is_production())
            .unwrap_or(true);

        if matches!(self, ApiError::Store { .. } | ApiError::Internal(_)) {
            logln!("Request failed: {}", self);
        }

        let (status, body) = error_response(&self, production);
        let json = serde_json::to_string(&body).map_err(|_| Status::InternalServerError)?;

        rocket::Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
