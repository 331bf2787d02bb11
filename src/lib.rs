use crate::config::Settings;
use crate::data_types::common::EntityKind;
use crate::data_types::point::TrackPoint;
use crate::data_types::query::{QuerySpec, TimeFilter};
use crate::data_types::route::RouteSummary;
use crate::database::track_db::TrackDB;
use crate::errors::ApiError;
use crate::processors::planner::TrackQueryPlanner;
use crate::processors::route_metrics::RouteMetrics;

pub mod config;
pub mod data_types;
pub mod database;
pub mod errors;
pub mod processors;
pub mod server;
pub mod util;

/// Application handle shared by every request: immutable settings plus
/// the thread-safe store connection. Managed as Rocket state by the
/// server binary.
pub struct App {
    pub settings: Settings,
    track_db: TrackDB,
}

impl App {
    const CC: &'static str = "App";

    pub async fn new(settings: Settings) -> Result<Self, ApiError> {
        let track_db = TrackDB::new(&settings.store)
            .await
            .map_err(|e| ApiError::store("store connection", e))?;

        logln!(
            "Connected to store {} (database '{}')",
            settings.store.url,
            settings.store.database
        );

        Ok(Self { settings, track_db })
    }

    fn planner(&self) -> TrackQueryPlanner<'_> {
        TrackQueryPlanner::new(&self.track_db)
    }

    /// Raw filtered point sequence; empty is a valid result.
    pub async fn get_track(&self, spec: &QuerySpec) -> Result<Vec<TrackPoint>, ApiError> {
        self.planner().run(spec).await
    }

    /// Point sequence plus derived travel metrics. An empty match is a
    /// 404 here, unlike plain track queries.
    pub async fn get_route(
        &self,
        spec: &QuerySpec,
    ) -> Result<(Vec<TrackPoint>, RouteSummary), ApiError> {
        let points = self.planner().run(spec).await?;

        if points.is_empty() {
            return Err(ApiError::NotFound(Self::no_route_message(spec)));
        }

        let summary = RouteMetrics::summarize(&points).ok_or_else(|| {
            ApiError::Internal("no route summary for a non-empty sequence".to_string())
        })?;

        Ok((points, summary))
    }

    pub async fn get_latest(&self, kind: EntityKind, id: &str) -> Result<TrackPoint, ApiError> {
        match self.planner().latest(kind, id).await? {
            Some(point) => Ok(point),
            None => Err(ApiError::NotFound(format!(
                "No {} data found for id: {}",
                kind.label(),
                id
            ))),
        }
    }

    pub async fn ping_store(&self) -> Result<(), ApiError> {
        self.track_db
            .ping()
            .await
            .map_err(|e| ApiError::store("store ping", e))
    }

    fn no_route_message(spec: &QuerySpec) -> String {
        match &spec.filter {
            TimeFilter::Day(day) => format!(
                "No {} route found for id: {} on date: {}",
                spec.kind.label(),
                spec.entity_id,
                day
            ),
            TimeFilter::Range { start, end } => format!(
                "No {} route found for id: {} between {} and {}",
                spec.kind.label(),
                spec.entity_id,
                start,
                end
            ),
        }
    }
}
