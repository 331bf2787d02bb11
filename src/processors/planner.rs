use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};

use crate::data_types::common::EntityKind;
use crate::data_types::point::TrackPoint;
use crate::data_types::query::{QuerySpec, TimeFilter};
use crate::database::track_db::TrackDB;
use crate::errors::ApiError;
use crate::util::time::DateTimeUtils;
use crate::{logln, logvbln};

/// Turns a validated `QuerySpec` into exactly one aggregation pipeline
/// against the store and normalizes the returned rows into points.
///
/// Every pipeline variant sorts ascending by timestamp and truncates to
/// the row cap, so the caller always receives a chronologically ordered
/// sequence of at most `row_cap` points.
pub struct TrackQueryPlanner<'a> {
    track_db: &'a TrackDB,
}

impl<'a> TrackQueryPlanner<'a> {
    const CC: &'static str = "TrackQueryPlanner";

    pub fn new(track_db: &'a TrackDB) -> Self {
        Self { track_db }
    }

    pub async fn run(&self, spec: &QuerySpec) -> Result<Vec<TrackPoint>, ApiError> {
        let context = Self::query_context(spec);
        let stages = Self::build_pipeline(spec);

        logln!(
            "Running {} for entity {} (cap {}, sampling {:?})",
            context,
            spec.entity_id,
            spec.row_cap,
            spec.sampling
        );
        logvbln!("Pipeline stages: {:?}", stages);

        let rows = self
            .track_db
            .query_points(spec.kind, stages)
            .await
            .map_err(|e| ApiError::store(&context, e))?;

        rows.iter()
            .map(|row| TrackPoint::from_document(spec.kind, row))
            .collect()
    }

    /// Newest point for an entity, if it has any.
    pub async fn latest(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<Option<TrackPoint>, ApiError> {
        let context = format!("{} latest query", kind.label());
        let stages = vec![
            doc! {"$match": {(kind.id_field()): entity_id}},
            doc! {"$sort": {"timestamp": -1}},
            doc! {"$limit": 1},
        ];

        let rows = self
            .track_db
            .query_points(kind, stages)
            .await
            .map_err(|e| ApiError::store(&context, e))?;

        match rows.first() {
            Some(row) => Ok(Some(TrackPoint::from_document(kind, row)?)),
            None => Ok(None),
        }
    }

    /// Pipeline construction is pure; identical specs build identical
    /// stages. Request-derived values are bound as BSON values inside
    /// the documents, never formatted into query text.
    fn build_pipeline(spec: &QuerySpec) -> Vec<Document> {
        let mut stages = vec![doc! {"$match": Self::match_filter(spec)}];

        if let Some(factor) = spec.sampling {
            // Rank every matching row by chronological position (rank 0
            // first) and keep rows whose rank is a multiple of the
            // factor. Rank 0 always survives, so the first point of the
            // window is always present. This is a systematic sample by
            // row position, not a time-bucket sample.
            stages.push(doc! {"$setWindowFields": {
                "sortBy": {"timestamp": 1},
                "output": {"row_num": {"$documentNumber": {}}},
            }});
            stages.push(doc! {"$match": {
                "$expr": {"$eq": [
                    {"$mod": [{"$subtract": ["$row_num", 1]}, factor]},
                    0,
                ]},
            }});
        }

        stages.push(doc! {"$sort": {"timestamp": 1}});
        stages.push(doc! {"$limit": spec.row_cap});

        stages
    }

    fn match_filter(spec: &QuerySpec) -> Document {
        let time_filter = match &spec.filter {
            // Window bounds are inclusive on both ends.
            TimeFilter::Range { start, end } => doc! {
                "$gte": Self::bson_instant(start),
                "$lte": Self::bson_instant(end),
            },
            // A calendar day is the half-open window [00:00, next 00:00).
            TimeFilter::Day(day) => {
                let (start, end) = DateTimeUtils::day_bounds(*day);
                doc! {
                    "$gte": Self::bson_instant(&start),
                    "$lt": Self::bson_instant(&end),
                }
            }
        };

        doc! {
            (spec.kind.id_field()): spec.entity_id.as_str(),
            "timestamp": time_filter,
        }
    }

    fn bson_instant(dt: &DateTime<Utc>) -> mongodb::bson::DateTime {
        mongodb::bson::DateTime::from_millis(dt.timestamp_millis())
    }

    fn query_context(spec: &QuerySpec) -> String {
        let shape = match spec.filter {
            TimeFilter::Range { .. } => "range",
            TimeFilter::Day(_) => "route",
        };

        format!("{} {} query", spec.kind.label(), shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use mongodb::bson::Bson;

    fn range_spec(sampling: Option<i64>) -> QuerySpec {
        QuerySpec::range(
            EntityKind::Gps,
            "dev-01".to_string(),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            Some(1000),
            sampling,
        )
    }

    #[test]
    fn plain_pipeline_is_match_sort_limit() {
        let stages = TrackQueryPlanner::build_pipeline(&range_spec(None));
        assert_eq!(stages.len(), 3);

        assert!(stages[0].contains_key("$match"));
        assert_eq!(
            stages[1].get_document("$sort").unwrap(),
            &doc! {"timestamp": 1}
        );
        assert_eq!(stages[2].get("$limit"), Some(&Bson::Int64(1000)));
    }

    #[test]
    fn range_match_binds_id_and_inclusive_window() {
        let stages = TrackQueryPlanner::build_pipeline(&range_spec(None));
        let filter = stages[0].get_document("$match").unwrap();

        assert_eq!(filter.get_str("device_id").unwrap(), "dev-01");

        let window = filter.get_document("timestamp").unwrap();
        let start = mongodb::bson::DateTime::from_millis(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
                .unwrap()
                .timestamp_millis(),
        );
        let end = mongodb::bson::DateTime::from_millis(
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0)
                .unwrap()
                .timestamp_millis(),
        );
        assert_eq!(window.get("$gte"), Some(&Bson::DateTime(start)));
        assert_eq!(window.get("$lte"), Some(&Bson::DateTime(end)));
    }

    #[test]
    fn day_filter_covers_exactly_the_calendar_day() {
        let spec = QuerySpec::day(
            EntityKind::Mobile,
            "user-01".to_string(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            None,
            None,
        );

        let stages = TrackQueryPlanner::build_pipeline(&spec);
        let filter = stages[0].get_document("$match").unwrap();
        assert_eq!(filter.get_str("user_id").unwrap(), "user-01");

        let window = filter.get_document("timestamp").unwrap();
        let day_start = mongodb::bson::DateTime::from_millis(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
                .unwrap()
                .timestamp_millis(),
        );
        let next_day = mongodb::bson::DateTime::from_millis(
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0)
                .unwrap()
                .timestamp_millis(),
        );
        assert_eq!(window.get("$gte"), Some(&Bson::DateTime(day_start)));
        // Exclusive upper bound: next day's midnight belongs to the next day.
        assert_eq!(window.get("$lt"), Some(&Bson::DateTime(next_day)));
        assert!(window.get("$lte").is_none());
    }

    #[test]
    fn sampling_pipeline_ranks_then_keeps_every_nth_row() {
        let stages = TrackQueryPlanner::build_pipeline(&range_spec(Some(7)));
        assert_eq!(stages.len(), 5);

        let window_fields = stages[1].get_document("$setWindowFields").unwrap();
        assert_eq!(
            window_fields.get_document("sortBy").unwrap(),
            &doc! {"timestamp": 1}
        );

        let rank_match = stages[2].get_document("$match").unwrap();
        let expr = rank_match.get_document("$expr").unwrap();
        assert_eq!(
            expr.get_array("$eq").unwrap()[0],
            Bson::Document(doc! {"$mod": [{"$subtract": ["$row_num", 1]}, 7_i64]})
        );
        assert_eq!(expr.get_array("$eq").unwrap()[1], Bson::Int32(0));

        // Final ordering and truncation still apply after sampling.
        assert_eq!(
            stages[3].get_document("$sort").unwrap(),
            &doc! {"timestamp": 1}
        );
        assert_eq!(stages[4].get("$limit"), Some(&Bson::Int64(1000)));
    }

    #[test]
    fn identical_specs_build_identical_pipelines() {
        let a = TrackQueryPlanner::build_pipeline(&range_spec(Some(5)));
        let b = TrackQueryPlanner::build_pipeline(&range_spec(Some(5)));
        assert_eq!(a, b);
    }

    #[test]
    fn entity_id_is_bound_as_a_value() {
        let mut spec = range_spec(None);
        spec.entity_id = "dev;DROP".to_string();

        // Even a hostile id lands as a BSON string value inside $match,
        // not as query text.
        let stages = TrackQueryPlanner::build_pipeline(&spec);
        let filter = stages[0].get_document("$match").unwrap();
        assert_eq!(filter.get("device_id"), Some(&Bson::String("dev;DROP".to_string())));
    }

    #[test]
    fn query_context_names_kind_and_shape() {
        assert_eq!(
            TrackQueryPlanner::query_context(&range_spec(None)),
            "gps range query"
        );

        let day = QuerySpec::day(
            EntityKind::Mobile,
            "user-01".to_string(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            None,
            None,
        );
        assert_eq!(TrackQueryPlanner::query_context(&day), "mobile route query");
    }
}
