use chrono::{DateTime, NaiveDate, Utc};

use crate::data_types::common::{EntityId, EntityKind};

pub const MAX_ROW_CAP: i64 = 50000;
pub const DEFAULT_RANGE_ROW_CAP: i64 = 20000;
pub const DEFAULT_ROUTE_ROW_CAP: i64 = 50000;
pub const MAX_SAMPLING_FACTOR: i64 = 100;

/// Time filter of a track query: an inclusive instant window, or one
/// whole calendar day (UTC).
#[derive(Debug, Clone, PartialEq)]
pub enum TimeFilter {
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Day(NaiveDate),
}

/// A fully validated track query. Built once per request by the route
/// handler and handed to the planner, which consumes it for exactly one
/// store call.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub filter: TimeFilter,
    pub row_cap: i64,
    pub sampling: Option<i64>,
}

impl QuerySpec {
    pub fn range(
        kind: EntityKind,
        entity_id: EntityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        row_cap: Option<i64>,
        sampling: Option<i64>,
    ) -> Self {
        Self {
            kind,
            entity_id,
            filter: TimeFilter::Range { start, end },
            row_cap: row_cap.unwrap_or(DEFAULT_RANGE_ROW_CAP),
            sampling,
        }
    }

    pub fn day(
        kind: EntityKind,
        entity_id: EntityId,
        day: NaiveDate,
        row_cap: Option<i64>,
        sampling: Option<i64>,
    ) -> Self {
        Self {
            kind,
            entity_id,
            filter: TimeFilter::Day(day),
            row_cap: row_cap.unwrap_or(DEFAULT_ROUTE_ROW_CAP),
            sampling,
        }
    }
}
