use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::data_types::query::{MAX_ROW_CAP, MAX_SAMPLING_FACTOR};
use crate::errors::ApiError;
use crate::util::time::DateTimeUtils;

const MAX_RANGE_DAYS: i64 = 30;

/// Request validation. Every function here runs before the planner is
/// ever constructed; a failure short-circuits the request with a 400
/// and no store query is issued.
pub fn validate_entity_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::Validation("Entity id is required".to_string()));
    }

    let valid = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(ApiError::Validation(
            "Entity id can only contain letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

pub fn parse_time_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            return Err(ApiError::Validation(
                "Both startTime and endTime are required".to_string(),
            ))
        }
    };

    let start = DateTimeUtils::parse_instant(start).ok_or_else(|| {
        ApiError::Validation("startTime and endTime must be valid ISO date strings".to_string())
    })?;
    let end = DateTimeUtils::parse_instant(end).ok_or_else(|| {
        ApiError::Validation("startTime and endTime must be valid ISO date strings".to_string())
    })?;

    if start >= end {
        return Err(ApiError::Validation(
            "startTime must be before endTime".to_string(),
        ));
    }

    if end - start > Duration::days(MAX_RANGE_DAYS) {
        return Err(ApiError::Validation(
            "Maximum time range is 30 days".to_string(),
        ));
    }

    Ok((start, end))
}

pub fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };

    match raw.parse::<i64>() {
        Ok(limit) if (1..=MAX_ROW_CAP).contains(&limit) => Ok(Some(limit)),
        _ => Err(ApiError::Validation(
            "Limit must be a number between 1 and 50000".to_string(),
        )),
    }
}

pub fn parse_sampling(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };

    match raw.parse::<i64>() {
        Ok(factor) if (1..=MAX_SAMPLING_FACTOR).contains(&factor) => Ok(Some(factor)),
        _ => Err(ApiError::Validation(
            "Sampling must be a number between 1 and 100 (every N records)".to_string(),
        )),
    }
}

pub fn parse_route_date(raw: &str) -> Result<NaiveDate, ApiError> {
    DateTimeUtils::parse_day(raw)
        .ok_or_else(|| ApiError::Validation("Date must be in YYYY-MM-DD format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_validation(err: &ApiError) -> bool {
        matches!(err, ApiError::Validation(_))
    }

    #[test]
    fn accepts_well_formed_entity_ids() {
        for id in ["dev-01", "user.7_a", "ABC123", "a"] {
            assert!(validate_entity_id(id).is_ok(), "rejected {}", id);
        }
    }

    #[test]
    fn rejects_injection_shaped_ids() {
        let err = validate_entity_id("dev;DROP").unwrap_err();
        assert!(is_validation(&err));

        assert!(validate_entity_id("a b").is_err());
        assert!(validate_entity_id("id/../../etc").is_err());
        assert!(validate_entity_id("").is_err());
        assert!(validate_entity_id("   ").is_err());
    }

    #[test]
    fn time_range_requires_both_ends() {
        let err = parse_time_range(Some("2024-05-01T00:00:00Z"), None).unwrap_err();
        assert!(err.to_string().contains("startTime and endTime are required"));
    }

    #[test]
    fn time_range_rejects_unparseable_instants() {
        let err =
            parse_time_range(Some("not-a-date"), Some("2024-05-01T00:00:00Z")).unwrap_err();
        assert!(err.to_string().contains("valid ISO date strings"));
    }

    #[test]
    fn time_range_must_be_ordered() {
        let err = parse_time_range(
            Some("2024-05-02T00:00:00Z"),
            Some("2024-05-01T00:00:00Z"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("before endTime"));

        // Equal endpoints are an empty window, also rejected.
        assert!(parse_time_range(
            Some("2024-05-01T00:00:00Z"),
            Some("2024-05-01T00:00:00Z"),
        )
        .is_err());
    }

    #[test]
    fn time_range_is_capped_at_30_days() {
        // Exactly 30 days passes.
        assert!(parse_time_range(
            Some("2024-05-01T00:00:00Z"),
            Some("2024-05-31T00:00:00Z"),
        )
        .is_ok());

        let err = parse_time_range(
            Some("2024-05-01T00:00:00Z"),
            Some("2024-06-01T00:00:00.001Z"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("30 days"));
    }

    #[test]
    fn limit_bounds_are_enforced() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some("1")).unwrap(), Some(1));
        assert_eq!(parse_limit(Some("50000")).unwrap(), Some(50000));

        for bad in ["0", "60000", "-5", "abc", "10.5"] {
            let err = parse_limit(Some(bad)).unwrap_err();
            assert!(
                err.to_string().contains("between 1 and 50000"),
                "limit {} not rejected with bound message",
                bad
            );
        }
    }

    #[test]
    fn sampling_bounds_are_enforced() {
        assert_eq!(parse_sampling(None).unwrap(), None);
        assert_eq!(parse_sampling(Some("1")).unwrap(), Some(1));
        assert_eq!(parse_sampling(Some("100")).unwrap(), Some(100));

        for bad in ["0", "101", "-1", "every-5th"] {
            assert!(parse_sampling(Some(bad)).is_err(), "sampling {} accepted", bad);
        }
    }

    #[test]
    fn route_date_must_be_padded_iso() {
        assert!(parse_route_date("2024-05-01").is_ok());

        for bad in ["2024-5-1", "05-01-2024", "20240501", "2024-05-01T00:00:00Z"] {
            let err = parse_route_date(bad).unwrap_err();
            assert!(err.to_string().contains("YYYY-MM-DD"), "date {} accepted", bad);
        }
    }
}
