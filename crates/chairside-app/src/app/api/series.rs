use std::num::NonZeroU32;

use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use chairside_core::error::{CoreError, CoreResult};
use chairside_core::recurrence::{
    MonthWeek, RecurrencePattern, RecurrenceRule, WeekdaySet, parse_time_of_day,
    weekday_from_index,
};
use chairside_db::db::enums::OccurrenceStatus;
use chairside_db::model::occurrence::SeriesOccurrence;
use chairside_service::scheduling::series::{
    SeriesRequest, SeriesWithOccurrences, create_series, get_series,
};

use super::{ErrorResponse, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Create series request payload.
///
/// `pattern` selects the rule family; the other recurrence fields are
/// required or ignored depending on it, mirroring the series columns.
#[derive(Debug, Deserialize)]
pub struct CreateSeriesRequest {
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub pattern: String,
    pub interval_weeks: Option<u32>,
    pub days_of_week: Option<Vec<u8>>,
    pub day_of_month: Option<u8>,
    pub week_of_month: Option<i8>,
    pub weekday: Option<u8>,
    /// Wall-clock `HH:MM` (seconds optional), carried without timezone
    /// interpretation.
    pub time_of_day: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: Option<chrono::NaiveDate>,
    pub max_occurrences: Option<u32>,
}

/// ## Summary
/// Occurrence response payload
#[derive(Debug, Serialize)]
pub struct OccurrenceResponse {
    pub id: uuid::Uuid,
    pub number: i32,
    pub date: chrono::NaiveDate,
    pub time: String,
    pub status: OccurrenceStatus,
    pub appointment_id: Option<uuid::Uuid>,
}

impl From<&SeriesOccurrence> for OccurrenceResponse {
    fn from(occurrence: &SeriesOccurrence) -> Self {
        Self {
            id: occurrence.id,
            number: occurrence.occurrence_number,
            date: occurrence.scheduled_date,
            time: occurrence.scheduled_time.format("%H:%M").to_string(),
            status: occurrence.status,
            appointment_id: occurrence.appointment_id,
        }
    }
}

/// ## Summary
/// Series response payload
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub id: uuid::Uuid,
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub pattern: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: Option<chrono::NaiveDate>,
    pub max_occurrences: Option<i32>,
    pub occurrences: Vec<OccurrenceResponse>,
}

impl From<SeriesWithOccurrences> for SeriesResponse {
    fn from(stored: SeriesWithOccurrences) -> Self {
        Self {
            id: stored.series.id,
            practice_id: stored.series.practice_id,
            patient_id: stored.series.patient_id,
            provider_id: stored.series.provider_id,
            chair_id: stored.series.chair_id,
            room_id: stored.series.room_id,
            pattern: stored.series.pattern.to_string(),
            start_date: stored.series.start_date,
            end_date: stored.series.end_date,
            max_occurrences: stored.series.max_occurrences,
            occurrences: stored.occurrences.iter().map(OccurrenceResponse::from).collect(),
        }
    }
}

fn require_field<T>(value: Option<T>, field: &'static str) -> CoreResult<T> {
    value.ok_or_else(|| {
        CoreError::ValidationError(format!("{field} is required for this pattern"))
    })
}

fn pattern_from_request(request: &CreateSeriesRequest) -> CoreResult<RecurrencePattern> {
    match request.pattern.as_str() {
        "daily" => Ok(RecurrencePattern::Daily),
        "weekly" => {
            let days = require_field(request.days_of_week.as_deref(), "days_of_week")?;
            Ok(RecurrencePattern::Weekly {
                days: WeekdaySet::from_indices(days)?,
            })
        }
        "biweekly" => Ok(RecurrencePattern::Biweekly {
            weekday: weekday_from_index(require_field(request.weekday, "weekday")?)?,
        }),
        "monthly_by_day" => Ok(RecurrencePattern::MonthlyByDay {
            day: require_field(request.day_of_month, "day_of_month")?,
        }),
        "monthly_by_weekday" => Ok(RecurrencePattern::MonthlyByWeekday {
            week: MonthWeek::from_index(require_field(request.week_of_month, "week_of_month")?)?,
            weekday: weekday_from_index(require_field(request.weekday, "weekday")?)?,
        }),
        "every_n_weeks" => {
            let interval = require_field(request.interval_weeks, "interval_weeks")?;
            let interval = NonZeroU32::new(interval).ok_or_else(|| {
                CoreError::ValidationError("interval_weeks must be at least 1".to_string())
            })?;
            let days = require_field(request.days_of_week.as_deref(), "days_of_week")?;
            Ok(RecurrencePattern::EveryNWeeks {
                interval,
                days: WeekdaySet::from_indices(days)?,
            })
        }
        other => Err(CoreError::InvalidInput(format!("unknown pattern: {other}"))),
    }
}

fn rule_from_request(request: &CreateSeriesRequest) -> CoreResult<RecurrenceRule> {
    let pattern = pattern_from_request(request)?;
    let time_of_day = parse_time_of_day(&request.time_of_day)?;
    RecurrenceRule::new(
        pattern,
        request.start_date,
        request.end_date,
        request.max_occurrences,
        time_of_day,
    )
}

/// ## Summary
/// POST /api/series - Create a recurring series, expanding its occurrences.
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed, the pattern is underspecified,
/// or the expansion comes up empty
/// Returns HTTP 500 if database operations fail
#[handler]
async fn create_series_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing create series request");

    let create_req: CreateSeriesRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse create series request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let rule = match rule_from_request(&create_req) {
        Ok(r) => r,
        Err(e) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: e.to_string(),
            }));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    let request = SeriesRequest {
        practice_id: create_req.practice_id,
        patient_id: create_req.patient_id,
        provider_id: create_req.provider_id,
        chair_id: create_req.chair_id,
        room_id: create_req.room_id,
        rule,
    };

    match create_series(&mut conn, &request).await {
        Ok(stored) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(SeriesResponse::from(stored)));
        }
        Err(e) => render_service_error(res, e),
    }
}

/// ## Summary
/// GET /`api/series/:series_id` - Fetch a series with its occurrences.
///
/// ## Errors
/// Returns HTTP 404 if the series does not exist
/// Returns HTTP 500 if database operations fail
#[handler]
async fn get_series_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing get series request");

    let Some(series_id) = req.param::<uuid::Uuid>("series_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid series ID".to_string(),
        }));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match get_series(&mut conn, series_id).await {
        Ok(stored) => {
            res.render(Json(SeriesResponse::from(stored)));
        }
        Err(e) => render_service_error(res, e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("series")
        .post(create_series_handler)
        .push(Router::with_path("<series_id>").get(get_series_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateSeriesRequest {
        CreateSeriesRequest {
            practice_id: uuid::Uuid::now_v7(),
            patient_id: uuid::Uuid::now_v7(),
            provider_id: uuid::Uuid::now_v7(),
            chair_id: None,
            room_id: None,
            pattern: "daily".to_string(),
            interval_weeks: None,
            days_of_week: None,
            day_of_month: None,
            week_of_month: None,
            weekday: None,
            time_of_day: "09:00".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            end_date: Some(chrono::NaiveDate::from_ymd_opt(2025, 1, 19).unwrap()),
            max_occurrences: None,
        }
    }

    #[test]
    fn daily_request_builds_a_rule() {
        let rule = rule_from_request(&base_request()).unwrap();
        assert_eq!(rule.pattern(), &RecurrencePattern::Daily);
        assert_eq!(
            rule.time_of_day(),
            chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
    }

    #[test]
    fn weekly_request_requires_its_day_set() {
        let mut request = base_request();
        request.pattern = "weekly".to_string();
        assert!(rule_from_request(&request).is_err());

        request.days_of_week = Some(vec![1, 3]);
        let rule = rule_from_request(&request).unwrap();
        assert_eq!(rule.pattern().kind_str(), "weekly");
    }

    #[test]
    fn monthly_by_weekday_request_requires_week_and_weekday() {
        let mut request = base_request();
        request.pattern = "monthly_by_weekday".to_string();
        request.week_of_month = Some(-1);
        assert!(rule_from_request(&request).is_err());

        request.weekday = Some(5);
        let rule = rule_from_request(&request).unwrap();
        assert_eq!(
            rule.pattern(),
            &RecurrencePattern::MonthlyByWeekday {
                week: MonthWeek::Last,
                weekday: chrono::Weekday::Fri,
            }
        );
    }

    #[test]
    fn every_n_weeks_request_rejects_a_zero_interval() {
        let mut request = base_request();
        request.pattern = "every_n_weeks".to_string();
        request.interval_weeks = Some(0);
        request.days_of_week = Some(vec![2]);
        assert!(rule_from_request(&request).is_err());

        request.interval_weeks = Some(3);
        assert!(rule_from_request(&request).is_ok());
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        let mut request = base_request();
        request.pattern = "fortnightly".to_string();
        assert!(rule_from_request(&request).is_err());
    }

    #[test]
    fn request_wire_format_accepts_minute_precision_times() {
        let body = serde_json::json!({
            "practice_id": "0195a8f2-7b9d-7c21-a3f4-2b1c9d8e7f60",
            "patient_id": "0195a8f2-7b9d-7c21-a3f4-2b1c9d8e7f61",
            "provider_id": "0195a8f2-7b9d-7c21-a3f4-2b1c9d8e7f62",
            "pattern": "biweekly",
            "weekday": 2,
            "time_of_day": "10:00",
            "start_date": "2025-01-07",
            "end_date": "2025-02-04",
        });

        let request: CreateSeriesRequest = serde_json::from_value(body).unwrap();
        let rule = rule_from_request(&request).unwrap();
        assert_eq!(
            rule.pattern(),
            &RecurrencePattern::Biweekly {
                weekday: chrono::Weekday::Tue,
            }
        );
        assert_eq!(
            rule.time_of_day(),
            chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
    }
}
