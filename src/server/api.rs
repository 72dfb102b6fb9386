use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::igc::ParseError;
use crate::track::RegistryError;

pub const SERVICE_INFO: &str = "Service for IGC tracks.";
pub const SERVICE_VERSION: &str = "v1";

/// Body of `GET /api`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub uptime: String,
    pub info: String,
    pub version: String,
}

/// Body of `POST /api/igc`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredTrack {
    pub id: String,
}

/// Static service facts plus the moment the process started serving.
#[derive(Debug, Clone)]
pub struct ServiceMeta {
    started_at: DateTime<Utc>,
}

impl ServiceMeta {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        ServiceMeta { started_at }
    }

    pub fn started_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn info_at(&self, now: DateTime<Utc>) -> ServiceInfo {
        ServiceInfo {
            uptime: uptime_iso8601(self.started_at, now),
            info: SERVICE_INFO.to_string(),
            version: SERVICE_VERSION.to_string(),
        }
    }
}

/// Calendar difference between two instants as an ISO 8601 duration,
/// always spelled out in full: `P{y}Y{m}M{d}DT{h}H{m}M{s}S`.
pub fn uptime_iso8601(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (a, b) = if start <= now { (start, now) } else { (now, start) };

    let mut years = b.year() - a.year();
    let mut months = b.month() as i32 - a.month() as i32;
    let mut days = b.day() as i32 - a.day() as i32;
    let mut hours = b.hour() as i32 - a.hour() as i32;
    let mut minutes = b.minute() as i32 - a.minute() as i32;
    let mut seconds = b.second() as i32 - a.second() as i32;

    if seconds < 0 {
        seconds += 60;
        minutes -= 1;
    }
    if minutes < 0 {
        minutes += 60;
        hours -= 1;
    }
    if hours < 0 {
        hours += 24;
        days -= 1;
    }
    if days < 0 {
        days += days_in_month(a.year(), a.month());
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    format!("P{years}Y{months}M{days}DT{hours}H{minutes}M{seconds}S")
}

fn days_in_month(year: i32, month: u32) -> i32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day() as i32)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Problem reading the track: {0}")]
    Parse(#[from] ParseError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Registry(RegistryError::Duplicate(_)) => StatusCode::BAD_REQUEST,
            ApiError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Registry(RegistryError::UnknownField(_)) => StatusCode::NOT_FOUND,
            ApiError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::warn!(%status, %message, "request rejected");
        }
        error_response(status, &message)
    }
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "status": "error",
        "message": message,
    });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};

    use super::{uptime_iso8601, ApiError, ServiceMeta, SERVICE_INFO, SERVICE_VERSION};
    use crate::igc::ParseError;
    use crate::track::RegistryError;

    #[test]
    fn uptime_zero_is_fully_spelled_out() {
        let t = Utc.with_ymd_and_hms(2018, 9, 1, 12, 0, 0).unwrap();
        assert_eq!(uptime_iso8601(t, t), "P0Y0M0DT0H0M0S");
    }

    #[test]
    fn uptime_borrows_across_units() {
        let start = Utc.with_ymd_and_hms(2018, 1, 31, 23, 59, 59).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 1).unwrap();
        // day borrow uses the length of January
        assert_eq!(uptime_iso8601(start, now), "P0Y1M0DT0H0M2S");
    }

    #[test]
    fn uptime_spans_years() {
        let start = Utc.with_ymd_and_hms(2016, 11, 15, 8, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 2, 20, 10, 45, 30).unwrap();
        assert_eq!(uptime_iso8601(start, now), "P1Y3M5DT2H15M30S");
    }

    #[test]
    fn uptime_is_symmetric() {
        let a = Utc.with_ymd_and_hms(2020, 2, 10, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2020, 2, 12, 6, 0, 0).unwrap();
        assert_eq!(uptime_iso8601(a, b), uptime_iso8601(b, a));
    }

    #[test]
    fn service_info_carries_static_strings() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let info = ServiceMeta::new(start).info_at(Utc.with_ymd_and_hms(2020, 1, 1, 0, 1, 0).unwrap());
        assert_eq!(info.uptime, "P0Y0M0DT0H1M0S");
        assert_eq!(info.info, SERVICE_INFO);
        assert_eq!(info.version, SERVICE_VERSION);
    }

    #[test]
    fn errors_map_to_status_codes() {
        let dup = ApiError::from(RegistryError::Duplicate("x".into()));
        let missing = ApiError::from(RegistryError::NotFound("x".into()));
        let field = ApiError::from(RegistryError::UnknownField("x".into()));
        let parse = ApiError::from(ParseError::MissingRecord("A"));
        assert_eq!(dup.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(field.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(parse.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
    }
}
