use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::double_option;
use crate::entities::LocalizedText;
use crate::services::availability::CourseWithSessions;

// ============ Request DTOs ============

/// Query string for `GET /api/courses`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create course request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: LocalizedText,
    pub slug: String,
    pub description: LocalizedText,
    pub price: Option<String>,
    pub location: String,
    pub category: Option<String>,
    pub active: Option<bool>,
}

/// Partial course update; `price` and `category` may be cleared with `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub title: Option<LocalizedText>,
    pub slug: Option<String>,
    pub description: Option<LocalizedText>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<String>>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub active: Option<bool>,
}

/// Create session request. Admin forms post snake_case, so both spellings are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    #[serde(alias = "start_at")]
    pub start_at: DateTime<FixedOffset>,
    #[serde(alias = "end_at")]
    pub end_at: DateTime<FixedOffset>,
    pub seats: i32,
}

/// Partial session update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(alias = "start_at")]
    pub start_at: Option<DateTime<FixedOffset>>,
    #[serde(alias = "end_at")]
    pub end_at: Option<DateTime<FixedOffset>>,
    pub seats: Option<i32>,
}

// ============ Response DTOs ============

#[derive(Debug, Serialize)]
pub struct CoursesResponse {
    pub courses: Vec<CourseWithSessions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_input_accepts_both_spellings() {
        let camel = serde_json::from_str::<SessionInput>(
            r#"{"startAt":"2026-11-01T10:00:00Z","endAt":"2026-11-01T13:00:00Z","seats":8}"#,
        );
        let snake = serde_json::from_str::<SessionInput>(
            r#"{"start_at":"2026-11-01T10:00:00+01:00","end_at":"2026-11-01T13:00:00+01:00","seats":8}"#,
        );

        assert!(camel.is_ok());
        assert!(snake.is_ok());
        if let (Ok(camel), Ok(snake)) = (camel, snake) {
            assert_eq!(camel.seats, 8);
            assert!(camel.end_at > camel.start_at);
            assert_eq!(snake.start_at.to_utc().to_rfc3339(), "2026-11-01T09:00:00+00:00");
        }
    }

    #[test]
    fn course_patch_clears_price() {
        let patch: CoursePatch =
            serde_json::from_str(r#"{"price":null,"active":false}"#).unwrap_or_default();
        assert_eq!(patch.price, Some(None));
        assert_eq!(patch.category, None);
        assert_eq!(patch.active, Some(false));
    }
}
