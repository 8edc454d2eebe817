use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{course, course_session, registration};
use crate::error::AppError;

/// Which courses the catalog query returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseFilter {
    pub course_id: Option<Uuid>,
    pub include_inactive: bool,
}

/// An upcoming session with its live seat count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithAvailability {
    #[serde(flatten)]
    pub session: course_session::Model,
    pub registrations_count: i64,
    pub available_seats: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseWithSessions {
    #[serde(flatten)]
    pub course: course::Model,
    pub sessions: Vec<SessionWithAvailability>,
}

/// Seats left once `registrations` are taken; registrations count whether approved or not.
#[must_use]
pub fn available_seats(seats: i32, registrations: i64) -> i64 {
    i64::from(seats) - registrations
}

/// Number of registrations per session, restricted to `session_ids`.
/// Sessions without registrations are absent from the map.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn registration_counts<C: ConnectionTrait>(
    db: &C,
    session_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, AppError> {
    if session_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, i64)> = registration::Entity::find()
        .select_only()
        .column(registration::Column::SessionId)
        .column_as(Expr::col(registration::Column::Id).count(), "count")
        .filter(registration::Column::SessionId.is_in(session_ids.iter().copied()))
        .group_by(registration::Column::SessionId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Courses with their upcoming sessions (earliest first) and per-session availability.
///
/// Inactive courses are skipped unless `filter.include_inactive` is set. Sessions that
/// already started are never listed.
///
/// # Errors
///
/// Returns `AppError::Internal` if any of the underlying queries fail.
pub async fn courses_with_sessions<C: ConnectionTrait>(
    db: &C,
    filter: CourseFilter,
) -> Result<Vec<CourseWithSessions>, AppError> {
    let mut course_query = course::Entity::find();
    if !filter.include_inactive {
        course_query = course_query.filter(course::Column::Active.eq(true));
    }
    if let Some(id) = filter.course_id {
        course_query = course_query.filter(course::Column::Id.eq(id));
    }
    let courses = course_query.all(db).await?;
    if courses.is_empty() {
        return Ok(Vec::new());
    }

    let course_ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    let sessions = course_session::Entity::find()
        .filter(course_session::Column::StartAt.gte(Utc::now().fixed_offset()))
        .filter(course_session::Column::CourseId.is_in(course_ids))
        .order_by_asc(course_session::Column::StartAt)
        .all(db)
        .await?;

    let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
    let counts = registration_counts(db, &session_ids).await?;

    let mut by_course: HashMap<Uuid, Vec<SessionWithAvailability>> = HashMap::new();
    for session in sessions {
        let registrations_count = counts.get(&session.id).copied().unwrap_or(0);
        by_course
            .entry(session.course_id)
            .or_default()
            .push(SessionWithAvailability {
                available_seats: available_seats(session.seats, registrations_count),
                registrations_count,
                session,
            });
    }

    Ok(courses
        .into_iter()
        .map(|course| CourseWithSessions {
            sessions: by_course.remove(&course.id).unwrap_or_default(),
            course,
        })
        .collect())
}
