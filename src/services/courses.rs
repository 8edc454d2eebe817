use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::dto::{CourseInput, CoursePatch, SessionInput, SessionPatch};
use crate::entities::{course, course_session, registration};
use crate::error::AppError;

const MAX_SLUG_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_LOCATION_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const DUPLICATE_SLUG: &str = "Course with this slug already exists";

/// Validate a URL slug: lower-case letters, digits and single inner hyphens.
///
/// # Errors
///
/// Returns a message describing the problem.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug is required".to_string());
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(format!("Slug must be at most {MAX_SLUG_LEN} characters"));
    }
    let allowed = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !allowed || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(
            "Slug may only contain lower-case letters, digits and single hyphens".to_string(),
        );
    }
    Ok(())
}

/// Validate a price: a non-negative decimal with at most two fractional digits, e.g. `"1250"`
/// or `"499.50"`.
///
/// # Errors
///
/// Returns a message describing the problem.
pub fn validate_price(price: &str) -> Result<(), String> {
    let (whole, fraction) = match price.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (price, None),
    };
    let whole_ok =
        !whole.is_empty() && whole.len() <= 10 && whole.chars().all(|c| c.is_ascii_digit());
    let fraction_ok = fraction.is_none_or(|f| {
        (1..=2).contains(&f.len()) && f.chars().all(|c| c.is_ascii_digit())
    });
    if whole_ok && fraction_ok {
        Ok(())
    } else {
        Err("Price must be a number with at most two decimals".to_string())
    }
}

/// Trim an optional text field, turning blanks into `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_optional_price(price: Option<&str>) -> Result<(), AppError> {
    price
        .map_or(Ok(()), validate_price)
        .map_err(AppError::UnprocessableEntity)
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(AppError::UnprocessableEntity(format!("{field} is required")));
    }
    if len > max {
        return Err(AppError::UnprocessableEntity(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn validate_category(category: Option<&str>) -> Result<(), AppError> {
    match category {
        Some(c) if c.chars().count() > MAX_CATEGORY_LEN => Err(AppError::UnprocessableEntity(
            format!("Category must be at most {MAX_CATEGORY_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

fn validate_schedule(
    start_at: DateTime<FixedOffset>,
    end_at: DateTime<FixedOffset>,
) -> Result<(), AppError> {
    if end_at <= start_at {
        return Err(AppError::UnprocessableEntity(
            "Session must end after it starts".to_string(),
        ));
    }
    Ok(())
}

fn validate_seats(seats: i32) -> Result<(), AppError> {
    if seats < 0 {
        return Err(AppError::UnprocessableEntity(
            "Seats cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn map_slug_conflict(err: sea_orm::DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(DUPLICATE_SLUG.to_string())
    } else {
        AppError::from(err)
    }
}

pub struct CourseService;

impl CourseService {
    async fn ensure_slug_free(
        db: &DatabaseConnection,
        slug: &str,
        except: Option<Uuid>,
    ) -> Result<(), AppError> {
        let mut query = course::Entity::find().filter(course::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(course::Column::Id.ne(id));
        }
        if query.count(db).await? > 0 {
            return Err(AppError::Conflict(DUPLICATE_SLUG.to_string()));
        }
        Ok(())
    }

    /// Create a course.
    ///
    /// # Errors
    ///
    /// `UnprocessableEntity` on invalid input, `Conflict` if the slug is taken.
    pub async fn create(
        db: &DatabaseConnection,
        input: CourseInput,
    ) -> Result<course::Model, AppError> {
        let slug = input.slug.trim().to_string();
        let price = normalize(input.price);
        let category = normalize(input.category);

        input
            .title
            .validate("title", MAX_TITLE_LEN)
            .map_err(AppError::UnprocessableEntity)?;
        input
            .description
            .validate("description", MAX_DESCRIPTION_LEN)
            .map_err(AppError::UnprocessableEntity)?;
        validate_slug(&slug).map_err(AppError::UnprocessableEntity)?;
        validate_optional_price(price.as_deref())?;
        validate_text("Location", &input.location, MAX_LOCATION_LEN)?;
        validate_category(category.as_deref())?;

        Self::ensure_slug_free(db, &slug, None).await?;

        let created = course::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            slug: Set(slug),
            description: Set(input.description),
            price: Set(price),
            location: Set(input.location.trim().to_string()),
            category: Set(category),
            active: Set(input.active.unwrap_or(true)),
        }
        .insert(db)
        .await
        .map_err(map_slug_conflict)?;

        tracing::info!(course_id = %created.id, slug = %created.slug, "Course created");
        Ok(created)
    }

    /// Apply a partial update to a course.
    ///
    /// # Errors
    ///
    /// `NotFound`, `UnprocessableEntity` on invalid input, `Conflict` on a taken slug.
    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: CoursePatch,
    ) -> Result<course::Model, AppError> {
        let existing = course::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let mut active: course::ActiveModel = existing.into();

        if let Some(title) = patch.title {
            title
                .validate("title", MAX_TITLE_LEN)
                .map_err(AppError::UnprocessableEntity)?;
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            description
                .validate("description", MAX_DESCRIPTION_LEN)
                .map_err(AppError::UnprocessableEntity)?;
            active.description = Set(description);
        }
        if let Some(slug) = patch.slug {
            let slug = slug.trim().to_string();
            validate_slug(&slug).map_err(AppError::UnprocessableEntity)?;
            Self::ensure_slug_free(db, &slug, Some(id)).await?;
            active.slug = Set(slug);
        }
        if let Some(price) = patch.price {
            let price = normalize(price);
            validate_optional_price(price.as_deref())?;
            active.price = Set(price);
        }
        if let Some(location) = patch.location {
            validate_text("Location", &location, MAX_LOCATION_LEN)?;
            active.location = Set(location.trim().to_string());
        }
        if let Some(category) = patch.category {
            let category = normalize(category);
            validate_category(category.as_deref())?;
            active.category = Set(category);
        }
        if let Some(flag) = patch.active {
            active.active = Set(flag);
        }

        let updated = active.update(db).await.map_err(map_slug_conflict)?;
        Ok(updated)
    }

    /// Delete a course together with its sessions and their registrations.
    /// Deleting a course that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AppError> {
        let txn = db.begin().await?;

        let session_ids: Vec<Uuid> = course_session::Entity::find()
            .select_only()
            .column(course_session::Column::Id)
            .filter(course_session::Column::CourseId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !session_ids.is_empty() {
            registration::Entity::delete_many()
                .filter(registration::Column::SessionId.is_in(session_ids))
                .exec(&txn)
                .await?;
        }
        course_session::Entity::delete_many()
            .filter(course_session::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        let result = course::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        if result.rows_affected > 0 {
            tracing::info!(course_id = %id, "Course deleted");
        }
        Ok(())
    }

    /// Schedule a new session for a course.
    ///
    /// # Errors
    ///
    /// `NotFound` if the course does not exist, `UnprocessableEntity` on invalid times or seats.
    pub async fn create_session(
        db: &DatabaseConnection,
        course_id: Uuid,
        input: SessionInput,
    ) -> Result<course_session::Model, AppError> {
        validate_schedule(input.start_at, input.end_at)?;
        validate_seats(input.seats)?;

        if course::Entity::find_by_id(course_id).one(db).await?.is_none() {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        let created = course_session::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            start_at: Set(to_utc(input.start_at)),
            end_at: Set(to_utc(input.end_at)),
            seats: Set(input.seats),
        }
        .insert(db)
        .await?;

        tracing::info!(session_id = %created.id, course_id = %course_id, "Session created");
        Ok(created)
    }

    /// Apply a partial update to a session.
    ///
    /// Holds the session row lock while counting registrations so seats can never be
    /// lowered below the number already taken.
    ///
    /// # Errors
    ///
    /// `NotFound`, `UnprocessableEntity` on invalid times or seats, `Conflict` when the new
    /// seat count is below the current number of registrations.
    pub async fn update_session(
        db: &DatabaseConnection,
        session_id: Uuid,
        patch: SessionPatch,
    ) -> Result<course_session::Model, AppError> {
        let txn = db.begin().await?;

        let mut query = course_session::Entity::find_by_id(session_id);
        if txn.get_database_backend() == DbBackend::Postgres {
            query = query.lock_exclusive();
        }
        let existing = query
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        let start_at = patch.start_at.map_or(existing.start_at, to_utc);
        let end_at = patch.end_at.map_or(existing.end_at, to_utc);
        validate_schedule(start_at, end_at)?;

        if let Some(seats) = patch.seats {
            validate_seats(seats)?;
            let taken = registration::Entity::find()
                .filter(registration::Column::SessionId.eq(session_id))
                .count(&txn)
                .await?;
            if u64::try_from(seats).unwrap_or(0) < taken {
                return Err(AppError::Conflict(format!(
                    "Seats cannot be lower than the number of registrations ({taken})"
                )));
            }
        }

        let mut active: course_session::ActiveModel = existing.into();
        active.start_at = Set(start_at);
        active.end_at = Set(end_at);
        if let Some(seats) = patch.seats {
            active.seats = Set(seats);
        }
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Delete a session and its registrations. Deleting a missing session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn delete_session(db: &DatabaseConnection, session_id: Uuid) -> Result<(), AppError> {
        let txn = db.begin().await?;
        registration::Entity::delete_many()
            .filter(registration::Column::SessionId.eq(session_id))
            .exec(&txn)
            .await?;
        course_session::Entity::delete_by_id(session_id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(session_id = %session_id, "Session deleted");
        Ok(())
    }
}

/// Sessions are stored in UTC so ordering and range filters compare like with like.
fn to_utc(at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    at.with_timezone(&Utc).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("keramikk-for-nybegynnere").is_ok());
        assert!(validate_slug("kurs-2026").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Keramikk").is_err());
        assert!(validate_slug("-keramikk").is_err());
        assert!(validate_slug("keramikk-").is_err());
        assert!(validate_slug("keramikk--kurs").is_err());
        assert!(validate_slug("keramikk kurs").is_err());
        assert!(validate_slug("kurs_1").is_err());
    }

    #[test]
    fn price_rules() {
        assert!(validate_price("1250").is_ok());
        assert!(validate_price("499.5").is_ok());
        assert!(validate_price("499.50").is_ok());
        assert!(validate_price("0").is_ok());
        assert!(validate_price("499.505").is_err());
        assert!(validate_price("499.").is_err());
        assert!(validate_price(".50").is_err());
        assert!(validate_price("-10").is_err());
        assert!(validate_price("12,50").is_err());
        assert!(validate_price("gratis").is_err());
    }

    #[test]
    fn normalize_blanks_to_none() {
        assert_eq!(normalize(Some("  ".to_string())), None);
        assert_eq!(normalize(Some(" Oslo ".to_string())), Some("Oslo".to_string()));
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn schedule_must_move_forward() {
        let start = Utc::now().fixed_offset();
        let end = start + chrono::Duration::hours(2);
        assert!(validate_schedule(start, end).is_ok());
        assert!(validate_schedule(end, start).is_err());
        assert!(validate_schedule(start, start).is_err());
    }

    #[test]
    fn to_utc_keeps_the_instant() {
        let oslo = DateTime::parse_from_rfc3339("2026-11-01T10:00:00+01:00");
        assert!(oslo.is_ok());
        if let Ok(oslo) = oslo {
            let utc = to_utc(oslo);
            assert_eq!(utc, oslo);
            assert_eq!(utc.offset().local_minus_utc(), 0);
        }
    }
}
