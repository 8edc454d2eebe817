use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::db::is_unique_violation;
use crate::dto::{MyRegistration, RegistrationDetails, UserSummary};
use crate::entities::{course, course_session, registration, user};
use crate::error::AppError;

const ALREADY_REGISTERED: &str = "Already registered for this session";

pub struct RegistrationService;

impl RegistrationService {
    /// Register `who` for a session.
    ///
    /// Runs in one transaction holding an exclusive lock on the session row, so two
    /// concurrent requests can neither overbook the session nor both insert a registration
    /// for the same user. Checks, in order: the session exists (404), it has not started
    /// (400), the caller is not registered yet (409), a seat is left (409).
    ///
    /// # Errors
    ///
    /// See above; store failures are `AppError::Internal`.
    pub async fn register(
        db: &DatabaseConnection,
        who: &UserIdentity,
        session_id: Uuid,
    ) -> Result<registration::Model, AppError> {
        let txn = db.begin().await?;

        let mut query = course_session::Entity::find_by_id(session_id);
        if txn.get_database_backend() == DbBackend::Postgres {
            query = query.lock_exclusive();
        }
        let session = query
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        if session.start_at.to_utc() <= Utc::now() {
            return Err(AppError::InvalidState(
                "Cannot register for past sessions".to_string(),
            ));
        }

        let existing = registration::Entity::find()
            .filter(registration::Column::UserId.eq(who.id))
            .filter(registration::Column::SessionId.eq(session_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(ALREADY_REGISTERED.to_string()));
        }

        let taken = registration::Entity::find()
            .filter(registration::Column::SessionId.eq(session_id))
            .count(&txn)
            .await?;
        let seats = u64::try_from(session.seats).unwrap_or(0);
        if taken >= seats {
            return Err(AppError::Conflict("Session is full".to_string()));
        }

        let created = registration::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(who.id),
            session_id: Set(session_id),
            approved: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(ALREADY_REGISTERED.to_string())
            } else {
                AppError::from(e)
            }
        })?;

        txn.commit().await?;

        tracing::info!(
            registration_id = %created.id,
            user_id = %who.id,
            session_id = %session_id,
            "Registration created"
        );

        Ok(created)
    }

    /// Delete a registration on behalf of its owner or an admin, freeing the seat.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `Forbidden` if `who` neither owns it nor is an admin.
    pub async fn cancel(
        db: &DatabaseConnection,
        who: &UserIdentity,
        registration_id: Uuid,
    ) -> Result<(), AppError> {
        let existing = registration::Entity::find_by_id(registration_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        if !who.can_manage(existing.user_id) {
            return Err(AppError::Forbidden(
                "Forbidden: You can only delete your own registrations".to_string(),
            ));
        }

        registration::Entity::delete_by_id(registration_id)
            .exec(db)
            .await?;

        tracing::info!(registration_id = %registration_id, by = %who.id, "Registration deleted");
        Ok(())
    }

    /// Set the approval flag. Capacity is not re-checked: unapproved registrations
    /// already hold their seat.
    ///
    /// # Errors
    ///
    /// `NotFound` if the registration does not exist.
    pub async fn set_approved(
        db: &DatabaseConnection,
        registration_id: Uuid,
        approved: bool,
    ) -> Result<registration::Model, AppError> {
        let existing = registration::Entity::find_by_id(registration_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        let mut active: registration::ActiveModel = existing.into();
        active.approved = Set(approved);
        let updated = active.update(db).await?;
        Ok(updated)
    }

    /// Every registration with its user, session and course, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<RegistrationDetails>, AppError> {
        let registrations = registration::Entity::find()
            .order_by_desc(registration::Column::CreatedAt)
            .all(db)
            .await?;

        let user_ids: Vec<Uuid> = registrations.iter().map(|r| r.user_id).collect();
        let users: HashMap<Uuid, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let (sessions, courses) = Self::load_sessions_and_courses(db, &registrations).await?;

        Ok(registrations
            .into_iter()
            .filter_map(|registration| {
                let session = sessions.get(&registration.session_id)?.clone();
                let course = courses.get(&session.course_id)?.clone();
                let user = users.get(&registration.user_id)?.clone();
                Some(RegistrationDetails {
                    registration,
                    user: UserSummary::from(user),
                    session,
                    course,
                })
            })
            .collect())
    }

    /// The caller's registrations with session and course, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Vec<MyRegistration>, AppError> {
        let registrations = registration::Entity::find()
            .filter(registration::Column::UserId.eq(user_id))
            .order_by_desc(registration::Column::CreatedAt)
            .all(db)
            .await?;

        let (sessions, courses) = Self::load_sessions_and_courses(db, &registrations).await?;

        Ok(registrations
            .into_iter()
            .filter_map(|registration| {
                let session = sessions.get(&registration.session_id)?.clone();
                let course = courses.get(&session.course_id)?.clone();
                Some(MyRegistration {
                    registration,
                    session,
                    course,
                })
            })
            .collect())
    }

    async fn load_sessions_and_courses(
        db: &DatabaseConnection,
        registrations: &[registration::Model],
    ) -> Result<
        (
            HashMap<Uuid, course_session::Model>,
            HashMap<Uuid, course::Model>,
        ),
        AppError,
    > {
        if registrations.is_empty() {
            return Ok((HashMap::new(), HashMap::new()));
        }

        let session_ids: Vec<Uuid> = registrations.iter().map(|r| r.session_id).collect();
        let sessions: HashMap<Uuid, course_session::Model> = course_session::Entity::find()
            .filter(course_session::Column::Id.is_in(session_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let course_ids: Vec<Uuid> = sessions.values().map(|s| s.course_id).collect();
        let courses: HashMap<Uuid, course::Model> = course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok((sessions, courses))
    }
}
