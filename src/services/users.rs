use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::auth::oauth::{OAuthProfile, Provider};
use crate::auth::password;
use crate::db::is_unique_violation;
use crate::dto::{ProfilePatch, SignupRequest};
use crate::entities::{Role, oauth_account, user};
use crate::error::AppError;
use crate::services::uploads::{StoredImage, filename_from_url, is_image_reference};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "An account with this email already exists";

/// Trim a PATCH value; blank strings clear the field.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize and length-check one optional profile field.
fn profile_field(
    label: &str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, AppError> {
    let value = normalize(value);
    if value.as_ref().is_some_and(|v| v.chars().count() > max) {
        return Err(AppError::UnprocessableEntity(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(value)
}

pub struct UserService;

impl UserService {
    /// # Errors
    ///
    /// `NotFound` if no user has this id.
    pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Create a password account.
    ///
    /// # Errors
    ///
    /// `UnprocessableEntity` when a field fails validation or the confirmation differs,
    /// `Conflict` when the e-mail is already registered.
    pub async fn signup(
        db: &DatabaseConnection,
        body: SignupRequest,
    ) -> Result<user::Model, AppError> {
        let email = body.email.trim().to_lowercase();
        let first_name = body.first_name.trim().to_string();
        let last_name = body.last_name.trim().to_string();

        password::validate_name("First name", &first_name)
            .map_err(AppError::UnprocessableEntity)?;
        password::validate_name("Last name", &last_name)
            .map_err(AppError::UnprocessableEntity)?;
        password::validate_email(&email).map_err(AppError::UnprocessableEntity)?;
        password::validate_password(&body.password).map_err(AppError::UnprocessableEntity)?;
        if body.password != body.password_confirm {
            return Err(AppError::UnprocessableEntity(
                "Passwords do not match".to_string(),
            ));
        }

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = password::hash_password(&body.password)?;

        let created = new_user(email, Some(password_hash), Some(first_name), Some(last_name))
            .insert(db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(EMAIL_TAKEN.to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        tracing::info!(user_id = %created.id, "User signed up");
        Ok(created)
    }

    /// Check e-mail and password. Unknown e-mails, OAuth-only accounts and wrong passwords
    /// all produce the same error.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on bad credentials.
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        password_attempt: &str,
    ) -> Result<user::Model, AppError> {
        let email = email.trim().to_lowercase();
        let user_model = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(db)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let hash = user_model
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !password::verify_password(password_attempt, hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user_model)
    }

    /// Resolve an external account to a user: by an existing link, else by e-mail (adding the
    /// link), else by creating an account without a password.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or the insert transaction fails.
    pub async fn find_or_create_oauth_user(
        db: &DatabaseConnection,
        provider: Provider,
        profile: &OAuthProfile,
    ) -> Result<user::Model, AppError> {
        let linked = oauth_account::Entity::find()
            .filter(oauth_account::Column::Provider.eq(provider.as_str()))
            .filter(oauth_account::Column::ProviderAccountId.eq(&profile.provider_account_id))
            .one(db)
            .await?;
        if let Some(link) = linked {
            return Self::find(db, link.user_id).await;
        }

        let email = profile.email.trim().to_lowercase();
        password::validate_email(&email).map_err(AppError::BadRequest)?;

        let txn = db.begin().await?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&txn)
            .await?;
        let user_model = match existing {
            Some(found) => found,
            None => {
                let (first_name, last_name) = profile.split_name();
                new_user(email, None, first_name, last_name)
                    .insert(&txn)
                    .await?
            }
        };

        oauth_account::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_model.id),
            provider: Set(provider.as_str().to_string()),
            provider_account_id: Set(profile.provider_account_id.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            user_id = %user_model.id,
            provider = provider.as_str(),
            "Linked OAuth account"
        );
        Ok(user_model)
    }

    /// Apply a profile PATCH. Absent fields are untouched; `null` and blank strings clear.
    /// Setting `imageUrl` also sets `imageFilename` to its last path segment.
    ///
    /// # Errors
    ///
    /// `UnprocessableEntity` on invalid values, `NotFound` if the user vanished.
    pub async fn update_profile(
        db: &DatabaseConnection,
        id: Uuid,
        patch: ProfilePatch,
    ) -> Result<user::Model, AppError> {
        let existing = Self::find(db, id).await?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(image_url) = patch.image_url {
            let image_url = normalize(image_url);
            if let Some(url) = image_url.as_deref()
                && !is_image_reference(url)
            {
                return Err(AppError::UnprocessableEntity(
                    "Image URL must be a valid URL or relative path starting with /".to_string(),
                ));
            }
            active.image_filename = Set(image_url.as_deref().and_then(filename_from_url));
            active.image_url = Set(image_url);
        }

        if let Some(v) = patch.first_name {
            active.first_name = Set(profile_field("First name", v, 100)?);
        }
        if let Some(v) = patch.last_name {
            active.last_name = Set(profile_field("Last name", v, 100)?);
        }
        if let Some(v) = patch.phone {
            active.phone = Set(profile_field("Phone", v, 50)?);
        }
        if let Some(v) = patch.bio {
            active.bio = Set(profile_field("Bio", v, 500)?);
        }
        if let Some(v) = patch.country {
            active.country = Set(profile_field("Country", v, 100)?);
        }
        if let Some(v) = patch.city_state {
            active.city_state = Set(profile_field("City/state", v, 150)?);
        }
        if let Some(v) = patch.postal_code {
            active.postal_code = Set(profile_field("Postal code", v, 50)?);
        }
        if let Some(v) = patch.tax_id {
            active.tax_id = Set(profile_field("Tax ID", v, 100)?);
        }

        Ok(active.update(db).await?)
    }

    /// Point the user's profile image at a freshly stored upload.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user vanished.
    pub async fn set_image(
        db: &DatabaseConnection,
        id: Uuid,
        image: &StoredImage,
    ) -> Result<user::Model, AppError> {
        let existing = Self::find(db, id).await?;
        let mut active: user::ActiveModel = existing.into();
        active.image_url = Set(Some(image.url.clone()));
        active.image_filename = Set(Some(image.filename.clone()));
        Ok(active.update(db).await?)
    }
}

fn new_user(
    email: String,
    password_hash: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(Role::User.as_str().to_string()),
        first_name: Set(first_name),
        last_name: Set(last_name),
        phone: Set(None),
        bio: Set(None),
        country: Set(None),
        city_state: Set(None),
        postal_code: Set(None),
        tax_id: Set(None),
        image_url: Set(None),
        image_filename: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
    }
}
