use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::double_option;
use crate::auth::UserIdentity;
use crate::entities::{Role, user};

// ============ Request DTOs ============

/// `POST /api/auth/signup` body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// `POST /api/auth/signin` body
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// `PATCH /api/profile` body. Every field is optional; `null` or `""` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city_state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub postal_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tax_id: Option<Option<String>>,
}

// ============ Response DTOs ============

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub user: UserIdentity,
    pub token: String,
}

/// `GET /api/auth/session` response; `user` is `null` when signed out.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<UserIdentity>,
}

/// The caller's own profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub city_state: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for ProfileResponse {
    fn from(u: user::Model) -> Self {
        let role = u.role();
        Self {
            id: u.id,
            email: u.email,
            role,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            bio: u.bio,
            country: u.country,
            city_state: u.city_state,
            postal_code: u.postal_code,
            tax_id: u.tax_id,
            image_url: u.image_url,
            image_filename: u.image_filename,
            created_at: u.created_at,
        }
    }
}

/// Who a registration belongs to, as shown in the admin listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        let role = u.role();
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            role,
        }
    }
}
