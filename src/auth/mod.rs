pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod password;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Role, user};

/// The authenticated caller as seen by everything past the auth boundary.
///
/// Built from a validated session token and the current user row, so `role` reflects
/// the database rather than whatever the token was minted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl UserIdentity {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this caller may act on a resource owned by `owner_id`.
    #[must_use]
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.is_admin()
    }
}

impl From<&user::Model> for UserIdentity {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            role: u.role(),
        }
    }
}
