use serde::{Deserialize, Serialize};

use super::UserSummary;
use crate::entities::{course, course_session, registration};

/// `PATCH /api/registrations/{id}` body
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

/// One row of the admin registration listing.
#[derive(Debug, Serialize)]
pub struct RegistrationDetails {
    pub registration: registration::Model,
    pub user: UserSummary,
    pub session: course_session::Model,
    pub course: course::Model,
}

#[derive(Debug, Serialize)]
pub struct RegistrationListResponse {
    pub registrations: Vec<RegistrationDetails>,
    pub total: usize,
}

/// A registration as seen by its owner.
#[derive(Debug, Serialize)]
pub struct MyRegistration {
    pub registration: registration::Model,
    pub session: course_session::Model,
    pub course: course::Model,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
