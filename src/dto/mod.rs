pub mod course;
pub mod gallery;
pub mod registration;
pub mod user;

pub use course::{
    CourseInput, CoursePatch, CoursesQuery, CoursesResponse, SessionInput, SessionPatch,
};
pub use gallery::{GalleryInput, GalleryListResponse, GalleryPatch, GalleryQuery};
pub use registration::{
    ApprovalRequest, MessageResponse, MyRegistration, RegistrationDetails,
    RegistrationListResponse,
};
pub use user::{
    ForgotPasswordRequest, ProfilePatch, ProfileResponse, SessionResponse, SigninRequest,
    SigninResponse, SignupRequest, SignupResponse, UserSummary,
};

use serde::{Deserialize, Deserializer};

/// Deserialize a PATCH field where an absent key means "leave as is" and `null` means "clear".
///
/// Use together with `#[serde(default)]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
