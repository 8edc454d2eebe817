pub mod course;
pub mod course_session;
pub mod gallery_item;
pub mod localized;
pub mod oauth_account;
pub mod registration;
pub mod user;

pub use localized::LocalizedText;
pub use user::Role;
