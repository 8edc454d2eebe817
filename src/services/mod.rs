pub mod availability;
pub mod courses;
pub mod gallery;
pub mod registrations;
pub mod uploads;
pub mod users;

pub use courses::CourseService;
pub use gallery::GalleryService;
pub use registrations::RegistrationService;
pub use users::UserService;
