pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_user_table;
mod m20260301_000002_create_oauth_account_table;
mod m20260301_000003_create_course_table;
mod m20260301_000004_create_course_session_table;
mod m20260301_000005_create_registration_table;
mod m20260301_000006_create_gallery_item_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_user_table::Migration),
            Box::new(m20260301_000002_create_oauth_account_table::Migration),
            Box::new(m20260301_000003_create_course_table::Migration),
            Box::new(m20260301_000004_create_course_session_table::Migration),
            Box::new(m20260301_000005_create_registration_table::Migration),
            Box::new(m20260301_000006_create_gallery_item_table::Migration),
        ]
    }
}
