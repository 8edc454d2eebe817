use sea_orm_migration::prelude::*;

/// Creates the `course_session` table: scheduled occurrences of a course with a seat total.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CourseSession {
    Table,
    Id,
    CourseId,
    StartAt,
    EndAt,
    Seats,
}

#[derive(DeriveIden)]
enum Course {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseSession::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseSession::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(CourseSession::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseSession::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseSession::Seats)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_session_course_id")
                            .from(CourseSession::Table, CourseSession::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_session_start_at")
                    .table(CourseSession::Table)
                    .col(CourseSession::StartAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseSession::Table).to_owned())
            .await
    }
}
