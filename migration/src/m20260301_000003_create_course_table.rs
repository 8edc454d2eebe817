use sea_orm_migration::prelude::*;

/// Creates the `course` table. Title and description are `{ "no", "en" }` JSON objects.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Course {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Price,
    Location,
    Category,
    Active,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Course::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Course::Title).json().not_null())
                    .col(
                        ColumnDef::new(Course::Slug)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Course::Description).json().not_null())
                    .col(ColumnDef::new(Course::Price).string_len(20).null())
                    .col(ColumnDef::new(Course::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Course::Category).string_len(100).null())
                    .col(
                        ColumnDef::new(Course::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await
    }
}
