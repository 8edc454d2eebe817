use sea_orm_migration::prelude::*;

/// Creates the `user` table holding credentials, role and profile fields.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Email,
    PasswordHash,
    Role,
    FirstName,
    LastName,
    Phone,
    Bio,
    Country,
    CityState,
    PostalCode,
    TaxId,
    ImageUrl,
    ImageFilename,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(User::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    // Null for accounts created through an OAuth provider
                    .col(ColumnDef::new(User::PasswordHash).string_len(255).null())
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(20)
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(User::FirstName).string_len(100).null())
                    .col(ColumnDef::new(User::LastName).string_len(100).null())
                    .col(ColumnDef::new(User::Phone).string_len(50).null())
                    .col(ColumnDef::new(User::Bio).string_len(500).null())
                    .col(ColumnDef::new(User::Country).string_len(100).null())
                    .col(ColumnDef::new(User::CityState).string_len(150).null())
                    .col(ColumnDef::new(User::PostalCode).string_len(50).null())
                    .col(ColumnDef::new(User::TaxId).string_len(100).null())
                    .col(ColumnDef::new(User::ImageUrl).string_len(500).null())
                    .col(ColumnDef::new(User::ImageFilename).string_len(255).null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}
