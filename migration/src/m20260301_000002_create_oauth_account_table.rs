use sea_orm_migration::prelude::*;

/// Creates the `oauth_account` table linking Google/GitHub identities to users.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum OauthAccount {
    Table,
    Id,
    UserId,
    Provider,
    ProviderAccountId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OauthAccount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OauthAccount::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OauthAccount::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(OauthAccount::Provider)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OauthAccount::ProviderAccountId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OauthAccount::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oauth_account_user_id")
                            .from(OauthAccount::Table, OauthAccount::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_oauth_account_provider_account")
                    .table(OauthAccount::Table)
                    .col(OauthAccount::Provider)
                    .col(OauthAccount::ProviderAccountId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OauthAccount::Table).to_owned())
            .await
    }
}
