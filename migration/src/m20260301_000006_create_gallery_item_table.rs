use sea_orm_migration::prelude::*;

/// Creates the `gallery_item` table for admin-managed display pieces.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum GalleryItem {
    Table,
    Id,
    Title,
    Description,
    ImageUrl,
    Price,
    Category,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GalleryItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GalleryItem::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GalleryItem::Title).json().not_null())
                    .col(ColumnDef::new(GalleryItem::Description).json().null())
                    .col(
                        ColumnDef::new(GalleryItem::ImageUrl)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GalleryItem::Price).string_len(20).null())
                    .col(ColumnDef::new(GalleryItem::Category).string_len(100).null())
                    .col(
                        ColumnDef::new(GalleryItem::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GalleryItem::Table).to_owned())
            .await
    }
}
