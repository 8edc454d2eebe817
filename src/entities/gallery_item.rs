use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::LocalizedText;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery_item")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub title: LocalizedText,
    #[sea_orm(column_type = "Json", nullable)]
    pub description: Option<LocalizedText>,
    pub image_url: String,
    pub price: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
