use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::LocalizedText;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub title: LocalizedText,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Json")]
    pub description: LocalizedText,
    pub price: Option<String>,
    pub location: String,
    pub category: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_session::Entity")]
    Sessions,
}

impl Related<super::course_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
