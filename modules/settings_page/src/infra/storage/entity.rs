//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Options table entity, one row per section record
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "settings_page_options")]
pub struct Model {
    /// Option name, equal to the section id
    #[sea_orm(primary_key, auto_increment = false)]
    pub option_name: String,

    /// Section record as a JSON object
    pub option_value: Json,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
