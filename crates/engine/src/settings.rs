//! Key/value application settings stored next to the data.

use sea_orm::entity::prelude::*;

pub const STATEMENT_DAY_KEY: &str = "statement_day";
pub const DEFAULT_STATEMENT_DAY: u32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
