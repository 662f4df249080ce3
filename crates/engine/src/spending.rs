//! Spending entries. Every entry belongs to exactly one category.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spending {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Spending {
    pub fn new(
        date: NaiveDate,
        amount: MoneyCents,
        description: Option<String>,
        category_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            amount,
            description,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "spending")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Spending> for ActiveModel {
    fn from(spending: &Spending) -> Self {
        Self {
            id: ActiveValue::Set(spending.id),
            date: ActiveValue::Set(spending.date),
            amount_minor: ActiveValue::Set(spending.amount.cents()),
            description: ActiveValue::Set(spending.description.clone()),
            category_id: ActiveValue::Set(spending.category_id),
            created_at: ActiveValue::Set(spending.created_at),
            updated_at: ActiveValue::Set(spending.updated_at),
        }
    }
}

impl From<Model> for Spending {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
