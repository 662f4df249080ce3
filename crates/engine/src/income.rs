//! Income entries.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Income {
    pub fn new(date: NaiveDate, amount: MoneyCents, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            amount,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "income")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Income> for ActiveModel {
    fn from(income: &Income) -> Self {
        Self {
            id: ActiveValue::Set(income.id),
            date: ActiveValue::Set(income.date),
            amount_minor: ActiveValue::Set(income.amount.cents()),
            description: ActiveValue::Set(income.description.clone()),
            created_at: ActiveValue::Set(income.created_at),
            updated_at: ActiveValue::Set(income.updated_at),
        }
    }
}

impl From<Model> for Income {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            amount: MoneyCents::new(model.amount_minor),
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
