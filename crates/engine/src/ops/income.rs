use std::sync::LazyLock;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    Income, ResultEngine,
    cache::CacheScope,
    commands::{
        AddIncome, DeleteIncome, DeleteIncomeInRange, GetIncome, GetIncomeById, Handler,
        UpdateIncome,
    },
    income,
    util::normalize_description,
    validation::{
        Validator, amount_in_bounds, amount_message, date_is_plausible, description_fits,
        description_message,
    },
};

use super::{Engine, not_found};

const INVALIDATES: &[CacheScope] = &[CacheScope::Income, CacheScope::Summaries];

static ADD_RULES: LazyLock<Validator<AddIncome>> = LazyLock::new(|| {
    Validator::new()
        .ensure("amount", amount_message(), |c: &AddIncome| amount_in_bounds(c.amount))
        .ensure("date", "date is out of range", |c: &AddIncome| {
            date_is_plausible(c.date)
        })
        .ensure("description", description_message(), |c: &AddIncome| {
            description_fits(&c.description)
        })
});

static UPDATE_RULES: LazyLock<Validator<UpdateIncome>> = LazyLock::new(|| {
    Validator::new()
        .ensure("amount", amount_message(), |c: &UpdateIncome| amount_in_bounds(c.amount))
        .ensure("date", "date is out of range", |c: &UpdateIncome| {
            date_is_plausible(c.date)
        })
        .ensure("description", description_message(), |c: &UpdateIncome| {
            description_fits(&c.description)
        })
});

impl Engine {
    async fn find_income(&self, id: Uuid) -> ResultEngine<income::Model> {
        income::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| not_found("Income", id))
    }
}

impl Handler<AddIncome> for Engine {
    async fn handle(&self, cmd: AddIncome) -> ResultEngine<Income> {
        ADD_RULES.validate(&cmd)?;

        let income = Income::new(cmd.date, cmd.amount, normalize_description(cmd.description));
        income::ActiveModel::from(&income)
            .insert(&self.database)
            .await?;

        tracing::info!(id = %income.id, date = %income.date, "income added");
        self.cache.invalidate_after("add_income", INVALIDATES);
        Ok(income)
    }
}

impl Handler<UpdateIncome> for Engine {
    async fn handle(&self, cmd: UpdateIncome) -> ResultEngine<Income> {
        UPDATE_RULES.validate(&cmd)?;

        let existing = self.find_income(cmd.id).await?;
        let income = Income {
            id: existing.id,
            date: cmd.date,
            amount: cmd.amount,
            description: normalize_description(cmd.description),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        income::ActiveModel::from(&income)
            .update(&self.database)
            .await?;

        tracing::info!(id = %income.id, "income updated");
        self.cache.invalidate_after("update_income", INVALIDATES);
        Ok(income)
    }
}

impl Handler<DeleteIncome> for Engine {
    async fn handle(&self, cmd: DeleteIncome) -> ResultEngine<()> {
        let result = income::Entity::delete_by_id(cmd.id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Income", cmd.id));
        }

        tracing::info!(id = %cmd.id, "income deleted");
        self.cache.invalidate_after("delete_income", INVALIDATES);
        Ok(())
    }
}

impl Handler<DeleteIncomeInRange> for Engine {
    async fn handle(&self, cmd: DeleteIncomeInRange) -> ResultEngine<u64> {
        cmd.range.check()?;

        let result = income::Entity::delete_many()
            .filter(income::Column::Date.gte(cmd.range.start))
            .filter(income::Column::Date.lte(cmd.range.end))
            .exec(&self.database)
            .await?;

        tracing::info!(range = %cmd.range, deleted = result.rows_affected, "income range deleted");
        if result.rows_affected > 0 {
            self.cache.invalidate_after("delete_income_range", INVALIDATES);
        }
        Ok(result.rows_affected)
    }
}

impl Handler<GetIncome> for Engine {
    async fn handle(&self, query: GetIncome) -> ResultEngine<Vec<Income>> {
        query.range.check()?;

        if let Some(cached) = self.cache.get_income(&query.range) {
            return Ok(cached);
        }

        let token = self.cache.fill_token(CacheScope::Income);
        let items: Vec<Income> = income::Entity::find()
            .filter(income::Column::Date.gte(query.range.start))
            .filter(income::Column::Date.lte(query.range.end))
            .order_by_desc(income::Column::Date)
            .order_by_desc(income::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Income::from)
            .collect();

        self.cache.set_income(token, &query.range, &items);
        Ok(items)
    }
}

impl Handler<GetIncomeById> for Engine {
    async fn handle(&self, query: GetIncomeById) -> ResultEngine<Income> {
        self.find_income(query.id).await.map(Income::from)
    }
}
