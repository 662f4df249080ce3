use std::sync::LazyLock;

use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine, Spending, categories,
    cache::CacheScope,
    commands::{
        AddSpending, DeleteSpending, DeleteSpendingByCategory, DeleteSpendingInRange, GetSpending,
        GetSpendingById, Handler, ListSpendingPage, SpendingPage, UpdateSpending,
    },
    spending,
    util::normalize_description,
    validation::{
        Validator, amount_in_bounds, amount_message, date_is_plausible, description_fits,
        description_message,
    },
};

use super::{Engine, not_found};

const INVALIDATES: &[CacheScope] = &[CacheScope::Spending, CacheScope::Summaries];

pub const MAX_PAGE_SIZE: u64 = 500;

static ADD_RULES: LazyLock<Validator<AddSpending>> = LazyLock::new(|| {
    Validator::new()
        .ensure("amount", amount_message(), |c: &AddSpending| amount_in_bounds(c.amount))
        .ensure("date", "date is out of range", |c: &AddSpending| {
            date_is_plausible(c.date)
        })
        .ensure("description", description_message(), |c: &AddSpending| {
            description_fits(&c.description)
        })
});

static UPDATE_RULES: LazyLock<Validator<UpdateSpending>> = LazyLock::new(|| {
    Validator::new()
        .ensure("amount", amount_message(), |c: &UpdateSpending| {
            amount_in_bounds(c.amount)
        })
        .ensure("date", "date is out of range", |c: &UpdateSpending| {
            date_is_plausible(c.date)
        })
        .ensure("description", description_message(), |c: &UpdateSpending| {
            description_fits(&c.description)
        })
});

static PAGE_RULES: LazyLock<Validator<ListSpendingPage>> = LazyLock::new(|| {
    Validator::new().ensure(
        "limit",
        format!("limit must be between 1 and {MAX_PAGE_SIZE}"),
        |q: &ListSpendingPage| (1..=MAX_PAGE_SIZE).contains(&q.limit),
    )
});

/// Position after the last item of a page: `(date, created_at, id)` descending.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct SpendingCursor {
    date: NaiveDate,
    created_at: DateTime<Utc>,
    id: Uuid,
}

impl SpendingCursor {
    fn invalid() -> EngineError {
        EngineError::validation("Spending.InvalidCursor", "invalid spending cursor")
    }

    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self).map_err(|_| Self::invalid())?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| Self::invalid())?;
        serde_json::from_slice::<Self>(&bytes).map_err(|_| Self::invalid())
    }

    fn after(&self) -> Condition {
        Condition::any()
            .add(spending::Column::Date.lt(self.date))
            .add(
                Condition::all()
                    .add(spending::Column::Date.eq(self.date))
                    .add(spending::Column::CreatedAt.lt(self.created_at)),
            )
            .add(
                Condition::all()
                    .add(spending::Column::Date.eq(self.date))
                    .add(spending::Column::CreatedAt.eq(self.created_at))
                    .add(spending::Column::Id.lt(self.id)),
            )
    }
}

impl Engine {
    async fn find_spending(&self, id: Uuid) -> ResultEngine<spending::Model> {
        spending::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| not_found("Spending", id))
    }

    /// Spending may only point at an existing, active category.
    async fn require_active_category(&self, category_id: Uuid) -> ResultEngine<categories::Model> {
        let category = categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                EngineError::not_found("Spending.CategoryNotFound", "category not found")
                    .with_metadata("category_id", category_id)
            })?;
        if !category.is_active {
            return Err(EngineError::business(
                "Spending.CategoryInactive",
                format!("category '{}' is inactive", category.name),
            )
            .with_metadata("category_id", category_id));
        }
        Ok(category)
    }
}

impl Handler<AddSpending> for Engine {
    async fn handle(&self, cmd: AddSpending) -> ResultEngine<Spending> {
        ADD_RULES.validate(&cmd)?;
        self.require_active_category(cmd.category_id).await?;

        let spending = Spending::new(
            cmd.date,
            cmd.amount,
            normalize_description(cmd.description),
            cmd.category_id,
        );
        spending::ActiveModel::from(&spending)
            .insert(&self.database)
            .await?;

        tracing::info!(id = %spending.id, category_id = %spending.category_id, "spending added");
        self.cache.invalidate_after("add_spending", INVALIDATES);
        Ok(spending)
    }
}

impl Handler<UpdateSpending> for Engine {
    async fn handle(&self, cmd: UpdateSpending) -> ResultEngine<Spending> {
        UPDATE_RULES.validate(&cmd)?;

        let existing = self.find_spending(cmd.id).await?;
        self.require_active_category(cmd.category_id).await?;

        let spending = Spending {
            id: existing.id,
            date: cmd.date,
            amount: cmd.amount,
            description: normalize_description(cmd.description),
            category_id: cmd.category_id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        spending::ActiveModel::from(&spending)
            .update(&self.database)
            .await?;

        tracing::info!(id = %spending.id, "spending updated");
        self.cache.invalidate_after("update_spending", INVALIDATES);
        Ok(spending)
    }
}

impl Handler<DeleteSpending> for Engine {
    async fn handle(&self, cmd: DeleteSpending) -> ResultEngine<()> {
        let result = spending::Entity::delete_by_id(cmd.id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Spending", cmd.id));
        }

        tracing::info!(id = %cmd.id, "spending deleted");
        self.cache.invalidate_after("delete_spending", INVALIDATES);
        Ok(())
    }
}

impl Handler<DeleteSpendingInRange> for Engine {
    async fn handle(&self, cmd: DeleteSpendingInRange) -> ResultEngine<u64> {
        cmd.range.check()?;

        let mut delete = spending::Entity::delete_many()
            .filter(spending::Column::Date.gte(cmd.range.start))
            .filter(spending::Column::Date.lte(cmd.range.end));
        if let Some(category_id) = cmd.category_id {
            delete = delete.filter(spending::Column::CategoryId.eq(category_id));
        }
        let result = delete.exec(&self.database).await?;

        tracing::info!(
            range = %cmd.range,
            deleted = result.rows_affected,
            "spending range deleted"
        );
        if result.rows_affected > 0 {
            self.cache.invalidate_after("delete_spending_range", INVALIDATES);
        }
        Ok(result.rows_affected)
    }
}

impl Handler<DeleteSpendingByCategory> for Engine {
    async fn handle(&self, cmd: DeleteSpendingByCategory) -> ResultEngine<u64> {
        if categories::Entity::find_by_id(cmd.category_id)
            .one(&self.database)
            .await?
            .is_none()
        {
            return Err(not_found("Category", cmd.category_id));
        }

        let result = spending::Entity::delete_many()
            .filter(spending::Column::CategoryId.eq(cmd.category_id))
            .exec(&self.database)
            .await?;

        tracing::info!(
            category_id = %cmd.category_id,
            deleted = result.rows_affected,
            "spending for category deleted"
        );
        if result.rows_affected > 0 {
            self.cache.invalidate_after("delete_spending_by_category", INVALIDATES);
        }
        Ok(result.rows_affected)
    }
}

impl Handler<GetSpending> for Engine {
    async fn handle(&self, query: GetSpending) -> ResultEngine<Vec<Spending>> {
        query.range.check()?;

        if let Some(cached) = self.cache.get_spending(&query.range, query.category_id) {
            return Ok(cached);
        }

        let token = self.cache.fill_token(CacheScope::Spending);
        let mut select = spending::Entity::find()
            .filter(spending::Column::Date.gte(query.range.start))
            .filter(spending::Column::Date.lte(query.range.end));
        if let Some(category_id) = query.category_id {
            select = select.filter(spending::Column::CategoryId.eq(category_id));
        }
        let items: Vec<Spending> = select
            .order_by_desc(spending::Column::Date)
            .order_by_desc(spending::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Spending::from)
            .collect();

        self.cache
            .set_spending(token, &query.range, query.category_id, &items);
        Ok(items)
    }
}

impl Handler<GetSpendingById> for Engine {
    async fn handle(&self, query: GetSpendingById) -> ResultEngine<Spending> {
        self.find_spending(query.id).await.map(Spending::from)
    }
}

impl Handler<ListSpendingPage> for Engine {
    /// Pagination is newest → older by `(date DESC, created_at DESC, id DESC)`.
    async fn handle(&self, query: ListSpendingPage) -> ResultEngine<SpendingPage> {
        query.range.check()?;
        PAGE_RULES.validate(&query)?;

        let mut select = spending::Entity::find()
            .filter(spending::Column::Date.gte(query.range.start))
            .filter(spending::Column::Date.lte(query.range.end));
        if let Some(category_id) = query.category_id {
            select = select.filter(spending::Column::CategoryId.eq(category_id));
        }
        if let Some(cursor) = query.cursor.as_deref() {
            select = select.filter(SpendingCursor::decode(cursor)?.after());
        }

        let mut rows = select
            .order_by_desc(spending::Column::Date)
            .order_by_desc(spending::Column::CreatedAt)
            .order_by_desc(spending::Column::Id)
            .limit(query.limit + 1)
            .all(&self.database)
            .await?;

        let has_more = rows.len() as u64 > query.limit;
        rows.truncate(query.limit as usize);

        let next_cursor = match (has_more, rows.last()) {
            (true, Some(last)) => Some(
                SpendingCursor {
                    date: last.date,
                    created_at: last.created_at,
                    id: last.id,
                }
                .encode()?,
            ),
            _ => None,
        };

        Ok(SpendingPage {
            items: rows.into_iter().map(Spending::from).collect(),
            next_cursor,
        })
    }
}
