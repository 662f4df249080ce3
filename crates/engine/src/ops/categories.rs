use std::sync::LazyLock;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, PaginatorTrait, QueryFilter,
    QueryOrder, Statement, TransactionTrait, prelude::*,
};

use crate::{
    Category, EngineError, ResultEngine,
    cache::CacheScope,
    categories,
    commands::{AddCategory, DeleteCategory, GetCategories, Handler, UpdateCategory},
    spending,
    util::{normalize_category_key, normalize_display},
    validation::{Validator, category_name_fits, category_name_message},
};

use super::{Engine, not_found, with_tx};

static ADD_RULES: LazyLock<Validator<AddCategory>> = LazyLock::new(|| {
    Validator::new()
        .ensure("name", category_name_message(), |c: &AddCategory| {
            category_name_fits(&c.name)
        })
        .ensure("display_order", "display order must be >= 0", |c: &AddCategory| {
            c.display_order.is_none_or(|order| order >= 0)
        })
});

static UPDATE_RULES: LazyLock<Validator<UpdateCategory>> = LazyLock::new(|| {
    Validator::new()
        .ensure("name", category_name_message(), |c: &UpdateCategory| {
            category_name_fits(&c.name)
        })
        .ensure("display_order", "display order must be >= 0", |c: &UpdateCategory| {
            c.display_order >= 0
        })
});

/// Display form and comparison key of a category name.
fn category_names(raw: &str) -> ResultEngine<(String, String)> {
    let invalid = || {
        EngineError::validation("Validation.Failed", "one or more fields are invalid")
            .with_metadata("name", "name must contain letters or digits")
    };
    let display = normalize_display(raw).ok_or_else(invalid)?;
    let key = normalize_category_key(&display).ok_or_else(invalid)?;
    Ok((display, key))
}

impl Engine {
    async fn find_category(&self, id: Uuid) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| not_found("Category", id))
    }

    /// Rejects a name whose folded key belongs to another category.
    async fn ensure_unique_name(
        &self,
        db_tx: &DatabaseTransaction,
        display: &str,
        key: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut select = categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(key.to_string()));
        if let Some(id) = except {
            select = select.filter(categories::Column::Id.ne(id));
        }
        if let Some(existing) = select.one(db_tx).await? {
            return Err(EngineError::conflict(
                "Category.Duplicate",
                format!("category '{display}' already exists as '{}'", existing.name),
            )
            .with_metadata("existing_id", existing.id));
        }
        Ok(())
    }

    async fn next_display_order(&self, db_tx: &DatabaseTransaction) -> ResultEngine<i32> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_string(
            backend,
            "SELECT COALESCE(MAX(display_order), -1) + 1 AS next FROM categories;",
        );
        let row = db_tx.query_one(stmt).await?;
        Ok(match row {
            Some(row) => row.try_get::<i32>("", "next")?,
            None => 0,
        })
    }
}

impl Handler<AddCategory> for Engine {
    async fn handle(&self, cmd: AddCategory) -> ResultEngine<Category> {
        ADD_RULES.validate(&cmd)?;
        let (name, key) = category_names(&cmd.name)?;

        let category = with_tx!(self, |db_tx| {
            async {
                self.ensure_unique_name(&db_tx, &name, &key, None).await?;
                let display_order = match cmd.display_order {
                    Some(order) => order,
                    None => self.next_display_order(&db_tx).await?,
                };
                let now = Utc::now();
                let category = Category {
                    id: Uuid::new_v4(),
                    name: name.clone(),
                    display_order,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                categories::ActiveModel::from_category(&category, key.clone())
                    .insert(&db_tx)
                    .await?;
                Ok::<_, EngineError>(category)
            }
            .await
        })?;

        tracing::info!(id = %category.id, name = %category.name, "category added");
        self.cache
            .invalidate_after("add_category", &[CacheScope::Categories, CacheScope::Summaries]);
        Ok(category)
    }
}

impl Handler<UpdateCategory> for Engine {
    async fn handle(&self, cmd: UpdateCategory) -> ResultEngine<Category> {
        UPDATE_RULES.validate(&cmd)?;
        let (name, key) = category_names(&cmd.name)?;

        let existing = self.find_category(cmd.id).await?;
        let category = with_tx!(self, |db_tx| {
            async {
                self.ensure_unique_name(&db_tx, &name, &key, Some(existing.id))
                    .await?;
                let category = Category {
                    id: existing.id,
                    name: name.clone(),
                    display_order: cmd.display_order,
                    is_active: cmd.is_active,
                    created_at: existing.created_at,
                    updated_at: Utc::now(),
                };
                categories::ActiveModel::from_category(&category, key.clone())
                    .update(&db_tx)
                    .await?;
                Ok::<_, EngineError>(category)
            }
            .await
        })?;

        tracing::info!(id = %category.id, active = category.is_active, "category updated");
        self.cache.invalidate_after(
            "update_category",
            &[
                CacheScope::Categories,
                CacheScope::Spending,
                CacheScope::Summaries,
            ],
        );
        Ok(category)
    }
}

impl Handler<DeleteCategory> for Engine {
    async fn handle(&self, cmd: DeleteCategory) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            async {
                let category = categories::Entity::find_by_id(cmd.id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| not_found("Category", cmd.id))?;

                let in_use = spending::Entity::find()
                    .filter(spending::Column::CategoryId.eq(cmd.id))
                    .count(&db_tx)
                    .await?;
                if in_use > 0 {
                    return Err(EngineError::business(
                        "Category.InUse",
                        format!(
                            "category '{}' is used by {in_use} spending entries",
                            category.name
                        ),
                    )
                    .with_metadata("spending_count", in_use));
                }

                categories::Entity::delete_by_id(cmd.id).exec(&db_tx).await?;
                Ok::<_, EngineError>(())
            }
            .await
        })?;

        tracing::info!(id = %cmd.id, "category deleted");
        self.cache
            .invalidate_after("delete_category", &[CacheScope::Categories, CacheScope::Summaries]);
        Ok(())
    }
}

impl Handler<GetCategories> for Engine {
    async fn handle(&self, query: GetCategories) -> ResultEngine<Vec<Category>> {
        if let Some(cached) = self.cache.get_categories(query.include_inactive) {
            return Ok(cached);
        }

        let token = self.cache.fill_token(CacheScope::Categories);
        let mut select = categories::Entity::find();
        if !query.include_inactive {
            select = select.filter(categories::Column::IsActive.eq(true));
        }
        let items: Vec<Category> = select
            .order_by_asc(categories::Column::DisplayOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();

        self.cache
            .set_categories(token, query.include_inactive, &items);
        Ok(items)
    }
}
