use std::{sync::Arc, time::Duration};

use engine::{
    EngineError, ResultEngine,
    cache::{CacheScope, CacheStore, budget_summary_key, categories_key, income_key, spending_key},
    commands::{
        AddCategory, AddIncome, AddSpending, DeleteIncome, GetBudgetSummary, GetCategories,
        GetIncome, GetSpending, GetWeeklyTrend, SetStatementDay, UpdateCategory,
    },
};
use serde_json::Value;

mod common;
use common::{category, cents, date, engine_with_cache, engine_with_store, range};

/// Store that fails every operation.
#[derive(Debug)]
struct BrokenStore;

impl CacheStore for BrokenStore {
    fn get(&self, _key: &str) -> ResultEngine<Option<Value>> {
        Err(EngineError::system("Cache.Unavailable", "store is down"))
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> ResultEngine<()> {
        Err(EngineError::system("Cache.Unavailable", "store is down"))
    }

    fn remove_prefix(&self, _prefix: &str) -> ResultEngine<usize> {
        Err(EngineError::system("Cache.Unavailable", "store is down"))
    }
}

#[tokio::test]
async fn queries_fill_the_cache_under_their_keys() {
    let (engine, store) = engine_with_cache().await;
    let food = category(&engine, "Food").await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    engine.send(GetIncome { range: may }).await.unwrap();
    engine
        .send(GetSpending {
            range: may,
            category_id: Some(food.id),
        })
        .await
        .unwrap();
    engine.send(GetCategories::default()).await.unwrap();
    engine.send(GetBudgetSummary { range: may }).await.unwrap();

    let keys = store.keys().unwrap();
    assert!(keys.contains(&income_key(&may)));
    assert!(keys.contains(&spending_key(&may, Some(food.id))));
    assert!(keys.contains(&categories_key(false).to_string()));
    assert!(keys.contains(&budget_summary_key(&may)));
}

#[tokio::test]
async fn cached_reads_are_served_until_a_write() {
    let (engine, _store) = engine_with_cache().await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    assert!(engine.send(GetIncome { range: may }).await.unwrap().is_empty());

    // A planted value proves the next read comes from the cache.
    let planted = vec![engine::Income {
        id: uuid::Uuid::new_v4(),
        date: date(2024, 5, 9),
        amount: cents(1),
        description: Some("planted".into()),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }];
    engine
        .cache()
        .set(&income_key(&may), &planted, Duration::from_secs(60));
    let read = engine.send(GetIncome { range: may }).await.unwrap();
    assert_eq!(read, planted);

    let added = engine
        .send(AddIncome::new(date(2024, 5, 2), cents(40_00)))
        .await
        .unwrap();
    let read = engine.send(GetIncome { range: may }).await.unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].id, added.id);
}

#[tokio::test]
async fn list_loaded_before_a_write_is_not_cached() {
    let (engine, store) = engine_with_cache().await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    // A read loads an empty list, then a write commits before it fills.
    let token = engine.cache().fill_token(CacheScope::Income);
    engine
        .send(AddIncome::new(date(2024, 5, 2), cents(40_00)))
        .await
        .unwrap();
    engine.cache().set_income(token, &may, &[]);

    assert!(!store.keys().unwrap().contains(&income_key(&may)));
    let read = engine.send(GetIncome { range: may }).await.unwrap();
    assert_eq!(read.len(), 1);
}

#[tokio::test]
async fn income_writes_refresh_summaries() {
    let (engine, _store) = engine_with_cache().await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    let before = engine.send(GetBudgetSummary { range: may }).await.unwrap();
    assert_eq!(before.total_income, cents(0));

    let income = engine
        .send(AddIncome::new(date(2024, 5, 2), cents(40_00)))
        .await
        .unwrap();
    let after = engine.send(GetBudgetSummary { range: may }).await.unwrap();
    assert_eq!(after.total_income, cents(40_00));

    let trend = engine.send(GetWeeklyTrend { range: may }).await.unwrap();
    assert_eq!(trend[0].income, cents(40_00));

    engine.send(DeleteIncome { id: income.id }).await.unwrap();
    let trend = engine.send(GetWeeklyTrend { range: may }).await.unwrap();
    assert_eq!(trend[0].income, cents(0));
}

#[tokio::test]
async fn spending_writes_drop_spending_and_summary_keys_only() {
    let (engine, store) = engine_with_cache().await;
    let food = category(&engine, "Food").await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    engine.send(GetIncome { range: may }).await.unwrap();
    engine
        .send(GetSpending {
            range: may,
            category_id: None,
        })
        .await
        .unwrap();
    engine.send(GetBudgetSummary { range: may }).await.unwrap();

    engine
        .send(AddSpending::new(date(2024, 5, 3), cents(7_00), food.id))
        .await
        .unwrap();

    let keys = store.keys().unwrap();
    assert!(keys.contains(&income_key(&may)));
    assert!(!keys.contains(&spending_key(&may, None)));
    assert!(!keys.contains(&budget_summary_key(&may)));

    let spending = engine
        .send(GetSpending {
            range: may,
            category_id: None,
        })
        .await
        .unwrap();
    assert_eq!(spending.len(), 1);
}

#[tokio::test]
async fn renaming_a_category_refreshes_summary_names() {
    let (engine, _store) = engine_with_cache().await;
    let food = category(&engine, "Food").await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));
    engine
        .send(AddSpending::new(date(2024, 5, 3), cents(7_00), food.id))
        .await
        .unwrap();

    let summary = engine.send(GetBudgetSummary { range: may }).await.unwrap();
    assert_eq!(summary.by_category[0].name, "Food");
    assert_eq!(engine.send(GetCategories::default()).await.unwrap().len(), 1);

    engine
        .send(UpdateCategory {
            id: food.id,
            name: "Groceries".into(),
            display_order: food.display_order,
            is_active: false,
        })
        .await
        .unwrap();

    let summary = engine.send(GetBudgetSummary { range: may }).await.unwrap();
    assert_eq!(summary.by_category[0].name, "Groceries");
    assert!(engine.send(GetCategories::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn statement_day_change_drops_summaries() {
    let (engine, store) = engine_with_cache().await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));
    engine.send(GetBudgetSummary { range: may }).await.unwrap();
    engine.send(GetCategories::default()).await.unwrap();

    engine.send(SetStatementDay { day: 10 }).await.unwrap();

    let keys = store.keys().unwrap();
    assert!(!keys.iter().any(|key| key.starts_with("summary:")));
    assert!(keys.contains(&categories_key(false).to_string()));
}

#[tokio::test]
async fn broken_cache_never_fails_a_command() {
    let engine = engine_with_store(Arc::new(BrokenStore)).await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    let food = engine.send(AddCategory::new("Food")).await.unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 3), cents(7_00), food.id))
        .await
        .unwrap();
    engine
        .send(AddIncome::new(date(2024, 5, 2), cents(40_00)))
        .await
        .unwrap();

    let categories = engine.send(GetCategories::default()).await.unwrap();
    assert_eq!(categories.len(), 1);
    let summary = engine.send(GetBudgetSummary { range: may }).await.unwrap();
    assert_eq!(summary.net, cents(33_00));
}
