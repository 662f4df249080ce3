#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use engine::{
    Category, DateRange, Engine, MoneyCents,
    cache::{CacheStore, MemoryCache},
    commands::AddCategory,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

pub async fn db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine() -> Engine {
    Engine::builder().database(db().await).build().await.unwrap()
}

/// Engine sharing `store` with the caller so tests can inspect cache keys.
pub async fn engine_with_cache() -> (Engine, Arc<MemoryCache>) {
    let store = Arc::new(MemoryCache::new());
    let engine = engine_with_store(store.clone()).await;
    (engine, store)
}

pub async fn engine_with_store(store: Arc<dyn CacheStore>) -> Engine {
    Engine::builder()
        .database(db().await)
        .cache_store(store)
        .build()
        .await
        .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

pub fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}

pub async fn category(engine: &Engine, name: &str) -> Category {
    engine.send(AddCategory::new(name)).await.unwrap()
}
