use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    EngineError, ResultEngine,
    cache::{CacheService, CacheStore, CacheTtls, MemoryCache},
    commands::{Handler, Request},
};

mod categories;
mod income;
mod settings;
mod spending;
mod summaries;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every command and query.
///
/// Cheap to clone: the connection pool and the cache store are shared.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
    cache: CacheService,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Dispatch `request` to its handler.
    pub async fn send<R>(&self, request: R) -> ResultEngine<R::Output>
    where
        R: Request,
        Self: Handler<R>,
    {
        <Self as Handler<R>>::handle(self, request).await
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}

fn not_found(entity: &str, id: impl ToString) -> EngineError {
    EngineError::not_found(
        format!("{entity}.NotFound"),
        format!("{} not found", entity.to_lowercase()),
    )
    .with_metadata("id", id)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    cache_store: Option<Arc<dyn CacheStore>>,
    cache_ttls: CacheTtls,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Use a custom cache store instead of a fresh [`MemoryCache`].
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> EngineBuilder {
        self.cache_store = Some(store);
        self
    }

    pub fn cache_ttls(mut self, ttls: CacheTtls) -> EngineBuilder {
        self.cache_ttls = ttls;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self
            .cache_store
            .unwrap_or_else(|| Arc::new(MemoryCache::new()));
        Ok(Engine {
            database: self.database,
            cache: CacheService::new(store, self.cache_ttls),
        })
    }
}
