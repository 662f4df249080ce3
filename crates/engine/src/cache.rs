//! Read-through cache in front of the store.
//!
//! [`CacheStore`] is the raw expiring key/value map; [`MemoryCache`] is the
//! in-process implementation. [`CacheService`] layers the domain on top: key
//! layout per data kind, TTL per kind, typed get/set and prefix invalidation.
//!
//! Key layout:
//!
//! - `income:{start}:{end}`
//! - `spending:{start}:{end}` and `spending:{start}:{end}:category:{id}`
//! - `categories:all` / `categories:active`
//! - `summary:budget:{start}:{end}`, `summary:statement:{start}:{end}`,
//!   `summary:trend:{start}:{end}`
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    BudgetSummary, Category, EngineError, Income, ResultEngine, Spending, StatementSummary,
    TrendPoint, period::DateRange,
};

/// Expiring key/value storage used by [`CacheService`].
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Returns the live value for `key`, `None` on miss or expiry.
    fn get(&self, key: &str) -> ResultEngine<Option<Value>>;

    fn set(&self, key: &str, value: Value, ttl: Duration) -> ResultEngine<()>;

    /// Removes every key starting with `prefix` and returns how many went away.
    fn remove_prefix(&self, prefix: &str) -> ResultEngine<usize>;
}

#[derive(Clone, Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Minimum time between two sweeps of expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    /// Writes at or after this instant sweep expired entries first.
    next_sweep: Option<Instant>,
}

impl Entries {
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        before - self.map.len()
    }
}

/// Thread-safe in-memory [`CacheStore`].
///
/// Expired entries are dropped when read, and swept from the whole map by the
/// first write after each [`SWEEP_INTERVAL`], so keys that are never read
/// again do not pile up.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<Entries>,
}

fn poisoned() -> EngineError {
    EngineError::system("Cache.Unavailable", "cache lock poisoned")
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until they are swept.
    pub fn len(&self) -> ResultEngine<usize> {
        Ok(self.entries.read().map_err(|_| poisoned())?.map.len())
    }

    pub fn is_empty(&self) -> ResultEngine<bool> {
        Ok(self.len()? == 0)
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> ResultEngine<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut keys: Vec<String> = entries.map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Drop every expired entry now.
    pub fn purge_expired(&self) -> ResultEngine<usize> {
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.sweep(now))
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> ResultEngine<Option<Value>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            match entries.map.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.map.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.map.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> ResultEngine<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.next_sweep.is_none_or(|at| now >= at) {
            let swept = entries.sweep(now);
            entries.next_sweep = Some(now + SWEEP_INTERVAL);
            if swept > 0 {
                tracing::debug!(swept, "expired cache entries swept");
            }
        }
        entries.map.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn remove_prefix(&self, prefix: &str) -> ResultEngine<usize> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let before = entries.map.len();
        entries.map.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.map.len())
    }
}

/// Time-to-live per data kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheTtls {
    /// Income and spending lists.
    pub entries: Duration,
    pub categories: Duration,
    /// Budget summaries and weekly trends.
    pub summaries: Duration,
    pub statement_summaries: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            entries: Duration::from_secs(15 * 60),
            categories: Duration::from_secs(30 * 60),
            summaries: Duration::from_secs(5 * 60),
            statement_summaries: Duration::from_secs(60 * 60),
        }
    }
}

/// Groups of keys invalidated together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheScope {
    Income,
    Spending,
    Categories,
    /// Every derived total: budget, statement and trend summaries.
    Summaries,
}

impl CacheScope {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Income => "income:",
            Self::Spending => "spending:",
            Self::Categories => "categories:",
            Self::Summaries => "summary:",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Income => 0,
            Self::Spending => 1,
            Self::Categories => 2,
            Self::Summaries => 3,
        }
    }
}

/// Taken by a query before it loads from the database. The loaded value is
/// only cached if its scope was not invalidated in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillToken {
    scope: CacheScope,
    generation: u64,
}

pub fn income_key(range: &DateRange) -> String {
    format!("income:{}", range.key())
}

pub fn spending_key(range: &DateRange, category_id: Option<Uuid>) -> String {
    match category_id {
        Some(id) => format!("spending:{}:category:{id}", range.key()),
        None => format!("spending:{}", range.key()),
    }
}

pub fn categories_key(include_inactive: bool) -> &'static str {
    if include_inactive {
        "categories:all"
    } else {
        "categories:active"
    }
}

pub fn budget_summary_key(range: &DateRange) -> String {
    format!("summary:budget:{}", range.key())
}

pub fn statement_summary_key(range: &DateRange) -> String {
    format!("summary:statement:{}", range.key())
}

pub fn trend_key(range: &DateRange) -> String {
    format!("summary:trend:{}", range.key())
}

/// Domain cache used by the handlers.
///
/// Reads never fail: a store error or an undecodable value is a miss.
/// Writes and invalidations are best-effort and only logged on failure.
/// Each scope has a generation bumped on invalidation; query results are
/// written through a [`FillToken`] so a load that raced a write is dropped.
#[derive(Clone, Debug)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
    generations: Arc<[AtomicU64; 4]>,
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new(Arc::new(MemoryCache::new()), CacheTtls::default())
    }
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self {
            store,
            ttls,
            generations: Arc::default(),
        }
    }

    fn generation(&self, scope: CacheScope) -> u64 {
        self.generations[scope.slot()].load(Ordering::SeqCst)
    }

    pub fn fill_token(&self, scope: CacheScope) -> FillToken {
        FillToken {
            scope,
            generation: self.generation(scope),
        }
    }

    fn is_current(&self, token: FillToken) -> bool {
        self.generation(token.scope) == token.generation
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.store.get(key) {
            Ok(Some(Value::Null)) | Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Ok(Some(value)) => value,
            Err(err) => {
                tracing::warn!(key, "cache read failed: {err}");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(decoded) => {
                tracing::debug!(key, "cache hit");
                Some(decoded)
            }
            Err(err) => {
                tracing::debug!(key, "cache value not decodable, treating as miss: {err}");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let result = serde_json::to_value(value)
            .map_err(EngineError::from)
            .and_then(|value| self.store.set(key, value, ttl));
        if let Err(err) = result {
            tracing::warn!(key, "cache write failed: {err}");
        }
    }

    /// Cache a loaded value unless `token`'s scope was invalidated since the
    /// load started. An invalidation landing during the write removes it again.
    fn fill<T: Serialize>(&self, token: FillToken, key: &str, value: &T, ttl: Duration) {
        if !self.is_current(token) {
            tracing::debug!(key, "stale cache fill skipped");
            return;
        }
        self.set(key, value, ttl);
        if !self.is_current(token) {
            if let Err(err) = self.store.remove_prefix(key) {
                tracing::warn!(key, "stale cache fill not removed: {err}");
            }
        }
    }

    /// Remove every key in `scope`.
    pub fn invalidate(&self, scope: CacheScope) -> ResultEngine<usize> {
        self.generations[scope.slot()].fetch_add(1, Ordering::SeqCst);
        let removed = self.store.remove_prefix(scope.prefix())?;
        tracing::debug!(prefix = scope.prefix(), removed, "cache invalidated");
        Ok(removed)
    }

    /// Invalidate after a successful mutation. Failures are logged and swallowed;
    /// the TTL bounds how long a stale entry can survive.
    pub fn invalidate_after(&self, operation: &str, scopes: &[CacheScope]) {
        for scope in scopes {
            if let Err(err) = self.invalidate(*scope) {
                tracing::warn!(
                    operation,
                    prefix = scope.prefix(),
                    "cache invalidation failed: {err}"
                );
            }
        }
    }

    pub fn get_income(&self, range: &DateRange) -> Option<Vec<Income>> {
        self.get(&income_key(range))
    }

    pub fn set_income(&self, token: FillToken, range: &DateRange, items: &[Income]) {
        self.fill(token, &income_key(range), &items, self.ttls.entries);
    }

    pub fn get_spending(&self, range: &DateRange, category_id: Option<Uuid>) -> Option<Vec<Spending>> {
        self.get(&spending_key(range, category_id))
    }

    pub fn set_spending(
        &self,
        token: FillToken,
        range: &DateRange,
        category_id: Option<Uuid>,
        items: &[Spending],
    ) {
        self.fill(token, &spending_key(range, category_id), &items, self.ttls.entries);
    }

    pub fn get_categories(&self, include_inactive: bool) -> Option<Vec<Category>> {
        self.get(categories_key(include_inactive))
    }

    pub fn set_categories(&self, token: FillToken, include_inactive: bool, items: &[Category]) {
        self.fill(token, categories_key(include_inactive), &items, self.ttls.categories);
    }

    pub fn get_budget_summary(&self, range: &DateRange) -> Option<BudgetSummary> {
        self.get(&budget_summary_key(range))
    }

    pub fn set_budget_summary(&self, token: FillToken, summary: &BudgetSummary) {
        self.fill(
            token,
            &budget_summary_key(&summary.range),
            summary,
            self.ttls.summaries,
        );
    }

    pub fn get_statement_summary(&self, period: &DateRange) -> Option<StatementSummary> {
        self.get(&statement_summary_key(period))
    }

    pub fn set_statement_summary(&self, token: FillToken, summary: &StatementSummary) {
        self.fill(
            token,
            &statement_summary_key(&summary.period),
            summary,
            self.ttls.statement_summaries,
        );
    }

    pub fn get_weekly_trend(&self, range: &DateRange) -> Option<Vec<TrendPoint>> {
        self.get(&trend_key(range))
    }

    pub fn set_weekly_trend(&self, token: FillToken, range: &DateRange, points: &[TrendPoint]) {
        self.fill(token, &trend_key(range), &points, self.ttls.summaries);
    }
}
