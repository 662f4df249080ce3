//! Handles settings for the application.
//!
//! Sources, later ones winning: built-in defaults, `settings.toml` (optional),
//! then `PENNYWISE__*` environment variables (e.g. `PENNYWISE__APP__LEVEL=debug`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [database]
//! sqlite = "pennywise.db"   # or: database = "memory"
//!
//! [cache]
//! summaries_secs = 120
//! ```
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use engine::cache::CacheTtls;
use serde::Deserialize;

const DEFAULT_SQLITE_PATH: &str = "pennywise.db";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

/// TTL overrides in seconds; unset fields keep the engine defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Cache {
    pub entries_secs: Option<u64>,
    pub categories_secs: Option<u64>,
    pub summaries_secs: Option<u64>,
    pub statement_summaries_secs: Option<u64>,
}

impl Cache {
    pub fn ttls(&self) -> CacheTtls {
        let defaults = CacheTtls::default();
        let pick = |secs: Option<u64>, fallback: Duration| {
            secs.map(Duration::from_secs).unwrap_or(fallback)
        };
        CacheTtls {
            entries: pick(self.entries_secs, defaults.entries),
            categories: pick(self.categories_secs, defaults.categories),
            summaries: pick(self.summaries_secs, defaults.summaries),
            statement_summaries: pick(
                self.statement_summaries_secs,
                defaults.statement_summaries,
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Option<Database>,
    #[serde(default)]
    pub cache: Cache,
}

impl Settings {
    pub fn new(file: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("PENNYWISE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Connection string, defaulting to `pennywise.db` in the working directory.
    pub fn database_url(&self) -> String {
        match &self.database {
            Some(database) => database.url(),
            None => Database::Sqlite(DEFAULT_SQLITE_PATH.to_string()).url(),
        }
    }
}
