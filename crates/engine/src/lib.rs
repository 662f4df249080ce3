//! Pennywise engine: income, spending and category bookkeeping.
//!
//! Every use case is a request struct in [`commands`] handled by [`Engine`]:
//!
//! ```rust,no_run
//! # async fn demo(engine: engine::Engine) -> Result<(), engine::EngineError> {
//! use chrono::NaiveDate;
//! use engine::{MoneyCents, commands::{AddCategory, AddSpending}};
//!
//! let food = engine.send(AddCategory::new("Food")).await?;
//! let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! engine
//!     .send(AddSpending::new(date, MoneyCents::new(12_50), food.id).description("lunch"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Reads go through [`cache::CacheService`]; every write invalidates the data
//! kind it touched plus all summaries.

pub use categories::Category;
pub use error::{EngineError, ErrorKind, Outcome};
pub use income::Income;
pub use money::{MAX_AMOUNT, MoneyCents};
pub use ops::{Engine, EngineBuilder};
pub use period::DateRange;
pub use spending::Spending;
pub use summaries::{BudgetSummary, CategoryTotal, StatementSummary, TrendPoint};

pub mod cache;
mod categories;
pub mod commands;
mod error;
mod income;
mod money;
mod ops;
pub mod period;
mod settings;
mod spending;
mod summaries;
mod util;
pub mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;
