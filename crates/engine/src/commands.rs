//! Requests routed to the engine.
//!
//! Every command (write) and query (read) is a plain struct implementing
//! [`Request`]. [`Handler`] is implemented by [`crate::Engine`] exactly once per
//! request type, so [`crate::Engine::send`] always reaches a single handler.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetSummary, Category, Income, MoneyCents, ResultEngine, Spending, StatementSummary,
    TrendPoint, period::DateRange,
};

/// A command or query and the value its handler produces.
pub trait Request {
    type Output;
}

/// Handles one request type.
pub trait Handler<R: Request> {
    fn handle(&self, request: R) -> impl Future<Output = ResultEngine<R::Output>> + Send;
}

macro_rules! request {
    ($($name:ident => $output:ty),+ $(,)?) => {
        $(impl Request for $name {
            type Output = $output;
        })+
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Income
// ─────────────────────────────────────────────────────────────────────────────

/// Record a new income entry.
#[derive(Clone, Debug)]
pub struct AddIncome {
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub description: Option<String>,
}

impl AddIncome {
    #[must_use]
    pub fn new(date: NaiveDate, amount: MoneyCents) -> Self {
        Self {
            date,
            amount,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Replace every mutable field of an income entry.
#[derive(Clone, Debug)]
pub struct UpdateIncome {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DeleteIncome {
    pub id: Uuid,
}

/// Delete every income entry dated inside `range`.
#[derive(Clone, Debug)]
pub struct DeleteIncomeInRange {
    pub range: DateRange,
}

#[derive(Clone, Debug)]
pub struct GetIncome {
    pub range: DateRange,
}

#[derive(Clone, Debug)]
pub struct GetIncomeById {
    pub id: Uuid,
}

// ─────────────────────────────────────────────────────────────────────────────
// Spending
// ─────────────────────────────────────────────────────────────────────────────

/// Record a new spending entry against an active category.
#[derive(Clone, Debug)]
pub struct AddSpending {
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub category_id: Uuid,
}

impl AddSpending {
    #[must_use]
    pub fn new(date: NaiveDate, amount: MoneyCents, category_id: Uuid) -> Self {
        Self {
            date,
            amount,
            description: None,
            category_id,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Replace every mutable field of a spending entry.
#[derive(Clone, Debug)]
pub struct UpdateSpending {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub category_id: Uuid,
}

#[derive(Clone, Debug)]
pub struct DeleteSpending {
    pub id: Uuid,
}

/// Delete spending dated inside `range`, optionally only for one category.
#[derive(Clone, Debug)]
pub struct DeleteSpendingInRange {
    pub range: DateRange,
    pub category_id: Option<Uuid>,
}

#[derive(Clone, Debug)]
pub struct DeleteSpendingByCategory {
    pub category_id: Uuid,
}

#[derive(Clone, Debug)]
pub struct GetSpending {
    pub range: DateRange,
    pub category_id: Option<Uuid>,
}

#[derive(Clone, Debug)]
pub struct GetSpendingById {
    pub id: Uuid,
}

/// Cursor-paginated spending listing, newest first.
#[derive(Clone, Debug)]
pub struct ListSpendingPage {
    pub range: DateRange,
    pub category_id: Option<Uuid>,
    pub limit: u64,
    /// Opaque cursor returned as `next_cursor` by the previous page.
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingPage {
    pub items: Vec<Spending>,
    pub next_cursor: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

/// Create a category. Without an explicit order it goes last.
#[derive(Clone, Debug)]
pub struct AddCategory {
    pub name: String,
    pub display_order: Option<i32>,
}

impl AddCategory {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_order: None,
        }
    }

    #[must_use]
    pub fn display_order(mut self, order: i32) -> Self {
        self.display_order = Some(order);
        self
    }
}

#[derive(Clone, Debug)]
pub struct UpdateCategory {
    pub id: Uuid,
    pub name: String,
    pub display_order: i32,
    pub is_active: bool,
}

/// Delete a category. Refused while any spending references it.
#[derive(Clone, Debug)]
pub struct DeleteCategory {
    pub id: Uuid,
}

#[derive(Clone, Debug, Default)]
pub struct GetCategories {
    pub include_inactive: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Summaries and settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct GetBudgetSummary {
    pub range: DateRange,
}

/// Summary of the bank-statement period containing `date`.
#[derive(Clone, Debug)]
pub struct GetStatementSummary {
    pub date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct GetWeeklyTrend {
    pub range: DateRange,
}

/// Set the bank-statement anchor day (1..=28).
#[derive(Clone, Debug)]
pub struct SetStatementDay {
    pub day: u32,
}

#[derive(Clone, Debug, Default)]
pub struct GetStatementDay;

request! {
    AddIncome => Income,
    UpdateIncome => Income,
    DeleteIncome => (),
    DeleteIncomeInRange => u64,
    GetIncome => Vec<Income>,
    GetIncomeById => Income,
    AddSpending => Spending,
    UpdateSpending => Spending,
    DeleteSpending => (),
    DeleteSpendingInRange => u64,
    DeleteSpendingByCategory => u64,
    GetSpending => Vec<Spending>,
    GetSpendingById => Spending,
    ListSpendingPage => SpendingPage,
    AddCategory => Category,
    UpdateCategory => Category,
    DeleteCategory => (),
    GetCategories => Vec<Category>,
    GetBudgetSummary => BudgetSummary,
    GetStatementSummary => StatementSummary,
    GetWeeklyTrend => Vec<TrendPoint>,
    SetStatementDay => (),
    GetStatementDay => u32,
}
