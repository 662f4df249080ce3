//! Derived totals returned by the summary queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, period::DateRange};

/// Spending total of one category inside a summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub name: String,
    pub total: MoneyCents,
    /// Share of the summary's total spending, in basis points.
    pub share_bps: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub range: DateRange,
    pub total_income: MoneyCents,
    pub total_spending: MoneyCents,
    pub net: MoneyCents,
    /// Only categories with spending in the range, by display order then name.
    pub by_category: Vec<CategoryTotal>,
}

impl BudgetSummary {
    pub(crate) fn new(
        range: DateRange,
        total_income: MoneyCents,
        category_rows: Vec<(Uuid, String, MoneyCents)>,
    ) -> Self {
        let total_spending: MoneyCents = category_rows.iter().map(|(_, _, total)| *total).sum();
        let by_category = category_rows
            .into_iter()
            .map(|(category_id, name, total)| CategoryTotal {
                category_id,
                name,
                total,
                share_bps: total.share_bps(total_spending),
            })
            .collect();
        Self {
            range,
            total_income,
            total_spending,
            net: total_income - total_spending,
            by_category,
        }
    }
}

/// Totals for one bank-statement period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub period: DateRange,
    pub anchor_day: u32,
    pub total_income: MoneyCents,
    pub total_spending: MoneyCents,
    pub net: MoneyCents,
    pub by_category: Vec<CategoryTotal>,
}

impl StatementSummary {
    pub(crate) fn from_budget(anchor_day: u32, budget: BudgetSummary) -> Self {
        Self {
            period: budget.range,
            anchor_day,
            total_income: budget.total_income,
            total_spending: budget.total_spending,
            net: budget.net,
            by_category: budget.by_category,
        }
    }
}

/// One week of the income/spending trend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub income: MoneyCents,
    pub spending: MoneyCents,
}
