use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Statement, prelude::*};

use crate::{
    BudgetSummary, MoneyCents, ResultEngine, StatementSummary, TrendPoint,
    cache::CacheScope,
    commands::{GetBudgetSummary, GetStatementSummary, GetWeeklyTrend, Handler},
    period::{DateRange, statement_period, week_start},
};

use super::Engine;

impl Engine {
    async fn income_total(&self, range: &DateRange) -> ResultEngine<MoneyCents> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_minor), 0) AS total \
             FROM income WHERE date >= ? AND date <= ?;",
            vec![range.start.into(), range.end.into()],
        );
        let row = self.database.query_one(stmt).await?;
        let total = match row {
            Some(row) => row.try_get::<i64>("", "total")?,
            None => 0,
        };
        Ok(MoneyCents::new(total))
    }

    /// Spending per category, ordered like the category list.
    async fn spending_by_category(
        &self,
        range: &DateRange,
    ) -> ResultEngine<Vec<(Uuid, String, MoneyCents)>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT c.id AS category_id, c.name AS name, SUM(s.amount_minor) AS total \
             FROM spending s JOIN categories c ON c.id = s.category_id \
             WHERE s.date >= ? AND s.date <= ? \
             GROUP BY c.id, c.name, c.display_order \
             ORDER BY c.display_order, c.name;",
            vec![range.start.into(), range.end.into()],
        );
        let rows = self.database.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<Uuid>("", "category_id")?,
                    row.try_get::<String>("", "name")?,
                    MoneyCents::new(row.try_get::<i64>("", "total")?),
                ))
            })
            .collect()
    }

    /// Per-day totals of `table` (`income` or `spending`) inside `range`.
    async fn daily_totals(
        &self,
        table: &'static str,
        range: &DateRange,
    ) -> ResultEngine<Vec<(NaiveDate, MoneyCents)>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT date, SUM(amount_minor) AS total FROM {table} \
                 WHERE date >= ? AND date <= ? GROUP BY date ORDER BY date;"
            ),
            vec![range.start.into(), range.end.into()],
        );
        let rows = self.database.query_all(stmt).await?;
        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<NaiveDate>("", "date")?,
                    MoneyCents::new(row.try_get::<i64>("", "total")?),
                ))
            })
            .collect()
    }

    async fn budget_summary(&self, range: DateRange) -> ResultEngine<BudgetSummary> {
        let income = self.income_total(&range).await?;
        let by_category = self.spending_by_category(&range).await?;
        Ok(BudgetSummary::new(range, income, by_category))
    }
}

impl Handler<GetBudgetSummary> for Engine {
    async fn handle(&self, query: GetBudgetSummary) -> ResultEngine<BudgetSummary> {
        query.range.check()?;

        if let Some(cached) = self.cache.get_budget_summary(&query.range) {
            return Ok(cached);
        }

        let token = self.cache.fill_token(CacheScope::Summaries);
        let summary = self.budget_summary(query.range).await?;
        self.cache.set_budget_summary(token, &summary);
        Ok(summary)
    }
}

impl Handler<GetStatementSummary> for Engine {
    async fn handle(&self, query: GetStatementSummary) -> ResultEngine<StatementSummary> {
        let token = self.cache.fill_token(CacheScope::Summaries);
        let anchor_day = self.statement_day().await?;
        let period = statement_period(query.date, anchor_day)?;

        if let Some(cached) = self.cache.get_statement_summary(&period) {
            return Ok(cached);
        }

        let budget = self.budget_summary(period).await?;
        let summary = StatementSummary::from_budget(anchor_day, budget);
        self.cache.set_statement_summary(token, &summary);
        Ok(summary)
    }
}

impl Handler<GetWeeklyTrend> for Engine {
    async fn handle(&self, query: GetWeeklyTrend) -> ResultEngine<Vec<TrendPoint>> {
        query.range.check()?;

        if let Some(cached) = self.cache.get_weekly_trend(&query.range) {
            return Ok(cached);
        }

        let token = self.cache.fill_token(CacheScope::Summaries);
        let mut weeks: BTreeMap<NaiveDate, TrendPoint> = query
            .range
            .week_starts()
            .into_iter()
            .map(|week_start| {
                (
                    week_start,
                    TrendPoint {
                        week_start,
                        income: MoneyCents::ZERO,
                        spending: MoneyCents::ZERO,
                    },
                )
            })
            .collect();

        for (date, total) in self.daily_totals("income", &query.range).await? {
            if let Some(point) = weeks.get_mut(&week_start(date)) {
                point.income += total;
            }
        }
        for (date, total) in self.daily_totals("spending", &query.range).await? {
            if let Some(point) = weeks.get_mut(&week_start(date)) {
                point.spending += total;
            }
        }

        let points: Vec<TrendPoint> = weeks.into_values().collect();
        self.cache.set_weekly_trend(token, &query.range, &points);
        Ok(points)
    }
}
