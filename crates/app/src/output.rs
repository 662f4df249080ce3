//! Plain-text rendering of engine results.

use engine::{
    BudgetSummary, Category, CategoryTotal, EngineError, Income, Spending, StatementSummary,
    TrendPoint,
};

pub fn print_error(err: &EngineError) {
    eprintln!("{} error[{}]: {}", err.kind.as_str(), err.code, err.message);
    for (key, value) in &err.metadata {
        eprintln!("  {key}: {value}");
    }
}

pub fn print_income(items: &[Income]) {
    if items.is_empty() {
        println!("no income entries");
        return;
    }
    for income in items {
        println!(
            "{}  {:>12}  {}  {}",
            income.date,
            income.amount,
            income.id,
            income.description.as_deref().unwrap_or("")
        );
    }
}

pub fn print_spending(items: &[Spending]) {
    if items.is_empty() {
        println!("no spending entries");
        return;
    }
    for spending in items {
        println!(
            "{}  {:>12}  {}  category={}  {}",
            spending.date,
            spending.amount,
            spending.id,
            spending.category_id,
            spending.description.as_deref().unwrap_or("")
        );
    }
}

pub fn print_categories(items: &[Category]) {
    for category in items {
        let state = if category.is_active { "" } else { " (inactive)" };
        println!(
            "{:>3}  {}  {}{state}",
            category.display_order, category.id, category.name
        );
    }
}

fn print_breakdown(rows: &[CategoryTotal]) {
    for row in rows {
        println!(
            "  {:<24} {:>12}  {:>3}.{:02}%",
            row.name,
            row.total,
            row.share_bps / 100,
            row.share_bps % 100
        );
    }
}

pub fn print_budget(summary: &BudgetSummary) {
    println!("period   {}", summary.range);
    println!("income   {:>12}", summary.total_income);
    println!("spending {:>12}", summary.total_spending);
    println!("net      {:>12}", summary.net);
    print_breakdown(&summary.by_category);
}

pub fn print_statement(summary: &StatementSummary) {
    println!(
        "statement {} (anchor day {})",
        summary.period, summary.anchor_day
    );
    println!("income   {:>12}", summary.total_income);
    println!("spending {:>12}", summary.total_spending);
    println!("net      {:>12}", summary.net);
    print_breakdown(&summary.by_category);
}

pub fn print_trend(points: &[TrendPoint]) {
    for point in points {
        println!(
            "week of {}  income {:>12}  spending {:>12}",
            point.week_start, point.income, point.spending
        );
    }
}
