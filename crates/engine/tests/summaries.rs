use engine::{
    ErrorKind, MoneyCents,
    commands::{
        AddIncome, AddSpending, GetBudgetSummary, GetStatementDay, GetStatementSummary,
        GetWeeklyTrend, SetStatementDay,
    },
};

mod common;
use common::{category, cents, date, engine, range};

#[tokio::test]
async fn budget_summary_breaks_spending_down_by_category() {
    let engine = engine().await;
    let rent = category(&engine, "Rent").await;
    let food = category(&engine, "Food").await;
    category(&engine, "Unused").await;

    engine
        .send(AddIncome::new(date(2024, 5, 1), cents(2_000_00)))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 3), cents(750_00), rent.id))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 4), cents(150_00), food.id))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 5), cents(100_00), food.id))
        .await
        .unwrap();
    // Outside the range.
    engine
        .send(AddSpending::new(date(2024, 6, 1), cents(1_00), food.id))
        .await
        .unwrap();

    let summary = engine
        .send(GetBudgetSummary {
            range: range(date(2024, 5, 1), date(2024, 5, 31)),
        })
        .await
        .unwrap();
    assert_eq!(summary.total_income, cents(2_000_00));
    assert_eq!(summary.total_spending, cents(1_000_00));
    assert_eq!(summary.net, cents(1_000_00));

    assert_eq!(summary.by_category.len(), 2);
    assert_eq!(summary.by_category[0].category_id, rent.id);
    assert_eq!(summary.by_category[0].share_bps, 7_500);
    assert_eq!(summary.by_category[1].name, "Food");
    assert_eq!(summary.by_category[1].total, cents(250_00));
}

#[tokio::test]
async fn empty_period_sums_to_zero() {
    let engine = engine().await;
    let summary = engine
        .send(GetBudgetSummary {
            range: range(date(2030, 1, 1), date(2030, 1, 31)),
        })
        .await
        .unwrap();
    assert_eq!(summary.total_income, MoneyCents::ZERO);
    assert_eq!(summary.net, MoneyCents::ZERO);
    assert!(summary.by_category.is_empty());
}

#[tokio::test]
async fn statement_summary_follows_the_anchor_day() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    assert_eq!(engine.send(GetStatementDay).await.unwrap(), 1);

    engine.send(SetStatementDay { day: 15 }).await.unwrap();
    assert_eq!(engine.send(GetStatementDay).await.unwrap(), 15);

    engine
        .send(AddIncome::new(date(2024, 4, 15), cents(500_00)))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 14), cents(20_00), food.id))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 15), cents(99_00), food.id))
        .await
        .unwrap();

    let summary = engine
        .send(GetStatementSummary {
            date: date(2024, 5, 10),
        })
        .await
        .unwrap();
    assert_eq!(summary.anchor_day, 15);
    assert_eq!(summary.period, range(date(2024, 4, 15), date(2024, 5, 14)));
    assert_eq!(summary.total_income, cents(500_00));
    assert_eq!(summary.total_spending, cents(20_00));
}

#[tokio::test]
async fn statement_day_outside_window_is_rejected() {
    let engine = engine().await;
    for day in [0, 29, 31] {
        let err = engine.send(SetStatementDay { day }).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.metadata.contains_key("day"));
    }
    assert_eq!(engine.send(GetStatementDay).await.unwrap(), 1);
}

#[tokio::test]
async fn weekly_trend_includes_empty_weeks() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    engine
        .send(AddIncome::new(date(2024, 5, 2), cents(100_00)))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 14), cents(30_00), food.id))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 19), cents(5_00), food.id))
        .await
        .unwrap();

    // Wednesday 1st to Monday 20th touches four weeks.
    let points = engine
        .send(GetWeeklyTrend {
            range: range(date(2024, 5, 1), date(2024, 5, 20)),
        })
        .await
        .unwrap();
    let weeks: Vec<_> = points.iter().map(|p| p.week_start).collect();
    assert_eq!(
        weeks,
        vec![
            date(2024, 4, 29),
            date(2024, 5, 6),
            date(2024, 5, 13),
            date(2024, 5, 20)
        ]
    );
    assert_eq!(points[0].income, cents(100_00));
    assert_eq!(points[1].income, MoneyCents::ZERO);
    assert_eq!(points[1].spending, MoneyCents::ZERO);
    assert_eq!(points[2].spending, cents(35_00));
    assert_eq!(points[3].spending, MoneyCents::ZERO);
}
