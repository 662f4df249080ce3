use std::collections::HashSet;

use engine::{
    ErrorKind,
    commands::{
        AddSpending, DeleteSpending, DeleteSpendingByCategory, DeleteSpendingInRange, GetSpending,
        GetSpendingById, ListSpendingPage, UpdateCategory, UpdateSpending,
    },
};
use uuid::Uuid;

mod common;
use common::{category, cents, date, engine, range};

#[tokio::test]
async fn spending_requires_an_existing_category() {
    let engine = engine().await;
    let missing = Uuid::new_v4();

    let err = engine
        .send(AddSpending::new(date(2024, 5, 1), cents(5_00), missing))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.code, "Spending.CategoryNotFound");
    assert_eq!(err.metadata.get("category_id"), Some(&missing.to_string()));
}

#[tokio::test]
async fn inactive_category_rejects_new_spending() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    engine
        .send(UpdateCategory {
            id: food.id,
            name: food.name.clone(),
            display_order: food.display_order,
            is_active: false,
        })
        .await
        .unwrap();

    let err = engine
        .send(AddSpending::new(date(2024, 5, 1), cents(5_00), food.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Business);
    assert_eq!(err.code, "Spending.CategoryInactive");
}

#[tokio::test]
async fn field_errors_win_over_category_lookup() {
    let engine = engine().await;
    let err = engine
        .send(AddSpending::new(date(2024, 5, 1), cents(-1), Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.code, "Validation.Failed");
    assert!(err.metadata.contains_key("amount"));
}

#[tokio::test]
async fn list_filters_by_category() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    let rent = category(&engine, "Rent").await;
    engine
        .send(AddSpending::new(date(2024, 5, 1), cents(12_50), food.id).description("lunch"))
        .await
        .unwrap();
    engine
        .send(AddSpending::new(date(2024, 5, 2), cents(800_00), rent.id))
        .await
        .unwrap();

    let may = range(date(2024, 5, 1), date(2024, 5, 31));
    let all = engine
        .send(GetSpending {
            range: may,
            category_id: None,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].category_id, rent.id);

    let food_only = engine
        .send(GetSpending {
            range: may,
            category_id: Some(food.id),
        })
        .await
        .unwrap();
    assert_eq!(food_only.len(), 1);
    assert_eq!(food_only[0].description.as_deref(), Some("lunch"));
}

#[tokio::test]
async fn update_can_move_spending_to_another_category() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    let fun = category(&engine, "Fun").await;
    let spending = engine
        .send(AddSpending::new(date(2024, 5, 1), cents(9_99), food.id))
        .await
        .unwrap();

    engine
        .send(UpdateSpending {
            id: spending.id,
            date: spending.date,
            amount: cents(19_99),
            description: None,
            category_id: fun.id,
        })
        .await
        .unwrap();

    let stored = engine
        .send(GetSpendingById { id: spending.id })
        .await
        .unwrap();
    assert_eq!(stored.category_id, fun.id);
    assert_eq!(stored.amount, cents(19_99));
}

#[tokio::test]
async fn delete_missing_spending_is_not_found() {
    let engine = engine().await;
    let err = engine
        .send(DeleteSpending { id: Uuid::new_v4() })
        .await
        .unwrap_err();
    assert_eq!(err.code, "Spending.NotFound");
}

#[tokio::test]
async fn range_and_category_deletes_count_rows() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    let rent = category(&engine, "Rent").await;
    for day in 1..=4 {
        engine
            .send(AddSpending::new(date(2024, 5, day), cents(1_00), food.id))
            .await
            .unwrap();
        engine
            .send(AddSpending::new(date(2024, 5, day), cents(2_00), rent.id))
            .await
            .unwrap();
    }

    let deleted = engine
        .send(DeleteSpendingInRange {
            range: range(date(2024, 5, 1), date(2024, 5, 2)),
            category_id: Some(food.id),
        })
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let deleted = engine
        .send(DeleteSpendingByCategory {
            category_id: rent.id,
        })
        .await
        .unwrap();
    assert_eq!(deleted, 4);

    let left = engine
        .send(GetSpending {
            range: range(date(2024, 5, 1), date(2024, 5, 31)),
            category_id: None,
        })
        .await
        .unwrap();
    assert_eq!(left.len(), 2);
    assert!(left.iter().all(|s| s.category_id == food.id));
}

#[tokio::test]
async fn pages_walk_every_entry_once() {
    let engine = engine().await;
    let food = category(&engine, "Food").await;
    for day in 1..=7 {
        engine
            .send(AddSpending::new(date(2024, 5, day), cents(1_00), food.id))
            .await
            .unwrap();
    }

    let may = range(date(2024, 5, 1), date(2024, 5, 31));
    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = engine
            .send(ListSpendingPage {
                range: may,
                category_id: None,
                limit: 3,
                cursor: cursor.take(),
            })
            .await
            .unwrap();
        assert!(page.items.len() <= 3);
        seen.extend(page.items.iter().map(|s| (s.id, s.date)));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen.len(), 7);
    let unique: HashSet<_> = seen.iter().map(|(id, _)| *id).collect();
    assert_eq!(unique.len(), 7);
    assert_eq!(seen.first().map(|(_, d)| *d), Some(date(2024, 5, 7)));
    assert_eq!(seen.last().map(|(_, d)| *d), Some(date(2024, 5, 1)));
}

#[tokio::test]
async fn over_long_range_fails_alike_for_list_page_and_delete() {
    let engine = engine().await;
    let decade = engine::DateRange {
        start: date(2015, 1, 1),
        end: date(2024, 12, 31),
    };

    let list = engine
        .send(GetSpending {
            range: decade,
            category_id: None,
        })
        .await
        .unwrap_err();
    let page = engine
        .send(ListSpendingPage {
            range: decade,
            category_id: None,
            limit: 10,
            cursor: None,
        })
        .await
        .unwrap_err();
    let delete = engine
        .send(DeleteSpendingInRange {
            range: decade,
            category_id: None,
        })
        .await
        .unwrap_err();

    for err in [&list, &page, &delete] {
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.code, "DateRange.TooLong");
    }
}

#[tokio::test]
async fn page_rejects_bad_limit_and_cursor() {
    let engine = engine().await;
    let may = range(date(2024, 5, 1), date(2024, 5, 31));

    let err = engine
        .send(ListSpendingPage {
            range: may,
            category_id: None,
            limit: 0,
            cursor: None,
        })
        .await
        .unwrap_err();
    assert!(err.metadata.contains_key("limit"));

    let err = engine
        .send(ListSpendingPage {
            range: may,
            category_id: None,
            limit: 10,
            cursor: Some("garbage".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, "Spending.InvalidCursor");
}
