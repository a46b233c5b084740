//! Integration tests for line items, allocations, actuals and rates.
//!
//! Run with `cargo test -- --ignored` against a Postgres database.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use budgetrack_core::actuals::{ActualStore, ActualsApplier, NewActual};
use budgetrack_core::budget::{
    BudgetError, LineItemStore, MonthlyBudgetAggregator, NewLineItem, VarianceCalculator,
    VarianceStatus, sum_allocations,
};
use budgetrack_core::currency::{CurrencyConverter, ExchangeRate};
use budgetrack_core::fiscal::{FiscalYear, Month};
use budgetrack_db::entities::actuals;
use budgetrack_db::{ActualRepository, CurrencyRateRepository, LineItemRepository};
use budgetrack_shared::types::{CurrencyCode, MAX_AMOUNT};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{create_line_item, setup};

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_new_line_item_has_twelve_empty_months() {
    let db = setup().await;
    let id = create_line_item(&db).await;
    let repo = LineItemRepository::new(db);

    let allocations = repo.list_allocations(id).await.unwrap();

    assert_eq!(allocations.len(), 12);
    assert_eq!(allocations[0].month, Month::Apr);
    assert!(allocations.iter().all(|a| a.amount.is_none()));
    let item = repo.find_line_item(id).await.unwrap().unwrap();
    assert_eq!(item.total_budget, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_duplicate_uid_is_rejected() {
    let db = setup().await;
    let id = create_line_item(&db).await;
    let repo = LineItemRepository::new(db);
    let existing = repo.find_line_item(id).await.unwrap().unwrap();

    let err = repo
        .create_line_item(NewLineItem {
            uid: existing.uid.clone(),
            description: "Again".to_string(),
            fiscal_year: FiscalYear(2026),
            tower_id: existing.tower_id,
            budget_head_id: existing.budget_head_id,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BudgetError::DuplicateUid(uid) if uid == existing.uid));
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_upsert_keeps_total_equal_to_month_sum() {
    let db = setup().await;
    let id = create_line_item(&db).await;
    let repo = Arc::new(LineItemRepository::new(db));
    let aggregator = MonthlyBudgetAggregator::new(Arc::clone(&repo));

    aggregator
        .upsert_months(id, vec![(Month::Apr, dec!(100)), (Month::May, dec!(50.25))])
        .await
        .unwrap();
    let total = aggregator
        .upsert_months(id, vec![(Month::Apr, dec!(10))])
        .await
        .unwrap();

    assert_eq!(total, dec!(60.25));
    let item = repo.find_line_item(id).await.unwrap().unwrap();
    assert_eq!(item.total_budget, dec!(60.25));

    let rows = repo.list_export_rows(Some(FiscalYear(2026))).await.unwrap();
    let row = rows.iter().find(|r| r.uid == item.uid).unwrap();
    assert_eq!(row.allocations.len(), 12);
    assert_eq!(row.allocations[0], (Month::Apr, Some(dec!(10))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a running Postgres database"]
async fn test_concurrent_upserts_leave_total_equal_to_month_sum() {
    let db = setup().await;
    let id = create_line_item(&db).await;
    let repo = Arc::new(LineItemRepository::new(db));
    let aggregator = MonthlyBudgetAggregator::new(Arc::clone(&repo));

    let (apr, may, jun, apr_again) = tokio::join!(
        aggregator.upsert_months(id, vec![(Month::Apr, dec!(100))]),
        aggregator.upsert_months(id, vec![(Month::May, dec!(200))]),
        aggregator.upsert_months(id, vec![(Month::Jun, dec!(300))]),
        aggregator.upsert_months(id, vec![(Month::Apr, dec!(100)), (Month::Jul, dec!(400))]),
    );
    for result in [apr, may, jun, apr_again] {
        result.unwrap();
    }

    let item = repo.find_line_item(id).await.unwrap().unwrap();
    let allocations = repo.list_allocations(id).await.unwrap();
    assert_eq!(item.total_budget, sum_allocations(&allocations).unwrap());
    assert_eq!(item.total_budget, dec!(1000));
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_total_beyond_column_range_rolls_back_allocations() {
    let db = setup().await;
    let id = create_line_item(&db).await;
    let repo = Arc::new(LineItemRepository::new(db));
    let aggregator = MonthlyBudgetAggregator::new(Arc::clone(&repo));
    aggregator
        .upsert_months(id, vec![(Month::Apr, MAX_AMOUNT)])
        .await
        .unwrap();

    let err = aggregator
        .upsert_months(id, vec![(Month::May, dec!(1))])
        .await
        .unwrap_err();

    assert!(matches!(err, BudgetError::TotalOutOfRange));
    let allocations = repo.list_allocations(id).await.unwrap();
    let may = allocations.iter().find(|a| a.month == Month::May).unwrap();
    assert_eq!(may.amount, None);
    let item = repo.find_line_item(id).await.unwrap().unwrap();
    assert_eq!(item.total_budget, MAX_AMOUNT);
}

fn new_actual(invoice_no: &str, amount: Decimal) -> NewActual {
    NewActual {
        invoice_no: invoice_no.to_string(),
        invoice_date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        vendor: None,
        description: None,
        amount,
        currency: CurrencyCode::parse("INR").unwrap(),
        converted_amount: None,
        month: Month::Jun,
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_actuals_batch_is_all_or_nothing() {
    let db = setup().await;
    let repo = ActualRepository::new(db.clone());
    let first = common::unique("INV");
    let oversized = common::unique("INV");
    let last = common::unique("INV");

    let result = repo
        .insert_actuals(vec![
            new_actual(&first, dec!(10)),
            new_actual(&oversized, dec!(10000000000000000)),
            new_actual(&last, dec!(30)),
        ])
        .await;

    assert!(result.is_err());
    let stored = actuals::Entity::find()
        .filter(actuals::Column::InvoiceNo.is_in([first, oversized, last]))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_imported_actual_applies_and_shows_in_variance() {
    let db = setup().await;
    let id = create_line_item(&db).await;
    let items = Arc::new(LineItemRepository::new(db.clone()));
    let actuals = Arc::new(ActualRepository::new(db));

    MonthlyBudgetAggregator::new(Arc::clone(&items))
        .upsert_months(id, vec![(Month::Apr, dec!(1000))])
        .await
        .unwrap();

    let inserted = actuals
        .insert_actuals(vec![NewActual {
            vendor: Some("Acme".to_string()),
            ..new_actual(&common::unique("INV"), dec!(1200))
        }])
        .await
        .unwrap();

    let applied = ActualsApplier::new(Arc::clone(&actuals))
        .apply(inserted[0].id, Some(id))
        .await
        .unwrap();
    assert_eq!(applied.line_item_id, Some(id));
    assert_eq!(applied.month, Some(Month::Jun));

    let report = VarianceCalculator::new(items).variance(id).await.unwrap();
    assert_eq!(report.total_actuals, dec!(1200));
    assert_eq!(report.variance, dec!(-200));
    assert_eq!(report.status, VarianceStatus::Unfavorable);
}

#[tokio::test]
#[ignore = "requires a running Postgres database"]
async fn test_latest_rate_on_or_before_date() {
    let db = setup().await;
    let converter = CurrencyConverter::new(Arc::new(CurrencyRateRepository::new(db)));
    let from = CurrencyCode::parse("SGD").unwrap();
    let to = CurrencyCode::parse("INR").unwrap();

    for (day, rate) in [(1, dec!(61)), (20, dec!(62))] {
        converter
            .upsert_rate(ExchangeRate::new(
                from.clone(),
                to.clone(),
                rate,
                NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            ))
            .await
            .unwrap();
    }

    let conversion = converter
        .convert(dec!(2), &from, &to, NaiveDate::from_ymd_opt(2020, 1, 10))
        .await
        .unwrap();
    assert_eq!(conversion.rate, dec!(61));
    assert_eq!(conversion.converted_amount, dec!(122));
}
