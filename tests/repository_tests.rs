// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ledge::aggregate;
use ledge::db;
use ledge::models::{Kind, NewCategory, NewTransaction, TransactionFilter};
use ledge::repository::{Repository, SqliteRepository};
use ledge::LedgerError;
use rust_decimal::Decimal;

fn setup() -> SqliteRepository {
    let mut repo = SqliteRepository::new(db::open_in_memory().unwrap());
    repo.insert_categories(&[
        NewCategory::new("Salary", Kind::Income),
        NewCategory::new("Rent", Kind::Expense),
        NewCategory::new("Groceries", Kind::Expense),
    ])
    .unwrap();
    repo
}

fn new_tx(repo: &SqliteRepository, category: &str, kind: Kind, amount: &str, date: &str) -> NewTransaction {
    let category = repo.category_by_name(category).unwrap().unwrap();
    NewTransaction {
        amount: amount.parse().unwrap(),
        kind,
        category_id: category.id,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        note: None,
    }
}

#[test]
fn rent_and_salary_summarize_to_1200() {
    let mut repo = setup();
    let rent = new_tx(&repo, "Rent", Kind::Expense, "300", "2025-02-05");
    let salary = new_tx(&repo, "Salary", Kind::Income, "1500", "2025-02-01");
    repo.insert_transaction(rent).unwrap();
    repo.insert_transaction(salary).unwrap();

    let all = repo.list_transactions(&TransactionFilter::default()).unwrap();
    let grouped = aggregate::group_by_month(&all);
    let s = aggregate::summary_for_month(&grouped, "2025-02").summary;
    assert_eq!(s.total_income, Decimal::from(1500));
    assert_eq!(s.total_expense, Decimal::from(300));
    assert_eq!(s.net_balance, Decimal::from(1200));
}

#[test]
fn deleted_transaction_leaves_lists_and_summaries() {
    let mut repo = setup();
    let keep = repo
        .insert_transaction(new_tx(&repo, "Salary", Kind::Income, "1500", "2025-02-01"))
        .unwrap();
    let gone = repo
        .insert_transaction(new_tx(&repo, "Rent", Kind::Expense, "300", "2025-02-05"))
        .unwrap();

    repo.delete_transaction(gone.id).unwrap();

    let all = repo.list_transactions(&TransactionFilter::default()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, keep.id);
    assert!(all.iter().all(|t| t.id != gone.id));

    let s = aggregate::summarize(&all);
    assert_eq!(s.total_expense, Decimal::ZERO);
    assert_eq!(s.net_balance, Decimal::from(1500));

    let cached = repo.list_monthly_summaries().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].summary, s);
}

#[test]
fn deleting_unknown_id_is_not_found() {
    let mut repo = setup();
    assert!(matches!(
        repo.delete_transaction(42),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn missing_category_is_constraint_violation_and_persists_nothing() {
    let mut repo = setup();
    let t = NewTransaction {
        amount: Decimal::from(10),
        kind: Kind::Expense,
        category_id: 999,
        date: NaiveDate::from_ymd_opt(2025, 2, 5).unwrap(),
        note: None,
    };
    let err = repo.insert_transaction(t).unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation(_)), "{err:?}");
    assert_eq!(repo.count_transactions().unwrap(), 0);
    assert!(repo.list_monthly_summaries().unwrap().is_empty());
}

#[test]
fn kind_must_match_category() {
    let mut repo = setup();
    let t = new_tx(&repo, "Rent", Kind::Income, "10", "2025-02-05");
    assert!(matches!(
        repo.insert_transaction(t),
        Err(LedgerError::ConstraintViolation(_))
    ));
    assert_eq!(repo.count_transactions().unwrap(), 0);
}

#[test]
fn negative_amount_is_rejected() {
    let mut repo = setup();
    let t = new_tx(&repo, "Rent", Kind::Expense, "-10", "2025-02-05");
    assert!(matches!(
        repo.insert_transaction(t),
        Err(LedgerError::InvalidInput(_))
    ));
}

#[test]
fn batch_insert_is_all_or_nothing() {
    let mut repo = setup();
    let good = new_tx(&repo, "Rent", Kind::Expense, "10", "2025-02-05");
    let mut bad = good.clone();
    bad.category_id = 999;
    assert!(repo.insert_transactions(&[good, bad]).is_err());
    assert_eq!(repo.count_transactions().unwrap(), 0);
}

#[test]
fn duplicate_category_name_rolls_back_whole_batch() {
    let mut repo = setup();
    let err = repo
        .insert_categories(&[
            NewCategory::new("Pets", Kind::Expense),
            NewCategory::new("Salary", Kind::Expense),
        ])
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation(_)), "{err:?}");
    assert!(repo.category_by_name("Pets").unwrap().is_none());
    assert_eq!(repo.count_categories().unwrap(), 3);
}

#[test]
fn same_day_entries_list_newest_first() {
    let mut repo = setup();
    let first = repo
        .insert_transaction(new_tx(&repo, "Groceries", Kind::Expense, "5", "2025-03-10"))
        .unwrap();
    let second = repo
        .insert_transaction(new_tx(&repo, "Groceries", Kind::Expense, "7", "2025-03-10"))
        .unwrap();
    // older nominal date, entered last
    let third = repo
        .insert_transaction(new_tx(&repo, "Rent", Kind::Expense, "900", "2025-03-01"))
        .unwrap();

    let all = repo.list_transactions(&TransactionFilter::default()).unwrap();
    let grouped = aggregate::group_by_month(&all);
    let ids: Vec<i64> = grouped["2025-03"].iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[test]
fn filters_by_month_kind_and_limit() {
    let mut repo = setup();
    repo.insert_transaction(new_tx(&repo, "Salary", Kind::Income, "1500", "2025-01-01"))
        .unwrap();
    repo.insert_transaction(new_tx(&repo, "Rent", Kind::Expense, "300", "2025-02-05"))
        .unwrap();
    repo.insert_transaction(new_tx(&repo, "Groceries", Kind::Expense, "40", "2025-02-06"))
        .unwrap();

    let feb = repo
        .list_transactions(&TransactionFilter {
            month: Some("2025-02".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(feb.len(), 2);

    let income = repo
        .list_transactions(&TransactionFilter {
            kind: Some(Kind::Income),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].month(), "2025-01");

    let limited = repo
        .list_transactions(&TransactionFilter {
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].amount, Decimal::from(40));
}

#[test]
fn materialized_summaries_match_on_demand() {
    let mut repo = setup();
    repo.insert_transaction(new_tx(&repo, "Salary", Kind::Income, "1500.10", "2025-01-01"))
        .unwrap();
    repo.insert_transaction(new_tx(&repo, "Rent", Kind::Expense, "300.05", "2025-01-05"))
        .unwrap();
    let t = repo
        .insert_transaction(new_tx(&repo, "Groceries", Kind::Expense, "12.5", "2025-03-02"))
        .unwrap();

    let all = repo.list_transactions(&TransactionFilter::default()).unwrap();
    assert_eq!(
        repo.list_monthly_summaries().unwrap(),
        aggregate::monthly_summaries(&all)
    );

    repo.delete_transaction(t.id).unwrap();
    let cached = repo.list_monthly_summaries().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].month, "2025-01");
    assert_eq!(cached[0].summary.net_balance, "1200.05".parse::<Decimal>().unwrap());
}

#[test]
fn notes_and_dates_survive_storage() {
    let mut repo = setup();
    let mut t = new_tx(&repo, "Rent", Kind::Expense, "300", "2024-12-31");
    t.note = Some("December rent".into());
    let stored = repo.insert_transaction(t).unwrap();
    assert_eq!(stored.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    assert_eq!(stored.note.as_deref(), Some("December rent"));
    assert_eq!(stored.month(), "2024-12");
}

#[test]
fn month_totals_past_decimal_range_are_rejected() {
    let mut repo = setup();
    let big = "50000000000000000000000000000";
    repo.insert_transaction(new_tx(&repo, "Salary", Kind::Income, big, "2025-04-01"))
        .unwrap();
    let err = repo
        .insert_transaction(new_tx(&repo, "Salary", Kind::Income, big, "2025-04-02"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)), "{err:?}");
    assert_eq!(repo.count_transactions().unwrap(), 1);

    // a different month has its own totals
    repo.insert_transaction(new_tx(&repo, "Salary", Kind::Income, big, "2025-05-01"))
        .unwrap();
    let cached = repo.list_monthly_summaries().unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[1].summary.total_income, big.parse::<Decimal>().unwrap());
}
