// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure month bucketing and totals. Nothing here touches storage or fails.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{CategoryTotal, Kind, MonthlySummary, Summary, Transaction};

pub type Grouped = BTreeMap<String, Vec<Transaction>>;

/// "YYYY-MM" for a date; the first seven characters of its "YYYY-MM-DD" form.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Buckets transactions by month. Inside a bucket the most recently entered
/// transaction comes first, regardless of its nominal date.
pub fn group_by_month(transactions: &[Transaction]) -> Grouped {
    let mut grouped: Grouped = BTreeMap::new();
    for t in transactions {
        grouped.entry(t.month()).or_default().push(t.clone());
    }
    for bucket in grouped.values_mut() {
        bucket.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
    }
    grouped
}

/// Totals clamp at the bounds of `Decimal` instead of overflowing.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    for t in transactions {
        match t.kind {
            Kind::Income => total_income = total_income.saturating_add(t.amount),
            Kind::Expense => total_expense = total_expense.saturating_add(t.amount),
        }
    }
    Summary {
        total_income,
        total_expense,
        net_balance: total_income.saturating_sub(total_expense),
    }
}

/// Like [`summarize`], but `None` when a total does not fit in a `Decimal`.
pub fn checked_summarize(transactions: &[Transaction]) -> Option<Summary> {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    for t in transactions {
        match t.kind {
            Kind::Income => total_income = total_income.checked_add(t.amount)?,
            Kind::Expense => total_expense = total_expense.checked_add(t.amount)?,
        }
    }
    Some(Summary {
        total_income,
        total_expense,
        net_balance: total_income.checked_sub(total_expense)?,
    })
}

/// Month keys, most recent first. Lexical order works because keys are zero padded.
pub fn list_months(grouped: &Grouped) -> Vec<String> {
    let mut months: Vec<String> = grouped.keys().cloned().collect();
    months.sort_by(|a, b| b.cmp(a));
    months
}

/// Summary for one month; a month with no transactions gives zeros.
pub fn summary_for_month(grouped: &Grouped, month: &str) -> MonthlySummary {
    let summary = grouped
        .get(month)
        .map(|bucket| summarize(bucket))
        .unwrap_or_default();
    MonthlySummary {
        month: month.to_string(),
        summary,
    }
}

/// One summary per month that has transactions, most recent first.
pub fn monthly_summaries(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let grouped = group_by_month(transactions);
    list_months(&grouped)
        .into_iter()
        .map(|m| summary_for_month(&grouped, &m))
        .collect()
}

/// [`monthly_summaries`] for storage: `None` if any month's totals overflow.
pub fn checked_monthly_summaries(transactions: &[Transaction]) -> Option<Vec<MonthlySummary>> {
    let grouped = group_by_month(transactions);
    list_months(&grouped)
        .into_iter()
        .map(|month| {
            let summary = checked_summarize(&grouped[&month])?;
            Some(MonthlySummary { month, summary })
        })
        .collect()
}

/// Per-category totals, largest first; ties fall back to category id.
pub fn by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut agg: HashMap<i64, CategoryTotal> = HashMap::new();
    for t in transactions {
        let entry = agg.entry(t.category_id).or_insert(CategoryTotal {
            category_id: t.category_id,
            kind: t.kind,
            total: Decimal::ZERO,
            count: 0,
        });
        entry.total = entry.total.saturating_add(t.amount);
        entry.count += 1;
    }
    let mut items: Vec<CategoryTotal> = agg.into_values().collect();
    items.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn tx(id: i64, kind: Kind, amount: i64, date: &str, created: &str) -> Transaction {
        Transaction {
            id,
            amount: Decimal::from(amount),
            kind,
            category_id: if kind == Kind::Income { 1 } else { 2 },
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            note: None,
            created_at: NaiveDateTime::parse_from_str(created, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(summarize(&[]), Summary::default());
        assert_eq!(Summary::default().net_balance, Decimal::ZERO);
    }

    #[test]
    fn rent_and_salary_month() {
        let txs = vec![
            tx(1, Kind::Expense, 300, "2025-02-05", "2025-02-05 10:00:00"),
            tx(2, Kind::Income, 1500, "2025-02-01", "2025-02-05 10:01:00"),
        ];
        let grouped = group_by_month(&txs);
        let s = summary_for_month(&grouped, "2025-02").summary;
        assert_eq!(s.total_income, Decimal::from(1500));
        assert_eq!(s.total_expense, Decimal::from(300));
        assert_eq!(s.net_balance, Decimal::from(1200));
    }

    #[test]
    fn net_balance_is_exact_for_fractional_amounts() {
        let mut a = tx(1, Kind::Income, 0, "2025-01-01", "2025-01-01 00:00:00");
        a.amount = "0.1".parse().unwrap();
        let mut b = tx(2, Kind::Income, 0, "2025-01-01", "2025-01-01 00:00:01");
        b.amount = "0.2".parse().unwrap();
        let mut c = tx(3, Kind::Expense, 0, "2025-01-02", "2025-01-01 00:00:02");
        c.amount = "0.3".parse().unwrap();
        let s = summarize(&[a, b, c]);
        assert_eq!(s.net_balance, Decimal::ZERO);
        assert_eq!(s.total_income - s.total_expense, s.net_balance);
    }

    #[test]
    fn grouping_partitions_and_orders_by_entry_time() {
        let txs = vec![
            tx(1, Kind::Expense, 10, "2025-01-31", "2025-02-01 09:00:00"),
            tx(2, Kind::Expense, 20, "2025-01-15", "2025-02-01 09:00:00"),
            tx(3, Kind::Income, 30, "2025-02-01", "2025-02-01 08:00:00"),
            tx(4, Kind::Expense, 40, "2025-01-15", "2025-02-02 09:00:00"),
        ];
        let grouped = group_by_month(&txs);
        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, txs.len());

        let jan: Vec<i64> = grouped["2025-01"].iter().map(|t| t.id).collect();
        // newest entry first; same timestamp falls back to later id first
        assert_eq!(jan, vec![4, 2, 1]);
        assert_eq!(grouped["2025-02"].len(), 1);
        for (month, bucket) in &grouped {
            assert!(bucket.iter().all(|t| &t.date.to_string()[..7] == month.as_str()));
        }
    }

    #[test]
    fn months_sorted_most_recent_first() {
        let txs = vec![
            tx(1, Kind::Expense, 1, "2024-12-01", "2025-01-01 00:00:00"),
            tx(2, Kind::Expense, 1, "2025-10-01", "2025-01-01 00:00:00"),
            tx(3, Kind::Expense, 1, "2025-02-01", "2025-01-01 00:00:00"),
        ];
        let months = list_months(&group_by_month(&txs));
        assert_eq!(months, vec!["2025-10", "2025-02", "2024-12"]);
        let summaries = monthly_summaries(&txs);
        assert_eq!(summaries[0].month, "2025-10");
        assert_eq!(summaries[2].summary.total_expense, Decimal::ONE);
    }

    #[test]
    fn missing_month_is_zero() {
        let s = summary_for_month(&Grouped::new(), "2030-01");
        assert_eq!(s.month, "2030-01");
        assert_eq!(s.summary, Summary::default());
    }

    #[test]
    fn totals_past_decimal_max_clamp_or_report() {
        let mut a = tx(1, Kind::Income, 0, "2025-01-01", "2025-01-01 00:00:00");
        a.amount = Decimal::MAX;
        let mut b = tx(2, Kind::Income, 0, "2025-01-02", "2025-01-01 00:00:01");
        b.amount = Decimal::ONE;
        let txs = vec![a, b];

        assert_eq!(summarize(&txs).total_income, Decimal::MAX);
        assert_eq!(by_category(&txs)[0].total, Decimal::MAX);
        assert_eq!(checked_summarize(&txs), None);
        assert_eq!(checked_monthly_summaries(&txs), None);
        assert_eq!(
            checked_monthly_summaries(&txs[1..]),
            Some(monthly_summaries(&txs[1..]))
        );
    }

    #[test]
    fn category_totals_largest_first() {
        let txs = vec![
            tx(1, Kind::Expense, 10, "2025-01-01", "2025-01-01 00:00:00"),
            tx(2, Kind::Expense, 15, "2025-01-02", "2025-01-01 00:00:01"),
            tx(3, Kind::Income, 100, "2025-01-03", "2025-01-01 00:00:02"),
        ];
        let totals = by_category(&txs);
        assert_eq!(totals[0].category_id, 1);
        assert_eq!(totals[1].total, Decimal::from(25));
        assert_eq!(totals[1].count, 2);
    }
}
