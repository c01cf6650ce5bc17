// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate;
use crate::commands::transactions::{TransactionRow, category_names, rows_table};
use crate::models::{Kind, MonthlySummary, TransactionFilter};
use crate::repository::Repository;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<R: Repository>(repo: &R, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("months", sub)) => {
            let data = months(repo)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                println!("{}", summaries_table(&data));
            }
        }
        Some(("month", sub)) => {
            let month = parse_month(sub.get_one::<String>("month").unwrap())?;
            let report = month_report(repo, &month)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
                print_month_report(&report);
            }
        }
        Some(("cached", sub)) => {
            let data = repo.list_monthly_summaries()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                println!("{}", summaries_table(&data));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Summaries computed from the current transactions, most recent month first.
pub fn months<R: Repository>(repo: &R) -> Result<Vec<MonthlySummary>> {
    let all = repo.list_transactions(&TransactionFilter::default())?;
    Ok(aggregate::monthly_summaries(&all))
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub kind: Kind,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    #[serde(flatten)]
    pub summary: MonthlySummary,
    pub transactions: Vec<TransactionRow>,
    pub categories: Vec<CategoryRow>,
}

pub fn month_report<R: Repository>(repo: &R, month: &str) -> Result<MonthReport> {
    let all = repo.list_transactions(&TransactionFilter::default())?;
    let grouped = aggregate::group_by_month(&all);
    let summary = aggregate::summary_for_month(&grouped, month);
    let entries = grouped.get(month).map(Vec::as_slice).unwrap_or_default();

    let names = category_names(repo)?;
    let transactions = entries
        .iter()
        .map(|t| TransactionRow::new(t, &names))
        .collect();
    let categories = aggregate::by_category(entries)
        .into_iter()
        .map(|c| CategoryRow {
            category: names
                .get(&c.category_id)
                .cloned()
                .unwrap_or_else(|| "(unknown)".into()),
            kind: c.kind,
            total: c.total,
            count: c.count,
        })
        .collect();

    Ok(MonthReport {
        summary,
        transactions,
        categories,
    })
}

fn summaries_table(data: &[MonthlySummary]) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|s| {
            vec![
                s.month.clone(),
                fmt_money(&s.summary.total_income),
                fmt_money(&s.summary.total_expense),
                fmt_money(&s.summary.net_balance),
            ]
        })
        .collect();
    pretty_table(&["Month", "Income", "Expense", "Net Balance"], rows)
}

fn print_month_report(report: &MonthReport) {
    println!("{}", summaries_table(std::slice::from_ref(&report.summary)));
    if report.transactions.is_empty() {
        println!("No transactions for this month.");
        return;
    }
    println!("{}", rows_table(&report.transactions));
    let rows = report
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                c.kind.to_string(),
                c.count.to_string(),
                fmt_money(&c.total),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Kind", "Entries", "Total"], rows)
    );
}
