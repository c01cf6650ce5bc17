// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use crate::models::{Kind, NewTransaction, Transaction, TransactionFilter};
use crate::repository::Repository;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<R: Repository>(repo: &mut R, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(repo, sub)?;
        }
        Some(("list", sub)) => list(repo, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            repo.delete_transaction(id)
                .with_context(|| format!("Remove transaction {}", id))?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add<R: Repository>(repo: &mut R, sub: &clap::ArgMatches) -> Result<Transaction> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let kind: Kind = sub.get_one::<String>("kind").unwrap().parse()?;
    let category_name = sub.get_one::<String>("category").unwrap();
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let category = repo
        .category_by_name(category_name)?
        .with_context(|| format!("Category '{}' not found", category_name))?;

    let t = repo
        .insert_transaction(NewTransaction {
            amount,
            kind,
            category_id: category.id,
            date,
            note,
        })
        .with_context(|| format!("Record {} of {} in '{}'", kind, amount, category.name))?;
    println!(
        "Recorded {} {} on {} in '{}' (id {})",
        kind,
        fmt_money(&t.amount),
        t.date,
        category.name,
        t.id
    );
    Ok(t)
}

fn list<R: Repository>(repo: &R, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(repo, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", rows_table(&data));
    }
    Ok(())
}

/// A transaction with its category resolved to a name, for display and export.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: Kind,
    pub category: String,
    pub amount: Decimal,
    pub note: String,
    pub created_at: NaiveDateTime,
}

impl TransactionRow {
    pub fn new(t: &Transaction, names: &HashMap<i64, String>) -> Self {
        Self {
            id: t.id,
            date: t.date,
            kind: t.kind,
            category: names
                .get(&t.category_id)
                .cloned()
                .unwrap_or_else(|| "(unknown)".into()),
            amount: t.amount,
            note: t.note.clone().unwrap_or_default(),
            created_at: t.created_at,
        }
    }
}

pub fn category_names<R: Repository>(repo: &R) -> Result<HashMap<i64, String>> {
    Ok(repo
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

pub fn rows_table(rows: &[TransactionRow]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date.to_string(),
                r.kind.to_string(),
                r.category.clone(),
                fmt_money(&r.amount),
                r.note.clone(),
            ]
        })
        .collect();
    pretty_table(&["ID", "Date", "Kind", "Category", "Amount", "Note"], data)
}

pub fn query_rows<R: Repository>(repo: &R, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut filter = TransactionFilter {
        limit: sub.get_one::<usize>("limit").copied(),
        ..Default::default()
    };
    if let Some(month) = sub.get_one::<String>("month") {
        filter.month = Some(parse_month(month)?);
    }
    if let Some(kind) = sub.get_one::<String>("kind") {
        filter.kind = Some(kind.parse()?);
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        let category = repo
            .category_by_name(cat)?
            .ok_or_else(|| anyhow!("Category '{}' not found", cat))?;
        filter.category_id = Some(category.id);
    }

    let names = category_names(repo)?;
    Ok(repo
        .list_transactions(&filter)?
        .iter()
        .map(|t| TransactionRow::new(t, &names))
        .collect())
}
