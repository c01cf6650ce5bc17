// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::{TransactionRow, category_names};
use crate::models::TransactionFilter;
use crate::repository::Repository;
use anyhow::{Context, Result, anyhow};

pub fn handle<R: Repository>(repo: &R, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(repo, sub),
        _ => Ok(()),
    }
}

fn export_transactions<R: Repository>(repo: &R, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();

    let names = category_names(repo)?;
    let mut rows: Vec<TransactionRow> = repo
        .list_transactions(&TransactionFilter::default())?
        .iter()
        .map(|t| TransactionRow::new(t, &names))
        .collect();
    // oldest first, the way a ledger file reads
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(["id", "date", "type", "category", "amount", "note", "created_at"])?;
            for r in &rows {
                wtr.write_record([
                    r.id.to_string(),
                    r.date.to_string(),
                    r.kind.to_string(),
                    r.category.clone(),
                    r.amount.to_string(),
                    r.note.clone(),
                    r.created_at.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
