// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};

use crate::aggregate;
use crate::models::TransactionFilter;
use crate::repository::Repository;
use crate::utils::pretty_table;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle<R: Repository>(repo: &R) -> Result<()> {
    let issues = find_issues(repo)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn find_issues<R: Repository>(repo: &R) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    let categories: HashMap<i64, _> = repo
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let all = repo.list_transactions(&TransactionFilter::default())?;

    // 1) Transactions whose kind disagrees with their category, or whose category is gone
    for t in &all {
        match categories.get(&t.category_id) {
            None => issues.push(Issue {
                kind: "missing_category",
                detail: format!("transaction {} -> category {}", t.id, t.category_id),
            }),
            Some(c) if c.kind != t.kind => issues.push(Issue {
                kind: "kind_mismatch",
                detail: format!(
                    "transaction {} is {} but '{}' is {}",
                    t.id, t.kind, c.name, c.kind
                ),
            }),
            Some(_) => {}
        }
    }

    // 2) Materialized summaries that no longer match the transactions
    let computed: BTreeMap<String, _> = aggregate::monthly_summaries(&all)
        .into_iter()
        .map(|s| (s.month, s.summary))
        .collect();
    let cached: BTreeMap<String, _> = repo
        .list_monthly_summaries()?
        .into_iter()
        .map(|s| (s.month, s.summary))
        .collect();
    for (month, summary) in &computed {
        if cached.get(month) != Some(summary) {
            issues.push(Issue {
                kind: "summary_drift",
                detail: month.clone(),
            });
        }
    }
    for month in cached.keys().filter(|m| !computed.contains_key(*m)) {
        issues.push(Issue {
            kind: "stale_summary",
            detail: month.clone(),
        });
    }

    Ok(issues)
}
