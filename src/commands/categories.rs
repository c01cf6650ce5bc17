// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, Kind, NewCategory};
use crate::repository::Repository;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle<R: Repository>(repo: &mut R, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let kind: Kind = sub.get_one::<String>("kind").unwrap().parse()?;
            repo.insert_categories(&[NewCategory::new(name.clone(), kind)])
                .with_context(|| format!("Add category '{}'", name))?;
            println!("Added {} category '{}'", kind, name);
        }
        Some(("list", sub)) => {
            let data = query_categories(repo, sub)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| vec![c.id.to_string(), c.name, c.kind.to_string()])
                    .collect();
                println!("{}", pretty_table(&["ID", "Category", "Kind"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn query_categories<R: Repository>(repo: &R, sub: &clap::ArgMatches) -> Result<Vec<Category>> {
    let kind = sub
        .get_one::<String>("kind")
        .map(|s| s.parse::<Kind>())
        .transpose()?;
    let mut data = repo.list_categories()?;
    if let Some(kind) = kind {
        data.retain(|c| c.kind == kind);
    }
    Ok(data)
}
