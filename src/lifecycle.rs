// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! First-run seeding and full reset.
//!
//! Whether the store has been seeded is tracked by the `dbInitialized` flag in
//! a [`FlagStore`], not in SQLite. The flag is read once at startup into a
//! [`LifecycleState`] and handed to [`Lifecycle::new`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::flags::{DB_INITIALIZED, FlagStore};
use crate::models::{Kind, NewCategory, NewTransaction};
use crate::repository::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Seeded,
}

impl LifecycleState {
    /// Any value under `dbInitialized` counts as seeded.
    pub fn read(flags: &impl FlagStore) -> Result<Self> {
        Ok(match flags.get(DB_INITIALIZED)? {
            Some(_) => LifecycleState::Seeded,
            None => LifecycleState::Uninitialized,
        })
    }
}

const DEFAULT_CATEGORIES: &[(&str, Kind)] = &[
    ("Employment & Business", Kind::Income),
    ("Investments & Passive Income", Kind::Income),
    ("Bonuses & Unexpected Income", Kind::Income),
    ("Refunds & Financial Returns", Kind::Income),
    ("Grants & Scholarships", Kind::Income),
    ("Other Income Sources", Kind::Income),
    ("Housing & Utilities", Kind::Expense),
    ("Food & Dining", Kind::Expense),
    ("Transportation", Kind::Expense),
    ("Entertainment & Leisure", Kind::Expense),
    ("Health & Insurance", Kind::Expense),
    ("Education", Kind::Expense),
    ("Subscriptions & Digital Services", Kind::Expense),
    ("Shopping & Personal Expenses", Kind::Expense),
    ("Travel & Vacations", Kind::Expense),
    ("Charity & Social Contributions", Kind::Expense),
    ("Childcare & Family", Kind::Expense),
    ("Pets", Kind::Expense),
    ("Debt & Financial Obligations", Kind::Expense),
    ("Miscellaneous & Other Expenses", Kind::Expense),
];

// (date, category, kind, amount in cents, note)
const SAMPLE_TRANSACTIONS: &[((i32, u32, u32), &str, Kind, i64, &str)] = &[
    ((2025, 1, 1), "Employment & Business", Kind::Income, 320000, "January salary"),
    ((2025, 1, 3), "Housing & Utilities", Kind::Expense, 120000, "Rent"),
    ((2025, 1, 10), "Food & Dining", Kind::Expense, 8435, "Groceries"),
    ((2025, 2, 1), "Employment & Business", Kind::Income, 320000, "February salary"),
    ((2025, 2, 5), "Housing & Utilities", Kind::Expense, 120000, "Rent"),
    ((2025, 2, 14), "Entertainment & Leisure", Kind::Expense, 4500, "Concert tickets"),
];

/// A transaction to seed, naming its category instead of an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTransaction {
    pub category: String,
    pub kind: Kind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// What a first run inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub categories: Vec<NewCategory>,
    pub samples: Vec<SampleTransaction>,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, kind)| NewCategory::new(*name, *kind))
                .collect(),
            samples: Vec::new(),
        }
    }
}

impl SeedPlan {
    pub fn with_samples(mut self) -> Self {
        self.samples = SAMPLE_TRANSACTIONS
            .iter()
            .filter_map(|((y, m, d), category, kind, cents, note)| {
                Some(SampleTransaction {
                    category: category.to_string(),
                    kind: *kind,
                    amount: Decimal::new(*cents, 2),
                    date: NaiveDate::from_ymd_opt(*y, *m, *d)?,
                    note: Some(note.to_string()),
                })
            })
            .collect();
        self
    }
}

pub struct Lifecycle<R, F> {
    repo: R,
    flags: F,
    plan: SeedPlan,
    state: LifecycleState,
}

impl<R: Repository, F: FlagStore> Lifecycle<R, F> {
    pub fn new(repo: R, flags: F, plan: SeedPlan, state: LifecycleState) -> Self {
        Self {
            repo,
            flags,
            plan,
            state,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn flags(&self) -> &F {
        &self.flags
    }

    pub fn into_parts(self) -> (R, F) {
        (self.repo, self.flags)
    }

    /// Seeds a store that has not been seeded yet.
    ///
    /// Never fails: errors are logged and the state stays `Uninitialized`, so
    /// the next launch tries again. Rows inserted before the failure are kept.
    pub fn seed(&mut self) -> LifecycleState {
        if self.state == LifecycleState::Seeded {
            tracing::info!("database already initialized, skipping seeding");
            return self.state;
        }
        tracing::info!("starting database seeding");
        match self.run_seed() {
            Ok(()) => {
                self.state = LifecycleState::Seeded;
                tracing::info!("database seeding complete");
            }
            Err(e) => tracing::error!(error = %e, "database seeding failed"),
        }
        self.state
    }

    fn run_seed(&mut self) -> Result<()> {
        self.seed_categories()?;
        self.seed_sample_transactions()?;
        self.flags.set(DB_INITIALIZED, "true")
    }

    /// Inserts the plan's categories if there are none yet. Returns how many were inserted.
    pub fn seed_categories(&mut self) -> Result<usize> {
        if self.repo.count_categories()? > 0 {
            tracing::info!("categories already exist");
            return Ok(0);
        }
        self.repo.insert_categories(&self.plan.categories)?;
        tracing::info!(count = self.plan.categories.len(), "categories seeded");
        Ok(self.plan.categories.len())
    }

    /// Inserts the plan's sample transactions if there are none yet.
    pub fn seed_sample_transactions(&mut self) -> Result<usize> {
        if self.plan.samples.is_empty() {
            return Ok(0);
        }
        if self.repo.count_transactions()? > 0 {
            tracing::info!("transactions already exist");
            return Ok(0);
        }
        let mut rows = Vec::with_capacity(self.plan.samples.len());
        for s in &self.plan.samples {
            let category = self.repo.category_by_name(&s.category)?.ok_or_else(|| {
                LedgerError::ConstraintViolation(format!(
                    "sample category '{}' does not exist",
                    s.category
                ))
            })?;
            rows.push(NewTransaction {
                amount: s.amount,
                kind: s.kind,
                category_id: category.id,
                date: s.date,
                note: s.note.clone(),
            });
        }
        let inserted = self.repo.insert_transactions(&rows)?;
        tracing::info!(count = inserted.len(), "sample transactions seeded");
        Ok(inserted.len())
    }

    /// Clears the `dbInitialized` flag and then every table, so the next launch
    /// reseeds. The flag goes first, so a failure never leaves empty tables
    /// marked as seeded.
    pub fn reset(&mut self) -> Result<()> {
        self.flags.remove(DB_INITIALIZED)?;
        self.state = LifecycleState::Uninitialized;
        self.repo.reset_all()?;
        tracing::info!("database has been reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_category_set() {
        let plan = SeedPlan::default();
        assert_eq!(plan.categories.len(), 20);
        assert_eq!(
            plan.categories.iter().filter(|c| c.kind == Kind::Income).count(),
            6
        );
        assert!(plan.samples.is_empty());
    }

    #[test]
    fn sample_categories_exist_in_plan_with_same_kind() {
        let plan = SeedPlan::default().with_samples();
        assert_eq!(plan.samples.len(), SAMPLE_TRANSACTIONS.len());
        for s in &plan.samples {
            let c = plan
                .categories
                .iter()
                .find(|c| c.name == s.category)
                .unwrap();
            assert_eq!(c.kind, s.kind);
        }
    }
}
