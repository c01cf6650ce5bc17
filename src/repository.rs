// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};
use rust_decimal::Decimal;

use crate::aggregate;
use crate::error::{LedgerError, Result};
use crate::models::{
    Category, DATE_FORMAT, Kind, MonthlySummary, NewCategory, NewTransaction, Summary,
    TIMESTAMP_FORMAT, Transaction, TransactionFilter,
};

/// Storage operations the lifecycle controller and the CLI are written against.
///
/// Every mutating call is atomic: it either fully applies or leaves storage untouched.
pub trait Repository {
    /// Transactions matching `filter`, most recently entered first.
    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// Fails with [`LedgerError::ConstraintViolation`] when the category is
    /// missing or of the other kind, and [`LedgerError::InvalidInput`] for a
    /// negative amount or one that would push a month's totals out of range.
    fn insert_transaction(&mut self, new: NewTransaction) -> Result<Transaction>;

    /// Inserts all rows or none.
    fn insert_transactions(&mut self, rows: &[NewTransaction]) -> Result<Vec<Transaction>>;

    /// Fails with [`LedgerError::NotFound`] when no transaction has this id.
    fn delete_transaction(&mut self, id: i64) -> Result<()>;

    fn list_categories(&self) -> Result<Vec<Category>>;

    /// Inserts all rows or none; a reused name is a constraint violation.
    fn insert_categories(&mut self, rows: &[NewCategory]) -> Result<()>;

    fn category_by_name(&self, name: &str) -> Result<Option<Category>>;

    fn count_categories(&self) -> Result<usize>;

    fn count_transactions(&self) -> Result<usize>;

    /// Rows of the materialized `months_summary` table, most recent first.
    fn list_monthly_summaries(&self) -> Result<Vec<MonthlySummary>>;

    /// Clears every table and its id counter in one SQL transaction.
    fn reset_all(&mut self) -> Result<()>;
}

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Expects a connection whose schema was created by [`crate::db::init_schema`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

const TRANSACTION_COLUMNS: &str = "id, amount, type, category_id, date, note, created_at";

fn decimal_at(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn transaction_from_row(r: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        amount: decimal_at(r, 1)?,
        kind: r.get(2)?,
        category_id: r.get(3)?,
        date: r.get(4)?,
        note: r.get(5)?,
        created_at: r.get(6)?,
    })
}

fn category_from_row(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        kind: r.get(2)?,
    })
}

fn fetch_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", TRANSACTION_COLUMNS);
    conn.query_row(&sql, params![id], transaction_from_row)
        .optional()?
        .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", id)))
}

fn insert_one(conn: &Connection, new: &NewTransaction) -> Result<i64> {
    if new.amount < Decimal::ZERO {
        return Err(LedgerError::InvalidInput(format!(
            "amount must not be negative, got {}",
            new.amount
        )));
    }
    let category_kind: Option<Kind> = conn
        .query_row(
            "SELECT type FROM categories WHERE id=?1",
            params![new.category_id],
            |r| r.get(0),
        )
        .optional()?;
    match category_kind {
        None => {
            return Err(LedgerError::ConstraintViolation(format!(
                "category {} does not exist",
                new.category_id
            )));
        }
        Some(kind) if kind != new.kind => {
            return Err(LedgerError::ConstraintViolation(format!(
                "category {} is {}, transaction is {}",
                new.category_id, kind, new.kind
            )));
        }
        Some(_) => {}
    }

    let created_at = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    conn.execute(
        "INSERT INTO transactions(amount, type, category_id, date, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.amount.to_string(),
            new.kind,
            new.category_id,
            new.date.format(DATE_FORMAT).to_string(),
            new.note,
            created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn all_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let sql = format!("SELECT {} FROM transactions", TRANSACTION_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], transaction_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Recomputes `months_summary` from every stored transaction.
fn rebuild_summaries(conn: &Connection) -> Result<()> {
    let summaries = aggregate::checked_monthly_summaries(&all_transactions(conn)?)
        .ok_or_else(|| LedgerError::InvalidInput("monthly totals exceed the supported range".into()))?;
    conn.execute("DELETE FROM months_summary", [])?;
    let mut insert = conn.prepare_cached(
        "INSERT INTO months_summary(month, total_income, total_expense, net_balance)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for s in &summaries {
        insert.execute(params![
            s.month,
            s.summary.total_income.to_string(),
            s.summary.total_expense.to_string(),
            s.summary.net_balance.to_string()
        ])?;
    }
    tracing::debug!(months = summaries.len(), "rebuilt monthly summaries");
    Ok(())
}

fn count(conn: &Connection, table: &str) -> Result<usize> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
        r.get(0)
    })?;
    Ok(n as usize)
}

impl Repository for SqliteRepository {
    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", TRANSACTION_COLUMNS);
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(month) = &filter.month {
            sql.push_str(" AND substr(date,1,7)=?");
            args.push(Box::new(month.clone()));
        }
        if let Some(kind) = filter.kind {
            sql.push_str(" AND type=?");
            args.push(Box::new(kind));
        }
        if let Some(category_id) = filter.category_id {
            sql.push_str(" AND category_id=?");
            args.push(Box::new(category_id));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), transaction_from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn insert_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        let tx = self.conn.transaction()?;
        let id = insert_one(&tx, &new)?;
        rebuild_summaries(&tx)?;
        let inserted = fetch_transaction(&tx, id)?;
        tx.commit()?;
        tracing::debug!(id, kind = %inserted.kind, amount = %inserted.amount, "inserted transaction");
        Ok(inserted)
    }

    fn insert_transactions(&mut self, rows: &[NewTransaction]) -> Result<Vec<Transaction>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(rows.len());
        for new in rows {
            ids.push(insert_one(&tx, new)?);
        }
        rebuild_summaries(&tx)?;
        let mut inserted = Vec::with_capacity(ids.len());
        for id in ids {
            inserted.push(fetch_transaction(&tx, id)?);
        }
        tx.commit()?;
        tracing::debug!(count = inserted.len(), "inserted transactions");
        Ok(inserted)
    }

    fn delete_transaction(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if changed == 0 {
            return Err(LedgerError::NotFound(format!("transaction {}", id)));
        }
        rebuild_summaries(&tx)?;
        tx.commit()?;
        tracing::debug!(id, "deleted transaction");
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, type FROM categories ORDER BY type DESC, name")?;
        let rows = stmt.query_map([], category_from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn insert_categories(&mut self, rows: &[NewCategory]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert = tx.prepare_cached("INSERT INTO categories(name, type) VALUES (?1, ?2)")?;
            for c in rows {
                let name = c.name.trim();
                if name.is_empty() {
                    return Err(LedgerError::InvalidInput(
                        "category name must not be empty".into(),
                    ));
                }
                insert.execute(params![name, c.kind])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = rows.len(), "inserted categories");
        Ok(())
    }

    fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, type FROM categories WHERE name=?1",
                params![name.trim()],
                category_from_row,
            )
            .optional()?)
    }

    fn count_categories(&self) -> Result<usize> {
        count(&self.conn, "categories")
    }

    fn count_transactions(&self) -> Result<usize> {
        count(&self.conn, "transactions")
    }

    fn list_monthly_summaries(&self) -> Result<Vec<MonthlySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT month, total_income, total_expense, net_balance
             FROM months_summary ORDER BY month DESC",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(MonthlySummary {
                month: r.get(0)?,
                summary: Summary {
                    total_income: decimal_at(r, 1)?,
                    total_expense: decimal_at(r, 2)?,
                    net_balance: decimal_at(r, 3)?,
                },
            })
        })?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn reset_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM months_summary;
             DELETE FROM transactions;
             DELETE FROM categories;
             DELETE FROM sqlite_sequence
                WHERE name IN ('transactions', 'categories', 'months_summary');",
        )?;
        tx.commit()?;
        tracing::info!("all tables cleared");
        Ok(())
    }
}
