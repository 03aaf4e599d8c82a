// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{MonthlySummary, Transaction, TransactionKind};
use crate::utils::{fmt_datetime, month_range, now, read_datetime, read_decimal};

const COLUMNS: &str =
    "id, amount, category, tags, remark, transaction_time, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub category: String,
    pub tags: Option<String>,
    pub remark: Option<String>,
    pub time: Option<NaiveDateTime>,
}

impl NewTransaction {
    pub fn new(amount: Decimal, category: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            tags: None,
            remark: None,
            time: None,
        }
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    pub fn at(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }
}

/// All set fields must match. Month and year only narrow the result when both
/// are present.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub kind: Option<TransactionKind>,
}

pub struct TransactionService<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, new: NewTransaction) -> Result<Transaction> {
        if new.amount.is_zero() {
            return Err(ValidationError::ZeroAmount.into());
        }
        if new.category.trim().is_empty() {
            return Err(ValidationError::Blank { field: "category" }.into());
        }
        let stamp = now();
        let time = new.time.unwrap_or(stamp);
        self.conn
            .execute(
                "INSERT INTO transactions(amount, category, tags, remark, transaction_time, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    new.amount.to_string(),
                    new.category,
                    new.tags,
                    new.remark,
                    fmt_datetime(&time),
                    fmt_datetime(&stamp),
                ],
            )
            .context("Failed to insert transaction")?;
        let id = self.conn.last_insert_rowid();
        debug!(id, amount = %new.amount, category = %new.category, "transaction added");
        self.get(id)?
            .with_context(|| format!("Transaction #{} vanished after insert", id))
    }

    pub fn get(&self, id: i64) -> Result<Option<Transaction>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id=?1", COLUMNS),
                params![id],
                RawTransaction::from_row,
            )
            .optional()?;
        raw.map(RawTransaction::into_model).transpose()
    }

    pub fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", COLUMNS);
        let mut params_vec: Vec<String> = Vec::new();

        if let (Some(month), Some(year)) = (filter.month, filter.year) {
            let (start, end) = month_range(month, year)?;
            sql.push_str(" AND transaction_time >= ? AND transaction_time < ?");
            params_vec.push(fmt_datetime(&start));
            params_vec.push(fmt_datetime(&end));
        }
        if let Some(cat) = &filter.category {
            sql.push_str(" AND category = ?");
            params_vec.push(cat.clone());
        }
        if let Some(tags) = &filter.tags {
            sql.push_str(" AND instr(tags, ?) > 0");
            params_vec.push(tags.clone());
        }
        match filter.kind {
            Some(TransactionKind::Income) => sql.push_str(" AND CAST(amount AS REAL) > 0"),
            Some(TransactionKind::Expense) => sql.push_str(" AND CAST(amount AS REAL) < 0"),
            None => {}
        }
        sql.push_str(" ORDER BY transaction_time DESC, id DESC");
        debug!(%sql, ?params_vec, "listing transactions");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params_vec.iter()),
            RawTransaction::from_row,
        )?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?.into_model()?);
        }
        Ok(data)
    }

    pub fn monthly_summary(&self, month: u32, year: i32) -> Result<MonthlySummary> {
        let txs = self.list(&TransactionFilter {
            month: Some(month),
            year: Some(year),
            ..Default::default()
        })?;

        let overflow = || anyhow::anyhow!("Summary overflow for {}-{:02}", year, month);
        let mut total_income = Decimal::ZERO;
        let mut negative_sum = Decimal::ZERO;
        let mut category_stats: BTreeMap<String, Decimal> = BTreeMap::new();
        for t in &txs {
            if t.amount > Decimal::ZERO {
                total_income = total_income.checked_add(t.amount).ok_or_else(overflow)?;
            } else if t.amount < Decimal::ZERO {
                negative_sum = negative_sum.checked_add(t.amount).ok_or_else(overflow)?;
            }
            let slot = category_stats
                .entry(t.category.clone())
                .or_insert(Decimal::ZERO);
            *slot = slot.checked_add(t.amount.abs()).ok_or_else(overflow)?;
        }
        let total_expense = negative_sum.abs();
        let turnover = total_income
            .checked_add(total_expense)
            .ok_or_else(overflow)?;

        let hundred = Decimal::ONE_HUNDRED;
        let category_percentage = category_stats
            .iter()
            .map(|(cat, amt)| {
                let pct = if turnover.is_zero() {
                    Decimal::ZERO
                } else {
                    (*amt / turnover * hundred).round_dp(2)
                };
                (cat.clone(), pct)
            })
            .collect();

        debug!(month, year, count = txs.len(), "monthly summary computed");
        Ok(MonthlySummary {
            month,
            year,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            transaction_count: txs.len(),
            category_stats,
            category_percentage,
        })
    }
}

/// Column values as SQLite hands them back; amounts and timestamps are TEXT.
struct RawTransaction {
    id: i64,
    amount: String,
    category: String,
    tags: Option<String>,
    remark: Option<String>,
    transaction_time: String,
    created_at: String,
    updated_at: String,
}

impl RawTransaction {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            amount: r.get(1)?,
            category: r.get(2)?,
            tags: r.get(3)?,
            remark: r.get(4)?,
            transaction_time: r.get(5)?,
            created_at: r.get(6)?,
            updated_at: r.get(7)?,
        })
    }

    fn into_model(self) -> Result<Transaction> {
        Ok(Transaction {
            id: self.id,
            amount: read_decimal(&self.amount)?,
            category: self.category,
            tags: self.tags,
            remark: self.remark,
            transaction_time: read_datetime(&self.transaction_time)?,
            created_at: read_datetime(&self.created_at)?,
            updated_at: read_datetime(&self.updated_at)?,
        })
    }
}
