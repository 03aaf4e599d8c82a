// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;
use crate::models::{MonthlySummary, Transaction, TransactionKind};
use crate::services::{NewTransaction, TransactionFilter, TransactionService};
use crate::utils::{current_month_year, fmt_datetime, fmt_money, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub).context("Failed to record transaction")?,
        Some(("list", sub)) => list(conn, sub).context("Failed to list transactions")?,
        Some(("summary", sub)) => summary(conn, sub).context("Failed to build monthly report")?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = *sub
        .get_one::<Decimal>("amount")
        .context("--amount is required")?;
    let category = sub
        .get_one::<String>("category")
        .context("--category is required")?;

    let mut new = NewTransaction::new(amount, category.trim());
    new.tags = sub.get_one::<String>("tags").cloned();
    new.remark = sub.get_one::<String>("remark").cloned();
    new.time = sub.get_one::<NaiveDateTime>("time").copied();

    let t = TransactionService::new(conn).add(new)?;
    println!(
        "Recorded transaction #{}: {} {} ({}) at {}",
        t.id,
        t.kind(),
        fmt_money(&t.amount),
        t.category,
        fmt_datetime(&t.transaction_time)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No matching transactions");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.amount.clone(),
                r.category.clone(),
                r.tags.clone(),
                r.remark.clone(),
                r.time.clone(),
                r.kind.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Amount", "Category", "Tags", "Remark", "Time", "Type"],
            rows,
        )
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub amount: String,
    pub category: String,
    pub tags: String,
    pub remark: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl From<Transaction> for TransactionRow {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            kind: t.kind(),
            amount: fmt_money(&t.amount),
            category: t.category,
            tags: t.tags.unwrap_or_default(),
            remark: t.remark.unwrap_or_default(),
            time: fmt_datetime(&t.transaction_time),
        }
    }
}

/// Builds the filter from `transaction list` arguments. A month without a
/// year refers to the current year.
pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let month = sub.get_one::<u32>("month").copied();
    let mut year = sub.get_one::<i32>("year").copied();
    if month.is_some() && year.is_none() {
        year = Some(current_month_year().1);
    }
    let kind = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TransactionKind>())
        .transpose()?;
    Ok(TransactionFilter {
        month,
        year,
        category: sub.get_one::<String>("category").cloned(),
        tags: sub.get_one::<String>("tags").cloned(),
        kind,
    })
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = filter_from_args(sub)?;
    let txs = TransactionService::new(conn).list(&filter)?;
    Ok(txs.into_iter().map(TransactionRow::from).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
}

impl FromStr for ReportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ValidationError::UnknownFormat(s.to_string())),
        }
    }
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (cur_month, cur_year) = current_month_year();
    let month = sub.get_one::<u32>("month").copied().unwrap_or(cur_month);
    let year = sub.get_one::<i32>("year").copied().unwrap_or(cur_year);
    let format = sub
        .get_one::<String>("format")
        .map(|s| s.parse::<ReportFormat>())
        .transpose()?
        .unwrap_or(ReportFormat::Text);

    let s = TransactionService::new(conn).monthly_summary(month, year)?;
    print!("{}", render_summary(&s, format)?);
    Ok(())
}

/// Categories sorted by amount, largest first, then by name.
fn ranked_categories(s: &MonthlySummary) -> Vec<(&String, &Decimal, Decimal)> {
    let mut items: Vec<_> = s
        .category_stats
        .iter()
        .map(|(cat, amt)| {
            let pct = s
                .category_percentage
                .get(cat)
                .copied()
                .unwrap_or(Decimal::ZERO);
            (cat, amt, pct)
        })
        .collect();
    items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    items
}

pub fn render_summary(s: &MonthlySummary, format: ReportFormat) -> Result<String> {
    let mut out = String::new();
    if format != ReportFormat::Json && s.transaction_count == 0 {
        writeln!(out, "No transactions recorded for {}-{:02}", s.year, s.month)?;
        return Ok(out);
    }

    match format {
        ReportFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(s)?)?;
        }
        ReportFormat::Text => {
            writeln!(out, "=== Monthly report {}-{:02} ===", s.year, s.month)?;
            writeln!(out, "Total income:  {}", fmt_money(&s.total_income))?;
            writeln!(out, "Total expense: {}", fmt_money(&s.total_expense))?;
            writeln!(out, "Balance:       {}", fmt_money(&s.balance))?;
            writeln!(out, "Transactions:  {}", s.transaction_count)?;
            writeln!(out)?;
            writeln!(out, "By category:")?;
            for (cat, amt, pct) in ranked_categories(s) {
                writeln!(out, "  {}: {:.2}% ({})", cat, pct, fmt_money(amt))?;
            }
        }
        ReportFormat::Markdown => {
            writeln!(out, "# Monthly report {}-{:02}", s.year, s.month)?;
            writeln!(out)?;
            writeln!(out, "| Item | Amount |")?;
            writeln!(out, "|------|--------|")?;
            writeln!(out, "| Total income | {} |", fmt_money(&s.total_income))?;
            writeln!(out, "| Total expense | {} |", fmt_money(&s.total_expense))?;
            writeln!(out, "| Balance | {} |", fmt_money(&s.balance))?;
            writeln!(out, "| Transactions | {} |", s.transaction_count)?;
            writeln!(out)?;
            writeln!(out, "## By category")?;
            writeln!(out)?;
            writeln!(out, "| Category | Share | Amount |")?;
            writeln!(out, "|----------|-------|--------|")?;
            for (cat, amt, pct) in ranked_categories(s) {
                writeln!(out, "| {} | {:.2}% | {} |", cat, pct, fmt_money(amt))?;
            }
        }
    }
    Ok(out)
}
