// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::error::ValidationError;

pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub const MIN_YEAR: i32 = 1900;

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(s.trim(), DATETIME_FMT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Amounts are signed; zero has no direction and is refused. Exponent forms
/// such as `1e3` are accepted.
pub fn parse_amount(s: &str) -> Result<Decimal, ValidationError> {
    let raw = s.trim();
    let d = raw
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ValidationError::InvalidAmount(s.to_string()))?;
    if d.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(d)
}

pub fn parse_month(s: &str) -> Result<u32, ValidationError> {
    match s.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(ValidationError::MonthOutOfRange(s.to_string())),
    }
}

pub fn parse_year(s: &str) -> Result<i32, ValidationError> {
    let max = Local::now().year() + 10;
    match s.trim().parse::<i32>() {
        Ok(y) if (MIN_YEAR..=max).contains(&y) => Ok(y),
        _ => Err(ValidationError::YearOutOfRange {
            value: s.to_string(),
            min: MIN_YEAR,
            max,
        }),
    }
}

pub fn parse_id(s: &str) -> Result<i64, ValidationError> {
    match s.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(s.to_string())),
    }
}

pub fn fmt_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

pub fn read_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .with_context(|| format!("Corrupt timestamp '{}' in store", s))
}

pub fn read_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Corrupt amount '{}' in store", s))
}

/// Local wall-clock time at second precision, the resolution the store keeps.
pub fn now() -> NaiveDateTime {
    let n = Local::now().naive_local();
    n.with_nanosecond(0).unwrap_or(n)
}

pub fn current_month_year() -> (u32, i32) {
    let today = Local::now().date_naive();
    (today.month(), today.year())
}

/// Half-open `[first-of-month, first-of-next-month)` bounds.
pub fn month_range(month: u32, year: i32) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let first_of = |y: i32, m: u32| {
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("Invalid month {}-{:02}", y, m))
    };
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    Ok((first_of(year, month)?, first_of(ny, nm)?))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
