// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Rejections raised at the command-line boundary, before any store access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidDate(String),

    #[error("invalid amount '{0}', expected a number")]
    InvalidAmount(String),

    #[error("amount must not be zero: use a positive value for income, negative for expense")]
    ZeroAmount,

    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(String),

    #[error("year must be between {min} and {max}, got {value}")]
    YearOutOfRange { value: String, min: i32, max: i32 },

    #[error("id must be a positive integer, got '{0}'")]
    InvalidId(String),

    #[error("{field} must not be empty")]
    Blank { field: &'static str },

    #[error("unknown status '{0}', expected todo, doing or done")]
    UnknownStatus(String),

    #[error("unknown type '{0}', expected income or expense")]
    UnknownKind(String),

    #[error("unknown format '{0}', expected text, markdown or json")]
    UnknownFormat(String),
}
