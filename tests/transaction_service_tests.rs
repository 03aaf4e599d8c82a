// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashlog::db;
use cashlog::error::ValidationError;
use cashlog::models::TransactionKind;
use cashlog::services::{NewTransaction, TransactionFilter, TransactionService};
use cashlog::utils::parse_datetime;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn at(s: &str) -> chrono::NaiveDateTime {
    parse_datetime(s).unwrap()
}

fn dec(v: i64) -> Decimal {
    Decimal::from(v)
}

fn seed(svc: &TransactionService<'_>) {
    for (amount, cat, time) in [
        (1000, "工资", "2024-01-01 00:00:00"),
        (-500, "餐饮", "2024-01-02 00:00:00"),
        (-200, "交通", "2024-01-03 00:00:00"),
        (500, "奖金", "2024-02-01 00:00:00"),
    ] {
        svc.add(NewTransaction::new(dec(amount), cat).at(at(time)))
            .unwrap();
    }
}

#[test]
fn add_returns_persisted_record() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    let t = svc
        .add(
            NewTransaction::new("12.34".parse().unwrap(), "Books")
                .tags("reading,gift")
                .remark("birthday")
                .at(at("2024-05-06 07:08:09")),
        )
        .unwrap();
    assert!(t.id > 0);
    assert_eq!(t.amount, "12.34".parse::<Decimal>().unwrap());
    assert_eq!(t.category, "Books");
    assert_eq!(t.tags.as_deref(), Some("reading,gift"));
    assert_eq!(t.remark.as_deref(), Some("birthday"));
    assert_eq!(t.transaction_time, at("2024-05-06 07:08:09"));
    assert_eq!(t.created_at, t.updated_at);

    let again = svc.get(t.id).unwrap().unwrap();
    assert_eq!(again.id, t.id);
    assert_eq!(again.amount, t.amount);
}

#[test]
fn time_defaults_to_creation_time() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    let t = svc.add(NewTransaction::new(dec(5), "Misc")).unwrap();
    assert_eq!(t.transaction_time, t.created_at);
}

#[test]
fn sign_decides_kind() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    let income = svc.add(NewTransaction::new(dec(1), "A")).unwrap();
    let expense = svc
        .add(NewTransaction::new("-0.01".parse().unwrap(), "B"))
        .unwrap();
    assert_eq!(income.kind(), TransactionKind::Income);
    assert_eq!(expense.kind(), TransactionKind::Expense);
}

#[test]
fn zero_amount_is_rejected() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    let err = svc
        .add(NewTransaction::new(Decimal::ZERO, "Nothing"))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::ZeroAmount)
    );
    assert!(svc.list(&TransactionFilter::default()).unwrap().is_empty());
}

#[test]
fn blank_category_is_rejected() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    assert!(svc.add(NewTransaction::new(dec(3), "  ")).is_err());
}

#[test]
fn ids_are_unique_and_stable() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    let a = svc.add(NewTransaction::new(dec(1), "A")).unwrap();
    let b = svc.add(NewTransaction::new(dec(2), "B")).unwrap();
    assert_ne!(a.id, b.id);

    let all = svc.list(&TransactionFilter::default()).unwrap();
    let ids: Vec<i64> = all.iter().map(|t| t.id).collect();
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));
    assert_eq!(svc.get(a.id).unwrap().unwrap().category, "A");
}

#[test]
fn list_orders_newest_first() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    let all = svc.list(&TransactionFilter::default()).unwrap();
    assert_eq!(all.len(), 4);
    let cats: Vec<&str> = all.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(cats, ["奖金", "交通", "餐饮", "工资"]);
}

#[test]
fn list_by_month() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    let jan = svc
        .list(&TransactionFilter {
            month: Some(1),
            year: Some(2024),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(jan.len(), 3);
    assert!(jan.iter().all(|t| t.category != "奖金"));
}

#[test]
fn month_without_year_does_not_narrow() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    let rows = svc
        .list(&TransactionFilter {
            month: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 4);
}

#[test]
fn december_rolls_into_next_year() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    svc.add(NewTransaction::new(dec(10), "In").at(at("2023-12-31 23:59:59")))
        .unwrap();
    svc.add(NewTransaction::new(dec(20), "Out").at(at("2024-01-01 00:00:00")))
        .unwrap();
    svc.add(NewTransaction::new(dec(30), "Start").at(at("2023-12-01 00:00:00")))
        .unwrap();
    let dec_rows = svc
        .list(&TransactionFilter {
            month: Some(12),
            year: Some(2023),
            ..Default::default()
        })
        .unwrap();
    let cats: Vec<&str> = dec_rows.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(cats, ["In", "Start"]);
}

#[test]
fn list_filters_by_type() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    let income = svc
        .list(&TransactionFilter {
            kind: Some(TransactionKind::Income),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(income.len(), 2);
    assert!(income.iter().all(|t| t.amount > Decimal::ZERO));

    let expense = svc
        .list(&TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(expense.len(), 2);
    assert!(expense.iter().all(|t| t.amount < Decimal::ZERO));
}

#[test]
fn tags_match_by_substring() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    svc.add(NewTransaction::new(dec(-12), "Food").tags("lunch,work"))
        .unwrap();
    svc.add(NewTransaction::new(dec(-30), "Food").tags("dinner"))
        .unwrap();
    svc.add(NewTransaction::new(dec(-5), "Food")).unwrap();

    let rows = svc
        .list(&TransactionFilter {
            tags: Some("work".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tags.as_deref(), Some("lunch,work"));
}

#[test]
fn filters_are_conjunctive() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    svc.add(NewTransaction::new(dec(-40), "餐饮").at(at("2024-02-10 12:00:00")))
        .unwrap();

    let rows = svc
        .list(&TransactionFilter {
            month: Some(1),
            year: Some(2024),
            category: Some("餐饮".into()),
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, dec(-500));

    let none = svc
        .list(&TransactionFilter {
            category: Some("餐饮".into()),
            kind: Some(TransactionKind::Income),
            ..Default::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn monthly_summary_scenario() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    let s = svc.monthly_summary(1, 2024).unwrap();
    assert_eq!(s.month, 1);
    assert_eq!(s.year, 2024);
    assert_eq!(s.total_income, dec(1000));
    assert_eq!(s.total_expense, dec(700));
    assert_eq!(s.balance, dec(300));
    assert_eq!(s.transaction_count, 3);
    assert_eq!(s.category_stats.len(), 3);
    assert_eq!(s.category_stats["工资"], dec(1000));
    assert_eq!(s.category_stats["餐饮"], dec(500));
    assert_eq!(s.category_stats["交通"], dec(200));
    assert_eq!(s.total_income - s.total_expense, s.balance);

    assert_eq!(s.category_percentage["工资"], "58.82".parse::<Decimal>().unwrap());
    assert_eq!(s.category_percentage["餐饮"], "29.41".parse::<Decimal>().unwrap());
    assert_eq!(s.category_percentage["交通"], "11.76".parse::<Decimal>().unwrap());
    let sum: Decimal = s.category_percentage.values().sum();
    assert!((sum - Decimal::ONE_HUNDRED).abs() <= "0.05".parse::<Decimal>().unwrap());
}

#[test]
fn monthly_summary_of_empty_month() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    seed(&svc);
    let s = svc.monthly_summary(3, 2024).unwrap();
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.total_expense, Decimal::ZERO);
    assert_eq!(s.balance, Decimal::ZERO);
    assert_eq!(s.transaction_count, 0);
    assert!(s.category_stats.is_empty());
    assert!(s.category_percentage.is_empty());
}

#[test]
fn monthly_summary_merges_income_and_expense_in_one_category() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    svc.add(NewTransaction::new(dec(100), "Side").at(at("2024-06-01 10:00:00")))
        .unwrap();
    svc.add(NewTransaction::new(dec(-100), "Side").at(at("2024-06-02 10:00:00")))
        .unwrap();
    let s = svc.monthly_summary(6, 2024).unwrap();
    assert_eq!(s.balance, Decimal::ZERO);
    assert_eq!(s.category_stats["Side"], dec(200));
    assert_eq!(s.category_percentage["Side"], Decimal::ONE_HUNDRED);
}

#[test]
fn monthly_summary_reports_overflow_as_error() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    let huge = cashlog::utils::parse_amount("79228162514264337593543950335").unwrap();
    for day in ["2024-01-10 00:00:00", "2024-01-11 00:00:00"] {
        svc.add(NewTransaction::new(huge, "x").at(at(day))).unwrap();
    }
    let err = svc.monthly_summary(1, 2024).unwrap_err();
    assert!(err.to_string().contains("overflow"));

    // Other months are unaffected
    assert_eq!(svc.monthly_summary(2, 2024).unwrap().transaction_count, 0);
}

#[test]
fn zero_amount_row_from_elsewhere_counts_in_neither_side() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(amount, category, transaction_time, created_at, updated_at)
         VALUES ('0', 'Void', '2024-04-15 10:00:00', '2024-04-15 10:00:00', '2024-04-15 10:00:00')",
        [],
    )
    .unwrap();
    let svc = TransactionService::new(&conn);
    let s = svc.monthly_summary(4, 2024).unwrap();
    assert_eq!(s.transaction_count, 1);
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.total_expense, Decimal::ZERO);
    assert_eq!(s.balance, Decimal::ZERO);
    assert_eq!(s.category_stats["Void"], Decimal::ZERO);
    assert_eq!(s.category_percentage["Void"], Decimal::ZERO);

    let t = svc.list(&TransactionFilter::default()).unwrap();
    assert_eq!(t[0].kind(), TransactionKind::Expense);
    let typed = svc
        .list(&TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        })
        .unwrap();
    assert!(typed.is_empty());
}

#[test]
fn empty_tags_filter_skips_untagged_rows() {
    let conn = setup();
    let svc = TransactionService::new(&conn);
    svc.add(NewTransaction::new(dec(-12), "Food").tags("lunch"))
        .unwrap();
    svc.add(NewTransaction::new(dec(-5), "Food")).unwrap();

    let rows = svc
        .list(&TransactionFilter {
            tags: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tags.as_deref(), Some("lunch"));
}
