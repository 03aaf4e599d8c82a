// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;

use crate::models::{Todo, TodoStatus};
use crate::services::{NewTodo, TodoFilter, TodoService};
use crate::utils::{fmt_datetime, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub).context("Failed to add todo")?,
        Some(("update", sub)) => update(conn, sub).context("Failed to update todo")?,
        Some(("list", sub)) => list(conn, sub).context("Failed to list todos")?,
        Some(("delete", sub)) => delete(conn, sub).context("Failed to delete todo")?,
        _ => {}
    }
    Ok(())
}

fn required_id(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id")
        .copied()
        .context("--id is required")
}

fn status_arg(sub: &clap::ArgMatches) -> Result<Option<TodoStatus>> {
    Ok(sub
        .get_one::<String>("status")
        .map(|s| s.parse::<TodoStatus>())
        .transpose()?)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let content = sub
        .get_one::<String>("content")
        .context("--content is required")?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim())
        .unwrap_or("default");

    let mut new = NewTodo::new(content.trim(), category);
    new.tags = sub.get_one::<String>("tags").cloned();
    new.deadline = sub.get_one::<NaiveDateTime>("deadline").copied();

    let todo = TodoService::new(conn).add(new)?;
    println!("Added todo #{}: {}", todo.id, todo.content);
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required_id(sub)?;
    let status = status_arg(sub)?.context("--status is required")?;
    match TodoService::new(conn).update_status(id, status)? {
        Some(todo) => println!("Todo #{} is now {}", todo.id, todo.status),
        None => eprintln!("Todo #{} not found", id),
    }
    Ok(())
}

fn delete(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required_id(sub)?;
    if TodoService::new(conn).delete(id)? {
        println!("Deleted todo #{}", id);
    } else {
        eprintln!("Todo #{} not found", id);
    }
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
        println!("No matching todos");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.content.clone(),
                r.category.clone(),
                r.tags.clone(),
                r.deadline.clone(),
                r.status.to_string(),
                r.created.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Content", "Category", "Tags", "Deadline", "Status", "Created"],
            rows,
        )
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TodoRow {
    pub id: i64,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub deadline: String,
    pub status: TodoStatus,
    pub created: String,
}

impl From<Todo> for TodoRow {
    fn from(t: Todo) -> Self {
        Self {
            id: t.id,
            content: t.content,
            category: t.category,
            tags: t.tags.unwrap_or_default(),
            deadline: t.deadline.as_ref().map(fmt_datetime).unwrap_or_default(),
            status: t.status,
            created: fmt_datetime(&t.created_at),
        }
    }
}

pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<TodoFilter> {
    Ok(TodoFilter {
        status: status_arg(sub)?,
        category: sub.get_one::<String>("category").cloned(),
        deadline_before: sub.get_one::<NaiveDateTime>("deadline-before").copied(),
    })
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TodoRow>> {
    let filter = filter_from_args(sub)?;
    let todos = TodoService::new(conn).list(&filter)?;
    Ok(todos.into_iter().map(TodoRow::from).collect())
}
