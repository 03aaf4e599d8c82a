// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{Todo, TodoStatus};
use crate::utils::{fmt_datetime, now, read_datetime};

const COLUMNS: &str = "id, content, category, tags, deadline, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub content: String,
    pub category: String,
    pub tags: Option<String>,
    pub deadline: Option<NaiveDateTime>,
}

impl NewTodo {
    pub fn new(content: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            category: category.into(),
            tags: None,
            deadline: None,
        }
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub status: Option<TodoStatus>,
    pub category: Option<String>,
    /// Inclusive upper bound; todos without a deadline never match.
    pub deadline_before: Option<NaiveDateTime>,
}

pub struct TodoService<'a> {
    conn: &'a Connection,
}

impl<'a> TodoService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, new: NewTodo) -> Result<Todo> {
        if new.content.trim().is_empty() {
            return Err(ValidationError::Blank { field: "content" }.into());
        }
        if new.category.trim().is_empty() {
            return Err(ValidationError::Blank { field: "category" }.into());
        }
        let stamp = fmt_datetime(&now());
        self.conn
            .execute(
                "INSERT INTO todos(content, category, tags, deadline, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    new.content,
                    new.category,
                    new.tags,
                    new.deadline.as_ref().map(fmt_datetime),
                    TodoStatus::default(),
                    stamp,
                ],
            )
            .context("Failed to insert todo")?;
        let id = self.conn.last_insert_rowid();
        debug!(id, category = %new.category, "todo added");
        self.get(id)?
            .with_context(|| format!("Todo #{} vanished after insert", id))
    }

    pub fn get(&self, id: i64) -> Result<Option<Todo>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM todos WHERE id=?1", COLUMNS),
                params![id],
                RawTodo::from_row,
            )
            .optional()?;
        raw.map(RawTodo::into_model).transpose()
    }

    /// `None` when no todo has this id.
    pub fn update_status(&self, id: i64, status: TodoStatus) -> Result<Option<Todo>> {
        let changed = self
            .conn
            .execute(
                "UPDATE todos SET status=?1, updated_at=?2 WHERE id=?3",
                params![status, fmt_datetime(&now()), id],
            )
            .with_context(|| format!("Failed to update todo #{}", id))?;
        if changed == 0 {
            debug!(id, "update_status: no such todo");
            return Ok(None);
        }
        debug!(id, %status, "todo status updated");
        self.get(id)
    }

    pub fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>> {
        let mut sql = format!("SELECT {} FROM todos WHERE 1=1", COLUMNS);
        let mut params_vec: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            params_vec.push(status.as_str().to_string());
        }
        if let Some(cat) = &filter.category {
            sql.push_str(" AND category = ?");
            params_vec.push(cat.clone());
        }
        if let Some(before) = &filter.deadline_before {
            sql.push_str(" AND deadline IS NOT NULL AND deadline <= ?");
            params_vec.push(fmt_datetime(before));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        debug!(%sql, ?params_vec, "listing todos");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params_vec.iter()),
            RawTodo::from_row,
        )?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?.into_model()?);
        }
        Ok(data)
    }

    /// Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM todos WHERE id=?1", params![id])
            .with_context(|| format!("Failed to delete todo #{}", id))?;
        debug!(id, removed, "todo delete");
        Ok(removed > 0)
    }
}

struct RawTodo {
    id: i64,
    content: String,
    category: String,
    tags: Option<String>,
    deadline: Option<String>,
    status: TodoStatus,
    created_at: String,
    updated_at: String,
}

impl RawTodo {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            content: r.get(1)?,
            category: r.get(2)?,
            tags: r.get(3)?,
            deadline: r.get(4)?,
            status: r.get(5)?,
            created_at: r.get(6)?,
            updated_at: r.get(7)?,
        })
    }

    fn into_model(self) -> Result<Todo> {
        Ok(Todo {
            id: self.id,
            content: self.content,
            category: self.category,
            tags: self.tags,
            deadline: self.deadline.as_deref().map(read_datetime).transpose()?,
            status: self.status,
            created_at: read_datetime(&self.created_at)?,
            updated_at: read_datetime(&self.updated_at)?,
        })
    }
}
