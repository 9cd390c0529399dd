// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task CRUD operations, all scoped by owner.

use rusqlite::params;
use taskpilot_core::TaskpilotError;
use taskpilot_core::types::TaskStatus;

use crate::database::Database;
use crate::models::Task;

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, status, priority, created_at, updated_at, completed_at";

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row
            .get::<_, String>(4)?
            .parse()
            .map_err(|_| bad_text_column(4, "status"))?,
        priority: row
            .get::<_, String>(5)?
            .parse()
            .map_err(|_| bad_text_column(5, "priority"))?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

fn bad_text_column(idx: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, name.to_string(), rusqlite::types::Type::Text)
}

/// Insert a new task.
pub async fn create_task(db: &Database, task: &Task) -> Result<(), TaskpilotError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, owner_id, title, description, status, priority, created_at, updated_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    task.id,
                    task.owner_id,
                    task.title,
                    task.description,
                    task.status.to_string(),
                    task.priority.to_string(),
                    task.created_at,
                    task.updated_at,
                    task.completed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a task by id, scoped to its owner. A task owned by someone else is
/// indistinguishable from an absent one.
pub async fn get_task(
    db: &Database,
    owner_id: &str,
    task_id: &str,
) -> Result<Option<Task>, TaskpilotError> {
    let owner_id = owner_id.to_string();
    let task_id = task_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner_id = ?2"
            ))?;
            let result = stmt.query_row(params![task_id, owner_id], row_to_task);
            match result {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List the owner's tasks, newest first, optionally filtered by status.
pub async fn list_tasks(
    db: &Database,
    owner_id: &str,
    status: Option<TaskStatus>,
) -> Result<Vec<Task>, TaskpilotError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut tasks = Vec::new();
            match status {
                Some(filter) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {TASK_COLUMNS} FROM tasks
                         WHERE owner_id = ?1 AND status = ?2
                         ORDER BY created_at DESC, id DESC"
                    ))?;
                    let rows = stmt.query_map(params![owner_id, filter.to_string()], row_to_task)?;
                    for row in rows {
                        tasks.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {TASK_COLUMNS} FROM tasks
                         WHERE owner_id = ?1
                         ORDER BY created_at DESC, id DESC"
                    ))?;
                    let rows = stmt.query_map(params![owner_id], row_to_task)?;
                    for row in rows {
                        tasks.push(row?);
                    }
                }
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Write back a full task row. Returns false when no row matched the
/// (id, owner_id) pair.
pub async fn update_task(db: &Database, task: &Task) -> Result<bool, TaskpilotError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE tasks
                 SET title = ?1, description = ?2, status = ?3, priority = ?4,
                     updated_at = ?5, completed_at = ?6
                 WHERE id = ?7 AND owner_id = ?8",
                params![
                    task.title,
                    task.description,
                    task.status.to_string(),
                    task.priority.to_string(),
                    task.updated_at,
                    task.completed_at,
                    task.id,
                    task.owner_id,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a task. Returns false when no row matched the (id, owner_id) pair.
pub async fn delete_task(
    db: &Database,
    owner_id: &str,
    task_id: &str,
) -> Result<bool, TaskpilotError> {
    let owner_id = owner_id.to_string();
    let task_id = task_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2",
                params![task_id, owner_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
