// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations: append-only inserts and ordered reads.
//!
//! There is no update or delete here on purpose. Messages are immutable
//! once persisted; conversation context is exactly the committed order.

use rusqlite::params;
use taskpilot_core::TaskpilotError;

use crate::database::Database;
use crate::models::Message;

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        owner_id: row.get(2)?,
        role: row.get::<_, String>(3)?.parse().map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "role".to_string(), rusqlite::types::Type::Text)
        })?,
        content: row.get(4)?,
        tool_calls: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, message: &Message) -> Result<(), TaskpilotError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, owner_id, role, content, tool_calls, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    message.id,
                    message.conversation_id,
                    message.owner_id,
                    message.role.to_string(),
                    message.content,
                    message.tool_calls,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation's messages in chronological order, scoped to the
/// owner. Ties on `created_at` break by insertion (rowid) order. With a
/// limit, the most recent `limit` messages are returned, still oldest-first.
pub async fn messages_for_conversation(
    db: &Database,
    owner_id: &str,
    conversation_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>, TaskpilotError> {
    let owner_id = owner_id.to_string();
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, owner_id, role, content, tool_calls, created_at
                         FROM (SELECT rowid AS rid, * FROM messages
                               WHERE conversation_id = ?1 AND owner_id = ?2
                               ORDER BY created_at DESC, rid DESC LIMIT ?3)
                         ORDER BY created_at ASC, rid ASC",
                    )?;
                    let rows =
                        stmt.query_map(params![conversation_id, owner_id, lim], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, owner_id, role, content, tool_calls, created_at
                         FROM messages
                         WHERE conversation_id = ?1 AND owner_id = ?2
                         ORDER BY created_at ASC, rowid ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id, owner_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
