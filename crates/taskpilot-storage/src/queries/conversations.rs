// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations, all scoped by owner.

use rusqlite::params;
use taskpilot_core::TaskpilotError;

use crate::database::Database;
use crate::models::Conversation;

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Insert a new conversation.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), TaskpilotError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, owner_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation.id,
                    conversation.owner_id,
                    conversation.title,
                    conversation.created_at,
                    conversation.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by id, scoped to its owner. A foreign-owned
/// conversation is indistinguishable from an absent one.
pub async fn get_conversation(
    db: &Database,
    owner_id: &str,
    conversation_id: &str,
) -> Result<Option<Conversation>, TaskpilotError> {
    let owner_id = owner_id.to_string();
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, title, created_at, updated_at
                 FROM conversations WHERE id = ?1 AND owner_id = ?2",
            )?;
            let result = stmt.query_row(params![conversation_id, owner_id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump `updated_at`, setting the title only if it is still unset.
pub async fn touch_conversation(
    db: &Database,
    owner_id: &str,
    conversation_id: &str,
    title: Option<&str>,
    updated_at: &str,
) -> Result<(), TaskpilotError> {
    let owner_id = owner_id.to_string();
    let conversation_id = conversation_id.to_string();
    let title = title.map(|t| t.to_string());
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET updated_at = ?1, title = COALESCE(title, ?2)
                 WHERE id = ?3 AND owner_id = ?4",
                params![updated_at, title, conversation_id, owner_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
