//! Chat groups, membership and messages
//!
//! Membership is a set of `(group_id, user_id)` rows. Member lists and
//! counts are read from it, so repeated or concurrent joins cannot inflate
//! them. Sending a message is a single transaction covering the membership
//! upsert, the message row and the group's last-message summary.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::{
    models::chat::{ChatGroup, ChatMessage, NewChatGroup},
    session::Session,
};

const GROUP_SELECT: &str = r#"
    SELECT g.id, g.name, g.description, g.category, g.icon, g.creator_id, g.creator_name,
           g.last_message, g.last_message_at, g.active, g.created_at, g.updated_at,
           COALESCE(
               array_agg(m.user_id ORDER BY m.joined_at) FILTER (WHERE m.user_id IS NOT NULL),
               '{}'::uuid[]
           ) AS member_ids
    FROM chat_grupos g
    LEFT JOIN chat_grupos_membros m ON m.group_id = g.id
"#;

const MESSAGE_COLUMNS: &str = "id, group_id, text, sender_id, sender_name, sender_photo_url, sent_at";

/// Result of a send attempt
#[derive(Debug)]
pub enum SendOutcome {
    Sent(ChatMessage),
    GroupNotFound,
    GroupInactive,
}

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_group(row: &PgRow) -> ChatGroup {
        let member_ids: Vec<Uuid> = row.get("member_ids");
        ChatGroup {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            category: row.get("category"),
            icon: row.get("icon"),
            creator_id: row.get("creator_id"),
            creator_name: row.get("creator_name"),
            member_count: member_ids.len(),
            member_ids,
            last_message: row.get("last_message"),
            last_message_at: row.get("last_message_at"),
            active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn map_message(row: &PgRow) -> ChatMessage {
        ChatMessage {
            id: row.get("id"),
            group_id: row.get("group_id"),
            text: row.get("text"),
            sender_id: row.get("sender_id"),
            sender_name: row.get("sender_name"),
            sender_photo_url: row.get("sender_photo_url"),
            sent_at: row.get("sent_at"),
        }
    }

    /// Active groups, most recently talked-in first
    pub async fn list_active_groups(&self) -> Result<Vec<ChatGroup>> {
        let rows = sqlx::query(&format!(
            "{} WHERE g.active GROUP BY g.id ORDER BY g.last_message_at DESC NULLS LAST, g.created_at DESC",
            GROUP_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_group).collect())
    }

    pub async fn list_all_groups(&self) -> Result<Vec<ChatGroup>> {
        let rows = sqlx::query(&format!(
            "{} GROUP BY g.id ORDER BY g.created_at DESC",
            GROUP_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_group).collect())
    }

    pub async fn find_group(&self, id: Uuid) -> Result<Option<ChatGroup>> {
        let row = sqlx::query(&format!("{} WHERE g.id = $1 GROUP BY g.id", GROUP_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::map_group))
    }

    /// Create a group with its creator as the first member
    pub async fn create_group(&self, creator: &Session, group: &NewChatGroup) -> Result<ChatGroup> {
        info!("Creating chat group '{}' for {}", group.name, creator.user_id);

        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO chat_grupos (name, description, category, icon, creator_id, creator_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.category)
        .bind(&group.icon)
        .bind(creator.user_id)
        .bind(&creator.display_name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO chat_grupos_membros (group_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(creator.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_group(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Chat group {} vanished after creation", id))
    }

    /// Idempotent join; true when the caller was not a member yet
    pub async fn join(&self, group_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_grupos_membros (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Messages oldest first
    pub async fn list_messages(&self, group_id: Uuid) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM mensagens WHERE group_id = $1 ORDER BY sent_at ASC, id ASC",
            MESSAGE_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_message).collect())
    }

    /// Append a message and update the group summary atomically
    ///
    /// `text` must already be validated.
    pub async fn send_message(
        &self,
        group_id: Uuid,
        sender: &Session,
        text: &str,
    ) -> Result<SendOutcome> {
        let mut tx = self.pool.begin().await?;

        let active: Option<bool> =
            sqlx::query_scalar("SELECT active FROM chat_grupos WHERE id = $1")
                .bind(group_id)
                .fetch_optional(&mut *tx)
                .await?;

        match active {
            None => return Ok(SendOutcome::GroupNotFound),
            Some(false) => return Ok(SendOutcome::GroupInactive),
            Some(true) => {}
        }

        sqlx::query(
            r#"
            INSERT INTO chat_grupos_membros (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(sender.user_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO mensagens (group_id, text, sender_id, sender_name, sender_photo_url)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(group_id)
        .bind(text)
        .bind(sender.user_id)
        .bind(&sender.display_name)
        .fetch_one(&mut *tx)
        .await?;

        let message = Self::map_message(&row);

        sqlx::query(
            r#"
            UPDATE chat_grupos
            SET last_message = $2, last_message_at = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(group_id)
        .bind(&message.text)
        .bind(message.sent_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SendOutcome::Sent(message))
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<ChatGroup>> {
        let updated = sqlx::query(
            "UPDATE chat_grupos SET active = NOT active, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_group(id).await
    }

    /// Deleting a group cascades to its members and messages
    pub async fn delete_group(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chat_grupos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
