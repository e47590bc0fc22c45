//! Chat groups and messages

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::required;

pub const CHAT_CATEGORIES: &[&str] = &[
    "Geral",
    "Cachorros",
    "Gatos",
    "Pássaros",
    "Roedores",
    "Répteis",
    "Peixes",
    "Outros Pets",
];

pub const CHAT_ICONS: &[&str] = &[
    "💬", "🐕", "🐈", "🐦", "🐹", "🐍", "🐠", "🐢", "🌟", "❤️",
];

pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Group with its membership; `member_count` is always `member_ids.len()`
#[derive(Debug, Clone, Serialize)]
pub struct ChatGroup {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub member_ids: Vec<Uuid>,
    pub member_count: usize,
    pub last_message: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatGroup {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChatGroup {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewChatGroup {
    pub fn validate(self) -> Result<Self, String> {
        let category = self.category.unwrap_or_else(|| CHAT_CATEGORIES[0].to_string());
        if !CHAT_CATEGORIES.contains(&category.as_str()) {
            return Err(format!("Unknown category: {}", category));
        }

        let icon = self.icon.unwrap_or_else(|| CHAT_ICONS[0].to_string());
        if !CHAT_ICONS.contains(&icon.as_str()) {
            return Err(format!("Unknown icon: {}", icon));
        }

        Ok(Self {
            name: required(&self.name, "Name")?,
            description: required(&self.description, "Description")?,
            category: Some(category),
            icon: Some(icon),
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub group_id: Uuid,
    pub text: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_photo_url: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub text: String,
}

/// Trimmed message text, rejecting blank and oversized messages
pub fn validate_message_text(text: &str) -> Result<String, String> {
    let text = text.trim();

    if text.is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LENGTH
        ));
    }

    Ok(text.to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    /// Caller's offset from UTC in minutes, east positive (UTC-3 is -180)
    pub tz_offset_minutes: Option<i32>,
}

impl MessageQuery {
    pub fn offset(&self) -> Result<FixedOffset, String> {
        let minutes = self.tz_offset_minutes.unwrap_or(0);
        FixedOffset::east_opt(minutes.saturating_mul(60))
            .filter(|_| minutes.abs() <= 14 * 60)
            .ok_or_else(|| format!("Invalid timezone offset: {}", minutes))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub label: String,
    pub date: NaiveDate,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
    pub days: Vec<DayGroup>,
}

pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%d/%m/%Y").to_string()
    }
}

/// Split an ascending message list into local calendar days
pub fn group_by_day(
    messages: &[ChatMessage],
    offset: FixedOffset,
    today: NaiveDate,
) -> Vec<DayGroup> {
    let mut days: Vec<DayGroup> = Vec::new();

    for message in messages {
        let date = message.sent_at.with_timezone(&offset).date_naive();

        match days.last_mut() {
            Some(group) if group.date == date => group.messages.push(message.clone()),
            _ => days.push(DayGroup {
                label: day_label(date, today),
                date,
                messages: vec![message.clone()],
            }),
        }
    }

    days
}

impl MessagesResponse {
    pub fn new(messages: Vec<ChatMessage>, offset: FixedOffset, now: DateTime<Utc>) -> Self {
        let today = now.with_timezone(&offset).date_naive();
        let days = group_by_day(&messages, offset, today);
        Self { messages, days }
    }
}
