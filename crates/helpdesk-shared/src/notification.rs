//! Notifications produced as side effects of lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Role;

/// Severity tag shown next to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Stored notification addressed to one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

/// Who a draft is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "value", rename_all = "snake_case")]
pub enum Recipient {
    User(String),
    /// Every user holding the role
    Role(Role),
}

/// Notification computed by a rule, not yet addressed to concrete users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl NotificationDraft {
    pub fn to_user(user_id: &str, title: &str, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::User(user_id.to_string()),
            title: title.to_string(),
            message: message.into(),
            kind: NotificationKind::Info,
            link: None,
        }
    }

    pub fn to_role(role: Role, title: &str, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Role(role),
            title: title.to_string(),
            message: message.into(),
            kind: NotificationKind::Info,
            link: None,
        }
    }

    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Materialize for one concrete user
    pub fn deliver_to(&self, user_id: &str, at: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: self.title.clone(),
            message: self.message.clone(),
            kind: self.kind,
            read: false,
            link: self.link.clone(),
            created_at: at,
            version: 0,
        }
    }
}

/// Link to a ticket detail view
pub fn ticket_link(ticket_id: &str) -> String {
    format!("/tickets/{}", ticket_id)
}

/// Link to a work order detail view
pub fn work_order_link(work_order_id: &str) -> String {
    format!("/work-orders/{}", work_order_id)
}
