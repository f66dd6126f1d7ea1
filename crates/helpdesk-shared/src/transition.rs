//! Outcome of a committed lifecycle step, shared by all state machines.

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, DeskResult};
use crate::notification::NotificationDraft;

/// What a successful transition did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    /// Timeline action tag that was appended
    pub action: String,
    pub notifications: Vec<NotificationDraft>,
}

impl Transition {
    pub fn new(from: impl std::fmt::Display, to: impl std::fmt::Display, action: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            action: action.to_string(),
            notifications: Vec::new(),
        }
    }

    pub fn notify(mut self, draft: NotificationDraft) -> Self {
        self.notifications.push(draft);
        self
    }
}

/// Trimmed non-empty text, or a validation error naming the field
pub fn require_text(field: &str, value: &str) -> DeskResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeskError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional text; blank becomes `None`
pub fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
