//! Append-only audit trail attached to tickets and work orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Actor;

/// One immutable history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Action tag, e.g. "approved", "work_order_delivered"
    pub action: String,
    /// Display name of the actor
    pub actor: String,
    pub details: String,
}

/// Ordered event history. Entries can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline(Vec<TimelineEvent>);

impl Timeline {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an event. Timestamps never go backwards relative to the
    /// previous entry.
    pub fn record(
        &mut self,
        action: &str,
        actor: &Actor,
        details: impl Into<String>,
        at: DateTime<Utc>,
    ) -> &TimelineEvent {
        let timestamp = match self.0.last() {
            Some(prev) if prev.timestamp > at => prev.timestamp,
            _ => at,
        };
        self.0.push(TimelineEvent {
            id: Uuid::new_v4().to_string(),
            timestamp,
            action: action.to_string(),
            actor: actor.name.clone(),
            details: details.into(),
        });
        &self.0[self.0.len() - 1]
    }

    pub fn entries(&self) -> &[TimelineEvent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&TimelineEvent> {
        self.0.last()
    }

    pub fn actions(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.action.as_str()).collect()
    }
}
