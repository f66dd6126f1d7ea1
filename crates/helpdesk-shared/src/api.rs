//! Response bodies shared by the daemon's HTTP API and the CLI.

use serde::{Deserialize, Serialize};

use crate::error::DeskError;
use crate::notification::Notification;

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Machine-readable class, see [`DeskError::kind`]
    pub kind: String,
}

impl From<&DeskError> for ErrorBody {
    fn from(err: &DeskError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

/// Collection sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskCounts {
    pub users: usize,
    pub tickets: usize,
    pub open_tickets: usize,
    pub work_orders: usize,
    pub zoom_accounts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub counts: DeskCounts,
}

/// A user's inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationFeed {
    pub unread: usize,
    /// Newest first
    pub notifications: Vec<Notification>,
}

/// Result of a bulk mark-read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkedRead {
    pub marked: usize,
}
