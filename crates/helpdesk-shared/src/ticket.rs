//! Ticket model: repair requests and meeting bookings.
//!
//! A ticket's variant is fixed at creation. The variant payload carries its
//! own status vocabulary, so a ticket can never hold repair and meeting
//! fields at the same time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::identity::{PersonRef, Requester};
use crate::status::{MeetingStatus, RepairStatus};
use crate::timeline::Timeline;

/// Ticket variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    Perbaikan,
    ZoomMeeting,
}

impl TicketType {
    /// Two-letter code used in ticket numbers
    pub fn code(&self) -> &'static str {
        match self {
            Self::Perbaikan => "PR",
            Self::ZoomMeeting => "ZM",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perbaikan => "perbaikan",
            Self::ZoomMeeting => "zoom_meeting",
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TicketType {
    type Err = crate::error::DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "perbaikan" | "repair" => Ok(Self::Perbaikan),
            "zoom_meeting" | "meeting" => Ok(Self::ZoomMeeting),
            other => Err(crate::error::DeskError::validation(format!(
                "unknown ticket type '{}'",
                other
            ))),
        }
    }
}

/// Repair severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[serde(alias = "rendah")]
    Low,
    #[default]
    #[serde(alias = "sedang")]
    Medium,
    #[serde(alias = "tinggi")]
    High,
    #[serde(alias = "kritis", alias = "urgent")]
    Critical,
}

/// Uploaded file metadata. Binary content is stored elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
}

/// Fields specific to repair tickets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairDetails {
    pub status: RepairStatus,
    #[serde(default)]
    pub priority: Priority,
    pub asset_code: String,
    /// Asset registration number (NUP)
    #[serde(default)]
    pub asset_nup: String,
    #[serde(default)]
    pub location: String,
    /// Final problem classification set during diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repairable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Last reason a technician gave for returning the ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrepairable_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
}

/// Fields specific to meeting bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingDetails {
    pub status: MeetingStatus,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub participants: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_host: Option<String>,
    #[serde(default)]
    pub breakout_rooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Variant payload, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketDetails {
    Perbaikan(RepairDetails),
    ZoomMeeting(MeetingDetails),
}

/// A service desk ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub ticket_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub requester: Requester,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<PersonRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub timeline: Timeline,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub details: TicketDetails,
    /// Optimistic-lock counter, bumped by the repository on every write
    #[serde(default)]
    pub version: u64,
}

impl Ticket {
    pub fn ticket_type(&self) -> TicketType {
        match self.details {
            TicketDetails::Perbaikan(_) => TicketType::Perbaikan,
            TicketDetails::ZoomMeeting(_) => TicketType::ZoomMeeting,
        }
    }

    pub fn repair(&self) -> Option<&RepairDetails> {
        match &self.details {
            TicketDetails::Perbaikan(d) => Some(d),
            TicketDetails::ZoomMeeting(_) => None,
        }
    }

    pub fn repair_mut(&mut self) -> Option<&mut RepairDetails> {
        match &mut self.details {
            TicketDetails::Perbaikan(d) => Some(d),
            TicketDetails::ZoomMeeting(_) => None,
        }
    }

    pub fn meeting(&self) -> Option<&MeetingDetails> {
        match &self.details {
            TicketDetails::ZoomMeeting(d) => Some(d),
            TicketDetails::Perbaikan(_) => None,
        }
    }

    pub fn meeting_mut(&mut self) -> Option<&mut MeetingDetails> {
        match &mut self.details {
            TicketDetails::ZoomMeeting(d) => Some(d),
            TicketDetails::Perbaikan(_) => None,
        }
    }

    /// Canonical status name regardless of variant
    pub fn status_label(&self) -> &'static str {
        match &self.details {
            TicketDetails::Perbaikan(d) => d.status.as_str(),
            TicketDetails::ZoomMeeting(d) => d.status.as_str(),
        }
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_to
            .as_ref()
            .map(|p| p.id == user_id)
            .unwrap_or(false)
    }

    pub fn is_requested_by(&self, user_id: &str) -> bool {
        self.requester.id == user_id
    }
}
