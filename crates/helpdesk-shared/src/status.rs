//! Canonical status vocabularies.
//!
//! Persisted records from older deployments carry Indonesian status names
//! (`menunggu_review`, `ditugaskan`, `selesai`, ...). Each enum parses both
//! the canonical name and its legacy aliases, and always writes the
//! canonical name back.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DeskError;

/// Repair ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RepairStatus {
    Submitted,
    /// Approved by admin, no technician yet
    Approved,
    Rejected,
    Assigned,
    InProgress,
    /// Waiting on a work order
    OnHold,
    Resolved,
    WaitingForUser,
    Closed,
    ClosedUnrepairable,
}

/// Legacy repair status names and their canonical equivalent
pub const LEGACY_REPAIR_STATUSES: &[(&str, RepairStatus)] = &[
    ("menunggu_review", RepairStatus::Submitted),
    ("diajukan", RepairStatus::Submitted),
    ("pending", RepairStatus::Submitted),
    ("disetujui", RepairStatus::Approved),
    ("ditolak", RepairStatus::Rejected),
    ("ditugaskan", RepairStatus::Assigned),
    ("diterima_teknisi", RepairStatus::InProgress),
    ("dalam_perbaikan", RepairStatus::InProgress),
    ("sedang_diperbaiki", RepairStatus::InProgress),
    ("menunggu_sparepart", RepairStatus::OnHold),
    ("pending_sparepart", RepairStatus::OnHold),
    ("menunggu_work_order", RepairStatus::OnHold),
    ("selesai_diperbaiki", RepairStatus::Resolved),
    ("menunggu_konfirmasi", RepairStatus::WaitingForUser),
    ("selesai", RepairStatus::Closed),
    ("tidak_dapat_diperbaiki", RepairStatus::ClosedUnrepairable),
    ("tidak_bisa_diperbaiki", RepairStatus::ClosedUnrepairable),
];

impl RepairStatus {
    pub const ALL: [RepairStatus; 10] = [
        Self::Submitted,
        Self::Approved,
        Self::Rejected,
        Self::Assigned,
        Self::InProgress,
        Self::OnHold,
        Self::Resolved,
        Self::WaitingForUser,
        Self::Closed,
        Self::ClosedUnrepairable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Resolved => "resolved",
            Self::WaitingForUser => "waiting_for_user",
            Self::Closed => "closed",
            Self::ClosedUnrepairable => "closed_unrepairable",
        }
    }

    /// No further transitions possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Closed | Self::ClosedUnrepairable
        )
    }
}

impl FromStr for RepairStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|st| st.as_str() == s)
            .or_else(|| {
                LEGACY_REPAIR_STATUSES
                    .iter()
                    .find(|(legacy, _)| *legacy == s)
                    .map(|(_, st)| st)
            })
            .copied()
            .ok_or_else(|| DeskError::validation(format!("unknown repair status '{}'", s)))
    }
}

/// Meeting booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MeetingStatus {
    PendingReview,
    Approved,
    Rejected,
}

pub const LEGACY_MEETING_STATUSES: &[(&str, MeetingStatus)] = &[
    ("menunggu_review", MeetingStatus::PendingReview),
    ("pending", MeetingStatus::PendingReview),
    ("submitted", MeetingStatus::PendingReview),
    ("disetujui", MeetingStatus::Approved),
    ("ditolak", MeetingStatus::Rejected),
];

impl MeetingStatus {
    pub const ALL: [MeetingStatus; 3] = [Self::PendingReview, Self::Approved, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PendingReview)
    }
}

impl FromStr for MeetingStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|st| st.as_str() == s)
            .or_else(|| {
                LEGACY_MEETING_STATUSES
                    .iter()
                    .find(|(legacy, _)| *legacy == s)
                    .map(|(_, st)| st)
            })
            .copied()
            .ok_or_else(|| DeskError::validation(format!("unknown meeting status '{}'", s)))
    }
}

/// Work order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WorkOrderStatus {
    Requested,
    InProcurement,
    /// Sparepart received
    Delivered,
    /// Vendor job finished
    Completed,
    Failed,
    Cancelled,
}

pub const LEGACY_WORK_ORDER_STATUSES: &[(&str, WorkOrderStatus)] = &[
    ("pending", WorkOrderStatus::Requested),
    ("diminta", WorkOrderStatus::Requested),
    ("in_progress", WorkOrderStatus::InProcurement),
    ("diproses", WorkOrderStatus::InProcurement),
    ("dalam_pengadaan", WorkOrderStatus::InProcurement),
    ("diterima", WorkOrderStatus::Delivered),
    ("selesai", WorkOrderStatus::Completed),
    ("gagal", WorkOrderStatus::Failed),
    ("dibatalkan", WorkOrderStatus::Cancelled),
    ("canceled", WorkOrderStatus::Cancelled),
];

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 6] = [
        Self::Requested,
        Self::InProcurement,
        Self::Delivered,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::InProcurement => "in_procurement",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Requested | Self::InProcurement)
    }

    /// Terminal with the part or service actually provided
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Delivered | Self::Completed)
    }
}

impl FromStr for WorkOrderStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|st| st.as_str() == s)
            .or_else(|| {
                LEGACY_WORK_ORDER_STATUSES
                    .iter()
                    .find(|(legacy, _)| *legacy == s)
                    .map(|(_, st)| st)
            })
            .copied()
            .ok_or_else(|| DeskError::validation(format!("unknown work order status '{}'", s)))
    }
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for RepairStatus {
    type Error = DeskError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for MeetingStatus {
    type Error = DeskError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for WorkOrderStatus {
    type Error = DeskError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepairStatus> for String {
    fn from(value: RepairStatus) -> Self {
        value.as_str().to_string()
    }
}

impl From<MeetingStatus> for String {
    fn from(value: MeetingStatus) -> Self {
        value.as_str().to_string()
    }
}

impl From<WorkOrderStatus> for String {
    fn from(value: WorkOrderStatus) -> Self {
        value.as_str().to_string()
    }
}
