//! Work orders: spare part or vendor procurement unblocking a repair.
//!
//! `requested -> in_procurement -> delivered | completed`, with `failed`
//! and `cancelled` reachable from either open state. Sparepart orders end
//! in `delivered`, vendor orders in `completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DeskError, DeskResult};
use crate::identity::{Actor, PersonRef, Role};
use crate::notification::{work_order_link, NotificationDraft, NotificationKind};
use crate::repair::{self, RepairAction};
use crate::status::WorkOrderStatus;
use crate::ticket::Ticket;
use crate::timeline::Timeline;
use crate::transition::{optional_text, require_text, Transition};

/// Roles allowed to drive procurement
pub const PROCUREMENT_ROLES: &[Role] = &[Role::AdminLayanan, Role::AdminPenyedia];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparepartItem {
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Sub-kind payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkOrderKind {
    Sparepart {
        items: Vec<SparepartItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        received_quantity: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remarks: Option<String>,
    },
    Vendor {
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vendor_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vendor_contact: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completion_notes: Option<String>,
    },
}

impl WorkOrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sparepart { .. } => "sparepart",
            Self::Vendor { .. } => "vendor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub ticket_id: String,
    pub ticket_number: String,
    #[serde(flatten)]
    pub kind: WorkOrderKind,
    pub status: WorkOrderStatus,
    /// Technician who raised the order
    pub requested_by: PersonRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub timeline: Timeline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub version: u64,
}

/// Work order request raised by the assigned technician
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NewWorkOrder {
    Sparepart {
        items: Vec<SparepartItem>,
        #[serde(default)]
        problem_type: Option<String>,
    },
    Vendor {
        description: String,
        #[serde(default)]
        problem_type: Option<String>,
    },
}

impl NewWorkOrder {
    pub fn problem_type(&self) -> Option<String> {
        match self {
            Self::Sparepart { problem_type, .. } | Self::Vendor { problem_type, .. } => {
                optional_text(problem_type)
            }
        }
    }

    pub fn validate(&self) -> DeskResult<()> {
        match self {
            Self::Sparepart { items, .. } => {
                if items.is_empty() {
                    return Err(DeskError::validation("at least one spare part is required"));
                }
                for item in items {
                    require_text("spare part name", &item.name)?;
                    if item.quantity == 0 {
                        return Err(DeskError::validation(format!(
                            "quantity for '{}' must be at least 1",
                            item.name.trim()
                        )));
                    }
                }
            }
            Self::Vendor { description, .. } => {
                require_text("vendor job description", description)?;
            }
        }
        Ok(())
    }
}

/// A requested order plus the hold to apply to its ticket
#[derive(Debug, Clone)]
pub struct WorkOrderRequest {
    pub work_order: WorkOrder,
    pub hold: RepairAction,
    pub notifications: Vec<NotificationDraft>,
}

/// Build a `requested` work order for a repair ticket. Checks that the
/// actor could put the ticket on hold, without changing it.
pub fn request(
    ticket: &Ticket,
    req: NewWorkOrder,
    actor: &Actor,
    now: DateTime<Utc>,
) -> DeskResult<WorkOrderRequest> {
    let id = Uuid::new_v4().to_string();
    let hold = RepairAction::Hold {
        work_order_id: id.clone(),
        problem_type: req.problem_type(),
    };
    if !repair::is_permitted(ticket, &hold, actor) {
        return match ticket.repair() {
            Some(d) if hold.allowed_from().contains(&d.status) => Err(DeskError::forbidden(
                format!(
                    "only the assigned technician may request a work order for {}",
                    ticket.ticket_number
                ),
            )),
            _ => Err(DeskError::invalid_transition(
                format!("ticket {}", ticket.ticket_number),
                ticket.status_label(),
                "request a work order",
            )),
        };
    }
    req.validate()?;

    let kind = match req {
        NewWorkOrder::Sparepart { items, .. } => WorkOrderKind::Sparepart {
            items: items
                .into_iter()
                .map(|i| SparepartItem {
                    name: i.name.trim().to_string(),
                    ..i
                })
                .collect(),
            received_quantity: None,
            remarks: None,
        },
        NewWorkOrder::Vendor { description, .. } => WorkOrderKind::Vendor {
            description: description.trim().to_string(),
            vendor_name: None,
            vendor_contact: None,
            completion_notes: None,
        },
    };

    let mut timeline = Timeline::new();
    timeline.record(
        "created",
        actor,
        format!("{} work order requested for {}", kind.as_str(), ticket.ticket_number),
        now,
    );

    let notifications = vec![
        NotificationDraft::to_role(
            Role::AdminPenyedia,
            "Work order requested",
            format!(
                "{} requested a {} work order for {}",
                actor.name,
                kind.as_str(),
                ticket.ticket_number
            ),
        )
        .link(work_order_link(&id)),
        NotificationDraft::to_role(
            Role::AdminLayanan,
            "Work order requested",
            format!("{} is on hold pending procurement", ticket.ticket_number),
        )
        .link(work_order_link(&id)),
    ];

    let work_order = WorkOrder {
        id,
        ticket_id: ticket.id.clone(),
        ticket_number: ticket.ticket_number.clone(),
        kind,
        status: WorkOrderStatus::Requested,
        requested_by: actor.person_ref(),
        created_at: now,
        updated_at: now,
        timeline,
        failure_reason: None,
        cancel_reason: None,
        version: 0,
    };

    Ok(WorkOrderRequest {
        work_order,
        hold,
        notifications,
    })
}

/// Procurement actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkOrderAction {
    StartProcurement {
        #[serde(default)]
        vendor_name: Option<String>,
        #[serde(default)]
        vendor_contact: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
    MarkDelivered {
        received_quantity: u32,
        #[serde(default)]
        remarks: Option<String>,
    },
    MarkCompleted {
        completion_notes: String,
        #[serde(default)]
        vendor_name: Option<String>,
        #[serde(default)]
        vendor_contact: Option<String>,
    },
    Fail {
        reason: String,
    },
    Cancel {
        reason: String,
    },
}

impl WorkOrderAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartProcurement { .. } => "start_procurement",
            Self::MarkDelivered { .. } => "mark_delivered",
            Self::MarkCompleted { .. } => "mark_completed",
            Self::Fail { .. } => "fail",
            Self::Cancel { .. } => "cancel",
        }
    }

    pub fn allowed_from(&self) -> &'static [WorkOrderStatus] {
        use WorkOrderStatus::*;
        match self {
            Self::StartProcurement { .. } => &[Requested],
            Self::MarkDelivered { .. } | Self::MarkCompleted { .. } => &[InProcurement],
            Self::Fail { .. } | Self::Cancel { .. } => &[Requested, InProcurement],
        }
    }

    pub fn target(&self) -> WorkOrderStatus {
        match self {
            Self::StartProcurement { .. } => WorkOrderStatus::InProcurement,
            Self::MarkDelivered { .. } => WorkOrderStatus::Delivered,
            Self::MarkCompleted { .. } => WorkOrderStatus::Completed,
            Self::Fail { .. } => WorkOrderStatus::Failed,
            Self::Cancel { .. } => WorkOrderStatus::Cancelled,
        }
    }
}

/// Apply a procurement action. On error the work order is unchanged.
pub fn apply(
    order: &mut WorkOrder,
    action: &WorkOrderAction,
    actor: &Actor,
    now: DateTime<Utc>,
) -> DeskResult<Transition> {
    let from = order.status;
    if !action.allowed_from().contains(&from) {
        return Err(DeskError::invalid_transition(
            format!("work order {}", order.id),
            from,
            action.name(),
        ));
    }
    if !actor.has_any_role(PROCUREMENT_ROLES) {
        return Err(DeskError::forbidden(format!(
            "only admin_layanan or admin_penyedia may {} a work order",
            action.name()
        )));
    }
    let kind_mismatch = match (action, &order.kind) {
        (WorkOrderAction::MarkDelivered { .. }, WorkOrderKind::Vendor { .. }) => true,
        (WorkOrderAction::MarkCompleted { .. }, WorkOrderKind::Sparepart { .. }) => true,
        _ => false,
    };
    if kind_mismatch {
        return Err(DeskError::invalid_transition(
            format!("{} work order {}", order.kind.as_str(), order.id),
            from,
            action.name(),
        ));
    }

    let to = action.target();
    let technician = order.requested_by.id.clone();
    let link = work_order_link(&order.id);
    let mut transition = Transition::new(from, to, "");

    let (tag, details) = match action {
        WorkOrderAction::StartProcurement {
            vendor_name, notes, ..
        } => {
            transition = transition.notify(
                NotificationDraft::to_user(
                    &technician,
                    "Procurement started",
                    format!("Work order for {} is being procured", order.ticket_number),
                )
                .link(link.clone()),
            );
            let mut details = "Procurement started".to_string();
            if let Some(v) = optional_text(vendor_name) {
                details.push_str(&format!(" with {}", v));
            }
            if let Some(n) = optional_text(notes) {
                details.push_str(&format!(": {}", n));
            }
            ("in_procurement", details)
        }
        WorkOrderAction::MarkDelivered {
            received_quantity,
            remarks,
        } => {
            if *received_quantity == 0 {
                return Err(DeskError::validation("received quantity must be at least 1"));
            }
            let details = match optional_text(remarks) {
                Some(r) => format!("{} item(s) delivered: {}", received_quantity, r),
                None => format!("{} item(s) delivered", received_quantity),
            };
            ("delivered", details)
        }
        WorkOrderAction::MarkCompleted {
            completion_notes,
            vendor_name,
            ..
        } => {
            let notes = require_text("completion notes", completion_notes)?;
            let known_vendor = match &order.kind {
                WorkOrderKind::Vendor { vendor_name: v, .. } => optional_text(v),
                WorkOrderKind::Sparepart { .. } => None,
            };
            if optional_text(vendor_name).or(known_vendor).is_none() {
                return Err(DeskError::validation(
                    "vendor name is required to complete a vendor work order",
                ));
            }
            ("completed", format!("Vendor work completed: {}", notes))
        }
        WorkOrderAction::Fail { reason } => {
            let reason = require_text("failure reason", reason)?;
            transition = transition.notify(
                NotificationDraft::to_user(
                    &technician,
                    "Work order failed",
                    format!("Work order for {} failed: {}", order.ticket_number, reason),
                )
                .kind(NotificationKind::Error)
                .link(link.clone()),
            );
            ("failed", format!("Failed: {}", reason))
        }
        WorkOrderAction::Cancel { reason } => {
            let reason = require_text("cancellation reason", reason)?;
            transition = transition.notify(
                NotificationDraft::to_user(
                    &technician,
                    "Work order cancelled",
                    format!("Work order for {} was cancelled: {}", order.ticket_number, reason),
                )
                .kind(NotificationKind::Warning)
                .link(link.clone()),
            );
            ("cancelled", format!("Cancelled: {}", reason))
        }
    };

    // Commit
    match (action, &mut order.kind) {
        (
            WorkOrderAction::StartProcurement {
                vendor_name,
                vendor_contact,
                ..
            },
            WorkOrderKind::Vendor {
                vendor_name: name,
                vendor_contact: contact,
                ..
            },
        ) => {
            if let Some(v) = optional_text(vendor_name) {
                *name = Some(v);
            }
            if let Some(c) = optional_text(vendor_contact) {
                *contact = Some(c);
            }
        }
        (
            WorkOrderAction::MarkDelivered {
                received_quantity,
                remarks,
            },
            WorkOrderKind::Sparepart {
                received_quantity: qty,
                remarks: rem,
                ..
            },
        ) => {
            *qty = Some(*received_quantity);
            *rem = optional_text(remarks);
        }
        (
            WorkOrderAction::MarkCompleted {
                completion_notes,
                vendor_name,
                vendor_contact,
            },
            WorkOrderKind::Vendor {
                vendor_name: name,
                vendor_contact: contact,
                completion_notes: notes,
                ..
            },
        ) => {
            if let Some(v) = optional_text(vendor_name) {
                *name = Some(v);
            }
            if let Some(c) = optional_text(vendor_contact) {
                *contact = Some(c);
            }
            *notes = Some(completion_notes.trim().to_string());
        }
        (WorkOrderAction::Fail { reason }, _) => {
            order.failure_reason = Some(reason.trim().to_string());
        }
        (WorkOrderAction::Cancel { reason }, _) => {
            order.cancel_reason = Some(reason.trim().to_string());
        }
        _ => {}
    }
    order.status = to;
    order.timeline.record(tag, actor, details, now);
    order.updated_at = now;

    transition.action = tag.to_string();
    Ok(transition)
}
