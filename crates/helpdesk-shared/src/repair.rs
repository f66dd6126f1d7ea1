//! Repair ticket lifecycle.
//!
//! ```text
//! submitted -> approved -> assigned -> in_progress <-> on_hold
//!     |           ^            |          |
//!     v           +- declined -+          +-> closed_unrepairable
//!  rejected                               v
//!                                     resolved -> waiting_for_user -> closed
//!                                         +---------------------------^
//! ```
//!
//! Every legal step appends exactly one timeline event. Every rejected step
//! leaves the ticket untouched: all checks run before the first write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DeskError, DeskResult};
use crate::identity::{Actor, Role, User, UserLookup};
use crate::notification::{ticket_link, NotificationDraft, NotificationKind};
use crate::status::{RepairStatus, WorkOrderStatus};
use crate::ticket::{Attachment, Priority, RepairDetails, Ticket, TicketDetails, TicketType};
use crate::ticket_number;
use crate::timeline::Timeline;
use crate::transition::{optional_text, require_text, Transition};
use crate::work_order::WorkOrder;

/// Repair request as submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRepairTicket {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub asset_code: String,
    #[serde(default)]
    pub asset_nup: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NewRepairTicket {
    pub fn validate(&self) -> DeskResult<()> {
        require_text("title", &self.title)?;
        require_text("asset code", &self.asset_code)?;
        Ok(())
    }
}

/// Build a `submitted` repair ticket. Admins are told a new ticket waits
/// for review.
pub fn submit(
    req: NewRepairTicket,
    requester: &User,
    now: DateTime<Utc>,
) -> DeskResult<(Ticket, Vec<NotificationDraft>)> {
    req.validate()?;

    let id = Uuid::new_v4().to_string();
    let number = ticket_number::generate(TicketType::Perbaikan, now.date_naive());
    let mut timeline = Timeline::new();
    timeline.record(
        "created",
        &requester.actor(),
        format!("Repair request {} submitted", number),
        now,
    );

    let ticket = Ticket {
        id: id.clone(),
        ticket_number: number.clone(),
        title: req.title.trim().to_string(),
        description: req.description,
        requester: requester.requester(),
        assigned_to: None,
        created_at: now,
        updated_at: now,
        timeline,
        attachments: req.attachments,
        details: TicketDetails::Perbaikan(RepairDetails {
            status: RepairStatus::Submitted,
            priority: req.priority,
            asset_code: req.asset_code.trim().to_string(),
            asset_nup: req.asset_nup,
            location: req.location,
            problem_type: None,
            repairable: None,
            work_order_id: None,
            rejection_reason: None,
            decline_reason: None,
            unrepairable_reason: None,
            resolution_notes: None,
        }),
        version: 0,
    };

    let notice = NotificationDraft::to_role(
        Role::AdminLayanan,
        "New repair request",
        format!("{} submitted {}: {}", requester.name, number, ticket.title),
    )
    .link(ticket_link(&id));

    Ok((ticket, vec![notice]))
}

/// Actions on a repair ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    Approve {
        #[serde(default)]
        notes: Option<String>,
    },
    Reject {
        reason: String,
    },
    Assign {
        technician_id: String,
    },
    Accept,
    /// Technician hands the ticket back to the admin queue
    Decline {
        reason: String,
    },
    /// Diagnosis needs a work order; set by the work order request flow
    Hold {
        work_order_id: String,
        #[serde(default)]
        problem_type: Option<String>,
    },
    Resume {
        #[serde(default)]
        notes: Option<String>,
    },
    Resolve {
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        problem_type: Option<String>,
    },
    MarkUnrepairable {
        reason: String,
        #[serde(default)]
        problem_type: Option<String>,
    },
    /// Ask the requester to collect the repaired asset
    AwaitUser {
        #[serde(default)]
        notes: Option<String>,
    },
    /// Requester confirms receipt
    Confirm,
}

/// Who may perform an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    AdminLayanan,
    Assignee,
    Requester,
}

impl RepairAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::Assign { .. } => "assign",
            Self::Accept => "accept",
            Self::Decline { .. } => "decline",
            Self::Hold { .. } => "hold",
            Self::Resume { .. } => "resume",
            Self::Resolve { .. } => "resolve",
            Self::MarkUnrepairable { .. } => "mark_unrepairable",
            Self::AwaitUser { .. } => "await_user",
            Self::Confirm => "confirm",
        }
    }

    /// Statuses this action may start from
    pub fn allowed_from(&self) -> &'static [RepairStatus] {
        use RepairStatus::*;
        match self {
            Self::Approve { .. } | Self::Reject { .. } => &[Submitted],
            Self::Assign { .. } => &[Approved],
            Self::Accept | Self::Decline { .. } => &[Assigned],
            Self::Hold { .. } | Self::Resolve { .. } | Self::MarkUnrepairable { .. } => {
                &[InProgress]
            }
            Self::Resume { .. } => &[OnHold],
            Self::AwaitUser { .. } => &[Resolved],
            Self::Confirm => &[Resolved, WaitingForUser],
        }
    }

    pub fn target(&self) -> RepairStatus {
        use RepairStatus::*;
        match self {
            Self::Approve { .. } => Approved,
            Self::Reject { .. } => Rejected,
            Self::Assign { .. } => Assigned,
            Self::Accept => InProgress,
            Self::Decline { .. } => Approved,
            Self::Hold { .. } => OnHold,
            Self::Resume { .. } => InProgress,
            Self::Resolve { .. } => Resolved,
            Self::MarkUnrepairable { .. } => ClosedUnrepairable,
            Self::AwaitUser { .. } => WaitingForUser,
            Self::Confirm => Closed,
        }
    }

    fn gate(&self) -> Gate {
        match self {
            Self::Approve { .. } | Self::Reject { .. } | Self::Assign { .. } => Gate::AdminLayanan,
            Self::Confirm => Gate::Requester,
            _ => Gate::Assignee,
        }
    }
}

/// True when the (status, action, actor) triple is legal, ignoring payload
pub fn is_permitted(ticket: &Ticket, action: &RepairAction, actor: &Actor) -> bool {
    check_status(ticket, action).is_ok() && authorize(ticket, action, actor).is_ok()
}

fn check_status(ticket: &Ticket, action: &RepairAction) -> DeskResult<RepairStatus> {
    let details = ticket.repair().ok_or_else(|| {
        DeskError::invalid_transition("ticket", ticket.ticket_type(), action.name())
    })?;
    if !action.allowed_from().contains(&details.status) {
        return Err(DeskError::invalid_transition(
            format!("ticket {}", ticket.ticket_number),
            details.status,
            action.name(),
        ));
    }
    Ok(details.status)
}

fn authorize(ticket: &Ticket, action: &RepairAction, actor: &Actor) -> DeskResult<()> {
    match action.gate() {
        Gate::AdminLayanan => {
            if !actor.has_role(Role::AdminLayanan) {
                return Err(DeskError::forbidden(format!(
                    "only admin_layanan may {} a repair ticket",
                    action.name()
                )));
            }
        }
        Gate::Assignee => {
            if !actor.has_role(Role::Teknisi) || !ticket.is_assigned_to(&actor.id) {
                return Err(DeskError::forbidden(format!(
                    "only the assigned technician may {} ticket {}",
                    action.name(),
                    ticket.ticket_number
                )));
            }
        }
        Gate::Requester => {
            if !ticket.is_requested_by(&actor.id) {
                return Err(DeskError::forbidden(format!(
                    "only the requester may {} ticket {}",
                    action.name(),
                    ticket.ticket_number
                )));
            }
        }
    }
    Ok(())
}

/// A held ticket may be resumed by hand only once its work order is
/// abandoned (failed or cancelled)
fn check_manual_resume(ticket: &Ticket, work_order: Option<&WorkOrder>) -> DeskResult<()> {
    let Some(expected) = ticket.repair().and_then(|d| d.work_order_id.as_deref()) else {
        return Ok(());
    };
    let status = match work_order {
        Some(order) if order.id == expected => order.status,
        _ => {
            return Err(DeskError::invalid_transition(
                format!(
                    "ticket {} (work order {} unknown)",
                    ticket.ticket_number, expected
                ),
                RepairStatus::OnHold,
                "resume",
            ))
        }
    };
    if !matches!(status, WorkOrderStatus::Failed | WorkOrderStatus::Cancelled) {
        return Err(DeskError::invalid_transition(
            format!(
                "ticket {} (work order {} is {})",
                ticket.ticket_number, expected, status
            ),
            RepairStatus::OnHold,
            "resume",
        ));
    }
    Ok(())
}

/// Apply an action. On error the ticket is unchanged.
///
/// A ticket waiting on a work order can only be resumed through
/// [`apply_with_work_order`]; here `resume` is limited to tickets with no
/// order attached.
pub fn apply(
    ticket: &mut Ticket,
    action: &RepairAction,
    actor: &Actor,
    users: &dyn UserLookup,
    now: DateTime<Utc>,
) -> DeskResult<Transition> {
    apply_with_work_order(ticket, action, actor, users, None, now)
}

/// Apply an action, given the work order the ticket is holding for (if
/// any). A manual `resume` needs that order to have failed or been
/// cancelled; a fulfilled order resumes the ticket through
/// [`resume_after_work_order`] instead.
pub fn apply_with_work_order(
    ticket: &mut Ticket,
    action: &RepairAction,
    actor: &Actor,
    users: &dyn UserLookup,
    work_order: Option<&WorkOrder>,
    now: DateTime<Utc>,
) -> DeskResult<Transition> {
    let from = check_status(ticket, action)?;
    authorize(ticket, action, actor)?;
    if matches!(action, RepairAction::Resume { .. }) {
        check_manual_resume(ticket, work_order)?;
    }

    let to = action.target();
    let number = ticket.ticket_number.clone();
    let link = ticket_link(&ticket.id);
    let requester_id = ticket.requester.id.clone();
    let mut transition = Transition::new(from, to, "");
    let mut new_assignee = None;

    // Validate payload and compute the timeline entry before touching state
    let (tag, details): (&str, String) = match action {
        RepairAction::Approve { notes } => {
            transition = transition.notify(
                NotificationDraft::to_user(
                    &requester_id,
                    "Repair request approved",
                    format!("{} was approved and awaits a technician", number),
                )
                .kind(NotificationKind::Success)
                .link(link.clone()),
            );
            let details = match optional_text(notes) {
                Some(n) => format!("Approved by {}: {}", actor.name, n),
                None => format!("Approved by {}", actor.name),
            };
            ("approved", details)
        }
        RepairAction::Reject { reason } => {
            let reason = require_text("rejection reason", reason)?;
            transition = transition.notify(
                NotificationDraft::to_user(
                    &requester_id,
                    "Repair request rejected",
                    format!("{} was rejected: {}", number, reason),
                )
                .kind(NotificationKind::Error)
                .link(link.clone()),
            );
            ("rejected", format!("Rejected: {}", reason))
        }
        RepairAction::Assign { technician_id } => {
            let technician_id = require_text("technician", technician_id)?;
            let technician = users.find_user(&technician_id).ok_or_else(|| {
                DeskError::validation(format!("unknown technician '{}'", technician_id))
            })?;
            if !technician.has_role(Role::Teknisi) {
                return Err(DeskError::validation(format!(
                    "{} is not a technician",
                    technician.name
                )));
            }
            new_assignee = Some(technician.person_ref());
            transition = transition
                .notify(
                    NotificationDraft::to_user(
                        &technician.id,
                        "New repair assignment",
                        format!("{} was assigned to you", number),
                    )
                    .link(link.clone()),
                )
                .notify(
                    NotificationDraft::to_user(
                        &requester_id,
                        "Technician assigned",
                        format!("{} will handle {}", technician.name, number),
                    )
                    .link(link.clone()),
                );
            ("assigned", format!("Assigned to {}", technician.name))
        }
        RepairAction::Accept => {
            transition = transition.notify(
                NotificationDraft::to_user(
                    &requester_id,
                    "Repair started",
                    format!("{} accepted {} and started work", actor.name, number),
                )
                .link(link.clone()),
            );
            ("accepted", format!("{} accepted the assignment", actor.name))
        }
        RepairAction::Decline { reason } => {
            let reason = require_text("decline reason", reason)?;
            transition = transition.notify(
                NotificationDraft::to_role(
                    Role::AdminLayanan,
                    "Assignment declined",
                    format!("{} declined {}: {}", actor.name, number, reason),
                )
                .kind(NotificationKind::Warning)
                .link(link.clone()),
            );
            ("declined", format!("Returned to admin: {}", reason))
        }
        RepairAction::Hold { work_order_id, .. } => {
            let work_order_id = require_text("work order", work_order_id)?;
            transition = transition.notify(
                NotificationDraft::to_user(
                    &requester_id,
                    "Repair on hold",
                    format!("{} is waiting for a work order", number),
                )
                .kind(NotificationKind::Warning)
                .link(link.clone()),
            );
            (
                "on_hold",
                format!("Waiting for work order {}", work_order_id),
            )
        }
        RepairAction::Resume { notes } => {
            let details = match optional_text(notes) {
                Some(n) => format!("Work resumed: {}", n),
                None => "Work resumed".to_string(),
            };
            ("resumed", details)
        }
        RepairAction::Resolve { notes, .. } => {
            transition = transition.notify(
                NotificationDraft::to_user(
                    &requester_id,
                    "Repair finished",
                    format!("{} is repaired, please confirm receipt", number),
                )
                .kind(NotificationKind::Success)
                .link(link.clone()),
            );
            let details = match optional_text(notes) {
                Some(n) => format!("Repair completed: {}", n),
                None => "Repair completed".to_string(),
            };
            ("resolved", details)
        }
        RepairAction::MarkUnrepairable { reason, .. } => {
            let reason = require_text("unrepairable reason", reason)?;
            transition = transition
                .notify(
                    NotificationDraft::to_user(
                        &requester_id,
                        "Asset cannot be repaired",
                        format!("{}: {}", number, reason),
                    )
                    .kind(NotificationKind::Error)
                    .link(link.clone()),
                )
                .notify(
                    NotificationDraft::to_role(
                        Role::AdminLayanan,
                        "Asset declared unrepairable",
                        format!("{} closed as unrepairable: {}", number, reason),
                    )
                    .kind(NotificationKind::Warning)
                    .link(link.clone()),
                );
            ("closed_unrepairable", format!("Unrepairable: {}", reason))
        }
        RepairAction::AwaitUser { notes } => {
            let message = match optional_text(notes) {
                Some(n) => format!("{} is ready for pickup: {}", number, n),
                None => format!("{} is ready for pickup", number),
            };
            transition = transition.notify(
                NotificationDraft::to_user(&requester_id, "Asset ready", message).link(link.clone()),
            );
            ("waiting_for_user", "Waiting for requester to collect".to_string())
        }
        RepairAction::Confirm => {
            if let Some(tech) = &ticket.assigned_to {
                transition = transition.notify(
                    NotificationDraft::to_user(
                        &tech.id,
                        "Ticket closed",
                        format!("{} confirmed receipt of {}", actor.name, number),
                    )
                    .kind(NotificationKind::Success)
                    .link(link.clone()),
                );
            }
            ("closed", format!("{} confirmed receipt", actor.name))
        }
    };

    // Commit
    if let Some(tech) = new_assignee {
        ticket.assigned_to = Some(tech);
    }
    if matches!(action, RepairAction::Decline { .. }) {
        ticket.assigned_to = None;
    }
    if let Some(d) = ticket.repair_mut() {
        d.status = to;
        match action {
            RepairAction::Reject { reason } => d.rejection_reason = Some(reason.trim().to_string()),
            RepairAction::Decline { reason } => d.decline_reason = Some(reason.trim().to_string()),
            RepairAction::Hold {
                work_order_id,
                problem_type,
            } => {
                d.work_order_id = Some(work_order_id.trim().to_string());
                d.repairable = Some(true);
                if let Some(p) = optional_text(problem_type) {
                    d.problem_type = Some(p);
                }
            }
            RepairAction::Resolve {
                notes,
                problem_type,
            } => {
                d.repairable = Some(true);
                d.resolution_notes = optional_text(notes);
                if let Some(p) = optional_text(problem_type) {
                    d.problem_type = Some(p);
                }
            }
            RepairAction::MarkUnrepairable {
                reason,
                problem_type,
            } => {
                d.repairable = Some(false);
                d.unrepairable_reason = Some(reason.trim().to_string());
                if let Some(p) = optional_text(problem_type) {
                    d.problem_type = Some(p);
                }
            }
            _ => {}
        }
    }
    ticket.timeline.record(tag, actor, details, now);
    ticket.updated_at = now;

    transition.action = tag.to_string();
    Ok(transition)
}

/// Cascade from a fulfilled work order: `on_hold` back to `in_progress`,
/// assignee notified. Runs as the system actor.
pub fn resume_after_work_order(
    ticket: &mut Ticket,
    work_order: &WorkOrder,
    now: DateTime<Utc>,
) -> DeskResult<Transition> {
    let details = ticket.repair().ok_or_else(|| {
        DeskError::invalid_transition("ticket", ticket.ticket_type(), "resume")
    })?;
    if details.status != RepairStatus::OnHold {
        return Err(DeskError::invalid_transition(
            format!("ticket {}", ticket.ticket_number),
            details.status,
            "resume",
        ));
    }
    if let Some(expected) = &details.work_order_id {
        if expected != &work_order.id {
            return Err(DeskError::validation(format!(
                "ticket {} waits for work order {}, not {}",
                ticket.ticket_number, expected, work_order.id
            )));
        }
    }

    let from = details.status;
    let mut transition = Transition::new(from, RepairStatus::InProgress, "work_order_fulfilled");
    if let Some(tech) = &ticket.assigned_to {
        transition = transition.notify(
            NotificationDraft::to_user(
                &tech.id,
                "Work order fulfilled",
                format!(
                    "Work order for {} is {}; continue the repair",
                    ticket.ticket_number, work_order.status
                ),
            )
            .kind(NotificationKind::Success)
            .link(ticket_link(&ticket.id)),
        );
    }

    if let Some(d) = ticket.repair_mut() {
        d.status = RepairStatus::InProgress;
    }
    ticket.timeline.record(
        "work_order_fulfilled",
        &Actor::system(),
        format!("Work order {} {}; repair resumed", work_order.id, work_order.status),
        now,
    );
    ticket.updated_at = now;
    Ok(transition)
}
