//! Ticket submission, queries and lifecycle actions.

use super::Desk;
use chrono::Utc;
use helpdesk_shared::booking::{self, MeetingAction, NewMeetingTicket};
use helpdesk_shared::repair::{self, NewRepairTicket, RepairAction};
use helpdesk_shared::{
    DeskError, DeskResult, MeetingStatus, RepairStatus, Ticket, TicketType,
};
use tracing::info;

/// Ticket list filter; every set field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    pub ticket_type: Option<TicketType>,
    /// Canonical or legacy status name of either vocabulary
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub requester: Option<String>,
}

impl TicketFilter {
    /// Build from raw query values, rejecting unknown type or status names
    pub fn parse(
        ticket_type: Option<&str>,
        status: Option<&str>,
        assignee: Option<&str>,
        requester: Option<&str>,
    ) -> DeskResult<Self> {
        let ticket_type = ticket_type.map(str::parse::<TicketType>).transpose()?;
        if let Some(s) = status {
            let known = s.parse::<RepairStatus>().is_ok() || s.parse::<MeetingStatus>().is_ok();
            if !known {
                return Err(DeskError::validation(format!("unknown status '{}'", s)));
            }
        }
        Ok(Self {
            ticket_type,
            status: status.map(str::to_string),
            assignee: assignee.map(str::to_string),
            requester: requester.map(str::to_string),
        })
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(t) = self.ticket_type {
            if ticket.ticket_type() != t {
                return false;
            }
        }
        if let Some(status) = &self.status {
            let hit = match (ticket.repair(), ticket.meeting()) {
                (Some(d), _) => status.parse::<RepairStatus>().ok() == Some(d.status),
                (_, Some(m)) => status.parse::<MeetingStatus>().ok() == Some(m.status),
                _ => false,
            };
            if !hit {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if !ticket.is_assigned_to(assignee) {
                return false;
            }
        }
        if let Some(requester) = &self.requester {
            if !ticket.is_requested_by(requester) {
                return false;
            }
        }
        true
    }
}

impl Desk {
    pub fn submit_repair(&self, user_id: &str, req: NewRepairTicket) -> DeskResult<Ticket> {
        let user = self.user(user_id)?;
        let now = Utc::now();
        let (ticket, drafts) = repair::submit(req, &user, now)?;
        let stored = self.repos.tickets.insert(ticket)?;
        info!(
            "  {} submitted by {} ({})",
            stored.ticket_number, user.name, stored.status_label()
        );
        self.notifier.notify_all(&drafts, now);
        Ok(stored)
    }

    pub fn submit_meeting(&self, user_id: &str, req: NewMeetingTicket) -> DeskResult<Ticket> {
        let user = self.user(user_id)?;
        let now = Utc::now();
        let (ticket, drafts) = booking::submit(req, &user, &self.hours, now)?;
        let stored = self.repos.tickets.insert(ticket)?;
        info!(
            "  {} booking requested by {} ({})",
            stored.ticket_number, user.name, stored.status_label()
        );
        self.notifier.notify_all(&drafts, now);
        Ok(stored)
    }

    pub fn ticket(&self, ticket_id: &str) -> DeskResult<Ticket> {
        self.repos.tickets.require(ticket_id)
    }

    /// Matching tickets, newest first
    pub fn tickets(&self, filter: &TicketFilter) -> DeskResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = self
            .repos
            .tickets
            .list()?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    /// Apply a repair action. Holds go through `request_work_order`, which
    /// creates the order the hold points at; a hold is lifted by hand only
    /// after that order failed or was cancelled.
    pub fn apply_repair_action(
        &self,
        user_id: &str,
        ticket_id: &str,
        action: RepairAction,
    ) -> DeskResult<Ticket> {
        if matches!(action, RepairAction::Hold { .. }) {
            return Err(DeskError::validation(
                "put a ticket on hold by requesting a work order",
            ));
        }
        let user = self.user(user_id)?;
        let mut ticket = self.ticket(ticket_id)?;
        let users = self.repos.users.list()?;
        let now = Utc::now();

        // A manual resume is judged against the order the ticket waits for
        let work_order = match (&action, ticket.repair()) {
            (RepairAction::Resume { .. }, Some(details)) => match &details.work_order_id {
                Some(id) => self.repos.work_orders.get(id)?,
                None => None,
            },
            _ => None,
        };
        let transition = repair::apply_with_work_order(
            &mut ticket,
            &action,
            &user.actor(),
            &users,
            work_order.as_ref(),
            now,
        )?;
        let stored = self.repos.tickets.update(ticket)?;
        info!(
            "  {} {} -> {} ({} by {})",
            stored.ticket_number, transition.from, transition.to, transition.action, user.name
        );
        self.notifier.notify_all(&transition.notifications, now);
        Ok(stored)
    }

    /// Approve or reject a meeting booking
    pub fn apply_meeting_action(
        &self,
        user_id: &str,
        ticket_id: &str,
        action: MeetingAction,
    ) -> DeskResult<Ticket> {
        let user = self.user(user_id)?;
        let mut ticket = self.ticket(ticket_id)?;
        let accounts = self.repos.zoom_accounts.list()?;
        let bookings = self.repos.tickets.list()?;
        let now = Utc::now();

        let transition =
            booking::apply(&mut ticket, &action, &user.actor(), &accounts, &bookings, now)?;
        let stored = self.repos.tickets.update(ticket)?;
        info!(
            "  {} {} -> {} by {}",
            stored.ticket_number, transition.from, transition.to, user.name
        );
        self.notifier.notify_all(&transition.notifications, now);
        Ok(stored)
    }
}
