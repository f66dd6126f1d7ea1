//! Work order requests, procurement actions and the cascade to tickets.

use super::Desk;
use chrono::{DateTime, Utc};
use helpdesk_shared::repair;
use helpdesk_shared::work_order::{self, NewWorkOrder, WorkOrderAction};
use helpdesk_shared::{DeskResult, WorkOrder, WorkOrderStatus};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkOrderFilter {
    pub ticket_id: Option<String>,
    pub status: Option<WorkOrderStatus>,
}

impl WorkOrderFilter {
    pub fn matches(&self, order: &WorkOrder) -> bool {
        self.ticket_id.as_deref().map_or(true, |id| order.ticket_id == id)
            && self.status.map_or(true, |s| order.status == s)
    }
}

impl Desk {
    /// Raise a work order and put its ticket on hold
    pub fn request_work_order(
        &self,
        user_id: &str,
        ticket_id: &str,
        req: NewWorkOrder,
    ) -> DeskResult<WorkOrder> {
        let user = self.user(user_id)?;
        let actor = user.actor();
        let ticket = self.ticket(ticket_id)?;
        let users = self.repos.users.list()?;
        let now = Utc::now();

        let request = work_order::request(&ticket, req, &actor, now)?;
        let mut held = ticket;
        let hold = repair::apply(&mut held, &request.hold, &actor, &users, now)?;

        let order = self.repos.work_orders.insert(request.work_order)?;
        let held = self.repos.tickets.update(held)?;
        info!(
            "  {} {} work order {} requested by {}; ticket {} -> {}",
            held.ticket_number,
            order.kind.as_str(),
            order.id,
            user.name,
            hold.from,
            hold.to
        );
        self.notifier.notify_all(&request.notifications, now);
        self.notifier.notify_all(&hold.notifications, now);
        Ok(order)
    }

    pub fn work_order(&self, id: &str) -> DeskResult<WorkOrder> {
        self.repos.work_orders.require(id)
    }

    /// Matching work orders, newest first
    pub fn work_orders(&self, filter: &WorkOrderFilter) -> DeskResult<Vec<WorkOrder>> {
        let mut orders: Vec<WorkOrder> = self
            .repos
            .work_orders
            .list()?
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Apply a procurement action; a fulfilled order resumes its ticket
    pub fn apply_work_order_action(
        &self,
        user_id: &str,
        work_order_id: &str,
        action: WorkOrderAction,
    ) -> DeskResult<WorkOrder> {
        let user = self.user(user_id)?;
        let mut order = self.work_order(work_order_id)?;
        let now = Utc::now();

        let transition = work_order::apply(&mut order, &action, &user.actor(), now)?;
        let stored = self.repos.work_orders.update(order)?;
        info!(
            "  Work order {} for {} {} -> {} by {}",
            stored.id, stored.ticket_number, transition.from, transition.to, user.name
        );
        self.notifier.notify_all(&transition.notifications, now);

        if stored.status.is_fulfilled() {
            self.resume_ticket(&stored, now)?;
        }
        Ok(stored)
    }

    /// Cascade a fulfilled order back onto its ticket. A ticket that is no
    /// longer waiting is left alone.
    fn resume_ticket(&self, order: &WorkOrder, now: DateTime<Utc>) -> DeskResult<()> {
        let Some(mut ticket) = self.repos.tickets.get(&order.ticket_id)? else {
            warn!(
                "  Work order {} fulfilled but ticket {} is gone",
                order.id, order.ticket_id
            );
            return Ok(());
        };
        let transition = match repair::resume_after_work_order(&mut ticket, order, now) {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    "  Work order {} fulfilled, {} not resumed: {}",
                    order.id, ticket.ticket_number, e
                );
                return Ok(());
            }
        };
        let ticket = self.repos.tickets.update(ticket)?;
        info!(
            "  {} {} -> {} (work order {} {})",
            ticket.ticket_number, transition.from, transition.to, order.id, order.status
        );
        self.notifier.notify_all(&transition.notifications, now);
        Ok(())
    }
}
