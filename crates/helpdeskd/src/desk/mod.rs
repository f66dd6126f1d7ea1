//! Service desk operations.
//!
//! [`Desk`] resolves the acting user, loads entities from the repositories,
//! runs the lifecycle rules from `helpdesk_shared`, persists the result and
//! hands the produced notification drafts to the [`Notifier`]. It holds no
//! state of its own; the server serialises writers with a lock around it.

mod bookings;
mod inventory;
mod notifications;
mod tickets;
mod work_orders;

pub use bookings::NewZoomAccount;
pub use tickets::TicketFilter;
pub use work_orders::WorkOrderFilter;

use crate::notifier::Notifier;
use crate::store::Repositories;
use helpdesk_shared::api::DeskCounts;
use helpdesk_shared::clock::WorkingHours;
use helpdesk_shared::{DeskError, DeskResult, Role, User};

/// Roles allowed to manage accounts and inventory
pub const ADMIN_ROLES: &[Role] = &[Role::AdminLayanan, Role::SuperAdmin];

pub struct Desk {
    repos: Repositories,
    notifier: Notifier,
    hours: WorkingHours,
}

impl Desk {
    pub fn new(repos: Repositories, hours: WorkingHours) -> Self {
        let notifier = Notifier::new(repos.users.clone(), repos.notifications.clone());
        Self {
            repos,
            notifier,
            hours,
        }
    }

    pub fn repos(&self) -> &Repositories {
        &self.repos
    }

    pub fn working_hours(&self) -> WorkingHours {
        self.hours
    }

    /// Resolve the acting user. Unknown ids are refused, not "not found".
    pub fn user(&self, user_id: &str) -> DeskResult<User> {
        self.repos
            .users
            .get(user_id)?
            .ok_or_else(|| DeskError::forbidden(format!("unknown user '{}'", user_id)))
    }

    pub fn users(&self) -> DeskResult<Vec<User>> {
        let mut users = self.repos.users.list()?;
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    pub fn counts(&self) -> DeskResult<DeskCounts> {
        let tickets = self.repos.tickets.list()?;
        let open_tickets = tickets
            .iter()
            .filter(|t| match (t.repair(), t.meeting()) {
                (Some(d), _) => !d.status.is_terminal(),
                (_, Some(m)) => !m.status.is_terminal(),
                _ => false,
            })
            .count();
        Ok(DeskCounts {
            users: self.repos.users.list()?.len(),
            tickets: tickets.len(),
            open_tickets,
            work_orders: self.repos.work_orders.list()?.len(),
            zoom_accounts: self.repos.zoom_accounts.list()?.len(),
        })
    }
}

/// Fail unless the user holds one of `roles`
fn require_role(user: &User, roles: &[Role], what: &str) -> DeskResult<()> {
    if roles.iter().any(|r| user.has_role(*r)) {
        return Ok(());
    }
    let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
    Err(DeskError::forbidden(format!(
        "{} requires one of: {}",
        what,
        names.join(", ")
    )))
}
