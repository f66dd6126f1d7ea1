//! Zoom account management and per-day schedules.

use super::{require_role, Desk, ADMIN_ROLES};
use chrono::NaiveDate;
use helpdesk_shared::booking::{self, ZoomAccount};
use helpdesk_shared::transition::require_text;
use helpdesk_shared::{DeskError, DeskResult, MeetingStatus, Ticket};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewZoomAccount {
    /// Generated when omitted
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Desk {
    /// All accounts, by name
    pub fn zoom_accounts(&self) -> DeskResult<Vec<ZoomAccount>> {
        let mut accounts = self.repos.zoom_accounts.list()?;
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    pub fn create_zoom_account(
        &self,
        user_id: &str,
        input: NewZoomAccount,
    ) -> DeskResult<ZoomAccount> {
        let user = self.user(user_id)?;
        require_role(&user, ADMIN_ROLES, "managing Zoom accounts")?;
        let name = require_text("account name", &input.name)?;
        let id = match input.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        let account = self
            .repos
            .zoom_accounts
            .insert(ZoomAccount::new(&id, &name, input.email.trim()))?;
        info!("  Zoom account {} ({}) created by {}", account.name, account.id, user.name);
        Ok(account)
    }

    /// Stop offering an account for new approvals. Existing bookings stay.
    pub fn deactivate_zoom_account(&self, user_id: &str, id: &str) -> DeskResult<ZoomAccount> {
        let user = self.user(user_id)?;
        require_role(&user, ADMIN_ROLES, "managing Zoom accounts")?;
        let mut account = self.repos.zoom_accounts.require(id)?;
        account.active = false;
        let account = self.repos.zoom_accounts.update(account)?;
        info!("  Zoom account {} deactivated by {}", account.name, user.name);
        Ok(account)
    }

    /// Remove an account that no approved booking uses
    pub fn delete_zoom_account(&self, user_id: &str, id: &str) -> DeskResult<()> {
        let user = self.user(user_id)?;
        require_role(&user, ADMIN_ROLES, "managing Zoom accounts")?;
        let account = self.repos.zoom_accounts.require(id)?;
        let in_use = self.repos.tickets.list()?.iter().any(|t| {
            t.meeting().map_or(false, |m| {
                m.status == MeetingStatus::Approved && m.account_id.as_deref() == Some(id)
            })
        });
        if in_use {
            return Err(DeskError::Conflict(format!(
                "{} has approved bookings; deactivate it instead",
                account.name
            )));
        }
        self.repos.zoom_accounts.delete(id)?;
        info!("  Zoom account {} deleted by {}", account.name, user.name);
        Ok(())
    }

    /// Approved bookings on one account for one day, by start time
    pub fn schedule(&self, account_id: &str, date: NaiveDate) -> DeskResult<Vec<Ticket>> {
        self.repos.zoom_accounts.require(account_id)?;
        let tickets = self.repos.tickets.list()?;
        Ok(booking::schedule(account_id, date, &tickets)
            .into_iter()
            .cloned()
            .collect())
    }
}
