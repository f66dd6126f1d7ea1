//! Notification delivery - turns drafts into per-user inbox entries
//!
//! Role recipients fan out to every user holding the role. Delivery is
//! best-effort: a failed write is logged and never fails the operation that
//! produced the draft.

use crate::store::Repository;
use chrono::{DateTime, Utc};
use helpdesk_shared::{Notification, NotificationDraft, Recipient, User};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Notifier {
    users: Arc<dyn Repository<User>>,
    notifications: Arc<dyn Repository<Notification>>,
}

impl Notifier {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        notifications: Arc<dyn Repository<Notification>>,
    ) -> Self {
        Self {
            users,
            notifications,
        }
    }

    /// User ids a draft is addressed to
    fn recipients(&self, draft: &NotificationDraft) -> Vec<String> {
        match &draft.recipient {
            Recipient::User(id) => vec![id.clone()],
            Recipient::Role(role) => match self.users.list() {
                Ok(users) => users
                    .into_iter()
                    .filter(|u| u.has_role(*role))
                    .map(|u| u.id)
                    .collect(),
                Err(e) => {
                    warn!("  Cannot resolve role {} for '{}': {}", role, draft.title, e);
                    Vec::new()
                }
            },
        }
    }

    /// Deliver one draft; returns how many inbox entries were written
    pub fn notify(&self, draft: &NotificationDraft, at: DateTime<Utc>) -> usize {
        let mut delivered = 0;
        for user_id in self.recipients(draft) {
            match self.notifications.insert(draft.deliver_to(&user_id, at)) {
                Ok(_) => delivered += 1,
                Err(e) => warn!("  Notification '{}' to {} dropped: {}", draft.title, user_id, e),
            }
        }
        if delivered == 0 {
            debug!("  Notification '{}' reached nobody", draft.title);
        }
        delivered
    }

    pub fn notify_all(&self, drafts: &[NotificationDraft], at: DateTime<Utc>) -> usize {
        drafts.iter().map(|d| self.notify(d, at)).sum()
    }
}
