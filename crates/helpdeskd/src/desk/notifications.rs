//! Per-user notification inbox.

use super::Desk;
use helpdesk_shared::api::NotificationFeed;
use helpdesk_shared::{DeskError, DeskResult, Notification};

impl Desk {
    fn inbox(&self, user_id: &str) -> DeskResult<Vec<Notification>> {
        let mut items: Vec<Notification> = self
            .repos
            .notifications
            .list()?
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect();
        // Newest first; same-instant notices keep reverse insertion order
        items.reverse();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub fn notifications(&self, user_id: &str) -> DeskResult<NotificationFeed> {
        self.user(user_id)?;
        let notifications = self.inbox(user_id)?;
        let unread = notifications.iter().filter(|n| !n.read).count();
        Ok(NotificationFeed {
            unread,
            notifications,
        })
    }

    /// Mark one of the user's own notifications read
    pub fn mark_read(&self, user_id: &str, id: &str) -> DeskResult<Notification> {
        self.user(user_id)?;
        let mut notification = self
            .repos
            .notifications
            .get(id)?
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| DeskError::not_found("notification", id))?;
        if notification.read {
            return Ok(notification);
        }
        notification.read = true;
        self.repos.notifications.update(notification)
    }

    /// Returns how many were unread
    pub fn mark_all_read(&self, user_id: &str) -> DeskResult<usize> {
        self.user(user_id)?;
        let mut marked = 0;
        for mut notification in self.inbox(user_id)?.into_iter().filter(|n| !n.read) {
            notification.read = true;
            self.repos.notifications.update(notification)?;
            marked += 1;
        }
        Ok(marked)
    }
}
