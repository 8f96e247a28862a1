use serde::Serialize;
use uuid::Uuid;

/// Oldest notifications are dropped beyond this many.
pub const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
}

/// Transient, dismissible messages for the user.
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        };
        let id = notification.id;
        self.items.push(notification);
        if self.items.len() > MAX_NOTIFICATIONS {
            let excess = self.items.len() - MAX_NOTIFICATIONS;
            self.items.drain(..excess);
        }
        id
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn last(&self) -> Option<&Notification> {
        self.items.last()
    }
}
