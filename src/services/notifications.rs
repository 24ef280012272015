//! Transient user-facing notifications.
//!
//! Errors from network calls and media loading end up here instead of
//! propagating; readers drain the queue and display what they like.

use crate::constants::NOTIFICATION_QUEUE_LIMIT;
use crate::error::AppError;
use crate::utils::error_handling::safe_lock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Bounded FIFO; the oldest entry is dropped once the limit is reached
#[derive(Clone, Default)]
pub struct Notifications {
    queue: Arc<Mutex<VecDeque<Notification>>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification {
            message: message.into(),
            kind,
        };
        if let Some(mut queue) = safe_lock(&self.queue, "Notifications") {
            if queue.len() >= NOTIFICATION_QUEUE_LIMIT {
                queue.pop_front();
            }
            queue.push_back(notification);
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(message, NotificationKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(message, NotificationKind::Error);
    }

    /// Log the error and queue its user-facing message
    pub fn report(&self, context: &str, err: &AppError) {
        log::error!("[{}] {}", context, err);
        self.error(err.user_message());
    }

    pub fn drain(&self) -> Vec<Notification> {
        safe_lock(&self.queue, "Notifications")
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        safe_lock(&self.queue, "Notifications")
            .map(|queue| queue.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order() {
        let notifications = Notifications::new();
        notifications.success("Upload successful!");
        notifications.error("Network Error");

        let drained = notifications.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, NotificationKind::Success);
        assert_eq!(drained[1].message, "Network Error");
        assert!(notifications.is_empty());
    }

    #[test]
    fn drops_oldest_when_full() {
        let notifications = Notifications::new();
        for i in 0..NOTIFICATION_QUEUE_LIMIT + 2 {
            notifications.error(format!("error {}", i));
        }
        let drained = notifications.drain();
        assert_eq!(drained.len(), NOTIFICATION_QUEUE_LIMIT);
        assert_eq!(drained[0].message, "error 2");
    }

    #[test]
    fn report_uses_user_message() {
        let notifications = Notifications::new();
        notifications.report("Test", &AppError::AuthRequired);
        assert_eq!(notifications.drain()[0].message, "Please sign in first");
    }
}
