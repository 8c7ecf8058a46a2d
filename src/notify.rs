//! User-facing notifications
//!
//! The toolkit reports save/load/delete outcomes through a [`Notifier`].
//! Hosts without one simply get nothing; reporting never fails.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::notify::DEFAULT_DURATION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_content: Option<String>,
    /// Seconds on screen; `None` stays until dismissed
    #[serde(default)]
    pub duration: Option<f32>,
}

impl Notification {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            sub_content: None,
            duration: Some(DEFAULT_DURATION),
        }
    }

    pub fn sub_content(mut self, sub_content: impl Into<String>) -> Self {
        self.sub_content = Some(sub_content.into());
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn sticky(mut self) -> Self {
        self.duration = None;
        self
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!(
            title = %notification.title,
            content = %notification.content,
            sub_content = ?notification.sub_content,
            "Notification"
        );
    }
}

#[derive(Debug, Clone)]
struct Toast {
    notification: Notification,
    shown_at: Instant,
}

/// Notifications waiting to be drawn, expired by their duration.
///
/// Clones share the same queue, so the GUI can hold one handle while the
/// library reports through another.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: Rc<RefCell<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired toasts and return the rest, oldest first
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        let mut toasts = self.toasts.borrow_mut();
        toasts.retain(|toast| match toast.notification.duration {
            Some(seconds) => {
                let lifetime = Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or(Duration::MAX);
                now.saturating_duration_since(toast.shown_at) < lifetime
            }
            None => true,
        });
        toasts.iter().map(|toast| toast.notification.clone()).collect()
    }

    /// Remove the toast at `index` (as returned by `active`)
    pub fn dismiss(&self, index: usize) {
        let mut toasts = self.toasts.borrow_mut();
        if index < toasts.len() {
            toasts.remove(index);
        }
    }

    /// Everything queued, without expiring anything
    pub fn snapshot(&self) -> Vec<Notification> {
        self.toasts
            .borrow()
            .iter()
            .map(|toast| toast.notification.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.toasts.borrow_mut().clear();
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notification: Notification) {
        info!(title = %notification.title, content = %notification.content, "Queued notification");
        self.toasts.borrow_mut().push(Toast {
            notification,
            shown_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_duration() {
        let n = Notification::new("Title", "Body");
        assert_eq!(n.duration, Some(5.0));
        assert_eq!(n.sticky().duration, None);
    }

    #[test]
    fn test_toasts_expire() {
        let queue = ToastQueue::new();
        queue.notify(Notification::new("short", "").duration(1.0));
        queue.notify(Notification::new("sticky", "").sticky());

        let later = Instant::now() + Duration::from_secs(2);
        let titles: Vec<String> = queue.active(later).into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["sticky"]);
    }

    #[test]
    fn test_dismiss() {
        let queue = ToastQueue::new();
        queue.notify(Notification::new("a", ""));
        queue.notify(Notification::new("b", ""));
        queue.dismiss(0);
        queue.dismiss(10);
        assert_eq!(queue.snapshot().len(), 1);
        assert_eq!(queue.snapshot()[0].title, "b");
    }

    #[test]
    fn test_notification_json_shape() {
        let n = Notification::new("T", "C").sub_content("S");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["sub_content"], "S");
        assert_eq!(json["duration"], 5.0);
    }
}
