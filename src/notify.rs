//! Transient user-facing status messages.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: message.into(),
        }
    }
}

/// Sink for notifications. Implementations must not block.
pub trait Notify: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone)]
struct Toast {
    notification: Notification,
    created: Instant,
}

/// Toasts that expire after a fixed lifetime.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
    lifetime: Duration,
}

impl ToastQueue {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            lifetime,
        }
    }

    /// Notifications still alive, oldest first. Expired ones are dropped.
    pub fn active(&self) -> Vec<Notification> {
        let mut toasts = self.toasts.lock();
        let lifetime = self.lifetime;
        toasts.retain(|toast| toast.created.elapsed() < lifetime);
        toasts.iter().map(|toast| toast.notification.clone()).collect()
    }

    /// Most recent notification, expired or not.
    pub fn latest(&self) -> Option<Notification> {
        self.toasts.lock().last().map(|toast| toast.notification.clone())
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

impl Notify for ToastQueue {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(message = %notification.message, "notification"),
            NotificationKind::Failure => tracing::warn!(message = %notification.message, "notification"),
        }
        self.toasts.lock().push(Toast {
            notification,
            created: Instant::now(),
        });
    }
}
