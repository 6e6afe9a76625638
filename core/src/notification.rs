//! Shared holder for the most recent user-facing notification.
//!
//! `HttpClient` writes into a `NotificationSink`; the UI layer reads it,
//! renders the message and dismisses it. There is a single slot: when
//! requests complete close together the last write wins.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub visible: bool,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
            visible: true,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
            visible: true,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Notification>,
    sequence: u64,
}

/// Cloneable handle to one notification slot. Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct NotificationSink {
    slot: Arc<Mutex<Slot>>,
}

impl NotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current notification.
    pub fn notify(&self, notification: Notification) {
        tracing::debug!(kind = ?notification.kind, message = %notification.message, "notification");
        let mut slot = self.slot.lock();
        slot.current = Some(notification);
        slot.sequence += 1;
    }

    pub fn latest(&self) -> Option<Notification> {
        self.slot.lock().current.clone()
    }

    /// Hide the current notification without discarding it.
    pub fn dismiss(&self) {
        if let Some(current) = self.slot.lock().current.as_mut() {
            current.visible = false;
        }
    }

    pub fn take(&self) -> Option<Notification> {
        self.slot.lock().current.take()
    }

    /// Number of notifications written so far.
    pub fn sequence(&self) -> u64 {
        self.slot.lock().sequence
    }
}
