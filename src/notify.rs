//! User-facing notifications, one per completed operation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Notification level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Success => f.write_str("OK"),
            Self::Warning => f.write_str("WARN"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// A toast-style message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub timestamp: NaiveDateTime,
    pub level: NotificationLevel,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Receives notifications from the tracker.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Keeps the most recent notifications in memory.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: Rc<RefCell<Vec<Notification>>>,
    capacity: usize,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            capacity,
        }
    }

    /// Snapshot of the stored notifications, oldest first.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    /// Remove and return everything stored so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        let mut entries = self.entries.borrow_mut();
        entries.push(notification);

        // Keep only the last `capacity` messages
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn note(message: &str) -> Notification {
        Notification {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
            level: NotificationLevel::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_log_keeps_latest() {
        let log = NotificationLog::new(2);
        log.notify(note("one"));
        log.notify(note("two"));
        log.notify(note("three"));

        let messages: Vec<_> = log.entries().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_drain_empties_log() {
        let log = NotificationLog::default();
        let shared = log.clone();
        shared.notify(note("hello"));

        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(note("hi").to_string(), "[INFO] hi");
    }
}
